use image::{Rgb, RgbImage};
use imageproc::drawing;
use road_plane::{BoundaryPolygon, Overlay};

pub const BOUNDARY_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Draws road boundaries onto a colour image as closed polylines.
#[derive(Debug)]
pub struct ImageOverlay<'a> {
    image: &'a mut RgbImage,
    color: Rgb<u8>,
    /// Line width in pixels.
    thickness: u32,
}

impl<'a> ImageOverlay<'a> {
    pub fn new(image: &'a mut RgbImage) -> Self {
        Self {
            image,
            color: BOUNDARY_COLOR,
            thickness: 3,
        }
    }

    #[must_use]
    pub fn color(self, color: Rgb<u8>) -> Self {
        Self { color, ..self }
    }

    #[must_use]
    pub fn thickness(self, thickness: u32) -> Self {
        Self { thickness, ..self }
    }
}

impl Overlay for ImageOverlay<'_> {
    fn draw_boundary(&mut self, boundary: &BoundaryPolygon) {
        let spread = self.thickness.max(1) as i32;
        let offsets = (0..spread).map(|step| step - spread / 2);
        for (a, b) in boundary.edges() {
            let (ax, ay) = (a.col as f32, a.row as f32);
            let (bx, by) = (b.col as f32, b.row as f32);
            for offset in offsets.clone() {
                let offset = offset as f32;
                drawing::draw_line_segment_mut(
                    &mut *self.image,
                    (ax + offset, ay),
                    (bx + offset, by),
                    self.color,
                );
                drawing::draw_line_segment_mut(
                    &mut *self.image,
                    (ax, ay + offset),
                    (bx, by + offset),
                    self.color,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use road_core::Pixel;

    #[test]
    fn draws_closed_outline_only() {
        let mut image = RgbImage::new(20, 20);
        let boundary = BoundaryPolygon::convex_hull(vec![
            Pixel::new(2, 2),
            Pixel::new(2, 17),
            Pixel::new(17, 17),
            Pixel::new(17, 2),
        ])
        .unwrap();
        ImageOverlay::new(&mut image)
            .thickness(1)
            .draw_boundary(&boundary);
        // Every edge including the closing one is drawn.
        for (x, y) in [(10, 2), (17, 10), (10, 17), (2, 10)] {
            assert_eq!(*image.get_pixel(x, y), BOUNDARY_COLOR, "at {:?}", (x, y));
        }
        assert_eq!(*image.get_pixel(10, 10), Rgb([0, 0, 0]));
        assert_eq!(*image.get_pixel(0, 0), Rgb([0, 0, 0]));
    }
}
