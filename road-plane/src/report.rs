use crate::BoundaryPolygon;
use core::fmt;
use road_core::nalgebra::{UnitVector3, Vector3};

/// Something a road boundary can be drawn onto, such as the left image of a frame.
pub trait Overlay {
    fn draw_boundary(&mut self, boundary: &BoundaryPolygon);
}

/// The result for one stereo frame, as printed for the user.
///
/// Its [`Display`](fmt::Display) form is a single line with both image names and the
/// road normal, which is the zero vector when no road was found.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub left: String,
    pub right: String,
    pub normal: Option<UnitVector3<f64>>,
    pub boundary: Option<BoundaryPolygon>,
}

impl FrameReport {
    pub fn new(
        left: impl Into<String>,
        right: impl Into<String>,
        normal: Option<UnitVector3<f64>>,
        boundary: Option<BoundaryPolygon>,
    ) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
            normal,
            boundary,
        }
    }

    /// The road normal, or the zero vector when no road was found.
    pub fn normal_or_zero(&self) -> Vector3<f64> {
        self.normal.map(|n| n.into_inner()).unwrap_or_else(Vector3::zeros)
    }

    /// Draws the boundary onto `overlay`. Returns `false` and leaves the overlay untouched
    /// when there is no boundary.
    pub fn render(&self, overlay: &mut impl Overlay) -> bool {
        match &self.boundary {
            Some(boundary) => {
                overlay.draw_boundary(boundary);
                true
            }
            None => false,
        }
    }
}

impl fmt::Display for FrameReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.normal_or_zero();
        write!(
            f,
            "{} {} : road surface normal ({:.6}, {:.6}, {:.6})",
            self.left, self.right, n.x, n.y, n.z
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use road_core::{nalgebra::Unit, Pixel};

    #[derive(Default)]
    struct Recorder(Vec<BoundaryPolygon>);

    impl Overlay for Recorder {
        fn draw_boundary(&mut self, boundary: &BoundaryPolygon) {
            self.0.push(boundary.clone());
        }
    }

    #[test]
    fn formats_normal() {
        let normal = Unit::new_normalize(Vector3::new(0.0, -1.0, 0.0));
        let report = FrameReport::new("a_L.png", "a_R.png", Some(normal), None);
        assert_eq!(
            report.to_string(),
            "a_L.png a_R.png : road surface normal (0.000000, -1.000000, 0.000000)"
        );
    }

    #[test]
    fn missing_plane_prints_zero_vector() {
        let report = FrameReport::new("b_L.png", "b_R.png", None, None);
        assert_eq!(
            report.to_string(),
            "b_L.png b_R.png : road surface normal (0.000000, 0.000000, 0.000000)"
        );
        let mut recorder = Recorder::default();
        assert!(!report.render(&mut recorder));
        assert!(recorder.0.is_empty());
    }

    #[test]
    fn renders_boundary() {
        let boundary = BoundaryPolygon::convex_hull(vec![
            Pixel::new(0, 0),
            Pixel::new(0, 5),
            Pixel::new(5, 0),
        ])
        .unwrap();
        let report = FrameReport::new("c_L.png", "c_R.png", None, Some(boundary.clone()));
        let mut recorder = Recorder::default();
        assert!(report.render(&mut recorder));
        assert_eq!(recorder.0, vec![boundary]);
    }
}
