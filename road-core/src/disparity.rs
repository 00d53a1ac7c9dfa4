use crate::Pixel;

/// The value written where a stereo matcher could not find a correspondence.
///
/// Any disparity at or below this value (and any non-finite disparity) is
/// treated as missing.
pub const NO_DISPARITY: f32 = 0.0;

/// Returns `true` if `disparity` carries a usable horizontal shift.
#[inline]
pub fn is_valid_disparity(disparity: f32) -> bool {
    disparity.is_finite() && disparity > NO_DISPARITY
}

/// A dense, row-major field of disparities in pixels, one per image pixel.
///
/// The map is read-only input to the projection stage. Missing values are stored
/// as [`NO_DISPARITY`].
#[derive(Debug, Clone, PartialEq)]
pub struct DisparityMap {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl DisparityMap {
    /// Creates a map where every pixel is missing.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![NO_DISPARITY; width * height],
        }
    }

    /// Wraps row-major data. Returns `None` if the length does not match the dimensions.
    pub fn from_raw(width: usize, height: usize, data: Vec<f32>) -> Option<Self> {
        (data.len() == width * height).then(|| Self {
            width,
            height,
            data,
        })
    }

    /// Builds a map by evaluating `f(row, col)` for every pixel.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                data.push(f(row, col));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// The stored value at `(row, col)`, including the sentinel.
    ///
    /// Panics if the pixel is outside of the map.
    pub fn raw(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.width + col]
    }

    /// The disparity at `(row, col)`, or `None` if it is missing or out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.height || col >= self.width {
            return None;
        }
        Some(self.raw(row, col)).filter(|&d| is_valid_disparity(d))
    }

    /// Overwrites the value at `(row, col)`.
    ///
    /// Panics if the pixel is outside of the map.
    pub fn put(&mut self, row: usize, col: usize, disparity: f32) {
        self.data[row * self.width + col] = disparity;
    }

    /// Iterates over every pixel that has a valid disparity in row-major order.
    pub fn valid(&self) -> impl Iterator<Item = (Pixel, f32)> + '_ {
        let width = self.width;
        self.data
            .iter()
            .enumerate()
            .filter(|&(_, &d)| is_valid_disparity(d))
            .map(move |(ix, &d)| (Pixel::new(ix / width, ix % width), d))
    }

    /// The number of pixels with a valid disparity.
    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|&&d| is_valid_disparity(d)).count()
    }

    /// The largest valid disparity in the map, if any.
    pub fn max_disparity(&self) -> Option<f32> {
        self.data
            .iter()
            .copied()
            .filter(|&d| is_valid_disparity(d))
            .fold(None, |max, d| Some(max.map_or(d, |m: f32| m.max(d))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_and_non_finite_values_are_missing() {
        let map = DisparityMap::from_raw(3, 1, vec![0.0, -1.0, f32::NAN]).unwrap();
        assert_eq!(map.valid_count(), 0);
        assert_eq!(map.get(0, 0), None);
        assert_eq!(map.get(0, 1), None);
        assert_eq!(map.get(0, 2), None);
        assert_eq!(map.max_disparity(), None);
    }

    #[test]
    fn valid_pixels_are_row_major() {
        let map = DisparityMap::from_fn(3, 2, |row, col| (row * 3 + col) as f32);
        let pixels: Vec<_> = map.valid().collect();
        assert_eq!(pixels.len(), 5);
        assert_eq!(pixels[0], (Pixel::new(0, 1), 1.0));
        assert_eq!(pixels[4], (Pixel::new(1, 2), 5.0));
        assert_eq!(map.get(1, 2), Some(5.0));
        assert_eq!(map.get(2, 0), None);
        assert_eq!(map.max_disparity(), Some(5.0));
    }

    #[test]
    fn from_raw_checks_dimensions() {
        assert!(DisparityMap::from_raw(4, 4, vec![1.0; 15]).is_none());
    }
}
