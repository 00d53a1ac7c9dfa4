use image::GrayImage;
use log::debug;
use road_core::DisparityMap;
use road_stereo::{decode_fixed_point, DISPARITY_SCALE};

/// Computes a disparity map from a rectified grayscale stereo pair.
///
/// Pixels without a reliable match must be set to [`road_core::NO_DISPARITY`].
pub trait DisparityAlgorithm {
    /// Both images have the same dimensions.
    fn compute(&self, left: &GrayImage, right: &GrayImage) -> DisparityMap;
}

/// Block matching by the sum of absolute differences over a square window.
///
/// For every left pixel the window is compared against the right image shifted by each
/// disparity in `0..max_disparity`. The lowest cost wins and is refined to subpixel
/// precision with a parabola through its neighbours. A pixel has no disparity if its
/// window leaves the image, if it is too close to the left edge to search every
/// disparity, if the best disparity is zero, or if a different disparity (not adjacent
/// to the best) comes within `uniqueness` of the best cost.
///
/// Like semi-global matchers, the raw output is fixed point with [`DISPARITY_SCALE`]
/// steps per pixel and `-DISPARITY_SCALE` for "no match".
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BlockMatcher {
    pub max_disparity: usize,
    /// Odd side length of the matching window.
    pub block_size: usize,
    pub uniqueness: f64,
}

impl BlockMatcher {
    pub fn new(max_disparity: usize, block_size: usize) -> Self {
        Self {
            max_disparity,
            block_size,
            uniqueness: 0.1,
        }
    }

    #[must_use]
    pub fn uniqueness(self, uniqueness: f64) -> Self {
        Self { uniqueness, ..self }
    }

    fn radius(&self) -> usize {
        self.block_size / 2
    }

    /// Sum of absolute differences of the windows around `(row, col)` in the left image
    /// and `(row, col - disparity)` in the right image.
    fn window_cost(
        &self,
        left: &GrayImage,
        right: &GrayImage,
        row: usize,
        col: usize,
        disparity: usize,
    ) -> u64 {
        let r = self.radius();
        let mut cost = 0;
        for y in row - r..=row + r {
            for x in col - r..=col + r {
                let a = left.get_pixel(x as u32, y as u32)[0];
                let b = right.get_pixel((x - disparity) as u32, y as u32)[0];
                cost += u64::from(a.abs_diff(b));
            }
        }
        cost
    }
}

impl BlockMatcher {
    /// Matches the pair and returns disparities in row-major fixed point.
    pub fn compute_fixed_point(&self, left: &GrayImage, right: &GrayImage) -> Vec<i16> {
        let (width, height) = (left.width() as usize, left.height() as usize);
        let mut disparity = vec![-DISPARITY_SCALE; width * height];
        let r = self.radius();
        let first_col = r + self.max_disparity.saturating_sub(1);
        if self.max_disparity == 0 || width <= first_col + r || height <= 2 * r {
            return disparity;
        }
        let stride = width + 1;

        let mut best = vec![(u64::MAX, 0usize); width * height];
        let mut second = vec![u64::MAX; width * height];
        let mut integral = vec![0u64; stride * (height + 1)];
        for d in 0..self.max_disparity {
            // Summed area table of the absolute differences at this disparity.
            for y in 0..height {
                let mut row_sum = 0;
                for x in 0..width {
                    if x >= d {
                        let a = left.get_pixel(x as u32, y as u32)[0];
                        let b = right.get_pixel((x - d) as u32, y as u32)[0];
                        row_sum += u64::from(a.abs_diff(b));
                    }
                    integral[(y + 1) * stride + x + 1] = integral[y * stride + x + 1] + row_sum;
                }
            }
            for row in r..height - r {
                for col in first_col..width - r {
                    let (top, bottom) = (row - r, row + r + 1);
                    let (lo, hi) = (col - r, col + r + 1);
                    let cost = integral[bottom * stride + hi] + integral[top * stride + lo]
                        - integral[top * stride + hi]
                        - integral[bottom * stride + lo];
                    let ix = row * width + col;
                    let (best_cost, best_d) = best[ix];
                    if cost < best_cost {
                        if d > best_d + 1 {
                            second[ix] = best_cost;
                        }
                        best[ix] = (cost, d);
                    } else if d > best_d + 1 && cost < second[ix] {
                        second[ix] = cost;
                    }
                }
            }
        }

        let mut matched = 0;
        for row in r..height - r {
            for col in first_col..width - r {
                let ix = row * width + col;
                let (cost, d) = best[ix];
                if d == 0 || (second[ix] as f64) * (1.0 - self.uniqueness) <= cost as f64 {
                    continue;
                }
                let value = if d + 1 < self.max_disparity {
                    let before = self.window_cost(left, right, row, col, d - 1) as f64;
                    let after = self.window_cost(left, right, row, col, d + 1) as f64;
                    let curvature = before + after - 2.0 * cost as f64;
                    if curvature > 0.0 {
                        d as f64 + (before - after) / (2.0 * curvature)
                    } else {
                        d as f64
                    }
                } else {
                    d as f64
                };
                disparity[ix] = (value * f64::from(DISPARITY_SCALE)).round() as i16;
                matched += 1;
            }
        }
        debug!(
            "block matching found {} of {} disparities",
            matched,
            width * height
        );
        disparity
    }
}

impl DisparityAlgorithm for BlockMatcher {
    fn compute(&self, left: &GrayImage, right: &GrayImage) -> DisparityMap {
        let (width, height) = (left.width() as usize, left.height() as usize);
        let fixed = self.compute_fixed_point(left, right);
        decode_fixed_point(width, height, &fixed, self.max_disparity as f32)
            .unwrap_or_else(|| DisparityMap::new(width, height))
    }
}
