use road_core::{DisparityMap, NO_DISPARITY};

/// The number of fractional steps per pixel used by fixed-point stereo matchers.
pub const DISPARITY_SCALE: i16 = 16;

/// Decodes a fixed-point disparity image (disparity multiplied by [`DISPARITY_SCALE`])
/// into a [`DisparityMap`] in pixels.
///
/// Zero and negative values (matchers emit `-1 · scale` for "no match") become
/// [`NO_DISPARITY`], and disparities are clamped to `max_disparity`.
/// Returns `None` if `raw` does not match the dimensions.
pub fn decode_fixed_point(
    width: usize,
    height: usize,
    raw: &[i16],
    max_disparity: f32,
) -> Option<DisparityMap> {
    let data = raw
        .iter()
        .map(|&v| {
            if v <= 0 {
                NO_DISPARITY
            } else {
                (v as f32 / DISPARITY_SCALE as f32).min(max_disparity)
            }
        })
        .collect();
    DisparityMap::from_raw(width, height, data)
}
