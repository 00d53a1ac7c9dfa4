//! This crate plugs into `road-core` and provides the calibrated geometry of a
//! rectified stereo pair. It converts disparities into camera-space points (and back)
//! and turns a whole [`DisparityMap`](road_core::DisparityMap) into a
//! [`PointCloud`](road_core::PointCloud).
//!
//! For a rectified pair with focal length `f` (pixels), baseline `B` and principal
//! point `(cx, cy)`, a pixel `(row, col)` with disparity `d` reconstructs to
//!
//! ```text
//! Z = f·B / d
//! X = (col − cx)·Z / f
//! Y = (row − cy)·Z / f
//! ```

mod camera;
mod fixed_point;

pub use camera::*;
pub use fixed_point::*;
