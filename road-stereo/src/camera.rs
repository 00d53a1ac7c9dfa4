use log::debug;
use road_core::nalgebra::{Point2, Point3};
use road_core::{is_valid_disparity, CloudPoint, DisparityMap, Pixel, PointCloud};
use thiserror::Error;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Reasons a stereo calibration cannot be used.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CalibrationError {
    #[error("focal length must be finite and positive, got {0}")]
    Focal(f64),
    #[error("stereo baseline must be finite and positive, got {0}")]
    Baseline(f64),
    #[error("principal point must be finite, got ({0}, {1})")]
    PrincipalPoint(f64, f64),
}

/// The position and disparity at which a camera-space point is observed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StereoObservation {
    pub row: f64,
    pub col: f64,
    pub disparity: f64,
}

/// Calibration of a rectified stereo pair, expressed in the left camera.
///
/// Both cameras share the focal length and principal point, and the right camera is
/// displaced by `baseline` along positive X. The calibration is fixed for a run.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct StereoCamera {
    /// Focal length in pixels.
    pub focal: f64,
    /// Distance between the optical centers, in the units of the reconstruction.
    pub baseline: f64,
    /// Principal point in pixels, `x` being the column and `y` the row.
    pub principal_point: Point2<f64>,
}

impl Default for StereoCamera {
    /// The calibration of the forward facing stereo rig the default settings were tuned on.
    fn default() -> Self {
        Self {
            focal: 399.9745178222656,
            baseline: 0.2090607502,
            principal_point: Point2::new(474.5, 262.0),
        }
    }
}

impl StereoCamera {
    pub fn new(focal: f64, baseline: f64, principal_point: Point2<f64>) -> Self {
        Self {
            focal,
            baseline,
            principal_point,
        }
    }

    pub fn focal(self, focal: f64) -> Self {
        Self { focal, ..self }
    }

    pub fn baseline(self, baseline: f64) -> Self {
        Self { baseline, ..self }
    }

    pub fn principal_point(self, principal_point: Point2<f64>) -> Self {
        Self {
            principal_point,
            ..self
        }
    }

    /// Checks that the constants describe a usable camera.
    pub fn validate(&self) -> Result<(), CalibrationError> {
        if !(self.focal.is_finite() && self.focal > 0.0) {
            return Err(CalibrationError::Focal(self.focal));
        }
        if !(self.baseline.is_finite() && self.baseline > 0.0) {
            return Err(CalibrationError::Baseline(self.baseline));
        }
        let (x, y) = (self.principal_point.x, self.principal_point.y);
        if !(x.is_finite() && y.is_finite()) {
            return Err(CalibrationError::PrincipalPoint(x, y));
        }
        Ok(())
    }

    /// Depth along the optical axis for a disparity.
    ///
    /// Missing disparities (at or below the sentinel) have no depth.
    pub fn depth(&self, disparity: f64) -> Option<f64> {
        (disparity.is_finite() && disparity > 0.0).then(|| self.focal * self.baseline / disparity)
    }

    /// Reconstructs the camera-space point seen at `(row, col)` with `disparity`.
    pub fn project(&self, row: f64, col: f64, disparity: f64) -> Option<Point3<f64>> {
        let z = self.depth(disparity)?;
        let x = (col - self.principal_point.x) * z / self.focal;
        let y = (row - self.principal_point.y) * z / self.focal;
        Some(Point3::new(x, y, z))
    }

    /// Reconstructs a single disparity pixel, keeping the pixel as a tag.
    pub fn project_pixel(&self, pixel: Pixel, disparity: f32) -> Option<CloudPoint> {
        if !is_valid_disparity(disparity) {
            return None;
        }
        self.project(pixel.row as f64, pixel.col as f64, disparity as f64)
            .map(|point| CloudPoint::new(point, pixel))
    }

    /// Inverse of [`StereoCamera::project`].
    ///
    /// Points on or behind the image plane of the camera are not observable and give `None`.
    pub fn unproject(&self, point: &Point3<f64>) -> Option<StereoObservation> {
        if !(point.z > 0.0) {
            return None;
        }
        Some(StereoObservation {
            row: point.y * self.focal / point.z + self.principal_point.y,
            col: point.x * self.focal / point.z + self.principal_point.x,
            disparity: self.focal * self.baseline / point.z,
        })
    }

    /// Projects every valid pixel of the disparity map into camera space.
    ///
    /// Pixels without a disparity are skipped, so the cloud only contains real points,
    /// ordered row-major by their originating pixel.
    pub fn point_cloud(&self, disparity: &DisparityMap) -> PointCloud {
        let cloud: PointCloud = disparity
            .valid()
            .filter_map(|(pixel, d)| self.project_pixel(pixel, d))
            .collect();
        debug!(
            "projected {} of {} pixels into the point cloud",
            cloud.len(),
            disparity.width() * disparity.height()
        );
        cloud
    }
}
