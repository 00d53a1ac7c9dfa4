use crate::RegionOfInterest;
use road_stereo::CalibrationError;
use thiserror::Error;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Settings that make a detector unusable. These are fatal for a run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    #[error("invalid calibration: {0}")]
    Calibration(#[from] CalibrationError),
    #[error("the trial budget must be at least one trial")]
    NoTrials,
    #[error("inlier threshold must be finite and positive, got {0}")]
    InlierThreshold(f64),
    #[error("minimum inlier ratio must lie in [0, 1], got {0}")]
    InlierRatio(f64),
    #[error("collinearity epsilon must be finite and non-negative, got {0}")]
    CollinearityEpsilon(f64),
    #[error(
        "region of interest {0:?} must be a non-empty window that does not cover the whole image"
    )]
    Region(RegionOfInterest),
    #[error("depth range [{0}, {1}] must be finite, positive and non-empty")]
    DepthRange(f64, f64),
    #[error("the pixel sample step must be at least one")]
    SampleStep,
    #[error("adaptive growth step must be finite and positive, got {0}")]
    AdaptiveStep(f64),
    #[error("adaptive top limit {limit} must lie in [0, {top}]")]
    AdaptiveTopLimit { limit: f64, top: f64 },
}

/// The settings for road plane detection.
///
/// These are fixed for a run and handed to the detector once; nothing changes them
/// while frames are processed.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DetectorSettings {
    /// The number of RANSAC trials per frame
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_trials"))]
    pub trials: usize,
    /// The maximum perpendicular distance of an inlier from the plane
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_inlier_threshold")
    )]
    pub inlier_threshold: f64,
    /// The minimum number of inliers needed to report a plane
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_minimum_inliers"))]
    pub minimum_inliers: usize,
    /// The minimum ratio of inliers to candidate points needed to report a plane
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_minimum_inlier_ratio")
    )]
    pub minimum_inlier_ratio: f64,
    /// The number of times a degenerate sample is redrawn before a trial is given up
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_degenerate_retries")
    )]
    pub degenerate_retries: usize,
    /// The sine of the angle below which two sample edges are considered parallel
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_collinearity_epsilon")
    )]
    pub collinearity_epsilon: f64,
    /// Refit the winning plane to all of its inliers with least squares
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_refine"))]
    pub refine: bool,
    /// The image window searched for the road
    #[cfg_attr(feature = "serde-serialize", serde(default))]
    pub region: RegionOfInterest,
    /// The nearest depth considered part of the road
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_min_depth"))]
    pub min_depth: f64,
    /// The furthest depth considered part of the road
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_max_depth"))]
    pub max_depth: f64,
    /// Only every `sample_step`-th row and column of the window is used
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_sample_step"))]
    pub sample_step: usize,
    /// Grow the window upwards while it holds fewer points than this (0 disables growth)
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_adaptive_minimum_points")
    )]
    pub adaptive_minimum_points: usize,
    /// The fraction of the image height the window grows by each time
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_adaptive_step"))]
    pub adaptive_step: f64,
    /// The highest the top of the window may grow to, as a fraction of the image height
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_adaptive_top_limit")
    )]
    pub adaptive_top_limit: f64,
    /// The seed of the random sampler, or `None` to seed from the clock
    #[cfg_attr(feature = "serde-serialize", serde(default))]
    pub seed: Option<u64>,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            trials: default_trials(),
            inlier_threshold: default_inlier_threshold(),
            minimum_inliers: default_minimum_inliers(),
            minimum_inlier_ratio: default_minimum_inlier_ratio(),
            degenerate_retries: default_degenerate_retries(),
            collinearity_epsilon: default_collinearity_epsilon(),
            refine: default_refine(),
            region: RegionOfInterest::default(),
            min_depth: default_min_depth(),
            max_depth: default_max_depth(),
            sample_step: default_sample_step(),
            adaptive_minimum_points: default_adaptive_minimum_points(),
            adaptive_step: default_adaptive_step(),
            adaptive_top_limit: default_adaptive_top_limit(),
            seed: None,
        }
    }
}

impl DetectorSettings {
    /// Checks every setting, returning the first one that is unusable.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.trials == 0 {
            return Err(SettingsError::NoTrials);
        }
        if !(self.inlier_threshold.is_finite() && self.inlier_threshold > 0.0) {
            return Err(SettingsError::InlierThreshold(self.inlier_threshold));
        }
        if !(0.0..=1.0).contains(&self.minimum_inlier_ratio) {
            return Err(SettingsError::InlierRatio(self.minimum_inlier_ratio));
        }
        if !(self.collinearity_epsilon.is_finite() && self.collinearity_epsilon >= 0.0) {
            return Err(SettingsError::CollinearityEpsilon(self.collinearity_epsilon));
        }
        if !self.region.is_valid() {
            return Err(SettingsError::Region(self.region));
        }
        if !(self.min_depth.is_finite()
            && self.max_depth.is_finite()
            && self.min_depth > 0.0
            && self.min_depth < self.max_depth)
        {
            return Err(SettingsError::DepthRange(self.min_depth, self.max_depth));
        }
        if self.sample_step == 0 {
            return Err(SettingsError::SampleStep);
        }
        if self.adaptive_minimum_points > 0 {
            if !(self.adaptive_step.is_finite() && self.adaptive_step > 0.0) {
                return Err(SettingsError::AdaptiveStep(self.adaptive_step));
            }
            let grown = RegionOfInterest {
                top: self.adaptive_top_limit,
                ..self.region
            };
            if !(0.0..=self.region.top).contains(&self.adaptive_top_limit) || !grown.is_valid() {
                return Err(SettingsError::AdaptiveTopLimit {
                    limit: self.adaptive_top_limit,
                    top: self.region.top,
                });
            }
        }
        Ok(())
    }
}

fn default_trials() -> usize {
    500
}

fn default_inlier_threshold() -> f64 {
    0.04
}

fn default_minimum_inliers() -> usize {
    64
}

fn default_minimum_inlier_ratio() -> f64 {
    0.2
}

fn default_degenerate_retries() -> usize {
    16
}

fn default_collinearity_epsilon() -> f64 {
    1e-6
}

fn default_refine() -> bool {
    true
}

fn default_min_depth() -> f64 {
    1.0
}

fn default_max_depth() -> f64 {
    40.0
}

fn default_sample_step() -> usize {
    1
}

fn default_adaptive_minimum_points() -> usize {
    0
}

fn default_adaptive_step() -> f64 {
    0.05
}

fn default_adaptive_top_limit() -> f64 {
    0.4
}
