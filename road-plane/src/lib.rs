//! Detection of the drivable road plane in front of a stereo camera.
//!
//! A frame goes through these stages, each producing a new value for the next:
//!
//! 1. [`road_stereo::StereoCamera::point_cloud`] turns the disparity map into a
//!    [`PointCloud`](road_core::PointCloud).
//! 2. [`RegionSelector`] keeps the points in the image window where the road is
//!    expected and within a plausible depth range.
//! 3. [`Ransac`] with the [`ThreePoint`](three_point::ThreePoint) estimator finds the
//!    plane with the most inliers, which is then refit with
//!    [`LeastSquares`](three_point::LeastSquares).
//! 4. [`BoundaryPolygon`] outlines the inliers in the image.
//! 5. [`FrameReport`] formats the outcome and hands the boundary to an [`Overlay`].
//!
//! [`RoadPlaneDetector`] runs stages 1 to 4 with a fixed [`DetectorSettings`].
//!
//! ```
//! use rand::SeedableRng;
//! use road_core::DisparityMap;
//! use road_plane::{DetectorSettings, RoadPlaneDetector};
//! use road_stereo::StereoCamera;
//!
//! let detector = RoadPlaneDetector::new(StereoCamera::default(), DetectorSettings::default())?;
//! let mut rng = rand::rngs::StdRng::seed_from_u64(0);
//! let detection = detector.detect(&DisparityMap::new(1024, 544), &mut rng);
//! // Nothing to see without disparity.
//! assert!(detection.normal().is_none());
//! # Ok::<(), road_plane::SettingsError>(())
//! ```

mod boundary;
mod consensus;
mod detector;
mod region;
mod report;
mod settings;

pub use boundary::*;
pub use consensus::*;
pub use detector::*;
pub use region::*;
pub use report::*;
pub use settings::*;
