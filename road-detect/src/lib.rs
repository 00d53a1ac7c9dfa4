//! Batch road plane detection over a dataset of rectified stereo image pairs.
//!
//! The [`Dataset`] lists left images in name order and pairs each with its right image.
//! Each pair is matched with a [`DisparityAlgorithm`], the road plane is detected with
//! [`road_plane::RoadPlaneDetector`], and one report line is written per pair. Pairs that
//! can not be read are skipped with a notice while the batch carries on.

mod batch;
mod dataset;
mod error;
mod export;
mod matching;
mod overlay;
mod settings;

pub use batch::*;
pub use dataset::*;
pub use error::*;
pub use export::*;
pub use matching::*;
pub use overlay::*;
pub use settings::*;
