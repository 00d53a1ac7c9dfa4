//! # Road Core
//!
//! Common types shared by the road plane detection crates. A frame flows through
//! these types strictly in one direction:
//!
//! * a [`DisparityMap`] produced by a stereo matcher,
//! * a [`PointCloud`] of [`CloudPoint`]s, each a camera-space point tagged with the
//!   [`Pixel`] it was reconstructed from,
//! * a [`Plane`] fitted to a subset of that cloud.
//!
//! Camera space follows the usual computer vision convention: positive X is right,
//! positive Y is down, and positive Z is forwards from the optical center of the
//! left camera. Units are whatever the stereo baseline is expressed in (metres for
//! the bundled calibration).
//!
//! [`Plane`] implements [`sample_consensus::Model`] so that it can be plugged into any
//! consensus algorithm with an estimator that produces planes.

mod disparity;
mod plane;
mod point;

pub use disparity::*;
pub use nalgebra;
pub use plane::*;
pub use point::*;
pub use sample_consensus;
