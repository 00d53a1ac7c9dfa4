use derive_more::{AsMut, AsRef, Deref, DerefMut, From, Into};
use nalgebra::Point3;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// An integer pixel location. `row` grows downwards and `col` grows to the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Pixel {
    pub row: usize,
    pub col: usize,
}

impl Pixel {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// A camera-space point reconstructed from a single disparity pixel.
///
/// The originating pixel is kept so that anything selected in 3D can be
/// located in the image again without reprojecting.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct CloudPoint {
    pub point: Point3<f64>,
    pub pixel: Pixel,
}

impl CloudPoint {
    pub fn new(point: Point3<f64>, pixel: Pixel) -> Self {
        Self { point, pixel }
    }

    /// Depth along the optical axis.
    pub fn depth(&self) -> f64 {
        self.point.z
    }
}

/// An ordered set of reconstructed points, one per valid disparity pixel.
///
/// Pixels without a disparity never appear in the cloud; there are no
/// placeholder entries.
#[derive(Debug, Clone, Default, PartialEq, AsMut, AsRef, Deref, DerefMut, From, Into)]
pub struct PointCloud(pub Vec<CloudPoint>);

impl PointCloud {
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterates over the 3d coordinates.
    pub fn points(&self) -> impl Iterator<Item = Point3<f64>> + Clone + '_ {
        self.0.iter().map(|p| p.point)
    }

    /// Iterates over the originating pixels, parallel to [`PointCloud::points`].
    pub fn pixels(&self) -> impl Iterator<Item = Pixel> + Clone + '_ {
        self.0.iter().map(|p| p.pixel)
    }

    /// Collects the points at the given indices into a new cloud, in the order given.
    ///
    /// Panics if an index is out of bounds.
    pub fn select(&self, indices: impl IntoIterator<Item = usize>) -> Self {
        Self(indices.into_iter().map(|ix| self.0[ix]).collect())
    }
}

impl FromIterator<CloudPoint> for PointCloud {
    fn from_iter<I: IntoIterator<Item = CloudPoint>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
