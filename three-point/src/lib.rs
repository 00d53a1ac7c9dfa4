//! Plane estimation from three points, and refinement of a plane over many points.
//!
//! [`ThreePoint`] is the minimal solver: exactly three non-collinear points define a
//! plane. It implements [`Estimator`] so that a consensus algorithm can draw minimal
//! samples from a point cloud and score the resulting [`Plane`]s.
//!
//! [`LeastSquares`] fits the plane minimizing the sum of squared perpendicular
//! distances to any number of points, which is used to polish the winning
//! minimal-sample plane with all of its inliers.

mod refine;

pub use refine::*;

use road_core::{nalgebra::Point3, sample_consensus::Estimator, CloudPoint, Plane};

/// Estimates the plane through three points.
///
/// The normal of every estimated plane is oriented so that `viewpoint` (the optical
/// center of the camera by default) lies on its positive side.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ThreePoint {
    /// Samples whose edges are closer to parallel than this (as the sine of the angle
    /// between them) are rejected as collinear.
    pub collinearity_epsilon: f64,
    /// The point that must lie on the positive side of estimated planes.
    pub viewpoint: Point3<f64>,
}

impl ThreePoint {
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the [`ThreePoint::collinearity_epsilon`].
    #[must_use]
    pub fn collinearity_epsilon(self, collinearity_epsilon: f64) -> Self {
        Self {
            collinearity_epsilon,
            ..self
        }
    }

    /// Sets the [`ThreePoint::viewpoint`].
    #[must_use]
    pub fn viewpoint(self, viewpoint: Point3<f64>) -> Self {
        Self { viewpoint, ..self }
    }

    /// Computes the oriented plane through `a`, `b` and `c`, or `None` if they are
    /// (nearly) collinear.
    pub fn from_points(&self, a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Option<Plane> {
        Plane::through_points(a, b, c, self.collinearity_epsilon)
            .map(|plane| plane.oriented_towards(&self.viewpoint))
    }

    fn from_sample(&self, mut data: impl Iterator<Item = Point3<f64>>) -> Option<Plane> {
        let a = data.next()?;
        let b = data.next()?;
        let c = data.next()?;
        self.from_points(&a, &b, &c)
    }
}

impl Default for ThreePoint {
    fn default() -> Self {
        Self {
            collinearity_epsilon: 1e-6,
            viewpoint: Point3::origin(),
        }
    }
}

impl Estimator<CloudPoint> for ThreePoint {
    type Model = Plane;
    type ModelIter = Option<Plane>;
    const MIN_SAMPLES: usize = 3;

    fn estimate<I>(&self, data: I) -> Self::ModelIter
    where
        I: Iterator<Item = CloudPoint> + Clone,
    {
        self.from_sample(data.map(|p| p.point))
    }
}

impl Estimator<Point3<f64>> for ThreePoint {
    type Model = Plane;
    type ModelIter = Option<Plane>;
    const MIN_SAMPLES: usize = 3;

    fn estimate<I>(&self, data: I) -> Self::ModelIter
    where
        I: Iterator<Item = Point3<f64>> + Clone,
    {
        self.from_sample(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use road_core::Pixel;

    #[test]
    fn estimates_oriented_plane() {
        let points = [
            Point3::new(-1.0, 1.2, 4.0),
            Point3::new(1.0, 1.2, 4.0),
            Point3::new(0.0, 1.2, 9.0),
        ];
        let plane = Estimator::<Point3<f64>>::estimate(&ThreePoint::new(), points.iter().copied())
            .unwrap();
        assert!(plane.signed_distance(&Point3::origin()) > 0.0);
        assert!(plane.normal.y < -0.999);
    }

    #[test]
    fn collinear_sample_gives_no_model() {
        let points = [
            CloudPoint::new(Point3::new(0.0, 1.0, 2.0), Pixel::new(0, 0)),
            CloudPoint::new(Point3::new(0.0, 1.0, 4.0), Pixel::new(0, 1)),
            CloudPoint::new(Point3::new(0.0, 1.0, 8.0), Pixel::new(0, 2)),
        ];
        let estimate =
            Estimator::<CloudPoint>::estimate(&ThreePoint::new(), points.iter().copied());
        assert!(estimate.is_none());
    }

    #[test]
    fn short_sample_gives_no_model() {
        let points = [Point3::new(0.0, 1.0, 2.0), Point3::new(1.0, 1.0, 4.0)];
        let estimate =
            Estimator::<Point3<f64>>::estimate(&ThreePoint::new(), points.iter().copied());
        assert!(estimate.is_none());
    }
}
