use crate::CloudPoint;
use nalgebra::{Point3, Unit, UnitVector3, Vector3};
use sample_consensus::Model;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// A plane `a·X + b·Y + c·Z = d` with a unit normal `(a, b, c)` and offset `d`.
///
/// The offset is the signed distance of the plane from the origin along the
/// normal. [`Plane::signed_distance`] is positive on the side the normal points to.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Plane {
    pub normal: UnitVector3<f64>,
    pub offset: f64,
}

impl Plane {
    pub fn new(normal: UnitVector3<f64>, offset: f64) -> Self {
        Self { normal, offset }
    }

    /// Creates the plane with the given (not necessarily normalized) normal that
    /// passes through `point`.
    ///
    /// Returns `None` if the normal has no usable length.
    pub fn from_normal_and_point(normal: Vector3<f64>, point: &Point3<f64>) -> Option<Self> {
        let normal = Unit::try_new(normal, f64::EPSILON)?;
        let offset = normal.dot(&point.coords);
        offset.is_finite().then(|| Self { normal, offset })
    }

    /// Computes the plane passing through three points with the two-edge cross product.
    ///
    /// `epsilon` bounds the sine of the angle between the two edges `b - a` and `c - a`.
    /// If the edges are closer to parallel than that (or an edge has zero length),
    /// the points are considered collinear and `None` is returned, since they do not
    /// define a unique plane.
    pub fn through_points(
        a: &Point3<f64>,
        b: &Point3<f64>,
        c: &Point3<f64>,
        epsilon: f64,
    ) -> Option<Self> {
        let ab = b - a;
        let ac = c - a;
        let normal = ab.cross(&ac);
        let scale = ab.norm() * ac.norm();
        if !(scale > 0.0) || normal.norm() <= epsilon * scale {
            return None;
        }
        Self::from_normal_and_point(normal, a)
    }

    /// The coefficients `[a, b, c, d]`.
    pub fn coefficients(&self) -> [f64; 4] {
        [self.normal.x, self.normal.y, self.normal.z, self.offset]
    }

    /// Signed perpendicular distance of `point` from the plane.
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) - self.offset
    }

    /// Perpendicular distance of `point` from the plane.
    pub fn distance(&self, point: &Point3<f64>) -> f64 {
        self.signed_distance(point).abs()
    }

    /// The same plane with the normal reversed.
    #[must_use]
    pub fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            offset: -self.offset,
        }
    }

    /// Orients the normal so that `viewpoint` lies on the positive side.
    ///
    /// A plane that passes exactly through `viewpoint` has no preferred side; its
    /// normal is made to point up in camera space (negative Y) instead.
    #[must_use]
    pub fn oriented_towards(self, viewpoint: &Point3<f64>) -> Self {
        let side = self.signed_distance(viewpoint);
        if side < 0.0 || (side == 0.0 && self.normal.y > 0.0) {
            self.flipped()
        } else {
            self
        }
    }

    /// The angle in radians between the normals of two planes, in `[0, π]`.
    pub fn angle_to(&self, other: &Plane) -> f64 {
        self.normal.dot(&other.normal).clamp(-1.0, 1.0).acos()
    }
}

impl Model<CloudPoint> for Plane {
    fn residual(&self, data: &CloudPoint) -> f64 {
        self.distance(&data.point)
    }
}

impl Model<Point3<f64>> for Plane {
    fn residual(&self, data: &Point3<f64>) -> f64 {
        self.distance(data)
    }
}
