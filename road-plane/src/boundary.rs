use road_core::Pixel;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// A closed convex polygon in image coordinates around the road inliers.
///
/// Vertices are in counter-clockwise order when viewed with the row axis pointing up,
/// which is clockwise on screen. The last vertex connects back to the first.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryPolygon {
    vertices: Vec<Pixel>,
}

impl BoundaryPolygon {
    /// Computes the convex hull of `pixels` with the monotone chain algorithm.
    ///
    /// Duplicate pixels and vertices lying on a hull edge are dropped. Returns `None`
    /// if fewer than three vertices remain, i.e. all pixels lie on one line.
    pub fn convex_hull(pixels: impl IntoIterator<Item = Pixel>) -> Option<Self> {
        let mut points: Vec<(i64, i64)> = pixels
            .into_iter()
            .map(|p| (p.col as i64, p.row as i64))
            .collect();
        points.sort_unstable();
        points.dedup();
        if points.len() < 3 {
            return None;
        }

        let mut lower: Vec<(i64, i64)> = Vec::with_capacity(points.len());
        for &p in &points {
            push_turning(&mut lower, p);
        }
        let mut upper: Vec<(i64, i64)> = Vec::with_capacity(points.len());
        for &p in points.iter().rev() {
            push_turning(&mut upper, p);
        }
        // The endpoints of each chain are the first points of the other.
        lower.pop();
        upper.pop();
        lower.append(&mut upper);

        if lower.len() < 3 {
            return None;
        }
        let vertices = lower
            .into_iter()
            .map(|(col, row)| Pixel::new(row as usize, col as usize))
            .collect();
        Some(Self { vertices })
    }

    pub fn vertices(&self) -> &[Pixel] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Iterates over the edges, including the closing edge from the last vertex to the first.
    pub fn edges(&self) -> impl Iterator<Item = (Pixel, Pixel)> + '_ {
        self.vertices
            .iter()
            .copied()
            .zip(self.vertices.iter().copied().cycle().skip(1))
    }

    /// Is the pixel inside or on the boundary?
    pub fn contains(&self, pixel: Pixel) -> bool {
        let p = (pixel.col as i64, pixel.row as i64);
        self.edges().all(|(a, b)| {
            let a = (a.col as i64, a.row as i64);
            let b = (b.col as i64, b.row as i64);
            cross(a, b, p) >= 0
        })
    }

    /// The enclosed area in square pixels.
    pub fn area(&self) -> f64 {
        let twice: i64 = self
            .edges()
            .map(|(a, b)| a.col as i64 * b.row as i64 - b.col as i64 * a.row as i64)
            .sum();
        twice.abs() as f64 / 2.0
    }
}

/// Pushes `p` onto a hull chain, first removing points that would not make a strict
/// left turn.
fn push_turning(chain: &mut Vec<(i64, i64)>, p: (i64, i64)) {
    while chain.len() >= 2 && cross(chain[chain.len() - 2], chain[chain.len() - 1], p) <= 0 {
        chain.pop();
    }
    chain.push(p);
}

/// Z component of `(a - o) × (b - o)`.
fn cross(o: (i64, i64), a: (i64, i64), b: (i64, i64)) -> i64 {
    (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
}
