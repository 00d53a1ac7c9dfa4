use road_core::{
    nalgebra::{Matrix3, Point3, Vector3},
    Plane,
};

/// Total least-squares plane fitting.
///
/// The fitted plane passes through the centroid of the points and its normal is the
/// eigenvector of the scatter matrix with the smallest eigenvalue.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LeastSquares {
    pub epsilon: f64,
    pub iterations: usize,
    /// Point sets whose second-smallest scatter eigenvalue is below this fraction of the
    /// largest are treated as collinear and not fitted.
    pub degeneracy_ratio: f64,
}

impl LeastSquares {
    pub fn new() -> Self {
        Default::default()
    }

    /// Fits a plane to the points. The normal orientation is arbitrary; orient it with
    /// [`Plane::oriented_towards`].
    ///
    /// Returns `None` for fewer than three points, for (nearly) collinear points, or if
    /// the eigendecomposition does not converge.
    pub fn fit<I>(&self, points: I) -> Option<Plane>
    where
        I: Iterator<Item = Point3<f64>> + Clone,
    {
        let (count, sum) = points
            .clone()
            .fold((0usize, Vector3::zeros()), |(n, sum), p| (n + 1, sum + p.coords));
        if count < 3 {
            return None;
        }
        let centroid = Point3::from(sum / count as f64);
        let scatter = points.fold(Matrix3::zeros(), |scatter, p| {
            let centered = p - centroid;
            scatter + centered * centered.transpose()
        });

        let eigens = scatter.try_symmetric_eigen(self.epsilon, self.iterations)?;
        let mut order = [0usize, 1, 2];
        order.sort_by_key(|&ix| float_ord::FloatOrd(eigens.eigenvalues[ix]));
        let [smallest, middle, largest] = order;
        if !(eigens.eigenvalues[largest] > 0.0)
            || eigens.eigenvalues[middle] <= self.degeneracy_ratio * eigens.eigenvalues[largest]
        {
            return None;
        }
        let normal = eigens.eigenvectors.column(smallest).into_owned();
        Plane::from_normal_and_point(normal, &centroid)
    }
}

impl Default for LeastSquares {
    fn default() -> Self {
        Self {
            epsilon: 1e-12,
            iterations: 1000,
            degeneracy_ratio: 1e-12,
        }
    }
}
