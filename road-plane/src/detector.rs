use crate::{
    BoundaryPolygon, Candidate, CandidateRegion, DetectorSettings, InsufficientPoints, Ransac,
    RegionSelector, Score, SettingsError, Window,
};
use log::{debug, info};
use rand::RngCore;
use road_core::{
    nalgebra::{Point3, UnitVector3, Vector3},
    CloudPoint, DisparityMap, Plane, PointCloud,
};
use road_stereo::StereoCamera;
use three_point::{LeastSquares, ThreePoint};

/// The road plane found in a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadPlane {
    /// Oriented so the camera is on its positive side.
    pub plane: Plane,
    /// The image window the candidate points were taken from.
    pub window: Window,
    /// The number of candidate points the plane was fitted to.
    pub candidates: usize,
    /// The candidate points within the inlier threshold of `plane`.
    pub inliers: PointCloud,
    pub score: Score,
    /// Whether `plane` is the least-squares refit rather than the minimal sample plane.
    pub refined: bool,
    /// `None` when the inliers cover fewer than three distinct pixels or lie on one line.
    pub boundary: Option<BoundaryPolygon>,
}

impl RoadPlane {
    pub fn normal(&self) -> UnitVector3<f64> {
        self.plane.normal
    }
}

/// Why a frame has no road plane. Neither is an error; the frame still gets reported.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoPlane {
    /// Fewer than three usable points were in the region of interest.
    InsufficientPoints(InsufficientPoints),
    /// No trial found a plane with enough inliers.
    BelowThreshold {
        /// The best score seen, if any trial produced a plane at all.
        best: Option<Score>,
        required: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Plane(RoadPlane),
    NoPlane(NoPlane),
}

/// Everything produced from one disparity map.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// The full point cloud of the frame.
    pub cloud: PointCloud,
    pub outcome: Outcome,
}

impl Detection {
    pub fn road(&self) -> Option<&RoadPlane> {
        match &self.outcome {
            Outcome::Plane(road) => Some(road),
            Outcome::NoPlane(_) => None,
        }
    }

    pub fn normal(&self) -> Option<UnitVector3<f64>> {
        self.road().map(RoadPlane::normal)
    }

    /// The unit road normal, or exactly the zero vector if no road was found.
    pub fn normal_or_zero(&self) -> Vector3<f64> {
        self.normal()
            .map(|n| n.into_inner())
            .unwrap_or_else(Vector3::zeros)
    }

    pub fn boundary(&self) -> Option<&BoundaryPolygon> {
        self.road().and_then(|road| road.boundary.as_ref())
    }
}

/// Finds the road plane in disparity maps.
///
/// The detector is built once per run from the calibration and settings, which are
/// validated up front and never change afterwards. All per frame state lives in the
/// returned [`Detection`], so frames are independent of each other.
#[derive(Debug, Clone)]
pub struct RoadPlaneDetector {
    camera: StereoCamera,
    settings: DetectorSettings,
    selector: RegionSelector,
    estimator: ThreePoint,
    refiner: LeastSquares,
}

impl RoadPlaneDetector {
    pub fn new(camera: StereoCamera, settings: DetectorSettings) -> Result<Self, SettingsError> {
        camera.validate()?;
        settings.validate()?;
        Ok(Self {
            camera,
            settings,
            selector: RegionSelector::from_settings(&settings),
            estimator: ThreePoint::new().collinearity_epsilon(settings.collinearity_epsilon),
            refiner: LeastSquares::new(),
        })
    }

    pub fn camera(&self) -> &StereoCamera {
        &self.camera
    }

    pub fn settings(&self) -> &DetectorSettings {
        &self.settings
    }

    /// Runs the whole pipeline on one disparity map.
    pub fn detect<R>(&self, disparity: &DisparityMap, rng: &mut R) -> Detection
    where
        R: RngCore,
    {
        let cloud = self.camera.point_cloud(disparity);
        let outcome = self.detect_cloud(&cloud, disparity.width(), disparity.height(), rng);
        Detection { cloud, outcome }
    }

    /// Runs region selection and plane estimation on an already projected point cloud
    /// from an image of `width`×`height` pixels.
    pub fn detect_cloud<R>(
        &self,
        cloud: &PointCloud,
        width: usize,
        height: usize,
        rng: &mut R,
    ) -> Outcome
    where
        R: RngCore,
    {
        let outcome = match self.selector.select(cloud, width, height) {
            Ok(region) => self.estimate(&region, rng),
            Err(insufficient) => Outcome::NoPlane(NoPlane::InsufficientPoints(insufficient)),
        };
        match &outcome {
            Outcome::Plane(road) => info!(
                "road plane {:?} with {} of {} candidate points (refined: {})",
                road.plane.coefficients(),
                road.score.inliers,
                road.candidates,
                road.refined
            ),
            Outcome::NoPlane(reason) => info!("no road plane: {:?}", reason),
        }
        outcome
    }

    /// Fits the road plane to a candidate region.
    pub fn estimate<R>(&self, region: &CandidateRegion, rng: &mut R) -> Outcome
    where
        R: RngCore,
    {
        let points: &[_] = region.points();
        let mut ransac = Ransac::from_settings(&self.settings, &mut *rng);
        let required = ransac.required_inliers(points.len());
        let best = match ransac.best(&self.estimator, points) {
            Some(best) if ransac.accepts(&best.score, points.len()) => best,
            best => {
                return Outcome::NoPlane(NoPlane::BelowThreshold {
                    best: best.map(|candidate| candidate.score),
                    required,
                })
            }
        };
        debug!(
            "trial {} won with {} inliers at mean distance {}",
            best.score.trial, best.score.inliers, best.score.mean_distance
        );

        let (winner, refined) = match self.refine(&ransac, points, &best) {
            Some(refit) => (refit, true),
            None => (best, false),
        };
        let inliers = region.points().select(winner.inliers.iter().copied());
        let boundary = BoundaryPolygon::convex_hull(inliers.pixels());
        if boundary.is_none() {
            debug!("inlier pixels do not span an area, boundary omitted");
        }
        Outcome::Plane(RoadPlane {
            plane: winner.model,
            window: region.window(),
            candidates: points.len(),
            inliers,
            score: winner.score,
            refined,
            boundary,
        })
    }

    /// Refits the plane to the inliers of `best` and recomputes the inliers once.
    ///
    /// The refit is only kept while it still meets the acceptance threshold.
    fn refine<G>(
        &self,
        ransac: &Ransac<G>,
        points: &[CloudPoint],
        best: &Candidate<Plane>,
    ) -> Option<Candidate<Plane>>
    where
        G: RngCore,
    {
        if !self.settings.refine {
            return None;
        }
        let refit = self
            .refiner
            .fit(best.inliers.iter().map(|&ix| points[ix].point))?
            .oriented_towards(&Point3::origin());
        let candidate = ransac.evaluate(refit, points, best.score.trial);
        if ransac.accepts(&candidate.score, points.len()) {
            debug!(
                "refit kept {} inliers at mean distance {}",
                candidate.score.inliers, candidate.score.mean_distance
            );
            Some(candidate)
        } else {
            debug!("refit lost too many inliers, keeping the sampled plane");
            None
        }
    }
}
