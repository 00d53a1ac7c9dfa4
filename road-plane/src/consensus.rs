use crate::DetectorSettings;
use core::cmp::Reverse;
use float_ord::FloatOrd;
use log::trace;
use rand::{seq::index, RngCore};
use road_core::sample_consensus::{Consensus, Estimator, Model};

/// How well a model explains the data.
///
/// A higher inlier count wins. Equal counts are decided by the lower mean inlier
/// distance, and after that by the earlier trial.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Score {
    pub inliers: usize,
    /// Mean residual of the inliers (infinite without inliers).
    pub mean_distance: f64,
    /// The trial that produced the model.
    pub trial: usize,
}

impl Score {
    fn rank(&self) -> (Reverse<usize>, FloatOrd<f64>, usize) {
        (Reverse(self.inliers), FloatOrd(self.mean_distance), self.trial)
    }

    /// Is this score strictly better than `other`?
    pub fn beats(&self, other: &Score) -> bool {
        self.rank() < other.rank()
    }
}

/// A model from one trial along with the indices of the data it explains.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<M> {
    pub model: M,
    pub inliers: Vec<usize>,
    pub score: Score,
}

/// RANSAC with a fixed trial budget.
///
/// Every trial draws `E::MIN_SAMPLES` distinct data points. A sample the estimator
/// cannot build a model from is redrawn up to `degenerate_retries` times before the
/// trial is given up. The best model over all trials is only accepted if its inliers
/// reach [`Ransac::required_inliers`].
///
/// With the same random number generator state and data the result is always the same.
#[derive(Debug, Clone)]
pub struct Ransac<R> {
    pub trials: usize,
    pub inlier_threshold: f64,
    pub minimum_inliers: usize,
    pub minimum_inlier_ratio: f64,
    pub degenerate_retries: usize,
    rng: R,
}

impl<R> Ransac<R>
where
    R: RngCore,
{
    /// Creates a consensus process that accepts any model with at least one inlier.
    pub fn new(inlier_threshold: f64, rng: R) -> Self {
        Self {
            trials: 500,
            inlier_threshold,
            minimum_inliers: 1,
            minimum_inlier_ratio: 0.0,
            degenerate_retries: 16,
            rng,
        }
    }

    pub fn from_settings(settings: &DetectorSettings, rng: R) -> Self {
        Self::new(settings.inlier_threshold, rng)
            .trials(settings.trials)
            .minimum_inliers(settings.minimum_inliers)
            .minimum_inlier_ratio(settings.minimum_inlier_ratio)
            .degenerate_retries(settings.degenerate_retries)
    }

    #[must_use]
    pub fn trials(self, trials: usize) -> Self {
        Self { trials, ..self }
    }

    #[must_use]
    pub fn minimum_inliers(self, minimum_inliers: usize) -> Self {
        Self {
            minimum_inliers,
            ..self
        }
    }

    #[must_use]
    pub fn minimum_inlier_ratio(self, minimum_inlier_ratio: f64) -> Self {
        Self {
            minimum_inlier_ratio,
            ..self
        }
    }

    #[must_use]
    pub fn degenerate_retries(self, degenerate_retries: usize) -> Self {
        Self {
            degenerate_retries,
            ..self
        }
    }

    pub fn rng(&self) -> &R {
        &self.rng
    }

    pub fn into_rng(self) -> R {
        self.rng
    }

    /// The number of inliers a model needs among `len` data points to be accepted.
    pub fn required_inliers(&self, len: usize) -> usize {
        let by_ratio = (self.minimum_inlier_ratio * len as f64).ceil() as usize;
        self.minimum_inliers.max(by_ratio).max(1)
    }

    pub fn accepts(&self, score: &Score, len: usize) -> bool {
        score.inliers >= self.required_inliers(len)
    }

    /// Runs every trial and returns the best candidate, whether or not it is accepted.
    ///
    /// Returns `None` without drawing any random numbers if there are fewer than
    /// `E::MIN_SAMPLES` data points, and `None` if no trial produced a model.
    pub fn best<E, Data>(&mut self, estimator: &E, data: &[Data]) -> Option<Candidate<E::Model>>
    where
        E: Estimator<Data>,
        Data: Clone,
    {
        if data.len() < E::MIN_SAMPLES {
            return None;
        }
        (0..self.trials)
            .filter_map(|trial| self.trial(estimator, data, trial))
            .reduce(|best, candidate| {
                if candidate.score.beats(&best.score) {
                    candidate
                } else {
                    best
                }
            })
    }

    fn trial<E, Data>(
        &mut self,
        estimator: &E,
        data: &[Data],
        trial: usize,
    ) -> Option<Candidate<E::Model>>
    where
        E: Estimator<Data>,
        Data: Clone,
    {
        for _ in 0..=self.degenerate_retries {
            let sample = index::sample(&mut self.rng, data.len(), E::MIN_SAMPLES).into_vec();
            let best = estimator
                .estimate(sample.iter().map(|&ix| data[ix].clone()))
                .into_iter()
                .map(|model| self.evaluate(model, data, trial))
                .reduce(|best, candidate| {
                    if candidate.score.beats(&best.score) {
                        candidate
                    } else {
                        best
                    }
                });
            if best.is_some() {
                return best;
            }
        }
        trace!(
            "trial {} gave up after {} degenerate samples",
            trial,
            self.degenerate_retries + 1
        );
        None
    }

    /// Scores `model` against all of `data`, attributing it to `trial`.
    pub fn evaluate<M, Data>(&self, model: M, data: &[Data], trial: usize) -> Candidate<M>
    where
        M: Model<Data>,
    {
        let mut total = 0.0;
        let inliers: Vec<usize> = data
            .iter()
            .enumerate()
            .filter_map(|(ix, datum)| {
                let residual = model.residual(datum);
                (residual <= self.inlier_threshold).then(|| {
                    total += residual;
                    ix
                })
            })
            .collect();
        let mean_distance = if inliers.is_empty() {
            f64::INFINITY
        } else {
            total / inliers.len() as f64
        };
        Candidate {
            model,
            score: Score {
                inliers: inliers.len(),
                mean_distance,
                trial,
            },
            inliers,
        }
    }
}

impl<E, R, Data> Consensus<E, Data> for Ransac<R>
where
    E: Estimator<Data>,
    R: RngCore,
    Data: Clone,
{
    type Inliers = Vec<usize>;

    fn model<I>(&mut self, estimator: &E, data: I) -> Option<E::Model>
    where
        I: Iterator<Item = Data> + Clone,
    {
        self.model_inliers(estimator, data).map(|(model, _)| model)
    }

    fn model_inliers<I>(&mut self, estimator: &E, data: I) -> Option<(E::Model, Self::Inliers)>
    where
        I: Iterator<Item = Data> + Clone,
    {
        let data: Vec<Data> = data.collect();
        let candidate = self.best(estimator, &data)?;
        if self.accepts(&candidate.score, data.len()) {
            Some((candidate.model, candidate.inliers))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn score(inliers: usize, mean_distance: f64, trial: usize) -> Score {
        Score {
            inliers,
            mean_distance,
            trial,
        }
    }

    #[test]
    fn more_inliers_win() {
        assert!(score(10, 0.5, 9).beats(&score(9, 0.0, 0)));
        assert!(!score(9, 0.0, 0).beats(&score(10, 0.5, 9)));
    }

    #[test]
    fn ties_prefer_closer_then_earlier() {
        assert!(score(10, 0.1, 5).beats(&score(10, 0.2, 1)));
        assert!(score(10, 0.1, 1).beats(&score(10, 0.1, 5)));
        assert!(!score(10, 0.1, 1).beats(&score(10, 0.1, 1)));
        assert!(score(1, 0.0, 0).beats(&score(0, f64::INFINITY, 0)));
    }

    #[test]
    fn required_inliers_uses_the_larger_bound() {
        let ransac = Ransac::new(0.1, Xoshiro256PlusPlus::seed_from_u64(0))
            .minimum_inliers(64)
            .minimum_inlier_ratio(0.2);
        assert_eq!(ransac.required_inliers(100), 64);
        assert_eq!(ransac.required_inliers(1000), 200);
        assert_eq!(ransac.required_inliers(1001), 201);
        let lenient = Ransac::new(0.1, Xoshiro256PlusPlus::seed_from_u64(0));
        assert_eq!(lenient.required_inliers(0), 1);
    }
}
