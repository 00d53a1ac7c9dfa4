use crate::{
    write_point_cloud, Dataset, DisparityAlgorithm, FrameError, ImageOverlay, RunError,
    StereoPair,
};
use image::RgbImage;
use log::{debug, info, warn};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use road_plane::{FrameReport, RoadPlaneDetector};
use std::{io::Write, path::PathBuf};

/// Printed after the left image name when a frame can not be processed.
pub const SKIP_NOTICE: &str = "-- files skipped (perhaps one is missing or not PNG)";

/// Optional outputs and frame selection for a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOptions {
    /// Start at the first left image whose name contains this.
    pub skip_to: Option<String>,
    /// Dump each frame's point cloud here, overwriting the previous frame.
    pub points: Option<PathBuf>,
    /// Save each left image with its road boundary into this directory.
    pub overlay_dir: Option<PathBuf>,
}

/// Counts of what happened to the frames of a run.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub processed: usize,
    pub detected: usize,
    pub skipped: usize,
}

/// Derives the seed of a frame's sampler from the run seed and the left image name.
///
/// A frame gets the same random draws no matter which frames ran before it.
pub fn frame_seed(seed: u64, left_name: &str) -> u64 {
    // FNV-1a
    left_name.bytes().fold(seed ^ 0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

/// Runs road detection over one stereo pair at a time.
pub struct Batch<'a, A> {
    pub detector: &'a RoadPlaneDetector,
    pub matcher: &'a A,
    pub options: &'a BatchOptions,
    /// Every frame samples from its own generator seeded by [`frame_seed`].
    pub seed: u64,
}

impl<'a, A> Batch<'a, A>
where
    A: DisparityAlgorithm,
{
    /// Processes every pair of `dataset` in order, writing a report line or a skip
    /// notice per pair to `out`.
    ///
    /// Frames that fail are skipped. Only a dataset that can not be listed or an output
    /// that can not be written stops the run.
    pub fn run(&self, dataset: &Dataset, mut out: impl Write) -> Result<Summary, RunError> {
        let pairs = dataset.pairs(self.options.skip_to.as_deref())?;
        info!("processing {} stereo pairs", pairs.len());
        let mut summary = Summary::default();
        for pair in &pairs {
            match self.frame(pair) {
                Ok(report) => {
                    summary.processed += 1;
                    if report.normal.is_some() {
                        summary.detected += 1;
                    }
                    writeln!(out, "{}", report).map_err(RunError::Report)?;
                }
                Err(e) => {
                    summary.skipped += 1;
                    warn!("skipping {}: {}", pair.left_name, e);
                    writeln!(out, "{} {}", pair.left_name, SKIP_NOTICE).map_err(RunError::Report)?;
                }
            }
        }
        info!(
            "{} frames processed, {} with a road plane, {} skipped",
            summary.processed, summary.detected, summary.skipped
        );
        Ok(summary)
    }

    /// Detects the road in one stereo pair.
    ///
    /// Only unusable input is an error. Failing to write the point dump or the overlay
    /// is logged and the report is still returned.
    pub fn frame(&self, pair: &StereoPair) -> Result<FrameReport, FrameError> {
        pair.check()?;
        let left = open_rgb(&pair.left)?;
        let right = open_rgb(&pair.right)?;
        if left.dimensions() != right.dimensions() {
            return Err(FrameError::DimensionMismatch {
                left: left.dimensions(),
                right: right.dimensions(),
            });
        }
        info!("loaded {} and {}", pair.left_name, pair.right_name);

        let disparity = self.matcher.compute(
            &image::imageops::grayscale(&left),
            &image::imageops::grayscale(&right),
        );
        let seed = frame_seed(self.seed, &pair.left_name);
        debug!("sampling {} with seed {}", pair.left_name, seed);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let detection = self.detector.detect(&disparity, &mut rng);
        if let Some(path) = &self.options.points {
            if let Err(e) = write_point_cloud(path, &detection.cloud, &left) {
                warn!("{}", e);
            }
        }

        let report = FrameReport::new(
            pair.left_name.clone(),
            pair.right_name.clone(),
            detection.normal(),
            detection.boundary().cloned(),
        );
        if let Some(dir) = &self.options.overlay_dir {
            let mut overlay = left;
            report.render(&mut ImageOverlay::new(&mut overlay));
            let path = dir.join(&pair.left_name);
            if let Err(source) = overlay.save(&path) {
                warn!("{}", FrameError::Overlay { path, source });
            }
        }
        Ok(report)
    }
}

fn open_rgb(path: &std::path::Path) -> Result<RgbImage, FrameError> {
    image::open(path)
        .map(|image| image.to_rgb8())
        .map_err(|source| FrameError::Image {
            path: path.to_owned(),
            source,
        })
}
