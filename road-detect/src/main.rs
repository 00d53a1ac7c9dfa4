use log::*;
use road_detect::{Batch, BatchOptions, BlockMatcher, Dataset, RunError, RunSettings};
use road_plane::RoadPlaneDetector;
use std::{
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};
use structopt::StructOpt;

#[derive(StructOpt, Clone)]
#[structopt(
    name = "road-detect",
    about = "Detects the road plane in front of a vehicle in a sequence of stereo pairs"
)]
struct Opt {
    /// The directory containing the left and right image directories.
    #[structopt(parse(from_os_str), default_value = "dataset")]
    dataset: PathBuf,
    /// The name of the left image directory.
    #[structopt(long, default_value = "left-images")]
    left: String,
    /// The name of the right image directory.
    #[structopt(long, default_value = "right-images")]
    right: String,
    /// The file where settings are specified.
    ///
    /// This is JSON in the format of `road_detect::RunSettings`. Defaults are used if it
    /// is not provided.
    #[structopt(short, long, parse(from_os_str))]
    settings: Option<PathBuf>,
    /// The number of RANSAC trials per frame.
    #[structopt(short, long)]
    trials: Option<usize>,
    /// The maximum distance of an inlier from the road plane.
    #[structopt(long)]
    tolerance: Option<f64>,
    /// The minimum number of inliers needed to report a road plane.
    #[structopt(long)]
    minimum_inliers: Option<usize>,
    /// The seed for the random sampler.
    ///
    /// If neither this nor the settings provide one, it is taken from the clock.
    #[structopt(long)]
    seed: Option<u64>,
    /// The number of disparities searched by the stereo matcher.
    #[structopt(long)]
    max_disparity: Option<usize>,
    /// Skip forward to the first left image whose name contains this (e.g. a timestamp).
    #[structopt(long)]
    skip_to: Option<String>,
    /// Dump the point cloud of each frame here (PLY if the extension is .ply, else X Y Z).
    #[structopt(short, long, parse(from_os_str))]
    points: Option<PathBuf>,
    /// Save the left images with the road boundary drawn on them into this directory.
    #[structopt(short, long, parse(from_os_str))]
    overlay: Option<PathBuf>,
}

fn main() {
    pretty_env_logger::init_timed();
    let opt = Opt::from_args();
    if let Err(e) = run(opt) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(opt: Opt) -> Result<(), RunError> {
    let mut settings = RunSettings::load(opt.settings.as_deref())?;
    // Command line options take precedence over the settings file.
    if let Some(trials) = opt.trials {
        settings.detector.trials = trials;
    }
    if let Some(tolerance) = opt.tolerance {
        settings.detector.inlier_threshold = tolerance;
    }
    if let Some(minimum_inliers) = opt.minimum_inliers {
        settings.detector.minimum_inliers = minimum_inliers;
    }
    if let Some(seed) = opt.seed {
        settings.detector.seed = Some(seed);
    }
    if let Some(max_disparity) = opt.max_disparity {
        settings.max_disparity = max_disparity;
    }
    settings.validate()?;

    let seed = settings.detector.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_nanos() as u64)
    });
    info!("random seed {}", seed);

    let detector = RoadPlaneDetector::new(settings.camera, settings.detector)?;
    let matcher = BlockMatcher::new(settings.max_disparity, settings.block_size);
    let options = BatchOptions {
        skip_to: opt.skip_to,
        points: opt.points,
        overlay_dir: opt.overlay,
    };
    if let Some(dir) = &options.overlay_dir {
        std::fs::create_dir_all(dir).map_err(|source| RunError::OutputDir {
            path: dir.clone(),
            source,
        })?;
    }

    let dataset = Dataset::new(&opt.dataset, &opt.left, &opt.right);
    let stdout = std::io::stdout();
    Batch {
        detector: &detector,
        matcher: &matcher,
        options: &options,
        seed,
    }
    .run(&dataset, stdout.lock())?;
    Ok(())
}
