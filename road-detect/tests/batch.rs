use image::{Rgb, RgbImage};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use road_detect::{
    frame_seed, Batch, BatchOptions, BlockMatcher, Dataset, RunSettings, SKIP_NOTICE,
};
use road_plane::RoadPlaneDetector;
use std::{fs, path::Path};

const WIDTH: u32 = 64;
const HEIGHT: u32 = 48;

/// Writes a noise texture as the left image and the same texture moved 4 pixels to the
/// left as the right image.
fn write_pair(dataset: &Dataset, stem: &str, with_right: bool, rng: &mut impl Rng) {
    let noise: Vec<u8> = (0..(WIDTH + 4) * HEIGHT).map(|_| rng.gen()).collect();
    let texture = |x: u32, y: u32| {
        let v = noise[(y * (WIDTH + 4) + x) as usize];
        Rgb([v, v / 2, 255 - v])
    };
    RgbImage::from_fn(WIDTH, HEIGHT, |x, y| texture(x, y))
        .save(dataset.left_dir.join(format!("{}_L.png", stem)))
        .unwrap();
    if with_right {
        RgbImage::from_fn(WIDTH, HEIGHT, |x, y| texture(x + 4, y))
            .save(dataset.right_dir.join(format!("{}_R.png", stem)))
            .unwrap();
    }
}

fn dataset(root: &Path) -> Dataset {
    let dataset = Dataset::new(root, "left-images", "right-images");
    fs::create_dir_all(&dataset.left_dir).unwrap();
    fs::create_dir_all(&dataset.right_dir).unwrap();
    dataset
}

fn run(dataset: &Dataset, options: &BatchOptions) -> (String, road_detect::Summary) {
    run_with(RunSettings::default(), dataset, options)
}

fn run_with(
    settings: RunSettings,
    dataset: &Dataset,
    options: &BatchOptions,
) -> (String, road_detect::Summary) {
    let detector = RoadPlaneDetector::new(settings.camera, settings.detector).unwrap();
    let matcher = BlockMatcher::new(8, 5);
    let mut out = Vec::new();
    let summary = Batch {
        detector: &detector,
        matcher: &matcher,
        options,
        seed: 0,
    }
    .run(dataset, &mut out)
    .unwrap();
    (String::from_utf8(out).unwrap(), summary)
}

#[test]
fn missing_right_image_is_skipped_and_batch_continues() {
    let root = tempfile::tempdir().unwrap();
    let dataset = dataset(root.path());
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
    write_pair(&dataset, "1506942475.481834", true, &mut rng);
    write_pair(&dataset, "1506942475.981834", false, &mut rng);
    write_pair(&dataset, "1506942476.481834", true, &mut rng);
    fs::write(dataset.left_dir.join("notes.txt"), "not an image").unwrap();

    let (output, summary) = run(&dataset, &BatchOptions::default());
    let lines: Vec<_> = output.lines().collect();
    assert_eq!(lines.len(), 4, "{}", output);
    assert!(lines[0].starts_with(
        "1506942475.481834_L.png 1506942475.481834_R.png : road surface normal ("
    ));
    assert_eq!(lines[1], format!("1506942475.981834_L.png {}", SKIP_NOTICE));
    assert!(lines[2].starts_with(
        "1506942476.481834_L.png 1506942476.481834_R.png : road surface normal ("
    ));
    assert_eq!(lines[3], format!("notes.txt {}", SKIP_NOTICE));
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.skipped, 2);
}

#[test]
fn unreadable_image_is_skipped() {
    let root = tempfile::tempdir().unwrap();
    let dataset = dataset(root.path());
    fs::write(dataset.left_dir.join("a_L.png"), "garbage").unwrap();
    fs::write(dataset.right_dir.join("a_R.png"), "garbage").unwrap();
    let (output, summary) = run(&dataset, &BatchOptions::default());
    assert_eq!(output.trim_end(), format!("a_L.png {}", SKIP_NOTICE));
    assert_eq!(summary.skipped, 1);
}

#[test]
fn skip_to_and_outputs() {
    let root = tempfile::tempdir().unwrap();
    let dataset = dataset(root.path());
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(2);
    for stem in ["100", "200", "300"] {
        write_pair(&dataset, stem, true, &mut rng);
    }
    let overlay_dir = root.path().join("overlay");
    fs::create_dir(&overlay_dir).unwrap();
    let points = root.path().join("3d_points.txt");
    let options = BatchOptions {
        skip_to: Some("200".to_owned()),
        points: Some(points.clone()),
        overlay_dir: Some(overlay_dir.clone()),
    };

    let (output, summary) = run(&dataset, &options);
    assert_eq!(output.lines().count(), 2);
    assert!(output.starts_with("200_L.png 200_R.png"));
    assert_eq!(summary.processed, 2);
    assert!(points.is_file());
    assert!(!overlay_dir.join("100_L.png").exists());
    for name in ["200_L.png", "300_L.png"] {
        let saved = image::open(overlay_dir.join(name)).unwrap().to_rgb8();
        assert_eq!(saved.dimensions(), (WIDTH, HEIGHT));
    }
}

#[test]
fn unwritable_outputs_still_report_the_frame() {
    let root = tempfile::tempdir().unwrap();
    let dataset = dataset(root.path());
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
    write_pair(&dataset, "100", true, &mut rng);
    let (expected, _) = run(&dataset, &BatchOptions::default());

    // A directory can not be replaced by the point dump, and the overlay directory is
    // missing.
    let options = BatchOptions {
        skip_to: None,
        points: Some(root.path().to_owned()),
        overlay_dir: Some(root.path().join("missing").join("overlay")),
    };
    let (output, summary) = run(&dataset, &options);
    assert_eq!(output, expected);
    assert!(!output.contains(SKIP_NOTICE));
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.skipped, 0);
}

#[test]
fn frame_result_does_not_depend_on_earlier_frames() {
    let root = tempfile::tempdir().unwrap();
    let dataset = dataset(root.path());
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(4);
    for stem in ["100", "200"] {
        write_pair(&dataset, stem, true, &mut rng);
    }
    let mut settings = RunSettings::default();
    settings.detector.trials = 5;
    settings.detector.refine = false;

    let (full, _) = run_with(settings, &dataset, &BatchOptions::default());
    let skipped = BatchOptions {
        skip_to: Some("200".to_owned()),
        ..Default::default()
    };
    let (resumed, _) = run_with(settings, &dataset, &skipped);
    let frame = |output: &str| {
        output
            .lines()
            .find(|line| line.starts_with("200_L.png"))
            .map(str::to_owned)
    };
    assert!(frame(&full).is_some());
    assert_eq!(frame(&full), frame(&resumed));
}

#[test]
fn frame_seeds_depend_on_run_seed_and_name() {
    assert_eq!(frame_seed(7, "200_L.png"), frame_seed(7, "200_L.png"));
    assert_ne!(frame_seed(7, "200_L.png"), frame_seed(7, "300_L.png"));
    assert_ne!(frame_seed(7, "200_L.png"), frame_seed(8, "200_L.png"));
}
