use rand::{Rng, RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use road_core::{
    nalgebra::{Point3, Unit, Vector3},
    sample_consensus::Consensus,
    Plane,
};
use road_plane::Ransac;
use three_point::ThreePoint;

const ON_PLANE: usize = 300;
const OUTLIERS: usize = 60;
const THRESHOLD: f64 = 0.01;

/// Points on a tilted plane below the camera followed by points pushed off it.
fn scene(rng: &mut impl Rng) -> (Plane, Vec<Point3<f64>>) {
    let normal = Unit::new_normalize(Vector3::new(0.1, -1.0, 0.05));
    let plane = Plane::new(normal, -1.4);
    let u = normal.cross(&Vector3::x()).normalize();
    let v = normal.cross(&u).normalize();
    let origin = Point3::from(-*normal * 1.4);
    let on_plane: Vec<_> = (0..ON_PLANE)
        .map(|_| origin + u * rng.gen_range(-8.0..8.0) + v * rng.gen_range(-8.0..8.0))
        .collect();
    let outliers: Vec<_> = (0..OUTLIERS)
        .map(|ix| {
            let offset = rng.gen_range(0.5..3.0) * if ix % 2 == 0 { 1.0 } else { -1.0 };
            on_plane[ix] + *normal * offset
        })
        .collect();
    (plane, on_plane.into_iter().chain(outliers).collect())
}

#[test]
fn recovers_plane_among_outliers() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
    let (plane, points) = scene(&mut rng);
    let mut ransac = Ransac::new(THRESHOLD, Xoshiro256PlusPlus::seed_from_u64(0));
    let (model, mut inliers) = ransac
        .model_inliers(&ThreePoint::new(), points.iter().copied())
        .expect("plane should be found");
    let angle = model.angle_to(&plane).min(model.flipped().angle_to(&plane));
    assert!(angle < 1e-6, "normal off by {} rad", angle);
    inliers.sort_unstable();
    assert_eq!(inliers, (0..ON_PLANE).collect::<Vec<_>>());
}

#[test]
fn same_seed_same_result() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
    let (_, points) = scene(&mut rng);
    let run = |seed| {
        Ransac::new(THRESHOLD, Xoshiro256PlusPlus::seed_from_u64(seed))
            .trials(50)
            .model_inliers(&ThreePoint::new(), points.iter().copied())
    };
    let first = run(11);
    assert!(first.is_some());
    assert_eq!(first, run(11));
}

#[test]
fn too_few_points_draw_nothing() {
    let points = [Point3::new(0.0, 1.0, 3.0), Point3::new(1.0, 1.0, 3.0)];
    let fresh = Xoshiro256PlusPlus::seed_from_u64(5);
    let mut ransac = Ransac::new(THRESHOLD, fresh.clone());
    assert!(ransac.best(&ThreePoint::new(), &points[..]).is_none());
    assert!(ransac
        .model_inliers(&ThreePoint::new(), points.iter().copied())
        .is_none());
    assert_eq!(ransac.rng().clone().next_u64(), fresh.clone().next_u64());
}

#[test]
fn best_plane_below_threshold_is_rejected() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(9);
    let (_, points) = scene(&mut rng);
    let mut ransac = Ransac::new(THRESHOLD, Xoshiro256PlusPlus::seed_from_u64(0))
        .minimum_inliers(ON_PLANE + OUTLIERS + 1);
    let best = ransac
        .best(&ThreePoint::new(), &points)
        .expect("trials still produce planes");
    assert_eq!(best.score.inliers, ON_PLANE);
    assert!(!ransac.accepts(&best.score, points.len()));
    assert!(ransac
        .model_inliers(&ThreePoint::new(), points.iter().copied())
        .is_none());
}

#[test]
fn collinear_data_gives_up_after_retries() {
    let points: Vec<_> = (0..20)
        .map(|i| Point3::new(i as f64, 1.0, 2.0 * i as f64))
        .collect();
    let mut ransac = Ransac::new(THRESHOLD, Xoshiro256PlusPlus::seed_from_u64(0))
        .trials(10)
        .degenerate_retries(3);
    assert!(ransac.best(&ThreePoint::new(), &points).is_none());
}

#[test]
fn collinear_samples_are_redrawn_within_one_trial() {
    // Most triples drawn from here lie on a line, only the last three points leave it.
    let mut points: Vec<_> = (0..50)
        .map(|i| Point3::new(i as f64, 1.0, 2.0 * i as f64))
        .collect();
    points.extend([
        Point3::new(0.0, 2.0, 5.0),
        Point3::new(3.0, 1.5, 1.0),
        Point3::new(-2.0, 1.2, 7.0),
    ]);
    let mut ransac = Ransac::new(THRESHOLD, Xoshiro256PlusPlus::seed_from_u64(0))
        .trials(1)
        .degenerate_retries(1000);
    let best = ransac
        .best(&ThreePoint::new(), &points)
        .expect("a non-degenerate sample is eventually drawn");
    assert_eq!(best.score.trial, 0);
    assert!(best.score.inliers >= 3);
}
