use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use road_core::{
    nalgebra::{Point3, Unit, Vector3},
    sample_consensus::{Estimator, Model},
    Plane,
};
use three_point::{LeastSquares, ThreePoint};

const SAMPLE_POINTS: usize = 64;
const RESIDUAL_THRESHOLD: f64 = 1e-9;
const NOISE: f64 = 0.01;

#[test]
fn randomized() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
    let successes = (0..1000).filter(|_| run_round(&mut rng)).count();
    eprintln!("successes: {}", successes);
    assert!(successes > 990);
}

#[test]
fn least_squares_averages_noise() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
    for _ in 0..100 {
        let (plane, points) = some_test_data(&mut rng);
        let noisy: Vec<_> = points
            .iter()
            .map(|&p| p + *plane.normal * rng.gen_range(-NOISE..NOISE))
            .collect();
        let fitted = LeastSquares::new()
            .fit(noisy.iter().copied())
            .expect("noisy points still span a plane")
            .oriented_towards(&Point3::origin());
        assert!(
            fitted.angle_to(&plane) < 0.05,
            "angle {} too large",
            fitted.angle_to(&plane)
        );
    }
}

fn run_round(rng: &mut impl Rng) -> bool {
    let (plane, points) = some_test_data(rng);
    let estimate =
        Estimator::<Point3<f64>>::estimate(&ThreePoint::new(), points.iter().copied().take(3));
    let estimate = match estimate {
        Some(estimate) => estimate,
        None => return false,
    };
    let mut success = estimate.signed_distance(&Point3::origin()) > 0.0;
    for p in &points {
        if estimate.residual(p) > RESIDUAL_THRESHOLD {
            success = false;
            eprintln!("failed residual check: {}", estimate.residual(p));
        }
    }
    if plane.angle_to(&estimate) > 1e-6 {
        success = false;
        eprintln!("failed normal check: {}", plane.angle_to(&estimate));
    }
    success
}

/// Gets a random ground-like plane below the camera (oriented towards it) and points on it.
fn some_test_data(rng: &mut impl Rng) -> (Plane, Vec<Point3<f64>>) {
    let normal = Unit::new_normalize(Vector3::new(
        rng.gen_range(-0.3..0.3),
        -1.0,
        rng.gen_range(-0.3..0.3),
    ));
    let height = rng.gen_range(0.5..3.0);
    let plane = Plane::new(normal, -height);
    // Two directions spanning the plane.
    let u = normal.cross(&Vector3::z()).normalize();
    let v = normal.cross(&u).normalize();
    let origin = Point3::from(-*normal * height);
    let points = (0..SAMPLE_POINTS)
        .map(|_| origin + u * rng.gen_range(-10.0..10.0) + v * rng.gen_range(-10.0..10.0))
        .collect();
    (plane, points)
}
