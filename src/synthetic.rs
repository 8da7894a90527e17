//! Synthetic trajectory generator for stress testing and benchmarking.
//!
//! Generates trajectory corpora with a known shared corridor, providing
//! ground truth for validating the clustering pipeline: noisy traversals of
//! one winding corridor polyline, plus unrelated random walks that should
//! end up as noise.
//!
//! Feature-gated behind `synthetic` — not included in production builds.
//! All randomness comes from a seeded [`StdRng`], so a scenario reproduces
//! the same corpus on every run.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

use crate::geometry::Point;

/// Spacing between generated corridor points, in coordinate units.
const POINT_SPACING: f64 = 10.0;

/// Scenario configuration for a corridor bundle.
#[derive(Debug, Clone)]
pub struct BundleScenario {
    /// Number of noisy traversals of the corridor.
    pub trajectory_count: usize,
    /// Corridor length in coordinate units.
    pub corridor_length: f64,
    /// Heading jitter per corridor step, in radians (0 = straight).
    pub winding: f64,
    /// Standard deviation of per-point Gaussian noise.
    pub noise_sigma: f64,
    /// RNG seed for deterministic reproduction.
    pub seed: u64,
}

impl Default for BundleScenario {
    fn default() -> Self {
        Self {
            trajectory_count: 8,
            corridor_length: 2000.0,
            winding: 0.05,
            noise_sigma: 3.0,
            seed: 42,
        }
    }
}

/// A generated corpus with its ground truth.
#[derive(Debug, Clone)]
pub struct BundleDataset {
    /// The shared corridor polyline (ground truth).
    pub corridor: Vec<Point<2>>,
    /// Noisy traversals of the corridor.
    pub trajectories: Vec<Vec<Point<2>>>,
}

impl BundleScenario {
    /// Generate the corpus described by this scenario.
    pub fn generate(&self) -> BundleDataset {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let corridor = generate_corridor(self.corridor_length, self.winding, &mut rng);
        let trajectories = (0..self.trajectory_count)
            .map(|_| add_noise(&corridor, self.noise_sigma, &mut rng))
            .collect();
        BundleDataset {
            corridor,
            trajectories,
        }
    }
}

/// Generate a corridor polyline of roughly the given length from the origin.
fn generate_corridor(length: f64, winding: f64, rng: &mut StdRng) -> Vec<Point<2>> {
    let steps = (length / POINT_SPACING).ceil() as usize;
    let mut points = Vec::with_capacity(steps + 1);
    let mut heading = 0.0f64;
    let mut current = Point::xy(0.0, 0.0);
    points.push(current);

    for _ in 0..steps {
        if winding > 0.0 {
            heading += rng.gen_range(-winding..winding);
        }
        current = Point::xy(
            current.coord(0) + POINT_SPACING * heading.cos(),
            current.coord(1) + POINT_SPACING * heading.sin(),
        );
        points.push(current);
    }

    points
}

/// An unconstrained random walk, useful as background noise in a corpus.
pub fn random_walk(origin: Point<2>, steps: usize, seed: u64) -> Vec<Point<2>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut points = Vec::with_capacity(steps + 1);
    let mut heading: f64 = rng.gen_range(0.0..2.0 * PI);
    let mut current = origin;
    points.push(current);

    for _ in 0..steps {
        heading += rng.gen_range(-0.3..0.3);
        current = Point::xy(
            current.coord(0) + POINT_SPACING * heading.cos(),
            current.coord(1) + POINT_SPACING * heading.sin(),
        );
        points.push(current);
    }

    points
}

/// Add Gaussian noise to every point of a polyline.
fn add_noise(points: &[Point<2>], sigma: f64, rng: &mut StdRng) -> Vec<Point<2>> {
    if sigma <= 0.0 {
        return points.to_vec();
    }

    points
        .iter()
        .map(|p| {
            // Box-Muller transform for Gaussian noise.
            let u1: f64 = rng.gen_range(0.0001..1.0);
            let u2: f64 = rng.gen_range(0.0..1.0);
            let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
            let z1 = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).sin();
            Point::xy(p.coord(0) + z0 * sigma, p.coord(1) + z1 * sigma)
        })
        .collect()
}
