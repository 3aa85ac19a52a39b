use crate::core::utils::geometry::perpendicular_component;
use nalgebra::{Point3, Vector3};
use rand::Rng;
use std::f64::consts::{PI, TAU};
use tracing::warn;

const MIN_PERPENDICULAR_NORM: f64 = 1e-6;

/// Proposes trial positions that honour a fixed bond length and a bond angle range.
///
/// The sampler holds no random state; every draw comes from the generator passed in
/// by the caller, so a walk replays exactly from its seed.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DirectionSampler {
    bond_length: f64,
    min_angle: f64,
    max_angle: f64,
}

impl DirectionSampler {
    pub fn new(bond_length: f64, min_angle: f64, max_angle: f64) -> Self {
        Self {
            bond_length,
            min_angle,
            max_angle,
        }
    }

    /// A step from `origin` in a random direction.
    ///
    /// Azimuth and polar angle are both drawn uniformly, which is not uniform over the
    /// sphere (directions bunch up at the poles). Walks depend on this exact
    /// distribution, so it is kept as is.
    pub fn first_step<R: Rng + ?Sized>(&self, origin: &Point3<f64>, rng: &mut R) -> Point3<f64> {
        let phi = rng.gen_range(0.0..TAU);
        let theta = rng.gen_range(0.0..PI);
        let direction = Vector3::new(
            theta.sin() * phi.cos(),
            theta.sin() * phi.sin(),
            theta.cos(),
        );
        origin + direction * self.bond_length
    }

    /// A step from `current` whose bond vector makes an angle within
    /// `[min_angle, max_angle]` with the bond `previous -> current`, at a random
    /// azimuth around that bond.
    pub fn next_step<R: Rng + ?Sized>(
        &self,
        current: &Point3<f64>,
        previous: &Point3<f64>,
        rng: &mut R,
    ) -> Point3<f64> {
        let v1 = (current - previous).normalize();
        let theta = rng.gen_range(self.min_angle..=self.max_angle);
        let r_perp = random_perpendicular(&v1, rng);
        let direction = v1 * theta.cos() + r_perp * theta.sin();
        current + direction * self.bond_length
    }
}

/// A unit vector orthogonal to the unit vector `axis`, built from a random vector with
/// components in `[-0.5, 0.5)`. Nearly parallel draws are discarded and redrawn.
fn random_perpendicular<R: Rng + ?Sized>(axis: &Vector3<f64>, rng: &mut R) -> Vector3<f64> {
    loop {
        let r = Vector3::new(
            rng.gen_range(-0.5..0.5),
            rng.gen_range(-0.5..0.5),
            rng.gen_range(-0.5..0.5),
        );
        let perp = perpendicular_component(&r, axis);
        let norm = perp.norm();
        if norm >= MIN_PERPENDICULAR_NORM {
            return perp / norm;
        }
        warn!(norm, "Degenerate perpendicular vector drawn; redrawing.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::utils::geometry::angle_between;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn first_step_has_bond_length() {
        let sampler = DirectionSampler::new(1.5, 0.0, PI);
        let mut rng = StdRng::seed_from_u64(1);
        let origin = Point3::new(1.0, -2.0, 3.0);
        for _ in 0..100 {
            let step = sampler.first_step(&origin, &mut rng);
            assert!(((step - origin).norm() - 1.5).abs() < TOLERANCE);
        }
    }

    #[test]
    fn next_step_respects_bond_length_and_angle_range() {
        let sampler = DirectionSampler::new(0.8, 0.6, 1.9);
        let mut rng = StdRng::seed_from_u64(2);
        let previous = Point3::new(0.0, 0.0, 0.0);
        let current = Point3::new(0.3, 0.5, -0.4);
        for _ in 0..500 {
            let next = sampler.next_step(&current, &previous, &mut rng);
            let angle = angle_between(&(current - previous), &(next - current));
            assert!(((next - current).norm() - 0.8).abs() < TOLERANCE);
            assert!(angle >= 0.6 - TOLERANCE && angle <= 1.9 + TOLERANCE);
        }
    }

    #[test]
    fn fixed_angle_produces_exact_bend() {
        let sampler = DirectionSampler::new(1.0, 1.2, 1.2);
        let mut rng = StdRng::seed_from_u64(3);
        let previous = Point3::new(-1.0, 0.0, 0.0);
        let current = Point3::origin();
        let next = sampler.next_step(&current, &previous, &mut rng);
        let angle = angle_between(&(current - previous), &(next - current));
        assert!((angle - 1.2).abs() < TOLERANCE);
    }

    #[test]
    fn same_seed_replays_same_candidates() {
        let sampler = DirectionSampler::new(1.0, 0.5, 2.0);
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let a = sampler.first_step(&Point3::origin(), &mut rng);
            let b = sampler.next_step(&a, &Point3::origin(), &mut rng);
            (a, b)
        };
        assert_eq!(run(24), run(24));
        assert_ne!(run(24), run(25));
    }

    #[test]
    fn random_perpendicular_is_unit_and_orthogonal() {
        let mut rng = StdRng::seed_from_u64(4);
        let axis = Vector3::new(0.0, 0.0, 1.0);
        for _ in 0..100 {
            let perp = random_perpendicular(&axis, &mut rng);
            assert!((perp.norm() - 1.0).abs() < TOLERANCE);
            assert!(perp.dot(&axis).abs() < TOLERANCE);
        }
    }
}
