use crate::core::spatial::error::SpatialError;
use crate::core::utils::geometry::wrap_coordinate;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

const RIGHT_ANGLE_DEGREES: f64 = 90.0;
const ANGLE_TOLERANCE_DEGREES: f64 = 1e-6;

/// An orthorhombic simulation cell with independent periodicity per axis.
///
/// An axis whose length is zero or negative is treated as non-periodic, whatever its
/// flag says.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodicBox {
    lengths: Vector3<f64>,
    periodicity: [bool; 3],
}

impl PeriodicBox {
    pub fn new(lengths: Vector3<f64>, periodicity: [bool; 3]) -> Self {
        Self {
            lengths,
            periodicity,
        }
    }

    /// A cube of side `length`, periodic along every axis.
    pub fn cubic(length: f64) -> Self {
        Self::new(Vector3::repeat(length), [true; 3])
    }

    /// Open space: no axis wraps.
    pub fn non_periodic() -> Self {
        Self::new(Vector3::zeros(), [false; 3])
    }

    /// Builds a box from a general cell description, rejecting any cell whose angles
    /// (in degrees) are not all right angles.
    pub fn with_angles(
        lengths: Vector3<f64>,
        angles_degrees: [f64; 3],
        periodicity: [bool; 3],
    ) -> Result<Self, SpatialError> {
        let orthorhombic = angles_degrees
            .iter()
            .all(|a| (a - RIGHT_ANGLE_DEGREES).abs() <= ANGLE_TOLERANCE_DEGREES);
        if !orthorhombic {
            return Err(SpatialError::NonOrthorhombic {
                angles: angles_degrees,
            });
        }
        Ok(Self::new(lengths, periodicity))
    }

    pub fn lengths(&self) -> &Vector3<f64> {
        &self.lengths
    }

    pub fn periodicity(&self) -> [bool; 3] {
        self.periodicity
    }

    pub fn is_periodic(&self, axis: usize) -> bool {
        self.periodicity[axis] && self.lengths[axis] > 0.0
    }

    /// Effective per-axis periods; `0.0` marks a non-periodic axis.
    pub fn bounds(&self) -> [f64; 3] {
        std::array::from_fn(|axis| {
            if self.is_periodic(axis) {
                self.lengths[axis]
            } else {
                0.0
            }
        })
    }

    /// Maps a point into the canonical cell `[0, length)` along every periodic axis.
    pub fn wrap(&self, point: &Point3<f64>) -> Point3<f64> {
        let bounds = self.bounds();
        Point3::from(Vector3::from_fn(|axis, _| {
            wrap_coordinate(point[axis], bounds[axis])
        }))
    }

    /// Euclidean distance between `a` and the nearest periodic image of `b`.
    pub fn minimum_image_distance(&self, a: &Point3<f64>, b: &Point3<f64>) -> f64 {
        let bounds = self.bounds();
        let mut delta = b - a;
        for axis in 0..3 {
            let length = bounds[axis];
            if length > 0.0 {
                delta[axis] -= (delta[axis] / length).round() * length;
            }
        }
        delta.norm()
    }
}

impl Default for PeriodicBox {
    fn default() -> Self {
        Self::non_periodic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_zero_out_non_periodic_axes() {
        let pbox = PeriodicBox::new(Vector3::new(10.0, 20.0, -5.0), [true, false, true]);
        assert_eq!(pbox.bounds(), [10.0, 0.0, 0.0]);
        assert!(pbox.is_periodic(0));
        assert!(!pbox.is_periodic(1));
        assert!(!pbox.is_periodic(2));
    }

    #[test]
    fn with_angles_accepts_orthorhombic_cells() {
        let pbox = PeriodicBox::with_angles(Vector3::repeat(4.0), [90.0; 3], [true; 3]).unwrap();
        assert_eq!(pbox, PeriodicBox::cubic(4.0));
    }

    #[test]
    fn with_angles_rejects_triclinic_cells() {
        let result =
            PeriodicBox::with_angles(Vector3::repeat(4.0), [90.0, 90.0, 120.0], [true; 3]);
        assert!(matches!(
            result,
            Err(SpatialError::NonOrthorhombic { angles }) if angles[2] == 120.0
        ));
    }

    #[test]
    fn wrap_only_touches_periodic_axes() {
        let pbox = PeriodicBox::new(Vector3::new(10.0, 10.0, 10.0), [true, false, true]);
        let wrapped = pbox.wrap(&Point3::new(-1.0, -1.0, 25.0));
        assert!((wrapped - Point3::new(9.0, -1.0, 5.0)).norm() < 1e-12);
    }

    #[test]
    fn minimum_image_distance_crosses_the_boundary() {
        let pbox = PeriodicBox::cubic(10.0);
        let a = Point3::new(0.5, 5.0, 5.0);
        let b = Point3::new(9.5, 5.0, 5.0);
        assert!((pbox.minimum_image_distance(&a, &b) - 1.0).abs() < 1e-12);
        assert!((PeriodicBox::non_periodic().minimum_image_distance(&a, &b) - 9.0).abs() < 1e-12);
    }
}
