use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A region a random walk may be confined to.
///
/// Membership tests take a `buffer` that shrinks the region on every face, so a
/// particle of radius `buffer` centred on an accepted point stays fully inside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "type")]
pub enum Confinement {
    Cuboid {
        center: Point3<f64>,
        lengths: Vector3<f64>,
    },
    Sphere {
        center: Point3<f64>,
        radius: f64,
    },
    /// Axis along z.
    Cylinder {
        center: Point3<f64>,
        radius: f64,
        height: f64,
    },
}

impl Confinement {
    pub fn contains(&self, point: &Point3<f64>, buffer: f64) -> bool {
        match *self {
            Confinement::Cuboid { center, lengths } => {
                let half = lengths / 2.0;
                (0..3).all(|axis| {
                    point[axis] - buffer >= center[axis] - half[axis]
                        && point[axis] + buffer <= center[axis] + half[axis]
                })
            }
            Confinement::Sphere { center, radius } => {
                let max_distance = radius - buffer;
                max_distance > 0.0 && (point - center).norm_squared() < max_distance * max_distance
            }
            Confinement::Cylinder {
                center,
                radius,
                height,
            } => {
                let max_radius = radius - buffer;
                let max_z = height / 2.0 - buffer;
                let delta = point - center;
                max_radius >= 0.0
                    && delta.x * delta.x + delta.y * delta.y <= max_radius * max_radius
                    && delta.z.abs() <= max_z
            }
        }
    }
}
