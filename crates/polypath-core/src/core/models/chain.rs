use super::periodic_box::PeriodicBox;
use crate::core::spatial::error::SpatialError;
use crate::core::spatial::periodic::PeriodicKdTree;
use crate::core::utils::geometry::{bond_angle, bounding_box_lengths};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A bond between two coordinate indices of a [`Chain`].
pub type Bond = (usize, usize);

/// Bonds joining every pair of consecutive indices of an `n`-point linear chain.
pub fn consecutive_bonds(n: usize) -> Vec<Bond> {
    (1..n).map(|i| (i - 1, i)).collect()
}

/// A finished path: ordered coordinates plus the bonds connecting them.
///
/// Chains are only handed out complete; generators build them internally and never
/// expose a partially grown one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ChainData")]
pub struct Chain {
    coordinates: Vec<Point3<f64>>,
    bonds: Vec<Bond>,
}

/// Unchecked serialized form of a [`Chain`].
#[derive(Deserialize)]
struct ChainData {
    coordinates: Vec<Point3<f64>>,
    bonds: Vec<Bond>,
}

impl TryFrom<ChainData> for Chain {
    type Error = SpatialError;

    fn try_from(data: ChainData) -> Result<Self, Self::Error> {
        let points = data.coordinates.len();
        if let Some(&bond) = data.bonds.iter().find(|&&(a, b)| a >= points || b >= points) {
            return Err(SpatialError::InvalidBond { bond, points });
        }
        Ok(Self::new(data.coordinates, data.bonds))
    }
}

impl Chain {
    pub(crate) fn new(coordinates: Vec<Point3<f64>>, bonds: Vec<Bond>) -> Self {
        Self { coordinates, bonds }
    }

    /// A chain whose points are bonded consecutively.
    pub fn linear(coordinates: Vec<Point3<f64>>) -> Self {
        let bonds = consecutive_bonds(coordinates.len());
        Self::new(coordinates, bonds)
    }

    pub fn coordinates(&self) -> &[Point3<f64>] {
        &self.coordinates
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    pub fn into_parts(self) -> (Vec<Point3<f64>>, Vec<Bond>) {
        (self.coordinates, self.bonds)
    }

    pub fn bond_lengths(&self) -> Vec<f64> {
        self.bonds
            .iter()
            .map(|&(a, b)| (self.coordinates[b] - self.coordinates[a]).norm())
            .collect()
    }

    /// Angles between consecutive bond vectors, one per interior point.
    pub fn bond_angles(&self) -> Vec<f64> {
        self.coordinates
            .windows(3)
            .map(|w| bond_angle(&w[0], &w[1], &w[2]))
            .collect()
    }

    pub fn bounding_box(&self) -> Vector3<f64> {
        bounding_box_lengths(&self.coordinates)
    }

    /// Smallest distance between two points at least two positions apart, measured
    /// with the minimum image convention of `periodic_box` when one is given.
    pub fn min_nonbonded_distance(&self, periodic_box: Option<&PeriodicBox>) -> Option<f64> {
        let pbox = periodic_box.copied().unwrap_or_default();
        let n = self.coordinates.len();
        (0..n)
            .flat_map(|i| (i + 2..n).map(move |j| (i, j)))
            .map(|(i, j)| pbox.minimum_image_distance(&self.coordinates[i], &self.coordinates[j]))
            .reduce(f64::min)
    }

    /// Every unordered pair `(i, j, distance)` with `i < j` closer than `r_max`.
    ///
    /// Without a box the search is non-periodic. With a periodic box, `r_max` is capped
    /// at half the smallest periodic length.
    pub fn neighbor_list(
        &self,
        r_max: f64,
        periodic_box: Option<&PeriodicBox>,
    ) -> Result<Vec<(usize, usize, f64)>, SpatialError> {
        let pbox = periodic_box.copied().unwrap_or_default();
        let index = PeriodicKdTree::from_positions(&self.coordinates, &pbox)?;

        let mut pairs = Vec::new();
        for (i, point) in self.coordinates.iter().enumerate() {
            for j in index.within_radius(&[point.x, point.y, point.z], r_max, 2.0)? {
                if j > i {
                    let distance = pbox.minimum_image_distance(point, &self.coordinates[j]);
                    pairs.push((i, j, distance));
                }
            }
        }
        Ok(pairs)
    }
}
