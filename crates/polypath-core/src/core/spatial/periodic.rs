use super::error::SpatialError;
use super::kdtree::{DEFAULT_LEAF_SIZE, Hit, KdTree, compare_hits};
use crate::core::models::periodic_box::PeriodicBox;
use crate::core::utils::geometry::wrap_coordinate;
use nalgebra::Point3;
use tracing::instrument;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Padded result of a k-nearest query against a [`PeriodicKdTree`].
///
/// Both vectors always hold exactly `k` entries. Slots without a neighbor carry an
/// infinite distance and the index `len()` of the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub distances: Vec<f64>,
    pub indices: Vec<usize>,
}

/// A k-d tree with periodic boundary conditions along any subset of axes.
///
/// All points are mapped into the canonical cell and indexed by an ordinary
/// [`KdTree`]; a query then runs once per relevant mirror image of the query point.
/// Only orthorhombic cells are supported.
///
/// Query radii are capped at half the smallest periodic box length. Larger radii would
/// let two images of the same point qualify, so results beyond that limit are never
/// produced.
#[derive(Debug, Clone)]
pub struct PeriodicKdTree {
    bounds: Vec<f64>,
    tree: KdTree,
    max_distance_upper_bound: f64,
}

impl PeriodicKdTree {
    /// Builds the index. `bounds[axis] <= 0` marks `axis` as non-periodic; the
    /// dimension of every point must equal `bounds.len()`.
    #[instrument(level = "trace", skip_all, fields(points = points.len()))]
    pub fn new<P: AsRef<[f64]>>(points: &[P], bounds: &[f64]) -> Result<Self, SpatialError> {
        if bounds.iter().any(|b| !b.is_finite()) {
            return Err(SpatialError::InvalidBounds(bounds.to_vec()));
        }
        let dim = bounds.len();

        let mut wrapped = Vec::with_capacity(points.len());
        for point in points {
            let point = point.as_ref();
            if point.len() != dim {
                return Err(SpatialError::DimensionMismatch {
                    expected: dim,
                    found: point.len(),
                });
            }
            wrapped.push(
                point
                    .iter()
                    .zip(bounds)
                    .map(|(&x, &length)| wrap_coordinate(x, length))
                    .collect::<Vec<f64>>(),
            );
        }

        let max_distance_upper_bound = bounds
            .iter()
            .filter(|&&b| b > 0.0)
            .map(|b| 0.5 * b)
            .fold(f64::INFINITY, f64::min);

        Ok(Self {
            bounds: bounds.to_vec(),
            tree: KdTree::with_leaf_size(&wrapped, dim, DEFAULT_LEAF_SIZE)?,
            max_distance_upper_bound,
        })
    }

    /// Builds the index from per-axis box lengths and periodicity flags.
    pub fn with_periodicity<P: AsRef<[f64]>>(
        points: &[P],
        box_lengths: &[f64],
        periodic: &[bool],
    ) -> Result<Self, SpatialError> {
        if box_lengths.len() != periodic.len() {
            return Err(SpatialError::DimensionMismatch {
                expected: box_lengths.len(),
                found: periodic.len(),
            });
        }
        let bounds: Vec<f64> = box_lengths
            .iter()
            .zip(periodic)
            .map(|(&length, &is_periodic)| {
                if is_periodic && length > 0.0 {
                    length
                } else {
                    0.0
                }
            })
            .collect();
        Self::new(points, &bounds)
    }

    pub fn from_positions(
        positions: &[Point3<f64>],
        periodic_box: &PeriodicBox,
    ) -> Result<Self, SpatialError> {
        let points: Vec<[f64; 3]> = positions.iter().map(|p| [p.x, p.y, p.z]).collect();
        Self::new(&points, &periodic_box.bounds())
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn bounds(&self) -> &[f64] {
        &self.bounds
    }

    pub fn max_distance_upper_bound(&self) -> f64 {
        self.max_distance_upper_bound
    }

    fn validate_query(&self, x: &[f64], p: f64, bound: f64) -> Result<(), SpatialError> {
        if x.len() != self.bounds.len() {
            return Err(SpatialError::DimensionMismatch {
                expected: self.bounds.len(),
                found: x.len(),
            });
        }
        if p.is_nan() || p < 1.0 {
            return Err(SpatialError::InvalidNorm(p));
        }
        if bound.is_nan() {
            return Err(SpatialError::InvalidRadius(bound));
        }
        Ok(())
    }

    /// The `k` nearest indexed points to `x` under the Minkowski `p`-norm, considering
    /// every periodic image and only distances strictly below `upper_bound` (itself
    /// capped at [`Self::max_distance_upper_bound`]).
    pub fn nearest(
        &self,
        x: &[f64],
        k: usize,
        p: f64,
        upper_bound: f64,
    ) -> Result<QueryResult, SpatialError> {
        self.validate_query(x, p, upper_bound)?;
        if k == 0 {
            return Err(SpatialError::InvalidNeighborCount(k));
        }
        let upper_bound = upper_bound.min(self.max_distance_upper_bound);
        let images = relevant_images(x, &self.bounds, upper_bound);

        #[cfg(not(feature = "parallel"))]
        let per_image: Vec<Vec<Hit>> = images
            .iter()
            .map(|image| self.tree.nearest_unchecked(image, k, p, upper_bound))
            .collect();

        #[cfg(feature = "parallel")]
        let per_image: Vec<Vec<Hit>> = images
            .par_iter()
            .map(|image| self.tree.nearest_unchecked(image, k, p, upper_bound))
            .collect();

        let mut hits: Vec<Hit> = per_image.into_iter().flatten().collect();
        hits.sort_by(compare_hits);
        hits.truncate(k);

        let missing = self.len();
        let mut result = QueryResult {
            distances: vec![f64::INFINITY; k],
            indices: vec![missing; k],
        };
        for (slot, (distance, index)) in hits.into_iter().enumerate() {
            result.distances[slot] = distance;
            result.indices[slot] = index;
        }
        Ok(result)
    }

    /// Indices of all indexed points strictly closer than `r` to any image of `x`,
    /// sorted and free of duplicates. `r` is capped like the nearest-neighbor bound.
    pub fn within_radius(&self, x: &[f64], r: f64, p: f64) -> Result<Vec<usize>, SpatialError> {
        self.validate_query(x, p, r)?;
        let r = r.min(self.max_distance_upper_bound);
        let images = relevant_images(x, &self.bounds, r);

        #[cfg(not(feature = "parallel"))]
        let per_image: Vec<Vec<usize>> = images
            .iter()
            .map(|image| self.tree.within_radius_unchecked(image, r, p))
            .collect();

        #[cfg(feature = "parallel")]
        let per_image: Vec<Vec<usize>> = images
            .par_iter()
            .map(|image| self.tree.within_radius_unchecked(image, r, p))
            .collect();

        let mut indices: Vec<usize> = per_image.into_iter().flatten().collect();
        indices.sort_unstable();
        indices.dedup();
        Ok(indices)
    }

    pub fn query_ball_tree(
        &self,
        _other: &PeriodicKdTree,
        _r: f64,
        _p: f64,
    ) -> Result<Vec<Vec<usize>>, SpatialError> {
        Err(SpatialError::NotSupported {
            operation: "query_ball_tree",
        })
    }

    pub fn query_pairs(&self, _r: f64, _p: f64) -> Result<Vec<(usize, usize)>, SpatialError> {
        Err(SpatialError::NotSupported {
            operation: "query_pairs",
        })
    }

    pub fn count_neighbors(
        &self,
        _other: &PeriodicKdTree,
        _r: f64,
        _p: f64,
    ) -> Result<usize, SpatialError> {
        Err(SpatialError::NotSupported {
            operation: "count_neighbors",
        })
    }

    pub fn sparse_distance_matrix(
        &self,
        _other: &PeriodicKdTree,
        _max_distance: f64,
        _p: f64,
    ) -> Result<Vec<((usize, usize), f64)>, SpatialError> {
        Err(SpatialError::NotSupported {
            operation: "sparse_distance_matrix",
        })
    }
}

/// Maps `x` into the canonical cell and returns it together with the mirror images
/// that may lie within `upper_bound` of an indexed point.
///
/// Along each periodic axis an image shifted by `+length` is added when the wrapped
/// coordinate is within `upper_bound` of the lower face, and one shifted by `-length`
/// when it is within `upper_bound` of the upper face; images from earlier axes are
/// shifted too. An unbounded search always adds both shifts.
pub fn relevant_images(x: &[f64], bounds: &[f64], upper_bound: f64) -> Vec<Vec<f64>> {
    let real_x: Vec<f64> = x
        .iter()
        .zip(bounds)
        .map(|(&c, &length)| wrap_coordinate(c, length))
        .collect();

    let mut images = vec![real_x.clone()];
    for (axis, &length) in bounds.iter().enumerate() {
        if length <= 0.0 {
            continue;
        }
        let shifted = |images: &[Vec<f64>], delta: f64| -> Vec<Vec<f64>> {
            images
                .iter()
                .map(|image| {
                    let mut image = image.clone();
                    image[axis] += delta;
                    image
                })
                .collect()
        };

        let mut extra = Vec::new();
        if upper_bound == f64::INFINITY || real_x[axis].abs() < upper_bound {
            extra.extend(shifted(&images, length));
        }
        if upper_bound == f64::INFINITY || (length - real_x[axis]).abs() < upper_bound {
            extra.extend(shifted(&images, -length));
        }
        images.extend(extra);
    }
    images
}
