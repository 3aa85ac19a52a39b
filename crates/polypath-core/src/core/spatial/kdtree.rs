use super::error::SpatialError;
use crate::core::utils::geometry::minkowski_distance;
use std::cmp::Ordering;

pub const DEFAULT_LEAF_SIZE: usize = 10;

/// A `(distance, index)` hit returned by nearest-neighbor queries.
pub type Hit = (f64, usize);

#[derive(Debug, Clone, Copy)]
enum Node {
    Leaf {
        start: usize,
        end: usize,
    },
    Split {
        axis: usize,
        value: f64,
        left: usize,
        right: usize,
    },
}

/// A k-d tree over points of a fixed, runtime-chosen dimension.
///
/// Points are stored in one flat buffer; leaves hold ranges of a permutation of the
/// original indices so every query reports positions in the caller's input order.
#[derive(Debug, Clone)]
pub struct KdTree {
    dim: usize,
    data: Vec<f64>,
    order: Vec<usize>,
    nodes: Vec<Node>,
    root: Option<usize>,
}

impl KdTree {
    pub fn new<P: AsRef<[f64]>>(points: &[P], dim: usize) -> Result<Self, SpatialError> {
        Self::with_leaf_size(points, dim, DEFAULT_LEAF_SIZE)
    }

    pub fn with_leaf_size<P: AsRef<[f64]>>(
        points: &[P],
        dim: usize,
        leaf_size: usize,
    ) -> Result<Self, SpatialError> {
        let mut data = Vec::with_capacity(points.len() * dim);
        for point in points {
            let point = point.as_ref();
            if point.len() != dim {
                return Err(SpatialError::DimensionMismatch {
                    expected: dim,
                    found: point.len(),
                });
            }
            data.extend_from_slice(point);
        }

        let mut tree = Self {
            dim,
            data,
            order: (0..points.len()).collect(),
            nodes: Vec::new(),
            root: None,
        };
        if !points.is_empty() {
            let root = tree.build(0, points.len(), leaf_size.max(1));
            tree.root = Some(root);
        }
        Ok(tree)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn point(&self, index: usize) -> &[f64] {
        &self.data[index * self.dim..(index + 1) * self.dim]
    }

    fn build(&mut self, start: usize, end: usize, leaf_size: usize) -> usize {
        if end - start <= leaf_size {
            return self.push_node(Node::Leaf { start, end });
        }

        let axis = self.widest_axis(start, end);
        let spread = self.spread(axis, start, end);
        if spread <= 0.0 {
            // Every point in the range coincides.
            return self.push_node(Node::Leaf { start, end });
        }

        let mid = start + (end - start) / 2;
        let (dim, data) = (self.dim, &self.data);
        self.order[start..end].select_nth_unstable_by(mid - start, |&a, &b| {
            data[a * dim + axis].total_cmp(&data[b * dim + axis])
        });
        let value = self.data[self.order[mid] * self.dim + axis];

        let left = self.build(start, mid, leaf_size);
        let right = self.build(mid, end, leaf_size);
        self.push_node(Node::Split {
            axis,
            value,
            left,
            right,
        })
    }

    fn push_node(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn widest_axis(&self, start: usize, end: usize) -> usize {
        (0..self.dim)
            .max_by(|&a, &b| {
                self.spread(a, start, end)
                    .total_cmp(&self.spread(b, start, end))
            })
            .unwrap_or(0)
    }

    fn spread(&self, axis: usize, start: usize, end: usize) -> f64 {
        let (min, max) = self.order[start..end].iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(min, max), &i| {
                let c = self.data[i * self.dim + axis];
                (min.min(c), max.max(c))
            },
        );
        max - min
    }

    fn validate_query(&self, x: &[f64], p: f64, bound: f64) -> Result<(), SpatialError> {
        if x.len() != self.dim {
            return Err(SpatialError::DimensionMismatch {
                expected: self.dim,
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

    /// The `k` points nearest to `x` whose distance is strictly below `upper_bound`,
    /// sorted by distance (ties broken by ascending index). Fewer than `k` hits are
    /// returned when not enough points qualify.
    pub fn nearest(
        &self,
        x: &[f64],
        k: usize,
        p: f64,
        upper_bound: f64,
    ) -> Result<Vec<Hit>, SpatialError> {
        self.validate_query(x, p, upper_bound)?;
        if k == 0 {
            return Err(SpatialError::InvalidNeighborCount(k));
        }
        Ok(self.nearest_unchecked(x, k, p, upper_bound))
    }

    /// Indices of all points strictly closer than `r` to `x`, in ascending order.
    pub fn within_radius(&self, x: &[f64], r: f64, p: f64) -> Result<Vec<usize>, SpatialError> {
        self.validate_query(x, p, r)?;
        let mut hits = self.within_radius_unchecked(x, r, p);
        hits.sort_unstable();
        Ok(hits)
    }

    pub(crate) fn nearest_unchecked(
        &self,
        x: &[f64],
        k: usize,
        p: f64,
        upper_bound: f64,
    ) -> Vec<Hit> {
        let mut best: Vec<Hit> = Vec::with_capacity(k + 1);
        if let Some(root) = self.root {
            self.search_nearest(root, x, k, p, upper_bound, &mut best);
        }
        best
    }

    fn search_nearest(
        &self,
        node: usize,
        x: &[f64],
        k: usize,
        p: f64,
        upper_bound: f64,
        best: &mut Vec<Hit>,
    ) {
        match self.nodes[node] {
            Node::Leaf { start, end } => {
                for &index in &self.order[start..end] {
                    let d = minkowski_distance(x, self.point(index), p);
                    if d < upper_bound {
                        insert_hit(best, (d, index), k);
                    }
                }
            }
            Node::Split {
                axis,
                value,
                left,
                right,
            } => {
                let diff = x[axis] - value;
                let (near, far) = if diff < 0.0 { (left, right) } else { (right, left) };
                self.search_nearest(near, x, k, p, upper_bound, best);

                let bound = if best.len() < k {
                    upper_bound
                } else {
                    best[k - 1].0
                };
                if diff.abs() <= bound {
                    self.search_nearest(far, x, k, p, upper_bound, best);
                }
            }
        }
    }

    pub(crate) fn within_radius_unchecked(&self, x: &[f64], r: f64, p: f64) -> Vec<usize> {
        let mut hits = Vec::new();
        if let Some(root) = self.root {
            self.search_radius(root, x, r, p, &mut hits);
        }
        hits
    }

    fn search_radius(&self, node: usize, x: &[f64], r: f64, p: f64, hits: &mut Vec<usize>) {
        match self.nodes[node] {
            Node::Leaf { start, end } => {
                hits.extend(
                    self.order[start..end]
                        .iter()
                        .copied()
                        .filter(|&index| minkowski_distance(x, self.point(index), p) < r),
                );
            }
            Node::Split {
                axis,
                value,
                left,
                right,
            } => {
                let diff = x[axis] - value;
                let (near, far) = if diff < 0.0 { (left, right) } else { (right, left) };
                self.search_radius(near, x, r, p, hits);
                if diff.abs() < r {
                    self.search_radius(far, x, r, p, hits);
                }
            }
        }
    }
}

/// Orders hits by distance, then by index, so merges are deterministic.
pub(crate) fn compare_hits(a: &Hit, b: &Hit) -> Ordering {
    a.0.total_cmp(&b.0).then(a.1.cmp(&b.1))
}

fn insert_hit(best: &mut Vec<Hit>, hit: Hit, k: usize) {
    let position = best.partition_point(|existing| compare_hits(existing, &hit) == Ordering::Less);
    if position >= k {
        return;
    }
    best.insert(position, hit);
    best.truncate(k);
}
