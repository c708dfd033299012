use std::cmp::Ordering;

use groundcover_core::{cloud::PointCloud, nalgebra::Vector3};
use kd_tree::{KdPoint, KdTree};

/// A position together with the index of its point in the cloud the index was built from
#[derive(Debug, Clone, Copy)]
struct IndexedPosition {
    position: [f64; 3],
    index: usize,
}

impl KdPoint for IndexedPosition {
    type Scalar = f64;
    type Dim = typenum::U3;
    fn at(&self, k: usize) -> f64 {
        self.position[k]
    }
}

fn squared_distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a.iter().zip(b).map(|(a, b)| (a - b) * (a - b)).sum()
}

/// Indices of the `k` items closest to `query`, nearest first
fn rank_by_distance<'a, I: Iterator<Item = &'a IndexedPosition>>(
    query: &[f64; 3],
    items: I,
    k: usize,
) -> Vec<usize> {
    let mut ranked = items
        .map(|item| (squared_distance(query, &item.position), item.index))
        .collect::<Vec<_>>();
    ranked.sort_by(|a, b| {
        a.0.partial_cmp(&b.0)
            .unwrap_or(Ordering::Equal)
            .then(a.1.cmp(&b.1))
    });
    ranked.truncate(k);
    ranked.into_iter().map(|(_, index)| index).collect()
}

/// Spatial index over the positions of a cloud, answering k-nearest-neighbour and radius queries with point indices.
/// Building the index is the expensive part, so build it once per cloud and share it between all queries.
pub struct SpatialIndex {
    tree: KdTree<IndexedPosition>,
    len: usize,
}

impl SpatialIndex {
    /// Builds an index over all points of `cloud`, hidden and deleted points included
    pub fn build(cloud: &PointCloud) -> Self {
        Self::from_positions(cloud.positions())
    }

    pub fn from_positions(positions: &[Vector3<f64>]) -> Self {
        let items = positions
            .iter()
            .enumerate()
            .map(|(index, p)| IndexedPosition {
                position: [p.x, p.y, p.z],
                index,
            })
            .collect::<Vec<_>>();
        let len = items.len();
        Self {
            tree: KdTree::build_by_ordered_float(items),
            len,
        }
    }

    /// Number of indexed points
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Indices of the (up to) `k` points closest to `center`, nearest first, ties in index order. If `center` is
    /// the position of an indexed point, that point is part of the result.
    pub fn nearest_k(&self, center: &Vector3<f64>, k: usize) -> Vec<usize> {
        if self.is_empty() || k == 0 {
            return vec![];
        }
        let query = [center.x, center.y, center.z];
        if k >= self.len {
            return rank_by_distance(&query, self.tree.items().iter(), k);
        }
        // `nearests` may stop short of the true neighbours, but any k of its hits bound the distance of the k-th
        // nearest point. Everything inside that bound is collected and ranked exactly.
        let candidates = self.tree.nearests(&query, k);
        if candidates.len() < k {
            return rank_by_distance(&query, self.tree.items().iter(), k);
        }
        let bound = candidates
            .iter()
            .map(|found| found.squared_distance)
            .fold(0.0, f64::max)
            .sqrt()
            * (1.0 + 1e-9);
        let within_bound = self.tree.within_by_cmp(|item, axis| {
            let coordinate = item.position[axis];
            if coordinate < query[axis] - bound {
                Ordering::Less
            } else if coordinate > query[axis] + bound {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        });
        rank_by_distance(&query, within_bound.into_iter(), k)
    }

    /// Indices of all points within `radius` of `center`, in no particular order
    pub fn within_radius(&self, center: &Vector3<f64>, radius: f64) -> Vec<usize> {
        if self.is_empty() {
            return vec![];
        }
        self.tree
            .within_radius(&[center.x, center.y, center.z], radius)
            .iter()
            .map(|item| item.index)
            .collect()
    }
}
