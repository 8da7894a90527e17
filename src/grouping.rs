//! Coarse whole-trajectory grouping.
//!
//! Cheaply partitions a large corpus into independent groups by proximity:
//! two trajectories are adjacent when any pair of their points lies within
//! a threshold distance, and groups are the connected components of that
//! adjacency. The expensive segment-clustering stage then runs only within
//! each group.
//!
//! An R-tree over per-trajectory bounding boxes prunes the candidate pairs
//! before the exact point-pair test; union-find turns the surviving edges
//! into components.

use log::info;
use rstar::{RTree, RTreeObject, AABB};
use serde::{Deserialize, Serialize};

use crate::geometry::{BoundingBox, Point, EPSILON};
use crate::union_find::UnionFind;

/// Configuration for coarse grouping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupConfig {
    /// Maximum point-pair distance for two trajectories to be adjacent, in
    /// coordinate units. Default: 100.0
    pub eps: f64,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self { eps: 100.0 }
    }
}

/// Fixed-size coordinate wrapper satisfying the R-tree point contract for
/// any dimension.
#[derive(Debug, Clone, Copy, PartialEq)]
struct RPoint<const D: usize>([f64; D]);

impl<const D: usize> rstar::Point for RPoint<D> {
    type Scalar = f64;
    const DIMENSIONS: usize = D;

    fn generate(mut generator: impl FnMut(usize) -> f64) -> Self {
        RPoint(std::array::from_fn(|i| generator(i)))
    }

    fn nth(&self, index: usize) -> f64 {
        self.0[index]
    }

    fn nth_mut(&mut self, index: usize) -> &mut f64 {
        &mut self.0[index]
    }
}

/// Per-trajectory bounds entry for the R-tree prefilter.
#[derive(Debug, Clone)]
struct TrajectoryBounds<const D: usize> {
    index: usize,
    bounds: BoundingBox<D>,
}

impl<const D: usize> RTreeObject for TrajectoryBounds<D> {
    type Envelope = AABB<RPoint<D>>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(RPoint(self.bounds.lo), RPoint(self.bounds.hi))
    }
}

/// Partition trajectories into proximity groups.
///
/// Returns one `Vec` of original trajectory indices per group, groups
/// ordered by their smallest member, members ascending. Trajectories
/// without any points stay in singleton groups.
///
/// # Example
/// ```
/// use trajclust::{group_trajectories, GroupConfig, Point};
///
/// let trajectories = vec![
///     vec![Point::xy(0.0, 0.0)],
///     vec![Point::xy(1.0, 1.0)],
/// ];
/// let groups = group_trajectories(&trajectories, &GroupConfig { eps: 2.0 });
/// assert_eq!(groups, vec![vec![0, 1]]);
/// ```
pub fn group_trajectories<const D: usize>(
    trajectories: &[Vec<Point<D>>],
    config: &GroupConfig,
) -> Vec<Vec<usize>> {
    if trajectories.is_empty() {
        return Vec::new();
    }

    let mut components = UnionFind::new(trajectories.len());

    let bounds: Vec<TrajectoryBounds<D>> = trajectories
        .iter()
        .enumerate()
        .filter_map(|(index, trajectory)| {
            BoundingBox::from_points(trajectory).map(|bounds| TrajectoryBounds { index, bounds })
        })
        .collect();
    let rtree = RTree::bulk_load(bounds.clone());

    for item in &bounds {
        let inflated = item.bounds.inflated(config.eps);
        let search = AABB::from_corners(RPoint(inflated.lo), RPoint(inflated.hi));
        for candidate in rtree.locate_in_envelope_intersecting(&search) {
            // Each unordered pair is tested once.
            if candidate.index <= item.index {
                continue;
            }
            if any_point_pair_within(
                &trajectories[item.index],
                &trajectories[candidate.index],
                config.eps,
            ) {
                components.union(item.index, candidate.index);
            }
        }
    }

    let groups = components.groups();
    info!(
        "grouping: {} trajectories -> {} groups (eps={})",
        trajectories.len(),
        groups.len(),
        config.eps
    );
    groups
}

/// Single-link adjacency test: whether any point of `a` lies within `eps`
/// of any point of `b`. Stops at the first qualifying pair.
fn any_point_pair_within<const D: usize>(a: &[Point<D>], b: &[Point<D>], eps: f64) -> bool {
    a.iter()
        .any(|p| b.iter().any(|q| p.distance(q) <= eps + EPSILON))
}
