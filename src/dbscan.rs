//! Generic density-based clustering (DBSCAN).
//!
//! Works over any entity type with a bounding box, using the KD-tree for
//! candidate pruning and a caller-supplied "modified norm" for the exact
//! distance test, so the same code clusters raw points (Euclidean norm) and
//! trajectory segments (perpendicular + parallel + angular norm).
//!
//! Labels are a side array owned exclusively by the running call: entities
//! are never mutated, and the scratch tri-state (unclassified / noise /
//! cluster id) is reset on entry and discarded into the returned
//! [`Labeling`].

use log::debug;

use crate::geometry::{HasBoundingBox, HasNorm, EPSILON};
use crate::spatial_index::KdTree;

/// Label for entities with too few neighbors to join any cluster.
pub const NOISE: i32 = -1;

/// Scratch label for entities not yet visited by the scan.
const UNCLASSIFIED: i32 = -2;

/// Result of a clustering pass: one label per input index.
///
/// Cluster ids are dense, start at 0, and are allocated in scan order, so
/// cluster 0 is the one whose lowest-index seed was reached first. Re-running
/// on identical input yields an identical labeling.
#[derive(Debug, Clone)]
pub struct Labeling {
    labels: Vec<i32>,
    cluster_count: usize,
}

impl Labeling {
    /// Label of the entity at `index`: a cluster id `>= 0` or [`NOISE`].
    pub fn label(&self, index: usize) -> i32 {
        self.labels[index]
    }

    /// All labels, indexed by entity position.
    pub fn labels(&self) -> &[i32] {
        &self.labels
    }

    /// Number of clusters found.
    pub fn cluster_count(&self) -> usize {
        self.cluster_count
    }

    /// Whether the entity at `index` was left unclustered.
    pub fn is_noise(&self, index: usize) -> bool {
        self.labels[index] == NOISE
    }

    /// Member indices per cluster, ordered by cluster id; members ascending.
    pub fn clusters(&self) -> Vec<Vec<usize>> {
        let mut clusters = vec![Vec::new(); self.cluster_count];
        for (index, &label) in self.labels.iter().enumerate() {
            if label >= 0 {
                clusters[label as usize].push(index);
            }
        }
        clusters
    }
}

/// Cluster `entities` with neighborhood radius `eps` and density threshold
/// `min_points`, building a fresh spatial index for the batch.
///
/// `norm` is the exact distance used after bounding-box pruning; it may be
/// direction-sensitive. See [`dbscan_with_index`] to reuse an index.
pub fn dbscan<K, F, const D: usize>(
    entities: &[K],
    eps: f64,
    min_points: usize,
    norm: F,
) -> Labeling
where
    K: HasBoundingBox<D>,
    F: Fn(&K, &K) -> f64,
{
    let index = KdTree::build(entities);
    dbscan_with_index(entities, &index, eps, min_points, norm)
}

/// Cluster entities using their natural pairwise distance as the norm.
pub fn dbscan_euclidean<K, const D: usize>(entities: &[K], eps: f64, min_points: usize) -> Labeling
where
    K: HasBoundingBox<D> + HasNorm,
{
    dbscan(entities, eps, min_points, |a, b| a.norm_to(b))
}

/// Cluster `entities` against a caller-retained index (which must have been
/// built over the same slice).
pub fn dbscan_with_index<K, F, const D: usize>(
    entities: &[K],
    index: &KdTree<D>,
    eps: f64,
    min_points: usize,
    norm: F,
) -> Labeling
where
    K: HasBoundingBox<D>,
    F: Fn(&K, &K) -> f64,
{
    let mut labels = vec![UNCLASSIFIED; entities.len()];

    // Fewer entities than the density threshold: nothing can cluster.
    if entities.len() < min_points {
        labels.fill(NOISE);
        return Labeling {
            labels,
            cluster_count: 0,
        };
    }

    let mut next_cluster: i32 = 0;

    for seed in 0..entities.len() {
        if labels[seed] != UNCLASSIFIED {
            continue;
        }

        let neighbors = neighborhood(entities, index, seed, eps, &norm);
        if neighbors.len() < min_points {
            // Provisional: a later expansion may still absorb this entity
            // as a border member of a cluster.
            labels[seed] = NOISE;
            continue;
        }

        let cluster = next_cluster;
        next_cluster += 1;

        let mut worklist: Vec<usize> = Vec::with_capacity(neighbors.len());
        for &n in &neighbors {
            labels[n] = cluster;
            if n != seed {
                worklist.push(n);
            }
        }

        while let Some(current) = worklist.pop() {
            let expansion = neighborhood(entities, index, current, eps, &norm);
            if expansion.len() < min_points {
                continue;
            }
            for &n in &expansion {
                match labels[n] {
                    UNCLASSIFIED => {
                        labels[n] = cluster;
                        worklist.push(n);
                    }
                    NOISE => labels[n] = cluster,
                    _ => {}
                }
            }
        }
    }

    debug!(
        "dbscan: {} entities -> {} clusters (eps={}, min_points={})",
        entities.len(),
        next_cluster,
        eps,
        min_points
    );

    Labeling {
        labels,
        cluster_count: next_cluster as usize,
    }
}

/// Epsilon-neighborhood of the entity at `center`: index candidates from the
/// bounding box inflated by `eps`, exact-filtered by the norm, ordered by
/// ascending index (stable tie-break), deduplicated. Includes `center`
/// itself.
fn neighborhood<K, F, const D: usize>(
    entities: &[K],
    index: &KdTree<D>,
    center: usize,
    eps: f64,
    norm: &F,
) -> Vec<usize>
where
    K: HasBoundingBox<D>,
    F: Fn(&K, &K) -> f64,
{
    let query = entities[center].bounding_box().inflated(eps);
    let mut result: Vec<usize> = index
        .search(&query)
        .filter(|&candidate| norm(&entities[center], &entities[candidate]) <= eps + EPSILON)
        .collect();
    result.sort_unstable();
    result.dedup();
    result
}
