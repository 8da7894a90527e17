//! # Trajectory Clustering Core
//!
//! Spatial-indexing and clustering engine for GPS trajectories. Given a
//! batch of recorded tracks, it finds recurring areas (coarse whole-track
//! groups) and recurring route segments (representative "common route"
//! polylines).
//!
//! This library provides:
//! - A generic KD-tree with dual point/segment bounding queries
//! - Generic density-based clustering (DBSCAN) over any indexed entity type
//! - MDL-based trajectory simplification into characteristic points
//! - TraClus partition-and-group clustering with sweep-line aggregation
//! - Coarse whole-trajectory grouping by proximity connected components
//!
//! Everything is generic over the coordinate dimension (2D or 3D) and
//! operates on fully materialized in-memory batches; the algorithms are
//! deterministic pure functions of their inputs.
//!
//! ## Features
//!
//! - **`parallel`** - Parallelize per-trajectory partitioning and
//!   per-cluster aggregation with rayon
//! - **`synthetic`** - Deterministic synthetic corpus generation for tests
//!   and benchmarks
//!
//! ## Quick Start
//!
//! ```rust
//! use trajclust::{cluster_trajectories, group_trajectories, GroupConfig, Point, TraclusConfig};
//!
//! // Six near-identical traversals of the same straight road.
//! let trajectories: Vec<Vec<Point<2>>> = (0..6)
//!     .map(|t| {
//!         (0..40)
//!             .map(|i| Point::xy(i as f64 * 25.0, (t % 3) as f64 * 4.0))
//!             .collect()
//!     })
//!     .collect();
//!
//! // Coarse grouping: everything is close together, so one group.
//! let groups = group_trajectories(&trajectories, &GroupConfig::default());
//! assert_eq!(groups.len(), 1);
//!
//! // Fine clustering: one representative polyline for the shared road.
//! let clusters = cluster_trajectories(&trajectories, &TraclusConfig::default()).unwrap();
//! assert_eq!(clusters.len(), 1);
//! assert!(clusters[0].length > 0.0);
//! ```

// Unified error handling
pub mod error;
pub use error::{Result, TraclusError};

// Geometric primitives and capability traits
pub mod geometry;
pub use geometry::{
    BoundingBox, Dimensioned, HasBoundingBox, HasNorm, Point, Rotation, Segment, EPSILON,
};

// Union-Find data structure for grouping
pub mod union_find;
pub use union_find::UnionFind;

// KD-tree spatial index
pub mod spatial_index;
pub use spatial_index::{KdTree, RangeQuery};

// Segment distance components (the "modified norm")
pub mod distance;
pub use distance::{angular_distance, parallel_distance, perpendicular_distance, segment_distance};

// Generic density-based clustering
pub mod dbscan;
pub use dbscan::{dbscan, dbscan_euclidean, dbscan_with_index, Labeling, NOISE};

// MDL trajectory partitioning
pub mod partition;
pub use partition::{partition, subsegments};

// TraClus orchestration and sweep-line aggregation
pub mod traclus;
pub use traclus::{
    cluster_trajectories, IndexedSegment, SegmentSpan, TraclusConfig, TrajectoryCluster,
};

// Coarse whole-trajectory grouping
pub mod grouping;
pub use grouping::{group_trajectories, GroupConfig};

// Synthetic corpus generation for tests and benchmarks
#[cfg(feature = "synthetic")]
pub mod synthetic;
