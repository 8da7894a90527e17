//! Partition-and-group trajectory clustering (TraClus).
//!
//! Finds recurring route segments across many recordings and aggregates
//! each group into one representative polyline.
//!
//! ## Algorithm
//! 1. Partition every trajectory into characteristic sub-segments (MDL
//!    criterion, minimum segment length), tagging each segment with its
//!    originating trajectory and local index range.
//! 2. Density-cluster the full segment collection using the combined
//!    perpendicular/parallel/angular segment norm.
//! 3. For each cluster whose segments span enough distinct trajectories,
//!    rotate all members so the cluster's mean direction lies along the
//!    first axis.
//! 4. Sweep the rotated endpoints in order, maintaining the set of segments
//!    covering the sweep position; while coverage stays at or above the
//!    trajectory threshold, emit the cross-segment average at spaced
//!    positions.
//! 5. Rotate the emitted polyline back and attach per-trajectory provenance
//!    ranges. Clusters that never emitted a point are dropped.

use std::collections::BTreeMap;

use log::info;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::dbscan::dbscan;
use crate::distance::segment_distance;
use crate::error::{Result, TraclusError};
use crate::geometry::{BoundingBox, HasBoundingBox, Point, Rotation, Segment, EPSILON};
use crate::partition::{partition, subsegments};

/// Configuration for trajectory clustering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraclusConfig {
    /// Neighborhood radius for segment clustering, in coordinate units.
    /// Default: 25.0
    pub eps: f64,

    /// Minimum neighbor count for a dense segment, and minimum number of
    /// distinct trajectories a cluster must span to be reported.
    /// Default: 3
    pub min_segments: usize,

    /// Whether the segment norm penalizes opposed orientations. When false,
    /// traversals of the same road in both directions cluster together.
    /// Default: true
    pub directional: bool,

    /// Minimum length of a partitioned sub-segment, and (divided by sqrt 2)
    /// the spacing of representative polyline vertices. Default: 50.0
    pub min_length: f64,

    /// MDL bias (in bits) favoring fewer, longer segments during
    /// partitioning, which keeps GPS noise from fragmenting trajectories.
    /// Default: 25.0
    pub cost_advantage: f64,
}

impl Default for TraclusConfig {
    fn default() -> Self {
        Self {
            eps: 25.0,
            min_segments: 3,
            directional: true,
            min_length: 50.0,
            cost_advantage: 25.0,
        }
    }
}

impl TraclusConfig {
    /// Reject configurations that would make a run meaningless.
    pub fn validate(&self) -> Result<()> {
        TraclusError::require_positive("eps", self.eps)?;
        TraclusError::require_positive("minLength", self.min_length)?;
        if self.min_segments == 0 {
            return Err(TraclusError::InvalidParameter {
                name: "minSegments",
                value: 0.0,
                reason: "must be at least 1",
            });
        }
        if self.cost_advantage < 0.0 {
            return Err(TraclusError::InvalidParameter {
                name: "costAdvantage",
                value: self.cost_advantage,
                reason: "must not be negative",
            });
        }
        Ok(())
    }
}

/// A partitioned trajectory segment with provenance.
///
/// Provenance is assigned once during partitioning and never changes; the
/// sweep step keeps its rotated endpoints in its own per-cluster scratch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedSegment<const D: usize> {
    pub segment: Segment<D>,
    /// Index of the originating trajectory in the input batch.
    pub trajectory: usize,
    /// Local start point index within that trajectory.
    pub start_index: usize,
    /// Local end point index within that trajectory.
    pub end_index: usize,
    /// Local segment order within the trajectory's partition.
    pub order: usize,
}

impl<const D: usize> HasBoundingBox<D> for IndexedSegment<D> {
    fn bounding_box(&self) -> BoundingBox<D> {
        self.segment.bounding_box()
    }
}

/// A contributing index range of one trajectory within a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentSpan {
    pub trajectory: usize,
    pub start_index: usize,
    pub end_index: usize,
}

/// One output cluster: the representative polyline and where it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrajectoryCluster<const D: usize> {
    /// Averaged path through the cluster, in original orientation.
    pub representative: Vec<Point<D>>,
    /// Total length of the representative polyline.
    pub length: f64,
    /// Merged contributing index ranges, ordered by trajectory then start.
    pub contributions: Vec<SegmentSpan>,
}

/// Cluster a batch of trajectories into representative polylines.
///
/// Clusters are returned in the order their first segment was scanned, so
/// identical input order yields identical output. Empty input, or input
/// producing no segment at least `min_length` long, yields an empty list.
///
/// # Example
/// ```
/// use trajclust::{cluster_trajectories, Point, TraclusConfig};
///
/// let trajectories: Vec<Vec<Point<2>>> = (0..4)
///     .map(|t| {
///         (0..30)
///             .map(|i| Point::xy(i as f64 * 20.0, t as f64 * 2.0))
///             .collect()
///     })
///     .collect();
///
/// let config = TraclusConfig {
///     eps: 20.0,
///     min_segments: 3,
///     ..TraclusConfig::default()
/// };
/// let clusters = cluster_trajectories(&trajectories, &config).unwrap();
/// assert_eq!(clusters.len(), 1);
/// ```
pub fn cluster_trajectories<const D: usize>(
    trajectories: &[Vec<Point<D>>],
    config: &TraclusConfig,
) -> Result<Vec<TrajectoryCluster<D>>> {
    config.validate()?;

    let segments = partition_all(trajectories, config);
    if segments.is_empty() {
        return Ok(Vec::new());
    }
    info!(
        "traclus: {} trajectories partitioned into {} segments",
        trajectories.len(),
        segments.len()
    );

    let labeling = dbscan(&segments, config.eps, config.min_segments, |a, b| {
        segment_distance(&a.segment, &b.segment, config.directional)
    });
    let clusters = labeling.clusters();

    #[cfg(feature = "parallel")]
    let representatives: Vec<TrajectoryCluster<D>> = clusters
        .par_iter()
        .filter_map(|members| aggregate_cluster(&segments, members, config))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let representatives: Vec<TrajectoryCluster<D>> = clusters
        .iter()
        .filter_map(|members| aggregate_cluster(&segments, members, config))
        .collect();

    info!(
        "traclus: {} dense clusters -> {} representatives",
        clusters.len(),
        representatives.len()
    );
    Ok(representatives)
}

/// Partition every trajectory and collect the tagged segments, preserving
/// input order for deterministic clustering.
fn partition_all<const D: usize>(
    trajectories: &[Vec<Point<D>>],
    config: &TraclusConfig,
) -> Vec<IndexedSegment<D>> {
    #[cfg(feature = "parallel")]
    let per_trajectory: Vec<Vec<IndexedSegment<D>>> = trajectories
        .par_iter()
        .enumerate()
        .map(|(id, trajectory)| trajectory_segments(trajectory, id, config))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let per_trajectory: Vec<Vec<IndexedSegment<D>>> = trajectories
        .iter()
        .enumerate()
        .map(|(id, trajectory)| trajectory_segments(trajectory, id, config))
        .collect();

    per_trajectory.into_iter().flatten().collect()
}

fn trajectory_segments<const D: usize>(
    trajectory: &[Point<D>],
    id: usize,
    config: &TraclusConfig,
) -> Vec<IndexedSegment<D>> {
    let characteristic = partition(trajectory, config.cost_advantage);
    subsegments(trajectory, &characteristic, config.min_length)
        .into_iter()
        .enumerate()
        .map(|(order, (start_index, end_index))| IndexedSegment {
            segment: Segment::new(trajectory[start_index], trajectory[end_index]),
            trajectory: id,
            start_index,
            end_index,
            order,
        })
        .collect()
}

/// A cluster member with its endpoints rotated into the sweep frame,
/// normalized so `u` leads on the sweep axis.
struct SweepSegment<const D: usize> {
    trajectory: usize,
    u: Point<D>,
    v: Point<D>,
}

/// An endpoint crossing in the sweep.
struct SweepEvent {
    x: f64,
    segment: usize,
    entry: bool,
}

/// Aggregate one dense cluster into a representative polyline, or `None`
/// when the cluster spans too few trajectories or never reaches the
/// coverage threshold.
fn aggregate_cluster<const D: usize>(
    segments: &[IndexedSegment<D>],
    members: &[usize],
    config: &TraclusConfig,
) -> Option<TrajectoryCluster<D>> {
    let mut distinct: Vec<usize> = members.iter().map(|&m| segments[m].trajectory).collect();
    distinct.sort_unstable();
    distinct.dedup();
    if distinct.len() < config.min_segments {
        return None;
    }

    // Mean direction of the cluster. Without direction sensitivity,
    // opposed members are flipped into the dominant orientation first so
    // anti-parallel traversals reinforce instead of cancelling.
    let mut mean = Point::origin();
    for &m in members {
        let mut v = segments[m].segment.vector();
        if !config.directional && v.dot(&mean) < 0.0 {
            v = v.scale(-1.0);
        }
        mean = mean.add(&v);
    }
    let rotation = Rotation::aligning(&mean, &Point::axis_unit(0));

    let sweep: Vec<SweepSegment<D>> = members
        .iter()
        .map(|&m| {
            let s = &segments[m];
            let a = rotation.apply(&s.segment.start);
            let b = rotation.apply(&s.segment.end);
            let (u, v) = if a.coord(0) <= b.coord(0) {
                (a, b)
            } else {
                (b, a)
            };
            SweepSegment {
                trajectory: s.trajectory,
                u,
                v,
            }
        })
        .collect();

    let mut events: Vec<SweepEvent> = Vec::with_capacity(sweep.len() * 2);
    for (i, s) in sweep.iter().enumerate() {
        events.push(SweepEvent {
            x: s.u.coord(0),
            segment: i,
            entry: true,
        });
        events.push(SweepEvent {
            x: s.v.coord(0),
            segment: i,
            entry: false,
        });
    }
    events.sort_by(|a, b| a.x.total_cmp(&b.x).then_with(|| b.entry.cmp(&a.entry)));

    let spacing = config.min_length / std::f64::consts::SQRT_2;
    let mut active = vec![false; sweep.len()];
    let mut active_count = 0usize;
    let mut vertices: Vec<Point<D>> = Vec::new();
    let mut last_emitted = f64::NEG_INFINITY;

    let mut i = 0;
    while i < events.len() {
        let x = events[i].x;
        let mut group_end = i;
        while group_end < events.len() && events[group_end].x - x <= EPSILON {
            group_end += 1;
        }

        // Events at one sweep coordinate are applied insertions-first, so a
        // segment chain from the same trajectory re-entering exactly where
        // the previous piece ended counts as a continuation instead of
        // momentarily dropping coverage.
        for event in &events[i..group_end] {
            if event.entry && !active[event.segment] {
                active[event.segment] = true;
                active_count += 1;
            }
        }

        if active_count >= config.min_segments && x - last_emitted + EPSILON >= spacing {
            vertices.push(average_at(&sweep, &active, x));
            last_emitted = x;
        }

        for event in &events[i..group_end] {
            if !event.entry && active[event.segment] {
                active[event.segment] = false;
                active_count -= 1;
            }
        }

        i = group_end;
    }

    if vertices.is_empty() {
        return None;
    }

    let representative: Vec<Point<D>> = vertices.iter().map(|p| rotation.invert(p)).collect();
    let length = representative
        .windows(2)
        .map(|w| w[0].distance(&w[1]))
        .sum();

    Some(TrajectoryCluster {
        representative,
        length,
        contributions: merge_contributions(segments, members),
    })
}

/// Average of every active segment's interpolation at the sweep position.
fn average_at<const D: usize>(sweep: &[SweepSegment<D>], active: &[bool], x: f64) -> Point<D> {
    let mut sum = Point::origin();
    let mut count = 0usize;
    for (s, &on) in sweep.iter().zip(active) {
        if !on {
            continue;
        }
        let dx = s.v.coord(0) - s.u.coord(0);
        let p = if dx.abs() <= EPSILON {
            s.u.lerp(&s.v, 0.5)
        } else {
            s.u.lerp(&s.v, ((x - s.u.coord(0)) / dx).clamp(0.0, 1.0))
        };
        sum = sum.add(&p);
        count += 1;
    }
    sum.scale(1.0 / count as f64)
}

/// Merge each trajectory's contributing ranges into maximal spans, ordered
/// by trajectory then start index.
fn merge_contributions<const D: usize>(
    segments: &[IndexedSegment<D>],
    members: &[usize],
) -> Vec<SegmentSpan> {
    let mut by_trajectory: BTreeMap<usize, Vec<(usize, usize)>> = BTreeMap::new();
    for &m in members {
        let s = &segments[m];
        by_trajectory
            .entry(s.trajectory)
            .or_default()
            .push((s.start_index, s.end_index));
    }

    let mut out = Vec::new();
    for (trajectory, mut ranges) in by_trajectory {
        ranges.sort_unstable();
        let mut current = ranges[0];
        for &(start, end) in &ranges[1..] {
            if start <= current.1 {
                current.1 = current.1.max(end);
            } else {
                out.push(SegmentSpan {
                    trajectory,
                    start_index: current.0,
                    end_index: current.1,
                });
                current = (start, end);
            }
        }
        out.push(SegmentSpan {
            trajectory,
            start_index: current.0,
            end_index: current.1,
        });
    }
    out
}
