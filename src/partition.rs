//! Trajectory partitioning via minimum description length.
//!
//! Reduces a point sequence to its characteristic points: the places where
//! the trajectory meaningfully changes behavior. At each candidate extension
//! the cost of spanning the accumulated run with one segment (encoding
//! length plus perpendicular and angular approximation error) is compared
//! against the cost of keeping every original step; the span survives while
//! it is not worse by more than `cost_advantage`, which biases the result
//! toward fewer, longer segments and keeps GPS noise from fragmenting the
//! partition.
//!
//! A second pass walks the characteristic polyline and merges consecutive
//! pieces until each emitted sub-segment is at least `min_length` long.

use crate::distance::{angular_distance, perpendicular_distance};
use crate::geometry::{Point, Segment, EPSILON};

/// Indices of the characteristic points of `points`.
///
/// Always contains the first and last index; trajectories of two or fewer
/// points pass through unchanged.
pub fn partition<const D: usize>(points: &[Point<D>], cost_advantage: f64) -> Vec<usize> {
    if points.len() <= 2 {
        return (0..points.len()).collect();
    }

    let mut characteristic = vec![0usize];
    let mut start = 0;
    let mut length = 1;

    while start + length < points.len() {
        let current = start + length;
        let spanning = spanning_cost(points, start, current);
        let split = split_cost(points, start, current);

        // Cut at the previous point once spanning the run costs more than
        // keeping it, beyond the configured bias. A run of length one can
        // never be cut (it *is* a single original step).
        if spanning > split + cost_advantage && current - 1 > start {
            characteristic.push(current - 1);
            start = current - 1;
            length = 1;
        } else {
            length += 1;
        }
    }

    characteristic.push(points.len() - 1);
    characteristic
}

/// Start/end index pairs of sub-segments along the characteristic polyline,
/// each at least `min_length` long. Trailing remainder shorter than
/// `min_length` is dropped.
pub fn subsegments<const D: usize>(
    points: &[Point<D>],
    characteristic: &[usize],
    min_length: f64,
) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    if characteristic.len() < 2 {
        return out;
    }

    let mut cut = characteristic[0];
    let mut accumulated = 0.0;
    for pair in characteristic.windows(2) {
        accumulated += points[pair[0]].distance(&points[pair[1]]);
        if accumulated + EPSILON >= min_length {
            out.push((cut, pair[1]));
            cut = pair[1];
            accumulated = 0.0;
        }
    }
    out
}

/// Cost of treating `points[start..=end]` as a single segment: encoding
/// length of the span plus the perpendicular and angular error of every
/// original step against it, each step paying its own description length.
fn spanning_cost<const D: usize>(points: &[Point<D>], start: usize, end: usize) -> f64 {
    let span = Segment::new(points[start], points[end]);
    let mut cost = encoding_cost(span.length());
    for i in start..end {
        let step = Segment::new(points[i], points[i + 1]);
        cost += encoding_cost(perpendicular_distance(&span, &step));
        cost += encoding_cost(angular_distance(&span, &step, true));
    }
    cost
}

/// Cost of keeping every original step of `points[start..=end]` (no
/// approximation error by construction).
fn split_cost<const D: usize>(points: &[Point<D>], start: usize, end: usize) -> f64 {
    (start..end)
        .map(|i| encoding_cost(points[i].distance(&points[i + 1])))
        .sum()
}

/// log2 description length of a distance. Distances below one unit clamp to
/// zero cost so coincident points stay finite and the comparison stays
/// monotone near zero.
fn encoding_cost(distance: f64) -> f64 {
    if distance < 1.0 {
        0.0
    } else {
        distance.log2()
    }
}
