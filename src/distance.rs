//! Distance components between line segments.
//!
//! The partitioner and the segment clusterer share the same three
//! measures: perpendicular, parallel, and angular distance, each taken
//! against an explicit base segment. [`segment_distance`] combines them into
//! the modified norm used as the DBSCAN distance for trajectory segments.
//!
//! Degenerate (zero-length) segments contribute zero direction instead of
//! dividing by zero: their angular distance is zero and their perpendicular
//! distance degrades to a plain point-to-line distance.

use crate::geometry::{Segment, EPSILON};

/// Perpendicular distance of `other`'s endpoints from the line carrying
/// `base`, combined as `(l1² + l2²) / (l1 + l2)`. Zero when both endpoints
/// lie on the line.
pub fn perpendicular_distance<const D: usize>(base: &Segment<D>, other: &Segment<D>) -> f64 {
    let l1 = base.perpendicular_distance_to(&other.start);
    let l2 = base.perpendicular_distance_to(&other.end);
    let sum = l1 + l2;
    if sum <= EPSILON {
        0.0
    } else {
        (l1 * l1 + l2 * l2) / sum
    }
}

/// Parallel displacement between the segments: how far `other`'s projected
/// endpoints overhang `base`, taking the smaller of the two overhangs.
pub fn parallel_distance<const D: usize>(base: &Segment<D>, other: &Segment<D>) -> f64 {
    let ts = base.projection_parameter(&other.start);
    let te = base.projection_parameter(&other.end);
    let l1 = base.point_at(ts).distance(&base.start);
    let l2 = base.point_at(te).distance(&base.end);
    l1.min(l2)
}

/// Angular distance: the length of `other` scaled by the sine of the angle
/// between the segments. With `directional` set, segments pointing more
/// than 90 degrees apart pay the full length of `other` instead, so
/// opposite traversals of the same road are kept apart; without it the
/// angle is folded into [0, 90] and orientation is ignored.
pub fn angular_distance<const D: usize>(
    base: &Segment<D>,
    other: &Segment<D>,
    directional: bool,
) -> f64 {
    let other_len = other.length();
    let (Some(db), Some(doth)) = (base.direction(), other.direction()) else {
        // Zero-length on either side: no orientation to compare.
        return 0.0;
    };
    let mut cos = db.dot(&doth).clamp(-1.0, 1.0);
    if directional {
        if cos < 0.0 {
            return other_len;
        }
    } else {
        cos = cos.abs();
    }
    let sin = (1.0 - cos * cos).max(0.0).sqrt();
    other_len * sin
}

/// The modified norm between two trajectory segments: the sum of the
/// perpendicular, parallel, and angular components, measured against the
/// longer of the two so the result is symmetric in practice.
///
/// When orientation is ignored, an opposed shorter segment is reversed
/// before measuring, so traversals of the same road in both directions
/// compare the way aligned ones do.
pub fn segment_distance<const D: usize>(a: &Segment<D>, b: &Segment<D>, directional: bool) -> f64 {
    let (base, shorter) = if a.length() >= b.length() {
        (a, b)
    } else {
        (b, a)
    };
    if base.length() <= EPSILON {
        // Both segments are effectively points.
        return base.start.distance(&shorter.start);
    }

    let mut other = *shorter;
    if !directional {
        if let (Some(db), Some(d_other)) = (base.direction(), other.direction()) {
            if db.dot(&d_other) < 0.0 {
                other = other.reversed();
            }
        }
    }

    perpendicular_distance(base, &other)
        + parallel_distance(base, &other)
        + angular_distance(base, &other, directional)
}
