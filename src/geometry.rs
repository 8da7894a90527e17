//! Geometric primitives for trajectory clustering.
//!
//! Everything in the crate is generic over the coordinate dimension `D`
//! (2 for planar tracks, 3 when elevation matters). The clustering engine
//! never touches concrete coordinates directly; it goes through the small
//! capability traits at the bottom of this module, so any type exposing a
//! bounding box can be indexed and clustered.

use serde::{Deserialize, Serialize};

/// Tolerance used for every threshold comparison in the crate.
///
/// Clustering decisions must be stable across platforms, so `<= eps` style
/// checks always allow this much slack instead of comparing floats exactly.
pub const EPSILON: f64 = 1e-9;

// ============================================================================
// Point
// ============================================================================

/// An immutable `D`-dimensional coordinate tuple.
///
/// Coordinates are expected in a consistent planar unit (e.g. meters after
/// projection). Non-finite coordinates are a caller precondition and are not
/// validated here.
///
/// # Example
/// ```
/// use trajclust::Point;
/// let a = Point::xy(0.0, 0.0);
/// let b = Point::xy(3.0, 4.0);
/// assert_eq!(a.distance(&b), 5.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point<const D: usize> {
    pub coords: [f64; D],
}

// Serde's array impls don't cover const-generic lengths, so points go
// through a plain coordinate sequence.
impl<const D: usize> Serialize for Point<D> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.coords.as_slice().serialize(serializer)
    }
}

impl<'de, const D: usize> Deserialize<'de> for Point<D> {
    fn deserialize<De>(deserializer: De) -> std::result::Result<Self, De::Error>
    where
        De: serde::Deserializer<'de>,
    {
        let values = Vec::<f64>::deserialize(deserializer)?;
        if values.len() != D {
            return Err(serde::de::Error::invalid_length(
                values.len(),
                &"a coordinate tuple matching the point dimension",
            ));
        }
        let mut coords = [0.0; D];
        coords.copy_from_slice(&values);
        Ok(Self { coords })
    }
}

impl<const D: usize> Point<D> {
    /// Create a point from raw coordinates.
    pub const fn new(coords: [f64; D]) -> Self {
        Self { coords }
    }

    /// The all-zero point (also used as the zero vector).
    pub fn origin() -> Self {
        Self { coords: [0.0; D] }
    }

    /// Coordinate on the given axis.
    pub fn coord(&self, axis: usize) -> f64 {
        self.coords[axis]
    }

    /// Component-wise sum.
    pub fn add(&self, other: &Self) -> Self {
        let mut coords = self.coords;
        for (c, o) in coords.iter_mut().zip(other.coords.iter()) {
            *c += o;
        }
        Self { coords }
    }

    /// Component-wise difference (`self - other`), i.e. the vector from
    /// `other` to `self`.
    pub fn sub(&self, other: &Self) -> Self {
        let mut coords = self.coords;
        for (c, o) in coords.iter_mut().zip(other.coords.iter()) {
            *c -= o;
        }
        Self { coords }
    }

    /// Scale every coordinate by `factor`.
    pub fn scale(&self, factor: f64) -> Self {
        let mut coords = self.coords;
        for c in coords.iter_mut() {
            *c *= factor;
        }
        Self { coords }
    }

    /// Dot product with another point interpreted as a vector.
    pub fn dot(&self, other: &Self) -> f64 {
        self.coords
            .iter()
            .zip(other.coords.iter())
            .map(|(a, b)| a * b)
            .sum()
    }

    /// Euclidean norm of this point interpreted as a vector.
    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Self) -> f64 {
        self.sub(other).norm()
    }

    /// Linear interpolation between `self` (t = 0) and `other` (t = 1).
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        self.add(&other.sub(self).scale(t))
    }

    /// Unit vector in this direction, or `None` for a (near-)zero vector.
    pub fn normalized(&self) -> Option<Self> {
        let n = self.norm();
        if n <= EPSILON {
            None
        } else {
            Some(self.scale(1.0 / n))
        }
    }

    /// Unit vector along the given coordinate axis.
    pub fn axis_unit(axis: usize) -> Self {
        let mut coords = [0.0; D];
        coords[axis] = 1.0;
        Self { coords }
    }
}

impl Point<2> {
    /// Convenience constructor for planar points.
    pub const fn xy(x: f64, y: f64) -> Self {
        Self { coords: [x, y] }
    }
}

impl Point<3> {
    /// Convenience constructor for 3D points.
    pub const fn xyz(x: f64, y: f64, z: f64) -> Self {
        Self { coords: [x, y, z] }
    }
}

// ============================================================================
// Bounding box
// ============================================================================

/// An axis-aligned box, the query currency of the spatial index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox<const D: usize> {
    pub lo: [f64; D],
    pub hi: [f64; D],
}

impl<const D: usize> BoundingBox<D> {
    /// Degenerate box containing a single point.
    pub fn from_point(p: &Point<D>) -> Self {
        Self {
            lo: p.coords,
            hi: p.coords,
        }
    }

    /// Smallest box containing all points, or `None` for an empty slice.
    pub fn from_points(points: &[Point<D>]) -> Option<Self> {
        let first = points.first()?;
        let mut b = Self::from_point(first);
        for p in &points[1..] {
            for axis in 0..D {
                b.lo[axis] = b.lo[axis].min(p.coords[axis]);
                b.hi[axis] = b.hi[axis].max(p.coords[axis]);
            }
        }
        Some(b)
    }

    /// Whether two boxes overlap (touching counts, with [`EPSILON`] slack).
    pub fn overlaps(&self, other: &Self) -> bool {
        for axis in 0..D {
            if self.lo[axis] > other.hi[axis] + EPSILON || other.lo[axis] > self.hi[axis] + EPSILON
            {
                return false;
            }
        }
        true
    }

    /// Whether the point lies inside the box (with [`EPSILON`] slack).
    pub fn contains(&self, p: &Point<D>) -> bool {
        for axis in 0..D {
            if p.coords[axis] < self.lo[axis] - EPSILON || p.coords[axis] > self.hi[axis] + EPSILON
            {
                return false;
            }
        }
        true
    }

    /// Box grown by `amount` on every side.
    pub fn inflated(&self, amount: f64) -> Self {
        let mut b = *self;
        for axis in 0..D {
            b.lo[axis] -= amount;
            b.hi[axis] += amount;
        }
        b
    }

    /// Smallest box containing both operands.
    pub fn merged(&self, other: &Self) -> Self {
        let mut b = *self;
        for axis in 0..D {
            b.lo[axis] = b.lo[axis].min(other.lo[axis]);
            b.hi[axis] = b.hi[axis].max(other.hi[axis]);
        }
        b
    }

    /// Center point of the box.
    pub fn center(&self) -> Point<D> {
        let mut coords = [0.0; D];
        for axis in 0..D {
            coords[axis] = (self.lo[axis] + self.hi[axis]) / 2.0;
        }
        Point::new(coords)
    }
}

// ============================================================================
// Segment
// ============================================================================

/// An ordered pair of points (start → end) with an orientation-dependent
/// direction. The bounding box always contains both endpoints regardless of
/// which one is "greater" per axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment<const D: usize> {
    pub start: Point<D>,
    pub end: Point<D>,
}

impl<const D: usize> Segment<D> {
    pub const fn new(start: Point<D>, end: Point<D>) -> Self {
        Self { start, end }
    }

    /// Vector from start to end.
    pub fn vector(&self) -> Point<D> {
        self.end.sub(&self.start)
    }

    /// Euclidean length.
    pub fn length(&self) -> f64 {
        self.vector().norm()
    }

    /// Unit direction, or `None` for a degenerate (zero-length) segment.
    pub fn direction(&self) -> Option<Point<D>> {
        self.vector().normalized()
    }

    /// Midpoint of the segment.
    pub fn midpoint(&self) -> Point<D> {
        self.start.lerp(&self.end, 0.5)
    }

    /// Point at parameter `t` along the segment (0 = start, 1 = end).
    pub fn point_at(&self, t: f64) -> Point<D> {
        self.start.lerp(&self.end, t)
    }

    /// Same segment with reversed orientation.
    pub fn reversed(&self) -> Self {
        Self {
            start: self.end,
            end: self.start,
        }
    }

    /// Parameter of the orthogonal projection of `p` onto the carrying line
    /// (unclamped; 0 at start, 1 at end). Degenerate segments project to 0.
    pub fn projection_parameter(&self, p: &Point<D>) -> f64 {
        let v = self.vector();
        let len_sq = v.dot(&v);
        if len_sq <= EPSILON * EPSILON {
            return 0.0;
        }
        p.sub(&self.start).dot(&v) / len_sq
    }

    /// Distance from `p` to the infinite line carrying this segment.
    /// Falls back to the distance to `start` for degenerate segments.
    pub fn perpendicular_distance_to(&self, p: &Point<D>) -> f64 {
        let t = self.projection_parameter(p);
        p.distance(&self.point_at(t))
    }
}

// ============================================================================
// Rotation
// ============================================================================

/// A rotation in the plane spanned by two direction vectors, taking the
/// first onto the second. Works identically in 2D and 3D (and any higher
/// dimension): vectors are decomposed into in-plane and orthogonal parts,
/// and only the in-plane part is rotated. The inverse is exact.
#[derive(Debug, Clone, Copy)]
pub struct Rotation<const D: usize> {
    u: Point<D>,
    w: Point<D>,
    cos: f64,
    sin: f64,
    identity: bool,
}

impl<const D: usize> Rotation<D> {
    /// Rotation aligning the direction of `from` with the direction of `to`.
    ///
    /// Degenerate inputs (zero vectors) yield the identity rotation, as does
    /// an already-aligned pair. Anti-parallel vectors rotate by half a turn
    /// in an arbitrary plane containing `from`.
    pub fn aligning(from: &Point<D>, to: &Point<D>) -> Self {
        let identity = Self {
            u: Point::origin(),
            w: Point::origin(),
            cos: 1.0,
            sin: 0.0,
            identity: true,
        };

        let (Some(u), Some(t)) = (from.normalized(), to.normalized()) else {
            return identity;
        };

        let cos = u.dot(&t).clamp(-1.0, 1.0);
        let residual = t.sub(&u.scale(cos));
        match residual.normalized() {
            Some(w) => {
                let sin = (1.0 - cos * cos).max(0.0).sqrt();
                Self {
                    u,
                    w,
                    cos,
                    sin,
                    identity: false,
                }
            }
            None if cos > 0.0 => identity,
            None => {
                // Anti-parallel: pick the basis axis least aligned with u
                // and orthogonalize it to obtain a rotation plane.
                let mut best_axis = 0;
                let mut best = f64::INFINITY;
                for axis in 0..D {
                    let a = u.coords[axis].abs();
                    if a < best {
                        best = a;
                        best_axis = axis;
                    }
                }
                let e = Point::axis_unit(best_axis);
                let w = e
                    .sub(&u.scale(u.dot(&e)))
                    .normalized()
                    .unwrap_or_else(|| Point::axis_unit(best_axis));
                Self {
                    u,
                    w,
                    cos: -1.0,
                    sin: 0.0,
                    identity: false,
                }
            }
        }
    }

    /// Apply the rotation to a point/vector.
    pub fn apply(&self, p: &Point<D>) -> Point<D> {
        self.rotate(p, self.sin)
    }

    /// Apply the inverse rotation.
    pub fn invert(&self, p: &Point<D>) -> Point<D> {
        self.rotate(p, -self.sin)
    }

    fn rotate(&self, p: &Point<D>, sin: f64) -> Point<D> {
        if self.identity {
            return *p;
        }
        let a = p.dot(&self.u);
        let b = p.dot(&self.w);
        p.sub(&self.u.scale(a))
            .sub(&self.w.scale(b))
            .add(&self.u.scale(a * self.cos - b * sin))
            .add(&self.w.scale(a * sin + b * self.cos))
    }
}

// ============================================================================
// Capability traits
// ============================================================================

/// Types with a fixed coordinate dimensionality.
pub trait Dimensioned {
    const DIM: usize;
}

/// Types that can report an axis-aligned bounding box, the only capability
/// the spatial index needs from its keys.
pub trait HasBoundingBox<const D: usize> {
    fn bounding_box(&self) -> BoundingBox<D>;
}

/// Types with a natural pairwise distance, used as the default norm by the
/// density clustering entry points that don't take a custom one.
pub trait HasNorm {
    fn norm_to(&self, other: &Self) -> f64;
}

impl<const D: usize> Dimensioned for Point<D> {
    const DIM: usize = D;
}

impl<const D: usize> Dimensioned for Segment<D> {
    const DIM: usize = D;
}

impl<const D: usize> HasBoundingBox<D> for Point<D> {
    fn bounding_box(&self) -> BoundingBox<D> {
        BoundingBox::from_point(self)
    }
}

impl<const D: usize> HasBoundingBox<D> for Segment<D> {
    fn bounding_box(&self) -> BoundingBox<D> {
        BoundingBox::from_point(&self.start).merged(&BoundingBox::from_point(&self.end))
    }
}

impl<const D: usize> HasNorm for Point<D> {
    fn norm_to(&self, other: &Self) -> f64 {
        self.distance(other)
    }
}
