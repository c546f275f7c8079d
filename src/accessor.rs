use crate::error::NeighborhoodError;
use crate::geometry::Point;

/// Maps an index in `0..len()` to the point stored at that position.
///
/// The neighborhood structures only ever store indices, so the caller is free
/// to keep points in whatever layout suits them (array of points, interleaved
/// coordinates, structure of arrays, a lazily computed view).
///
/// Implementations must be pure: repeated calls with the same index return the
/// same point. Calling [`PointAccessor::point`] with an index `>= len()` is a
/// contract violation and may panic; use [`PointAccessor::try_point`] to check.
pub trait PointAccessor {
    /// Number of points available.
    fn len(&self) -> usize;

    /// The point stored at `index`.
    fn point(&self, index: usize) -> Point;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checked variant of [`PointAccessor::point`].
    fn try_point(&self, index: usize) -> Result<Point, NeighborhoodError> {
        if index < self.len() {
            Ok(self.point(index))
        } else {
            Err(NeighborhoodError::InvalidIndex { index, len: self.len() })
        }
    }
}

impl PointAccessor for [Point] {
    fn len(&self) -> usize {
        <[Point]>::len(self)
    }

    #[inline]
    fn point(&self, index: usize) -> Point {
        self[index]
    }
}

impl PointAccessor for Vec<Point> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    #[inline]
    fn point(&self, index: usize) -> Point {
        self[index]
    }
}

impl<A: PointAccessor + ?Sized> PointAccessor for &A {
    fn len(&self) -> usize {
        (**self).len()
    }

    #[inline]
    fn point(&self, index: usize) -> Point {
        (**self).point(index)
    }
}

/// Points stored as a flat coordinate buffer `[x, y, z, x, y, z, ...]`.
///
/// Trailing values that do not form a full triple are ignored.
#[derive(Clone, Copy, Debug)]
pub struct FlatPoints<'a> {
    coords: &'a [f64],
}

impl<'a> FlatPoints<'a> {
    pub fn new(coords: &'a [f64]) -> Self {
        Self { coords }
    }
}

impl PointAccessor for FlatPoints<'_> {
    fn len(&self) -> usize {
        self.coords.len() / 3
    }

    #[inline]
    fn point(&self, index: usize) -> Point {
        [
            self.coords[index * 3],
            self.coords[index * 3 + 1],
            self.coords[index * 3 + 2],
        ]
    }
}

/// Owned counterpart of [`FlatPoints`].
#[derive(Clone, Debug, Default)]
pub struct FlatPointBuffer {
    coords: Vec<f64>,
}

impl FlatPointBuffer {
    pub fn new(coords: Vec<f64>) -> Self {
        Self { coords }
    }

    pub fn coords(&self) -> &[f64] {
        &self.coords
    }
}

impl PointAccessor for FlatPointBuffer {
    fn len(&self) -> usize {
        FlatPoints::new(&self.coords).len()
    }

    #[inline]
    fn point(&self, index: usize) -> Point {
        FlatPoints::new(&self.coords).point(index)
    }
}

/// Accessor backed by a closure, for points that live in some other container.
///
/// ```
/// use pointhood::{FnAccessor, PointAccessor};
///
/// struct Sample { position: [f64; 3], intensity: f32 }
/// let samples = vec![Sample { position: [1.0, 2.0, 3.0], intensity: 0.5 }];
/// let accessor = FnAccessor::new(samples.len(), |i| samples[i].position);
/// assert_eq!(accessor.point(0), [1.0, 2.0, 3.0]);
/// ```
#[derive(Clone, Copy)]
pub struct FnAccessor<F> {
    len: usize,
    f: F,
}

impl<F> FnAccessor<F>
where
    F: Fn(usize) -> Point,
{
    pub fn new(len: usize, f: F) -> Self {
        Self { len, f }
    }
}

impl<F> std::fmt::Debug for FnAccessor<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnAccessor").field("len", &self.len).finish_non_exhaustive()
    }
}

impl<F> PointAccessor for FnAccessor<F>
where
    F: Fn(usize) -> Point,
{
    fn len(&self) -> usize {
        self.len
    }

    #[inline]
    fn point(&self, index: usize) -> Point {
        (self.f)(index)
    }
}
