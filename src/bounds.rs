use crate::geometry::Point;

/// Axis-aligned bounding box in 3D space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl BoundingBox {
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Self { min, max }
    }

    /// An inverted box that any call to [`BoundingBox::extend`] will overwrite.
    pub fn empty() -> Self {
        Self {
            min: [f64::INFINITY; 3],
            max: [f64::NEG_INFINITY; 3],
        }
    }

    /// Tight box around the given points. Returns [`BoundingBox::empty`] for no points.
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Point>,
    {
        let mut b = Self::empty();
        for p in points {
            b.extend(&p);
        }
        b
    }

    pub fn extend(&mut self, p: &Point) {
        for axis in 0..3 {
            if p[axis] < self.min[axis] { self.min[axis] = p[axis]; }
            if p[axis] > self.max[axis] { self.max[axis] = p[axis]; }
        }
    }

    pub fn is_empty(&self) -> bool {
        (0..3).any(|axis| self.min[axis] > self.max[axis])
    }

    pub fn extent(&self, axis: usize) -> f64 {
        self.max[axis] - self.min[axis]
    }

    /// Axis with the largest extent. Ties resolve to the lower axis.
    pub fn longest_axis(&self) -> usize {
        let (ex, ey, ez) = (self.extent(0), self.extent(1), self.extent(2));
        if ex >= ey && ex >= ez {
            0
        } else if ey >= ez {
            1
        } else {
            2
        }
    }

    /// True if every extent is zero, i.e. the box collapsed to a single point.
    pub fn is_degenerate(&self) -> bool {
        (0..3).all(|axis| self.extent(axis) <= 0.0)
    }

    pub fn contains(&self, p: &Point) -> bool {
        (0..3).all(|axis| p[axis] >= self.min[axis] && p[axis] <= self.max[axis])
    }

    /// Squared distance from `p` to the closest point of the box (0 inside).
    pub fn min_squared_distance(&self, p: &Point) -> f64 {
        let mut d2 = 0.0;
        for axis in 0..3 {
            let d = (self.min[axis] - p[axis]).max(0.0).max(p[axis] - self.max[axis]);
            d2 += d * d;
        }
        d2
    }

    /// Squared distance from `p` to the farthest corner of the box.
    pub fn max_squared_distance(&self, p: &Point) -> f64 {
        let mut d2 = 0.0;
        for axis in 0..3 {
            let d = (p[axis] - self.min[axis]).abs().max((self.max[axis] - p[axis]).abs());
            d2 += d * d;
        }
        d2
    }
}
