//! Kernel primitives on double-precision 3D points.

/// A point in 3D space as `[x, y, z]`.
pub type Point = [f64; 3];

/// Squared Euclidean distance between two points.
#[inline]
pub fn squared_distance(p: &Point, q: &Point) -> f64 {
    let dx = p[0] - q[0];
    let dy = p[1] - q[1];
    let dz = p[2] - q[2];
    dx * dx + dy * dy + dz * dz
}

/// Arithmetic mean of the given points, or `None` for an empty set.
///
/// The mean is updated incrementally, so it stays finite for any finite input
/// where a running sum would overflow.
pub fn centroid<I>(points: I) -> Option<Point>
where
    I: IntoIterator<Item = Point>,
{
    let mut mean = [0.0; 3];
    let mut count = 0usize;
    for p in points {
        count += 1;
        let n = count as f64;
        for axis in 0..3 {
            mean[axis] += p[axis] / n - mean[axis] / n;
        }
    }
    (count > 0).then_some(mean)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_squared_distance() {
        assert_eq!(squared_distance(&[0.0, 0.0, 0.0], &[1.0, 2.0, 2.0]), 9.0);
        assert_eq!(squared_distance(&[1.0, 1.0, 1.0], &[1.0, 1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_centroid() {
        let c = centroid([[0.0, 0.0, 0.0], [2.0, 4.0, 6.0]]).unwrap();
        assert_eq!(c, [1.0, 2.0, 3.0]);
        assert!(centroid(std::iter::empty()).is_none());
    }

    #[test]
    fn test_centroid_near_f64_max() {
        let c = centroid([[1.7e308, 0.0, -1.7e308], [1.0e308, 0.0, -1.0e308], [1.6e308, 0.0, -1.6e308]]).unwrap();
        assert!(c.iter().all(|x| x.is_finite()));
        assert!((c[0] / 1e308 - 4.3 / 3.0).abs() < 1e-12);
        assert_eq!(c[1], 0.0);
        assert_eq!(c[2], -c[0]);
    }
}
