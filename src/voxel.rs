//! Voxel-grid simplification of an index set.
//!
//! Every index is binned into the cell `(floor(x/s), floor(y/s), floor(z/s))`
//! of a lattice with side `s`. Each occupied cell keeps a single representative:
//! the point closest to the centroid of the cell's points.

use std::collections::BTreeMap;

use tracing::debug;

use crate::accessor::PointAccessor;
use crate::error::NeighborhoodError;
use crate::geometry::{centroid, squared_distance, Point};

/// Integer coordinates of a voxel cell.
pub type VoxelKey = [i64; 3];

/// Computes the voxel cell containing `p`.
///
/// `index` is only used to report which point overflowed.
pub fn voxel_key(p: &Point, voxel_size: f64, index: usize) -> Result<VoxelKey, NeighborhoodError> {
    let mut key = [0i64; 3];
    for axis in 0..3 {
        let cell = (p[axis] / voxel_size).floor();
        // i64::MAX is not representable as f64; 2^63 is the first value out of range.
        if !cell.is_finite() || cell < i64::MIN as f64 || cell >= i64::MAX as f64 {
            return Err(NeighborhoodError::CoordinateOverflow {
                index,
                coordinate: p[axis],
            });
        }
        key[axis] = cell as i64;
    }
    Ok(key)
}

/// Simplifies `indices` to at most one representative per occupied voxel.
///
/// Within a cell, the representative is the index whose point has the smallest
/// distance to the cell centroid, measured in units of `voxel_size` so it stays
/// finite for coordinates near `f64::MAX`. On exact ties the index met first in
/// `indices` wins. Representatives are returned in lexicographic order of their
/// cell keys.
pub fn voxelize<A>(
    accessor: &A,
    indices: &[usize],
    voxel_size: f64,
) -> Result<Vec<usize>, NeighborhoodError>
where
    A: PointAccessor + ?Sized,
{
    if !(voxel_size > 0.0 && voxel_size.is_finite()) {
        return Err(NeighborhoodError::InvalidVoxelSize { voxel_size });
    }

    let mut grid: BTreeMap<VoxelKey, Vec<usize>> = BTreeMap::new();
    for &i in indices {
        let key = voxel_key(&accessor.point(i), voxel_size, i)?;
        grid.entry(key).or_default().push(i);
    }

    let mut representatives = Vec::with_capacity(grid.len());
    for members in grid.values() {
        if let Some(chosen) = closest_to_centroid(accessor, members, voxel_size) {
            representatives.push(chosen);
        }
    }

    debug!(
        input = indices.len(),
        output = representatives.len(),
        voxel_size,
        "voxelized point set"
    );
    Ok(representatives)
}

fn closest_to_centroid<A>(accessor: &A, members: &[usize], voxel_size: f64) -> Option<usize>
where
    A: PointAccessor + ?Sized,
{
    let c = centroid(members.iter().map(|&i| accessor.point(i)))?;
    let mut chosen = None;
    let mut min_dist = f64::INFINITY;
    for &i in members {
        // Members share a cell, so every offset is below one voxel in cell units
        let p = accessor.point(i);
        let offset = [
            (p[0] - c[0]) / voxel_size,
            (p[1] - c[1]) / voxel_size,
            (p[2] - c[2]) / voxel_size,
        ];
        let d = squared_distance(&offset, &[0.0; 3]);
        if chosen.is_none() || d < min_dist {
            min_dist = d;
            chosen = Some(i);
        }
    }
    chosen
}
