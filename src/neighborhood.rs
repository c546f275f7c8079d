use rayon::prelude::*;

use crate::accessor::PointAccessor;
use crate::config::NeighborhoodConfig;
use crate::error::{NeighborhoodError, QueryStatus};
use crate::geometry::Point;
use crate::kdtree::KdTree;
use crate::nearest::NearestNeighbors;
use crate::query::{KNeighborQuery, NeighborQuery, RangeNeighborQuery};
use crate::voxel::voxelize;

/// Precomputed search structure giving access to local neighborhoods of a point set.
///
/// The neighborhood indexes positions of the caller's point sequence and reads
/// coordinates through the accessor `A`. Pass a reference (`&[Point]`,
/// [`FlatPoints`](crate::FlatPoints), ...) to keep the points owned by the caller;
/// the borrow then guarantees the points outlive the neighborhood and are not
/// mutated while it exists.
///
/// Once built the structure is immutable, so queries can run concurrently from
/// any number of threads when `A: Sync`.
///
/// ```
/// use pointhood::{Neighborhood, NeighborQuery};
///
/// let points = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [5.0, 0.0, 0.0]];
/// let neighborhood = Neighborhood::new(&points[..]);
///
/// let knn = neighborhood.k_neighbor_query(2).unwrap();
/// let (indices, status) = knn.neighbors([0.1, 0.0, 0.0]);
/// assert_eq!(indices, vec![0, 1]);
/// assert!(status.is_complete());
/// ```
#[derive(Clone, Debug)]
pub struct Neighborhood<A> {
    accessor: A,
    tree: KdTree,
    voxel_size: Option<f64>,
}

impl<A> Neighborhood<A>
where
    A: PointAccessor,
{
    /// Indexes every point of `accessor`.
    pub fn new(accessor: A) -> Self {
        let indices = (0..accessor.len()).collect();
        let tree = KdTree::build(&accessor, indices, NeighborhoodConfig::default().leaf_bucket_size);
        Neighborhood {
            accessor,
            tree,
            voxel_size: None,
        }
    }

    /// Indexes a simplified version of the point set.
    ///
    /// Points are binned on a grid of cubic cells of side `voxel_size` and only
    /// the point closest to the centroid of each occupied cell is kept. Queries
    /// then run against the representatives, which gives neighborhoods at a
    /// coarser scale.
    pub fn with_voxel_size(accessor: A, voxel_size: f64) -> Result<Self, NeighborhoodError> {
        Self::with_config(accessor, NeighborhoodConfig::default().with_voxel_size(voxel_size))
    }

    /// Indexes the point set using the given build parameters.
    pub fn with_config(accessor: A, config: NeighborhoodConfig) -> Result<Self, NeighborhoodError> {
        let indices = (0..accessor.len()).collect();
        Self::build(accessor, indices, config)
    }

    /// Indexes only the given positions of the point set.
    ///
    /// Repeated indices are kept once. Fails with [`NeighborhoodError::InvalidIndex`]
    /// if any index is out of range for the accessor.
    pub fn from_indices<I>(accessor: A, indices: I, config: NeighborhoodConfig) -> Result<Self, NeighborhoodError>
    where
        I: IntoIterator<Item = usize>,
    {
        let len = accessor.len();
        let mut seen = vec![false; len];
        let mut unique = Vec::new();
        for index in indices {
            if index >= len {
                return Err(NeighborhoodError::InvalidIndex { index, len });
            }
            if !seen[index] {
                seen[index] = true;
                unique.push(index);
            }
        }
        Self::build(accessor, unique, config)
    }

    fn build(accessor: A, mut indices: Vec<usize>, config: NeighborhoodConfig) -> Result<Self, NeighborhoodError> {
        config.validate()?;
        if let Some(voxel_size) = config.voxel_size {
            indices = voxelize(&accessor, &indices, voxel_size)?;
        }
        let tree = KdTree::build(&accessor, indices, config.leaf_bucket_size);
        Ok(Neighborhood {
            accessor,
            tree,
            voxel_size: config.voxel_size,
        })
    }

    /// Returns a query producing the `k` nearest indexed points.
    pub fn k_neighbor_query(&self, k: usize) -> Result<KNeighborQuery<'_, A>, NeighborhoodError> {
        KNeighborQuery::new(self, k)
    }

    /// Returns a query producing all indexed points within `radius`.
    pub fn range_neighbor_query(&self, radius: f64) -> Result<RangeNeighborQuery<'_, A>, NeighborhoodError> {
        RangeNeighborQuery::new(self, radius)
    }

    /// Iterates over the indexed points by increasing distance to `query`.
    ///
    /// Equal distances come out in ascending index order. The iterator is lazy,
    /// so stopping early (e.g. at the first point beyond some radius) only pays
    /// for the part of the tree that was needed.
    pub fn nearest(&self, query: Point) -> NearestNeighbors<'_, A> {
        self.tree.nearest(&self.accessor, query)
    }

    /// Fuzzy sphere search: reports every point within `radius` of `query`, and
    /// possibly points up to `radius * (1 + epsilon)`.
    pub fn range_neighbors_fuzzy<F>(&self, query: Point, radius: f64, epsilon: f64, mut sink: F) -> Result<(), NeighborhoodError>
    where
        F: FnMut(usize),
    {
        check_radius(radius)?;
        if !(epsilon >= 0.0) {
            return Err(NeighborhoodError::InvalidEpsilon { epsilon });
        }
        self.tree.range_search(&self.accessor, query, radius, epsilon, &mut sink);
        Ok(())
    }

    pub(crate) fn k_neighbors<F>(&self, query: Point, k: usize, mut sink: F) -> QueryStatus
    where
        F: FnMut(usize),
    {
        let mut found = 0;
        for neighbor in self.nearest(query).take(k) {
            sink(neighbor.index);
            found += 1;
        }
        if found < k {
            QueryStatus::Underfull { found, requested: k }
        } else {
            QueryStatus::Complete
        }
    }

    pub(crate) fn range_neighbors<F>(&self, query: Point, radius: f64, mut sink: F)
    where
        F: FnMut(usize),
    {
        self.tree.range_search(&self.accessor, query, radius, 0.0, &mut sink);
    }

    /// Computes the neighborhood of every point of the input sequence, in parallel.
    ///
    /// Entry `i` holds the neighbors of `accessor.point(i)` and the query status,
    /// including input points that were dropped by voxel simplification.
    pub fn par_input_neighborhoods<Q>(&self, query: &Q) -> Vec<(Vec<usize>, QueryStatus)>
    where
        A: Sync,
        Q: NeighborQuery + Sync,
    {
        (0..self.accessor.len())
            .into_par_iter()
            .map(|i| query.neighbors(self.accessor.point(i)))
            .collect()
    }

    pub fn accessor(&self) -> &A {
        &self.accessor
    }

    /// The indexed positions, in unspecified order.
    pub fn indices(&self) -> &[usize] {
        self.tree.indices()
    }

    /// Number of indexed points (after simplification, if any).
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn voxel_size(&self) -> Option<f64> {
        self.voxel_size
    }

    pub fn leaf_bucket_size(&self) -> usize {
        self.tree.leaf_bucket_size()
    }
}

pub(crate) fn check_radius(radius: f64) -> Result<(), NeighborhoodError> {
    // Also rejects NaN
    if radius >= 0.0 {
        Ok(())
    } else {
        Err(NeighborhoodError::InvalidRadius { radius })
    }
}
