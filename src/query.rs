//! Neighbor queries bound to a [`Neighborhood`].
//!
//! Both query kinds are small `Copy` values holding a reference to the
//! neighborhood and their parameter, so consumers can be written against
//! [`NeighborQuery`] without caring which kind of neighborhood they receive.

use rayon::prelude::*;

use crate::accessor::PointAccessor;
use crate::error::{NeighborhoodError, QueryStatus};
use crate::geometry::Point;
use crate::neighborhood::{check_radius, Neighborhood};

/// Something that produces the neighbor indices of a query point.
pub trait NeighborQuery {
    /// Emits the neighbors of `query` into `sink`.
    fn apply<F>(&self, query: Point, sink: F) -> QueryStatus
    where
        F: FnMut(usize);

    /// Collects the neighbors of `query`.
    fn neighbors(&self, query: Point) -> (Vec<usize>, QueryStatus) {
        let mut out = Vec::new();
        let status = self.apply(query, |i| out.push(i));
        (out, status)
    }

    /// Collects the neighbors of every query point, in parallel.
    ///
    /// The result is identical to calling [`NeighborQuery::neighbors`] on each
    /// point in turn, status included.
    fn par_neighbors(&self, queries: &[Point]) -> Vec<(Vec<usize>, QueryStatus)>
    where
        Self: Sync,
    {
        queries.par_iter().map(|&q| self.neighbors(q)).collect()
    }
}

/// Query producing the `k` nearest indexed points, closest first.
///
/// Equidistant points are emitted in ascending index order. When the
/// neighborhood holds fewer than `k` points, all of them are emitted and the
/// status is [`QueryStatus::Underfull`].
#[derive(Debug)]
pub struct KNeighborQuery<'a, A> {
    neighborhood: &'a Neighborhood<A>,
    k: usize,
}

impl<'a, A> KNeighborQuery<'a, A>
where
    A: PointAccessor,
{
    /// Fails with [`NeighborhoodError::InvalidNeighborCount`] if `k == 0`.
    pub fn new(neighborhood: &'a Neighborhood<A>, k: usize) -> Result<Self, NeighborhoodError> {
        if k == 0 {
            return Err(NeighborhoodError::InvalidNeighborCount);
        }
        Ok(Self { neighborhood, k })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn neighborhood(&self) -> &'a Neighborhood<A> {
        self.neighborhood
    }
}

impl<A> Clone for KNeighborQuery<'_, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A> Copy for KNeighborQuery<'_, A> {}

impl<A> NeighborQuery for KNeighborQuery<'_, A>
where
    A: PointAccessor,
{
    fn apply<F>(&self, query: Point, sink: F) -> QueryStatus
    where
        F: FnMut(usize),
    {
        self.neighborhood.k_neighbors(query, self.k, sink)
    }
}

/// Query producing every indexed point within a fixed radius (boundary included).
///
/// Emission order is unspecified.
#[derive(Debug)]
pub struct RangeNeighborQuery<'a, A> {
    neighborhood: &'a Neighborhood<A>,
    radius: f64,
}

impl<'a, A> RangeNeighborQuery<'a, A>
where
    A: PointAccessor,
{
    /// Fails with [`NeighborhoodError::InvalidRadius`] for a negative or NaN radius.
    pub fn new(neighborhood: &'a Neighborhood<A>, radius: f64) -> Result<Self, NeighborhoodError> {
        check_radius(radius)?;
        Ok(Self { neighborhood, radius })
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn neighborhood(&self) -> &'a Neighborhood<A> {
        self.neighborhood
    }
}

impl<A> Clone for RangeNeighborQuery<'_, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A> Copy for RangeNeighborQuery<'_, A> {}

impl<A> NeighborQuery for RangeNeighborQuery<'_, A>
where
    A: PointAccessor,
{
    fn apply<F>(&self, query: Point, sink: F) -> QueryStatus
    where
        F: FnMut(usize),
    {
        self.neighborhood.range_neighbors(query, self.radius, sink);
        QueryStatus::Complete
    }
}
