//! # pointhood
//!
//! `pointhood` precomputes spatial search structures for a 3D point set and gives
//! fast access to local neighborhoods of points, as needed by feature extraction
//! and classification pipelines. It can be used from Rust as well as compiled to
//! WebAssembly (WASM).
//!
//! ## Features
//!
//! - **Index-only storage**: points stay in the caller's container and are read
//!   through a [`PointAccessor`]; the search structures only hold indices.
//! - **Sliding midpoint kd-tree**: balanced static tree with fuzzy sphere range
//!   search and incremental best-first nearest neighbor search.
//! - **Voxel simplification**: optionally index one representative per voxel cell
//!   to query neighborhoods at a coarser scale.
//! - **Parallel queries**: the built structure is immutable and can be queried
//!   from many threads, with `rayon` helpers for whole-cloud passes.
//!
//! ## Example
//!
//! ```
//! use pointhood::{Neighborhood, NeighborQuery};
//!
//! let mut points = Vec::new();
//! for x in 0..3 {
//!     for y in 0..3 {
//!         for z in 0..3 {
//!             points.push([x as f64, y as f64, z as f64]);
//!         }
//!     }
//! }
//! let neighborhood = Neighborhood::new(&points[..]);
//!
//! // The center and its six face neighbors.
//! let knn = neighborhood.k_neighbor_query(7).unwrap();
//! let (indices, _) = knn.neighbors([1.0, 1.0, 1.0]);
//! assert_eq!(indices[0], 13);
//!
//! // Points within unit distance of a corner.
//! let range = neighborhood.range_neighbor_query(1.0).unwrap();
//! assert_eq!(range.neighbors([0.0, 0.0, 0.0]).0.len(), 4);
//! ```
//!
//! ## Main Interface
//!
//! The primary entry point is the [`Neighborhood`] struct, which hands out
//! [`KNeighborQuery`] and [`RangeNeighborQuery`] values implementing [`NeighborQuery`].

mod accessor;
mod bounds;
mod config;
mod error;
mod geometry;
mod kdtree;
mod nearest;
mod neighborhood;
mod query;
pub mod voxel;
mod wasm;

pub use accessor::FlatPointBuffer;
pub use accessor::FlatPoints;
pub use accessor::FnAccessor;
pub use accessor::PointAccessor;
pub use bounds::BoundingBox;
pub use config::NeighborhoodConfig;
pub use config::DEFAULT_LEAF_BUCKET_SIZE;
pub use error::NeighborhoodError;
pub use error::QueryStatus;
pub use geometry::centroid;
pub use geometry::squared_distance;
pub use geometry::Point;
pub use kdtree::KdTree;
pub use nearest::NearestNeighbors;
pub use nearest::Neighbor;
pub use neighborhood::Neighborhood;
pub use query::KNeighborQuery;
pub use query::NeighborQuery;
pub use query::RangeNeighborQuery;
pub use wasm::{KNeighborsWASM, PointSetNeighborhoodWASM};
