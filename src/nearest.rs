use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::accessor::PointAccessor;
use crate::geometry::{squared_distance, Point};
use crate::kdtree::KdTree;

/// A point index together with its squared distance to the query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub distance_sq: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Entry {
    // Nodes sort before points at equal distance so that a point is only
    // emitted once no unexplored node can still hold a closer or equal point.
    Node(usize),
    Point(usize),
}

#[derive(Clone, Copy, Debug)]
struct SearchItem {
    dist_sq: f64,
    entry: Entry,
}

impl PartialEq for SearchItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SearchItem {}

impl PartialOrd for SearchItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SearchItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for Min-Heap behavior
        other
            .dist_sq
            .total_cmp(&self.dist_sq)
            .then_with(|| other.entry.cmp(&self.entry))
    }
}

/// Incremental best-first nearest neighbor search.
///
/// Yields the indexed points in non-decreasing distance to the query, equal
/// distances in ascending index order. Work is done lazily: taking the first
/// `k` items only explores the part of the tree needed to confirm them.
pub struct NearestNeighbors<'a, A: ?Sized> {
    tree: &'a KdTree,
    accessor: &'a A,
    query: Point,
    queue: BinaryHeap<SearchItem>,
}

impl<'a, A> NearestNeighbors<'a, A>
where
    A: PointAccessor + ?Sized,
{
    pub(crate) fn new(tree: &'a KdTree, accessor: &'a A, query: Point) -> Self {
        let mut queue = BinaryHeap::new();
        if !tree.nodes.is_empty() {
            let root = tree.root();
            queue.push(SearchItem {
                dist_sq: tree.nodes[root].bounds.min_squared_distance(&query),
                entry: Entry::Node(root),
            });
        }
        NearestNeighbors {
            tree,
            accessor,
            query,
            queue,
        }
    }
}

impl<A> Iterator for NearestNeighbors<'_, A>
where
    A: PointAccessor + ?Sized,
{
    type Item = Neighbor;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(item) = self.queue.pop() {
            match item.entry {
                Entry::Point(index) => {
                    return Some(Neighbor {
                        index,
                        distance_sq: item.dist_sq,
                    });
                }
                Entry::Node(node_idx) => {
                    let node = &self.tree.nodes[node_idx];
                    if node.is_leaf() {
                        for &index in &self.tree.indices[node.start..node.end] {
                            let d2 = squared_distance(&self.accessor.point(index), &self.query);
                            self.queue.push(SearchItem {
                                dist_sq: d2,
                                entry: Entry::Point(index),
                            });
                        }
                    } else {
                        for child in [node.left, node.right] {
                            let d2 = self.tree.nodes[child].bounds.min_squared_distance(&self.query);
                            self.queue.push(SearchItem {
                                dist_sq: d2,
                                entry: Entry::Node(child),
                            });
                        }
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;
    use rand::rngs::StdRng;

    #[test]
    fn test_nearest_matches_sorted_brute_force() {
        let mut rng = StdRng::seed_from_u64(11);
        // Coarse integer coordinates produce many exact distance ties.
        let points: Vec<Point> = (0..800)
            .map(|_| {
                [
                    rng.gen_range(0..8) as f64,
                    rng.gen_range(0..8) as f64,
                    rng.gen_range(0..8) as f64,
                ]
            })
            .collect();
        let tree = KdTree::build(&points, (0..points.len()).collect(), 6);

        for _ in 0..20 {
            let q = [rng.gen_range(0.0..8.0), rng.gen_range(0.0..8.0), 3.0];
            let found: Vec<usize> = NearestNeighbors::new(&tree, &points, q).map(|n| n.index).collect();

            let mut expected: Vec<usize> = (0..points.len()).collect();
            expected.sort_by(|&a, &b| {
                squared_distance(&points[a], &q)
                    .total_cmp(&squared_distance(&points[b], &q))
                    .then(a.cmp(&b))
            });
            assert_eq!(found, expected);
        }
    }

    #[test]
    fn test_nearest_reports_squared_distance() {
        let points: Vec<Point> = vec![[0.0, 0.0, 0.0], [3.0, 4.0, 0.0]];
        let tree = KdTree::build(&points, vec![0, 1], 1);
        let result: Vec<Neighbor> = NearestNeighbors::new(&tree, &points, [0.0, 0.0, 0.0]).collect();
        assert_eq!(
            result,
            vec![
                Neighbor { index: 0, distance_sq: 0.0 },
                Neighbor { index: 1, distance_sq: 25.0 },
            ]
        );
    }

    #[test]
    fn test_nearest_on_empty_tree() {
        let points: Vec<Point> = Vec::new();
        let tree = KdTree::build(&points, Vec::new(), 4);
        assert_eq!(NearestNeighbors::new(&tree, &points, [0.0; 3]).count(), 0);
    }
}
