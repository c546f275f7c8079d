//! Static 3D kd-tree over point indices.
//!
//! The tree never copies points: it stores a permutation of the indices it was
//! built from and reads coordinates through a [`PointAccessor`]. The same
//! accessor must be passed to every query.

use tracing::debug;

use crate::accessor::PointAccessor;
use crate::bounds::BoundingBox;
use crate::geometry::{squared_distance, Point};
use crate::nearest::NearestNeighbors;

pub(crate) const LEAF: usize = usize::MAX;

#[derive(Clone, Copy, Debug)]
pub(crate) struct KdNode {
    /// Tight bounds of the points below this node.
    pub(crate) bounds: BoundingBox,
    pub(crate) left: usize, // LEAF if leaf
    pub(crate) right: usize,
    // Leaf data: indices[start..end]
    pub(crate) start: usize,
    pub(crate) end: usize,
    // Internal node data: left child coords <= split_val <= right child coords
    pub(crate) split_val: f64,
    pub(crate) axis: u8,
}

impl KdNode {
    fn leaf(bounds: BoundingBox, start: usize, end: usize) -> Self {
        KdNode {
            bounds,
            left: LEAF,
            right: LEAF,
            start,
            end,
            split_val: 0.0,
            axis: 0,
        }
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.left == LEAF
    }
}

#[derive(Clone, Copy)]
struct BuildTask {
    node: usize,
    start: usize,
    end: usize,
    cell: BoundingBox,
    depth: usize,
}

/// Balanced kd-tree built with the sliding midpoint rule.
#[derive(Clone, Debug)]
pub struct KdTree {
    pub(crate) nodes: Vec<KdNode>,
    pub(crate) indices: Vec<usize>,
    leaf_bucket_size: usize,
}

impl KdTree {
    /// Builds a tree over `indices`, reading points through `accessor`.
    ///
    /// Every index must be valid for `accessor`. `leaf_bucket_size` is clamped to at least 1.
    pub fn build<A>(accessor: &A, indices: Vec<usize>, leaf_bucket_size: usize) -> Self
    where
        A: PointAccessor + ?Sized,
    {
        let mut tree = KdTree {
            nodes: Vec::new(),
            indices,
            leaf_bucket_size: leaf_bucket_size.max(1),
        };

        let count = tree.indices.len();
        if count == 0 {
            return tree;
        }

        // A tree with single-point leaves has 2*N - 1 nodes
        tree.nodes.reserve(2 * count.div_ceil(tree.leaf_bucket_size));

        // Sliding-midpoint trees can be as deep as the point count on skewed
        // inputs, so nodes are built from an explicit work stack. The root is node 0.
        let root_cell = BoundingBox::from_points(tree.indices.iter().map(|&i| accessor.point(i)));
        tree.nodes.push(KdNode::leaf(root_cell, 0, count));
        let mut stack = vec![BuildTask {
            node: 0,
            start: 0,
            end: count,
            cell: root_cell,
            depth: 0,
        }];
        let mut max_depth = 0;
        while let Some(task) = stack.pop() {
            max_depth = max_depth.max(task.depth);
            if let Some((left, right)) = tree.split_node(accessor, &task) {
                stack.push(right);
                stack.push(left);
            }
        }

        debug!(
            points = count,
            nodes = tree.nodes.len(),
            leaves = tree.nodes.iter().filter(|n| n.is_leaf()).count(),
            depth = max_depth,
            leaf_bucket_size = tree.leaf_bucket_size,
            "built kd-tree"
        );
        tree
    }

    /// Fills in the node of `task`. Returns the child tasks if the node was split.
    fn split_node<A>(&mut self, accessor: &A, task: &BuildTask) -> Option<(BuildTask, BuildTask)>
    where
        A: PointAccessor + ?Sized,
    {
        let BuildTask { node, start, end, cell, depth } = *task;
        let count = end - start;
        let bounds =
            BoundingBox::from_points(self.indices[start..end].iter().map(|&i| accessor.point(i)));

        // Leaf condition: few points, or all points coincide and no plane can separate them
        if count <= self.leaf_bucket_size || bounds.is_degenerate() {
            self.nodes[node] = KdNode::leaf(bounds, start, end);
            return None;
        }

        let (axis, split_val) = sliding_midpoint(&cell, &bounds);
        let mid = self.partition(accessor, start, end, axis, split_val);

        let mut left_cell = cell;
        left_cell.max[axis] = split_val;
        let mut right_cell = cell;
        right_cell.min[axis] = split_val;

        let left = self.nodes.len();
        self.nodes.push(KdNode::leaf(left_cell, start, mid));
        let right = self.nodes.len();
        self.nodes.push(KdNode::leaf(right_cell, mid, end));

        self.nodes[node] = KdNode {
            bounds,
            left,
            right,
            start,
            end,
            split_val,
            axis: axis as u8,
        };
        Some((
            BuildTask { node: left, start, end: mid, cell: left_cell, depth: depth + 1 },
            BuildTask { node: right, start: mid, end, cell: right_cell, depth: depth + 1 },
        ))
    }

    /// Moves indices with `coord < split_val` to the front of `start..end` and
    /// returns the boundary. If that side would be empty (the plane slid onto the
    /// lowest point), the first lowest point is moved to the front on its own.
    fn partition<A>(&mut self, accessor: &A, start: usize, end: usize, axis: usize, split_val: f64) -> usize
    where
        A: PointAccessor + ?Sized,
    {
        let mut mid = start;
        for i in start..end {
            if accessor.point(self.indices[i])[axis] < split_val {
                self.indices.swap(i, mid);
                mid += 1;
            }
        }

        if mid == start {
            let lowest = (start..end)
                .find(|&i| accessor.point(self.indices[i])[axis] <= split_val)
                .unwrap_or(start);
            self.indices.swap(start, lowest);
            mid = start + 1;
        }
        mid
    }

    /// Index of the root node. Only meaningful for a non-empty tree.
    #[inline]
    pub(crate) fn root(&self) -> usize {
        0
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The indexed point indices, in tree order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn leaf_bucket_size(&self) -> usize {
        self.leaf_bucket_size
    }

    /// Lazily yields the indexed points by increasing distance to `query`.
    pub fn nearest<'a, A>(&'a self, accessor: &'a A, query: Point) -> NearestNeighbors<'a, A>
    where
        A: PointAccessor + ?Sized,
    {
        NearestNeighbors::new(self, accessor, query)
    }

    /// Reports every index whose point lies within `radius` of `center`.
    ///
    /// With `epsilon > 0` the search is fuzzy: points at a distance in
    /// `(radius, radius * (1 + epsilon)]` may be reported as well. Order is unspecified.
    pub fn range_search<A, F>(&self, accessor: &A, center: Point, radius: f64, epsilon: f64, callback: &mut F)
    where
        A: PointAccessor + ?Sized,
        F: FnMut(usize),
    {
        if self.nodes.is_empty() {
            return;
        }
        let outer = radius * (1.0 + epsilon);
        let sphere = Sphere {
            center,
            radius_sq: radius * radius,
            outer_radius_sq: outer * outer,
        };

        let mut stack = vec![self.root()];
        while let Some(node_idx) = stack.pop() {
            let node = &self.nodes[node_idx];

            // Pruning: box entirely outside the sphere
            if node.bounds.min_squared_distance(&sphere.center) > sphere.radius_sq {
                continue;
            }

            // Box entirely inside the (fuzzy) sphere: report without distance checks
            if node.bounds.max_squared_distance(&sphere.center) <= sphere.outer_radius_sq {
                for &idx in &self.indices[node.start..node.end] {
                    callback(idx);
                }
                continue;
            }

            if node.is_leaf() {
                for &idx in &self.indices[node.start..node.end] {
                    if squared_distance(&accessor.point(idx), &sphere.center) <= sphere.radius_sq {
                        callback(idx);
                    }
                }
                continue;
            }

            let axis = node.axis as usize;
            let diff = sphere.center[axis] - node.split_val;

            // Visit the child on the query's side first
            let (first, second) = if diff < 0.0 { (node.left, node.right) } else { (node.right, node.left) };
            if diff * diff <= sphere.radius_sq {
                stack.push(second);
            }
            stack.push(first);
        }
    }
}

struct Sphere {
    center: Point,
    radius_sq: f64,
    outer_radius_sq: f64,
}

/// Picks the cutting plane for a node.
///
/// The axis is the longest side of the node's cell and the plane its midpoint.
/// If the points have no spread along that axis, the longest side of their tight
/// bounds is used instead. A plane outside the tight bounds slides onto the
/// nearest extreme point so neither child ends up empty.
fn sliding_midpoint(cell: &BoundingBox, tight: &BoundingBox) -> (usize, f64) {
    let mut axis = cell.longest_axis();
    let mut split_val = (cell.min[axis] + cell.max[axis]) / 2.0;
    if tight.extent(axis) <= 0.0 {
        axis = tight.longest_axis();
        split_val = (tight.min[axis] + tight.max[axis]) / 2.0;
    }

    if tight.max[axis] <= split_val {
        split_val = tight.max[axis];
    }
    if tight.min[axis] >= split_val {
        split_val = tight.min[axis];
    }
    (axis, split_val)
}
