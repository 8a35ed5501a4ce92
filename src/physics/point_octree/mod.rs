//! Dynamic octree over point-positioned objects.
//!
//! Unlike the gravitational octree, this tree persists across ticks and
//! mutates in place: it grows outward to swallow positions beyond its current
//! bounds and shrinks back after removals, never below its initial size.

mod node;

use node::{PointEntry, PointOctreeNode, octant_offset};

use crate::physics::aabb3d::Aabb3d;
use crate::physics::math::{Ray, Scalar, Vector};

/// Upper bound on consecutive doublings while chasing a single insertion.
/// Reaching it almost always means a non-finite position.
const MAX_GROW_ATTEMPTS: u32 = 32;

/// A loose spatial index mapping objects to the positions they were inserted
/// at. Objects are located by equality on removal, so each object is assumed
/// to be present at most once.
pub struct PointOctree<T: PartialEq> {
    root: PointOctreeNode<T>,
    count: usize,
    initial_size: Scalar,
    min_size: Scalar,
}

impl<T: PartialEq> PointOctree<T> {
    /// Creates an empty tree covering a cube of `initial_world_size` per
    /// side centered at `initial_world_pos`. `min_node_size` bounds
    /// subdivision and is clamped to the initial size when larger.
    pub fn new(
        initial_world_size: Scalar,
        initial_world_pos: Vector,
        min_node_size: Scalar,
    ) -> Self {
        let min_size = if min_node_size > initial_world_size {
            log::warn!(
                "Minimum node size must be at most the initial world size. Was: {min_node_size}, adjusted to: {initial_world_size}"
            );
            initial_world_size
        } else {
            min_node_size
        };

        Self {
            root: PointOctreeNode::new(initial_world_size, min_size, initial_world_pos),
            count: 0,
            initial_size: initial_world_size,
            min_size,
        }
    }

    /// Inserts `obj` at `position`, growing the tree toward the position as
    /// needed. Returns `false` without inserting when the growth attempt cap
    /// is exhausted, which indicates a non-finite or absurdly distant
    /// position.
    pub fn add(&mut self, obj: T, position: Vector) -> bool {
        let mut entry = PointEntry { obj, position };
        let mut attempts = 0u32;

        loop {
            match self.root.add(entry) {
                Ok(()) => {
                    self.count += 1;
                    return true;
                }
                Err(rejected) => {
                    entry = rejected;
                    attempts += 1;
                    if attempts > MAX_GROW_ATTEMPTS {
                        log::error!(
                            "Aborted add operation as it seemed to be going on forever ({} attempts) at position {position}",
                            attempts - 1
                        );
                        return false;
                    }
                    self.grow(position - self.root.center());
                }
            }
        }
    }

    /// Removes the first object equal to `obj`, shrinking the tree when the
    /// occupied region allows it. Returns whether anything was removed.
    pub fn remove(&mut self, obj: &T) -> bool {
        let removed = self.root.remove(obj);
        if removed {
            self.count -= 1;
            self.shrink();
        }
        removed
    }

    /// All objects within `max_distance` of the ray's supporting line.
    pub fn nearby(&self, ray: &Ray, max_distance: Scalar) -> Vec<&T> {
        let mut results = Vec::new();
        self.root.nearby(ray, max_distance, &mut results);
        results
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The cube currently covered by the root.
    pub fn world_bounds(&self) -> Aabb3d {
        self.root.aabb()
    }

    /// Bounding boxes of every node, for debug visualization.
    pub fn bounds(&self) -> Vec<Aabb3d> {
        let mut out = Vec::new();
        self.root.collect_bounds(&mut out);
        out
    }

    /// Doubles the side length, shifting the new root a half side toward
    /// `direction` so the old root becomes the octant on the opposite side.
    fn grow(&mut self, direction: Vector) {
        let sign = |d: Scalar| if d >= 0.0 { 1.0 } else { -1.0 };
        let signs = Vector::new(sign(direction.x), sign(direction.y), sign(direction.z));

        let old_side = self.root.side_length();
        let half = old_side / 2.0;
        let new_center = self.root.center() + signs * half;

        let old_root = std::mem::replace(
            &mut self.root,
            PointOctreeNode::new(old_side * 2.0, self.min_size, new_center),
        );

        // The old root's cube coincides with exactly one octant of the new
        // root, the one containing the old center.
        let root_octant = self.root.best_fit_child(old_root.center());
        let mut old_root = Some(old_root);
        let children = std::array::from_fn(|index| {
            if index == root_octant {
                match old_root.take() {
                    Some(node) => node,
                    None => PointOctreeNode::new(
                        old_side,
                        self.min_size,
                        new_center + octant_offset(index) * half,
                    ),
                }
            } else {
                PointOctreeNode::new(
                    old_side,
                    self.min_size,
                    new_center + octant_offset(index) * half,
                )
            }
        });
        self.root.set_children(children);
    }

    /// Replaces the root with its shrunk form when the occupied region has
    /// collapsed into a single octant. Bounded below by the initial size.
    fn shrink(&mut self) {
        let placeholder = PointOctreeNode::new(self.initial_size, self.min_size, Vector::ZERO);
        let root = std::mem::replace(&mut self.root, placeholder);
        self.root = root.shrink_if_possible(self.initial_size);
    }
}
