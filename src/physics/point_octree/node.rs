//! Nodes of the dynamic point octree.

use crate::physics::aabb3d::Aabb3d;
use crate::physics::math::{Ray, Scalar, Vector};

/// Objects a node holds before it splits.
const NUM_OBJECTS_ALLOWED: usize = 8;

/// An object and the position it was stored at.
#[derive(Debug)]
pub(super) struct PointEntry<T> {
    pub obj: T,
    pub position: Vector,
}

/// A cubic node. Either a leaf holding up to [`NUM_OBJECTS_ALLOWED`] entries
/// or an interior node with eight children; splitting moves every entry down,
/// so a node with children holds no entries of its own (except entries that
/// arrive when the children are already at minimum size).
#[derive(Debug)]
pub(super) struct PointOctreeNode<T> {
    center: Vector,
    side_length: Scalar,
    min_size: Scalar,
    objects: Vec<PointEntry<T>>,
    children: Option<Box<[PointOctreeNode<T>; 8]>>,
}

/// Offset direction of the child octant at `index`, one unit per axis.
/// Bit 0 is x, bit 1 is y, bit 2 is z; a set bit means the positive side.
pub(super) fn octant_offset(index: usize) -> Vector {
    Vector::new(
        if index & 1 != 0 { 1.0 } else { -1.0 },
        if index & 2 != 0 { 1.0 } else { -1.0 },
        if index & 4 != 0 { 1.0 } else { -1.0 },
    )
}

impl<T: PartialEq> PointOctreeNode<T> {
    pub fn new(side_length: Scalar, min_size: Scalar, center: Vector) -> Self {
        Self {
            center,
            side_length,
            min_size,
            objects: Vec::new(),
            children: None,
        }
    }

    pub fn center(&self) -> Vector {
        self.center
    }

    pub fn side_length(&self) -> Scalar {
        self.side_length
    }

    pub fn aabb(&self) -> Aabb3d {
        Aabb3d::from_center_size(self.center, self.side_length)
    }

    /// Index of the octant whose region contains `position`, boundary
    /// positions going to the positive side's neighbor only when strictly
    /// greater than the center.
    pub fn best_fit_child(&self, position: Vector) -> usize {
        (position.x > self.center.x) as usize
            | (((position.y > self.center.y) as usize) << 1)
            | (((position.z > self.center.z) as usize) << 2)
    }

    /// Attempts to store `entry`, returning it unchanged when its position
    /// falls outside this node's cube.
    pub fn add(&mut self, entry: PointEntry<T>) -> Result<(), PointEntry<T>> {
        if !self.aabb().contains(entry.position) {
            return Err(entry);
        }
        self.sub_add(entry);
        Ok(())
    }

    /// Stores an entry known to fit in this cube.
    fn sub_add(&mut self, entry: PointEntry<T>) {
        if self.children.is_none() {
            if self.objects.len() < NUM_OBJECTS_ALLOWED
                || self.side_length / 2.0 < self.min_size
            {
                self.objects.push(entry);
                return;
            }
            self.split();
        }
        self.route_to_child(entry);
    }

    /// Creates the eight children and moves every stored entry down into
    /// them.
    fn split(&mut self) {
        let quarter = self.side_length / 4.0;
        let half = self.side_length / 2.0;

        self.children = Some(Box::new(std::array::from_fn(|index| {
            PointOctreeNode::new(
                half,
                self.min_size,
                self.center + octant_offset(index) * quarter,
            )
        })));

        for entry in std::mem::take(&mut self.objects) {
            self.route_to_child(entry);
        }
    }

    fn route_to_child(&mut self, entry: PointEntry<T>) {
        let index = self.best_fit_child(entry.position);
        if let Some(children) = &mut self.children {
            children[index].sub_add(entry);
        }
    }

    /// Removes the first entry equal to `obj`, searching this node and every
    /// descendant. Merges children back into this node when the remainder
    /// fits.
    pub fn remove(&mut self, obj: &T) -> bool {
        let mut removed = false;

        if let Some(index) = self.objects.iter().position(|entry| entry.obj == *obj) {
            self.objects.swap_remove(index);
            removed = true;
        } else if let Some(children) = &mut self.children {
            for child in children.iter_mut() {
                if child.remove(obj) {
                    removed = true;
                    break;
                }
            }
        }

        if removed && self.children.is_some() && self.should_merge() {
            self.merge();
        }
        removed
    }

    /// Children can merge into this node when their combined contents fit in
    /// one leaf and none of them has children of its own.
    fn should_merge(&self) -> bool {
        let mut total = self.objects.len();
        if let Some(children) = &self.children {
            for child in children.iter() {
                if child.children.is_some() {
                    return false;
                }
                total += child.objects.len();
            }
        }
        total <= NUM_OBJECTS_ALLOWED
    }

    fn merge(&mut self) {
        if let Some(children) = self.children.take() {
            for child in *children {
                self.objects.extend(child.objects);
            }
        }
    }

    /// Collects references to every object within `max_distance` of `ray`'s
    /// supporting line. Subtrees whose expanded bounds miss the ray are
    /// pruned.
    pub fn nearby<'a>(&'a self, ray: &Ray, max_distance: Scalar, results: &mut Vec<&'a T>) {
        if !self.aabb().expanded(max_distance).intersects_ray(ray) {
            return;
        }

        for entry in &self.objects {
            if ray.sqr_distance_to_point(entry.position) <= max_distance * max_distance {
                results.push(&entry.obj);
            }
        }

        if let Some(children) = &self.children {
            for child in children.iter() {
                child.nearby(ray, max_distance, results);
            }
        }
    }

    pub fn has_any_objects(&self) -> bool {
        if !self.objects.is_empty() {
            return true;
        }
        if let Some(children) = &self.children {
            return children.iter().any(|child| child.has_any_objects());
        }
        false
    }

    /// Shrinks toward the single occupied octant, if there is exactly one,
    /// without going below `min_length`. Returns the node to use as the new
    /// root, which is `self` unchanged when shrinking is not possible.
    pub fn shrink_if_possible(mut self, min_length: Scalar) -> Self {
        if self.side_length < 2.0 * min_length {
            return self;
        }
        if self.objects.is_empty() && self.children.is_none() {
            return self;
        }

        // All stored objects must agree on one octant.
        let mut best_fit: Option<usize> = None;
        for entry in &self.objects {
            let index = self.best_fit_child(entry.position);
            match best_fit {
                None => best_fit = Some(index),
                Some(existing) if existing != index => return self,
                Some(_) => {}
            }
        }

        match self.children.take() {
            None => {
                // Leaf: shrink in place onto the occupied octant.
                if let Some(index) = best_fit {
                    let quarter = self.side_length / 4.0;
                    self.center += octant_offset(index) * quarter;
                    self.side_length /= 2.0;
                }
                self
            }
            Some(children) => {
                // Interior node: exactly one occupied child can replace it.
                // A split node holds no objects of its own unless children
                // are at minimum size, in which case it cannot shrink
                // anyway; bail if any object remains here.
                if best_fit.is_some() {
                    self.children = Some(children);
                    return self;
                }

                let mut occupied: Option<usize> = None;
                for (index, child) in children.iter().enumerate() {
                    if child.has_any_objects() {
                        if occupied.is_some() {
                            self.children = Some(children);
                            return self;
                        }
                        occupied = Some(index);
                    }
                }

                match occupied.and_then(|target| children.into_iter().nth(target)) {
                    Some(child) => child,
                    // Everything is empty; discard the children.
                    None => self,
                }
            }
        }
    }

    /// Installs children directly; used when the tree grows outward and the
    /// old root becomes one octant of the new root.
    pub fn set_children(&mut self, children: [PointOctreeNode<T>; 8]) {
        self.children = Some(Box::new(children));
    }

    pub fn collect_bounds(&self, out: &mut Vec<Aabb3d>) {
        out.push(self.aabb());
        if let Some(children) = &self.children {
            for child in children.iter() {
                child.collect_bounds(out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(obj: i32, position: Vector) -> PointEntry<i32> {
        PointEntry { obj, position }
    }

    fn node(side: Scalar) -> PointOctreeNode<i32> {
        PointOctreeNode::new(side, 1.0, Vector::ZERO)
    }

    #[test]
    fn octant_offsets_cover_all_sign_combinations() {
        let mut seen = std::collections::HashSet::new();
        for index in 0..8 {
            let offset = octant_offset(index);
            assert_eq!(offset.x.abs(), 1.0);
            assert_eq!(offset.y.abs(), 1.0);
            assert_eq!(offset.z.abs(), 1.0);
            seen.insert((offset.x as i8, offset.y as i8, offset.z as i8));
        }
        assert_eq!(seen.len(), 8);
    }

    #[test]
    fn best_fit_child_matches_octant_offset() {
        let node = node(16.0);
        for index in 0..8 {
            let position = octant_offset(index) * 4.0;
            assert_eq!(node.best_fit_child(position), index);
        }
    }

    #[test]
    fn add_rejects_positions_outside_the_cube() {
        let mut node = node(16.0);
        let rejected = node.add(entry(1, Vector::new(100.0, 0.0, 0.0)));
        assert!(rejected.is_err());
        assert!(!node.has_any_objects());
    }

    #[test]
    fn node_splits_after_capacity_and_empties_itself() {
        let mut node = node(16.0);
        for i in 0..8 {
            let offset = octant_offset(i as usize) * 4.0;
            assert!(node.add(entry(i, offset)).is_ok());
        }
        assert!(node.children.is_none());

        assert!(node.add(entry(8, Vector::new(4.0, 4.0, 4.0))).is_ok());

        assert!(node.children.is_some());
        assert!(node.objects.is_empty());
    }

    #[test]
    fn node_below_min_size_never_splits() {
        let mut node = PointOctreeNode::new(1.5, 1.0, Vector::ZERO);
        for i in 0..20 {
            let t = (i as Scalar) / 40.0;
            assert!(node.add(entry(i, Vector::new(t, -t, 0.0))).is_ok());
        }
        assert!(node.children.is_none());
        assert_eq!(node.objects.len(), 20);
    }

    #[test]
    fn remove_searches_descendants_and_merges() {
        let mut node = node(16.0);
        for i in 0..9 {
            let offset = octant_offset((i % 8) as usize) * 4.0;
            assert!(node.add(entry(i, offset)).is_ok());
        }
        assert!(node.children.is_some());

        assert!(node.remove(&8));
        // Eight objects remain across leaf children; they merge back up.
        assert!(node.children.is_none());
        assert_eq!(node.objects.len(), 8);

        assert!(!node.remove(&8));
    }

    #[test]
    fn nearby_finds_objects_within_distance_of_ray_line() {
        let mut node = node(64.0);
        assert!(node.add(entry(1, Vector::new(10.0, 0.5, 0.0))).is_ok());
        assert!(node.add(entry(2, Vector::new(-20.0, 0.0, 0.8))).is_ok());
        assert!(node.add(entry(3, Vector::new(5.0, 10.0, 0.0))).is_ok());

        let ray = Ray::new(Vector::ZERO, Vector::new(1.0, 0.0, 0.0));
        let mut results = Vec::new();
        node.nearby(&ray, 1.0, &mut results);

        results.sort();
        // The query measures distance to the supporting line, so objects
        // behind the origin count too.
        assert_eq!(results, vec![&1, &2]);
    }

    #[test]
    fn shrink_leaf_collapses_onto_occupied_octant() {
        let mut node = node(16.0);
        assert!(node.add(entry(1, Vector::new(5.0, 5.0, 5.0))).is_ok());
        assert!(node.add(entry(2, Vector::new(3.0, 6.0, 2.0))).is_ok());

        let shrunk = node.shrink_if_possible(1.0);
        assert_eq!(shrunk.side_length(), 8.0);
        assert_eq!(shrunk.center(), Vector::new(4.0, 4.0, 4.0));
        assert!(shrunk.has_any_objects());
    }

    #[test]
    fn shrink_refuses_when_objects_straddle_octants() {
        let mut node = node(16.0);
        assert!(node.add(entry(1, Vector::new(5.0, 5.0, 5.0))).is_ok());
        assert!(node.add(entry(2, Vector::new(-5.0, 5.0, 5.0))).is_ok());

        let shrunk = node.shrink_if_possible(1.0);
        assert_eq!(shrunk.side_length(), 16.0);
    }

    #[test]
    fn shrink_respects_minimum_length() {
        let mut node = PointOctreeNode::new(16.0, 1.0, Vector::ZERO);
        assert!(node.add(entry(1, Vector::new(5.0, 5.0, 5.0))).is_ok());

        let shrunk = node.shrink_if_possible(16.0);
        assert_eq!(shrunk.side_length(), 16.0);
    }
}
