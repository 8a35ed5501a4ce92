//! Axis-aligned bounding boxes for octree nodes and ray pruning.

use crate::physics::math::{Ray, Scalar, Vector};

#[derive(Debug, Clone, Copy)]
pub struct Aabb3d {
    pub min: Vector,
    pub max: Vector,
}

impl Aabb3d {
    pub fn new(min: Vector, max: Vector) -> Self {
        Self { min, max }
    }

    pub fn from_center_size(center: Vector, size: Scalar) -> Self {
        let half = Vector::splat(size * 0.5);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    #[inline]
    pub fn center(&self) -> Vector {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn size(&self) -> Vector {
        self.max - self.min
    }

    /// Whether `point` lies within the box, boundary inclusive.
    #[inline]
    pub fn contains(&self, point: Vector) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// The box grown by `margin` on every face.
    pub fn expanded(&self, margin: Scalar) -> Self {
        let margin = Vector::splat(margin);
        Self {
            min: self.min - margin,
            max: self.max + margin,
        }
    }

    /// Slab-method ray intersection. Axes the ray is parallel to degenerate
    /// to a containment test on the origin.
    pub fn intersects_ray(&self, ray: &Ray) -> bool {
        let origin = ray.origin.to_array();
        let direction = ray.direction.to_array();
        let min = self.min.to_array();
        let max = self.max.to_array();

        let mut t_enter: Scalar = 0.0;
        let mut t_exit = Scalar::INFINITY;

        for axis in 0..3 {
            if direction[axis] == 0.0 {
                // Parallel to this slab: degenerate to a containment test.
                if origin[axis] < min[axis] || origin[axis] > max[axis] {
                    return false;
                }
                continue;
            }

            let inv = 1.0 / direction[axis];
            let t0 = (min[axis] - origin[axis]) * inv;
            let t1 = (max[axis] - origin[axis]) * inv;
            let (near, far) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };

            t_enter = t_enter.max(near);
            t_exit = t_exit.min(far);

            if t_enter > t_exit {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_center_size_round_trips() {
        let aabb = Aabb3d::from_center_size(Vector::new(1.0, -2.0, 3.0), 8.0);
        assert_eq!(aabb.center(), Vector::new(1.0, -2.0, 3.0));
        assert_eq!(aabb.size(), Vector::splat(8.0));
    }

    #[test]
    fn contains_is_boundary_inclusive() {
        let aabb = Aabb3d::from_center_size(Vector::ZERO, 10.0);

        assert!(aabb.contains(Vector::ZERO));
        assert!(aabb.contains(Vector::new(5.0, -5.0, 5.0)));
        assert!(!aabb.contains(Vector::new(5.1, 0.0, 0.0)));
    }

    #[test]
    fn ray_hits_and_misses() {
        let aabb = Aabb3d::from_center_size(Vector::new(10.0, 0.0, 0.0), 2.0);

        let hit = Ray::new(Vector::ZERO, Vector::new(1.0, 0.0, 0.0));
        assert!(aabb.intersects_ray(&hit));

        let behind = Ray::new(Vector::ZERO, Vector::new(-1.0, 0.0, 0.0));
        assert!(!aabb.intersects_ray(&behind));

        let offset = Ray::new(Vector::new(0.0, 5.0, 0.0), Vector::new(1.0, 0.0, 0.0));
        assert!(!aabb.intersects_ray(&offset));
    }

    #[test]
    fn ray_starting_inside_hits() {
        let aabb = Aabb3d::from_center_size(Vector::ZERO, 4.0);
        let ray = Ray::new(Vector::new(1.0, 1.0, 1.0), Vector::new(0.0, 0.0, 1.0));
        assert!(aabb.intersects_ray(&ray));
    }

    #[test]
    fn ray_parallel_to_axis_respects_slabs() {
        let aabb = Aabb3d::from_center_size(Vector::ZERO, 4.0);

        let inside_slab = Ray::new(Vector::new(-10.0, 1.0, 1.0), Vector::new(1.0, 0.0, 0.0));
        assert!(aabb.intersects_ray(&inside_slab));

        let outside_slab = Ray::new(Vector::new(-10.0, 3.0, 1.0), Vector::new(1.0, 0.0, 0.0));
        assert!(!aabb.intersects_ray(&outside_slab));
    }
}
