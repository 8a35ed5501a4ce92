//! Scalar and vector primitives shared by the spatial partitioning core.

use bevy_math::DQuat;

/// Scalar type for physics calculations (f64 for precision)
pub type Scalar = f64;

/// 3D vector type for positions, velocities, and forces
pub type Vector = bevy_math::DVec3;

/// A ray with a normalized direction, used for proximity queries.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vector,
    pub direction: Vector,
}

impl Ray {
    pub fn new(origin: Vector, direction: Vector) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Squared perpendicular distance from `point` to the ray's supporting
    /// line.
    #[inline]
    pub fn sqr_distance_to_point(&self, point: Vector) -> Scalar {
        self.direction.cross(point - self.origin).length_squared()
    }
}

/// Rotates `point` by `angle` radians about the axis through `pivot` along
/// `axis` (translate to pivot-relative, rotate, translate back).
pub fn rotate_about_pivot(point: Vector, pivot: Vector, axis: Vector, angle: Scalar) -> Vector {
    pivot + rotate_direction(point - pivot, axis, angle)
}

/// Rotates a direction vector by `angle` radians about an axis through the
/// origin. `axis` need not be normalized.
pub fn rotate_direction(direction: Vector, axis: Vector, angle: Scalar) -> Vector {
    DQuat::from_axis_angle(axis.normalize_or_zero(), angle) * direction
}
