//! Point-mass bodies with a relativistic speed limit.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::PhysicsConfig;
use crate::physics::math::{self, Scalar, Vector};

/// Mass assigned to bodies when none is specified.
pub const DEFAULT_BODY_MASS: Scalar = 1e6;

static NEXT_BODY_ID: AtomicU64 = AtomicU64::new(0);

/// Stable identity for a body, used to skip self-interaction during force
/// accumulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyId(u64);

impl BodyId {
    fn next() -> Self {
        Self(NEXT_BODY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Radius for a body of the given mass, assuming uniform density.
///
/// Inverse of the sphere-volume equation, arbitrarily scaled and offset so
/// even very light bodies remain visible to callers that render them.
pub fn radius_for_mass(mass: Scalar) -> Scalar {
    10.0 * libm::cbrt(3.0 * mass / (4.0 * std::f64::consts::PI)) + 10.0
}

/// A massive body in the simulation.
///
/// `acceleration` is per-step scratch: force accumulation adds into it over
/// the course of a tick, and [`Body::integrate`] consumes and zeroes it.
#[derive(Debug, Clone)]
pub struct Body {
    id: BodyId,
    pub position: Vector,
    pub velocity: Vector,
    pub acceleration: Vector,
    mass: Scalar,
}

impl Body {
    /// Creates a body at rest with the default mass.
    pub fn new(position: Vector) -> Self {
        Self {
            id: BodyId::next(),
            position,
            velocity: Vector::ZERO,
            acceleration: Vector::ZERO,
            mass: DEFAULT_BODY_MASS,
        }
    }

    pub fn with_mass(mut self, mass: Scalar) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_velocity(mut self, velocity: Vector) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn id(&self) -> BodyId {
        self.id
    }

    pub fn mass(&self) -> Scalar {
        self.mass
    }

    pub fn radius(&self) -> Scalar {
        radius_for_mass(self.mass)
    }

    /// Advances the body by one tick, consuming the accumulated
    /// acceleration.
    ///
    /// The speed of light acts as a hard limit: the velocity is clamped to
    /// it (direction preserved) both before and after the acceleration is
    /// folded in, so `|velocity| <= c` holds on exit for arbitrarily large
    /// kicks. The velocity-addition formula alone only guarantees that for
    /// kicks below c.
    pub fn integrate(&mut self, physics: &PhysicsConfig) {
        let c = physics.speed_of_light;
        let speed = self.clamp_speed(c);

        if speed == 0.0 {
            self.velocity += self.acceleration * physics.speed_scale;
        } else {
            // Split the acceleration into components parallel and orthogonal
            // to the velocity; only the orthogonal part is scaled by alpha.
            let parallel = self.velocity
                * (self.acceleration.dot(self.velocity) / self.velocity.length_squared());
            let orthogonal = self.acceleration - parallel;
            let alpha = (1.0 - (speed / c) * (speed / c)).sqrt();

            self.velocity = (self.velocity + parallel + orthogonal * alpha)
                / (1.0 + self.velocity.dot(self.acceleration) / (c * c));
        }

        self.clamp_speed(c);

        // One tick is one unit of time; velocity doubles as the per-tick
        // displacement.
        self.position += self.velocity;
        self.acceleration = Vector::ZERO;
    }

    /// Clamps the velocity to magnitude `c`, returning the resulting speed.
    fn clamp_speed(&mut self, c: Scalar) -> Scalar {
        let speed = self.velocity.length();
        if speed > c {
            self.velocity = self.velocity / speed * c;
            c
        } else {
            speed
        }
    }

    /// Rotates the body about the axis through `pivot` along `axis`.
    ///
    /// The position rotates about the pivot. Velocity and acceleration are
    /// direction vectors anchored at the pivot: they are taken relative to
    /// it, rotated, and anchored back, which reduces to rotating each vector
    /// about the axis direction itself.
    pub fn rotate_around(&mut self, pivot: Vector, axis: Vector, angle: Scalar) {
        self.position = math::rotate_about_pivot(self.position, pivot, axis, angle);
        self.velocity = math::rotate_direction(self.velocity, axis, angle);
        self.acceleration = math::rotate_direction(self.acceleration, axis, angle);
    }
}
