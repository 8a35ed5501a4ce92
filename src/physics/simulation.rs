//! Single-threaded tick driver tying bodies to the gravitational octree.

use crate::config::SimulationConfig;
use crate::physics::aabb3d::Aabb3d;
use crate::physics::body::Body;
use crate::physics::math::{Scalar, Vector};
use crate::physics::octree::Octree;

/// Owns the bodies and advances them one tick at a time. Each tick rebuilds
/// the gravitational octree from current positions, accumulates forces, then
/// integrates every body.
pub struct Simulation {
    config: SimulationConfig,
    bodies: Vec<Body>,
    octree: Option<Octree>,
    ticks: u64,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            bodies: Vec::new(),
            octree: None,
            ticks: 0,
        }
    }

    pub fn add_body(&mut self, body: Body) {
        self.bodies.push(body);
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn bodies_mut(&mut self) -> &mut [Body] {
        &mut self.bodies
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Advances the simulation by one tick.
    pub fn step(&mut self) {
        let physics = &self.config.physics;

        let (center, width) = self.enclosing_cube();
        let mut octree = Octree::with_center(center, width)
            .with_theta(physics.octree_theta)
            .with_softening(physics.softening)
            .with_min_width(physics.octree_min_width);
        for body in &self.bodies {
            octree.add(body);
        }

        for body in &mut self.bodies {
            octree.accelerate(body, physics.gravitational_constant);
            body.integrate(physics);
        }

        // Kept for debug visualization between ticks.
        self.octree = Some(octree);
        self.ticks += 1;
    }

    /// Rotates every body about the axis through `pivot`.
    pub fn rotate_all(&mut self, pivot: Vector, axis: Vector, angle: Scalar) {
        for body in &mut self.bodies {
            body.rotate_around(pivot, axis, angle);
        }
    }

    /// Node bounds of the octree built by the most recent tick.
    pub fn octree_bounds(&self, max_depth: Option<usize>) -> Vec<Aabb3d> {
        self.octree
            .as_ref()
            .map(|octree| octree.bounds(max_depth))
            .unwrap_or_default()
    }

    /// Padded cube enclosing every body, with a floor of one unit so an
    /// empty or single-point system still yields a valid tree.
    fn enclosing_cube(&self) -> (Vector, Scalar) {
        let mut min = Vector::splat(Scalar::INFINITY);
        let mut max = Vector::splat(Scalar::NEG_INFINITY);
        for body in &self.bodies {
            min = min.min(body.position);
            max = max.max(body.position);
        }

        if self.bodies.is_empty() {
            return (Vector::ZERO, 1.0);
        }

        let center = (min + max) * 0.5;
        let extent = (max - min).max_element();
        let width = (extent * (1.0 + self.config.physics.world_padding)).max(1.0);
        (center, width)
    }
}
