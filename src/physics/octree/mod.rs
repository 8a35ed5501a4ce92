//! Barnes-Hut octree for gravitational force accumulation.
//!
//! The tree is rebuilt from scratch every tick. Each node covers a cube and
//! keeps running total-mass and center-of-mass aggregates that are updated on
//! every insertion, so the root's statistics are valid at all times, even
//! mid-construction. A node holding a single body defers subdivision until a
//! second body arrives in its cube.

use crate::physics::aabb3d::Aabb3d;
use crate::physics::body::{Body, BodyId};
use crate::physics::math::{Scalar, Vector};

/// Default opening angle for the approximation criterion.
pub const DEFAULT_THETA: Scalar = 0.5;
/// Default softening length for close encounters.
pub const DEFAULT_SOFTENING: Scalar = 700.0;
/// Default minimum cell width; cells never subdivide below this.
pub const DEFAULT_MIN_WIDTH: Scalar = 1.0;

/// Child octant offsets, one unit step per axis. Enumerated x-major so that
/// on a boundary (a body equidistant between octants) the first matching
/// octant wins deterministically.
const OCTANT_OFFSETS: [[Scalar; 3]; 8] = [
    [-1.0, -1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, 1.0, 1.0],
    [1.0, -1.0, -1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, -1.0],
    [1.0, 1.0, 1.0],
];

/// Snapshot of a body's gravitational state, captured at insertion time.
#[derive(Debug, Clone, Copy)]
pub struct OctreeBody {
    pub id: BodyId,
    pub position: Vector,
    pub mass: Scalar,
}

impl From<&Body> for OctreeBody {
    fn from(body: &Body) -> Self {
        Self {
            id: body.id(),
            position: body.position,
            mass: body.mass(),
        }
    }
}

/// Barnes-Hut octree over a cubic region.
#[derive(Debug)]
pub struct Octree {
    root: Node,
    theta: Scalar,
    softening: Scalar,
    min_width: Scalar,
}

impl Octree {
    /// Creates an empty tree over a cube of the given width centered at the
    /// origin.
    pub fn new(width: Scalar) -> Self {
        Self::with_center(Vector::ZERO, width)
    }

    /// Creates an empty tree over a cube of the given width and center.
    pub fn with_center(center: Vector, width: Scalar) -> Self {
        Self {
            root: Node::new(center, width),
            theta: DEFAULT_THETA,
            softening: DEFAULT_SOFTENING,
            min_width: DEFAULT_MIN_WIDTH,
        }
    }

    pub fn with_theta(mut self, theta: Scalar) -> Self {
        self.theta = theta;
        self
    }

    pub fn with_softening(mut self, softening: Scalar) -> Self {
        self.softening = softening;
        self
    }

    pub fn with_min_width(mut self, min_width: Scalar) -> Self {
        self.min_width = min_width;
        self
    }

    /// Inserts a body. Aggregates along the insertion path update
    /// unconditionally, even when the body lands outside every child octant
    /// and stays aggregated at an interior node.
    pub fn add(&mut self, body: impl Into<OctreeBody>) {
        let body = body.into();
        self.root.add(body, self.min_width);
    }

    /// Accumulates gravitational acceleration from the whole tree into
    /// `body.acceleration`. The body's own contribution is excluded by id.
    pub fn accelerate(&self, body: &mut Body, gravitational_constant: Scalar) {
        self.root
            .accelerate(body, self.theta, self.softening, gravitational_constant);
    }

    /// Number of bodies inserted so far.
    pub fn body_count(&self) -> usize {
        self.root.body_count
    }

    /// Total mass of all inserted bodies.
    pub fn total_mass(&self) -> Scalar {
        self.root.total_mass
    }

    /// Center of mass of all inserted bodies; the cube center while empty.
    pub fn center_of_mass(&self) -> Vector {
        self.root.center_of_mass
    }

    /// Bounding boxes of all populated nodes, for debug visualization.
    /// `max_depth` limits how deep the traversal descends.
    pub fn bounds(&self, max_depth: Option<usize>) -> Vec<Aabb3d> {
        let mut out = Vec::new();
        self.root.collect_bounds(max_depth, 0, &mut out);
        out
    }
}

#[derive(Debug)]
struct Node {
    center: Vector,
    width: Scalar,
    total_mass: Scalar,
    center_of_mass: Vector,
    body_count: usize,
    state: NodeState,
}

/// Occupancy state of a node. `Leaf` remembers its body so that subdivision
/// can be deferred until a second body actually arrives, and so a
/// single-body node can exclude that body from its own force.
#[derive(Debug)]
enum NodeState {
    Empty,
    Leaf(OctreeBody),
    Internal(Box<[Option<Node>; 8]>),
}

impl Node {
    fn new(center: Vector, width: Scalar) -> Self {
        Self {
            center,
            width,
            total_mass: 0.0,
            center_of_mass: center,
            body_count: 0,
            state: NodeState::Empty,
        }
    }

    fn add(&mut self, body: OctreeBody, min_width: Scalar) {
        // Running aggregates update on every insertion along the path.
        self.center_of_mass = (self.center_of_mass * self.total_mass
            + body.position * body.mass)
            / (self.total_mass + body.mass);
        self.total_mass += body.mass;
        self.body_count += 1;

        if self.width / 2.0 < min_width {
            // Too narrow to subdivide; bodies aggregate here. The first one
            // is still remembered for the single-body force case.
            if matches!(self.state, NodeState::Empty) {
                self.state = NodeState::Leaf(body);
            }
            return;
        }

        match &mut self.state {
            NodeState::Empty => {
                self.state = NodeState::Leaf(body);
            }
            NodeState::Leaf(_) => {
                // Second body: become internal and push both down.
                let previous = std::mem::replace(
                    &mut self.state,
                    NodeState::Internal(Box::new(std::array::from_fn(|_| None))),
                );
                if let NodeState::Leaf(first) = previous {
                    self.add_to_child(first, min_width);
                }
                self.add_to_child(body, min_width);
            }
            NodeState::Internal(_) => {
                self.add_to_child(body, min_width);
            }
        }
    }

    /// Routes a body to the child octant containing it, creating the child
    /// on first use. A body outside every octant stays aggregated here.
    fn add_to_child(&mut self, body: OctreeBody, min_width: Scalar) {
        let NodeState::Internal(children) = &mut self.state else {
            return;
        };

        let child_width = self.width / 2.0;
        let quarter = self.width / 4.0;

        for (index, offset) in OCTANT_OFFSETS.iter().enumerate() {
            let child_center = self.center
                + Vector::new(offset[0] * quarter, offset[1] * quarter, offset[2] * quarter);
            let delta = child_center - body.position;

            if delta.x.abs() <= quarter && delta.y.abs() <= quarter && delta.z.abs() <= quarter {
                children[index]
                    .get_or_insert_with(|| Node::new(child_center, child_width))
                    .add(body, min_width);
                return;
            }
        }
    }

    fn accelerate(&self, body: &mut Body, theta: Scalar, softening: Scalar, g: Scalar) {
        if self.body_count == 0 {
            return;
        }

        let displacement = self.center_of_mass - body.position;
        let distance_squared = displacement.length_squared();

        let single_foreign_body = self.body_count == 1
            && matches!(&self.state, NodeState::Leaf(first) if first.id != body.id());
        let far_enough = self.width * self.width < theta * theta * distance_squared;

        if single_foreign_body || far_enough {
            let distance = (distance_squared + softening * softening).sqrt();
            let norm_acc = g * self.total_mass / (distance * distance * distance);
            body.acceleration += displacement * norm_acc;
            return;
        }

        if let NodeState::Internal(children) = &self.state {
            for child in children.iter().flatten() {
                child.accelerate(body, theta, softening, g);
            }
        }
    }

    fn collect_bounds(&self, max_depth: Option<usize>, depth: usize, out: &mut Vec<Aabb3d>) {
        if self.body_count == 0 {
            return;
        }
        if let Some(max) = max_depth
            && depth > max
        {
            return;
        }

        out.push(Aabb3d::from_center_size(self.center, self.width));

        if let NodeState::Internal(children) = &self.state {
            for child in children.iter().flatten() {
                child.collect_bounds(max_depth, depth + 1, out);
            }
        }
    }
}
