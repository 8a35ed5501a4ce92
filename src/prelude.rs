//! Commonly used types, re-exported for convenience.

pub use crate::config::{PhysicsConfig, SimulationConfig};
pub use crate::physics::aabb3d::Aabb3d;
pub use crate::physics::body::{Body, BodyId, DEFAULT_BODY_MASS, radius_for_mass};
pub use crate::physics::math::{Ray, Scalar, Vector};
pub use crate::physics::octree::{Octree, OctreeBody};
pub use crate::physics::point_octree::PointOctree;
pub use crate::physics::simulation::Simulation;
