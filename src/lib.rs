//! Spatial partitioning core for N-body simulation.
//!
//! Three pieces: a point-mass [`Body`](physics::body::Body) with a
//! relativistic speed limit, a Barnes-Hut
//! [`Octree`](physics::octree::Octree) rebuilt every tick for gravity, and a
//! persistent [`PointOctree`](physics::point_octree::PointOctree) for
//! proximity queries over arbitrary objects.

pub mod config;
pub mod physics;
pub mod prelude;
