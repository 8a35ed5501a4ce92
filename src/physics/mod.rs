pub mod aabb3d;
pub mod body;
pub mod math;
pub mod octree;
pub mod point_octree;
pub mod simulation;
