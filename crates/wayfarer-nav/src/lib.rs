//! Navigation core: A* pathfinding over the block cache and the tick-driven
//! motion controller with swept-AABB collision.

pub mod motion;
pub mod pathfinder;
pub mod physics;

pub use motion::{Motion, MotionEvent, TickOutput};
pub use pathfinder::{PathError, Pathfinder, PathfinderConfig};
