//! 2D rigid-body world
//!
//! A thin layer over rapier2d exposing what the game drives: rectangles and
//! circles with stable `BodyId`s, gravity, category/mask collision filtering,
//! per-step collision-start events and region queries. Bodies rotate.
//!
//! Units follow the frame-based convention the damage tuning assumes:
//! positions in pixels, velocities in pixels per base frame (1000/60 ms).

pub mod body;
pub mod world;

pub use body::{Aabb, BodyDesc, BodyId, BodyState, CollisionFilter, Shape};
pub use world::{CollisionEvent, PhysicsWorld};

/// Simulated milliseconds in one base frame
pub const BASE_DELTA_MS: f32 = 1000.0 / 60.0;
/// Gravity is configured in engine units and scaled by this factor (px/ms^2)
pub const GRAVITY_SCALE: f32 = 0.001;
/// Pixels per rapier length unit; scales the solver's tolerances to block-sized bodies
pub const LENGTH_UNIT: f32 = 40.0;
