//! Simulation module
//!
//! Everything that mutates the game lives here and runs on one thread:
//! - Fixed frame step scaled by `physics_speed`
//! - Seeded RNG only (`Pcg32` per session, position LCG for decoration)
//! - Stable iteration order (by body id)
//! - No rendering or platform dependencies

pub mod cracks;
pub mod damage;
pub mod factory;
pub mod level;
pub mod projectile;
pub mod rng;
pub mod state;
pub mod tick;

pub use cracks::{CrackSegment, crack_line_width, generate_crack_pattern};
pub use damage::{
    FloatingText, category, ground_filter, handle_collisions, impact_damage, placement_filter,
    projectile_filter, team_filter,
};
pub use factory::{MaterialProperties, TextureSpot, material_properties, stone_texture};
pub use level::{CastleBodies, castle_padding, castle_top_left};
pub use projectile::{Shot, launch_velocity};
pub use rng::Lcg;
pub use state::{BlockState, BodyKind, PendingRemoval, Session, Telemetry};
pub use tick::{TickInput, TickReport, cleanup_destroyed, tick};
