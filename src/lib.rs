//! Castle Siege - a destructible-castle artillery game core
//!
//! Core modules:
//! - `blueprint`: Text blueprints and the greedy rectangle compiler
//! - `grid`: Cell <-> world coordinate mapping
//! - `building`: Pieces, rotation, placement checks and the builder canvas
//! - `physics`: Minimal 2D rigid-body world (rects + circles, filtered contacts)
//! - `sim`: Simulation context (level lifecycle, damage, projectiles, frame tick)
//! - `render`: Renderer-facing frame data
//! - `config`: Runtime-tunable game configuration
//! - `team`: The two sides

pub mod blueprint;
pub mod building;
pub mod config;
pub mod grid;
pub mod physics;
pub mod render;
pub mod sim;
pub mod team;

pub use blueprint::{GridRect, MaterialId, PlacedRect, compile_blueprint};
pub use config::{ConfigError, GameConfig};
pub use grid::{GridCell, GridSpec};
pub use sim::Session;
pub use team::Team;

/// Game timing constants
pub mod consts {
    /// Nominal frame duration in milliseconds (60 Hz animation callback)
    pub const FRAME_MS: f32 = 1000.0 / 60.0;
    /// Real-time delay before an unresolved projectile is force-removed
    pub const PROJECTILE_LIFETIME_MS: f32 = 5000.0;
    /// Minimum drag distance (px) that counts as a shot
    pub const MIN_DRAG_DISTANCE: f32 = 10.0;
    /// Projectiles spawn this far above the shooter's centre
    pub const PROJECTILE_SPAWN_OFFSET: f32 = 30.0;
    /// Ghost simulation step budget per aim update
    pub const TRAJECTORY_STEPS: usize = 100;
    /// Floating text life lost per frame
    pub const FLOATING_TEXT_DECAY: f32 = 0.02;
    /// Castle inset from each screen edge is min(cap, width * fraction)
    pub const CASTLE_PADDING_CAP: f32 = 260.0;
    pub const CASTLE_PADDING_FRACTION: f32 = 0.15;
}
