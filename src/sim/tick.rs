//! Per-frame simulation tick
//!
//! One call per animation frame, in a fixed order: step physics, turn contacts
//! into damage, sweep destroyed blocks, age damage numbers, fire due timers.

use super::damage::handle_collisions;
use super::projectile::Shot;
use super::state::{BodyKind, Session};
use crate::consts::{FLOATING_TEXT_DECAY, FRAME_MS};
use crate::physics::BodyId;

/// Input commands for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Rebuild the level before stepping
    pub reset: bool,
    /// Released slingshot drag for the active team
    pub fire: Option<Shot>,
}

/// What happened during one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub collisions: usize,
    pub blocks_hit: usize,
    pub destroyed: Vec<BodyId>,
    pub timed_out: usize,
    pub fired: Option<BodyId>,
}

/// Simulated milliseconds per frame at the configured physics speed
pub fn frame_delta(session: &Session) -> f32 {
    FRAME_MS * session.config.physics_speed
}

/// Remove every block at or below zero health and free its cells
pub fn cleanup_destroyed(session: &mut Session) -> Vec<BodyId> {
    let dead: Vec<BodyId> = session
        .roles
        .iter()
        .filter_map(|(id, kind)| match kind {
            BodyKind::Block(block) if block.is_destroyed() => Some(*id),
            _ => None,
        })
        .collect();

    for id in &dead {
        if let Some(BodyKind::Block(block)) = session.remove_body(*id) {
            log::debug!(
                "{} {} block destroyed ({:.0} hp)",
                block.team.as_str(),
                block.material.as_str(),
                block.health
            );
        }
    }
    dead
}

/// One frame of drift and fade for every damage number
pub fn age_floating_texts(session: &mut Session) {
    session
        .floating_texts
        .retain_mut(|text| text.age(FLOATING_TEXT_DECAY));
}

/// Advance the session by one frame
pub fn tick(session: &mut Session, input: &TickInput) -> TickReport {
    let mut report = TickReport::default();

    if input.reset {
        session.reset_level();
    }
    if let Some(shot) = &input.fire {
        report.fired = session.fire_projectile(shot);
    }

    let events = session.world.step(frame_delta(session));
    report.collisions = events.len();
    report.blocks_hit = handle_collisions(session, &events);
    report.destroyed = cleanup_destroyed(session);
    age_floating_texts(session);

    session.clock_ms += FRAME_MS as f64;
    session.frame_count += 1;
    report.timed_out = session.process_pending_removals();

    report
}
