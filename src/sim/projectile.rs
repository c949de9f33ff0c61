//! Slingshot shots and ghost trajectory prediction

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::factory::{projectile_desc, team_projectile_desc};
use super::state::{BodyKind, PendingRemoval, Session};
use crate::config::GameConfig;
use crate::consts::{FRAME_MS, MIN_DRAG_DISTANCE, PROJECTILE_LIFETIME_MS, PROJECTILE_SPAWN_OFFSET, TRAJECTORY_STEPS};
use crate::physics::BodyId;

/// A drag gesture: pulled back from `start` to `end`, released
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    pub start: Vec2,
    pub end: Vec2,
}

impl Shot {
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    pub fn drag(&self) -> Vec2 {
        self.start - self.end
    }
}

/// Launch velocity for a drag: opposite the pull, capped at `max_speed`
pub fn launch_velocity(shot: &Shot, config: &GameConfig) -> Vec2 {
    let velocity = shot.drag() * config.velocity_multiplier;
    let speed = velocity.length();
    if speed > config.max_speed {
        velocity * (config.max_speed / speed)
    } else {
        velocity
    }
}

/// Where a shot leaves the shooter
pub fn spawn_point(shooter: Vec2) -> Vec2 {
    shooter - Vec2::new(0.0, PROJECTILE_SPAWN_OFFSET)
}

impl Session {
    /// Fire for the active team from its current soldier.
    ///
    /// Short drags and teams with no soldier left are ignored. On success the
    /// turn passes to the other team and the shot is scheduled for forced
    /// removal.
    pub fn fire_projectile(&mut self, shot: &Shot) -> Option<BodyId> {
        if shot.drag().length() < MIN_DRAG_DISTANCE {
            log::debug!("Ignoring short drag ({:.1}px)", shot.drag().length());
            return None;
        }
        let team = self.current_team;
        let Some(soldier) = self.current_soldier(team) else {
            log::warn!("No {} soldier left to fire", team.as_str());
            return None;
        };
        let shooter = self.world.body(soldier)?.position;

        let velocity = launch_velocity(shot, &self.config);
        let desc = team_projectile_desc(spawn_point(shooter), velocity, team, &self.config);
        let id = self.add_body(desc, BodyKind::Projectile { team });

        self.toggle_team();
        self.pending_removals.push(PendingRemoval {
            body: id,
            due_ms: self.clock_ms + PROJECTILE_LIFETIME_MS as f64,
            session_id: self.session_id,
        });
        log::debug!(
            "{} fired at ({:.1}, {:.1}) px/frame",
            team.as_str(),
            velocity.x,
            velocity.y
        );
        Some(id)
    }

    /// Predicted flight path for a shot from `origin` (the shooter's centre).
    ///
    /// Runs the shot alone in the ghost world; the live world is untouched.
    /// The path starts at the spawn point and stops early once the ball
    /// passes the middle of the ground band.
    pub fn predict_trajectory(&mut self, origin: Vec2, shot: &Shot) -> Vec<Vec2> {
        let start = spawn_point(origin);
        let velocity = launch_velocity(shot, &self.config);

        self.ghost.clear();
        self.ghost.set_gravity(self.world.gravity());
        let ball = self.ghost.add(projectile_desc(start, velocity, &self.config));

        let delta = FRAME_MS * self.config.physics_speed;
        let floor = self.height - self.config.ground_height / 2.0;
        let mut path = Vec::with_capacity(TRAJECTORY_STEPS + 1);
        path.push(start);
        for _ in 0..TRAJECTORY_STEPS {
            self.ghost.step(delta);
            let Some(body) = self.ghost.body(ball) else {
                break;
            };
            path.push(body.position);
            if body.position.y > floor {
                break;
            }
        }
        path
    }

    /// Trajectory for the active team's current soldier, if it has one
    pub fn aim_preview(&mut self, shot: &Shot) -> Option<Vec<Vec2>> {
        let soldier = self.current_soldier(self.current_team)?;
        let origin = self.world.body(soldier)?.position;
        Some(self.predict_trajectory(origin, shot))
    }

    /// Run due projectile removals. Stale entries (earlier level, or shots
    /// already gone) are dropped without effect.
    pub fn process_pending_removals(&mut self) -> usize {
        let now = self.clock_ms;
        let session_id = self.session_id;
        let (due, waiting): (Vec<_>, Vec<_>) = self
            .pending_removals
            .drain(..)
            .filter(|p| p.session_id == session_id)
            .partition(|p| p.due_ms <= now);
        self.pending_removals = waiting;

        let mut removed = 0;
        for pending in due {
            if !matches!(self.roles.get(&pending.body), Some(BodyKind::Projectile { .. })) {
                continue;
            }
            if self.remove_body(pending.body).is_some() {
                log::debug!("Projectile {} timed out", pending.body.raw());
                removed += 1;
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::damage::{category, projectile_filter};
    use crate::team::Team;
    use proptest::prelude::*;

    fn session() -> Session {
        let mut s = Session::new(GameConfig::default(), 1600.0, 900.0, 11);
        s.reset_level();
        s
    }

    #[test]
    fn test_short_drag_is_ignored() {
        let mut s = session();
        let before = s.world.len();
        let shot = Shot::new(Vec2::new(100.0, 100.0), Vec2::new(95.0, 105.0));
        assert!(s.fire_projectile(&shot).is_none());
        assert_eq!(s.world.len(), before);
        assert_eq!(s.current_team, Team::Red);
    }

    #[test]
    fn test_fire_switches_team_and_schedules_removal() {
        let mut s = session();
        let soldier = s.current_soldier(Team::Red).unwrap();
        let shooter = s.world.body(soldier).unwrap().position;

        let shot = Shot::new(Vec2::new(100.0, 100.0), Vec2::new(0.0, 150.0));
        let id = s.fire_projectile(&shot).unwrap();

        assert_eq!(s.current_team, Team::Blue);
        let body = s.world.body(id).unwrap();
        assert_eq!(body.position, shooter - Vec2::new(0.0, 30.0));
        assert!((body.velocity - Vec2::new(18.0, -9.0)).length() < 1e-4);
        assert_eq!(body.filter, projectile_filter(Team::Red));
        assert_eq!(body.filter.mask & category::RED_PROJECTILE, 0);
        assert_eq!(s.pending_removals.len(), 1);
        assert_eq!(s.pending_removals[0].due_ms, 5000.0);
    }

    #[test]
    fn test_timeout_removes_only_current_level_shots() {
        let mut s = session();
        let shot = Shot::new(Vec2::new(200.0, 100.0), Vec2::new(0.0, 100.0));
        let id = s.fire_projectile(&shot).unwrap();

        s.clock_ms = 4999.0;
        assert_eq!(s.process_pending_removals(), 0);
        assert!(s.world.contains(id));
        s.clock_ms = 5000.0;
        assert_eq!(s.process_pending_removals(), 1);
        assert!(!s.world.contains(id));
        assert!(s.pending_removals.is_empty());
        // Already gone: a second pass is a no-op
        assert_eq!(s.process_pending_removals(), 0);
    }

    #[test]
    fn test_timeout_after_reset_is_noop() {
        let mut s = session();
        let shot = Shot::new(Vec2::new(200.0, 100.0), Vec2::new(0.0, 100.0));
        s.fire_projectile(&shot).unwrap();
        let stale = s.pending_removals.clone();
        s.reset_level();
        assert!(s.pending_removals.is_empty());
        // A timer that outlived its level
        s.pending_removals.extend(stale);
        let before = s.world.len();
        s.clock_ms = 1.0e6;
        assert_eq!(s.process_pending_removals(), 0);
        assert_eq!(s.world.len(), before);
    }

    #[test]
    fn test_timeout_never_removes_non_projectiles() {
        let mut s = session();
        let ground = s.ground_id().unwrap();
        s.pending_removals.push(PendingRemoval {
            body: ground,
            due_ms: 0.0,
            session_id: s.session_id,
        });
        assert_eq!(s.process_pending_removals(), 0);
        assert!(s.world.contains(ground));
    }

    #[test]
    fn test_trajectory_leaves_live_world_alone() {
        let mut s = session();
        let snapshot: Vec<_> = s.world.bodies().iter().map(|b| (b.id, b.position, b.velocity)).collect();

        let shot = Shot::new(Vec2::new(300.0, 300.0), Vec2::new(200.0, 350.0));
        let path = s.predict_trajectory(Vec2::new(800.0, 400.0), &shot);

        let after: Vec<_> = s.world.bodies().iter().map(|b| (b.id, b.position, b.velocity)).collect();
        assert_eq!(snapshot, after);
        assert!(path.len() > 1 && path.len() <= TRAJECTORY_STEPS + 1);
        assert_eq!(path[0], Vec2::new(800.0, 370.0));
        // Heading right and initially up
        assert!(path[1].x > path[0].x);
        assert!(path[1].y < path[0].y);
    }

    #[test]
    fn test_trajectory_stops_below_ground_line() {
        let mut s = session();
        // Straight down from just above the ground band
        let shot = Shot::new(Vec2::new(0.0, 300.0), Vec2::new(0.0, 0.0));
        let path = s.predict_trajectory(Vec2::new(800.0, 860.0), &shot);
        let floor = s.height - s.config.ground_height / 2.0;
        assert!(path.len() < TRAJECTORY_STEPS + 1);
        assert!(path.last().unwrap().y > floor);
        assert!(path[..path.len() - 1].iter().skip(1).all(|p| p.y <= floor));
    }

    #[test]
    fn test_prediction_matches_first_live_frames() {
        let mut s = session();
        let shot = Shot::new(Vec2::new(300.0, 300.0), Vec2::new(200.0, 380.0));
        let soldier = s.current_soldier(Team::Red).unwrap();
        let origin = s.world.body(soldier).unwrap().position;
        let path = s.aim_preview(&shot).unwrap();
        assert_eq!(path[0], spawn_point(origin));
        assert!(path.len() >= 2);
    }

    proptest! {
        #[test]
        fn test_launch_speed_is_capped(dx in -1.0e5f32..1.0e5, dy in -1.0e5f32..1.0e5) {
            prop_assume!(dx.abs() > 1.0 || dy.abs() > 1.0);
            let config = GameConfig::default();
            let shot = Shot::new(Vec2::new(dx, dy), Vec2::ZERO);
            let v = launch_velocity(&shot, &config);
            prop_assert!(v.length() <= config.max_speed * (1.0 + 1e-5));
            let dir = shot.drag().normalize();
            prop_assert!((v.normalize() - dir).length() < 1e-4);
        }
    }
}
