//! Collision filtering and impact damage

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{BodyKind, Session};
use crate::config::GameConfig;
use crate::physics::{BodyId, CollisionEvent, CollisionFilter};
use crate::team::Team;

/// Collision category bits. Disjoint; bit 0 is the ground.
pub mod category {
    pub const GROUND: u32 = 0x1;
    pub const RED_TEAM: u32 = 0x2;
    pub const BLUE_TEAM: u32 = 0x4;
    pub const RED_PROJECTILE: u32 = 0x8;
    pub const BLUE_PROJECTILE: u32 = 0x10;
    /// Every category, for the ground's mask
    pub const ALL: u32 = u32::MAX;
}

pub fn team_category(team: Team) -> u32 {
    match team {
        Team::Red => category::RED_TEAM,
        Team::Blue => category::BLUE_TEAM,
    }
}

pub fn projectile_category(team: Team) -> u32 {
    match team {
        Team::Red => category::RED_PROJECTILE,
        Team::Blue => category::BLUE_PROJECTILE,
    }
}

/// Blocks and soldiers: ground, both team layers, and only the enemy's shots
pub fn team_filter(team: Team) -> CollisionFilter {
    CollisionFilter::new(
        team_category(team),
        category::GROUND | category::RED_TEAM | category::BLUE_TEAM | projectile_category(team.other()),
    )
}

/// Shots: ground and both team layers, never another projectile
pub fn projectile_filter(team: Team) -> CollisionFilter {
    CollisionFilter::new(
        projectile_category(team),
        category::GROUND | team_category(team.other()) | category::RED_TEAM | category::BLUE_TEAM,
    )
}

/// Pieces placed in build mode ignore projectiles entirely
pub fn placement_filter(team: Team) -> CollisionFilter {
    CollisionFilter::new(
        team_category(team),
        category::GROUND | category::RED_TEAM | category::BLUE_TEAM,
    )
}

pub fn ground_filter() -> CollisionFilter {
    CollisionFilter::new(category::GROUND, category::ALL)
}

/// Damage dealt by an impact, or `None` below the velocity threshold
pub fn impact_damage(relative_speed: f32, config: &GameConfig) -> Option<f32> {
    (relative_speed > config.min_damage_velocity)
        .then(|| (relative_speed - config.min_damage_velocity) * config.damage_multiplier)
}

/// Damage above this is shown as a big hit
const BIG_HIT: f32 = 20.0;
/// Damage at or below this shows no number
const MIN_VISIBLE_DAMAGE: f32 = 1.0;

/// Rising, fading damage number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatingText {
    pub position: Vec2,
    pub text: String,
    pub life: f32,
    pub max_life: f32,
    pub color: String,
    pub size: f32,
    /// Vertical drift per frame (negative is up)
    pub vy: f32,
}

impl FloatingText {
    /// Damage number above `at`, jittered sideways
    pub fn for_damage(at: Vec2, damage: f32, rng: &mut impl Rng) -> Self {
        let big = damage > BIG_HIT;
        let life = if big { 1.5 } else { 0.8 };
        Self {
            position: Vec2::new(at.x + (rng.random::<f32>() - 0.5) * 20.0, at.y - 20.0),
            text: format!("{}", damage.round() as i64),
            life,
            max_life: life,
            color: if big { "#ff4d4d" } else { "#ffffff" }.to_owned(),
            size: if big { 24.0 } else { 14.0 },
            vy: -1.0 - rng.random::<f32>(),
        }
    }

    /// One frame of drift and fade. Returns false once expired.
    pub fn age(&mut self, decay: f32) -> bool {
        self.life -= decay;
        self.position.y += self.vy;
        self.life > 0.0
    }

    /// Remaining life in `[0, 1]`, for alpha
    pub fn alpha(&self) -> f32 {
        if self.max_life > 0.0 {
            (self.life / self.max_life).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Apply `damage` to one body. Only blocks carry health; anything else ignores it.
pub fn apply_damage(session: &mut Session, id: BodyId, damage: f32) -> bool {
    let Some(BodyKind::Block(block)) = session.roles.get_mut(&id) else {
        return false;
    };
    block.health -= damage;

    if damage > MIN_VISIBLE_DAMAGE {
        if let Some(body) = session.world.body(id) {
            let text = FloatingText::for_damage(body.position, damage, &mut session.rng);
            session.floating_texts.push(text);
        }
    }
    true
}

/// Turn this step's collision-start events into damage.
///
/// Both participants take the same damage. Returns how many blocks were hit.
pub fn handle_collisions(session: &mut Session, events: &[CollisionEvent]) -> usize {
    let mut hits = 0;
    for event in events {
        let Some(damage) = impact_damage(event.relative_speed(), &session.config) else {
            continue;
        };
        for id in [event.body_a, event.body_b] {
            if apply_damage(session, id, damage) {
                hits += 1;
            }
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_categories_are_disjoint() {
        let bits = [
            category::GROUND,
            category::RED_TEAM,
            category::BLUE_TEAM,
            category::RED_PROJECTILE,
            category::BLUE_PROJECTILE,
        ];
        for (i, a) in bits.iter().enumerate() {
            assert_eq!(a.count_ones(), 1);
            for b in &bits[i + 1..] {
                assert_eq!(a & b, 0);
            }
        }
    }

    #[test]
    fn test_red_shot_never_hits_red_shots() {
        let red = projectile_filter(Team::Red);
        assert_eq!(red.mask & category::RED_PROJECTILE, 0);
        assert_eq!(red.mask & category::BLUE_PROJECTILE, 0);
        assert!(!red.can_collide(&projectile_filter(Team::Blue)));
        assert!(!red.can_collide(&red));
    }

    #[test]
    fn test_shots_hit_enemy_blocks_and_ground() {
        let red_shot = projectile_filter(Team::Red);
        assert!(red_shot.can_collide(&team_filter(Team::Blue)));
        assert!(red_shot.can_collide(&ground_filter()));
        // Own blocks only accept the enemy's projectile bit
        assert!(!red_shot.can_collide(&team_filter(Team::Red)));
        // Build-mode pieces ignore every shot
        assert!(!red_shot.can_collide(&placement_filter(Team::Blue)));
    }

    #[test]
    fn test_team_layers_collide_with_each_other() {
        assert!(team_filter(Team::Red).can_collide(&team_filter(Team::Blue)));
        assert!(team_filter(Team::Red).can_collide(&team_filter(Team::Red)));
        assert!(placement_filter(Team::Red).can_collide(&team_filter(Team::Blue)));
    }

    #[test]
    fn test_impact_damage_threshold() {
        let config = GameConfig::default();
        assert_eq!(impact_damage(4.0, &config), None);
        assert_eq!(impact_damage(3.0, &config), None);
        assert_eq!(impact_damage(10.0, &config), Some(24.0));
    }

    #[test]
    fn test_floating_text_styles() {
        let mut rng = Pcg32::seed_from_u64(7);
        let big = FloatingText::for_damage(Vec2::new(100.0, 100.0), 24.4, &mut rng);
        assert_eq!(big.text, "24");
        assert_eq!(big.size, 24.0);
        assert_eq!(big.color, "#ff4d4d");
        assert_eq!(big.position.y, 80.0);
        assert!((90.0..=110.0).contains(&big.position.x));
        assert!(big.vy <= -1.0 && big.vy > -2.0);

        let small = FloatingText::for_damage(Vec2::ZERO, 5.0, &mut rng);
        assert_eq!(small.size, 14.0);
        assert_eq!(small.max_life, 0.8);
    }

    #[test]
    fn test_floating_text_ages_out() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut text = FloatingText::for_damage(Vec2::ZERO, 5.0, &mut rng);
        let start_y = text.position.y;
        let mut frames = 0;
        while text.age(0.02) {
            frames += 1;
        }
        // 0.8 life at 0.02 per frame
        assert!((39..=40).contains(&frames));
        assert!(text.position.y < start_y);
    }
}
