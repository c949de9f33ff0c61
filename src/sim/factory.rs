//! Material table and body construction

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::damage::{ground_filter, projectile_filter, team_filter};
use super::rng::Lcg;
use crate::blueprint::{MaterialId, PlacedRect};
use crate::config::GameConfig;
use crate::physics::{BodyDesc, CollisionFilter};
use crate::team::Team;

/// Decorative spots per stone block
const STONE_SPOTS: usize = 8;

/// Physical constants of one material
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialProperties {
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
    pub is_static: bool,
    pub max_health: f32,
}

/// Material lookup; health comes from the config, the rest is fixed
pub fn material_properties(material: MaterialId, config: &GameConfig) -> MaterialProperties {
    let (density, friction, restitution, is_static) = match material {
        MaterialId::Wood => (0.002, 0.8, 0.1, false),
        MaterialId::Steel => (0.05, 0.8, 0.1, false),
        MaterialId::Stone => (0.01, 0.8, 0.1, true),
        MaterialId::Glass => (0.0015, 0.05, 0.8, false),
    };
    MaterialProperties {
        density,
        friction,
        restitution,
        is_static,
        max_health: config.max_health(material),
    }
}

/// Texture spot in block-local space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextureSpot {
    pub offset: Vec2,
    pub size: f32,
}

/// Eight spots seeded from the block position; same position, same spots
pub fn stone_texture(center: Vec2, size: Vec2) -> Vec<TextureSpot> {
    let mut lcg = Lcg::from_position(center.x, center.y);
    (0..STONE_SPOTS)
        .map(|_| {
            let r1 = lcg.next_unit();
            let r2 = lcg.next_unit();
            let r3 = lcg.next_unit();
            TextureSpot {
                offset: Vec2::new((r1 - 0.5) * size.x * 0.8, (r2 - 0.5) * size.y * 0.8),
                size: 2.0 + r3 * 3.0,
            }
        })
        .collect()
}

/// Body description for a compiled rect of `material`
pub fn block_desc(rect: &PlacedRect, config: &GameConfig, filter: CollisionFilter) -> BodyDesc {
    let props = material_properties(rect.material(), config);
    BodyDesc::rect(rect.center, rect.size)
        .density(props.density)
        .friction(props.friction)
        .restitution(props.restitution)
        .static_body(props.is_static)
        .filter(filter)
}

pub fn soldier_desc(position: Vec2, team: Team, config: &GameConfig) -> BodyDesc {
    BodyDesc::circle(position, config.soldier_radius)
        .friction(0.5)
        .restitution(0.2)
        .density(0.005)
        .filter(team_filter(team))
}

/// A shot; the ghost trajectory uses the same body minus the filter
pub fn projectile_desc(position: Vec2, velocity: Vec2, config: &GameConfig) -> BodyDesc {
    BodyDesc::circle(position, config.projectile_radius)
        .density(0.008)
        .air_friction(0.005)
        .restitution(0.6)
        .friction(0.005)
        .ccd(true)
        .velocity(velocity)
}

pub fn team_projectile_desc(position: Vec2, velocity: Vec2, team: Team, config: &GameConfig) -> BodyDesc {
    projectile_desc(position, velocity, config).filter(projectile_filter(team))
}

/// Full-width static band at the bottom of the world
pub fn ground_desc(width: f32, height: f32, config: &GameConfig) -> BodyDesc {
    BodyDesc::rect(
        ground_center(width, height, config),
        Vec2::new(width, config.ground_height),
    )
    .static_body(true)
    .friction(0.9)
    .filter(ground_filter())
}

pub fn ground_center(width: f32, height: f32, config: &GameConfig) -> Vec2 {
    Vec2::new(width / 2.0, height - config.ground_height / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::GridRect;
    use crate::grid::GridSpec;

    #[test]
    fn test_material_table() {
        let config = GameConfig::default();
        let steel = material_properties(MaterialId::Steel, &config);
        let wood = material_properties(MaterialId::Wood, &config);
        assert!((steel.density / wood.density - 25.0).abs() < 1e-4);
        assert!(material_properties(MaterialId::Stone, &config).is_static);
        let glass = material_properties(MaterialId::Glass, &config);
        assert_eq!(glass.restitution, 0.8);
        assert_eq!(glass.max_health, 40.0);
    }

    #[test]
    fn test_stone_texture_is_deterministic() {
        let a = stone_texture(Vec2::new(140.0, 500.0), Vec2::splat(40.0));
        let b = stone_texture(Vec2::new(140.0, 500.0), Vec2::splat(40.0));
        assert_eq!(a, b);
        assert_eq!(a.len(), 8);
        for spot in &a {
            assert!(spot.offset.x.abs() <= 16.0 && spot.offset.y.abs() <= 16.0);
            assert!((2.0..5.0).contains(&spot.size));
        }
        let elsewhere = stone_texture(Vec2::new(180.0, 500.0), Vec2::splat(40.0));
        assert_ne!(a, elsewhere);
    }

    #[test]
    fn test_block_desc_from_rect() {
        let grid = GridSpec::new(800.0, 600.0, 40.0);
        let rect = PlacedRect::from_rect(
            &grid,
            GridRect { x: 0, y: 0, w: 3, h: 1, material: MaterialId::Stone },
        );
        let desc = block_desc(&rect, &GameConfig::default(), team_filter(Team::Red));
        assert!(desc.is_static);
        assert_eq!(desc.position, Vec2::new(60.0, 20.0));
        assert_eq!(desc.filter, team_filter(Team::Red));
    }

    #[test]
    fn test_ground_spans_bottom_band() {
        let config = GameConfig::default();
        let desc = ground_desc(1000.0, 600.0, &config);
        assert_eq!(desc.position, Vec2::new(500.0, 570.0));
        assert!(desc.is_static);
    }
}
