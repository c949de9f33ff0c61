//! Runtime-tunable game configuration
//!
//! Values are read when bodies are spawned; editing them never changes bodies
//! that already exist. Only the next level reset picks them up.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::blueprint::MaterialId;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown config key '{0}'")]
    UnknownKey(String),
    #[error("config value for '{key}' must be finite and positive, got {value}")]
    InvalidValue { key: String, value: f32 },
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Colour table (CSS hex strings)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColorTable {
    pub sky_top: String,
    pub sky_bottom: String,
    pub ground: String,
    pub ground_dark: String,
    pub wood: String,
    pub wood_stroke: String,
    pub steel: String,
    pub steel_stroke: String,
    pub stone: String,
    pub stone_stroke: String,
    pub glass: String,
    pub glass_stroke: String,
    pub red_team: String,
    pub blue_team: String,
    pub projectile: String,
}

impl Default for ColorTable {
    fn default() -> Self {
        Self {
            sky_top: "#1E90FF".into(),
            sky_bottom: "#87CEEB".into(),
            ground: "#5D9634".into(),
            ground_dark: "#436e24".into(),
            wood: "#D2B48C".into(),
            wood_stroke: "#8B4513".into(),
            steel: "#708090".into(),
            steel_stroke: "#2F4F4F".into(),
            stone: "#696969".into(),
            stone_stroke: "#363636".into(),
            glass: "#E0F2F1".into(),
            glass_stroke: "#80CBC4".into(),
            red_team: "#ff6b6b".into(),
            blue_team: "#4ecdc4".into(),
            projectile: "#333333".into(),
        }
    }
}

impl ColorTable {
    /// (fill, stroke) for a material
    pub fn material(&self, material: MaterialId) -> (&str, &str) {
        match material {
            MaterialId::Wood => (&self.wood, &self.wood_stroke),
            MaterialId::Steel => (&self.steel, &self.steel_stroke),
            MaterialId::Stone => (&self.stone, &self.stone_stroke),
            MaterialId::Glass => (&self.glass, &self.glass_stroke),
        }
    }
}

/// Game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    // === Grid ===
    /// Edge length of one grid cell / block (px)
    pub block_size: f32,
    /// Height of the ground band at the bottom of the world (px)
    pub ground_height: f32,

    // === Simulation ===
    /// Slow-motion / fast-forward multiplier on the fixed frame step
    pub physics_speed: f32,
    /// Vertical gravity in engine units
    pub gravity: f32,

    // === Shots ===
    /// Drag distance (px) to launch speed (px/frame)
    pub velocity_multiplier: f32,
    /// Launch speed cap (px/frame)
    pub max_speed: f32,
    pub projectile_radius: f32,
    pub soldier_radius: f32,

    // === Damage ===
    /// Impacts slower than this (px/frame) do no damage
    pub min_damage_velocity: f32,
    pub damage_multiplier: f32,

    // === Health ===
    #[serde(alias = "blockMaxHealth")]
    pub wood_max_health: f32,
    pub steel_max_health: f32,
    pub stone_max_health: f32,
    pub glass_max_health: f32,

    pub colors: ColorTable,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            block_size: 40.0,
            ground_height: 60.0,

            physics_speed: 0.3,
            gravity: 1.5,

            velocity_multiplier: 0.18,
            max_speed: 50.0,
            projectile_radius: 10.0,
            soldier_radius: 15.0,

            min_damage_velocity: 4.0,
            damage_multiplier: 4.0,

            wood_max_health: 100.0,
            steel_max_health: 250.0,
            stone_max_health: 250.0,
            glass_max_health: 40.0,

            colors: ColorTable::default(),
        }
    }
}

impl GameConfig {
    /// Numeric keys accepted by `get`/`set`
    pub const KEYS: [&'static str; 14] = [
        "block_size",
        "ground_height",
        "physics_speed",
        "gravity",
        "velocity_multiplier",
        "max_speed",
        "projectile_radius",
        "soldier_radius",
        "min_damage_velocity",
        "damage_multiplier",
        "wood_max_health",
        "steel_max_health",
        "stone_max_health",
        "glass_max_health",
    ];

    /// Parse a (possibly partial) JSON config. Values are range-checked
    /// the same way `set` checks them.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded config overrides");
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every numeric knob against the rules `set` enforces
    pub fn validate(&self) -> Result<(), ConfigError> {
        for key in Self::KEYS {
            if let Some(value) = self.get(key) {
                check_value(key, value)?;
            }
        }
        Ok(())
    }

    /// Max health for blocks of a material
    pub fn max_health(&self, material: MaterialId) -> f32 {
        match material {
            MaterialId::Wood => self.wood_max_health,
            MaterialId::Steel => self.steel_max_health,
            MaterialId::Stone => self.stone_max_health,
            MaterialId::Glass => self.glass_max_health,
        }
    }

    fn field_mut(&mut self, key: &str) -> Option<&mut f32> {
        let field = match canonical_key(key).as_str() {
            "block_size" => &mut self.block_size,
            "ground_height" => &mut self.ground_height,
            "physics_speed" => &mut self.physics_speed,
            "gravity" => &mut self.gravity,
            "velocity_multiplier" => &mut self.velocity_multiplier,
            "max_speed" => &mut self.max_speed,
            "projectile_radius" => &mut self.projectile_radius,
            "soldier_radius" => &mut self.soldier_radius,
            "min_damage_velocity" => &mut self.min_damage_velocity,
            "damage_multiplier" => &mut self.damage_multiplier,
            "wood_max_health" | "block_max_health" => &mut self.wood_max_health,
            "steel_max_health" => &mut self.steel_max_health,
            "stone_max_health" => &mut self.stone_max_health,
            "glass_max_health" => &mut self.glass_max_health,
            _ => return None,
        };
        Some(field)
    }

    /// Read a numeric knob by name (snake_case or camelCase)
    pub fn get(&self, key: &str) -> Option<f32> {
        let value = match canonical_key(key).as_str() {
            "block_size" => self.block_size,
            "ground_height" => self.ground_height,
            "physics_speed" => self.physics_speed,
            "gravity" => self.gravity,
            "velocity_multiplier" => self.velocity_multiplier,
            "max_speed" => self.max_speed,
            "projectile_radius" => self.projectile_radius,
            "soldier_radius" => self.soldier_radius,
            "min_damage_velocity" => self.min_damage_velocity,
            "damage_multiplier" => self.damage_multiplier,
            "wood_max_health" | "block_max_health" => self.wood_max_health,
            "steel_max_health" => self.steel_max_health,
            "stone_max_health" => self.stone_max_health,
            "glass_max_health" => self.glass_max_health,
            _ => return None,
        };
        Some(value)
    }

    /// Override a numeric knob by name
    pub fn set(&mut self, key: &str, value: f32) -> Result<(), ConfigError> {
        let field = self
            .field_mut(key)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_owned()))?;
        check_value(key, value)?;
        *field = value;
        Ok(())
    }
}

/// Knobs must be finite and positive. Gravity and damage thresholds may
/// also be zero.
fn check_value(key: &str, value: f32) -> Result<(), ConfigError> {
    let allow_zero = matches!(
        canonical_key(key).as_str(),
        "gravity" | "min_damage_velocity" | "damage_multiplier"
    );
    if value.is_finite() && (value > 0.0 || (allow_zero && value == 0.0)) {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            key: key.to_owned(),
            value,
        })
    }
}

/// `maxSpeed` -> `max_speed`
fn canonical_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.trim().chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
