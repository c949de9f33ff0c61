//! Blueprints: one character per grid cell, top row first
//!
//! A blueprint is compiled into the minimal set of axis-aligned material
//! rectangles the body factory turns into physics bodies. The text form is the
//! interchange format between the builder canvas and the game.

pub mod castle;
pub mod compile;
pub mod text;

use serde::{Deserialize, Serialize};

use crate::grid::GridCell;

pub use castle::{CASTLE_BLUEPRINT, castle_blueprint};
pub use compile::{GridRect, PlacedRect, compile_blueprint, translate_rects, worldify_rects};
pub use text::{BlueprintError, load_blueprint, rows_from_text, text_from_rows};

/// Token for a cell with nothing in it
pub const EMPTY_TOKEN: char = '-';
/// Token marking a soldier spawn point
pub const SPAWN_TOKEN: char = 'p';

/// Building material; drives every physical and visual property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialId {
    Wood,
    Steel,
    Stone,
    Glass,
}

impl MaterialId {
    pub const ALL: [MaterialId; 4] = [
        MaterialId::Wood,
        MaterialId::Steel,
        MaterialId::Stone,
        MaterialId::Glass,
    ];

    /// Blueprint character for this material
    pub fn token(self) -> char {
        match self {
            MaterialId::Wood => 'w',
            MaterialId::Steel => 't',
            MaterialId::Stone => 's',
            MaterialId::Glass => 'g',
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MaterialId::Wood => "wood",
            MaterialId::Steel => "steel",
            MaterialId::Stone => "stone",
            MaterialId::Glass => "glass",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "wood" | "block" => Some(MaterialId::Wood),
            "steel" => Some(MaterialId::Steel),
            "stone" => Some(MaterialId::Stone),
            "glass" => Some(MaterialId::Glass),
            _ => None,
        }
    }
}

/// Decoded blueprint cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    Empty,
    Material(MaterialId),
    Spawn,
}

impl Token {
    /// Decode a blueprint character. Anything unrecognised is empty.
    pub fn from_char(c: char) -> Self {
        match c {
            'w' => Token::Material(MaterialId::Wood),
            't' => Token::Material(MaterialId::Steel),
            's' => Token::Material(MaterialId::Stone),
            'g' => Token::Material(MaterialId::Glass),
            SPAWN_TOKEN => Token::Spawn,
            _ => Token::Empty,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Token::Empty => EMPTY_TOKEN,
            Token::Material(material) => material.token(),
            Token::Spawn => SPAWN_TOKEN,
        }
    }

    /// Material occupying the cell, if any (spawn points carry no material)
    pub fn material(self) -> Option<MaterialId> {
        match self {
            Token::Material(material) => Some(material),
            Token::Empty | Token::Spawn => None,
        }
    }
}

/// Pad every row to the widest row with the empty token and replace
/// unrecognised characters by the empty token.
pub fn normalize_rows<S: AsRef<str>>(rows: &[S]) -> Vec<String> {
    let width = rows
        .iter()
        .map(|r| r.as_ref().chars().count())
        .max()
        .unwrap_or(0);

    rows.iter()
        .map(|row| {
            let row = row.as_ref();
            let mut out: String = row.chars().map(|c| Token::from_char(c).as_char()).collect();
            let len = row.chars().count();
            out.extend(std::iter::repeat_n(EMPTY_TOKEN, width - len));
            out
        })
        .collect()
}

/// Local cells of every soldier spawn token, relative to the top-left
pub fn soldier_spawn_cells<S: AsRef<str>>(rows: &[S]) -> Vec<GridCell> {
    rows.iter()
        .enumerate()
        .flat_map(|(y, row)| {
            row.as_ref()
                .chars()
                .enumerate()
                .filter(|(_, c)| Token::from_char(*c) == Token::Spawn)
                .map(move |(x, _)| GridCell::new(x as i32, y as i32))
        })
        .collect()
}

/// Owned, normalized blueprint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blueprint {
    rows: Vec<String>,
}

impl Blueprint {
    pub fn new<S: AsRef<str>>(rows: &[S]) -> Self {
        Self {
            rows: normalize_rows(rows),
        }
    }

    pub fn from_text(text: &str) -> Self {
        Self::new(&rows_from_text(text))
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn width(&self) -> i32 {
        self.rows.first().map(|r| r.chars().count() as i32).unwrap_or(0)
    }

    pub fn height(&self) -> i32 {
        self.rows.len() as i32
    }

    /// Horizontally mirrored copy (the blue castle faces the red one)
    pub fn mirrored(&self) -> Self {
        Self {
            rows: self.rows.iter().map(|r| r.chars().rev().collect()).collect(),
        }
    }

    pub fn compile(&self) -> Vec<GridRect> {
        compile_blueprint(&self.rows)
    }

    pub fn spawn_cells(&self) -> Vec<GridCell> {
        soldier_spawn_cells(&self.rows)
    }

    pub fn to_text(&self) -> String {
        text_from_rows(&self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_bijection() {
        for material in MaterialId::ALL {
            assert_eq!(Token::from_char(material.token()), Token::Material(material));
        }
        assert_eq!(Token::from_char('-'), Token::Empty);
        assert_eq!(Token::from_char('p'), Token::Spawn);
        assert_eq!(Token::from_char('x'), Token::Empty);
        assert_eq!(Token::from_char(' '), Token::Empty);
    }

    #[test]
    fn test_normalize_pads_ragged_rows() {
        let rows = normalize_rows(&["w", "www", "", "s?"]);
        assert_eq!(rows, vec!["w--", "www", "---", "s--"]);
    }

    #[test]
    fn test_spawn_cells() {
        let cells = soldier_spawn_cells(&["-p-", "www", "p--"]);
        assert_eq!(cells, vec![GridCell::new(1, 0), GridCell::new(0, 2)]);
    }

    #[test]
    fn test_mirrored_reverses_columns() {
        let bp = Blueprint::new(&["wt-", "s"]);
        assert_eq!(bp.mirrored().rows(), &["-tw".to_string(), "--s".to_string()]);
        assert_eq!(bp.width(), 3);
        assert_eq!(bp.height(), 2);
    }

    #[test]
    fn test_material_from_str() {
        assert_eq!(MaterialId::from_str("Glass"), Some(MaterialId::Glass));
        assert_eq!(MaterialId::from_str("block"), Some(MaterialId::Wood));
        assert_eq!(MaterialId::from_str("mud"), None);
    }
}
