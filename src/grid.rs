//! Grid <-> world coordinate mapping
//!
//! Pure transforms; a `GridSpec` holds no mutable state.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Integer cell coordinate (x right, y down)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
}

impl GridCell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Cell size and usable area of the world grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub cell_size: f32,
    pub width: f32,
    pub height: f32,
    pub origin: Vec2,
}

impl GridSpec {
    pub fn new(width: f32, height: f32, cell_size: f32) -> Self {
        Self {
            cell_size,
            width,
            height,
            origin: Vec2::ZERO,
        }
    }

    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    /// Column count, never less than 1
    pub fn cols(&self) -> i32 {
        ((self.width / self.cell_size).floor() as i32).max(1)
    }

    /// Row count, never less than 1
    pub fn rows(&self) -> i32 {
        ((self.height / self.cell_size).floor() as i32).max(1)
    }

    pub fn contains(&self, cell: GridCell) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.cols() && cell.y < self.rows()
    }

    /// World-space centre of a cell
    #[inline]
    pub fn cell_to_world_center(&self, cell: GridCell) -> Vec2 {
        self.cell_point_to_world(Vec2::new(cell.x as f32, cell.y as f32))
    }

    /// Same mapping for a fractional cell position (used for multi-cell centres)
    #[inline]
    pub fn cell_point_to_world(&self, cell: Vec2) -> Vec2 {
        self.origin + (cell + Vec2::splat(0.5)) * self.cell_size
    }

    /// Cell containing a world point
    #[inline]
    pub fn world_to_cell(&self, point: Vec2) -> GridCell {
        let local = (point - self.origin) / self.cell_size;
        GridCell::new(local.x.floor() as i32, local.y.floor() as i32)
    }

    pub fn clamp_cell(&self, cell: GridCell) -> GridCell {
        GridCell::new(
            cell.x.clamp(0, self.cols() - 1),
            cell.y.clamp(0, self.rows() - 1),
        )
    }
}
