//! Piece placement: where a rotated piece lands and whether it may land there

use serde::{Deserialize, Serialize};

use super::occupancy::OccupiedCells;
use super::piece::{PieceId, Rotation, footprint_origin, occupied_offsets};
use crate::blueprint::{
    EMPTY_TOKEN, MaterialId, PlacedRect, compile_blueprint, translate_rects, worldify_rects,
};
use crate::grid::{GridCell, GridSpec};
use crate::physics::{Aabb, BodyId, PhysicsWorld};

/// Region queries shrink each rect by this much so edge-adjacent bodies don't block
const REGION_INSET: f32 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiecePlacement {
    pub anchor: GridCell,
    /// Absolute cells the piece would claim
    pub occupied_cells: Vec<GridCell>,
    /// Bodies the piece would spawn
    pub placed_rects: Vec<PlacedRect>,
}

/// Resolve a piece at an anchor cell.
///
/// The rotated footprint is rendered as a tiny blueprint and run through the
/// same compiler as hand-authored castles, so placed pieces merge identically.
pub fn get_piece_placement(
    grid: &GridSpec,
    piece: PieceId,
    rotation: Rotation,
    material: MaterialId,
    anchor: GridCell,
) -> PiecePlacement {
    let footprint = piece.rotated(rotation);
    let (ox, oy) = footprint_origin(&footprint);

    let occupied_cells = occupied_offsets(&footprint)
        .into_iter()
        .map(|(dx, dy)| anchor.offset(dx, dy))
        .collect();

    let token = material.token();
    let local_rows: Vec<String> = footprint
        .iter()
        .map(|row| row.iter().map(|f| if *f { token } else { EMPTY_TOKEN }).collect())
        .collect();

    let rects = translate_rects(&compile_blueprint(&local_rows), anchor.x - ox, anchor.y - oy);
    PiecePlacement {
        anchor,
        occupied_cells,
        placed_rects: worldify_rects(grid, &rects),
    }
}

/// Whether a placement is legal.
///
/// Rejects cells outside the grid, cells already claimed, cells whose bottom
/// edge dips below `ground_top`, and rects overlapping any live body that
/// `is_ground` does not exempt.
pub fn can_place(
    grid: &GridSpec,
    placement: &PiecePlacement,
    occupied: &OccupiedCells,
    world: &PhysicsWorld,
    ground_top: f32,
    is_ground: impl Fn(BodyId) -> bool,
) -> bool {
    for cell in &placement.occupied_cells {
        if !grid.contains(*cell) || occupied.is_occupied(*cell) {
            return false;
        }
        let center = grid.cell_to_world_center(*cell);
        if center.y + grid.cell_size / 2.0 > ground_top {
            return false;
        }
    }

    placement.placed_rects.iter().all(|rect| {
        let region = Aabb::from_center(rect.center, rect.half_extents()).inset(REGION_INSET);
        world
            .query_region(&region)
            .into_iter()
            .all(|id| is_ground(id))
    })
}
