//! Build mode: pieces, rotation, placement checks and the builder canvas

pub mod editor;
pub mod occupancy;
pub mod piece;
pub mod placement;

pub use editor::{BuildGrid, SelectionRect, Tool};
pub use occupancy::{CellOccupant, OccupiedCells};
pub use piece::{Footprint, PieceId, Rotation, footprint_origin, occupied_offsets, rotate_footprint};
pub use placement::{PiecePlacement, can_place, get_piece_placement};
