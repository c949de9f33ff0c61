//! Which grid cells are claimed by live bodies

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::blueprint::MaterialId;
use crate::grid::GridCell;
use crate::team::Team;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellOccupant {
    pub material: MaterialId,
    pub team: Team,
}

/// Cell -> occupant map. A cell is present iff a live block claims it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupiedCells {
    cells: BTreeMap<GridCell, CellOccupant>,
}

impl OccupiedCells {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn occupy(&mut self, cells: &[GridCell], occupant: CellOccupant) {
        for cell in cells {
            self.cells.insert(*cell, occupant);
        }
    }

    pub fn release(&mut self, cells: &[GridCell]) {
        for cell in cells {
            self.cells.remove(cell);
        }
    }

    pub fn get(&self, cell: GridCell) -> Option<&CellOccupant> {
        self.cells.get(&cell)
    }

    pub fn is_occupied(&self, cell: GridCell) -> bool {
        self.cells.contains_key(&cell)
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GridCell, &CellOccupant)> {
        self.cells.iter()
    }
}
