//! Builder canvas: paint a blueprint cell by cell and export it as text rows
//!
//! Edits outside the canvas are silently ignored.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::blueprint::{Blueprint, EMPTY_TOKEN, MaterialId, SPAWN_TOKEN, Token, text_from_rows};
use crate::grid::GridCell;

/// Default canvas size (cells)
const DEFAULT_COLS: i32 = 40;
const DEFAULT_ROWS: i32 = 22;
const DEFAULT_CELL_SIZE: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Paint,
    Erase,
    Soldier,
    Select,
}

/// Inclusive cell rectangle; may be unnormalized while dragging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl SelectionRect {
    pub fn normalized(self) -> Self {
        Self {
            x0: self.x0.min(self.x1),
            y0: self.y0.min(self.y1),
            x1: self.x0.max(self.x1),
            y1: self.y0.max(self.y1),
        }
    }

    pub fn contains(&self, cell: GridCell) -> bool {
        let r = self.normalized();
        cell.x >= r.x0 && cell.x <= r.x1 && cell.y >= r.y0 && cell.y <= r.y1
    }

    fn shifted(self, dx: i32, dy: i32) -> Self {
        Self {
            x0: self.x0 + dx,
            y0: self.y0 + dy,
            x1: self.x1 + dx,
            y1: self.y1 + dy,
        }
    }
}

/// In-progress drag of a selection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct MoveState {
    anchor: GridCell,
    offset: (i32, i32),
    valid: bool,
    cells: Vec<(GridCell, MaterialId)>,
    spawns: Vec<GridCell>,
}

impl MoveState {
    fn picked(&self) -> BTreeSet<GridCell> {
        self.cells
            .iter()
            .map(|(c, _)| *c)
            .chain(self.spawns.iter().copied())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildGrid {
    cols: i32,
    rows: i32,
    pub cell_size: f32,
    pub selected_material: MaterialId,
    tool: Tool,
    cells: BTreeMap<GridCell, MaterialId>,
    spawns: BTreeSet<GridCell>,
    selection: Option<SelectionRect>,
    /// Set while a selection rectangle is being dragged out
    selection_anchor: Option<GridCell>,
    moving: Option<MoveState>,
}

impl Default for BuildGrid {
    fn default() -> Self {
        Self::new(DEFAULT_COLS, DEFAULT_ROWS, DEFAULT_CELL_SIZE)
    }
}

impl BuildGrid {
    pub fn new(cols: i32, rows: i32, cell_size: f32) -> Self {
        Self {
            cols: cols.max(1),
            rows: rows.max(1),
            cell_size,
            selected_material: MaterialId::Wood,
            tool: Tool::Paint,
            cells: BTreeMap::new(),
            spawns: BTreeSet::new(),
            selection: None,
            selection_anchor: None,
            moving: None,
        }
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn selection(&self) -> Option<SelectionRect> {
        self.selection
    }

    pub fn set_grid(&mut self, cols: i32, rows: i32, cell_size: f32) {
        self.cols = cols.max(1);
        self.rows = rows.max(1);
        self.cell_size = cell_size;
    }

    /// Switching away from the select tool drops any selection
    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
        if tool != Tool::Select {
            self.clear_selection();
        }
    }

    pub fn in_bounds(&self, cell: GridCell) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.cols && cell.y < self.rows
    }

    pub fn material_at(&self, cell: GridCell) -> Option<MaterialId> {
        self.cells.get(&cell).copied()
    }

    pub fn has_spawn(&self, cell: GridCell) -> bool {
        self.spawns.contains(&cell)
    }

    /// Painted material cells, row-major
    pub fn cells(&self) -> impl Iterator<Item = (GridCell, MaterialId)> + '_ {
        self.cells.iter().map(|(c, m)| (*c, *m))
    }

    pub fn spawns(&self) -> impl Iterator<Item = GridCell> + '_ {
        self.spawns.iter().copied()
    }

    /// Paint with the selected material; replaces a spawn marker
    pub fn paint_cell(&mut self, cell: GridCell) {
        if !self.in_bounds(cell) {
            return;
        }
        self.cells.insert(cell, self.selected_material);
        self.spawns.remove(&cell);
    }

    pub fn clear_cell(&mut self, cell: GridCell) {
        if !self.in_bounds(cell) {
            return;
        }
        self.cells.remove(&cell);
        self.spawns.remove(&cell);
    }

    /// Toggle a soldier spawn; placing one clears the material underneath
    pub fn toggle_spawn(&mut self, cell: GridCell) {
        if !self.in_bounds(cell) {
            return;
        }
        if !self.spawns.remove(&cell) {
            self.spawns.insert(cell);
            self.cells.remove(&cell);
        }
    }

    /// Apply the current painting tool to one cell (no-op for select)
    pub fn apply_tool(&mut self, cell: GridCell) {
        match self.tool {
            Tool::Paint => self.paint_cell(cell),
            Tool::Erase => self.clear_cell(cell),
            Tool::Soldier => self.toggle_spawn(cell),
            Tool::Select => {}
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
        self.selection_anchor = None;
        self.moving = None;
    }

    pub fn begin_selection(&mut self, cell: GridCell) {
        self.selection = Some(SelectionRect {
            x0: cell.x,
            y0: cell.y,
            x1: cell.x,
            y1: cell.y,
        });
        self.selection_anchor = Some(cell);
        self.moving = None;
    }

    pub fn update_selection(&mut self, cell: GridCell) {
        if self.selection_anchor.is_none() {
            return;
        }
        if let Some(sel) = self.selection.as_mut() {
            sel.x1 = cell.x;
            sel.y1 = cell.y;
        }
    }

    pub fn finalize_selection(&mut self) {
        self.selection = self.selection.map(SelectionRect::normalized);
        self.selection_anchor = None;
    }

    /// Pick up the selection's contents. Returns false if `cell` is outside it.
    pub fn start_move_selection(&mut self, cell: GridCell) -> bool {
        let Some(sel) = self.selection.map(SelectionRect::normalized) else {
            return false;
        };
        if !sel.contains(cell) {
            return false;
        }

        let cells = self
            .cells
            .iter()
            .filter(|(c, _)| sel.contains(**c))
            .map(|(c, m)| (*c, *m))
            .collect();
        let spawns = self.spawns.iter().filter(|c| sel.contains(**c)).copied().collect();

        self.selection = Some(sel);
        self.selection_anchor = None;
        self.moving = Some(MoveState {
            anchor: cell,
            offset: (0, 0),
            valid: true,
            cells,
            spawns,
        });
        true
    }

    /// Drag the picked-up contents; the move is valid only if every moved cell
    /// stays on the canvas and lands on an empty or picked-up cell
    pub fn update_move_selection(&mut self, cell: GridCell) {
        let Some(moving) = self.moving.as_ref() else {
            return;
        };
        let (dx, dy) = (cell.x - moving.anchor.x, cell.y - moving.anchor.y);
        let picked = moving.picked();

        let valid = picked.iter().all(|c| {
            let target = c.offset(dx, dy);
            let occupied_by_other = (self.cells.contains_key(&target) || self.spawns.contains(&target))
                && !picked.contains(&target);
            self.in_bounds(target) && !occupied_by_other
        });

        if let Some(moving) = self.moving.as_mut() {
            moving.offset = (dx, dy);
            moving.valid = valid;
        }
    }

    pub fn move_offset(&self) -> Option<(i32, i32)> {
        self.moving.as_ref().map(|m| m.offset)
    }

    pub fn move_valid(&self) -> bool {
        self.moving.as_ref().is_none_or(|m| m.valid)
    }

    /// Drop the picked-up contents at the current offset.
    ///
    /// An invalid or zero move leaves the canvas untouched. Returns whether
    /// anything moved.
    pub fn commit_move_selection(&mut self) -> bool {
        let Some(moving) = self.moving.take() else {
            return false;
        };
        let Some(sel) = self.selection else {
            return false;
        };
        let (dx, dy) = moving.offset;
        if !moving.valid || (dx == 0 && dy == 0) {
            return false;
        }

        for c in moving.picked() {
            self.cells.remove(&c);
            self.spawns.remove(&c);
        }
        for (c, material) in &moving.cells {
            self.cells.insert(c.offset(dx, dy), *material);
        }
        for c in &moving.spawns {
            self.spawns.insert(c.offset(dx, dy));
        }
        self.selection = Some(sel.normalized().shifted(dx, dy));
        log::debug!("Moved selection by ({dx}, {dy})");
        true
    }

    pub fn clear_all(&mut self) {
        self.cells.clear();
        self.spawns.clear();
        self.clear_selection();
    }

    /// Replace the canvas with a blueprint centred on it. Cells that fall off
    /// the canvas are dropped.
    pub fn load_centered(&mut self, blueprint: &Blueprint) {
        let off_x = ((self.cols - blueprint.width()) / 2).max(0);
        let off_y = ((self.rows - blueprint.height()) / 2).max(0);

        self.cells.clear();
        self.spawns.clear();
        for (y, row) in blueprint.rows().iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                let cell = GridCell::new(off_x + x as i32, off_y + y as i32);
                if !self.in_bounds(cell) {
                    continue;
                }
                match Token::from_char(c) {
                    Token::Material(material) => {
                        self.cells.insert(cell, material);
                    }
                    Token::Spawn => {
                        self.spawns.insert(cell);
                    }
                    Token::Empty => {}
                }
            }
        }
        log::info!(
            "Loaded {}x{} blueprint at ({off_x}, {off_y})",
            blueprint.width(),
            blueprint.height()
        );
    }

    /// Full-canvas blueprint rows. A spawn marker wins over a material.
    pub fn export_rows(&self) -> Vec<String> {
        (0..self.rows)
            .map(|y| {
                (0..self.cols)
                    .map(|x| {
                        let cell = GridCell::new(x, y);
                        if self.spawns.contains(&cell) {
                            SPAWN_TOKEN
                        } else {
                            self.cells.get(&cell).map_or(EMPTY_TOKEN, |m| m.token())
                        }
                    })
                    .collect()
            })
            .collect()
    }

    pub fn export_text(&self) -> String {
        text_from_rows(&self.export_rows())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::castle_blueprint;

    fn small() -> BuildGrid {
        BuildGrid::new(4, 3, 40.0)
    }

    #[test]
    fn test_paint_and_export() {
        let mut grid = small();
        grid.paint_cell(GridCell::new(0, 2));
        grid.selected_material = MaterialId::Glass;
        grid.paint_cell(GridCell::new(1, 2));
        grid.toggle_spawn(GridCell::new(3, 0));
        assert_eq!(grid.export_rows(), vec!["---p", "----", "wg--"]);
    }

    #[test]
    fn test_spawn_and_material_are_exclusive() {
        let mut grid = small();
        let cell = GridCell::new(1, 1);
        grid.paint_cell(cell);
        grid.toggle_spawn(cell);
        assert!(grid.has_spawn(cell));
        assert_eq!(grid.material_at(cell), None);

        grid.paint_cell(cell);
        assert!(!grid.has_spawn(cell));
        assert_eq!(grid.material_at(cell), Some(MaterialId::Wood));

        grid.toggle_spawn(cell);
        grid.toggle_spawn(cell);
        assert!(!grid.has_spawn(cell));
        assert_eq!(grid.material_at(cell), None);
    }

    #[test]
    fn test_out_of_bounds_edits_ignored() {
        let mut grid = small();
        grid.paint_cell(GridCell::new(4, 0));
        grid.paint_cell(GridCell::new(-1, 0));
        grid.toggle_spawn(GridCell::new(0, 3));
        assert_eq!(grid.cells().count(), 0);
        assert_eq!(grid.spawns().count(), 0);
    }

    #[test]
    fn test_apply_tool_dispatch() {
        let mut grid = small();
        let cell = GridCell::new(2, 2);
        grid.apply_tool(cell);
        assert_eq!(grid.material_at(cell), Some(MaterialId::Wood));
        grid.set_tool(Tool::Erase);
        grid.apply_tool(cell);
        assert_eq!(grid.material_at(cell), None);
        grid.set_tool(Tool::Soldier);
        grid.apply_tool(cell);
        assert!(grid.has_spawn(cell));
    }

    #[test]
    fn test_move_selection() {
        let mut grid = small();
        grid.paint_cell(GridCell::new(0, 2));
        grid.paint_cell(GridCell::new(1, 2));
        grid.set_tool(Tool::Select);

        grid.begin_selection(GridCell::new(1, 2));
        grid.update_selection(GridCell::new(0, 1));
        grid.finalize_selection();
        assert_eq!(
            grid.selection(),
            Some(SelectionRect { x0: 0, y0: 1, x1: 1, y1: 2 })
        );

        assert!(grid.start_move_selection(GridCell::new(0, 2)));
        // Off the right edge
        grid.update_move_selection(GridCell::new(3, 2));
        assert!(!grid.move_valid());
        // Overlapping its own old cells is fine
        grid.update_move_selection(GridCell::new(1, 2));
        assert!(grid.move_valid());
        assert_eq!(grid.move_offset(), Some((1, 0)));
        assert!(grid.commit_move_selection());

        assert_eq!(grid.export_rows()[2], "-ww-");
        assert_eq!(
            grid.selection(),
            Some(SelectionRect { x0: 1, y0: 1, x1: 2, y1: 2 })
        );
    }

    #[test]
    fn test_move_blocked_by_other_cell() {
        let mut grid = small();
        grid.paint_cell(GridCell::new(0, 0));
        grid.paint_cell(GridCell::new(2, 0));
        grid.begin_selection(GridCell::new(0, 0));
        grid.finalize_selection();
        assert!(grid.start_move_selection(GridCell::new(0, 0)));
        grid.update_move_selection(GridCell::new(2, 0));
        assert!(!grid.move_valid());
        assert!(!grid.commit_move_selection());
        assert_eq!(grid.export_rows()[0], "w-w-");
    }

    #[test]
    fn test_start_move_outside_selection() {
        let mut grid = small();
        assert!(!grid.start_move_selection(GridCell::new(0, 0)));
        grid.begin_selection(GridCell::new(0, 0));
        grid.finalize_selection();
        assert!(!grid.start_move_selection(GridCell::new(3, 2)));
    }

    #[test]
    fn test_load_castle_round_trips() {
        let castle = castle_blueprint();
        let mut grid = BuildGrid::new(castle.width(), castle.height(), 40.0);
        grid.load_centered(&castle);
        assert_eq!(grid.export_rows(), castle.rows());

        grid.clear_all();
        assert!(grid.export_rows().iter().all(|r| r.chars().all(|c| c == EMPTY_TOKEN)));
    }

    #[test]
    fn test_load_centered_offsets() {
        let mut grid = BuildGrid::new(5, 3, 40.0);
        grid.load_centered(&Blueprint::new(&["p"]));
        assert!(grid.has_spawn(GridCell::new(2, 1)));
    }
}
