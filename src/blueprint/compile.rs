//! Greedy rectangle compiler
//!
//! Each row is split into maximal runs of one material. A run extends the
//! rectangle left open by the previous row only when start column, width and
//! material all match exactly; anything else closes that rectangle. Partial
//! overlaps never merge, so every output shape stays a rectangle and every
//! occupied cell belongs to exactly one of them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{MaterialId, Token, normalize_rows};
use crate::grid::{GridCell, GridSpec};

/// Rectangle of same-material cells in cell space (x, y = top-left)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub material: MaterialId,
}

impl GridRect {
    pub fn translated(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }

    /// Cells covered by this rectangle, row-major
    pub fn cells(&self) -> Vec<GridCell> {
        let mut cells = Vec::with_capacity((self.w * self.h).max(0) as usize);
        for yy in 0..self.h {
            for xx in 0..self.w {
                cells.push(GridCell::new(self.x + xx, self.y + yy));
            }
        }
        cells
    }

    pub fn contains(&self, cell: GridCell) -> bool {
        cell.x >= self.x && cell.x < self.x + self.w && cell.y >= self.y && cell.y < self.y + self.h
    }
}

/// A compiled rectangle positioned in world space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedRect {
    pub rect: GridRect,
    /// World-space centre (pixels)
    pub center: Vec2,
    /// World-space width/height (pixels)
    pub size: Vec2,
    /// Cells the body spawned from this rect occupies; released on destruction
    pub grid_cells: Vec<GridCell>,
}

impl PlacedRect {
    pub fn from_rect(grid: &GridSpec, rect: GridRect) -> Self {
        let size = Vec2::new(rect.w as f32, rect.h as f32) * grid.cell_size;
        let center_cell = Vec2::new(
            rect.x as f32 + rect.w as f32 / 2.0 - 0.5,
            rect.y as f32 + rect.h as f32 / 2.0 - 0.5,
        );
        Self {
            rect,
            center: grid.cell_point_to_world(center_cell),
            size,
            grid_cells: rect.cells(),
        }
    }

    pub fn material(&self) -> MaterialId {
        self.rect.material
    }

    pub fn half_extents(&self) -> Vec2 {
        self.size * 0.5
    }
}

/// One maximal horizontal run of a single material within a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Run {
    x: i32,
    w: i32,
    material: MaterialId,
}

fn row_runs(row: &str) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::new();
    let mut current: Option<Run> = None;

    for (x, c) in row.chars().enumerate() {
        let material = Token::from_char(c).material();
        if let (Some(run), Some(m)) = (current.as_mut(), material) {
            if run.material == m {
                run.w += 1;
                continue;
            }
        }
        if let Some(run) = current.take() {
            runs.push(run);
        }
        current = material.map(|m| Run {
            x: x as i32,
            w: 1,
            material: m,
        });
    }
    if let Some(run) = current {
        runs.push(run);
    }
    runs
}

/// Compile blueprint rows into a partition of material rectangles.
///
/// Output is ordered row-major by top-left corner. Empty input yields an
/// empty list.
pub fn compile_blueprint<S: AsRef<str>>(rows: &[S]) -> Vec<GridRect> {
    let rows = normalize_rows(rows);
    let mut open: Vec<GridRect> = Vec::new();
    let mut closed: Vec<GridRect> = Vec::new();

    for (y, row) in rows.iter().enumerate() {
        let mut still_open = Vec::with_capacity(open.len());
        for run in row_runs(row) {
            let continued = open
                .iter()
                .position(|r| r.x == run.x && r.w == run.w && r.material == run.material);
            match continued {
                Some(idx) => {
                    let mut rect = open.swap_remove(idx);
                    rect.h += 1;
                    still_open.push(rect);
                }
                None => still_open.push(GridRect {
                    x: run.x,
                    y: y as i32,
                    w: run.w,
                    h: 1,
                    material: run.material,
                }),
            }
        }
        // Whatever this row did not continue is final
        closed.append(&mut open);
        open = still_open;
    }
    closed.append(&mut open);

    closed.sort_by_key(|r| (r.y, r.x));
    closed
}

pub fn translate_rects(rects: &[GridRect], dx: i32, dy: i32) -> Vec<GridRect> {
    rects.iter().map(|r| r.translated(dx, dy)).collect()
}

pub fn worldify_rects(grid: &GridSpec, rects: &[GridRect]) -> Vec<PlacedRect> {
    rects.iter().map(|r| PlacedRect::from_rect(grid, *r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn rect(x: i32, y: i32, w: i32, h: i32, material: MaterialId) -> GridRect {
        GridRect { x, y, w, h, material }
    }

    #[test]
    fn test_single_row_wood() {
        let rects = compile_blueprint(&["www"]);
        assert_eq!(rects, vec![rect(0, 0, 3, 1, MaterialId::Wood)]);
    }

    #[test]
    fn test_empty_input() {
        let rows: [&str; 0] = [];
        assert!(compile_blueprint(&rows).is_empty());
        assert!(compile_blueprint(&["---", "-p-"]).is_empty());
    }

    #[test]
    fn test_exact_signature_merges() {
        let rects = compile_blueprint(&["-ss-", "-ss-", "-ss-"]);
        assert_eq!(rects, vec![rect(1, 0, 2, 3, MaterialId::Stone)]);
    }

    #[test]
    fn test_width_mismatch_does_not_merge() {
        let rects = compile_blueprint(&["www", "ww-"]);
        assert_eq!(
            rects,
            vec![rect(0, 0, 3, 1, MaterialId::Wood), rect(0, 1, 2, 1, MaterialId::Wood)]
        );
    }

    #[test]
    fn test_shift_does_not_merge() {
        let rects = compile_blueprint(&["ww-", "-ww"]);
        assert_eq!(
            rects,
            vec![rect(0, 0, 2, 1, MaterialId::Wood), rect(1, 1, 2, 1, MaterialId::Wood)]
        );
    }

    #[test]
    fn test_material_change_splits_run() {
        let rects = compile_blueprint(&["wwgg", "wwgg"]);
        assert_eq!(
            rects,
            vec![rect(0, 0, 2, 2, MaterialId::Wood), rect(2, 0, 2, 2, MaterialId::Glass)]
        );
    }

    #[test]
    fn test_closed_rect_does_not_reopen() {
        // Gap row closes the column; the lower part is a fresh rect
        let rects = compile_blueprint(&["t", "t", "-", "t"]);
        assert_eq!(
            rects,
            vec![rect(0, 0, 1, 2, MaterialId::Steel), rect(0, 3, 1, 1, MaterialId::Steel)]
        );
    }

    #[test]
    fn test_worldify_center_and_cells() {
        let grid = GridSpec::new(400.0, 400.0, 40.0);
        let placed = PlacedRect::from_rect(&grid, rect(1, 2, 3, 1, MaterialId::Wood));
        assert_eq!(placed.center, Vec2::new(100.0, 100.0));
        assert_eq!(placed.size, Vec2::new(120.0, 40.0));
        assert_eq!(
            placed.grid_cells,
            vec![GridCell::new(1, 2), GridCell::new(2, 2), GridCell::new(3, 2)]
        );
    }

    #[test]
    fn test_translate() {
        let moved = translate_rects(&[rect(0, 0, 1, 1, MaterialId::Glass)], 4, -2);
        assert_eq!(moved, vec![rect(4, -2, 1, 1, MaterialId::Glass)]);
    }

    fn blueprint_rows() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[-wtsgpx]{0,12}", 0..10)
    }

    proptest! {
        #[test]
        fn prop_rects_partition_occupied_cells(rows in blueprint_rows()) {
            let rects = compile_blueprint(&rows);
            let normalized = normalize_rows(&rows);

            let mut covered = HashSet::new();
            for r in &rects {
                prop_assert!(r.w > 0 && r.h > 0);
                for cell in r.cells() {
                    // no overlap
                    prop_assert!(covered.insert(cell));
                    let c = normalized[cell.y as usize].chars().nth(cell.x as usize);
                    prop_assert_eq!(c.map(|c| Token::from_char(c).material()), Some(Some(r.material)));
                }
            }

            let occupied: HashSet<GridCell> = normalized
                .iter()
                .enumerate()
                .flat_map(|(y, row)| {
                    row.chars().enumerate().filter_map(move |(x, c)| {
                        Token::from_char(c).material().map(|_| GridCell::new(x as i32, y as i32))
                    })
                })
                .collect();
            prop_assert_eq!(covered, occupied);
        }

        #[test]
        fn prop_output_is_row_major(rows in blueprint_rows()) {
            let rects = compile_blueprint(&rows);
            for pair in rects.windows(2) {
                prop_assert!((pair[0].y, pair[0].x) < (pair[1].y, pair[1].x));
            }
        }
    }
}
