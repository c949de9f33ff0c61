//! Level lifecycle: ground plus two mirrored castles

use glam::Vec2;

use super::damage::team_filter;
use super::factory::{ground_desc, soldier_desc};
use super::state::{BodyKind, Session};
use crate::blueprint::{Blueprint, translate_rects, worldify_rects};
use crate::consts::{CASTLE_PADDING_CAP, CASTLE_PADDING_FRACTION};
use crate::grid::{GridCell, GridSpec};
use crate::physics::BodyId;
use crate::team::Team;

/// Castle inset from each screen edge
pub fn castle_padding(width: f32) -> f32 {
    CASTLE_PADDING_CAP.min(width * CASTLE_PADDING_FRACTION)
}

/// Top-left cell for a `bp_w x bp_h` blueprint centred under `anchor_x` with
/// its bottom row just above `ground_y`.
///
/// Clamped onto the grid along each axis where the blueprint fits, pinned to 0
/// where it does not.
pub fn castle_top_left(grid: &GridSpec, anchor_x: f32, ground_y: f32, bp_w: i32, bp_h: i32) -> GridCell {
    let anchor_cell_x = (anchor_x / grid.cell_size - 0.5).round() as i32;
    let bottom_cell_y = (ground_y / grid.cell_size).floor() as i32 - 1;

    let x = anchor_cell_x - bp_w / 2;
    let y = bottom_cell_y - (bp_h - 1);

    let clamp = |v: i32, size: i32, limit: i32| {
        if size <= limit {
            v.clamp(0, limit - size)
        } else {
            0
        }
    };
    GridCell::new(clamp(x, bp_w, grid.cols()), clamp(y, bp_h, grid.rows()))
}

/// Bodies created for one castle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CastleBodies {
    pub blocks: Vec<BodyId>,
    pub soldiers: Vec<BodyId>,
}

impl Session {
    /// Tear everything down and build a fresh level.
    ///
    /// Invalidates every pending projectile removal from earlier levels.
    pub fn reset_level(&mut self) {
        self.world.clear();
        self.ghost.clear();
        self.roles.clear();
        self.occupied.clear();
        self.floating_texts.clear();
        self.pending_removals.clear();
        self.ground = None;
        self.session_id += 1;
        self.current_team = Team::Red;

        let gravity = Vec2::new(0.0, self.config.gravity);
        self.world.set_gravity(gravity);
        self.ghost.set_gravity(gravity);

        let ground = ground_desc(self.width, self.height, &self.config);
        self.add_body(ground, BodyKind::Ground);

        let padding = castle_padding(self.width);
        let ground_y = self.ground_top();
        let red = self.build_castle(padding, ground_y, Team::Red);
        let blue = self.build_castle(self.width - padding, ground_y, Team::Blue);

        log::info!(
            "Level {} ready: {}x{}, {} blocks, {} soldiers",
            self.session_id,
            self.width,
            self.height,
            red.blocks.len() + blue.blocks.len(),
            red.soldiers.len() + blue.soldiers.len()
        );
    }

    /// Build the session blueprint for `team` centred on `anchor_x`, standing
    /// on `ground_y`. Blue gets the mirrored blueprint.
    pub fn build_castle(&mut self, anchor_x: f32, ground_y: f32, team: Team) -> CastleBodies {
        let blueprint = match team {
            Team::Red => self.blueprint.clone(),
            Team::Blue => self.blueprint.mirrored(),
        };
        self.build_blueprint(&blueprint, anchor_x, ground_y, team)
    }

    /// Spawn every rect and soldier of `blueprint` for `team`
    pub fn build_blueprint(
        &mut self,
        blueprint: &Blueprint,
        anchor_x: f32,
        ground_y: f32,
        team: Team,
    ) -> CastleBodies {
        let grid = self.grid();
        let top_left = castle_top_left(&grid, anchor_x, ground_y, blueprint.width(), blueprint.height());

        let rects = translate_rects(&blueprint.compile(), top_left.x, top_left.y);
        let filter = team_filter(team);
        let blocks = worldify_rects(&grid, &rects)
            .iter()
            .map(|rect| self.spawn_block(rect, team, filter))
            .collect();

        let soldiers = blueprint
            .spawn_cells()
            .into_iter()
            .map(|local| {
                let cell = local.offset(top_left.x, top_left.y);
                let desc = soldier_desc(grid.cell_to_world_center(cell), team, &self.config);
                self.add_body(desc, BodyKind::Soldier { team })
            })
            .collect();

        log::debug!(
            "Built {} castle at cell ({}, {})",
            team.as_str(),
            top_left.x,
            top_left.y
        );
        CastleBodies { blocks, soldiers }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::MaterialId;
    use crate::config::GameConfig;

    #[test]
    fn test_padding_caps() {
        assert_eq!(castle_padding(1600.0), 240.0);
        assert_eq!(castle_padding(2000.0), 260.0);
        assert_eq!(castle_padding(400.0), 60.0);
    }

    #[test]
    fn test_top_left_centres_and_clamps() {
        let grid = GridSpec::new(1600.0, 900.0, 40.0);
        // Cell 34 centre, blueprint 17 wide -> 26, clamped to 40 - 17
        let cell = castle_top_left(&grid, 1360.0, 840.0, 17, 14);
        assert_eq!(cell, GridCell::new(23, 7));
        let cell = castle_top_left(&grid, 800.0, 840.0, 5, 2);
        assert_eq!(cell, GridCell::new(18, 19));
        // Wider than the grid
        let cell = castle_top_left(&grid, 800.0, 840.0, 50, 2);
        assert_eq!(cell.x, 0);
    }

    #[test]
    fn test_reset_builds_two_castles() {
        let mut s = Session::new(GameConfig::default(), 1600.0, 900.0, 3);
        s.reset_level();

        let rects_per_castle = s.blueprint.compile().len();
        let blocks = s.bodies_of(|k| matches!(k, BodyKind::Block(_))).count();
        assert_eq!(blocks, rects_per_castle * 2);
        let soldiers = s.bodies_of(|k| matches!(k, BodyKind::Soldier { .. })).count();
        assert_eq!(soldiers, 6);
        assert!(s.ground_id().is_some());

        let cells_per_castle: usize = s.blueprint.compile().iter().map(|r| (r.w * r.h) as usize).sum();
        assert_eq!(s.occupied.len(), cells_per_castle * 2);
        assert_eq!(s.session_id, 1);
    }

    #[test]
    fn test_castle_sits_on_ground() {
        let mut s = Session::new(GameConfig::default(), 1600.0, 900.0, 3);
        s.reset_level();
        let ground_top = s.ground_top();
        let lowest = s
            .world
            .bodies()
            .iter()
            .filter(|b| s.block(b.id).is_some())
            .map(|b| b.aabb().max.y)
            .fold(f32::MIN, f32::max);
        assert_eq!(lowest, ground_top);
    }

    #[test]
    fn test_single_row_blueprint_scenario() {
        let mut s = Session::new(GameConfig::default(), 1600.0, 900.0, 3)
            .with_blueprint(Blueprint::new(&["www"]));
        s.reset_level();
        // One wood body per side
        let blocks: Vec<_> = s.bodies_of(|k| matches!(k, BodyKind::Block(_))).collect();
        assert_eq!(blocks.len(), 2);
        let block = s.block(blocks[0]).unwrap();
        assert_eq!(block.material, MaterialId::Wood);
        assert_eq!(block.grid_cells.len(), 3);
    }

    #[test]
    fn test_reset_is_repeatable() {
        let mut s = Session::new(GameConfig::default(), 1600.0, 900.0, 3);
        s.reset_level();
        let first = s.world.len();
        s.reset_level();
        assert_eq!(s.world.len(), first);
        assert_eq!(s.roles.len(), first);
        assert_eq!(s.session_id, 2);
    }
}
