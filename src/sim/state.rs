//! Simulation context and body roles
//!
//! `Session` owns everything the game mutates: the live world, the ghost world
//! used for aim prediction, the role of every live body, cell occupancy and the
//! turn. All mutation goes through it; nothing is global.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::damage::{FloatingText, placement_filter};
use super::factory::{TextureSpot, block_desc, ground_desc, stone_texture};
use crate::blueprint::{Blueprint, MaterialId, PlacedRect, castle_blueprint};
use crate::building::{
    CellOccupant, OccupiedCells, PieceId, PiecePlacement, Rotation, can_place, get_piece_placement,
};
use crate::config::GameConfig;
use crate::grid::{GridCell, GridSpec};
use crate::physics::{BodyDesc, BodyId, CollisionFilter, PhysicsWorld};
use crate::team::Team;

/// Bodies slower than this count as at rest for telemetry (px/frame)
const MOVING_SPEED: f32 = 0.1;

/// Destructible block state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockState {
    pub material: MaterialId,
    pub health: f32,
    pub max_health: f32,
    pub team: Team,
    /// Cells released when the block is destroyed
    pub grid_cells: Vec<GridCell>,
    /// Stone only
    pub stone_texture: Vec<TextureSpot>,
}

impl BlockState {
    pub fn health_ratio(&self) -> f32 {
        if self.max_health > 0.0 {
            self.health / self.max_health
        } else {
            0.0
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.health <= 0.0
    }
}

/// What a live body is in the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BodyKind {
    Ground,
    Block(BlockState),
    Soldier { team: Team },
    Projectile { team: Team },
}

impl BodyKind {
    pub fn team(&self) -> Option<Team> {
        match self {
            BodyKind::Ground => None,
            BodyKind::Block(block) => Some(block.team),
            BodyKind::Soldier { team } | BodyKind::Projectile { team } => Some(*team),
        }
    }

    pub fn is_ground(&self) -> bool {
        matches!(self, BodyKind::Ground)
    }
}

/// Forced removal of a shot that never resolved
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingRemoval {
    pub body: BodyId,
    /// Clock time (ms) at which to remove it
    pub due_ms: f64,
    /// Level the shot was fired in; stale after a reset
    pub session_id: u64,
}

/// Snapshot of motion in the live world
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    /// Speed of the newest live projectile (px/frame)
    pub projectile_speed: Option<f32>,
    /// Height of that projectile above the ground top (px)
    pub projectile_altitude: Option<f32>,
    /// Dynamic bodies still moving
    pub moving_bodies: usize,
    pub live_blocks: usize,
    pub frame: u64,
}

/// The simulation context
#[derive(Debug)]
pub struct Session {
    pub config: GameConfig,
    pub width: f32,
    pub height: f32,
    pub world: PhysicsWorld,
    /// Scratch world for trajectory prediction; never authoritative
    pub ghost: PhysicsWorld,
    /// Role of every live body in `world`
    pub roles: BTreeMap<BodyId, BodyKind>,
    pub occupied: OccupiedCells,
    pub current_team: Team,
    pub floating_texts: Vec<FloatingText>,
    /// Bumped on every level reset
    pub session_id: u64,
    pub pending_removals: Vec<PendingRemoval>,
    /// Real time elapsed, advanced one nominal frame per tick (ms)
    pub clock_ms: f64,
    pub frame_count: u64,
    pub rng: Pcg32,
    pub seed: u64,
    /// Castle template; the blue side is mirrored
    pub blueprint: Blueprint,
    pub(crate) ground: Option<BodyId>,
}

impl Session {
    /// Empty session. Call `reset_level` to build the castles.
    pub fn new(config: GameConfig, width: f32, height: f32, seed: u64) -> Self {
        let gravity = Vec2::new(0.0, config.gravity);
        Self {
            config,
            width,
            height,
            world: PhysicsWorld::new(gravity),
            ghost: PhysicsWorld::new(gravity),
            roles: BTreeMap::new(),
            occupied: OccupiedCells::new(),
            current_team: Team::Red,
            floating_texts: Vec::new(),
            session_id: 0,
            pending_removals: Vec::new(),
            clock_ms: 0.0,
            frame_count: 0,
            rng: Pcg32::seed_from_u64(seed),
            seed,
            blueprint: castle_blueprint(),
            ground: None,
        }
    }

    pub fn with_blueprint(mut self, blueprint: Blueprint) -> Self {
        self.blueprint = blueprint;
        self
    }

    /// World grid for the current dimensions and block size
    pub fn grid(&self) -> GridSpec {
        GridSpec::new(self.width, self.height, self.config.block_size)
    }

    /// Y of the ground's top surface
    pub fn ground_top(&self) -> f32 {
        self.height - self.config.ground_height
    }

    pub fn ground_id(&self) -> Option<BodyId> {
        self.ground
    }

    pub fn role(&self, id: BodyId) -> Option<&BodyKind> {
        self.roles.get(&id)
    }

    pub fn block(&self, id: BodyId) -> Option<&BlockState> {
        match self.roles.get(&id) {
            Some(BodyKind::Block(block)) => Some(block),
            _ => None,
        }
    }

    pub fn block_mut(&mut self, id: BodyId) -> Option<&mut BlockState> {
        match self.roles.get_mut(&id) {
            Some(BodyKind::Block(block)) => Some(block),
            _ => None,
        }
    }

    /// Live bodies with their roles, in id order
    pub fn bodies_of<'a>(
        &'a self,
        pred: impl Fn(&BodyKind) -> bool + 'a,
    ) -> impl Iterator<Item = BodyId> + 'a {
        self.roles
            .iter()
            .filter(move |(_, kind)| pred(kind))
            .map(|(id, _)| *id)
    }

    /// Insert a body and its role together
    pub fn add_body(&mut self, desc: BodyDesc, kind: BodyKind) -> BodyId {
        let id = self.world.add(desc);
        if kind.is_ground() {
            self.ground = Some(id);
        }
        self.roles.insert(id, kind);
        id
    }

    /// Remove a body and its role; a block also releases its cells.
    ///
    /// Removing an absent body is a no-op returning `None`.
    pub fn remove_body(&mut self, id: BodyId) -> Option<BodyKind> {
        self.world.remove(id)?;
        let kind = self.roles.remove(&id)?;
        match &kind {
            BodyKind::Block(block) => self.occupied.release(&block.grid_cells),
            BodyKind::Ground => self.ground = None,
            BodyKind::Soldier { .. } | BodyKind::Projectile { .. } => {}
        }
        Some(kind)
    }

    /// Spawn a block for a compiled rect and claim its cells
    pub fn spawn_block(&mut self, rect: &PlacedRect, team: Team, filter: CollisionFilter) -> BodyId {
        let material = rect.material();
        let max_health = self.config.max_health(material);
        let texture = if material == MaterialId::Stone {
            stone_texture(rect.center, rect.size)
        } else {
            Vec::new()
        };
        let desc = block_desc(rect, &self.config, filter);
        self.occupied
            .occupy(&rect.grid_cells, CellOccupant { material, team });
        self.add_body(
            desc,
            BodyKind::Block(BlockState {
                material,
                health: max_health,
                max_health,
                team,
                grid_cells: rect.grid_cells.clone(),
                stone_texture: texture,
            }),
        )
    }

    /// First live soldier of `team`, the one that shoots
    pub fn current_soldier(&self, team: Team) -> Option<BodyId> {
        self.roles.iter().find_map(|(id, kind)| match kind {
            BodyKind::Soldier { team: t } if *t == team => Some(*id),
            _ => None,
        })
    }

    pub fn toggle_team(&mut self) {
        self.current_team = self.current_team.other();
    }

    /// Where a piece would land at `world_point` and whether it may
    pub fn placement_preview(
        &self,
        world_point: Vec2,
        piece: PieceId,
        rotation: Rotation,
        material: MaterialId,
    ) -> (PiecePlacement, bool) {
        let grid = self.grid();
        let anchor = grid.world_to_cell(world_point);
        let placement = get_piece_placement(&grid, piece, rotation, material, anchor);
        let ok = can_place(
            &grid,
            &placement,
            &self.occupied,
            &self.world,
            self.ground_top(),
            |id| self.roles.get(&id).is_some_and(BodyKind::is_ground),
        );
        (placement, ok)
    }

    /// Place a piece for the active team. Returns the new bodies, empty if
    /// the placement was rejected.
    pub fn try_place_piece(
        &mut self,
        world_point: Vec2,
        piece: PieceId,
        rotation: Rotation,
        material: MaterialId,
    ) -> Vec<BodyId> {
        let (placement, ok) = self.placement_preview(world_point, piece, rotation, material);
        if !ok {
            log::warn!(
                "Cannot place {} at cell ({}, {})",
                piece.label(),
                placement.anchor.x,
                placement.anchor.y
            );
            return Vec::new();
        }
        let team = self.current_team;
        let filter = placement_filter(team);
        let ids: Vec<BodyId> = placement
            .placed_rects
            .iter()
            .map(|rect| self.spawn_block(rect, team, filter))
            .collect();
        log::debug!("Placed {} for {} ({} bodies)", piece.label(), team.as_str(), ids.len());
        ids
    }

    /// Adopt new dimensions and rebuild the ground under the new bottom band.
    ///
    /// Castles stay where they are until the next level reset.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        let Some(ground) = self.ground else {
            return;
        };
        self.remove_body(ground);
        self.add_body(ground_desc(width, height, &self.config), BodyKind::Ground);
        log::debug!("Resized to {width}x{height}");
    }

    pub fn telemetry(&self) -> Telemetry {
        let newest_shot = self
            .roles
            .iter()
            .rev()
            .find(|(_, kind)| matches!(kind, BodyKind::Projectile { .. }))
            .and_then(|(id, _)| self.world.body(*id));

        Telemetry {
            projectile_speed: newest_shot.map(|b| b.speed()),
            projectile_altitude: newest_shot.map(|b| self.ground_top() - b.position.y),
            moving_bodies: self
                .world
                .bodies()
                .iter()
                .filter(|b| !b.is_static && b.speed() > MOVING_SPEED)
                .count(),
            live_blocks: self.bodies_of(|k| matches!(k, BodyKind::Block(_))).count(),
            frame: self.frame_count,
        }
    }
}
