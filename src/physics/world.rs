//! Physics world over rapier2d
//!
//! Rapier runs in frame units: one unit of rapier time is one base frame
//! (1000/60 ms), so velocities come out in pixels per frame and `step`
//! just scales `dt` by `delta_ms / BASE_DELTA_MS`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Mutex;

use glam::Vec2;
use rapier2d::na as nalgebra;
use rapier2d::prelude::{
    CCDSolver, ColliderHandle, ColliderSet, ContactPair, DefaultBroadPhase, EventHandler,
    ImpulseJointSet, IntegrationParameters, IslandManager, Isometry, MultibodyJointSet,
    NarrowPhase, PhysicsPipeline, QueryFilter, QueryPipeline, Real, RigidBodyHandle, RigidBodySet,
    SharedShape, vector,
};
use rapier2d::prelude::CollisionEvent as RapierCollisionEvent;

use super::body::{Aabb, BodyDesc, BodyId, BodyState, Shape};
use super::{BASE_DELTA_MS, GRAVITY_SCALE, LENGTH_UNIT};

/// Emitted once when a pair starts touching
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionEvent {
    pub body_a: BodyId,
    pub body_b: BodyId,
    /// Velocities at the start of the step that made contact
    pub velocity_a: Vec2,
    pub velocity_b: Vec2,
}

impl CollisionEvent {
    pub fn relative_speed(&self) -> f32 {
        (self.velocity_a - self.velocity_b).length()
    }
}

/// Collects rapier's `Started` events during one step
#[derive(Default)]
struct StartedPairs {
    pairs: Mutex<Vec<(ColliderHandle, ColliderHandle)>>,
}

impl StartedPairs {
    fn into_pairs(self) -> Vec<(ColliderHandle, ColliderHandle)> {
        self.pairs
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl EventHandler for StartedPairs {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: RapierCollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        if let RapierCollisionEvent::Started(a, b, _) = event {
            if let Ok(mut pairs) = self.pairs.lock() {
                pairs.push((a, b));
            }
        }
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}

/// Per-body bookkeeping on our side of the rapier handle
#[derive(Debug, Clone, Copy)]
struct Entry {
    handle: RigidBodyHandle,
    shape: Shape,
}

/// A self-contained simulation world
pub struct PhysicsWorld {
    /// Gravity in engine units (scaled by `GRAVITY_SCALE`)
    gravity: Vec2,
    entries: BTreeMap<BodyId, Entry>,
    next_id: u32,
    params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
}

impl fmt::Debug for PhysicsWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhysicsWorld")
            .field("gravity", &self.gravity)
            .field("bodies", &self.entries.len())
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}

impl PhysicsWorld {
    pub fn new(gravity: Vec2) -> Self {
        let params = IntegrationParameters {
            length_unit: LENGTH_UNIT,
            ..Default::default()
        };
        Self {
            gravity,
            entries: BTreeMap::new(),
            next_id: 1,
            params,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    /// Add a body and return its handle
    pub fn add(&mut self, desc: BodyDesc) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;

        let handle = self.bodies.insert(desc.rigid_body(id));
        self.colliders
            .insert_with_parent(desc.collider(id), handle, &mut self.bodies);
        self.entries.insert(id, Entry { handle, shape: desc.shape });
        self.query_pipeline.update(&self.colliders);
        id
    }

    /// Remove a body. Removing an absent body is a no-op returning `None`.
    pub fn remove(&mut self, id: BodyId) -> Option<BodyState> {
        let state = self.body(id)?;
        let entry = self.entries.remove(&id)?;
        self.bodies.remove(
            entry.handle,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        self.query_pipeline.update(&self.colliders);
        Some(state)
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Drop every body. Ids keep increasing so stale handles never alias.
    pub fn clear(&mut self) {
        let ids: Vec<BodyId> = self.entries.keys().copied().collect();
        for id in ids {
            self.remove(id);
        }
    }

    pub fn body(&self, id: BodyId) -> Option<BodyState> {
        let entry = self.entries.get(&id)?;
        let body = self.bodies.get(entry.handle)?;
        let collider = body.colliders().first().and_then(|h| self.colliders.get(*h))?;
        let groups = collider.collision_groups();
        let translation = body.translation();
        let velocity = body.linvel();
        Some(BodyState {
            id,
            shape: entry.shape,
            position: Vec2::new(translation.x, translation.y),
            angle: body.rotation().angle(),
            velocity: Vec2::new(velocity.x, velocity.y),
            is_static: body.is_fixed(),
            filter: super::CollisionFilter::new(groups.memberships.bits(), groups.filter.bits()),
        })
    }

    /// All live bodies in id order
    pub fn bodies(&self) -> Vec<BodyState> {
        self.entries.keys().filter_map(|id| self.body(*id)).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Set a body's velocity (ignored for static or absent bodies)
    pub fn set_velocity(&mut self, id: BodyId, velocity: Vec2) -> bool {
        let Some(entry) = self.entries.get(&id) else {
            return false;
        };
        match self.bodies.get_mut(entry.handle) {
            Some(body) if !body.is_fixed() => {
                body.set_linvel(vector![velocity.x, velocity.y], true);
                true
            }
            _ => false,
        }
    }

    /// Bodies whose shape intersects `region`, in id order
    pub fn query_region(&self, region: &Aabb) -> Vec<BodyId> {
        let center = region.center();
        let half = region.half_extents();
        let shape = SharedShape::cuboid(half.x, half.y);
        let pose = Isometry::translation(center.x, center.y);

        let mut hits = Vec::new();
        self.query_pipeline.intersections_with_shape(
            &self.bodies,
            &self.colliders,
            &pose,
            &*shape,
            QueryFilter::default(),
            |handle| {
                if let Some(collider) = self.colliders.get(handle) {
                    hits.push(BodyId::from_user_data(collider.user_data));
                }
                true
            },
        );
        hits.sort_unstable();
        hits.dedup();
        hits
    }

    /// Advance the world by `delta_ms` of simulated time.
    ///
    /// Returns collision-start events for pairs that began touching during
    /// this step, sorted by body ids. Velocities are taken before the step so
    /// they describe the approach, not the bounce.
    pub fn step(&mut self, delta_ms: f32) -> Vec<CollisionEvent> {
        let dt = delta_ms / BASE_DELTA_MS;
        if dt <= 0.0 {
            return Vec::new();
        }
        self.params.dt = dt;

        let before: BTreeMap<BodyId, Vec2> = self
            .bodies()
            .into_iter()
            .map(|b| (b.id, b.velocity))
            .collect();

        let g = self.frame_gravity();
        let gravity = vector![g.x, g.y];
        let started = StartedPairs::default();
        self.pipeline.step(
            &gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &started,
        );

        let mut events: Vec<CollisionEvent> = started
            .into_pairs()
            .into_iter()
            .filter_map(|(a, b)| {
                let a = BodyId::from_user_data(self.colliders.get(a)?.user_data);
                let b = BodyId::from_user_data(self.colliders.get(b)?.user_data);
                let (a, b) = if a <= b { (a, b) } else { (b, a) };
                Some(CollisionEvent {
                    body_a: a,
                    body_b: b,
                    velocity_a: before.get(&a).copied().unwrap_or(Vec2::ZERO),
                    velocity_b: before.get(&b).copied().unwrap_or(Vec2::ZERO),
                })
            })
            .collect();
        events.sort_by_key(|e| (e.body_a, e.body_b));
        events.dedup_by_key(|e| (e.body_a, e.body_b));
        events
    }

    /// Gravity acceleration in px per base frame squared
    fn frame_gravity(&self) -> Vec2 {
        self.gravity * GRAVITY_SCALE * BASE_DELTA_MS * BASE_DELTA_MS
    }
}
