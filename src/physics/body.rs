//! Body handles, shapes, filters and descriptions

use glam::Vec2;
use rapier2d::na as nalgebra;
use rapier2d::prelude::{
    ActiveEvents, CoefficientCombineRule, Collider, ColliderBuilder, Group, InteractionGroups,
    RigidBody, RigidBodyBuilder, vector,
};
use serde::{Deserialize, Serialize};

/// Stable body handle. Ids are never reused within one world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub(crate) u32);

impl BodyId {
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Tag stored in rapier `user_data`
    pub(crate) fn user_data(self) -> u128 {
        self.0 as u128
    }

    pub(crate) fn from_user_data(data: u128) -> Self {
        Self(data as u32)
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_center(center: Vec2, half: Vec2) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Shrink every side by `amount` (used to ignore edge-touching neighbours)
    pub fn inset(self, amount: f32) -> Self {
        Self {
            min: self.min + Vec2::splat(amount),
            max: self.max - Vec2::splat(amount),
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec2 {
        ((self.max - self.min) * 0.5).max(Vec2::ZERO)
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// Rectangle given by half extents in body space
    Rect { half: Vec2 },
    Circle { radius: f32 },
}

impl Shape {
    /// World bounds at `position`, rotated by `angle` radians
    pub fn aabb(&self, position: Vec2, angle: f32) -> Aabb {
        match *self {
            Shape::Rect { half } => {
                let (sin, cos) = angle.sin_cos();
                let extent = Vec2::new(
                    half.x * cos.abs() + half.y * sin.abs(),
                    half.x * sin.abs() + half.y * cos.abs(),
                );
                Aabb::from_center(position, extent)
            }
            Shape::Circle { radius } => Aabb::from_center(position, Vec2::splat(radius)),
        }
    }
}

/// Category/mask pair. Two bodies may touch only if each one's mask
/// includes the other's category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollisionFilter {
    pub category: u32,
    pub mask: u32,
}

impl CollisionFilter {
    pub const fn new(category: u32, mask: u32) -> Self {
        Self { category, mask }
    }

    #[inline]
    pub fn can_collide(&self, other: &CollisionFilter) -> bool {
        (self.mask & other.category) != 0 && (other.mask & self.category) != 0
    }

    /// Same rule expressed as rapier memberships/filter
    pub fn interaction_groups(&self) -> InteractionGroups {
        InteractionGroups::new(
            Group::from_bits_truncate(self.category),
            Group::from_bits_truncate(self.mask),
        )
    }
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self {
            category: 0x1,
            mask: u32::MAX,
        }
    }
}

/// Everything needed to create a body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyDesc {
    pub shape: Shape,
    pub position: Vec2,
    pub velocity: Vec2,
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
    /// Fraction of velocity lost per base frame
    pub air_friction: f32,
    pub is_static: bool,
    /// Continuous collision detection, for small fast bodies
    pub ccd: bool,
    pub filter: CollisionFilter,
}

impl BodyDesc {
    fn with_shape(shape: Shape, position: Vec2) -> Self {
        Self {
            shape,
            position,
            velocity: Vec2::ZERO,
            density: 0.001,
            friction: 0.1,
            restitution: 0.0,
            air_friction: 0.01,
            is_static: false,
            ccd: false,
            filter: CollisionFilter::default(),
        }
    }

    pub fn rect(center: Vec2, size: Vec2) -> Self {
        Self::with_shape(Shape::Rect { half: size * 0.5 }, center)
    }

    pub fn circle(center: Vec2, radius: f32) -> Self {
        Self::with_shape(Shape::Circle { radius }, center)
    }

    pub fn density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    pub fn friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn air_friction(mut self, air_friction: f32) -> Self {
        self.air_friction = air_friction;
        self
    }

    pub fn static_body(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn ccd(mut self, ccd: bool) -> Self {
        self.ccd = ccd;
        self
    }

    pub fn filter(mut self, filter: CollisionFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Rapier rigid body for this description
    pub(crate) fn rigid_body(&self, id: BodyId) -> RigidBody {
        let builder = if self.is_static {
            RigidBodyBuilder::fixed()
        } else {
            RigidBodyBuilder::dynamic()
                .linvel(vector![self.velocity.x, self.velocity.y])
                .linear_damping(self.air_friction)
                .angular_damping(self.air_friction)
                .ccd_enabled(self.ccd)
        };
        builder
            .translation(vector![self.position.x, self.position.y])
            .user_data(id.user_data())
            .build()
    }

    /// Rapier collider for this description. Restitution combines by max and
    /// friction by min across a contact pair.
    pub(crate) fn collider(&self, id: BodyId) -> Collider {
        let builder = match self.shape {
            Shape::Rect { half } => ColliderBuilder::cuboid(half.x, half.y),
            Shape::Circle { radius } => ColliderBuilder::ball(radius),
        };
        builder
            .density(self.density)
            .friction(self.friction)
            .friction_combine_rule(CoefficientCombineRule::Min)
            .restitution(self.restitution)
            .restitution_combine_rule(CoefficientCombineRule::Max)
            .collision_groups(self.filter.interaction_groups())
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .user_data(id.user_data())
            .build()
    }
}

/// Read-only snapshot of a live body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyState {
    pub id: BodyId,
    pub shape: Shape,
    pub position: Vec2,
    /// Rotation in radians, clockwise on screen (y points down)
    pub angle: f32,
    pub velocity: Vec2,
    pub is_static: bool,
    pub filter: CollisionFilter,
}

impl BodyState {
    pub fn aabb(&self) -> Aabb {
        self.shape.aabb(self.position, self.angle)
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Body-space point to world space
    pub fn to_world(&self, local: Vec2) -> Vec2 {
        self.position + Vec2::from_angle(self.angle).rotate(local)
    }
}
