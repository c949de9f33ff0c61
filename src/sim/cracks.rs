//! Procedural crack patterns for damaged blocks
//!
//! Cracks are generated in block-local space (origin at the block centre) from
//! a position seed, so a block that has not moved always shows the same
//! pattern for a given damage level.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rng::Lcg;

/// Fraction of main cracks that start on an edge rather than inside
const EDGE_START_CHANCE: f32 = 0.6;
/// Chance a branch heads toward the block centre
const TOWARD_CENTER_CHANCE: f32 = 0.4;
/// Max angular jitter (radians) of a centre-bound branch, either side
const CENTER_ANGLE_JITTER: f32 = 0.4;
const BASE_LINE_WIDTH: f32 = 1.5;
const MIN_LINE_WIDTH: f32 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrackSegment {
    pub start: Vec2,
    pub end: Vec2,
    pub branches: Vec<CrackSegment>,
}

impl CrackSegment {
    /// Depth-first walk yielding `(segment, depth)`; main cracks have depth 0
    pub fn walk(&self, depth: u32, out: &mut Vec<(Vec2, Vec2, u32)>) {
        out.push((self.start, self.end, depth));
        for branch in &self.branches {
            branch.walk(depth + 1, out);
        }
    }
}

/// Stroke width for a crack at `depth`
pub fn crack_line_width(depth: u32) -> f32 {
    (BASE_LINE_WIDTH * (1.0 - depth as f32 * 0.2)).max(MIN_LINE_WIDTH)
}

/// Everything the recursive branch generator needs besides its seed
struct CrackField {
    half: Vec2,
    damage: f32,
}

impl CrackField {
    fn inside(&self, p: Vec2) -> bool {
        p.x.abs() <= self.half.x && p.y.abs() <= self.half.y
    }

    /// Cut `start -> end` at the block boundary. `None` if nothing of it lies inside.
    fn clip(&self, start: Vec2, end: Vec2) -> Option<Vec2> {
        if self.inside(end) {
            return Some(end);
        }
        let delta = end - start;
        let mut t: f32 = 1.0;
        for axis in 0..2 {
            let d = delta[axis];
            if d.abs() > f32::EPSILON {
                let bound = self.half[axis] * d.signum();
                t = t.min((bound - start[axis]) / d);
            }
        }
        if t <= 0.0 {
            return None;
        }
        let clipped = start + delta * t;
        self.inside(clipped).then_some(clipped)
    }

    fn branch(&self, start: Vec2, depth: u32, seed: i64) -> Option<CrackSegment> {
        if depth == 0 {
            return None;
        }
        let mut lcg = Lcg::new(seed);

        let toward_center = lcg.next_unit() < TOWARD_CENTER_CHANCE;
        let end = if toward_center {
            let to_center = -start;
            let length = to_center.length() * (0.3 + self.damage * 0.5);
            let jitter = (lcg.next_unit() - 0.5) * 2.0 * CENTER_ANGLE_JITTER;
            let angle = to_center.y.atan2(to_center.x) + jitter;
            start + Vec2::from_angle(angle) * length
        } else {
            let angle = lcg.next_unit() * std::f32::consts::TAU;
            let length = self.half.min_element() * 2.0 * (0.2 + self.damage * 0.4);
            start + Vec2::from_angle(angle) * length
        };

        let end = self.clip(start, end)?;
        let mut segment = CrackSegment {
            start,
            end,
            branches: Vec::new(),
        };

        if depth > 1 {
            let max_branches = if self.damage > 0.5 { 2.0 } else { 1.0 };
            let count = (max_branches * Lcg::new(lcg.state() + 100).next_unit()).floor() as i64;
            for i in 0..count {
                let at = lcg.next_unit();
                let branch_start = start.lerp(end, at);
                if !self.inside(branch_start) {
                    continue;
                }
                if let Some(branch) = self.branch(branch_start, depth - 1, lcg.state() + i * 500) {
                    segment.branches.push(branch);
                }
            }
        }
        Some(segment)
    }
}

/// Crack pattern for a `size` block at `position` with `health_ratio` left.
///
/// An undamaged block (ratio >= 1) has no cracks.
pub fn generate_crack_pattern(position: Vec2, size: Vec2, health_ratio: f32) -> Vec<CrackSegment> {
    if health_ratio >= 1.0 {
        return Vec::new();
    }
    let damage = (1.0 - health_ratio).clamp(0.0, 1.0);
    let field = CrackField {
        half: size * 0.5,
        damage,
    };

    let main_count = (2.0 + damage * 4.0).floor() as i64;
    let max_depth = (2.0 + damage * 2.0).floor() as u32;
    let (w, h) = (size.x, size.y);

    let mut lcg = Lcg::from_position(position.x, position.y);
    let mut cracks = Vec::new();
    for i in 0..main_count {
        let r1 = lcg.next_unit();
        let r2 = lcg.next_unit();

        let start = if r1 < EDGE_START_CHANCE {
            let along = lcg.next_unit();
            match (r2 * 4.0) as u32 {
                0 => Vec2::new(-w / 2.0 + along * w, -h / 2.0),
                1 => Vec2::new(w / 2.0, -h / 2.0 + along * h),
                2 => Vec2::new(-w / 2.0 + along * w, h / 2.0),
                _ => Vec2::new(-w / 2.0, -h / 2.0 + along * h),
            }
        } else {
            Vec2::new(-w / 2.0 + r1 * w, -h / 2.0 + r2 * h)
        };

        if let Some(crack) = field.branch(start, max_depth, lcg.state() + i * 1000) {
            cracks.push(crack);
        }
    }
    cracks
}
