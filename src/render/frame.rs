//! Per-frame snapshot of everything a renderer draws

use glam::Vec2;

use super::instance::{CircleInstance, LineInstance, RectInstance, circle_kind, parse_hex_color, rect_kind};
use crate::blueprint::MaterialId;
use crate::config::ColorTable;
use crate::physics::{BodyState, Shape};
use crate::sim::cracks::{crack_line_width, generate_crack_pattern};
use crate::sim::state::{BodyKind, Session};
use crate::team::Team;

const FALLBACK_COLOR: [f32; 4] = [1.0, 0.0, 1.0, 1.0];
/// Crack stroke colour (dark, partly transparent)
const CRACK_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 0.6];
const TRAJECTORY_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 0.5];
const TRAJECTORY_WIDTH: f32 = 2.0;
/// Stone spots are drawn as a darker shade of the fill
const STONE_SPOT_SHADE: f32 = 0.8;

fn color(hex: &str) -> [f32; 4] {
    parse_hex_color(hex).unwrap_or_else(|| {
        log::warn!("Bad colour {hex:?}, using fallback");
        FALLBACK_COLOR
    })
}

fn team_color(colors: &ColorTable, team: Team) -> [f32; 4] {
    match team {
        Team::Red => color(&colors.red_team),
        Team::Blue => color(&colors.blue_team),
    }
}

fn material_kind(material: MaterialId) -> u32 {
    match material {
        MaterialId::Wood => rect_kind::WOOD,
        MaterialId::Steel => rect_kind::STEEL,
        MaterialId::Stone => rect_kind::STONE,
        MaterialId::Glass => rect_kind::GLASS,
    }
}

/// Damage number ready to draw
#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    pub position: Vec2,
    pub text: String,
    pub size: f32,
    /// RGBA with alpha already faded by remaining life
    pub color: [f32; 4],
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub width: f32,
    pub height: f32,
    pub sky: [[f32; 4]; 2],
    pub rects: Vec<RectInstance>,
    pub circles: Vec<CircleInstance>,
    /// Crack strokes
    pub lines: Vec<LineInstance>,
    pub labels: Vec<TextLabel>,
    /// Predicted shot path, if the player is aiming
    pub trajectory: Vec<Vec2>,
    /// `trajectory` as line instances
    pub trajectory_lines: Vec<LineInstance>,
}

impl Frame {
    /// Snapshot `session` for drawing. `aim` is a path from
    /// `Session::predict_trajectory`; it is drawn as a polyline.
    pub fn capture(session: &Session, aim: Option<&[Vec2]>) -> Self {
        let colors = &session.config.colors;
        let mut frame = Frame {
            width: session.width,
            height: session.height,
            sky: [color(&colors.sky_top), color(&colors.sky_bottom)],
            ..Default::default()
        };

        for body in session.world.bodies() {
            let Some(kind) = session.role(body.id) else {
                continue;
            };
            match (kind, body.shape) {
                (BodyKind::Ground, Shape::Rect { half }) => {
                    frame.rects.push(RectInstance {
                        center: body.position.to_array(),
                        half_size: half.to_array(),
                        fill: color(&colors.ground),
                        stroke: color(&colors.ground_dark),
                        health: 1.0,
                        kind: rect_kind::GROUND,
                        angle: body.angle,
                        _pad: 0,
                    });
                }
                (BodyKind::Block(block), Shape::Rect { half }) => {
                    let (fill, stroke) = colors.material(block.material);
                    let fill = color(fill);
                    let ratio = block.health_ratio();
                    frame.rects.push(RectInstance {
                        center: body.position.to_array(),
                        half_size: half.to_array(),
                        fill,
                        stroke: color(stroke),
                        health: ratio,
                        kind: material_kind(block.material),
                        angle: body.angle,
                        _pad: 0,
                    });

                    let spot_color = [
                        fill[0] * STONE_SPOT_SHADE,
                        fill[1] * STONE_SPOT_SHADE,
                        fill[2] * STONE_SPOT_SHADE,
                        fill[3],
                    ];
                    frame.circles.extend(block.stone_texture.iter().map(|spot| CircleInstance {
                        center: body.to_world(spot.offset).to_array(),
                        radius: spot.size,
                        kind: circle_kind::STONE_SPOT,
                        color: spot_color,
                    }));

                    if ratio < 1.0 {
                        frame.push_cracks(&body, half * 2.0, ratio);
                    }
                }
                (BodyKind::Soldier { team }, Shape::Circle { radius }) => {
                    frame.circles.push(CircleInstance {
                        center: body.position.to_array(),
                        radius,
                        kind: circle_kind::SOLDIER,
                        color: team_color(colors, *team),
                    });
                }
                (BodyKind::Projectile { .. }, Shape::Circle { radius }) => {
                    frame.circles.push(CircleInstance {
                        center: body.position.to_array(),
                        radius,
                        kind: circle_kind::PROJECTILE,
                        color: color(&colors.projectile),
                    });
                }
                (kind, shape) => {
                    log::warn!("No drawable for {kind:?} with {shape:?}");
                }
            }
        }

        frame.labels = session
            .floating_texts
            .iter()
            .map(|text| {
                let mut rgba = color(&text.color);
                rgba[3] = text.alpha();
                TextLabel {
                    position: text.position,
                    text: text.text.clone(),
                    size: text.size,
                    color: rgba,
                }
            })
            .collect();

        if let Some(path) = aim {
            frame.set_trajectory(path);
        }
        frame
    }

    /// Crack pattern of a block, moved into world space
    fn push_cracks(&mut self, body: &BodyState, size: Vec2, health_ratio: f32) {
        let mut segments = Vec::new();
        for crack in generate_crack_pattern(body.position, size, health_ratio) {
            crack.walk(0, &mut segments);
        }
        self.lines.extend(segments.into_iter().map(|(start, end, depth)| LineInstance {
            start: body.to_world(start).to_array(),
            end: body.to_world(end).to_array(),
            width: crack_line_width(depth),
            _pad: 0,
            color: CRACK_COLOR,
        }));
    }

    /// Replace the aim polyline and its line instances
    pub fn set_trajectory(&mut self, path: &[Vec2]) {
        self.trajectory = path.to_vec();
        self.trajectory_lines = path
            .windows(2)
            .map(|pair| LineInstance {
                start: pair[0].to_array(),
                end: pair[1].to_array(),
                width: TRAJECTORY_WIDTH,
                _pad: 0,
                color: TRAJECTORY_COLOR,
            })
            .collect();
    }

    pub fn rect_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.rects)
    }

    pub fn circle_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.circles)
    }

    pub fn line_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.lines)
    }

    pub fn trajectory_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.trajectory_lines)
    }
}
