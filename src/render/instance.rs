//! Instance types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// `RectInstance::kind` values
pub mod rect_kind {
    pub const GROUND: u32 = 0;
    pub const WOOD: u32 = 1;
    pub const STEEL: u32 = 2;
    pub const STONE: u32 = 3;
    pub const GLASS: u32 = 4;
}

/// `CircleInstance::kind` values
pub mod circle_kind {
    pub const SOLDIER: u32 = 0;
    pub const PROJECTILE: u32 = 1;
    pub const STONE_SPOT: u32 = 2;
}

/// Box with fill, outline, rotation and remaining health
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct RectInstance {
    pub center: [f32; 2],
    pub half_size: [f32; 2],
    pub fill: [f32; 4],
    pub stroke: [f32; 4],
    /// 0-1, 1 for indestructible bodies
    pub health: f32,
    pub kind: u32,
    /// Rotation in radians
    pub angle: f32,
    pub _pad: u32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct CircleInstance {
    pub center: [f32; 2],
    pub radius: f32,
    pub kind: u32,
    pub color: [f32; 4],
}

/// Line segment (cracks, trajectory)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct LineInstance {
    pub start: [f32; 2],
    pub end: [f32; 2],
    pub width: f32,
    pub _pad: u32,
    pub color: [f32; 4],
}

/// Parse `#rgb` or `#rrggbb` into linear-ish RGBA (sRGB values, alpha 1)
pub fn parse_hex_color(hex: &str) -> Option<[f32; 4]> {
    let digits = hex.trim().strip_prefix('#')?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| v as f32 / 255.0);
    match digits.len() {
        3 => {
            let mut rgb = [0.0; 3];
            for (i, c) in digits.chars().enumerate() {
                rgb[i] = channel(&c.to_string().repeat(2))?;
            }
            Some([rgb[0], rgb[1], rgb[2], 1.0])
        }
        6 => Some([
            channel(digits.get(0..2)?)?,
            channel(digits.get(2..4)?)?,
            channel(digits.get(4..6)?)?,
            1.0,
        ]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_layouts() {
        assert_eq!(std::mem::size_of::<RectInstance>(), 64);
        assert_eq!(std::mem::size_of::<CircleInstance>(), 32);
        assert_eq!(std::mem::size_of::<LineInstance>(), 40);
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ffffff"), Some([1.0, 1.0, 1.0, 1.0]));
        assert_eq!(parse_hex_color("#333"), parse_hex_color("#333333"));
        let red = parse_hex_color("#ff6b6b").unwrap();
        assert_eq!(red[0], 1.0);
        assert!((red[1] - 107.0 / 255.0).abs() < 1e-6);
        assert_eq!(parse_hex_color("ff0000"), None);
        assert_eq!(parse_hex_color("#ff00"), None);
        assert_eq!(parse_hex_color("#gg0000"), None);
    }
}
