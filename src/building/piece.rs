//! Piece registry and footprint rotation
//!
//! A footprint is a row-major boolean matrix, top row first. The anchor
//! (origin) cell of any footprint is horizontally centred on the bottom row,
//! so a piece sits on whatever the cursor points at regardless of rotation.

use serde::{Deserialize, Serialize};

/// Row-major occupancy matrix, `footprint[y][x]`
pub type Footprint = Vec<Vec<bool>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceId {
    #[default]
    Unit,
    Beam3,
    Pillar3,
}

impl PieceId {
    pub const ALL: [PieceId; 3] = [PieceId::Unit, PieceId::Beam3, PieceId::Pillar3];

    pub fn label(self) -> &'static str {
        match self {
            PieceId::Unit => "Unit (1x1)",
            PieceId::Beam3 => "Beam (3x1)",
            PieceId::Pillar3 => "Pillar (1x3)",
        }
    }

    /// Unrotated footprint
    pub fn footprint(self) -> Footprint {
        match self {
            PieceId::Unit => vec![vec![true]],
            PieceId::Beam3 => vec![vec![true; 3]],
            PieceId::Pillar3 => vec![vec![true]; 3],
        }
    }

    /// Footprint after rotation
    pub fn rotated(self, rotation: Rotation) -> Footprint {
        rotate_footprint(&self.footprint(), rotation)
    }
}

/// Clockwise rotation in quarter turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    pub fn degrees(self) -> u32 {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 90,
            Rotation::R180 => 180,
            Rotation::R270 => 270,
        }
    }

    /// Any multiple of 90, negative angles allowed
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Rotation::R0),
            90 => Some(Rotation::R90),
            180 => Some(Rotation::R180),
            270 => Some(Rotation::R270),
            _ => None,
        }
    }

    /// Next quarter turn clockwise
    pub fn next(self) -> Self {
        match self {
            Rotation::R0 => Rotation::R90,
            Rotation::R90 => Rotation::R180,
            Rotation::R180 => Rotation::R270,
            Rotation::R270 => Rotation::R0,
        }
    }
}

fn dims(footprint: &[Vec<bool>]) -> (usize, usize) {
    let h = footprint.len();
    let w = footprint.first().map_or(0, |r| r.len());
    (w, h)
}

/// Rotate a footprint clockwise. Quarter turns swap width and height.
pub fn rotate_footprint(footprint: &[Vec<bool>], rotation: Rotation) -> Footprint {
    let (w, h) = dims(footprint);
    let at = |x: usize, y: usize| footprint.get(y).and_then(|r| r.get(x)).copied().unwrap_or(false);

    match rotation {
        Rotation::R0 => (0..h).map(|y| (0..w).map(|x| at(x, y)).collect()).collect(),
        Rotation::R90 => {
            let mut out = vec![vec![false; h]; w];
            for y in 0..h {
                for x in 0..w {
                    out[x][h - 1 - y] = at(x, y);
                }
            }
            out
        }
        Rotation::R180 => {
            let mut out = vec![vec![false; w]; h];
            for y in 0..h {
                for x in 0..w {
                    out[h - 1 - y][w - 1 - x] = at(x, y);
                }
            }
            out
        }
        Rotation::R270 => {
            let mut out = vec![vec![false; h]; w];
            for y in 0..h {
                for x in 0..w {
                    out[w - 1 - x][y] = at(x, y);
                }
            }
            out
        }
    }
}

/// Anchor cell within the footprint: `(floor(w / 2), h - 1)`
pub fn footprint_origin(footprint: &[Vec<bool>]) -> (i32, i32) {
    let (w, h) = dims(footprint);
    ((w / 2) as i32, h as i32 - 1)
}

/// Offsets of every filled cell from the anchor, row-major
pub fn occupied_offsets(footprint: &[Vec<bool>]) -> Vec<(i32, i32)> {
    let (ox, oy) = footprint_origin(footprint);
    let mut offsets = Vec::new();
    for (y, row) in footprint.iter().enumerate() {
        for (x, filled) in row.iter().enumerate() {
            if *filled {
                offsets.push((x as i32 - ox, y as i32 - oy));
            }
        }
    }
    offsets
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn l_shape() -> Footprint {
        vec![vec![true, false], vec![true, false], vec![true, true]]
    }

    #[test]
    fn test_quarter_turn_swaps_dims() {
        let rotated = rotate_footprint(&l_shape(), Rotation::R90);
        assert_eq!(rotated.len(), 2);
        assert_eq!(rotated[0].len(), 3);
        assert_eq!(
            rotated,
            vec![vec![true, true, true], vec![true, false, false]]
        );
    }

    #[test]
    fn test_half_turn_reverses_both_axes() {
        let rotated = rotate_footprint(&l_shape(), Rotation::R180);
        assert_eq!(
            rotated,
            vec![vec![true, true], vec![false, true], vec![false, true]]
        );
    }

    #[test]
    fn test_three_quarter_is_inverse_of_quarter() {
        let once = rotate_footprint(&l_shape(), Rotation::R90);
        assert_eq!(rotate_footprint(&once, Rotation::R270), l_shape());
    }

    #[test]
    fn test_beam_rotates_into_pillar() {
        assert_eq!(PieceId::Beam3.rotated(Rotation::R90), PieceId::Pillar3.footprint());
    }

    #[test]
    fn test_origin_and_offsets() {
        let beam = PieceId::Beam3.footprint();
        assert_eq!(footprint_origin(&beam), (1, 0));
        assert_eq!(occupied_offsets(&beam), vec![(-1, 0), (0, 0), (1, 0)]);

        let pillar = PieceId::Pillar3.footprint();
        assert_eq!(footprint_origin(&pillar), (0, 2));
        assert_eq!(occupied_offsets(&pillar), vec![(0, -2), (0, -1), (0, 0)]);
    }

    #[test]
    fn test_rotation_degrees() {
        assert_eq!(Rotation::from_degrees(-90), Some(Rotation::R270));
        assert_eq!(Rotation::from_degrees(450), Some(Rotation::R90));
        assert_eq!(Rotation::from_degrees(45), None);
        assert_eq!(Rotation::R270.next(), Rotation::R0);
    }

    fn footprints() -> impl Strategy<Value = Footprint> {
        (1usize..6, 1usize..6).prop_flat_map(|(w, h)| {
            prop::collection::vec(prop::collection::vec(any::<bool>(), w), h)
        })
    }

    proptest! {
        #[test]
        fn test_four_quarter_turns_is_identity(footprint in footprints()) {
            let mut current = footprint.clone();
            for _ in 0..4 {
                current = rotate_footprint(&current, Rotation::R90);
            }
            prop_assert_eq!(current, footprint);
        }

        #[test]
        fn test_rotation_preserves_filled_count(footprint in footprints(), turns in 0i32..4) {
            let rotation = Rotation::from_degrees(turns * 90).unwrap();
            let count = |f: &Footprint| f.iter().flatten().filter(|c| **c).count();
            prop_assert_eq!(count(&rotate_footprint(&footprint, rotation)), count(&footprint));
        }
    }
}
