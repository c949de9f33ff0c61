//! Built-in castle template

use super::Blueprint;

/// Default castle, rows top to bottom. Three soldiers stand on the
/// left, top and right platforms.
pub const CASTLE_BLUEPRINT: [&str; 14] = [
    "-------ggg-------",
    "-------gpg-------",
    "-----sssssss-----",
    "-----s-----s-----",
    "----ps-----sp----",
    "---sss-----sss---",
    "---s---------s---",
    "--ttt-------ttt--",
    "--sss-------sss--",
    "--s-s-------s-s--",
    "--sss--www--sss--",
    "---w---www---w---",
    "---wtttssstttw---",
    "----sssssssss----",
];

pub fn castle_blueprint() -> Blueprint {
    Blueprint::new(&CASTLE_BLUEPRINT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridCell;

    #[test]
    fn test_castle_dimensions() {
        let bp = castle_blueprint();
        assert_eq!(bp.width(), 17);
        assert_eq!(bp.height(), 14);
        assert!(CASTLE_BLUEPRINT.iter().all(|r| r.len() == 17));
    }

    #[test]
    fn test_castle_spawns() {
        assert_eq!(
            castle_blueprint().spawn_cells(),
            vec![GridCell::new(8, 1), GridCell::new(4, 4), GridCell::new(12, 4)]
        );
    }

    #[test]
    fn test_castle_is_left_right_symmetric() {
        let bp = castle_blueprint();
        assert_eq!(bp.mirrored(), bp);
    }
}
