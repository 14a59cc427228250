//! Game phase calculation based on remaining non-pawn material.
//!
//! Phase counts *game progress*, not material remaining: it is 0 at a full
//! middlegame material set and grows toward the endgame as pieces come off
//! the board, reaching its maximum once a side is down to bare king (or
//! king and pawns).

use zugzwang_core::{Board, Color, PieceKind};

/// Per-piece phase weight, indexed by [`PieceKind::index()`].
///
/// Knight=1, Bishop=1, Rook=2, Queen=4 — the standard tapered-eval weights.
const PHASE_WEIGHT: [i32; PieceKind::COUNT] = [0, 1, 1, 2, 4, 0];

/// Raw weighted material total for one side with a full complement of
/// non-pawn pieces: `2*1 + 2*1 + 2*2 + 1*4 = 12`.
const RAW_MAX_PER_SIDE: i32 = 12;

/// Maximum phase contribution from a single side.
pub const MAX_PHASE_PER_SIDE: i32 = 32;

/// Maximum combined phase across both sides.
pub const MAX_PHASE: i32 = 64;

fn raw_material(board: &Board, color: Color) -> i32 {
    let side = board.side(color);
    let mut raw = 0;
    for kind in PieceKind::ALL {
        raw += PHASE_WEIGHT[kind.index()] * (board.pieces(kind) & side).count() as i32;
    }
    raw.min(RAW_MAX_PER_SIDE)
}

/// Game phase contributed by one side.
///
/// Returns a value in `0..=MAX_PHASE_PER_SIDE`: 0 when that side still has
/// its full starting complement of non-pawn material, [`MAX_PHASE_PER_SIDE`]
/// once it is down to bare king.
pub fn phase_for_color(board: &Board, color: Color) -> i32 {
    let raw = raw_material(board, color);
    MAX_PHASE_PER_SIDE - (raw * MAX_PHASE_PER_SIDE + RAW_MAX_PER_SIDE / 2) / RAW_MAX_PER_SIDE
}

/// Combined game phase across both sides.
///
/// Returns a value in `0..=MAX_PHASE`: 0 for a full middlegame material set,
/// [`MAX_PHASE`] for bare kings on both sides. Used to taper the
/// middlegame/endgame components of [`super::score::Score`] and to decide
/// when the time manager should trim the soft deadline.
pub fn game_phase(board: &Board) -> i32 {
    phase_for_color(board, Color::White) + phase_for_color(board, Color::Black)
}

#[cfg(test)]
mod tests {
    use zugzwang_core::{Board, Color};

    use super::{game_phase, phase_for_color, MAX_PHASE, MAX_PHASE_PER_SIDE};

    #[test]
    fn starting_position_is_zero_phase() {
        let board = Board::starting_position();
        assert_eq!(phase_for_color(&board, Color::White), 0);
        assert_eq!(phase_for_color(&board, Color::Black), 0);
        assert_eq!(game_phase(&board), 0);
    }

    #[test]
    fn bare_kings_is_max_phase() {
        let board = "8/8/4k3/8/8/4K3/8/8 w - - 0 1".parse::<Board>().unwrap();
        assert_eq!(phase_for_color(&board, Color::White), MAX_PHASE_PER_SIDE);
        assert_eq!(phase_for_color(&board, Color::Black), MAX_PHASE_PER_SIDE);
        assert_eq!(game_phase(&board), MAX_PHASE);
    }

    #[test]
    fn missing_one_queen_raises_that_sides_phase() {
        // Starting position minus White's queen.
        let board = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNB1KBNR w KQkq - 0 1"
            .parse::<Board>()
            .unwrap();
        assert!(phase_for_color(&board, Color::White) > 0);
        assert_eq!(phase_for_color(&board, Color::Black), 0);
        assert_eq!(game_phase(&board), phase_for_color(&board, Color::White));
    }
}
