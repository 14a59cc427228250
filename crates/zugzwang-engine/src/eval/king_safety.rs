//! King safety evaluation based on pawn shield coverage.
//!
//! V1 evaluates only the pawn shield directly in front of the king.
//! Each missing pawn in the shield incurs a middlegame-only penalty.

use zugzwang_core::{Bitboard, Board, Color, PieceKind, Square};

use crate::eval::score::{Score, S};

/// Penalty for each missing pawn in the king's shield (middlegame only).
const MISSING_SHIELD_PAWN_PENALTY: Score = S(-30, 0);

/// Compute the pawn shield mask for a king on the given square.
///
/// The shield consists of the 2-3 squares directly in front of the king
/// (one rank forward from the king's perspective). For kings on edge files,
/// this is 2 squares; otherwise 3.
///
/// For White, "in front" means one rank higher (shift left by 8 bits).
/// For Black, "in front" means one rank lower (shift right by 8 bits).
fn shield_mask(king_sq: Square, color: Color) -> Bitboard {
    let king_bb = king_sq.bitboard();

    let shifted = match color {
        Color::White => king_bb << 8,
        Color::Black => king_bb >> 8,
    };

    if shifted.is_empty() {
        return Bitboard::EMPTY;
    }

    // Expand one file left and right, masking out file-wrap artifacts.
    // Shifting a bitboard by 1 bit moves one file left (toward A) or right (toward H).
    // FILE_A mask prevents a piece on the A file from wrapping to H when shifted right by 1.
    // FILE_H mask prevents a piece on the H file from wrapping to A when shifted left by 1.
    shifted | ((shifted << 1) & !Bitboard::FILE_A) | ((shifted >> 1) & !Bitboard::FILE_H)
}

/// Evaluate king safety (pawn shield) from White's perspective.
///
/// Counts missing friendly pawns in the king's shield for each side.
/// Each missing shield pawn incurs [`MISSING_SHIELD_PAWN_PENALTY`].
///
/// Returns a positive score when Black has the weaker shield, and a negative
/// score when White has the weaker shield.
pub fn evaluate_king_safety(board: &Board) -> Score {
    let mut white_penalty = Score::ZERO;
    let mut black_penalty = Score::ZERO;

    let pawns = board.pieces(PieceKind::Pawn);

    for color in Color::ALL {
        let king_sq = board.king_square(color);
        let shield = shield_mask(king_sq, color);
        let friendly_pawns = pawns & board.side(color);
        let shield_pawns = shield & friendly_pawns;
        let missing = shield.count() - shield_pawns.count();
        let penalty = MISSING_SHIELD_PAWN_PENALTY * missing as i16;

        match color {
            Color::White => white_penalty = penalty,
            Color::Black => black_penalty = penalty,
        }
    }

    white_penalty - black_penalty
}
