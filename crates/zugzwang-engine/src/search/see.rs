//! Static Exchange Evaluation (SEE).
//!
//! Estimates the material outcome of a sequence of captures on a single
//! square, assuming both sides recapture with their least valuable attacker
//! until one side runs out.

use zugzwang_core::{
    Bitboard, Board, Color, Move, MoveKind, PieceKind, PromotionPiece, Square, bishop_attacks,
    king_attacks, knight_attacks, pawn_attacks, rook_attacks,
};

/// Material values used by SEE and move ordering, indexed by `PieceKind::index()`.
pub const SEE_VALUE: [i32; 6] = [100, 300, 300, 500, 900, 20_000];

/// All pieces attacking `sq` given occupancy `occ` (reveals x-ray attackers
/// as sliders are removed from `occ` by the caller).
fn attackers_of(sq: Square, occ: Bitboard, board: &Board) -> Bitboard {
    let knights = knight_attacks(sq) & board.pieces(PieceKind::Knight);
    let kings = king_attacks(sq) & board.pieces(PieceKind::King);
    let rook_like =
        rook_attacks(sq, occ) & (board.pieces(PieceKind::Rook) | board.pieces(PieceKind::Queen));
    let bishop_like = bishop_attacks(sq, occ)
        & (board.pieces(PieceKind::Bishop) | board.pieces(PieceKind::Queen));
    let white_pawns =
        pawn_attacks(Color::Black, sq) & board.pieces(PieceKind::Pawn) & board.side(Color::White);
    let black_pawns =
        pawn_attacks(Color::White, sq) & board.pieces(PieceKind::Pawn) & board.side(Color::Black);

    knights | kings | rook_like | bishop_like | white_pawns | black_pawns
}

/// The least valuable attacker in `attackers` belonging to `side`, scanning
/// piece types pawn through king.
fn least_valuable_attacker(
    attackers: Bitboard,
    side: Bitboard,
    board: &Board,
) -> Option<(Square, PieceKind)> {
    for kind in PieceKind::ALL {
        let candidates = attackers & side & board.pieces(kind);
        if let Some(sq) = candidates.lsb() {
            return Some((sq, kind));
        }
    }
    None
}

/// The square of the pawn captured by an en-passant move landing on `dst`.
fn en_passant_victim_square(mover: Color, dst: Square) -> Square {
    let idx = if mover == Color::White { dst.index() - 8 } else { dst.index() + 8 };
    Square::from_index(idx as u8).expect("en passant destination always has a valid victim square")
}

fn remove_x_ray_attackers(
    attackers: Bitboard,
    dst: Square,
    occ: Bitboard,
    kind: PieceKind,
    board: &Board,
) -> Bitboard {
    let mut attackers = attackers;
    if matches!(kind, PieceKind::Pawn | PieceKind::Bishop | PieceKind::Queen) {
        attackers |=
            bishop_attacks(dst, occ) & (board.pieces(PieceKind::Bishop) | board.pieces(PieceKind::Queen));
    }
    if matches!(kind, PieceKind::Rook | PieceKind::Queen) {
        attackers |=
            rook_attacks(dst, occ) & (board.pieces(PieceKind::Rook) | board.pieces(PieceKind::Queen));
    }
    attackers & occ
}

/// Returns `true` iff the swap-off value of `mv` is at least `threshold`.
///
/// Promotions are a conservative shortcut: always `true` (the move scorer
/// ranks them separately). Otherwise this plays out the full capture
/// sequence on `mv`'s destination square with early exit as soon as the
/// outcome is determined, so the common "clearly winning" and "clearly
/// losing" cases cost O(1) rather than a full exchange simulation.
pub fn see(board: &Board, mv: Move, threshold: i32) -> bool {
    if mv.is_promotion() {
        return true;
    }

    let src = mv.source();
    let dst = mv.dest();

    let victim_value = if mv.kind() == MoveKind::EnPassant {
        SEE_VALUE[PieceKind::Pawn.index()]
    } else {
        board.piece_on(dst).map_or(0, |p| SEE_VALUE[p.index()])
    };

    let mut value = victim_value - threshold;
    if value < 0 {
        return false;
    }

    let attacker = board.piece_on(src).unwrap_or(PieceKind::Pawn);
    value -= SEE_VALUE[attacker.index()];
    if value >= 0 {
        return true;
    }

    let mover = board.side_to_move();
    let mut occupied = board.occupied().without(src).without(dst);
    if mv.kind() == MoveKind::EnPassant {
        occupied = occupied.without(en_passant_victim_square(mover, dst));
    }

    let mut side = !mover;
    let mut attackers = attackers_of(dst, occupied, board) & occupied;

    loop {
        let side_attackers = attackers & board.side(side);
        let Some((sq, kind)) = least_valuable_attacker(side_attackers, board.side(side), board)
        else {
            // `side` has no attacker left; the other side keeps the square.
            break;
        };

        side = !side;
        value = -value - 1 - SEE_VALUE[kind.index()];

        if value >= 0 {
            if kind == PieceKind::King {
                let remaining_occ = occupied.without(sq);
                let defenders = attackers_of(dst, remaining_occ, board) & remaining_occ & board.side(side);
                if defenders.is_nonempty() {
                    // The king would be recapturing into check: illegal, undo the flip.
                    side = !side;
                }
            }
            break;
        }

        occupied = occupied.without(sq);
        attackers = remove_x_ray_attackers(attackers, dst, occupied, kind, board);
    }

    side != mover
}

/// Computes the actual swap value of `mv` via a 32-deep gain stack.
///
/// Handles en-passant (the captured pawn sits behind the destination square)
/// and promotions (the moving piece's value and the first gain are bumped by
/// `queen - pawn`, re-applied whenever a pawn recaptures onto the back rank).
/// `prune_positive`, when set, stops the simulation as soon as the running
/// gain for the side to move is already non-negative — a cheap early exit
/// usable when the caller only needs to know the sign.
pub fn see_value(board: &Board, mv: Move, prune_positive: bool) -> i32 {
    let src = mv.source();
    let dst = mv.dest();
    let mover = board.side_to_move();

    let attacker_kind = board.piece_on(src).unwrap_or(PieceKind::Pawn);
    let mut occupied = board.occupied().without(src);

    let mut gain = [0i32; 32];
    let mut depth = 0usize;

    gain[0] = if mv.kind() == MoveKind::EnPassant {
        let victim_sq = en_passant_victim_square(mover, dst);
        occupied = occupied.without(victim_sq);
        SEE_VALUE[PieceKind::Pawn.index()]
    } else {
        board.piece_on(dst).map_or(0, |p| SEE_VALUE[p.index()])
    };

    let promo_bonus = SEE_VALUE[PieceKind::Queen.index()] - SEE_VALUE[PieceKind::Pawn.index()];
    let mut next_victim_value = SEE_VALUE[attacker_kind.index()];
    if mv.kind() == MoveKind::Promotion {
        let promo_kind = match mv.promotion_piece() {
            PromotionPiece::Knight => PieceKind::Knight,
            PromotionPiece::Bishop => PieceKind::Bishop,
            PromotionPiece::Rook => PieceKind::Rook,
            PromotionPiece::Queen => PieceKind::Queen,
        };
        next_victim_value = SEE_VALUE[promo_kind.index()];
        gain[0] += promo_bonus;
    }

    let mut side = !mover;
    let mut attackers = attackers_of(dst, occupied, board) & occupied;

    while depth < 31 {
        let side_attackers = attackers & board.side(side);
        let Some((sq, kind)) = least_valuable_attacker(side_attackers, board.side(side), board)
        else {
            break;
        };

        depth += 1;
        gain[depth] = next_victim_value - gain[depth - 1];

        // A pawn recapturing onto the back rank promotes too.
        if kind == PieceKind::Pawn && (dst.rank().index() == 0 || dst.rank().index() == 7) {
            gain[depth] += promo_bonus;
            next_victim_value = SEE_VALUE[PieceKind::Queen.index()];
        } else {
            next_victim_value = SEE_VALUE[kind.index()];
        }

        if prune_positive && gain[depth - 1].max(-gain[depth]) >= 0 {
            break;
        }

        occupied = occupied.without(sq);
        attackers = remove_x_ray_attackers(attackers, dst, occupied, kind, board);
        side = !side;
    }

    while depth > 0 {
        depth -= 1;
        gain[depth] = -((-gain[depth]).max(gain[depth + 1]));
    }

    gain[0]
}

#[cfg(test)]
mod tests {
    use super::*;
    use zugzwang_core::{Board, generate_legal_moves};

    fn find_move(board: &Board, from: &str, to: &str) -> Move {
        let moves = generate_legal_moves(board);
        let from_sq = Square::from_algebraic(from).unwrap();
        let to_sq = Square::from_algebraic(to).unwrap();
        moves
            .as_slice()
            .iter()
            .find(|m| m.source() == from_sq && m.dest() == to_sq && !m.is_promotion())
            .copied()
            .unwrap_or_else(|| {
                moves
                    .as_slice()
                    .iter()
                    .find(|m| m.source() == from_sq && m.dest() == to_sq)
                    .copied()
                    .expect("move not found")
            })
    }

    #[test]
    fn undefended_pawn_capture_wins_a_pawn() {
        let board: Board = "4k3/8/8/4p3/3P4/8/8/4K3 w - - 0 1".parse().unwrap();
        let mv = find_move(&board, "d4", "e5");
        assert!(see(&board, mv, 0));
        assert_eq!(see_value(&board, mv, false), 100);
    }

    #[test]
    fn pawn_capture_defended_by_pawn_loses_the_attacker() {
        // e5 pawn is defended by the f6 pawn (f6 attacks e5 for black).
        let board: Board = "4k3/5p2/8/4p3/3P4/8/8/4K3 w - - 0 1".parse().unwrap();
        let mv = find_move(&board, "d4", "e5");
        // PxP (100) then pxP (100) => net 0: not strictly winning.
        assert!(!see(&board, mv, 1));
        assert_eq!(see_value(&board, mv, false), 0);
    }

    #[test]
    fn queen_takes_defended_pawn_loses_material() {
        let board: Board = "4k3/8/3p4/2p5/8/4Q3/8/4K3 w - - 0 1".parse().unwrap();
        let mv = find_move(&board, "e3", "c5");
        assert!(!see(&board, mv, 0));
        assert!(see_value(&board, mv, false) < 0);
    }

    #[test]
    fn equal_trade_undefended_wins_material() {
        let board: Board = "4k3/8/8/3n4/8/4N3/8/4K3 w - - 0 1".parse().unwrap();
        let mv = find_move(&board, "e3", "d5");
        assert_eq!(see_value(&board, mv, false), 300);
        assert!(see(&board, mv, 300));
        assert!(!see(&board, mv, 301));
    }

    #[test]
    fn promotion_is_always_accepted() {
        let board: Board = "7k/4P3/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
        let moves = generate_legal_moves(&board);
        let promo = moves.as_slice().iter().find(|m| m.is_promotion()).copied().unwrap();
        assert!(see(&board, promo, 10_000));
    }
}
