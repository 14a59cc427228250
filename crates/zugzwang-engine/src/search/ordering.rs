//! Move ordering: assigns each pseudo-legal move a sort key combining the hash
//! move, promotions, SEE-checked captures, killers, counter-moves, and
//! history (butterfly + continuation) for quiet moves.

use zugzwang_core::{Board, Color, Move, MoveKind, MoveList, PieceKind, PromotionPiece};

use crate::search::heuristics::{
    ContHistIndex, ContinuationHistory, CounterMoveTable, HistoryTable, KillerTable, StackEntry,
    cont_history_score,
};
use crate::search::see::{SEE_VALUE, see, see_value};

const SCORE_TT_MOVE: i32 = 9_000_000;
const SCORE_QUEEN_PROMO_CAPTURE: i32 = 1_500_000;
const SCORE_KNIGHT_PROMO_CAPTURE: i32 = 1_400_000;
const SCORE_GOOD_CAPTURE: i32 = 1_200_000;
const SCORE_QUEEN_PROMO: i32 = 1_100_000;
const SCORE_KNIGHT_PROMO: i32 = 1_000_000;
const SCORE_KILLER_0: i32 = 900_000;
const SCORE_KILLER_1: i32 = 800_000;
const SCORE_COUNTER: i32 = 700_000;
const SCORE_BAD_CAPTURE: i32 = -900_000;
const SCORE_UNDERPROMOTION: i32 = -1_500_000;

/// SEE threshold a capture must clear to be ordered with the "good captures" tier.
const GOOD_CAPTURE_SEE_THRESHOLD: i32 = -98;

/// Context a [`MoveScorer`] needs beyond the board and the move list itself.
pub struct OrderingContext<'a> {
    pub tt_move: Move,
    pub killers: &'a KillerTable,
    pub counters: &'a CounterMoveTable,
    pub history: &'a HistoryTable,
    pub cont1: &'a ContinuationHistory,
    pub cont2: &'a ContinuationHistory,
    pub stack: &'a [StackEntry],
    pub ply: usize,
}

/// Victim piece-kind index for a capture, with en-passant treated as a pawn capture.
fn victim_index(board: &Board, mv: Move) -> Option<usize> {
    if mv.kind() == MoveKind::EnPassant {
        Some(PieceKind::Pawn.index())
    } else {
        board.piece_on(mv.dest()).map(|p| p.index())
    }
}

/// Assign a move its sort score per the tier table. Higher scores are
/// searched first.
pub fn score_move(board: &Board, mv: Move, ctx: &OrderingContext<'_>) -> i32 {
    if mv == ctx.tt_move {
        return SCORE_TT_MOVE;
    }

    if mv.is_promotion() {
        let is_capture = board.piece_on(mv.dest()).is_some();
        return match (mv.promotion_piece(), is_capture) {
            (PromotionPiece::Queen, true) => SCORE_QUEEN_PROMO_CAPTURE,
            (PromotionPiece::Knight, true) => SCORE_KNIGHT_PROMO_CAPTURE,
            (PromotionPiece::Queen, false) => SCORE_QUEEN_PROMO,
            (PromotionPiece::Knight, false) => SCORE_KNIGHT_PROMO,
            (PromotionPiece::Rook, _) | (PromotionPiece::Bishop, _) => SCORE_UNDERPROMOTION,
        };
    }

    if let Some(victim_idx) = victim_index(board, mv) {
        let attacker_idx = board.piece_on(mv.source()).map_or(0, |p| p.index());
        let mvv_lva = 10 * SEE_VALUE[victim_idx] - SEE_VALUE[attacker_idx];
        return if see(board, mv, GOOD_CAPTURE_SEE_THRESHOLD) {
            SCORE_GOOD_CAPTURE + mvv_lva
        } else {
            SCORE_BAD_CAPTURE + mvv_lva
        };
    }

    if ctx.killers.is_killer(ctx.ply, mv) {
        let killers = ctx.killers.killers(ctx.ply);
        return if mv == killers[0] { SCORE_KILLER_0 } else { SCORE_KILLER_1 };
    }

    let side = board.side_to_move();
    if let Some(prev) = ctx.stack.get(ctx.ply.wrapping_sub(1)).and_then(|s| s.cont_hist_index) {
        if ctx.counters.get(prev.piece, prev.to) == mv {
            return SCORE_COUNTER;
        }
    }

    let from = mv.source();
    let to = mv.dest();
    let moved_piece = board.piece_on(from).unwrap_or(PieceKind::Pawn);
    let cur = ContHistIndex { piece: moved_piece, to };
    see_value(board, mv, false)
        + ctx.history.score(side, from, to)
        + cont_history_score(ctx.cont1, ctx.cont2, ctx.stack, ctx.ply, cur)
}

fn score_qsearch_move(board: &Board, mv: Move) -> i32 {
    if mv.is_promotion() {
        let is_capture = board.piece_on(mv.dest()).is_some();
        return match (mv.promotion_piece(), is_capture) {
            (PromotionPiece::Queen, true) => SCORE_QUEEN_PROMO_CAPTURE,
            (PromotionPiece::Knight, true) => SCORE_KNIGHT_PROMO_CAPTURE,
            (PromotionPiece::Queen, false) => SCORE_QUEEN_PROMO,
            (PromotionPiece::Knight, false) => SCORE_KNIGHT_PROMO,
            (PromotionPiece::Rook, _) | (PromotionPiece::Bishop, _) => SCORE_UNDERPROMOTION,
        };
    }
    let victim_idx = victim_index(board, mv).unwrap_or(0);
    let attacker_idx = board.piece_on(mv.source()).map_or(0, |p| p.index());
    10 * SEE_VALUE[victim_idx] - SEE_VALUE[attacker_idx]
}

/// Incremental move picker using selection sort: `pick_next` finds the
/// remaining maximum and swaps it into place, so ordering cost is
/// proportional to how many moves are actually searched — the common case
/// of a beta-cutoff after a handful of moves pays for a handful of scans,
/// not a full sort.
pub struct MovePicker {
    moves: [Move; 256],
    scores: [i32; 256],
    len: usize,
    cursor: usize,
    min_score: i32,
}

impl MovePicker {
    /// Create a picker over every move in `moves`, ordered by the full tier table.
    pub fn new(moves: &MoveList, board: &Board, ctx: &OrderingContext<'_>) -> Self {
        let mut picker = Self {
            moves: [Move::NULL; 256],
            scores: [0; 256],
            len: moves.len(),
            cursor: 0,
            min_score: i32::MIN,
        };
        for i in 0..moves.len() {
            picker.moves[i] = moves[i];
            picker.scores[i] = score_move(board, moves[i], ctx);
        }
        picker
    }

    /// Create a picker for quiescence search: captures and promotions only
    /// (`min_score` excludes quiet moves, which always score 0 under
    /// [`score_qsearch_move`]'s MVV-LVA-only formula for non-promotions).
    pub fn new_qsearch(moves: &MoveList, board: &Board) -> Self {
        let mut picker = Self {
            moves: [Move::NULL; 256],
            scores: [0; 256],
            len: moves.len(),
            cursor: 0,
            min_score: 1,
        };
        for i in 0..moves.len() {
            picker.moves[i] = moves[i];
            let is_capture = board.piece_on(moves[i].dest()).is_some()
                || moves[i].kind() == MoveKind::EnPassant
                || moves[i].is_promotion();
            picker.scores[i] = if is_capture { score_qsearch_move(board, moves[i]).max(1) } else { 0 };
        }
        picker
    }

    /// Yield the next highest-scored move, or `None` once the remainder
    /// scores below the picker's minimum (or all moves are exhausted).
    pub fn pick_next(&mut self) -> Option<Move> {
        if self.cursor >= self.len {
            return None;
        }

        let mut best_idx = self.cursor;
        let mut best_score = self.scores[self.cursor];
        for i in (self.cursor + 1)..self.len {
            if self.scores[i] > best_score {
                best_score = self.scores[i];
                best_idx = i;
            }
        }

        if best_score < self.min_score {
            return None;
        }

        self.moves.swap(self.cursor, best_idx);
        self.scores.swap(self.cursor, best_idx);

        let mv = self.moves[self.cursor];
        self.cursor += 1;
        Some(mv)
    }
}

/// Base-2 log-product LMR table, precomputed once at process start (§4.8):
/// `LMR[d][n] = floor(1 + ln(d) * ln(n) * 0.5)`, with `ln(0)` treated as 0 so
/// the unused `d = 0` / `n = 0` rows don't panic on `ln`.
pub struct LmrTable {
    table: Vec<Vec<i32>>,
}

impl LmrTable {
    pub fn new(max_depth: usize, max_moves: usize) -> Self {
        let ln = |x: usize| if x == 0 { 0.0 } else { (x as f64).ln() };
        let table = (0..max_depth)
            .map(|d| {
                (0..max_moves)
                    .map(|n| (1.0 + ln(d) * ln(n) * 0.5).floor() as i32)
                    .collect()
            })
            .collect();
        Self { table }
    }

    #[inline]
    pub fn get(&self, depth: usize, move_idx: usize) -> i32 {
        let d = depth.min(self.table.len() - 1);
        let n = move_idx.min(self.table[d].len() - 1);
        self.table[d][n]
    }
}
