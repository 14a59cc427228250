//! Negamax alpha-beta search with quiescence, PVS, LMR, and pruning.

use zugzwang_core::{Board, Move, MoveKind, PieceKind, generate_legal_moves};

use crate::evaluate;
use crate::search::control::SearchControl;
use crate::search::heuristics::{
    ContHistIndex, ContinuationHistory, CounterMoveTable, HistoryTable, KillerTable, StackEntry,
    update_cont_history,
};
use crate::search::ordering::{LmrTable, MovePicker, OrderingContext};
use crate::search::see::see;
use crate::search::tt::{Bound, TranspositionTable};

/// Score representing an unreachable upper/lower bound.
pub const INF: i32 = 30_000;

/// Base score for checkmate (adjusted by ply for mate distance).
pub const MATE_SCORE: i32 = 29_000;

/// Scores above this threshold indicate a forced mate.
pub const MATE_THRESHOLD: i32 = 28_000;

/// Maximum search depth (in plies) for array sizing and recursion limits.
pub const MAX_PLY: usize = 128;

/// Below this score, the side to move is mated within `MAX_PLY` — too close
/// to a forced loss for the quiet-move pruning heuristics to trust.
const MATED_IN_MAX_PLY: i32 = -MATE_SCORE + MAX_PLY as i32;

/// Late-move-pruning quiet-move-count thresholds, indexed `[improving][min(depth, 10)]`.
const LMP_TABLE: [[usize; 11]; 2] = [
    [0, 2, 3, 5, 9, 13, 18, 25, 34, 45, 55],
    [0, 5, 6, 9, 14, 21, 30, 41, 55, 69, 84],
];

/// Minimum depth for singular extension probing.
const SE_DEPTH: u8 = 8;

/// Double-extension threshold (`singular_score < singular_beta − SE_DOUBLE_MARGIN`).
const SE_DOUBLE_MARGIN: i32 = 23;

/// Cap on cumulative double extensions allowed per search path.
const MAX_DOUBLE_EXTENSIONS: u8 = 16;

/// Parameters passed to each negamax call beyond alpha/beta.
#[derive(Clone, Copy)]
pub(super) struct NodeParams {
    pub depth: u8,
    pub ply: u8,
    pub do_null: bool,
    pub excluded: Move,
    pub cutnode: bool,
    pub double_extensions: u8,
}

fn is_in_check(board: &Board) -> bool {
    let king_sq = board.king_square(board.side_to_move());
    board.is_square_attacked(king_sq, !board.side_to_move())
}

fn is_tactical_move(board: &Board, mv: Move) -> bool {
    board.piece_on(mv.dest()).is_some()
        || mv.kind() == MoveKind::EnPassant
        || mv.kind() == MoveKind::Promotion
}

/// Check if the side to move has any non-pawn, non-king material (guards
/// null-move pruning against zugzwang-prone king-and-pawn endings).
fn has_non_pawn_material(board: &Board) -> bool {
    let us = board.side_to_move();
    let our_pieces = board.side(us);
    (board.pieces(PieceKind::Knight) & our_pieces).is_nonempty()
        || (board.pieces(PieceKind::Bishop) & our_pieces).is_nonempty()
        || (board.pieces(PieceKind::Rook) & our_pieces).is_nonempty()
        || (board.pieces(PieceKind::Queen) & our_pieces).is_nonempty()
}

/// A near-zero, node-parity-dependent score used for draws, so that
/// repeated positions along a line don't all collapse to the identical
/// value and create PV cycles.
#[inline]
fn draw_score(nodes: u64) -> i32 {
    1 - (nodes & 2) as i32
}

/// Negamax alpha-beta search with PVS, LMR, and pruning.
///
/// Returns the best score for the side to move. The principal variation is
/// collected into `ctx.pv`.
pub(super) fn negamax(
    board: &Board,
    mut alpha: i32,
    beta: i32,
    params: NodeParams,
    ctx: &mut SearchContext<'_>,
) -> i32 {
    let NodeParams { mut depth, ply, do_null, excluded, cutnode, double_extensions } = params;
    let is_pv = alpha + 1 < beta;
    let is_root = ply == 0;

    let in_check = is_in_check(board);

    // Node entry: drop to quiescence at the horizon, unless in check (forced
    // one-ply check extension at the leaf rather than quiescence).
    if depth == 0 {
        if in_check {
            depth = 1;
        } else {
            return qsearch(board, ply, alpha, beta, ctx);
        }
    }

    ctx.pv.clear_ply(ply as usize);
    ctx.nodes += 1;

    if ctx.control.should_stop(ctx.nodes) {
        return 0;
    }

    if !is_root {
        if board.is_draw() || is_repetition(board, ctx) {
            return draw_score(ctx.nodes);
        }
        if ply as usize >= MAX_PLY {
            return if in_check { 0 } else { evaluate(board) };
        }
    }

    // Mate distance pruning.
    if !is_root {
        alpha = alpha.max(-MATE_SCORE + ply as i32);
        let new_beta = beta.min(MATE_SCORE - ply as i32 + 1);
        if alpha >= new_beta {
            return alpha;
        }
    }

    // TT probe — skipped during a singular-extension search.
    let mut tt_move = Move::NULL;
    let mut tt_score = 0i32;
    let mut tt_depth: u8 = 0;
    let mut tt_bound = Bound::None;
    let mut tt_is_pv = is_pv;
    let mut have_tt_entry = false;

    if excluded.is_null() {
        if let Some(entry) = ctx.tt.probe(board.hash(), ply) {
            have_tt_entry = true;
            tt_move = entry.best_move;
            tt_score = entry.score;
            tt_depth = entry.depth;
            tt_bound = entry.bound;
            tt_is_pv = tt_is_pv || entry.is_pv;

            if (!is_pv || depth == 0) && tt_depth >= depth && (cutnode || tt_score <= alpha) {
                let bound_consistent = match tt_bound {
                    Bound::Exact => true,
                    Bound::LowerBound => tt_score >= beta,
                    Bound::UpperBound => tt_score <= alpha,
                    Bound::None => false,
                };
                if bound_consistent {
                    if tt_score >= beta
                        && !tt_move.is_null()
                        && board.piece_on(tt_move.dest()).is_none()
                        && tt_move.kind() == MoveKind::Normal
                    {
                        let bonus = (depth as i32) * (depth as i32) * 16;
                        let side = board.side_to_move();
                        ctx.history_table.update(side, tt_move.source(), tt_move.dest(), bonus);
                    }
                    return tt_score;
                }
            }

            if !is_pv
                && tt_depth + 1 >= depth
                && tt_bound == Bound::UpperBound
                && tt_score + 140 <= alpha
                && (cutnode || tt_score <= alpha)
            {
                return alpha;
            }
        }
    }

    // IIR — internal iterative reduction.
    if !is_root && depth >= 4 && !have_tt_entry {
        depth -= 1;
    }

    // Static eval, adopted from a tighter TT bound when available.
    let raw_eval = evaluate(board);
    let static_eval = if in_check {
        raw_eval
    } else if have_tt_entry
        && ((tt_bound == Bound::LowerBound && tt_score > raw_eval)
            || (tt_bound == Bound::UpperBound && tt_score < raw_eval)
            || tt_bound == Bound::Exact)
    {
        tt_score
    } else {
        raw_eval
    };

    ctx.stack[ply as usize].static_eval = static_eval;
    let mut best_score = static_eval;

    let improving = ply >= 2 && !in_check && static_eval > ctx.stack[ply as usize - 2].static_eval;

    // Whole-node pruning — only outside check and outside PV.
    if !is_pv && !in_check && excluded.is_null() {
        // Razoring.
        if depth <= 2 && static_eval + 150 + 75 * improving as i32 <= alpha {
            let razor_score = qsearch(board, ply, alpha, beta, ctx);
            if razor_score <= alpha {
                return razor_score;
            }
        }

        // Reverse futility / static null-move pruning.
        if depth <= 8 && best_score - 85 * (depth as i32 - improving as i32) >= beta {
            return best_score;
        }

        // Null-move pruning.
        let prev_was_null = ply >= 1 && ctx.stack[ply as usize - 1].current_move.is_null();
        let tt_refutes = have_tt_entry && tt_bound == Bound::UpperBound && tt_score < beta;
        if do_null
            && !prev_was_null
            && depth >= 2
            && best_score >= beta
            && has_non_pawn_material(board)
            && !tt_refutes
        {
            let parent_tactical = ply >= 1 && ctx.stack[ply as usize - 1].was_tactical;
            let r = 4
                + depth as i32 / 5
                + ((best_score - beta) / 191).min(3)
                + parent_tactical as i32;
            let reduced = (depth as i32 - r).max(0) as u8;

            let null_board = board.make_null_move();
            ctx.history.push(board.hash());
            ctx.stack[ply as usize].current_move = Move::NULL;
            ctx.stack[ply as usize].cont_hist_index = None;
            ctx.stack[ply as usize].was_tactical = false;

            let null_score = -negamax(
                &null_board,
                -beta,
                -beta + 1,
                NodeParams {
                    depth: reduced,
                    ply: ply + 1,
                    do_null: false,
                    excluded: Move::NULL,
                    cutnode: !cutnode,
                    double_extensions,
                },
                ctx,
            );
            ctx.history.pop();

            if null_score >= beta {
                return if null_score > MATE_THRESHOLD { beta } else { null_score };
            }
        }
    }

    let moves = generate_legal_moves(board);
    if moves.is_empty() {
        return if in_check { -(MATE_SCORE - ply as i32) } else { 0 };
    }

    let original_alpha = alpha;
    let mut best_move = Move::NULL;
    best_score = -INF;

    ctx.killers.clear(ply as usize + 1);

    let ordering_ctx = OrderingContext {
        tt_move,
        killers: &ctx.killers,
        counters: &ctx.counters,
        history: &ctx.history_table,
        cont1: &ctx.cont1,
        cont2: &ctx.cont2,
        stack: &ctx.stack,
        ply: ply as usize,
    };
    let mut picker = MovePicker::new(&moves, board, &ordering_ctx);

    let mut searched_quiets = [Move::NULL; 64];
    let mut quiet_count: usize = 0;
    let mut move_count: usize = 0;
    let mut skip_quiets = false;

    while let Some(mv) = picker.pick_next() {
        if mv == excluded {
            continue;
        }

        let is_tactical = is_tactical_move(board, mv);
        let is_quiet_move = !is_tactical;
        let moved_piece = board.piece_on(mv.source()).unwrap_or(PieceKind::Pawn);
        let side = board.side_to_move();
        let sc_hist = ctx.history_table.score(side, mv.source(), mv.dest());

        if !is_root && is_quiet_move && best_score > MATED_IN_MAX_PLY {
            if skip_quiets {
                continue;
            }

            let hist_depth_cap = if improving { 2 } else { 3 };
            if depth <= hist_depth_cap {
                let threshold = if improving { -2000 } else { -1000 } * depth as i32;
                if sc_hist < threshold {
                    continue;
                }
            }

            if depth <= 8 && static_eval + 90 * depth as i32 <= alpha {
                let hist_cap = if improving { -1000 } else { -500 };
                if sc_hist < hist_cap {
                    skip_quiets = true;
                    continue;
                }
            }

            if depth <= 8 {
                let idx = (depth as usize).min(10);
                if quiet_count >= LMP_TABLE[improving as usize][idx] {
                    skip_quiets = true;
                    continue;
                }
            }
        }

        if is_quiet_move && quiet_count < 64 {
            searched_quiets[quiet_count] = mv;
            quiet_count += 1;
        }

        let cur = ContHistIndex { piece: moved_piece, to: mv.dest() };

        let child = board.make_move(mv);
        move_count += 1;
        ctx.history.push(board.hash());

        let gives_check = is_in_check(&child);

        // Singular extension — TT move only. Runs a reduced-depth search at
        // this same ply with `mv` excluded, so it shares (and may clobber)
        // `ctx.stack[ply]`; the real move's stack entry is written below,
        // after this sub-search has returned.
        let mut extension: i32 = 0;
        if mv == tt_move
            && !is_root
            && depth >= SE_DEPTH
            && tt_depth >= depth.saturating_sub(3)
            && tt_bound != Bound::UpperBound
            && excluded.is_null()
        {
            let singular_beta = tt_score - 2 * depth as i32;
            let singular_score = negamax(
                board,
                singular_beta - 1,
                singular_beta,
                NodeParams {
                    depth: (depth - 1) / 2,
                    ply,
                    do_null: false,
                    excluded: mv,
                    cutnode,
                    double_extensions,
                },
                ctx,
            );

            if singular_score < singular_beta {
                extension = 1;
                if singular_score < singular_beta - SE_DOUBLE_MARGIN
                    && double_extensions < MAX_DOUBLE_EXTENSIONS
                {
                    extension = 2;
                }
            } else if singular_score >= beta {
                ctx.history.pop();
                return singular_score;
            } else if tt_score >= beta {
                extension = -3;
            } else if cutnode {
                extension = -2;
            }
        }

        if gives_check {
            extension += 1;
        }

        let new_depth = ((depth as i32 - 1) + extension).max(0) as u8;
        let child_double_ext = double_extensions + (extension == 2) as u8;

        ctx.stack[ply as usize].current_move = mv;
        ctx.stack[ply as usize].moved_piece = moved_piece;
        ctx.stack[ply as usize].cont_hist_index = Some(cur);
        ctx.stack[ply as usize].was_tactical = is_tactical;

        let score;
        if move_count == 1 {
            score = -negamax(
                &child,
                -beta,
                -alpha,
                NodeParams {
                    depth: new_depth,
                    ply: ply + 1,
                    do_null: true,
                    excluded: Move::NULL,
                    cutnode: false,
                    double_extensions: child_double_ext,
                },
                ctx,
            );
        } else {
            let do_lmr = move_count > 1 && depth > 2 && is_quiet_move;
            let mut searched_depth = new_depth;

            if do_lmr {
                let mut r = ctx.lmr.get(depth as usize, move_count);
                if !improving {
                    r += 1;
                }
                if is_pv {
                    r -= 1;
                }
                if ctx.killers.is_killer(ply as usize, mv) {
                    r -= 1;
                }
                r -= (sc_hist / 7000).clamp(-2, 2);
                let max_r = (new_depth as i32 - 1).max(1);
                r = r.clamp(1, max_r);
                searched_depth = new_depth.saturating_sub(r as u8);
            }

            let mut sc = -negamax(
                &child,
                -alpha - 1,
                -alpha,
                NodeParams {
                    depth: searched_depth,
                    ply: ply + 1,
                    do_null: true,
                    excluded: Move::NULL,
                    cutnode: !cutnode,
                    double_extensions: child_double_ext,
                },
                ctx,
            );

            if do_lmr && sc > alpha && searched_depth < new_depth {
                sc = -negamax(
                    &child,
                    -alpha - 1,
                    -alpha,
                    NodeParams {
                        depth: new_depth,
                        ply: ply + 1,
                        do_null: true,
                        excluded: Move::NULL,
                        cutnode: !cutnode,
                        double_extensions: child_double_ext,
                    },
                    ctx,
                );
            }

            if sc > alpha && is_pv {
                sc = -negamax(
                    &child,
                    -beta,
                    -alpha,
                    NodeParams {
                        depth: new_depth,
                        ply: ply + 1,
                        do_null: true,
                        excluded: Move::NULL,
                        cutnode: false,
                        double_extensions: child_double_ext,
                    },
                    ctx,
                );
            }

            score = sc;
        }

        ctx.history.pop();

        if ctx.control.should_stop(ctx.nodes) {
            return 0;
        }

        if score > best_score {
            best_score = score;
            best_move = mv;
            if score > alpha {
                alpha = score;
                ctx.pv.update(ply as usize, mv);
            }
        }

        if alpha >= beta {
            if is_quiet_move {
                ctx.killers.store(ply as usize, mv);
                let bonus = (16 * (depth as i32) * (depth as i32)).min(super::heuristics::MAX_HISTORY);

                ctx.history_table.update(side, mv.source(), mv.dest(), bonus);
                update_cont_history(&mut ctx.cont1, &mut ctx.cont2, &ctx.stack, ply as usize, cur, bonus);

                if ply >= 1 {
                    if let Some(prev) = ctx.stack[ply as usize - 1].cont_hist_index {
                        ctx.counters.set(prev.piece, prev.to, mv);
                    }
                }

                let malus_count = if is_quiet_move { quiet_count.saturating_sub(1) } else { quiet_count };
                for i in 0..malus_count {
                    let bad_mv = searched_quiets[i];
                    let bad_piece = board.piece_on(bad_mv.source()).unwrap_or(PieceKind::Pawn);
                    ctx.history_table.update(side, bad_mv.source(), bad_mv.dest(), -bonus);
                    let bad_cur = ContHistIndex { piece: bad_piece, to: bad_mv.dest() };
                    update_cont_history(
                        &mut ctx.cont1,
                        &mut ctx.cont2,
                        &ctx.stack,
                        ply as usize,
                        bad_cur,
                        -bonus,
                    );
                }
            }
            break;
        }
    }

    if excluded.is_null() {
        let bound = if best_score >= beta {
            Bound::LowerBound
        } else if alpha > original_alpha {
            Bound::Exact
        } else {
            Bound::UpperBound
        };

        let store_move = if best_move.is_null() { tt_move } else { best_move };
        ctx.tt.store(
            board.hash(),
            depth,
            best_score,
            raw_eval,
            store_move,
            bound,
            ply,
            is_pv || tt_is_pv,
        );
    }

    best_score
}

/// Twofold-repetition check against positions visited earlier in this search
/// or carried over from the game history, bounded by the halfmove clock.
fn is_repetition(board: &Board, ctx: &SearchContext<'_>) -> bool {
    let hash = board.hash();
    let hmc = board.halfmove_clock() as usize;
    let len = ctx.history.len();
    let lookback = hmc.min(len);
    ctx.history[len.saturating_sub(lookback)..len].iter().any(|&h| h == hash)
}

/// Aspiration window search — wraps [`negamax`] with a narrow window that
/// widens on fail-high/fail-low.
///
/// At depth ≥ 7, starts with `delta = 25` centred on `prev_score`; shallower
/// iterations (or near-mate scores) use a full window on the first try.
pub(super) fn aspiration_search(
    board: &Board,
    depth: u8,
    prev_score: i32,
    ctx: &mut SearchContext<'_>,
) -> i32 {
    let mut search_depth = depth;
    let mut delta: i32 = if depth >= 7 && prev_score.abs() < MATE_THRESHOLD { 25 } else { INF };
    let mut alpha = (prev_score - delta).max(-INF);
    let mut beta = (prev_score + delta).min(INF);

    loop {
        let base_params = NodeParams {
            depth: search_depth,
            ply: 0,
            do_null: true,
            excluded: Move::NULL,
            cutnode: false,
            double_extensions: 0,
        };
        let score = negamax(board, alpha, beta, base_params, ctx);

        if ctx.control.should_stop(ctx.nodes) {
            return score;
        }

        if score <= alpha {
            beta = (alpha + beta) / 2;
            alpha = (alpha - delta).max(-INF);
            search_depth = depth;
        } else if score >= beta {
            beta = (beta + delta).min(INF);
            search_depth = search_depth.saturating_sub(1).max(1);
        } else {
            return score;
        }

        delta = (delta * 2).min(INF);
    }
}

/// Quiescence search — resolve tactical sequences before returning a static score.
///
/// Only considers captures and promotions (via [`MovePicker::new_qsearch`])
/// to avoid the horizon effect.
fn qsearch(board: &Board, ply: u8, mut alpha: i32, mut beta: i32, ctx: &mut SearchContext<'_>) -> i32 {
    // Mate distance pruning, mirroring negamax's: a mate found shallower than
    // the current ply can't be beaten or missed by tightening the window.
    alpha = alpha.max(-MATE_SCORE + ply as i32);
    beta = beta.min(MATE_SCORE - ply as i32 + 1);
    if alpha >= beta {
        return alpha;
    }

    ctx.nodes += 1;

    if ctx.control.should_stop(ctx.nodes) {
        return 0;
    }

    if ply as usize >= MAX_PLY {
        return evaluate(board);
    }

    if board.is_draw() || is_repetition(board, ctx) {
        return draw_score(ctx.nodes);
    }

    let in_check = is_in_check(board);
    let tt_hash = board.hash();
    if let Some(entry) = ctx.tt.probe(tt_hash, ply) {
        let cutoff = match entry.bound {
            Bound::Exact => true,
            Bound::LowerBound => entry.score >= beta,
            Bound::UpperBound => entry.score <= alpha,
            Bound::None => false,
        };
        if cutoff {
            return entry.score;
        }
    }

    let original_alpha = alpha;
    let mut best_score;
    if in_check {
        best_score = -(MATE_SCORE - ply as i32);
    } else {
        best_score = evaluate(board);
        if best_score >= beta {
            return best_score;
        }
        if best_score > alpha {
            alpha = best_score;
        }
    }

    let moves = generate_legal_moves(board);
    if in_check && moves.is_empty() {
        return -(MATE_SCORE - ply as i32);
    }

    let mut best_move = Move::NULL;
    let mut picker = if in_check {
        MovePicker::new(
            &moves,
            board,
            &OrderingContext {
                tt_move: Move::NULL,
                killers: &ctx.killers,
                counters: &ctx.counters,
                history: &ctx.history_table,
                cont1: &ctx.cont1,
                cont2: &ctx.cont2,
                stack: &ctx.stack,
                ply: ply as usize,
            },
        )
    } else {
        MovePicker::new_qsearch(&moves, board)
    };

    while let Some(mv) = picker.pick_next() {
        if !in_check && mv.kind() != MoveKind::Promotion && !see(board, mv, 1) {
            continue;
        }

        let child = board.make_move(mv);
        let score = -qsearch(&child, ply + 1, -beta, -alpha, ctx);

        if score > best_score {
            best_score = score;
            best_move = mv;
            if score > alpha {
                alpha = score;
                ctx.pv.update(ply as usize, mv);
            }
        }

        if alpha >= beta {
            break;
        }
    }

    let bound = if best_score >= beta {
        Bound::LowerBound
    } else if alpha > original_alpha {
        Bound::Exact
    } else {
        Bound::UpperBound
    };
    ctx.tt.store(tt_hash, 0, best_score, best_score, best_move, bound, ply, false);

    best_score
}

/// Triangular PV table for collecting principal variation lines.
///
/// Stored on the stack (~33 KB). Each row `ply` contains the PV
/// continuation from that ply onward.
pub struct PvTable {
    moves: [[Move; MAX_PLY]; MAX_PLY],
    len: [usize; MAX_PLY],
}

impl PvTable {
    /// Create a zeroed PV table.
    pub fn new() -> Self {
        Self {
            moves: [[Move::NULL; MAX_PLY]; MAX_PLY],
            len: [0; MAX_PLY],
        }
    }

    /// Clear the PV line at `ply` (called at the top of each node).
    pub fn clear_ply(&mut self, ply: usize) {
        if ply < MAX_PLY {
            self.len[ply] = 0;
        }
    }

    /// Update the PV at `ply`: set `mv` as the best move and copy the
    /// continuation from `ply + 1`.
    pub fn update(&mut self, ply: usize, mv: Move) {
        if ply >= MAX_PLY {
            return;
        }

        self.moves[ply][0] = mv;

        let child_ply = ply + 1;
        if child_ply < MAX_PLY {
            let child_len = self.len[child_ply];
            let copy_len = child_len.min(MAX_PLY - 1);

            if ply < child_ply {
                let (top, bottom) = self.moves.split_at_mut(child_ply);
                top[ply][1..1 + copy_len].copy_from_slice(&bottom[0][..copy_len]);
            }

            self.len[ply] = 1 + copy_len;
        } else {
            self.len[ply] = 1;
        }
    }

    /// The principal variation from the root.
    pub fn root_pv(&self) -> &[Move] {
        &self.moves[0][..self.len[0]]
    }

    /// Length of the root PV line.
    pub fn root_len(&self) -> usize {
        self.len[0]
    }
}

impl Default for PvTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Search state threaded through negamax calls.
pub(super) struct SearchContext<'a> {
    /// Total nodes visited.
    pub nodes: u64,
    /// Transposition table (shared, lockless).
    pub tt: &'a TranspositionTable,
    /// Principal variation table.
    pub pv: PvTable,
    /// Search control (stop flag + time limits).
    pub control: &'a SearchControl,
    /// Process-start LMR reduction table.
    pub lmr: &'a LmrTable,
    /// Killer move table.
    pub killers: KillerTable,
    /// Butterfly history table.
    pub history_table: HistoryTable,
    /// Counter-move table.
    pub counters: CounterMoveTable,
    /// 1-ply continuation history.
    pub cont1: Box<ContinuationHistory>,
    /// 2-ply (follow-up) continuation history.
    pub cont2: Box<ContinuationHistory>,
    /// Per-ply search stack.
    pub stack: [StackEntry; MAX_PLY],
    /// Zobrist hashes of positions visited during this search (for repetition detection).
    pub history: Vec<u64>,
}
