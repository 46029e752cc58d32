//! Anchors and the shadow pass: a cheap upper bound on the equity
//! achievable from each anchor square, computed without enumerating actual
//! tile placements.

use crate::board::{letter_multiplier, word_multiplier, Board, Direction, TRIVIAL_CROSS_SET};
use crate::game::Player;
use crate::movegen::{NON_OUTPLAY_CONSTANT, NON_OUTPLAY_LEAVE_SCORE_MULTIPLIER};
use crate::tiles::{LetterDistribution, Rack};
use crate::{unblank, BOARD_DIM, DEFAULT_BINGO_BONUS, RACK_SIZE};

#[derive(Debug, Clone, Copy)]
pub struct Anchor {
    pub row: usize,
    pub col: usize,
    pub dir: Direction,
    pub upper_bound_equity: f32,
}

/// Bitmask of every letter available on the rack: a concrete letter if held
/// directly, or (if a blank is held) every letter up to the alphabet size —
/// the blank can stand in for any of them.
pub fn rack_cross_set(rack: &Rack, alphabet_size: usize) -> u64 {
    let mut mask = 0u64;
    for ml in 1..alphabet_size as u8 {
        if rack.count_of(ml) > 0 {
            mask |= 1u64 << ml;
        }
    }
    if rack.count_of(0) > 0 {
        for ml in 0..alphabet_size as u8 {
            mask |= 1u64 << ml;
        }
    }
    mask
}

/// Computes the shadow pass for every anchor square in direction `dir`,
/// sorted descending by upper-bound equity. `best_leaves[n]` is the best
/// klv value achievable for a leave of `n` tiles (from the exchange-move
/// enumeration pass, §4.I).
pub fn shadow_pass(
    board: &Board,
    ld: &LetterDistribution,
    player: &Player,
    dir: Direction,
    best_leaves: &[f32],
    opponent_rack_score: i32,
    bag_empty: bool,
) -> Vec<Anchor> {
    let mut anchors = Vec::new();
    for row in 0..BOARD_DIM {
        for col in 0..BOARD_DIM {
            if !board.is_anchor(row, col) {
                continue;
            }
            let bound = estimate_upper_bound(board, ld, player, row, col, dir, best_leaves, opponent_rack_score, bag_empty);
            anchors.push(Anchor { row, col, dir, upper_bound_equity: bound });
        }
    }
    anchors.sort_by(|a, b| b.upper_bound_equity.partial_cmp(&a.upper_bound_equity).unwrap_or(std::cmp::Ordering::Equal));
    anchors
}

/// Greedy, intentionally loose upper bound: pairs the rack's best-scoring
/// tiles with the best-bonused empty squares extending rightward from the
/// anchor, without checking word validity or cross-set legality. Because it
/// never checks legality it can only overestimate what a real play scores,
/// which is exactly the property the recursive pass's pruning depends on.
#[allow(clippy::too_many_arguments)]
fn estimate_upper_bound(
    board: &Board,
    ld: &LetterDistribution,
    player: &Player,
    row: usize,
    col: usize,
    dir: Direction,
    best_leaves: &[f32],
    opponent_rack_score: i32,
    bag_empty: bool,
) -> f32 {
    let rack = &player.rack;
    let mut tile_scores: Vec<i32> = Vec::with_capacity(rack.len());
    for &ml in ld.score_order() {
        for _ in 0..rack.count_of(ml) {
            tile_scores.push(if ml == 0 { 0 } else { ld.score(ml) });
        }
    }
    tile_scores.sort_unstable_by(|a, b| b.cmp(a));

    let mut bonus_codes: Vec<u8> = Vec::new();
    let (dr, dc): (usize, usize) = match dir {
        Direction::Horizontal => (0, 1),
        Direction::Vertical => (1, 0),
    };
    let mut r = row;
    let mut c = col;
    while r < BOARD_DIM && c < BOARD_DIM && bonus_codes.len() < rack.len() {
        if board.is_empty_square(r, c) {
            bonus_codes.push(board.bonus(r, c));
        }
        r += dr;
        c += dc;
    }
    bonus_codes.sort_by_key(|&code| std::cmp::Reverse(letter_multiplier(code) * word_multiplier(code)));

    let tiles_played = tile_scores.len().min(bonus_codes.len());
    let mut raw_score = 0i32;
    for i in 0..tiles_played {
        let code = bonus_codes[i];
        raw_score += tile_scores[i] * letter_multiplier(code) * word_multiplier(code);
    }
    if tiles_played == RACK_SIZE {
        raw_score += DEFAULT_BINGO_BONUS;
    }

    let leave_size = rack.len().saturating_sub(tiles_played);
    let leave_value = best_leaves.get(leave_size).copied().unwrap_or(0.0);

    let mut equity = raw_score as f32 + leave_value;
    if bag_empty {
        if tiles_played == rack.len() {
            equity += 2.0 * opponent_rack_score as f32;
        } else {
            // Never-underestimate requires the *smallest* possible penalty: the
            // lowest remaining-rack score arises when the play takes the
            // highest-scoring tiles, which is exactly tile_scores[tiles_played..].
            let lowest_remaining_score: i32 = tile_scores[tiles_played..].iter().sum();
            equity -= NON_OUTPLAY_LEAVE_SCORE_MULTIPLIER * lowest_remaining_score as f32 + NON_OUTPLAY_CONSTANT;
        }
    }
    equity
}

/// Whether any letter the rack holds (directly, or via a blank) is
/// compatible with `cross_mask`.
pub fn rack_compatible_with(cross_mask: u64, rack_mask: u64) -> bool {
    cross_mask & rack_mask != 0
}

pub fn is_trivial(mask: u64) -> bool {
    mask == TRIVIAL_CROSS_SET
}

pub fn unblanked_letters_in_mask(mask: u64, alphabet_size: usize) -> Vec<u8> {
    (0..alphabet_size as u8).filter(|&ml| mask & (1u64 << unblank(ml)) != 0).collect()
}
