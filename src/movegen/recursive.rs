//! Recursive KWG walk that enumerates and scores actual placements anchored
//! at a single square.
//!
//! A single left-to-right walk through the forward trie suffices (no
//! GADDAG/bidirectional trick is needed) because the caller tries every
//! admissible starting column to the left of the anchor in turn: for each
//! start column this module just walks forward, forcing existing board
//! letters and branching over rack tiles at empty squares, and considers
//! stopping after any square whose KWG edge was accepting.

use crate::board::{letter_multiplier, word_multiplier, Board, Direction, TRIVIAL_CROSS_SET};
use crate::game::{Move, MoveList};
use crate::lexicon::{Klv, Kwg};
use crate::movegen::{NON_OUTPLAY_CONSTANT, NON_OUTPLAY_LEAVE_SCORE_MULTIPLIER, OPENING_HOTSPOT_COLUMNS, OPENING_HOTSPOT_PENALTY, PRE_ENDGAME_ADJUSTMENT};
use crate::tiles::{LetterDistribution, Rack};
use crate::{blanked, is_blanked, unblank, BOARD_DIM, DEFAULT_BINGO_BONUS, PLAYED_THROUGH_MARKER, RACK_SIZE};

pub struct GenContext<'a> {
    pub kwg: &'a Kwg,
    pub klv: &'a Klv,
    pub ld: &'a LetterDistribution,
    pub board: &'a Board,
    pub dir: Direction,
    pub player: usize,
    pub anchor_row: usize,
    pub anchor_col: usize,
    /// Whether the board is empty — the opening-hotspot penalty only applies
    /// to the very first move of the game.
    pub is_opening: bool,
    pub bag_size: usize,
    pub opponent_rack_score: i32,
}

/// Tries every admissible leftmost starting column for a word that covers
/// `(anchor_row, anchor_col)`, and recursively extends each into the
/// move list. A start square is admissible as long as the square
/// immediately before it (further left/up) is empty or off-board — any
/// start further left than that is reachable, and enumerated, at a larger
/// offset.
pub fn generate_from_anchor(ctx: &GenContext, rack: &Rack, movelist: &mut MoveList) {
    let (dr, dc): (usize, usize) = match ctx.dir {
        Direction::Horizontal => (0, 1),
        Direction::Vertical => (1, 0),
    };
    let max_offset = match ctx.dir {
        Direction::Horizontal => ctx.anchor_col.min(rack.len()),
        Direction::Vertical => ctx.anchor_row.min(rack.len()),
    };
    for offset in 0..=max_offset {
        let row = ctx.anchor_row - dr * offset;
        let col = ctx.anchor_col - dc * offset;
        let before_r = row as isize - dr as isize;
        let before_c = col as isize - dc as isize;
        let boundary_clear = before_r < 0 || before_c < 0 || ctx.board.is_empty_square(before_r as usize, before_c as usize);
        if !boundary_clear {
            continue;
        }
        let mut rack_copy = rack.clone();
        let mut placed = Vec::new();
        extend(ctx, row, col, ctx.kwg.root_arc(), &mut placed, &mut rack_copy, 0, movelist);
    }
}

#[allow(clippy::too_many_arguments)]
fn extend(
    ctx: &GenContext,
    row: usize,
    col: usize,
    state: u32,
    placed: &mut Vec<u8>,
    rack: &mut Rack,
    tiles_played: u8,
    movelist: &mut MoveList,
) {
    if row >= BOARD_DIM || col >= BOARD_DIM {
        return;
    }
    let filled = !ctx.board.is_empty_square(row, col);
    let (dr, dc): (usize, usize) = match ctx.dir {
        Direction::Horizontal => (0, 1),
        Direction::Vertical => (1, 0),
    };
    if filled {
        let forced = ctx.board.letter(row, col);
        if let Some(child) = ctx.kwg.find(state, unblank(forced)) {
            let accept_here = ctx.kwg.in_letter_set(state, unblank(forced));
            placed.push(PLAYED_THROUGH_MARKER);
            maybe_finalize(ctx, accept_here, tiles_played, row, col, placed, rack, movelist);
            extend(ctx, row + dr, col + dc, child, placed, rack, tiles_played, movelist);
            placed.pop();
        }
        return;
    }

    let cross_mask = ctx.board.cross_set(row, col, ctx.dir, ctx.player);
    let candidates: Vec<(u8, u32, bool)> = ctx.kwg.children(state);
    for (tile, child, accept) in candidates {
        if tile == crate::lexicon::kwg::SEPARATION_TILE {
            continue;
        }
        let cross_ok = cross_mask == TRIVIAL_CROSS_SET || cross_mask & (1u64 << tile) != 0;
        if !cross_ok {
            continue;
        }
        if rack.count_of(tile) > 0 && tile != 0 {
            rack.remove(tile);
            placed.push(tile);
            maybe_finalize(ctx, accept, tiles_played + 1, row, col, placed, rack, movelist);
            extend(ctx, row + dr, col + dc, child, placed, rack, tiles_played + 1, movelist);
            placed.pop();
            let _ = rack.add(tile);
        } else if rack.count_of(0) > 0 {
            rack.remove(0);
            placed.push(blanked(tile));
            maybe_finalize(ctx, accept, tiles_played + 1, row, col, placed, rack, movelist);
            extend(ctx, row + dr, col + dc, child, placed, rack, tiles_played + 1, movelist);
            placed.pop();
            let _ = rack.add(0);
        }
    }
}

/// `rack` is the DFS's working rack at the point of the call: every tile in
/// `placed` has already been removed from it, so it already holds exactly
/// the leave this candidate move would leave behind.
fn maybe_finalize(
    ctx: &GenContext,
    accept_here: bool,
    tiles_played: u8,
    row: usize,
    col: usize,
    placed: &[u8],
    rack: &Rack,
    movelist: &mut MoveList,
) {
    if !accept_here || tiles_played == 0 {
        return;
    }
    let covers_anchor = match ctx.dir {
        Direction::Horizontal => col >= ctx.anchor_col,
        Direction::Vertical => row >= ctx.anchor_row,
    };
    if !covers_anchor {
        return;
    }
    let (next_r, next_c) = match ctx.dir {
        Direction::Horizontal => (row, col + 1),
        Direction::Vertical => (row + 1, col),
    };
    let word_ends_here = next_r >= BOARD_DIM || next_c >= BOARD_DIM || ctx.board.is_empty_square(next_r, next_c);
    if !word_ends_here {
        return;
    }
    let (start_row, start_col) = match ctx.dir {
        Direction::Horizontal => (row, col + 1 - placed.len()),
        Direction::Vertical => (row + 1 - placed.len(), col),
    };
    if tiles_played == 1 && ctx.dir == Direction::Vertical {
        let perp = ctx.dir.opposite();
        let (pr, pc) = real_tile_position(ctx.dir, start_row, start_col, placed);
        if ctx.board.cross_set(pr, pc, perp, ctx.player) != TRIVIAL_CROSS_SET {
            return;
        }
    }

    let (score, _new_letters) = score_move(ctx.board, ctx.ld, ctx.dir, start_row, start_col, placed, ctx.player);
    let adjustment = equity_adjustment(ctx, tiles_played as usize, start_row, start_col, placed, rack);
    let equity = score as f32 + ctx.klv.klv_value(rack) + adjustment;
    movelist.insert(Move::Placement {
        row: start_row,
        col: start_col,
        dir: ctx.dir,
        tiles: placed.to_vec(),
        tiles_played,
        score,
        equity,
    });
}

/// Opening-move hotspot penalty, pre-endgame window adjustment, and
/// (bag-empty) endgame adjustment, per the move generator's equity formula.
#[allow(clippy::too_many_arguments)]
fn equity_adjustment(ctx: &GenContext, tiles_played: usize, start_row: usize, start_col: usize, placed: &[u8], leave: &Rack) -> f32 {
    let mut total = 0.0f32;
    if ctx.is_opening {
        let (dr, dc): (usize, usize) = match ctx.dir {
            Direction::Horizontal => (0, 1),
            Direction::Vertical => (1, 0),
        };
        for (i, &tile) in placed.iter().enumerate() {
            if tile == PLAYED_THROUGH_MARKER || is_blanked(tile) {
                continue;
            }
            if !ctx.ld.is_vowel(tile) {
                continue;
            }
            let r = start_row + dr * i;
            let c = start_col + dc * i;
            let file_coord = match ctx.dir {
                Direction::Horizontal => c,
                Direction::Vertical => r,
            };
            if OPENING_HOTSPOT_COLUMNS.contains(&file_coord) {
                total -= OPENING_HOTSPOT_PENALTY;
            }
        }
    }

    let window_index = ctx.bag_size as isize - tiles_played as isize + RACK_SIZE as isize;
    if window_index >= 0 && (window_index as usize) < PRE_ENDGAME_ADJUSTMENT.len() {
        total += PRE_ENDGAME_ADJUSTMENT[window_index as usize];
    }

    if ctx.bag_size == 0 {
        if leave.is_empty() {
            total += 2.0 * ctx.opponent_rack_score as f32;
        } else {
            total -= NON_OUTPLAY_LEAVE_SCORE_MULTIPLIER * leave.score(ctx.ld) as f32 + NON_OUTPLAY_CONSTANT;
        }
    }
    total
}

fn real_tile_position(dir: Direction, start_row: usize, start_col: usize, placed: &[u8]) -> (usize, usize) {
    let idx = placed.iter().position(|&t| t != PLAYED_THROUGH_MARKER).unwrap_or(0);
    match dir {
        Direction::Horizontal => (start_row, start_col + idx),
        Direction::Vertical => (start_row + idx, start_col),
    }
}

/// Computes a placement's raw score: the main word (tile scores ×
/// letter-multipliers × the product of word-multipliers over newly placed
/// tiles) plus every newly formed cross-word, plus the bingo bonus.
/// Returns the score and the list of newly placed (non-played-through)
/// machine letters, for adjustment calculations.
pub fn score_move(
    board: &Board,
    ld: &LetterDistribution,
    dir: Direction,
    start_row: usize,
    start_col: usize,
    tiles: &[u8],
    player: usize,
) -> (i32, Vec<u8>) {
    let (dr, dc): (usize, usize) = match dir {
        Direction::Horizontal => (0, 1),
        Direction::Vertical => (1, 0),
    };
    let mut main_word_score = 0i32;
    let mut word_mult = 1i32;
    let mut cross_total = 0i32;
    let mut new_letters = Vec::new();
    let mut tiles_played = 0u8;

    for (i, &tile) in tiles.iter().enumerate() {
        let r = start_row + dr * i;
        let c = start_col + dc * i;
        if tile == PLAYED_THROUGH_MARKER {
            main_word_score += board.letter_score(ld, r, c);
            continue;
        }
        tiles_played += 1;
        new_letters.push(tile);
        let code = board.bonus(r, c);
        let lmul = letter_multiplier(code);
        let wmul = word_multiplier(code);
        let tile_score = if is_blanked(tile) { 0 } else { ld.score(unblank(tile)) };
        main_word_score += tile_score * lmul;
        word_mult *= wmul;

        let cross_mask = board.cross_set(r, c, dir, player);
        if cross_mask != TRIVIAL_CROSS_SET {
            let cross_score = board.cross_score(r, c, dir, player);
            cross_total += (cross_score + tile_score * lmul) * wmul;
        }
    }
    main_word_score *= word_mult;
    let mut total = main_word_score + cross_total;
    if tiles_played as usize == RACK_SIZE {
        total += DEFAULT_BINGO_BONUS;
    }
    (total, new_letters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::KwgBuilder;

    fn setup_board_with_dog() -> (Board, LetterDistribution) {
        let ld = LetterDistribution::english();
        let mut board = Board::new();
        let dog = ld.parse_str("DOG", false).unwrap();
        for (i, &ml) in dog.iter().enumerate() {
            board.set_letter(7, 7 + i, ml);
        }
        (board, ld)
    }

    #[test]
    fn score_move_sums_letters_times_multipliers() {
        let (board, ld) = setup_board_with_dog();
        let d = ld.parse_str("D", false).unwrap()[0];
        let (score, letters) = score_move(&board, &ld, Direction::Horizontal, 7, 7, &[d, PLAYED_THROUGH_MARKER, PLAYED_THROUGH_MARKER], 0);
        assert_eq!(letters, vec![d]);
        assert!(score > 0);
    }

    #[test]
    fn bingo_adds_default_bonus() {
        let ld = LetterDistribution::english();
        let board = Board::new();
        let tiles = ld.parse_str("VORTEX", false).unwrap();
        let mut seven: Vec<u8> = tiles;
        seven.push(ld.parse_str("S", false).unwrap()[0]);
        let (score, _) = score_move(&board, &ld, Direction::Horizontal, 7, 4, &seven, 0);
        let (score_without_bonus, _) = score_move(&board, &ld, Direction::Horizontal, 7, 4, &seven[..6], 0);
        assert!(score >= score_without_bonus);
    }

    #[test]
    fn generation_finds_a_word_through_existing_tiles() {
        let (board, ld) = setup_board_with_dog();
        let mut builder = KwgBuilder::new();
        for w in ["DOG", "DOGS"] {
            builder.add_word(&ld.parse_str(w, false).unwrap());
        }
        let kwg = builder.build();
        let klv = Klv::synthetic(&ld, 2);
        let s = ld.parse_str("S", false).unwrap()[0];
        let mut rack = Rack::empty(ld.size());
        rack.add(s).unwrap();
        let mut movelist = MoveList::new(crate::game::MoveRecordType::RecordAll, 10);
        let ctx = GenContext {
            kwg: &kwg,
            klv: &klv,
            ld: &ld,
            board: &board,
            dir: Direction::Horizontal,
            player: 0,
            anchor_row: 7,
            anchor_col: 10,
            is_opening: false,
            bag_size: 50,
            opponent_rack_score: 0,
        };
        generate_from_anchor(&ctx, &rack, &mut movelist);
        let moves = movelist.into_sorted();
        assert!(moves.iter().any(|m| matches!(m, Move::Placement { tiles, .. } if tiles.contains(&s))));
    }
}
