//! Top-level move generation: shadow pass over both directions to rank
//! anchors, a bounded exchange enumeration, and a recursive KWG walk per
//! anchor in descending upper-bound order with `Record-Best`-mode pruning.

pub mod anchor;
pub mod exchange;
pub mod recursive;

use crate::board::{Board, Direction};
use crate::game::{Move, MoveList, MoveRecordType, Player};
use crate::tiles::LetterDistribution;
use anchor::shadow_pass;
use exchange::generate_exchange_moves;
use recursive::{generate_from_anchor, GenContext};

/// Subtracted once per vowel landing on one of these columns (or the
/// symmetric rows, for a vertical opening) on the opening move only.
pub const OPENING_HOTSPOT_PENALTY: f32 = 0.7;
pub const OPENING_HOTSPOT_COLUMNS: [usize; 4] = [2, 6, 8, 12];
pub const NON_OUTPLAY_LEAVE_SCORE_MULTIPLIER: f32 = 2.0;
pub const NON_OUTPLAY_CONSTANT: f32 = 7.0;
/// Keyed by `bag_remaining - tiles_played + RACK_SIZE`; left as zeros rather
/// than reverse-engineering Quackle's tournament-tuned table, per the
/// generator's own sanctioned-simplification clause.
pub const PRE_ENDGAME_ADJUSTMENT: [f32; 9] = [0.0; 9];

pub struct GenerationInput<'a> {
    pub board: &'a Board,
    pub ld: &'a LetterDistribution,
    pub player: &'a Player,
    pub bag_size: usize,
    pub opponent_rack_score: i32,
    pub num_plays: usize,
}

/// Runs the full generation pipeline for one player and returns the
/// resulting moves sorted descending by equity (best first), always
/// including a pass.
pub fn generate_moves(input: &GenerationInput) -> Vec<Move> {
    let rack = &input.player.rack;
    let bag_empty = input.bag_size == 0;
    let is_opening = input.board.is_empty();

    let exch = generate_exchange_moves(rack, &input.player.klv, input.bag_size);
    let mut movelist = MoveList::new(input.player.move_record_type, input.num_plays.max(1));
    for mv in exch.moves {
        movelist.insert(mv);
    }
    movelist.insert(Move::pass(crate::game::PASS_MOVE_EQUITY));

    for &dir in &[Direction::Horizontal, Direction::Vertical] {
        let anchors = shadow_pass(
            input.board,
            input.ld,
            input.player,
            dir,
            &exch.best_leaves,
            input.opponent_rack_score,
            bag_empty,
        );
        // `anchors` is sorted descending by upper bound, so once the current
        // best real equity reaches this anchor's bound, no later anchor in
        // this list can possibly beat it.
        for anchor in &anchors {
            if input.player.move_record_type == MoveRecordType::RecordBest && movelist.best_equity() >= anchor.upper_bound_equity {
                break;
            }
            let best_before = movelist.best_equity();
            let ctx = GenContext {
                kwg: &input.player.kwg,
                klv: &input.player.klv,
                ld: input.ld,
                board: input.board,
                dir: anchor.dir,
                player: 0,
                anchor_row: anchor.row,
                anchor_col: anchor.col,
                is_opening,
                bag_size: input.bag_size,
                opponent_rack_score: input.opponent_rack_score,
            };
            generate_from_anchor(&ctx, rack, &mut movelist);
            debug_assert!(
                movelist.best_equity() <= best_before.max(anchor.upper_bound_equity) + 1e-3,
                "shadow upper bound at ({}, {:?}) was exceeded by an actual move",
                anchor.row,
                anchor.dir
            );
        }
    }

    movelist.into_sorted()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{MoveRecordType, MoveSortType, Player};
    use crate::lexicon::{Klv, KwgBuilder};
    use crate::tiles::Rack;
    use std::sync::Arc;

    fn setup() -> (Board, LetterDistribution, Player) {
        let ld = LetterDistribution::english();
        let mut builder = KwgBuilder::new();
        for w in ["CAT", "CATS", "CAB", "DOG", "DO", "AA", "AT", "TA"] {
            builder.add_word(&ld.parse_str(w, false).unwrap());
        }
        let kwg = Arc::new(builder.build());
        let klv = Arc::new(Klv::synthetic(&ld, 3));
        let mut player = Player::new("p0", ld.size(), kwg, klv);
        player.rack = Rack::set_from_string(&ld, "CAT").unwrap();
        player.move_record_type = MoveRecordType::RecordAll;
        player.move_sort_type = MoveSortType::Equity;
        let mut board = Board::new();
        board.update_all_anchors();
        (board, ld, player)
    }

    #[test]
    fn opening_move_produces_a_placement_through_center() {
        let (board, ld, player) = setup();
        let input = GenerationInput {
            board: &board,
            ld: &ld,
            player: &player,
            bag_size: 80,
            opponent_rack_score: 0,
            num_plays: 20,
        };
        let moves = generate_moves(&input);
        assert!(moves.iter().any(|m| matches!(m, Move::Placement { row, col, .. } if *row == 7 && (*col..*col + 3).contains(&7))));
    }

    #[test]
    fn generated_moves_always_include_a_pass() {
        let (board, ld, player) = setup();
        let input = GenerationInput {
            board: &board,
            ld: &ld,
            player: &player,
            bag_size: 80,
            opponent_rack_score: 0,
            num_plays: 20,
        };
        let moves = generate_moves(&input);
        assert!(moves.iter().any(Move::is_pass));
    }

    #[test]
    fn record_best_mode_returns_only_the_top_placement_when_one_exists() {
        let (board, ld, mut player) = setup();
        player.move_record_type = MoveRecordType::RecordBest;
        let input = GenerationInput {
            board: &board,
            ld: &ld,
            player: &player,
            bag_size: 80,
            opponent_rack_score: 0,
            num_plays: 1,
        };
        let moves = generate_moves(&input);
        // A real placement beats PASS_MOVE_EQUITY by a wide margin, so the
        // pass is dropped rather than tagging along.
        assert_eq!(moves.len(), 1);
        assert!(!moves[0].is_pass());
    }
}
