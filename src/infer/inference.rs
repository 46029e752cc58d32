//! Combinatorial rack inference: given a pre-move game position and the move
//! an opponent actually played, estimate a probability distribution over
//! what rack they could have held.
//!
//! The candidate universe is every multiset of unplayed ("leave") tiles drawable
//! from the pool of letters unaccounted for at that moment (the bag plus the
//! observer's own uncertainty about the opponent's rack — modeled here as
//! `game.bag.as_counts() + game.players[on_turn].rack.counts()`, since the
//! pre-move snapshot's `rack` field records ground truth that this module
//! deliberately only reads the *length* of, never the contents, to keep the
//! inference honest). A candidate is "consistent" if re-running move
//! generation with that candidate as the player's rack would have rated the
//! observed move within `equity_margin` of its own best move — an "opponent
//! might have played something suboptimal, but not by much" tolerance.
//! Enumeration and judging are embarrassingly parallel over candidates, so
//! this uses a `rayon` `par_iter` batch pattern rather than a shared
//! monotonic-counter design, a simplification recorded in DESIGN.md.

use crate::combinatorics::{choose, for_each_multiset};
use crate::game::{Game, Move, MoveRecordType};
use crate::infer::results::{InferenceResults, LeaveRackEntry, LeaveRackList};
use crate::lexicon::Klv;
use crate::movegen::{generate_moves, GenerationInput};
use crate::tiles::Rack;
use crate::{is_blanked, unblank, Error, Result, PLAYED_THROUGH_MARKER, RACK_SIZE};
use rayon::prelude::*;

/// Tolerance on top of `equity_margin` for floating-point noise in the
/// equity comparison.
const EPSILON: f32 = 1e-3;

pub struct InferenceInput<'a> {
    /// Pre-move snapshot: `game.player_on_turn` is the player whose rack is
    /// being inferred, and `game.board`/`game.bag` reflect the position
    /// immediately before `observed` was played.
    pub game: &'a Game,
    pub observed: Move,
    /// How far below the generator's own best equity the observed move is
    /// still accepted as "what this rack would have played".
    pub equity_margin: f32,
    /// Bound on how many candidate leaves are kept (by draw weight) for the
    /// final distribution, independent of how many are enumerated.
    pub max_candidates: usize,
}

/// Per-letter count of tiles the observed move removed from the player's
/// rack: blank-played tiles count against the blank slot (index 0), mirroring
/// `Game::apply_placement`'s own bookkeeping.
pub fn played_tile_counts(observed: &Move, alphabet_size: usize) -> Vec<u16> {
    let mut counts = vec![0u16; alphabet_size];
    match observed {
        Move::Placement { tiles, .. } => {
            for &t in tiles {
                if t == PLAYED_THROUGH_MARKER {
                    continue;
                }
                if is_blanked(t) {
                    counts[0] += 1;
                } else {
                    counts[unblank(t) as usize] += 1;
                }
            }
        }
        Move::Exchange { tiles, .. } => {
            for &t in tiles {
                counts[unblank(t) as usize] += 1;
            }
        }
        Move::Pass { .. } => {}
    }
    counts
}

/// Checks the preconditions required before inference can run.
///
/// `BothPlayAndExchange`, `ExchangeScoreNotZero`, and `RackOverflow` are part
/// of the documented failure-mode list but are unreachable through this
/// crate's types, not missing validation: a [`Move`] is exactly one of
/// Placement, Exchange, or Pass (never a play and an exchange at once),
/// `Exchange` carries no score field to be nonzero, and [`crate::tiles::Rack`]
/// rejects any `add` past `RACK_SIZE` at construction time. Their `Error`
/// variants exist for parity with that list and for callers building a
/// `Move` some other way; this function can never produce them.
pub fn validate(input: &InferenceInput) -> Result<()> {
    if input.observed.is_pass() || input.observed.tiles_played() == 0 {
        return Err(Error::NoTilesPlayed);
    }
    if input.observed.is_exchange() && input.game.bag.tiles_remaining() < 2 * RACK_SIZE {
        return Err(Error::ExchangeNotAllowed);
    }
    let alphabet_size = input.game.ld.size();
    let played = played_tile_counts(&input.observed, alphabet_size);
    let on_turn = input.game.player_on_turn;
    let pool = unseen_pool(input.game, on_turn);
    for (ml, &count) in played.iter().enumerate() {
        if count > pool[ml] {
            return Err(Error::TilesPlayedNotInBag);
        }
    }
    Ok(())
}

/// The pool of tiles not visible to the player on turn's opponent: the bag
/// plus the player's own (hidden, from the opponent's perspective) rack.
fn unseen_pool(game: &Game, on_turn: usize) -> Vec<u16> {
    let alphabet_size = game.ld.size();
    let mut pool = game.bag.as_counts(alphabet_size);
    let rack_counts = game.players[on_turn].rack.counts();
    for (ml, &c) in rack_counts.iter().enumerate() {
        pool[ml] += c as u16;
    }
    pool
}

/// Runs inference and returns the aggregated distribution over candidate racks.
pub fn infer(input: &InferenceInput) -> Result<InferenceResults> {
    validate(input)?;
    let game = input.game;
    let on_turn = game.player_on_turn;
    let alphabet_size = game.ld.size();
    let played = played_tile_counts(&input.observed, alphabet_size);
    let played_total: usize = played.iter().map(|&c| c as usize).sum();
    let rack_size_before_move = game.players[on_turn].rack.len();
    let leave_size = rack_size_before_move.saturating_sub(played_total);

    let pool = unseen_pool(game, on_turn);
    let mut pool_after_play = pool.clone();
    for (ml, &c) in played.iter().enumerate() {
        pool_after_play[ml] -= c;
    }
    let caps: Vec<u8> = pool_after_play.iter().map(|&c| c.min(u8::MAX as u16) as u8).collect();

    let mut candidate_leaves: Vec<Vec<u8>> = Vec::new();
    if leave_size == 0 {
        candidate_leaves.push(Vec::new());
    } else {
        for_each_multiset(&caps, leave_size, leave_size, |seq| candidate_leaves.push(seq.to_vec()));
    }

    let judged: Vec<Option<LeaveRackEntry>> = candidate_leaves
        .into_par_iter()
        .map(|leave_seq| {
            judge_candidate(
                game,
                on_turn,
                &input.observed,
                &played,
                &leave_seq,
                alphabet_size,
                &pool_after_play,
                input.equity_margin,
            )
        })
        .collect();

    let mut list = LeaveRackList::new(input.max_candidates.max(1));
    for entry in judged.into_iter().flatten() {
        list.insert(entry);
    }
    let entries = list.into_sorted();
    Ok(InferenceResults::build(&entries, &played, alphabet_size, &game.players[on_turn].klv, input.observed.is_exchange()))
}

/// Tests one candidate leave for consistency and, if consistent, returns its
/// weighted entry.
#[allow(clippy::too_many_arguments)]
fn judge_candidate(
    game: &Game,
    on_turn: usize,
    observed: &Move,
    played: &[u16],
    leave_seq: &[u8],
    alphabet_size: usize,
    pool_after_play: &[u16],
    equity_margin: f32,
) -> Option<LeaveRackEntry> {
    let mut leave_counts = vec![0u8; alphabet_size];
    for &ml in leave_seq {
        leave_counts[ml as usize] += 1;
    }
    let leave = Rack::from_counts(leave_counts.clone());

    let mut candidate_rack_counts = leave_counts.clone();
    for (ml, &c) in played.iter().enumerate() {
        candidate_rack_counts[ml] = candidate_rack_counts[ml].saturating_add(c as u8);
    }
    let candidate_rack = Rack::from_counts(candidate_rack_counts);

    let mut candidate_game = game.clone();
    candidate_game.players[on_turn].rack = candidate_rack;
    let opponent = candidate_game.opponent();
    let mut player = candidate_game.players[on_turn].clone();
    player.move_record_type = MoveRecordType::RecordBest;
    let gen_input = GenerationInput {
        board: &candidate_game.board,
        ld: &candidate_game.ld,
        player: &player,
        bag_size: candidate_game.bag.tiles_remaining(),
        opponent_rack_score: candidate_game.players[opponent].rack.score(&candidate_game.ld),
        num_plays: 1,
    };
    let moves = generate_moves(&gen_input);
    let best_equity = moves.first().map(Move::equity).unwrap_or(f32::NEG_INFINITY);

    let observed_equity = observed_equity_for_leave(&candidate_game.players[on_turn].klv, observed, &leave);
    if observed_equity < best_equity - equity_margin - EPSILON {
        return None;
    }

    let mut weight = 1.0f64;
    for ml in 0..alphabet_size {
        weight *= choose(pool_after_play[ml] as u64, leave_counts[ml] as u64);
    }

    Some(LeaveRackEntry { leave, weight, equity: observed_equity })
}

/// Approximates the observed move's equity under a specific candidate leave:
/// the move's own deterministic score plus the leave's KLV value. The
/// generator's opening-hotspot/pre-endgame/endgame equity adjustments are
/// deliberately omitted (that function is private to `movegen::recursive`
/// and depends on context this module doesn't reconstruct) — every candidate
/// is compared on the same simplified basis, so relative ranking between
/// candidates is unaffected; only their absolute margin against the
/// generator's own (fully-adjusted) best equity shifts slightly, which
/// `equity_margin` already exists to absorb.
fn observed_equity_for_leave(klv: &Klv, observed: &Move, leave: &Rack) -> f32 {
    observed.score() as f32 + klv.klv_value(leave)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Direction;
    use crate::game::Player;
    use crate::lexicon::KwgBuilder;
    use crate::tiles::LetterDistribution;
    use std::sync::Arc;

    fn setup() -> Game {
        let ld = Arc::new(LetterDistribution::english());
        let mut builder = KwgBuilder::new();
        for w in ["CAT", "CATS", "CAB", "AT", "TA", "AA", "DOG"] {
            builder.add_word(&ld.parse_str(w, false).unwrap());
        }
        let kwg = Arc::new(builder.build());
        let klv = Arc::new(Klv::synthetic(&ld, 3));
        let p0 = Player::new("p0", ld.size(), kwg.clone(), klv.clone());
        let p1 = Player::new("p1", ld.size(), kwg, klv);
        let mut game = Game::new(ld, 7, [p0, p1], 0);
        game.recompute_all();
        game.players[0].rack = Rack::set_from_string(&game.ld, "CAT").unwrap();
        game
    }

    #[test]
    fn exchange_is_rejected_when_bag_is_too_small() {
        let mut game = setup();
        while game.bag.tiles_remaining() >= 2 * RACK_SIZE {
            game.bag.draw_random(0);
        }
        let input = InferenceInput {
            game: &game,
            observed: Move::Exchange { tiles: vec![game.ld.parse_str("C", false).unwrap()[0]], equity: 0.0 },
            equity_margin: 5.0,
            max_candidates: 50,
        };
        assert_eq!(validate(&input), Err(Error::ExchangeNotAllowed));
    }

    #[test]
    fn pass_is_rejected_by_validate() {
        let game = setup();
        let input = InferenceInput {
            game: &game,
            observed: Move::pass(crate::game::PASS_MOVE_EQUITY),
            equity_margin: 5.0,
            max_candidates: 50,
        };
        assert_eq!(validate(&input), Err(Error::NoTilesPlayed));
    }

    #[test]
    fn played_tile_counts_folds_blanks_to_blank_slot() {
        let ld = LetterDistribution::english();
        let c = blanked_c(&ld);
        let mv = Move::Placement {
            row: 7,
            col: 7,
            dir: Direction::Horizontal,
            tiles: vec![c],
            tiles_played: 1,
            score: 3,
            equity: 3.0,
        };
        let counts = played_tile_counts(&mv, ld.size());
        assert_eq!(counts[0], 1);
    }

    fn blanked_c(ld: &LetterDistribution) -> u8 {
        crate::blanked(ld.parse_str("C", false).unwrap()[0])
    }

    #[test]
    fn infer_returns_candidates_consistent_with_a_generous_margin() {
        let game = setup();
        let cat = game.ld.parse_str("CAT", false).unwrap();
        let observed = Move::Placement {
            row: 7,
            col: 7,
            dir: Direction::Horizontal,
            tiles: cat,
            tiles_played: 3,
            score: 5,
            equity: 5.0,
        };
        let input = InferenceInput {
            game: &game,
            observed,
            equity_margin: 1000.0,
            max_candidates: 20,
        };
        let results = infer(&input).unwrap();
        assert!(results.candidates_considered > 0);
        assert!(results.total_weight() > 0.0);
    }
}
