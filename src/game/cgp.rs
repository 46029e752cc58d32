//! CGP position-string codec: a compact, human-writable snapshot of a
//! [`Game`] (board, both racks, both scores, player on turn) used to set up
//! positions without replaying a whole transcript. The wire grammar is
//! exactly four whitespace-separated fields — board, racks, scores, player
//! on turn — matching [`crate::Error::MalformedCgp`]'s documented shape.
//!
//! This crate owns only the in-memory codec, not a file-format parser
//! (GCG transcripts remain out of scope).

use crate::game::{Game, GameEndReason, Player};
use crate::lexicon::{Klv, Kwg};
use crate::tiles::{LetterDistribution, Rack};
use crate::{Error, Result, BOARD_DIM, EMPTY_SQUARE_MARKER, PLAYED_THROUGH_MARKER};
use std::sync::Arc;

impl Game {
    /// Renders this position as a CGP string. Board rows are written MSB-first
    /// (row 0 first), empty squares as `.`, tiles via
    /// [`LetterDistribution::ml_to_string`] (lowercase for blanks).
    pub fn to_cgp(&self) -> String {
        let mut rows = Vec::with_capacity(BOARD_DIM);
        for row in 0..BOARD_DIM {
            let mut s = String::with_capacity(BOARD_DIM);
            for col in 0..BOARD_DIM {
                if self.board.is_empty_square(row, col) {
                    s.push('.');
                } else {
                    s.push_str(&self.ld.ml_to_string(self.board.letter(row, col)));
                }
            }
            rows.push(s);
        }
        let board_field = rows.join("/");
        let racks_field = format!(
            "{}/{}",
            self.players[0].rack.to_string(&self.ld),
            self.players[1].rack.to_string(&self.ld)
        );
        let scores_field = format!("{}/{}", self.players[0].score, self.players[1].score);
        format!("{board_field} {racks_field} {scores_field} {}", self.player_on_turn)
    }

    /// Parses a CGP string into a fresh [`Game`]: fills a full bag per `ld`,
    /// then withdraws every tile shown on the board or on a rack so the bag
    /// reflects what's actually left unseen.
    pub fn from_cgp(
        cgp: &str,
        ld: Arc<LetterDistribution>,
        kwgs: [Arc<Kwg>; 2],
        klvs: [Arc<Klv>; 2],
        bag_seed: u64,
    ) -> Result<Self> {
        let fields: Vec<&str> = cgp.split_whitespace().collect();
        if fields.len() != 4 {
            return Err(Error::MalformedCgp(cgp.to_string()));
        }
        let [board_field, racks_field, scores_field, turn_field] = [fields[0], fields[1], fields[2], fields[3]];

        let rows: Vec<&str> = board_field.split('/').collect();
        if rows.len() != BOARD_DIM {
            return Err(Error::MalformedCgp(cgp.to_string()));
        }
        let mut board_tiles = vec![EMPTY_SQUARE_MARKER; BOARD_DIM * BOARD_DIM];
        for (row, row_str) in rows.iter().enumerate() {
            let parsed = ld
                .parse_str(row_str, true)
                .map_err(|_| Error::MalformedCgp(cgp.to_string()))?;
            if parsed.len() != BOARD_DIM {
                return Err(Error::MalformedCgp(cgp.to_string()));
            }
            for (col, &ml) in parsed.iter().enumerate() {
                board_tiles[row * BOARD_DIM + col] = if ml == PLAYED_THROUGH_MARKER { EMPTY_SQUARE_MARKER } else { ml };
            }
        }

        let rack_parts: Vec<&str> = racks_field.split('/').collect();
        if rack_parts.len() != 2 {
            return Err(Error::MalformedCgp(cgp.to_string()));
        }
        let rack0 = Rack::set_from_string(&ld, rack_parts[0])?;
        let rack1 = Rack::set_from_string(&ld, rack_parts[1])?;

        let score_parts: Vec<&str> = scores_field.split('/').collect();
        if score_parts.len() != 2 {
            return Err(Error::MalformedCgp(cgp.to_string()));
        }
        let score0: i32 = score_parts[0].parse().map_err(|_| Error::MalformedCgp(cgp.to_string()))?;
        let score1: i32 = score_parts[1].parse().map_err(|_| Error::MalformedCgp(cgp.to_string()))?;

        let player_on_turn: usize = turn_field.parse().map_err(|_| Error::MalformedCgp(cgp.to_string()))?;
        if player_on_turn > 1 {
            return Err(Error::MalformedCgp(cgp.to_string()));
        }

        let mut p0 = Player::new("p0", ld.size(), kwgs[0].clone(), klvs[0].clone());
        let mut p1 = Player::new("p1", ld.size(), kwgs[1].clone(), klvs[1].clone());
        p0.rack = rack0;
        p1.rack = rack1;
        p0.score = score0;
        p1.score = score1;

        let mut game = Game::new(ld, bag_seed, [p0, p1], player_on_turn);
        for row in 0..BOARD_DIM {
            for col in 0..BOARD_DIM {
                let ml = board_tiles[row * BOARD_DIM + col];
                if ml != EMPTY_SQUARE_MARKER {
                    game.board.set_letter(row, col, ml);
                    game.bag.draw_specific(ml, 0);
                }
            }
        }
        for side in 0..2 {
            for ml in 0..ld.size() as u8 {
                for _ in 0..game.players[side].rack.count_of(ml) {
                    game.bag.draw_specific(ml, 0);
                }
            }
        }
        game.game_end_reason = GameEndReason::None;
        game.recompute_all();
        Ok(game)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::KwgBuilder;

    fn lexicon() -> (Arc<LetterDistribution>, Arc<Kwg>, Arc<Klv>) {
        let ld = Arc::new(LetterDistribution::english());
        let mut builder = KwgBuilder::new();
        for w in ["CAT", "CATS", "DOG"] {
            builder.add_word(&ld.parse_str(w, false).unwrap());
        }
        (ld.clone(), Arc::new(builder.build()), Arc::new(Klv::synthetic(&ld, 3)))
    }

    #[test]
    fn round_trips_an_empty_board_position() {
        let (ld, kwg, klv) = lexicon();
        let p0 = Player::new("p0", ld.size(), kwg.clone(), klv.clone());
        let p1 = Player::new("p1", ld.size(), kwg.clone(), klv.clone());
        let game = Game::new(ld.clone(), 1, [p0, p1], 0);
        let cgp = game.to_cgp();
        let reparsed = Game::from_cgp(&cgp, ld, [kwg.clone(), kwg], [klv.clone(), klv], 1).unwrap();
        assert!(reparsed.board.is_empty());
        assert_eq!(reparsed.player_on_turn, 0);
    }

    #[test]
    fn parses_a_position_with_a_placed_word_and_racks() {
        let (ld, kwg, klv) = lexicon();
        let cgp = format!(
            "{dots}\n{dots}\n{dots}\n{dots}\n{dots}\n{dots}\n{dots}\nCAT............\n{dots}\n{dots}\n{dots}\n{dots}\n{dots}\n{dots}\n{dots} DOG/CATS 12/0 1",
            dots = ".".repeat(15)
        )
        .replace('\n', "/");
        let game = Game::from_cgp(&cgp, ld.clone(), [kwg.clone(), kwg], [klv.clone(), klv], 7).unwrap();
        assert_eq!(game.board.letter(7, 0), ld.parse_str("C", false).unwrap()[0]);
        assert_eq!(game.players[0].score, 12);
        assert_eq!(game.players[1].rack.len(), 4);
        assert_eq!(game.player_on_turn, 1);
    }

    #[test]
    fn rejects_a_cgp_string_missing_fields() {
        let (ld, kwg, klv) = lexicon();
        let result = Game::from_cgp("only one field", ld, [kwg.clone(), kwg], [klv.clone(), klv], 1);
        assert!(matches!(result, Err(Error::MalformedCgp(_))));
    }
}
