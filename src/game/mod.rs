//! Applies moves to a game state (board + bag + racks + scores +
//! end-conditions) with a bounded backup/undo stack, and the shared move
//! record types ([`Move`], [`MoveList`]) and statistics accumulator
//! ([`Stat`]) the rest of the engine is built on.

pub mod cgp;
pub mod moves;
pub mod stat;

pub use moves::{Move, MoveList, MoveRecordType, MoveSortType, PASS_MOVE_EQUITY};
pub use stat::Stat;

use crate::board::{cross_set, Board, Direction};
use crate::lexicon::{Klv, Kwg};
use crate::tiles::{Bag, LetterDistribution, Rack};
use crate::{is_blanked, unblank, MAX_SCORELESS_TURNS, MAX_SEARCH_DEPTH, PLAYED_THROUGH_MARKER};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEndReason {
    None,
    /// A player emptied their rack while the bag was also empty.
    Standard,
    /// `MAX_SCORELESS_TURNS` consecutive scoreless turns were played.
    ConsecutiveZeros,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub name: String,
    pub score: i32,
    pub rack: Rack,
    pub kwg: Arc<Kwg>,
    pub klv: Arc<Klv>,
    pub move_sort_type: MoveSortType,
    pub move_record_type: MoveRecordType,
}

impl Player {
    pub fn new(name: impl Into<String>, alphabet_size: usize, kwg: Arc<Kwg>, klv: Arc<Klv>) -> Self {
        Self {
            name: name.into(),
            score: 0,
            rack: Rack::empty(alphabet_size),
            kwg,
            klv,
            move_sort_type: MoveSortType::Equity,
            move_record_type: MoveRecordType::RecordBest,
        }
    }
}

#[derive(Debug, Clone)]
struct Backup {
    board: Board,
    bag: Bag,
    players: [Player; 2],
    player_on_turn: usize,
    consecutive_scoreless_turns: u8,
    game_end_reason: GameEndReason,
}

#[derive(Debug, Clone)]
pub struct Game {
    pub board: Board,
    pub bag: Bag,
    pub players: [Player; 2],
    pub ld: Arc<LetterDistribution>,
    pub player_on_turn: usize,
    pub starting_player: usize,
    pub consecutive_scoreless_turns: u8,
    pub game_end_reason: GameEndReason,
    backup_mode: bool,
    backup_stack: Vec<Backup>,
}

impl Game {
    pub fn new(ld: Arc<LetterDistribution>, bag_seed: u64, players: [Player; 2], starting_player: usize) -> Self {
        let mut board = Board::new();
        board.update_all_anchors();
        let mut bag = Bag::new(bag_seed);
        bag.reset(&ld);
        Self {
            board,
            bag,
            players,
            ld,
            player_on_turn: starting_player,
            starting_player,
            consecutive_scoreless_turns: 0,
            game_end_reason: GameEndReason::None,
            backup_mode: false,
            backup_stack: Vec::new(),
        }
    }

    pub fn set_backup_mode(&mut self, enabled: bool) {
        self.backup_mode = enabled;
        if !enabled {
            self.backup_stack.clear();
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.game_end_reason != GameEndReason::None
    }

    pub fn opponent(&self) -> usize {
        1 - self.player_on_turn
    }

    fn kwgs(&self) -> [&Kwg; 2] {
        [&self.players[0].kwg, &self.players[1].kwg]
    }

    fn push_backup(&mut self) {
        if !self.backup_mode {
            return;
        }
        debug_assert!(
            self.backup_stack.len() < MAX_SEARCH_DEPTH,
            "backup stack exceeded MAX_SEARCH_DEPTH"
        );
        self.backup_stack.push(Backup {
            board: self.board.clone(),
            bag: self.bag.clone(),
            players: self.players.clone(),
            player_on_turn: self.player_on_turn,
            consecutive_scoreless_turns: self.consecutive_scoreless_turns,
            game_end_reason: self.game_end_reason,
        });
    }

    /// Pops the most recent backup and restores every tracked field. Returns
    /// `false` if there was nothing to restore.
    pub fn unplay_last_move(&mut self) -> bool {
        match self.backup_stack.pop() {
            Some(b) => {
                self.board = b.board;
                self.bag = b.bag;
                self.players = b.players;
                self.player_on_turn = b.player_on_turn;
                self.consecutive_scoreless_turns = b.consecutive_scoreless_turns;
                self.game_end_reason = b.game_end_reason;
                true
            }
            None => false,
        }
    }

    /// Applies `mv` as the move for `player_on_turn`: writes tiles, updates
    /// the rack/score/bag, checks end-of-game conditions, and swaps the turn.
    pub fn play_move(&mut self, mv: &Move) {
        self.push_backup();
        match mv {
            Move::Placement { row, col, dir, tiles, tiles_played, score, .. } => {
                self.apply_placement(*row, *col, *dir, tiles, *tiles_played, *score);
            }
            Move::Exchange { tiles, .. } => self.apply_exchange(tiles),
            Move::Pass { .. } => {
                self.consecutive_scoreless_turns += 1;
            }
        }
        self.check_consecutive_zeros();
        self.player_on_turn = self.opponent();
    }

    fn apply_placement(&mut self, row: usize, col: usize, dir: Direction, tiles: &[u8], tiles_played: u8, score: i32) {
        let player = self.player_on_turn;
        let (dr, dc): (usize, usize) = match dir {
            Direction::Horizontal => (0, 1),
            Direction::Vertical => (1, 0),
        };
        for (i, &tile) in tiles.iter().enumerate() {
            let r = row + dr * i;
            let c = col + dc * i;
            if tile == PLAYED_THROUGH_MARKER {
                continue;
            }
            self.board.set_letter(r, c, tile);
            let removed = if is_blanked(tile) {
                self.players[player].rack.remove(0)
            } else {
                self.players[player].rack.remove(unblank(tile))
            };
            debug_assert!(removed, "placement used a tile not present on the rack");
        }
        for (i, &tile) in tiles.iter().enumerate() {
            if tile == PLAYED_THROUGH_MARKER {
                continue;
            }
            let r = row + dr * i;
            let c = col + dc * i;
            self.board.update_anchors(r, c);
        }
        {
            let kwgs = self.kwgs();
            cross_set::update_cross_set_for_move(kwgs, &self.ld, &mut self.board, row, col, dir, tiles.len());
        }
        self.players[player].score += score;
        self.consecutive_scoreless_turns = 0;
        let side = player;
        for _ in 0..tiles_played {
            if let Some(drawn) = self.bag.draw_random(side) {
                let _ = self.players[player].rack.add(drawn);
            }
        }
        if self.players[player].rack.is_empty() && self.bag.is_empty() {
            let opp = 1 - player;
            let opp_score = self.players[opp].rack.score(&self.ld);
            self.players[player].score += 2 * opp_score;
            self.game_end_reason = GameEndReason::Standard;
        }
    }

    fn apply_exchange(&mut self, tiles: &[u8]) {
        let player = self.player_on_turn;
        let side = player;
        for &tile in tiles {
            self.players[player].rack.remove(unblank(tile));
        }
        for _ in 0..tiles.len() {
            if let Some(drawn) = self.bag.draw_random(side) {
                let _ = self.players[player].rack.add(drawn);
            }
        }
        for &tile in tiles {
            self.bag.return_tile(unblank(tile), side);
        }
        self.consecutive_scoreless_turns += 1;
    }

    fn check_consecutive_zeros(&mut self) {
        if self.consecutive_scoreless_turns >= MAX_SCORELESS_TURNS as u8 {
            for p in 0..2 {
                let penalty = self.players[p].rack.score(&self.ld);
                self.players[p].score -= penalty;
            }
            self.game_end_reason = GameEndReason::ConsecutiveZeros;
        }
    }

    /// Recomputes every cross-set and anchor from scratch; used after
    /// loading a position (e.g. from CGP) rather than after a single move.
    pub fn recompute_all(&mut self) {
        self.board.update_all_anchors();
        let kwgs = self.kwgs();
        cross_set::gen_all_cross_sets(kwgs, &self.ld, &mut self.board);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::{Klv, Kwg, KwgBuilder};

    fn setup() -> (Game, Arc<Kwg>) {
        let ld = Arc::new(LetterDistribution::english());
        let mut builder = KwgBuilder::new();
        for w in ["CAT", "CATS", "DOG", "AA", "TA"] {
            builder.add_word(&ld.parse_str(w, false).unwrap());
        }
        let kwg = Arc::new(builder.build());
        let klv = Arc::new(Klv::synthetic(&ld, 3));
        let p0 = Player::new("p0", ld.size(), kwg.clone(), klv.clone());
        let p1 = Player::new("p1", ld.size(), kwg.clone(), klv.clone());
        let game = Game::new(ld, 99, [p0, p1], 0);
        (game, kwg)
    }

    #[test]
    fn placement_updates_score_rack_and_bag() {
        let (mut game, _kwg) = setup();
        game.set_backup_mode(true);
        let cat = game.ld.parse_str("CAT", false).unwrap();
        for &ml in &cat {
            game.players[0].rack.add(ml).unwrap();
        }
        let rack_before = game.players[0].rack.len();
        let bag_before = game.bag.tiles_remaining();
        let mv = Move::Placement {
            row: 7,
            col: 7,
            dir: Direction::Horizontal,
            tiles: cat.clone(),
            tiles_played: 3,
            score: 10,
            equity: 10.0,
        };
        game.play_move(&mv);
        assert_eq!(game.players[0].score, 10);
        assert_eq!(game.board.letter(7, 7), cat[0]);
        assert_eq!(game.players[0].rack.len(), rack_before);
        assert_eq!(game.bag.tiles_remaining(), bag_before - 3);
        assert_eq!(game.player_on_turn, 1);
    }

    #[test]
    fn unplay_restores_board_bag_and_rack() {
        let (mut game, _kwg) = setup();
        game.set_backup_mode(true);
        let cat = game.ld.parse_str("CAT", false).unwrap();
        for &ml in &cat {
            game.players[0].rack.add(ml).unwrap();
        }
        let snapshot_rack = game.players[0].rack.clone();
        let snapshot_score = game.players[0].score;
        let mv = Move::Placement {
            row: 7,
            col: 7,
            dir: Direction::Horizontal,
            tiles: cat,
            tiles_played: 3,
            score: 10,
            equity: 10.0,
        };
        game.play_move(&mv);
        assert!(game.unplay_last_move());
        assert_eq!(game.players[0].rack, snapshot_rack);
        assert_eq!(game.players[0].score, snapshot_score);
        assert!(game.board.is_empty());
        assert_eq!(game.player_on_turn, 0);
    }

    #[test]
    fn consecutive_scoreless_turns_end_the_game() {
        let (mut game, _kwg) = setup();
        for _ in 0..MAX_SCORELESS_TURNS {
            game.play_move(&Move::pass(PASS_MOVE_EQUITY));
        }
        assert_eq!(game.game_end_reason, GameEndReason::ConsecutiveZeros);
    }

    #[test]
    fn exchange_increments_scoreless_counter_and_keeps_bag_size() {
        let (mut game, _kwg) = setup();
        let a = game.ld.parse_str("A", false).unwrap()[0];
        game.players[0].rack.add(a).unwrap();
        let bag_before = game.bag.tiles_remaining();
        game.play_move(&Move::Exchange { tiles: vec![a], equity: 0.0 });
        assert_eq!(game.consecutive_scoreless_turns, 1);
        assert_eq!(game.bag.tiles_remaining(), bag_before);
    }

    #[test]
    fn a_scoring_placement_resets_the_scoreless_counter() {
        let (mut game, _kwg) = setup();
        game.play_move(&Move::pass(PASS_MOVE_EQUITY));
        game.play_move(&Move::pass(PASS_MOVE_EQUITY));
        assert_eq!(game.consecutive_scoreless_turns, 2);

        let cat = game.ld.parse_str("CAT", false).unwrap();
        for &ml in &cat {
            game.players[game.player_on_turn].rack.add(ml).unwrap();
        }
        let mv = Move::Placement {
            row: 7,
            col: 7,
            dir: Direction::Horizontal,
            tiles: cat,
            tiles_played: 3,
            score: 10,
            equity: 10.0,
        };
        game.play_move(&mv);
        assert_eq!(game.consecutive_scoreless_turns, 0);
        assert_eq!(game.game_end_reason, GameEndReason::None);
    }
}
