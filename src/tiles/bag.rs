//! Tile multiset with deterministic PRNG-driven draw/return.
//!
//! A flat array of tile bytes plus `start`/`end` cursors over the half-open
//! "in the bag" range `[start, end)`. Player 0 draws from the `end` side, player 1 from the `start`
//! side, so a game and its starter-swapped mirror draw identical tiles in
//! reverse, making paired games exactly reproducible. Shuffling and all
//! draws are driven by a `rand_xoshiro` xoshiro256** stream, which supports
//! `jump()` for non-overlapping per-worker substreams (see
//! [`Bag::seed_for_worker`]).

use crate::tiles::distribution::LetterDistribution;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

#[derive(Debug, Clone)]
pub struct Bag {
    tiles: Vec<u8>,
    start: usize,
    end: usize,
    rng: Xoshiro256StarStar,
}

/// Which side of the bag a player draws/returns tiles from. 0 draws from the
/// end, 1 draws from the start; this is what makes mirrored games reproducible.
pub type PlayerSide = usize;

impl Bag {
    /// Build an empty bag seeded deterministically; call [`Bag::reset`] to fill it.
    pub fn new(seed: u64) -> Self {
        Self {
            tiles: Vec::new(),
            start: 0,
            end: 0,
            rng: Xoshiro256StarStar::seed_from_u64(seed),
        }
    }

    /// Refill per `ld`'s per-letter counts and shuffle.
    pub fn reset(&mut self, ld: &LetterDistribution) {
        self.tiles.clear();
        for ml in 0..ld.size() as u8 {
            for _ in 0..ld.count(ml) {
                self.tiles.push(ml);
            }
        }
        self.start = 0;
        self.end = self.tiles.len();
        self.shuffle();
    }

    pub fn tiles_remaining(&self) -> usize {
        self.end - self.start
    }
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Fisher-Yates over `[start, end)`.
    pub fn shuffle(&mut self) {
        if self.end - self.start > 1 {
            self.tiles[self.start..self.end].shuffle(&mut self.rng);
        }
    }

    /// Draw a uniformly random tile from `player_side`'s end of the bag.
    pub fn draw_random(&mut self, player_side: PlayerSide) -> Option<u8> {
        if self.is_empty() {
            return None;
        }
        if player_side == 0 {
            self.end -= 1;
            Some(self.tiles[self.end])
        } else {
            let letter = self.tiles[self.start];
            self.start += 1;
            Some(letter)
        }
    }

    /// Draw a specific letter (blank-folded) from anywhere in the active
    /// range, swapping with that side's edge tile.
    pub fn draw_specific(&mut self, letter: u8, player_side: PlayerSide) -> Option<u8> {
        let letter = crate::unblank(letter);
        let pos = (self.start..self.end).find(|&i| self.tiles[i] == letter)?;
        if player_side == 0 {
            self.end -= 1;
            self.tiles.swap(pos, self.end);
        } else {
            self.tiles.swap(pos, self.start);
            self.start += 1;
        }
        Some(letter)
    }

    /// Return a tile into the bag at a random position within the active
    /// range via a Fisher-Yates-style splice: the freed slot just outside the
    /// active window absorbs whatever tile was displaced.
    pub fn return_tile(&mut self, letter: u8, player_side: PlayerSide) {
        let letter = crate::unblank(letter);
        let remaining = self.tiles_remaining();
        let mut insert_at = if player_side == 0 {
            self.start as isize
        } else {
            self.start as isize - 1
        };
        if remaining > 0 {
            insert_at += self.rng.random_range(0..=remaining) as isize;
        }
        let insert_at = insert_at as usize;
        if player_side == 0 {
            self.tiles[self.end] = self.tiles[insert_at];
            self.end += 1;
        } else {
            self.tiles[self.start - 1] = self.tiles[insert_at];
            self.start -= 1;
        }
        self.tiles[insert_at] = letter;
    }

    /// Reseed, then advance the stream by `jump()`ing `worker_id` times so
    /// each worker's draws are from a non-overlapping substream.
    pub fn seed_for_worker(&mut self, seed: u64, worker_id: usize) {
        self.rng = Xoshiro256StarStar::seed_from_u64(seed);
        for _ in 0..worker_id {
            self.rng.jump();
        }
    }

    /// All machine letters currently in the bag, counted — the "bag-as-rack"
    /// universe of unseen tiles used by the inference engine.
    pub fn as_counts(&self, alphabet_size: usize) -> Vec<u16> {
        let mut counts = vec![0u16; alphabet_size];
        for &ml in &self.tiles[self.start..self.end] {
            counts[ml as usize] += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_fills_to_total_tile_count() {
        let ld = LetterDistribution::english();
        let mut bag = Bag::new(42);
        bag.reset(&ld);
        assert_eq!(bag.tiles_remaining(), ld.total_tiles());
    }

    #[test]
    fn draw_from_each_side_shrinks_range() {
        let ld = LetterDistribution::english();
        let mut bag = Bag::new(7);
        bag.reset(&ld);
        let before = bag.tiles_remaining();
        bag.draw_random(0);
        bag.draw_random(1);
        assert_eq!(bag.tiles_remaining(), before - 2);
    }

    #[test]
    fn reproducible_sequence_with_fixed_seed() {
        let ld = LetterDistribution::english();
        let mut a = Bag::new(1234);
        let mut b = Bag::new(1234);
        a.reset(&ld);
        b.reset(&ld);
        for _ in 0..10 {
            assert_eq!(a.draw_random(0), b.draw_random(0));
        }
    }

    #[test]
    fn worker_seeding_is_non_overlapping() {
        let ld = LetterDistribution::english();
        let mut a = Bag::new(0);
        let mut b = Bag::new(0);
        a.reset(&ld);
        b.reset(&ld);
        a.seed_for_worker(99, 0);
        b.seed_for_worker(99, 1);
        let draws_a: Vec<u8> = (0..5).filter_map(|_| a.draw_random(0)).collect();
        let draws_b: Vec<u8> = (0..5).filter_map(|_| b.draw_random(0)).collect();
        assert_ne!(draws_a, draws_b);
    }

    #[test]
    fn draw_specific_removes_exact_letter() {
        let ld = LetterDistribution::english();
        let mut bag = Bag::new(3);
        bag.reset(&ld);
        let ml = ld.parse_str("Q", false).unwrap()[0];
        let drawn = bag.draw_specific(ml, 0);
        assert_eq!(drawn, Some(ml));
    }

    #[test]
    fn return_tile_grows_range() {
        let ld = LetterDistribution::english();
        let mut bag = Bag::new(3);
        bag.reset(&ld);
        let before = bag.tiles_remaining();
        let t = bag.draw_random(0).unwrap();
        bag.return_tile(t, 0);
        assert_eq!(bag.tiles_remaining(), before);
    }
}
