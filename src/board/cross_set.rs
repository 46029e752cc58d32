//! Cross-set generator: recomputes which letters are legal at an empty
//! square given the perpendicular word (if any) that a placement there would
//! complete.
//!
//! Grounded on the KWG's `cross_root_arc()` trie (see `lexicon::kwg`), which
//! indexes, for every word and every letter position `i` in it, the sequence
//! `reverse(word[..i]) . SEPARATION . word[i+1..] . word[i]` (accepting at
//! the end). Walking that same sequence — letters immediately above the
//! square nearest-first, a separation edge, then letters immediately below
//! nearest-first — lands on a node whose `letter_set` is exactly the set of
//! middle letters that complete a valid word.

use super::{Board, Direction, TRIVIAL_CROSS_SET};
use crate::lexicon::kwg::{Kwg, SEPARATION_TILE};
use crate::tiles::LetterDistribution;
use crate::{unblank, BOARD_DIM};

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Horizontal => Direction::Vertical,
            Direction::Vertical => Direction::Horizontal,
        }
    }
}

/// Walks outward from `(row, col)` along the axis perpendicular to `dir`,
/// returning `(above, below)` letter runs, each ordered nearest-square-first.
/// "Above" means decreasing index on that axis, "below" increasing.
fn perpendicular_run(board: &Board, row: usize, col: usize, dir: Direction) -> (Vec<u8>, Vec<u8>) {
    let mut above = Vec::new();
    let mut below = Vec::new();
    match dir {
        Direction::Horizontal => {
            let mut r = row as isize - 1;
            while r >= 0 && !board.is_empty_square(r as usize, col) {
                above.push(board.letter(r as usize, col));
                r -= 1;
            }
            let mut r = row + 1;
            while r < BOARD_DIM && !board.is_empty_square(r, col) {
                below.push(board.letter(r, col));
                r += 1;
            }
        }
        Direction::Vertical => {
            let mut c = col as isize - 1;
            while c >= 0 && !board.is_empty_square(row, c as usize) {
                above.push(board.letter(row, c as usize));
                c -= 1;
            }
            let mut c = col + 1;
            while c < BOARD_DIM && !board.is_empty_square(row, c) {
                below.push(board.letter(row, c));
                c += 1;
            }
        }
    }
    (above, below)
}

/// Recomputes the cross-set and cross-score at one square for one generation
/// direction and player. `dir` is the direction a move would be generated
/// in; the perpendicular word runs along `dir.opposite()`.
pub fn gen_cross_set(
    kwg: &Kwg,
    ld: &LetterDistribution,
    board: &mut Board,
    row: usize,
    col: usize,
    dir: Direction,
    player: usize,
) {
    let (above, below) = perpendicular_run(board, row, col, dir);
    if above.is_empty() && below.is_empty() {
        board.set_cross_set(row, col, dir, player, TRIVIAL_CROSS_SET);
        board.set_cross_score(row, col, dir, player, 0);
        return;
    }
    let mut node = kwg.cross_root_arc();
    for &ml in &above {
        node = kwg.next(node, unblank(ml));
    }
    node = kwg.next(node, SEPARATION_TILE);
    for &ml in &below {
        node = kwg.next(node, unblank(ml));
    }
    let mask = kwg.letter_set(node);
    let score: i32 = above
        .iter()
        .chain(below.iter())
        .map(|&ml| if crate::is_blanked(ml) { 0 } else { ld.score(unblank(ml)) })
        .sum();
    board.set_cross_set(row, col, dir, player, mask);
    board.set_cross_score(row, col, dir, player, score);
}

/// Recomputes every square's cross-set, for both directions and both
/// players. `kwgs[p]` is the KWG player `p` plays against (the two may
/// differ when players use different lexicons).
pub fn gen_all_cross_sets(kwgs: [&Kwg; 2], ld: &LetterDistribution, board: &mut Board) {
    for row in 0..BOARD_DIM {
        for col in 0..BOARD_DIM {
            if !board.is_empty_square(row, col) {
                continue;
            }
            for player in 0..2 {
                gen_cross_set(kwgs[player], ld, board, row, col, Direction::Horizontal, player);
                gen_cross_set(kwgs[player], ld, board, row, col, Direction::Vertical, player);
            }
        }
    }
}

/// After placing a word of `length` tiles starting at `(row, col)` in
/// direction `dir`, recomputes only the cross-sets that could have changed:
/// the squares immediately above/below each newly covered column (whose
/// `dir`-cross-set reads through the new tile), and the squares immediately
/// before/after the word on its own row (whose `dir.opposite()`-cross-set
/// now sees a longer perpendicular run).
pub fn update_cross_set_for_move(
    kwgs: [&Kwg; 2],
    ld: &LetterDistribution,
    board: &mut Board,
    row: usize,
    col: usize,
    dir: Direction,
    length: usize,
) {
    let perp = dir.opposite();
    let (dr, dc): (isize, isize) = match dir {
        Direction::Horizontal => (1, 0),
        Direction::Vertical => (0, 1),
    };
    for i in 0..length {
        let (r, c) = match dir {
            Direction::Horizontal => (row, col + i),
            Direction::Vertical => (row + i, col),
        };
        for sign in [-1isize, 1isize] {
            let nr = r as isize + dr * sign;
            let nc = c as isize + dc * sign;
            if nr >= 0 && nc >= 0 && (nr as usize) < BOARD_DIM && (nc as usize) < BOARD_DIM {
                let (nr, nc) = (nr as usize, nc as usize);
                if board.is_empty_square(nr, nc) {
                    for player in 0..2 {
                        gen_cross_set(kwgs[player], ld, board, nr, nc, dir, player);
                    }
                }
            }
        }
    }
    let (before, after) = match dir {
        Direction::Horizontal => ((row as isize, col as isize - 1), (row as isize, (col + length) as isize)),
        Direction::Vertical => ((row as isize - 1, col as isize), ((row + length) as isize, col as isize)),
    };
    for (r, c) in [before, after] {
        if r >= 0 && c >= 0 && (r as usize) < BOARD_DIM && (c as usize) < BOARD_DIM {
            let (r, c) = (r as usize, c as usize);
            if board.is_empty_square(r, c) {
                for player in 0..2 {
                    gen_cross_set(kwgs[player], ld, board, r, c, perp, player);
                }
            }
        }
    }
}
