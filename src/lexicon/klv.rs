//! Leave-value lookup: expected score adjustment for holding a given set of
//! unplayed tiles.
//!
//! Storage mirrors the KWG: a trie over sorted machine-letter sequences
//! ("leaves"), flattened so every accepting node gets a dense preorder rank,
//! and a parallel `leave_value` array indexed by that rank.
//!
//! The real leave-value table is tens of thousands of tournament-tuned
//! floats shipped as an external data file; that file format is out of
//! scope here. In its place [`Klv::synthetic`] populates a reduced table
//! (leaves up to a configurable length) from a simple, self-consistent
//! heuristic, so the lookup contract — same multiset, same value — is still
//! exercisable end to end.

use crate::combinatorics::for_each_multiset;
use crate::tiles::{LetterDistribution, Rack};
use std::collections::BTreeMap;

struct BuildNode {
    children: BTreeMap<u8, usize>,
    accept: bool,
    letters: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct Klv {
    child_letter: Vec<Vec<u8>>,
    child_node: Vec<Vec<u32>>,
    /// Preorder rank of each node if it is an accepting leave, else `None`.
    rank: Vec<Option<u32>>,
    leave_value: Vec<f32>,
}

impl Klv {
    /// Builds a reduced, self-consistent leave-value table: every multiset of
    /// 1 to `max_len` letters (bounded by `ld`'s per-letter counts) is scored
    /// by a heuristic (rare, high-scoring letters are a liability to hold;
    /// vowels are mildly favored) and indexed.
    pub fn synthetic(ld: &LetterDistribution, max_len: usize) -> Self {
        let mut arena: Vec<BuildNode> = vec![BuildNode {
            children: BTreeMap::new(),
            accept: false,
            letters: Vec::new(),
        }];
        let caps: Vec<u8> = (0..ld.size() as u8)
            .map(|ml| ld.count(ml).min(crate::RACK_SIZE as u16) as u8)
            .collect();

        for_each_multiset(&caps, 1, max_len, |seq| {
            let mut cur = 0usize;
            for &ml in seq {
                cur = match arena[cur].children.get(&ml).copied() {
                    Some(id) => id,
                    None => {
                        let id = arena.len();
                        let mut letters = arena[cur].letters.clone();
                        letters.push(ml);
                        arena.push(BuildNode {
                            children: BTreeMap::new(),
                            accept: false,
                            letters,
                        });
                        arena[cur].children.insert(ml, id);
                        id
                    }
                };
            }
            arena[cur].accept = true;
        });

        let mut child_letter = vec![Vec::new(); arena.len()];
        let mut child_node = vec![Vec::new(); arena.len()];
        for (id, node) in arena.iter().enumerate() {
            for (&letter, &child) in &node.children {
                child_letter[id].push(letter);
                child_node[id].push(child as u32);
            }
        }

        let mut rank = vec![None; arena.len()];
        let mut next_rank = 0u32;
        assign_ranks(0, &child_node, &arena, &mut rank, &mut next_rank);

        let mut leave_value = vec![0.0f32; next_rank as usize];
        for (id, node) in arena.iter().enumerate() {
            if let Some(r) = rank[id] {
                leave_value[r as usize] = synthetic_value(ld, &node.letters);
            }
        }

        Self {
            child_letter,
            child_node,
            rank,
            leave_value,
        }
    }

    /// Looks up the value of holding exactly `rack`'s tiles. Returns `0.0`
    /// if this leave isn't in the table (including the empty rack).
    pub fn klv_value(&self, rack: &Rack) -> f32 {
        let mut seq = Vec::new();
        for (ml, &count) in rack.counts().iter().enumerate() {
            for _ in 0..count {
                seq.push(ml as u8);
            }
        }
        seq.sort_unstable();
        let mut node = 0usize;
        for &letter in &seq {
            match self.find_child(node, letter) {
                Some(n) => node = n,
                None => return 0.0,
            }
        }
        match self.rank[node] {
            Some(r) => self.leave_value[r as usize],
            None => 0.0,
        }
    }

    fn find_child(&self, node: usize, letter: u8) -> Option<usize> {
        self.child_letter[node]
            .iter()
            .position(|&l| l == letter)
            .map(|i| self.child_node[node][i] as usize)
    }
}

fn assign_ranks(
    node: usize,
    child_node: &[Vec<u32>],
    arena: &[BuildNode],
    rank: &mut [Option<u32>],
    next_rank: &mut u32,
) {
    if arena[node].accept {
        rank[node] = Some(*next_rank);
        *next_rank += 1;
    }
    for &child in &child_node[node] {
        assign_ranks(child as usize, child_node, arena, rank, next_rank);
    }
}

fn synthetic_value(ld: &LetterDistribution, leave: &[u8]) -> f32 {
    let mut value = 0.0f32;
    for &ml in leave {
        let score = ld.score(ml) as f32;
        value += if ld.is_vowel(ml) { 0.5 } else { 0.0 } - score * 0.1;
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unindexed_leave_returns_zero() {
        let ld = LetterDistribution::english();
        let klv = Klv::synthetic(&ld, 2);
        let rack = Rack::set_from_string(&ld, "QZXJK").unwrap();
        assert_eq!(klv.klv_value(&rack), 0.0);
    }

    #[test]
    fn single_letter_leaves_are_indexed() {
        let ld = LetterDistribution::english();
        let klv = Klv::synthetic(&ld, 2);
        let rack = Rack::set_from_string(&ld, "E").unwrap();
        assert_ne!(klv.klv_value(&rack), 0.0);
    }

    #[test]
    fn identical_multisets_yield_identical_value() {
        let ld = LetterDistribution::english();
        let klv = Klv::synthetic(&ld, 2);
        let a = Rack::set_from_string(&ld, "AE").unwrap();
        let b = Rack::set_from_string(&ld, "EA").unwrap();
        assert_eq!(klv.klv_value(&a), klv.klv_value(&b));
    }

    #[test]
    fn empty_rack_is_zero() {
        let ld = LetterDistribution::english();
        let klv = Klv::synthetic(&ld, 2);
        let rack = Rack::empty(ld.size());
        assert_eq!(klv.klv_value(&rack), 0.0);
    }
}
