//! Immutable directed word graph: accepts node, letter, child pointers, accept/end bits.
//!
//! A node is a packed `u32`: `tile` (6 bits), `accept` (1 bit), `end` (1 bit),
//! `arc` (22 bits, the index where this node's children's sibling group
//! begins). Siblings for a given parent are contiguous starting at
//! `arc(parent)`; `end(i)` marks the last sibling in a group. Lookups are a
//! linear scan through a sibling group (groups are small in practice).
//!
//! Two entry points live in the same flat node array: [`Kwg::root_arc`] for
//! plain forward word lookup (move legality, the `ACCEPTS`/`IN_LETTER_SET`
//! queries used while walking the board), and [`Kwg::cross_root_arc`] for the
//! reverse-prefix + [`SEPARATION_TILE`] + suffix form that the cross-set
//! generator (board §4.F/4.H) walks to recover "legal middle letters" without
//! enumerating them. Building both from the same word list into one array
//! keeps a single `Kwg` the unit of distribution, matching the spec's
//! "one KWG" contract, while avoiding a full GADDAG's per-letter separator
//! blowup.

/// Reserved machine-letter value used only inside cross-set traversal paths;
/// never appears in a rack or on the board.
pub const SEPARATION_TILE: u8 = 31;

const ARC_BITS: u32 = 22;
const ARC_MASK: u32 = (1 << ARC_BITS) - 1;
const ACCEPT_BIT: u32 = 1 << ARC_BITS;
const END_BIT: u32 = 1 << (ARC_BITS + 1);
const TILE_SHIFT: u32 = ARC_BITS + 2;

fn pack(tile: u8, arc: u32, accept: bool, end: bool) -> u32 {
    debug_assert!(arc <= ARC_MASK, "arc index overflowed 22 bits");
    let mut node = (tile as u32) << TILE_SHIFT;
    node |= arc & ARC_MASK;
    if accept {
        node |= ACCEPT_BIT;
    }
    if end {
        node |= END_BIT;
    }
    node
}

#[derive(Debug, Clone)]
pub struct Kwg {
    nodes: Vec<u32>,
    root: u32,
    cross_root: u32,
}

impl Kwg {
    pub fn tile(&self, node: u32) -> u8 {
        (self.nodes[node as usize] >> TILE_SHIFT) as u8
    }
    pub fn arc(&self, node: u32) -> u32 {
        self.nodes[node as usize] & ARC_MASK
    }
    pub fn accept(&self, node: u32) -> bool {
        self.nodes[node as usize] & ACCEPT_BIT != 0
    }
    pub fn end(&self, node: u32) -> bool {
        self.nodes[node as usize] & END_BIT != 0
    }
    pub fn root_arc(&self) -> u32 {
        self.root
    }
    pub fn cross_root_arc(&self) -> u32 {
        self.cross_root
    }

    /// Walk siblings from `arc(node)` until `tile == letter` or the end bit is
    /// set; returns the matching sibling's child arc, or `0` if not found.
    pub fn next(&self, node: u32, letter: u8) -> u32 {
        if node == 0 {
            return 0;
        }
        let mut i = node;
        loop {
            if self.tile(i) == letter {
                return self.arc(i);
            }
            if self.end(i) {
                return 0;
            }
            i += 1;
        }
    }

    /// Whether `letter` accepts (ends a valid word/entry) within the sibling
    /// group starting at `node`.
    pub fn in_letter_set(&self, node: u32, letter: u8) -> bool {
        if node == 0 {
            return false;
        }
        let mut i = node;
        loop {
            if self.accept(i) && self.tile(i) == letter {
                return true;
            }
            if self.end(i) {
                return false;
            }
            i += 1;
        }
    }

    /// Like [`Kwg::next`], but distinguishes "no such edge" from "edge
    /// exists but leads to a childless leaf" (which `next` both report as
    /// `0`). Returns the child arc (possibly `0`) if `letter` is present in
    /// the sibling group at `node`.
    pub fn find(&self, node: u32, letter: u8) -> Option<u32> {
        if node == 0 {
            return None;
        }
        let mut i = node;
        loop {
            if self.tile(i) == letter {
                return Some(self.arc(i));
            }
            if self.end(i) {
                return None;
            }
            i += 1;
        }
    }

    /// Every `(tile, child_arc, accept)` triple in the sibling group at `node`.
    pub fn children(&self, node: u32) -> Vec<(u8, u32, bool)> {
        if node == 0 {
            return Vec::new();
        }
        let mut out = Vec::new();
        let mut i = node;
        loop {
            out.push((self.tile(i), self.arc(i), self.accept(i)));
            if self.end(i) {
                break;
            }
            i += 1;
        }
        out
    }

    /// Bitmask of all accepted letter indices across the sibling group at `node`.
    pub fn letter_set(&self, node: u32) -> u64 {
        if node == 0 {
            return 0;
        }
        let mut mask = 0u64;
        let mut i = node;
        loop {
            if self.accept(i) {
                mask |= 1u64 << self.tile(i);
            }
            if self.end(i) {
                break;
            }
            i += 1;
        }
        mask
    }

    /// Forward word-acceptance check: does this KWG accept `word` as a complete entry?
    pub fn accepts(&self, word: &[u8]) -> bool {
        let mut node = self.root_arc();
        let mut i = 0;
        loop {
            if node == 0 {
                return false;
            }
            let letter = word[i];
            let found = {
                let mut c = node;
                loop {
                    if self.tile(c) == letter {
                        break Some(c);
                    }
                    if self.end(c) {
                        break None;
                    }
                    c += 1;
                }
            };
            match found {
                None => return false,
                Some(c) => {
                    i += 1;
                    if i == word.len() {
                        return self.accept(c);
                    }
                    node = self.arc(c);
                }
            }
        }
    }
}

/// Builds a [`Kwg`] from a word list, materializing both the forward trie and
/// the cross-set trie described above.
pub struct KwgBuilder {
    words: Vec<Vec<u8>>,
}

impl KwgBuilder {
    pub fn new() -> Self {
        Self { words: Vec::new() }
    }

    pub fn add_word(&mut self, word: &[u8]) -> &mut Self {
        self.words.push(word.to_vec());
        self
    }

    pub fn build(&self) -> Kwg {
        let mut forward = Trie::new();
        let mut cross = Trie::new();
        for word in &self.words {
            forward.insert(word);
            let len = word.len();
            for i in 0..len {
                let mut seq: Vec<u8> = word[..i].iter().rev().copied().collect();
                seq.push(SEPARATION_TILE);
                seq.extend_from_slice(&word[i + 1..len]);
                seq.push(word[i]);
                cross.insert(&seq);
            }
        }
        // Index 0 is reserved as the "no such sibling group" sentinel that
        // `next`/`in_letter_set`/`letter_set`/`accepts` all test against, so a
        // legitimate sibling group (e.g. the forward trie's own root) must
        // never be flattened to start there.
        let mut nodes = vec![0u32];
        let root = forward.flatten(&mut nodes, 0);
        let cross_root = cross.flatten(&mut nodes, 0);
        Kwg {
            nodes,
            root,
            cross_root,
        }
    }
}

impl Default for KwgBuilder {
    fn default() -> Self {
        Self::new()
    }
}

struct TrieNode {
    children: std::collections::BTreeMap<u8, usize>,
    accept: bool,
}

struct Trie {
    arena: Vec<TrieNode>,
}

impl Trie {
    fn new() -> Self {
        Self {
            arena: vec![TrieNode {
                children: Default::default(),
                accept: false,
            }],
        }
    }

    fn insert(&mut self, seq: &[u8]) {
        let mut cur = 0usize;
        for &letter in seq {
            if let Some(&next) = self.arena[cur].children.get(&letter) {
                cur = next;
            } else {
                let id = self.arena.len();
                self.arena.push(TrieNode {
                    children: Default::default(),
                    accept: false,
                });
                self.arena[cur].children.insert(letter, id);
                cur = id;
            }
        }
        self.arena[cur].accept = true;
    }

    /// Flattens the subtree rooted at `trie_id` into `nodes`, returning the
    /// arc index of `trie_id`'s children's sibling group (0 if childless).
    fn flatten(&self, nodes: &mut Vec<u32>, trie_id: usize) -> u32 {
        let children: Vec<(u8, usize)> = self.arena[trie_id]
            .children
            .iter()
            .map(|(&l, &id)| (l, id))
            .collect();
        if children.is_empty() {
            return 0;
        }
        let start = nodes.len() as u32;
        for _ in &children {
            nodes.push(0);
        }
        let last = children.len() - 1;
        for (i, (letter, child_id)) in children.iter().enumerate() {
            let child_arc = self.flatten(nodes, *child_id);
            let accept = self.arena[*child_id].accept;
            nodes[start as usize + i] = pack(*letter, child_arc, accept, i == last);
        }
        start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Kwg {
        let mut b = KwgBuilder::new();
        for w in ["CAT", "CATS", "CAB", "DOG", "DO"] {
            b.add_word(w.as_bytes());
        }
        b.build()
    }

    fn ml(c: u8) -> u8 {
        c - b'A' + 1
    }
    fn mls(s: &str) -> Vec<u8> {
        s.bytes().map(ml).collect()
    }

    #[test]
    fn accepts_inserted_words() {
        let kwg = sample();
        assert!(kwg.accepts(&mls("CAT")));
        assert!(kwg.accepts(&mls("CATS")));
        assert!(kwg.accepts(&mls("DOG")));
        assert!(kwg.accepts(&mls("DO")));
    }

    #[test]
    fn rejects_non_words_and_partial_prefixes() {
        let kwg = sample();
        assert!(!kwg.accepts(&mls("CA")));
        assert!(!kwg.accepts(&mls("CATZ")));
        assert!(!kwg.accepts(&mls("ZZZ")));
    }

    #[test]
    fn next_walks_forward_trie() {
        let kwg = sample();
        let c = kwg.next(kwg.root_arc(), ml(b'C'));
        assert_ne!(c, 0);
        let a = kwg.next(c, ml(b'A'));
        assert_ne!(a, 0);
        let t = kwg.next(a, ml(b'T'));
        assert_ne!(t, 0);
    }

    #[test]
    fn cross_set_middle_letters_for_cat_and_cab() {
        // top = "" (empty), bottom = "AT" read forward after the mid letter in CAT,
        // i.e. looking for X such that X + "AT" or X + "AB" is a word: C.
        let kwg = sample();
        let mut node = kwg.cross_root_arc();
        node = kwg.next(node, SEPARATION_TILE);
        node = kwg.next(node, ml(b'A'));
        node = kwg.next(node, ml(b'T'));
        let set = kwg.letter_set(node);
        assert_ne!(set & (1u64 << ml(b'C')), 0);
        assert_eq!(set & (1u64 << ml(b'D')), 0);
    }
}
