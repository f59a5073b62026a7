//! Trie vertex: owned children keyed by character, an optional terminal
//! word, and the per-token visited markers used by in-flight searches.

use std::collections::HashMap;

use parking_lot::Mutex;
use smallvec::SmallVec;

use crate::pool::Token;

/// Visited query positions for one token index.
///
/// The generation stamp ties the slot to a specific holder of the index;
/// a slot left behind by a released token carries an older stamp and is
/// reclaimed lazily on the next touch.
struct VisitedSlot {
    generation: u64,
    positions: SmallVec<[u32; 8]>,
}

/// A single trie vertex. The root owns the whole tree: every node is
/// exclusively owned by its parent and lives for the trie's lifetime.
pub(crate) struct Node {
    children: HashMap<char, Node>,
    /// Original (uncollapsed) inserted word, set exactly once.
    word: Option<String>,
    /// Distance from the root.
    depth: usize,
    /// Keyed by token index. Only the search holding a given token touches
    /// that token's slot; the mutex spans one check-and-insert, never a
    /// recursion.
    visited: Mutex<HashMap<u8, VisitedSlot>>,
}

impl Node {
    pub(crate) fn new(depth: usize) -> Self {
        Self {
            children: HashMap::new(),
            word: None,
            depth,
            visited: Mutex::new(HashMap::new()),
        }
    }

    #[inline]
    pub(crate) fn child(&self, c: char) -> Option<&Node> {
        self.children.get(&c)
    }

    pub(crate) fn child_or_insert(&mut self, c: char) -> &mut Node {
        let depth = self.depth + 1;
        self.children.entry(c).or_insert_with(|| Node::new(depth))
    }

    pub(crate) fn children(&self) -> impl Iterator<Item = &Node> {
        self.children.values()
    }

    #[inline]
    pub(crate) fn word(&self) -> Option<&str> {
        self.word.as_deref()
    }

    /// Sets the terminal word if unset; first writer wins. Returns whether
    /// the word was newly set.
    pub(crate) fn set_word(&mut self, word: &str) -> bool {
        if self.word.is_none() {
            self.word = Some(word.to_owned());
            true
        } else {
            false
        }
    }

    #[cfg(test)]
    pub(crate) fn depth(&self) -> usize {
        self.depth
    }

    /// Nodes in this subtree, this one included.
    pub(crate) fn subtree_size(&self) -> usize {
        1 + self.children.values().map(Node::subtree_size).sum::<usize>()
    }

    /// Records `position` as processed at this node for the given token.
    ///
    /// Returns `false` when the position was already recorded, meaning a
    /// reconverging branch of the same search got here first and the caller
    /// must not expand this state again.
    pub(crate) fn mark_visited(&self, token: &Token<'_>, position: u32) -> bool {
        let mut visited = self.visited.lock();
        let slot = visited.entry(token.index()).or_insert_with(|| VisitedSlot {
            generation: token.generation(),
            positions: SmallVec::new(),
        });
        if slot.generation != token.generation() {
            // Leftover from a previous holder of this index.
            slot.generation = token.generation();
            slot.positions.clear();
        }
        if slot.positions.contains(&position) {
            return false;
        }
        slot.positions.push(position);
        true
    }
}
