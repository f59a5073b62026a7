//! # septrie
//!
//! A concurrent, separator-aware prefix trie for resolving partial or
//! loosely formatted text queries against an in-memory vocabulary.
//!
//! Designated separator characters (spaces, underscores, ...) are collapsed
//! on insertion and optional during search: `"new york"` and `"new  york"`
//! share one node path, and a query may carry more or fewer separators than
//! the stored word. Up to 32 searches may run concurrently against a shared
//! trie; each holds an exclusive traversal token that keeps its visited
//! bookkeeping isolated from the others and is reclaimed when the match
//! iterator is dropped.
//!
//! ## Example
//!
//! ```rust
//! use septrie::Trie;
//!
//! let mut trie = Trie::with_separators([' ']);
//! trie.add("new york").unwrap();
//! trie.add("new jersey").unwrap();
//!
//! let mut hits: Vec<&str> = trie.search("new ").unwrap().collect();
//! hits.sort();
//! assert_eq!(hits, ["new jersey", "new york"]);
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod node;
mod pool;
mod search;

#[cfg(test)]
mod proptests;

pub use search::Matches;

use std::collections::HashSet;

use thiserror::Error;

use node::Node;
use pool::TokenPool;

/// Errors surfaced by [`Trie`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TrieError {
    /// [`Trie::add`] was called with an empty word. A local contract
    /// violation, never retryable.
    #[error("word must be non-empty")]
    InvalidInput,
    /// No traversal token freed up within the retry budget: 32 searches
    /// were already in flight for the whole acquisition window. Recoverable
    /// by backing off and retrying.
    #[error("no traversal token available (32 searches already in flight)")]
    ResourceExhausted,
}

/// A prefix trie over a fixed vocabulary, searchable by many threads at
/// once.
///
/// [`add`](Trie::add) takes `&mut self`: the borrow checker is the write
/// serialization the unsynchronized child maps rely on, and it excludes
/// live search iterators while the tree mutates. [`search`](Trie::search)
/// takes `&self` and may run from up to 32 threads concurrently.
pub struct Trie {
    root: Node,
    separators: HashSet<char>,
    pool: TokenPool,
    words: usize,
}

impl Trie {
    /// Creates a trie with no separator characters.
    pub fn new() -> Self {
        Self::with_separators([])
    }

    /// Creates a trie treating the given characters as collapsible during
    /// insertion and optional during search.
    pub fn with_separators(separators: impl IntoIterator<Item = char>) -> Self {
        Self {
            root: Node::new(0),
            separators: separators.into_iter().collect(),
            pool: TokenPool::new(),
            words: 0,
        }
    }

    /// Inserts a word.
    ///
    /// A run of consecutive separators contributes a single edge, so
    /// `"a  b"` and `"a b"` walk the same node path; the terminal node
    /// keeps the original string of whichever spelling arrived first.
    /// Re-adding a word is a silent no-op. Fails with
    /// [`TrieError::InvalidInput`] on an empty word.
    pub fn add(&mut self, word: &str) -> Result<(), TrieError> {
        if word.is_empty() {
            return Err(TrieError::InvalidInput);
        }
        let mut node = &mut self.root;
        let mut chars = word.chars().peekable();
        while let Some(c) = chars.next() {
            node = node.child_or_insert(c);
            if self.separators.contains(&c) {
                // Collapse the rest of the separator run into this edge.
                while chars.peek().is_some_and(|next| self.separators.contains(next)) {
                    chars.next();
                }
            }
        }
        if node.set_word(word) {
            self.words += 1;
        }
        Ok(())
    }

    /// Searches for the query, yielding the exact match (if any) plus every
    /// stored word the query is a prefix of under separator collapsing.
    ///
    /// The iterator is lazy; matching work happens as it is pulled. It holds
    /// one traversal token for its whole lifetime, so at most 32 match
    /// iterators may be alive at once across all threads.
    /// [`TrieError::ResourceExhausted`] surfaces here, before any match is
    /// yielded. An empty query returns an empty iterator and consumes no
    /// token.
    pub fn search(&self, query: &str) -> Result<Matches<'_>, TrieError> {
        Matches::new(self, query)
    }

    /// Exact-word membership under separator collapsing. A plain read-only
    /// walk; consumes no traversal token.
    pub fn contains(&self, word: &str) -> bool {
        let mut node = &self.root;
        let mut chars = word.chars().peekable();
        while let Some(c) = chars.next() {
            match node.child(c) {
                Some(child) => node = child,
                None => return false,
            }
            if self.separators.contains(&c) {
                while chars.peek().is_some_and(|next| self.separators.contains(next)) {
                    chars.next();
                }
            }
        }
        node.word().is_some()
    }

    /// Number of stored words.
    pub fn len(&self) -> usize {
        self.words
    }

    /// Whether no word has been added yet.
    pub fn is_empty(&self) -> bool {
        self.words == 0
    }

    /// Number of trie nodes, root included.
    pub fn node_count(&self) -> usize {
        self.root.subtree_size()
    }

    /// The separator set supplied at construction.
    pub fn separators(&self) -> &HashSet<char> {
        &self.separators
    }

    #[inline]
    pub(crate) fn is_separator(&self, c: char) -> bool {
        self.separators.contains(&c)
    }

    #[inline]
    pub(crate) fn root_node(&self) -> &Node {
        &self.root
    }

    #[inline]
    pub(crate) fn pool(&self) -> &TokenPool {
        &self.pool
    }
}

impl Default for Trie {
    fn default() -> Self {
        Self::new()
    }
}
