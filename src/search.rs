//! Lazy search traversal.
//!
//! Separator skipping makes distinct traversal paths reconverge on the same
//! (node, query position) state: a run of separators can be satisfied by an
//! explicit separator edge, by characters deeper in the stored word, or by
//! nothing at all, and different interleavings land on identical states.
//! Naive traversal re-expands each of them exponentially. The per-token
//! visited markers collapse the re-merging branches so every state is
//! expanded at most once per search.

use crate::node::Node;
use crate::pool::Token;
use crate::{Trie, TrieError};

/// Lazy stream of words matching a query, returned by [`Trie::search`].
///
/// Yields the stored word at the node the query resolves to (if terminal)
/// plus every word the query is a strict prefix of. Output order follows
/// depth-first child iteration and is otherwise unspecified. The iterator
/// holds one of the 32 traversal tokens; it is released when the iterator
/// is exhausted or dropped.
pub struct Matches<'a> {
    trie: &'a Trie,
    query: Vec<char>,
    token: Option<Token<'a>>,
    /// DFS frames: (node, next query position to match at that node).
    stack: Vec<(&'a Node, u32)>,
}

impl<'a> Matches<'a> {
    /// Acquires a token and seeds the traversal. An empty query produces an
    /// empty iterator without consuming a token.
    pub(crate) fn new(trie: &'a Trie, query: &str) -> Result<Self, TrieError> {
        if query.is_empty() {
            return Ok(Self {
                trie,
                query: Vec::new(),
                token: None,
                stack: Vec::new(),
            });
        }
        let token = trie.pool().acquire()?;
        Ok(Self {
            trie,
            query: query.chars().collect(),
            token: Some(token),
            stack: vec![(trie.root_node(), 0)],
        })
    }
}

impl<'a> Iterator for Matches<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let Matches {
            trie,
            query,
            token,
            stack,
        } = self;
        let token = token.as_ref()?;

        while let Some((node, position)) = stack.pop() {
            // Dedup before expanding: reconverging branches land on
            // identical (node, position) states.
            if !node.mark_visited(token, position) {
                continue;
            }

            if position as usize == query.len() {
                // Query fully consumed. This subtree holds the exact match
                // (if this node is terminal) and every completion, so keep
                // descending without consuming query input.
                for child in node.children() {
                    stack.push((child, position));
                }
                if let Some(word) = node.word() {
                    return Some(word);
                }
                continue;
            }

            let c = query[position as usize];
            if trie.is_separator(c) {
                // A query separator is satisfied by an explicit separator
                // edge, by a separator deeper in the stored word (descend
                // every child without consuming it), or by nothing (the
                // stored word collapsed past it, so advance past it here).
                for child in node.children() {
                    stack.push((child, position));
                }
                stack.push((node, position + 1));
                if let Some(child) = node.child(c) {
                    stack.push((child, position + 1));
                }
            } else if let Some(child) = node.child(c) {
                stack.push((child, position + 1));
            }
        }

        // Traversal exhausted: hand the token back without waiting for drop.
        self.token = None;
        None
    }
}
