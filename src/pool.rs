//! Bounded pool of traversal tokens.
//!
//! Every in-flight search holds one token index in `[0, 32)`. Per-node
//! visited markers are tagged with the holder's index, which is what keeps
//! concurrent searches from observing each other's bookkeeping. The pool is
//! a single machine-word bit register (bit `i` set means token `i` is
//! allocated), so probing for a free slot is O(1) and the memory overhead of
//! visited tracking is capped at 32 concurrent searches.

use std::thread;

use parking_lot::{RwLock, RwLockUpgradableReadGuard};

use crate::TrieError;

/// Size of the token domain; also the concurrent-search limit.
pub(crate) const MAX_TOKENS: usize = 32;

/// Attempts made against a fully-allocated register before giving up.
const ACQUIRE_ATTEMPTS: usize = 1024;

struct Register {
    /// Bit `i` set: token `i` is held by an in-flight search.
    bits: u32,
    /// Per-slot generation, bumped on release. A visited marker stamped
    /// with an older generation belongs to a previous holder of the index
    /// and is dead (see `Node::mark_visited`).
    generations: [u64; MAX_TOKENS],
}

/// Allocator handing out exclusive traversal-token indices.
pub(crate) struct TokenPool {
    register: RwLock<Register>,
}

impl TokenPool {
    pub(crate) fn new() -> Self {
        Self {
            register: RwLock::new(Register {
                bits: 0,
                generations: [0; MAX_TOKENS],
            }),
        }
    }

    /// Hands out a free token index.
    ///
    /// The register is scanned under an upgradable read guard and the bit is
    /// flipped under the upgraded (exclusive) guard. parking_lot admits one
    /// upgrader at a time, so the candidate bit cannot be stolen between the
    /// scan and the flip. While the register is full the calling thread
    /// yields between attempts instead of spinning tightly, then surfaces
    /// [`TrieError::ResourceExhausted`] once the retry budget is spent.
    pub(crate) fn acquire(&self) -> Result<Token<'_>, TrieError> {
        for attempt in 0..ACQUIRE_ATTEMPTS {
            let register = self.register.upgradable_read();
            let free = (!register.bits).trailing_zeros() as usize;
            if free < MAX_TOKENS {
                let mut register = RwLockUpgradableReadGuard::upgrade(register);
                register.bits |= 1 << free;
                return Ok(Token {
                    pool: self,
                    index: free as u8,
                    generation: register.generations[free],
                });
            }
            drop(register);
            if attempt + 1 < ACQUIRE_ATTEMPTS {
                thread::yield_now();
            }
        }
        Err(TrieError::ResourceExhausted)
    }
}

/// Exclusive handle on one token index, released on drop.
///
/// Drop is the scoped-release guarantee: the slot frees up on every exit
/// path of a search, including early abandonment of the match iterator and
/// unwinding.
pub(crate) struct Token<'a> {
    pool: &'a TokenPool,
    index: u8,
    generation: u64,
}

impl Token<'_> {
    #[inline]
    pub(crate) fn index(&self) -> u8 {
        self.index
    }

    /// Generation stamp captured at allocation.
    #[inline]
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for Token<'_> {
    fn drop(&mut self) {
        let mut register = self.pool.register.write();
        register.bits &= !(1u32 << self.index);
        // Invalidates every visited marker this holder left behind; the
        // next holder of the index starts clean without a tree walk.
        register.generations[self.index as usize] += 1;
    }
}
