//! One-byte-at-a-time source with unbounded push-back.
//!
//! The scanner needs exactly one byte of lookahead across the `0xD3`
//! sentinel boundary (spec §4.3/§9). A dedicated push-back wrapper is
//! simpler than a fully buffered reader and is the only lookahead
//! primitive the scanner is built on.

use std::collections::VecDeque;

/// Anything that can hand back bytes one at a time and signal end of
/// stream by returning `None`.
pub trait ByteSource {
    /// Returns the next byte, or `None` once the source is exhausted.
    fn next_byte(&mut self) -> Option<u8>;
}

impl<I: Iterator<Item = u8>> ByteSource for I {
    fn next_byte(&mut self) -> Option<u8> {
        self.next()
    }
}

/// Wraps a [ByteSource] and lets the caller "un-read" bytes.
///
/// Pushed-back bytes form a stack (last pushed, first returned) that is
/// fully drained before new bytes are pulled from the wrapped source.
/// Once the wrapped source is exhausted, `next()` keeps returning
/// `None` after the pushback stack drains, it does not resume pulling.
pub struct Pushback<S: ByteSource> {
    source: S,
    stack: VecDeque<u8>,
    source_exhausted: bool,
}

impl<S: ByteSource> Pushback<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            stack: VecDeque::with_capacity(4),
            source_exhausted: false,
        }
    }

    /// Returns the next byte, preferring any pushed-back bytes.
    pub fn next(&mut self) -> Option<u8> {
        if let Some(b) = self.stack.pop_back() {
            return Some(b);
        }
        if self.source_exhausted {
            return None;
        }
        match self.source.next_byte() {
            Some(b) => Some(b),
            None => {
                self.source_exhausted = true;
                None
            }
        }
    }

    /// Pushes a byte back so the next call to [Pushback::next] returns
    /// it. Bytes pushed back multiple times come back in LIFO order.
    pub fn push_back(&mut self, byte: u8) {
        self.stack.push_back(byte);
    }

    /// `true` once the wrapped source is exhausted and the pushback
    /// stack is empty: no further bytes will ever be produced.
    pub fn is_exhausted(&self) -> bool {
        self.source_exhausted && self.stack.is_empty()
    }
}
