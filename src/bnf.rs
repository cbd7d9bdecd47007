//! Primitive rule runners for the grammar engine.
//!
//! Three primitives drive every rule in [`parser`](crate::parser): a
//! [`Reader`] cursor over a byte span, the maximal-munch [`token`]
//! consumer, and the bounded-repetition [`range`] runner. A rule is a
//! plain function taking the reader; alternatives commit on the first
//! definitively matched prefix, so backtracking is bounded to the first
//! token of an alternative and parsing stays linear in input length.
//!
//! [`token`]: Reader::token

use crate::{
    encoding::{table, Table},
    error::{Error, ErrorKind, Result},
};

/// Output of a [`token`](Reader::token) run.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Run {
    pub start: usize,
    pub end: usize,
}

impl Run {
    pub fn len(&self) -> usize {
        self.end - self.start
    }
}

/// A cursor over a byte span.
///
/// The invariants hold that `pos <= len` and that `pos` is non-decreasing.
pub(crate) struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Reader<'a> {
        Reader { bytes, pos: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn has_remaining(&self) -> bool {
        self.pos < self.bytes.len()
    }

    /// Returns the byte at `pos + i`, if any.
    pub fn peek(&self, i: usize) -> Option<u8> {
        self.bytes.get(self.pos + i).copied()
    }

    /// Returns the decimal value of the digit at `pos + i`, if any.
    pub fn peek_digit(&self, i: usize) -> Option<u32> {
        self.peek(i).and_then(|x| (x as char).to_digit(10))
    }

    /// Advances the cursor by `n` bytes.
    pub fn skip(&mut self, n: usize) {
        // INVARIANT: `pos` is non-decreasing.
        self.pos += n;
        debug_assert!(self.pos <= self.bytes.len());
    }

    /// Rewinds the cursor to an earlier position.
    ///
    /// Only used to retry the first token of a failed alternative.
    pub fn rewind(&mut self, pos: usize) {
        debug_assert!(pos <= self.pos);
        self.pos = pos;
    }

    /// Returns the span between `start` and the cursor.
    pub fn span(&self, start: usize) -> &'a [u8] {
        &self.bytes[start..self.pos]
    }

    /// Consumes `s` if the remaining bytes start with it.
    pub fn read_str(&mut self, s: &str) -> bool {
        let res = self.bytes[self.pos..].starts_with(s.as_bytes());
        if res {
            // INVARIANT: The remaining bytes start with `s`.
            self.skip(s.len());
        }
        res
    }

    /// Consumes the maximal prefix of bytes allowed by the table.
    ///
    /// A percent-encoded octet is consumed as a unit when the table
    /// allows such octets; a malformed one fails with
    /// `InvalidPctEncoding` at the octet's `'%'`.
    pub fn token(&mut self, table: &Table) -> Result<Run> {
        let start = self.pos;
        let mut i = self.pos;

        while i < self.bytes.len() {
            let x = self.bytes[i];
            if x == b'%' && table.allows_pct_encoded() {
                if i + 2 >= self.bytes.len()
                    || !(table::HEXDIG.allows(self.bytes[i + 1])
                        & table::HEXDIG.allows(self.bytes[i + 2]))
                {
                    return Err(Error::new(i, ErrorKind::InvalidPctEncoding));
                }
                i += 3;
            } else if table.allows(x) {
                i += 1;
            } else {
                break;
            }
        }

        // INVARIANT: `i` is non-decreasing.
        self.pos = i;
        Ok(Run { start, end: i })
    }
}

/// Runs `element` between `min` and `max` times, returning the match
/// count and the span covering all matched input.
///
/// The element rule returns `Ok(false)` when it does not apply, which
/// ends the repetition; fewer than `min` matches fail with `NoMatch` at
/// the start of the range.
pub(crate) fn range(
    r: &mut Reader<'_>,
    min: usize,
    max: usize,
    mut element: impl FnMut(&mut Reader<'_>) -> Result<bool>,
) -> Result<(usize, Run)> {
    let start = r.pos();
    let mut count = 0;

    while count < max {
        if !element(r)? {
            break;
        }
        count += 1;
    }

    if count < min {
        return Err(Error::new(start, ErrorKind::NoMatch));
    }
    Ok((
        count,
        Run {
            start,
            end: r.pos(),
        },
    ))
}
