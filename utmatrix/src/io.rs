//! Whitespace-separated token input shared by the `read` operations of [`Sequence`] and
//! [`TriangularMatrix`].
//!
//! [`Sequence`]: crate::Sequence
//! [`TriangularMatrix`]: crate::TriangularMatrix
use std::collections::VecDeque;
use std::io::BufRead;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Lazily splits a reader into whitespace-separated tokens, one line at a time.
pub struct Tokens<R> {
    reader: R,
    pending: VecDeque<String>,
}

impl<R: BufRead> Tokens<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: VecDeque::new(),
        }
    }

    /// The next token, or `None` once the reader is exhausted.
    pub fn next_token(&mut self) -> Result<Option<String>> {
        while self.pending.is_empty() {
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.pending.extend(line.split_whitespace().map(str::to_string));
        }
        Ok(self.pending.pop_front())
    }

    /// Parse exactly `count` values, failing on a malformed token or early end of input.
    pub fn parse_values<T: FromStr>(&mut self, count: usize) -> Result<Vec<T>> {
        let mut values = Vec::with_capacity(count);
        while values.len() < count {
            let token = self.next_token()?.ok_or(Error::UnexpectedEof {
                expected: count,
                read: values.len(),
            })?;
            let value = token.parse().map_err(|_| Error::Parse { token })?;
            values.push(value);
        }
        Ok(values)
    }
}
