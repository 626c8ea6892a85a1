//! Count model: per-range results, totals, and the wire message.

use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use super::errors::PwcError;

/// Lines, words and chars of one byte range.
///
/// Produced once per successful attempt and never mutated afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CountTriple {
    pub lines: u64,
    pub words: u64,
    pub chars: u64,
}

impl CountTriple {
    pub const ZERO: CountTriple = CountTriple {
        lines: 0,
        words: 0,
        chars: 0,
    };

    pub fn new(lines: u64, words: u64, chars: u64) -> Self {
        Self { lines, words, chars }
    }
}

impl Add for CountTriple {
    type Output = CountTriple;

    fn add(self, rhs: Self) -> Self::Output {
        CountTriple {
            lines: self.lines + rhs.lines,
            words: self.words + rhs.words,
            chars: self.chars + rhs.chars,
        }
    }
}

/// Running sum owned by the aggregator.
///
/// Only [`Totals::absorb`] mutates it, once per partition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub counts: CountTriple,
    /// Number of partitions folded in so far.
    pub partitions: usize,
}

impl Totals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn absorb(&mut self, triple: CountTriple) {
        self.counts = self.counts + triple;
        self.partitions += 1;
    }

    pub fn lines(&self) -> u64 {
        self.counts.lines
    }

    pub fn words(&self) -> u64 {
        self.counts.words
    }

    pub fn chars(&self) -> u64 {
        self.counts.chars
    }
}

impl AddAssign<CountTriple> for Totals {
    fn add_assign(&mut self, rhs: CountTriple) {
        self.absorb(rhs);
    }
}

/// Versioned message carrying one `CountTriple` across a task or process
/// boundary.
///
/// Serialized as a single JSON line when it crosses a process boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountMessage {
    pub version: u16,
    pub lines: u64,
    pub words: u64,
    pub chars: u64,
}

impl CountMessage {
    pub const VERSION: u16 = 1;

    pub fn encode_json(&self) -> Result<String, PwcError> {
        serde_json::to_string(self).map_err(|e| PwcError::Protocol(format!("json encode: {e}")))
    }

    /// Decode one message, rejecting versions this build does not speak.
    pub fn decode_json(line: &str) -> Result<Self, PwcError> {
        let msg: CountMessage = serde_json::from_str(line.trim())
            .map_err(|e| PwcError::Protocol(format!("json decode: {e}")))?;
        if msg.version != Self::VERSION {
            return Err(PwcError::UnsupportedMessageVersion(msg.version));
        }
        Ok(msg)
    }

    pub fn triple(&self) -> CountTriple {
        CountTriple::new(self.lines, self.words, self.chars)
    }
}

impl From<CountTriple> for CountMessage {
    fn from(t: CountTriple) -> Self {
        Self {
            version: Self::VERSION,
            lines: t.lines,
            words: t.words,
            chars: t.chars,
        }
    }
}
