//! Counter port - バイト範囲を数える外部コラボレータ
//!
//! Implementations must be pure: the same bytes always give the same triple,
//! and independent readers over one file must not interfere.

use std::io::{self, Read, Seek};

use crate::domain::CountTriple;

pub trait Counter: Send + Sync + 'static {
    /// Count exactly `length` bytes starting at `offset`.
    ///
    /// A zero-length range returns [`CountTriple::ZERO`]. If fewer than
    /// `length` bytes are available the call fails with
    /// `io::ErrorKind::UnexpectedEof` instead of returning a short count.
    fn count<R: Read + Seek>(
        &self,
        reader: &mut R,
        offset: u64,
        length: u64,
    ) -> io::Result<CountTriple>;
}
