//! ByteCounter - wc 互換のカウンタ
//!
//! chars = bytes, lines = `\n` bytes, words = starts of non-whitespace runs.
//! The byte just before `offset` seeds the word state, so counts over any
//! partitioning add up to a single whole-file pass.

use std::io::{self, Read, Seek, SeekFrom};

use crate::domain::CountTriple;
use crate::ports::Counter;

const DEFAULT_BUF_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct ByteCounter {
    buf_size: usize,
}

impl ByteCounter {
    pub fn new() -> Self {
        Self {
            buf_size: DEFAULT_BUF_SIZE,
        }
    }

    /// Small buffers are only useful for exercising the chunk loop in tests.
    pub fn with_buf_size(buf_size: usize) -> Self {
        Self {
            buf_size: buf_size.max(1),
        }
    }
}

impl Default for ByteCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl Counter for ByteCounter {
    fn count<R: Read + Seek>(
        &self,
        reader: &mut R,
        offset: u64,
        length: u64,
    ) -> io::Result<CountTriple> {
        if length == 0 {
            return Ok(CountTriple::ZERO);
        }

        // start of file counts as whitespace
        let mut in_space = true;
        if offset > 0 {
            reader.seek(SeekFrom::Start(offset - 1))?;
            let mut prev = [0u8; 1];
            reader.read_exact(&mut prev)?;
            in_space = prev[0].is_ascii_whitespace();
        } else {
            reader.seek(SeekFrom::Start(0))?;
        }

        let mut counts = CountTriple::ZERO;
        let mut buf = vec![0u8; self.buf_size.min(length as usize)];
        let mut remaining = length;

        while remaining > 0 {
            let want = remaining.min(buf.len() as u64) as usize;
            let n = match reader.read(&mut buf[..want]) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!("range ended {remaining} bytes early"),
                    ));
                }
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };

            for &b in &buf[..n] {
                let space = b.is_ascii_whitespace();
                if in_space && !space {
                    counts.words += 1;
                }
                in_space = space;
                if b == b'\n' {
                    counts.lines += 1;
                }
            }
            counts.chars += n as u64;
            remaining -= n as u64;
        }

        Ok(counts)
    }
}
