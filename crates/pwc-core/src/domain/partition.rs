//! Partition model: contiguous byte ranges of the input file.

use serde::{Deserialize, Serialize};

/// A contiguous byte range assigned to one supervisor.
///
/// Partitions produced by [`partition`] are ordered by `index`, never overlap,
/// and their lengths sum to the file size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Partition {
    pub index: usize,
    pub offset: u64,
    pub length: u64,
}

impl Partition {
    pub fn new(index: usize, offset: u64, length: u64) -> Self {
        Self {
            index,
            offset,
            length,
        }
    }

    /// One past the last byte of this range.
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

/// Split `file_size` bytes into `n` partitions.
///
/// The first `n - file_size % n` partitions get `file_size / n` bytes and the
/// remaining ones get one byte more (small partitions first, large last).
/// Offsets accumulate left to right from 0.
///
/// `n == 0` is treated as `n == 1`.
pub fn partition(file_size: u64, n: usize) -> Vec<Partition> {
    let n = n.max(1);
    let count = n as u64;
    let base = file_size / count;
    let small = count - file_size % count;

    let mut offset = 0u64;
    let mut partitions = Vec::with_capacity(n);
    for index in 0..n {
        let length = if (index as u64) < small { base } else { base + 1 };
        partitions.push(Partition::new(index, offset, length));
        offset += length;
    }
    partitions
}
