//! Pure chunking of batch payloads.
//!
//! Both splitters are deterministic and order preserving: concatenating their
//! output reproduces the input exactly. Every chunk holds exactly
//! [`ChunkSize`] elements except the last, which holds the remainder. An empty
//! input produces no chunks. Numbering the chunks is left to the caller.

use crate::{Error, Result};
use core::num::NonZeroUsize;

/// Validated, non-zero chunk size.
///
/// Zero and negative sizes are rejected at construction so the splitters
/// never have to handle them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkSize(NonZeroUsize);

impl ChunkSize {
    pub const fn new(size: NonZeroUsize) -> Self {
        Self(size)
    }

    pub const fn get(self) -> usize {
        self.0.get()
    }
}

impl TryFrom<i64> for ChunkSize {
    type Error = Error;

    fn try_from(size: i64) -> Result<Self> {
        usize::try_from(size)
            .ok()
            .and_then(NonZeroUsize::new)
            .map(Self)
            .ok_or(Error::InvalidChunkSize { size })
    }
}

/// Splits a flat sequence into contiguous chunks of `size` elements.
pub fn split_flat<T: Clone>(data: &[T], size: ChunkSize) -> Vec<Vec<T>> {
    data.chunks(size.get()).map(<[T]>::to_vec).collect()
}

/// Flattens `groups` into one stream, then splits it like [`split_flat`].
///
/// Group boundaries are ignored: a group may be cut across two chunks or share
/// a chunk with its neighbours.
pub fn split_grouped<T, G>(groups: &[G], size: ChunkSize) -> Vec<Vec<T>>
where
    T: Clone,
    G: AsRef<[T]>,
{
    let size = size.get();
    let mut chunks = Vec::new();
    let mut current: Vec<T> = Vec::new();

    for group in groups {
        let mut rest = group.as_ref();
        while !rest.is_empty() {
            let take = (size - current.len()).min(rest.len());
            let (head, tail) = rest.split_at(take);
            current.extend_from_slice(head);
            rest = tail;

            if current.len() == size {
                chunks.push(core::mem::take(&mut current));
            }
        }
    }

    // Flush the remainder as a short final chunk.
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
