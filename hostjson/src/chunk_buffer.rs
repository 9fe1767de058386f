// SPDX-License-Identifier: Apache-2.0

use crate::error::{Error, UnexpectedState};

/// One fixed-size output chunk; `data[..used]` holds written bytes.
struct Chunk {
    data: Box<[u8]>,
    used: usize,
}

impl Chunk {
    fn allocate(size: usize) -> Result<Self, Error> {
        let mut data = Vec::new();
        data.try_reserve_exact(size)?;
        data.resize(size, 0);
        Ok(Self {
            data: data.into_boxed_slice(),
            used: 0,
        })
    }

    fn room(&self) -> usize {
        self.data.len().saturating_sub(self.used)
    }
}

/// Append-only chunked output used by stringify and dump.
///
/// Key design principles:
/// - Writers ask for a region with [`reserve`](Self::reserve), write into it
///   and report the bytes used with [`commit`](Self::commit)
/// - Full chunks are never moved or resized; a new tail is allocated instead
/// - [`flatten`](Self::flatten) produces the final text in one pass, without
///   copying when a single chunk was enough
pub struct ChunkBuffer {
    chunks: Vec<Chunk>,
    min_size: usize,
}

impl ChunkBuffer {
    /// Create an empty buffer whose chunks are at least `min_size` bytes.
    pub fn new(min_size: usize) -> Self {
        Self {
            chunks: Vec::new(),
            min_size: min_size.max(1),
        }
    }

    /// Writable region of at least `n` bytes at the tail.
    ///
    /// The region may be larger than `n`; only the committed prefix counts.
    pub fn reserve(&mut self, n: usize) -> Result<&mut [u8], Error> {
        let fits = self.chunks.last().is_some_and(|tail| tail.room() >= n);
        if !fits {
            let chunk = Chunk::allocate(n.max(self.min_size))?;
            self.chunks.try_reserve(1)?;
            self.chunks.push(chunk);
            log::trace!("chunk #{} allocated", self.chunks.len());
        }
        match self.chunks.last_mut() {
            Some(tail) => Ok(&mut tail.data[tail.used..]),
            None => Err(Error::Memory),
        }
    }

    /// Mark `used` bytes of the last reserved region as written.
    pub fn commit(&mut self, used: usize) -> Result<(), Error> {
        match self.chunks.last_mut() {
            Some(tail) if used <= tail.room() => {
                tail.used += used;
                Ok(())
            }
            None if used == 0 => Ok(()),
            _ => Err(UnexpectedState::CommitBeyondReserve.into()),
        }
    }

    /// Copy `bytes` to the tail.
    pub fn append(&mut self, bytes: &[u8]) -> Result<(), Error> {
        if bytes.is_empty() {
            return Ok(());
        }
        let region = self.reserve(bytes.len())?;
        region[..bytes.len()].copy_from_slice(bytes);
        self.commit(bytes.len())
    }

    pub fn push(&mut self, byte: u8) -> Result<(), Error> {
        self.append(&[byte])
    }

    /// Append `byte` repeated `count` times.
    pub fn fill(&mut self, byte: u8, count: usize) -> Result<(), Error> {
        if count == 0 {
            return Ok(());
        }
        let region = self.reserve(count)?;
        region[..count].fill(byte);
        self.commit(count)
    }

    /// Total number of written bytes.
    pub fn len(&self) -> usize {
        self.chunks.iter().map(|chunk| chunk.used).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Concatenate all chunks into one contiguous byte vector.
    pub fn flatten(self) -> Result<Vec<u8>, Error> {
        let mut chunks = self.chunks;
        match chunks.len() {
            0 => Ok(Vec::new()),
            1 => {
                let Some(chunk) = chunks.pop() else {
                    return Ok(Vec::new());
                };
                let mut bytes = chunk.data.into_vec();
                bytes.truncate(chunk.used);
                Ok(bytes)
            }
            _ => {
                let total = chunks.iter().map(|chunk| chunk.used).sum();
                let mut bytes = Vec::new();
                bytes.try_reserve_exact(total)?;
                for chunk in &chunks {
                    bytes.extend_from_slice(&chunk.data[..chunk.used]);
                }
                Ok(bytes)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_flatten() {
        let buffer = ChunkBuffer::new(128);
        assert!(buffer.is_empty());
        assert_eq!(buffer.flatten().unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_single_chunk() {
        let mut buffer = ChunkBuffer::new(128);
        buffer.append(b"hello").unwrap();
        buffer.push(b' ').unwrap();
        buffer.append(b"world").unwrap();
        assert_eq!(buffer.chunk_count(), 1);
        assert_eq!(buffer.flatten().unwrap(), b"hello world");
    }

    #[test]
    fn test_spills_into_new_chunks() {
        let mut buffer = ChunkBuffer::new(4);
        buffer.append(b"abc").unwrap();
        buffer.append(b"defg").unwrap();
        buffer.append(b"h").unwrap();
        // "defg" fills the second chunk, so "h" opens a third.
        assert_eq!(buffer.chunk_count(), 3);
        assert_eq!(buffer.len(), 8);
        assert_eq!(buffer.flatten().unwrap(), b"abcdefgh");
    }

    #[test]
    fn test_oversized_reserve() {
        let mut buffer = ChunkBuffer::new(4);
        let region = buffer.reserve(10).unwrap();
        assert!(region.len() >= 10);
        region[..10].copy_from_slice(b"0123456789");
        buffer.commit(10).unwrap();
        assert_eq!(buffer.flatten().unwrap(), b"0123456789");
    }

    #[test]
    fn test_partial_commit() {
        let mut buffer = ChunkBuffer::new(16);
        let region = buffer.reserve(6).unwrap();
        region[..2].copy_from_slice(b"ok");
        buffer.commit(2).unwrap();
        buffer.fill(b' ', 3).unwrap();
        assert_eq!(buffer.flatten().unwrap(), b"ok   ");
    }

    #[test]
    fn test_commit_beyond_reserve() {
        let mut buffer = ChunkBuffer::new(4);
        assert!(buffer.commit(0).is_ok());
        assert!(matches!(
            buffer.commit(1),
            Err(Error::Internal(UnexpectedState::CommitBeyondReserve))
        ));
        buffer.reserve(2).unwrap();
        assert!(buffer.commit(5).is_err());
    }
}
