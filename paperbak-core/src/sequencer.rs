//! Backup side: slices an input stream into fixed-size chunks and tracks
//! the absolute offset of each one.

use crate::digest::{ContentDigest, DigestKind};
use crate::error::{PaperbakError, Result};
use crate::frame::encode_frame;
use std::io::Read;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub offset: u32,
    pub data: Vec<u8>,
}

impl Chunk {
    pub fn to_frame(&self) -> Vec<u8> {
        encode_frame(&self.data, self.offset)
    }
}

/// Number of codes a file of `total_size` bytes turns into, for progress
/// display only. Never less than one.
pub fn expected_chunks(total_size: u64, chunk_size: usize) -> u64 {
    if chunk_size == 0 {
        return 1;
    }
    total_size.div_ceil(chunk_size as u64).max(1)
}

pub struct ChunkSequencer<R: Read> {
    reader: R,
    chunk_size: usize,
    size_so_far: u64,
    digest: Option<ContentDigest>,
    done: bool,
}

impl<R: Read> ChunkSequencer<R> {
    pub fn new(reader: R, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(PaperbakError::Config("chunk size must be positive".into()));
        }
        Ok(Self {
            reader,
            chunk_size,
            size_so_far: 0,
            digest: None,
            done: false,
        })
    }

    /// Also hash every chunk, in stream order.
    pub fn with_digest(mut self, kind: DigestKind) -> Self {
        self.digest = Some(kind.hasher());
        self
    }

    /// Bytes consumed so far.
    pub fn consumed(&self) -> u64 {
        self.size_so_far
    }

    /// Reads up to `chunk_size` bytes. `None` once the stream is exhausted.
    pub fn next_chunk(&mut self) -> Result<Option<Chunk>> {
        if self.done {
            return Ok(None);
        }
        let mut data = Vec::with_capacity(self.chunk_size);
        // take() keeps reading across short reads until the window is full or EOF.
        (&mut self.reader)
            .take(self.chunk_size as u64)
            .read_to_end(&mut data)?;
        if data.is_empty() {
            self.done = true;
            return Ok(None);
        }
        let offset = u32::try_from(self.size_so_far)
            .map_err(|_| PaperbakError::OffsetOverflow(self.size_so_far))?;
        if let Some(d) = self.digest.as_mut() {
            d.update(&data);
        }
        self.size_so_far += data.len() as u64;
        Ok(Some(Chunk { offset, data }))
    }

    /// Hex digest of everything read, if a digest was requested.
    pub fn finish_digest(self) -> Option<String> {
        self.digest.map(ContentDigest::finalize_hex)
    }
}

impl<R: Read> Iterator for ChunkSequencer<R> {
    type Item = Result<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_chunk() {
            Ok(Some(c)) => Some(Ok(c)),
            Ok(None) => None,
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    /// Hands out at most `step` bytes per read call.
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("disk on fire"))
        }
    }

    #[test]
    fn example_split() {
        let chunks: Vec<Chunk> = ChunkSequencer::new(&b"ABCDEFGH"[..], 4)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(
            chunks,
            vec![
                Chunk {
                    offset: 0,
                    data: b"ABCD".to_vec(),
                },
                Chunk {
                    offset: 4,
                    data: b"EFGH".to_vec(),
                },
            ]
        );
    }

    #[test]
    fn short_tail_and_offsets() {
        let mut seq = ChunkSequencer::new(&b"0123456789"[..], 4).unwrap();
        let offs: Vec<(u32, usize)> = seq
            .by_ref()
            .map(|c| c.map(|c| (c.offset, c.data.len())))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(offs, vec![(0, 4), (4, 4), (8, 2)]);
        assert_eq!(seq.consumed(), 10);
        assert!(seq.next_chunk().unwrap().is_none());
    }

    #[test]
    fn short_reads_still_fill_windows() {
        let data: Vec<u8> = (0..100u8).collect();
        let src = Trickle {
            data: &data,
            step: 3,
        };
        let seq = ChunkSequencer::new(src, 16).unwrap();
        let chunks: Vec<Chunk> = seq.collect::<Result<_>>().unwrap();
        assert_eq!(chunks.len(), 7);
        assert!(chunks[..6].iter().all(|c| c.data.len() == 16));
        assert_eq!(chunks[6].offset, 96);
    }

    #[test]
    fn empty_input_yields_nothing() {
        let mut seq = ChunkSequencer::new(&b""[..], 4).unwrap().with_digest(DigestKind::Sha256);
        assert!(seq.next_chunk().unwrap().is_none());
        assert_eq!(
            seq.finish_digest().unwrap(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn digest_covers_stream_in_order() {
        let mut seq = ChunkSequencer::new(&b"ABCDEFGH"[..], 3)
            .unwrap()
            .with_digest(DigestKind::Sha256);
        while seq.next_chunk().unwrap().is_some() {}
        assert_eq!(
            seq.finish_digest().unwrap(),
            "9ac2197d9258257b1ae8463e4214e4cd0a578bc1517f2415928b91be4283fc48"
        );
    }

    #[test]
    fn zero_chunk_size_rejected() {
        assert!(matches!(
            ChunkSequencer::new(&b"x"[..], 0),
            Err(PaperbakError::Config(_))
        ));
    }

    #[test]
    fn io_error_propagates_once() {
        let mut seq = ChunkSequencer::new(Broken, 4).unwrap();
        assert!(matches!(seq.next(), Some(Err(PaperbakError::Io(_)))));
        assert!(seq.next().is_none());
    }

    #[test]
    fn offset_past_u32_fails() {
        let mut seq = ChunkSequencer::new(io::repeat(0), 4).unwrap();
        seq.size_so_far = u32::MAX as u64;
        assert_eq!(seq.next_chunk().unwrap().unwrap().offset, u32::MAX);
        assert!(matches!(
            seq.next_chunk(),
            Err(PaperbakError::OffsetOverflow(n)) if n == u32::MAX as u64 + 4
        ));
    }

    #[test]
    fn expected_counts() {
        assert_eq!(expected_chunks(0, 256), 1);
        assert_eq!(expected_chunks(8, 4), 2);
        assert_eq!(expected_chunks(9, 4), 3);
        assert_eq!(expected_chunks(256, 256), 1);
    }

    #[test]
    fn chunk_frames_decode_back() {
        let c = Chunk {
            offset: 4,
            data: b"EFGH".to_vec(),
        };
        let f = crate::frame::decode_frame(&c.to_frame()).unwrap();
        assert_eq!((f.offset, f.payload), (4, b"EFGH".to_vec()));
    }
}
