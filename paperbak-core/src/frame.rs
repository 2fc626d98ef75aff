//! Version 1 frame layout, all integers big-endian:
//!
//! ```text
//! [0]        0xB1   magic 0xB0 in the high nibble, version 1 in the low nibble
//! [1..5]     offset u32, position of the payload in the original file
//! [5..N-4]   payload
//! [N-4..N]   crc32 of bytes [0..N-4]
//! ```

use crate::checksum::{crc32, crc32_with_seed};
use crate::error::FrameError;

pub const MAGIC: u8 = 0xB0;
pub const MAGIC_MASK: u8 = 0xF0;
pub const VERSION: u8 = 1;

pub const HEADER_LEN: usize = 5;
pub const TRAILER_LEN: usize = 4;
pub const MIN_FRAME_LEN: usize = HEADER_LEN + TRAILER_LEN;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub offset: u32,
    pub payload: Vec<u8>,
    /// Trailer value, already checked against the body.
    pub checksum: u32,
}

fn header(offset: u32) -> [u8; HEADER_LEN] {
    let mut h = [0u8; HEADER_LEN];
    h[0] = MAGIC | VERSION;
    h[1..5].copy_from_slice(&offset.to_be_bytes());
    h
}

fn checksum_of(payload: &[u8], offset: u32) -> u32 {
    crc32_with_seed(payload, crc32(&header(offset)))
}

pub fn encode_frame(payload: &[u8], offset: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(MIN_FRAME_LEN + payload.len());
    out.extend_from_slice(&header(offset));
    out.extend_from_slice(payload);
    out.extend_from_slice(&checksum_of(payload, offset).to_be_bytes());
    out
}

pub fn decode_frame(bytes: &[u8]) -> Result<Frame, FrameError> {
    if bytes.len() < MIN_FRAME_LEN {
        // An empty string has no leading byte to judge, so length goes first.
        return Err(FrameError::TooShort {
            len: bytes.len(),
            min: MIN_FRAME_LEN,
        });
    }
    let lead = bytes[0];
    if lead & MAGIC_MASK != MAGIC {
        return Err(FrameError::BadMagic(lead));
    }
    let version = lead & !MAGIC_MASK;
    if version != VERSION {
        return Err(FrameError::UnsupportedVersion(version));
    }

    let (body, trailer) = bytes.split_at(bytes.len() - TRAILER_LEN);
    let expected = u32::from_be_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
    let actual = crc32(body);
    if actual != expected {
        return Err(FrameError::Integrity { expected, actual });
    }

    let offset = u32::from_be_bytes([body[1], body[2], body[3], body[4]]);
    Ok(Frame {
        offset,
        payload: body[HEADER_LEN..].to_vec(),
        checksum: expected,
    })
}
