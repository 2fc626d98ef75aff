//! CRC-32 (IEEE) with continuation.
//!
//! `crc32_with_seed(b, crc32(a)) == crc32(a ++ b)`, so the frame encoder can
//! checksum the header and payload in two steps while the decoder checks the
//! whole body in one.

/// Checksum of `data` from the standard initial state.
pub fn crc32(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

/// Continue a checksum previously returned by [`crc32`] or this function.
pub fn crc32_with_seed(data: &[u8], seed: u32) -> u32 {
    let mut h = crc32fast::Hasher::new_with_initial(seed);
    h.update(data);
    h.finalize()
}
