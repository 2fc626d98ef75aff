//! Whole-file content digest, surfaced as lowercase hex.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::{self, Read};

use crate::util::hash_forward::HashingForward;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestKind {
    #[default]
    Sha256,
    Blake3,
}

impl DigestKind {
    pub fn label(self) -> &'static str {
        match self {
            DigestKind::Sha256 => "SHA-256",
            DigestKind::Blake3 => "BLAKE3",
        }
    }

    pub fn hasher(self) -> ContentDigest {
        match self {
            DigestKind::Sha256 => ContentDigest::Sha256(Sha256::new()),
            DigestKind::Blake3 => ContentDigest::Blake3(Box::new(blake3::Hasher::new())),
        }
    }
}

pub enum ContentDigest {
    Sha256(Sha256),
    Blake3(Box<blake3::Hasher>),
}

impl ContentDigest {
    pub fn update(&mut self, data: &[u8]) {
        match self {
            ContentDigest::Sha256(h) => h.update(data),
            ContentDigest::Blake3(h) => {
                h.update(data);
            }
        }
    }

    pub fn finalize_hex(self) -> String {
        match self {
            ContentDigest::Sha256(h) => hex::encode(h.finalize().as_slice()),
            ContentDigest::Blake3(h) => h.finalize().to_hex().to_string(),
        }
    }
}

/// Digest of everything `r` yields, read sequentially to EOF.
pub fn digest_reader<R: Read>(mut r: R, kind: DigestKind) -> io::Result<(String, u64)> {
    let mut digest = kind.hasher();
    let mut fwd = HashingForward::new(io::sink(), &mut digest);
    io::copy(&mut r, &mut fwd)?;
    let n = fwd.counted;
    Ok((digest.finalize_hex(), n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_sha256() {
        let mut d = DigestKind::Sha256.hasher();
        d.update(b"ABCD");
        d.update(b"EFGH");
        assert_eq!(
            d.finalize_hex(),
            "9ac2197d9258257b1ae8463e4214e4cd0a578bc1517f2415928b91be4283fc48"
        );
    }

    #[test]
    fn reader_matches_incremental() {
        for kind in [DigestKind::Sha256, DigestKind::Blake3] {
            let mut d = kind.hasher();
            d.update(b"ABCDEFGH");
            let (hex, n) = digest_reader(&b"ABCDEFGH"[..], kind).unwrap();
            assert_eq!(n, 8);
            assert_eq!(hex, d.finalize_hex());
            assert_eq!(hex.len(), 64);
        }
    }
}
