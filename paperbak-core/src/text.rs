//! Reversible byte <-> printable text codecs.
//!
//! Code generators want text, frames are binary. Whatever codec encoded a set
//! of codes must also be used to decode them.

use crate::error::TextError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextCodec {
    #[default]
    Base85,
    Base64,
    Hex,
}

impl TextCodec {
    pub fn encode(self, data: &[u8]) -> String {
        match self {
            TextCodec::Base85 => b85_encode(data),
            TextCodec::Base64 => STANDARD.encode(data),
            TextCodec::Hex => hex::encode(data),
        }
    }

    pub fn decode(self, text: &str) -> Result<Vec<u8>, TextError> {
        let text = text.trim();
        match self {
            TextCodec::Base85 => b85_decode(text),
            TextCodec::Base64 => STANDARD
                .decode(text)
                .map_err(|e| TextError::Base64(e.to_string())),
            TextCodec::Hex => hex::decode(text).map_err(|e| TextError::Hex(e.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TextCodec::Base85 => "base85",
            TextCodec::Base64 => "base64",
            TextCodec::Hex => "hex",
        }
    }
}

// RFC 1924 ordering.
const B85_ALPHABET: &[u8; 85] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz!#$%&()*+-;<=>?@^_`{|}~";

fn b85_value(c: u8) -> Option<u32> {
    B85_ALPHABET.iter().position(|&a| a == c).map(|p| p as u32)
}

/// Zero-pads to whole words, then drops as many output characters as pad bytes.
fn b85_encode(data: &[u8]) -> String {
    let padding = (4 - data.len() % 4) % 4;
    let mut out = Vec::with_capacity((data.len() + padding) / 4 * 5);
    for word in data.chunks(4) {
        let mut w = [0u8; 4];
        w[..word.len()].copy_from_slice(word);
        let mut acc = u32::from_be_bytes(w);
        let mut group = [0u8; 5];
        for slot in group.iter_mut().rev() {
            *slot = B85_ALPHABET[(acc % 85) as usize];
            acc /= 85;
        }
        out.extend_from_slice(&group);
    }
    out.truncate(out.len() - padding);
    // Every byte comes from the ASCII alphabet.
    out.into_iter().map(char::from).collect()
}

/// Pads the last group with the highest digit, then drops the pad bytes.
fn b85_decode(text: &str) -> Result<Vec<u8>, TextError> {
    let bytes = text.as_bytes();
    let padding = (5 - bytes.len() % 5) % 5;
    let mut out = Vec::with_capacity((bytes.len() + padding) / 5 * 4);
    for (g, group) in bytes.chunks(5).enumerate() {
        let mut acc: u64 = 0;
        for k in 0..5 {
            let pos = g * 5 + k;
            let v = match group.get(k) {
                Some(&c) => b85_value(c).ok_or_else(|| TextError::InvalidChar {
                    ch: text[pos..].chars().next().unwrap_or(char::REPLACEMENT_CHARACTER),
                    pos,
                })?,
                None => 84,
            };
            acc = acc * 85 + v as u64;
        }
        let word = u32::try_from(acc).map_err(|_| TextError::Overflow(g * 5))?;
        out.extend_from_slice(&word.to_be_bytes());
    }
    out.truncate(out.len() - padding);
    Ok(out)
}
