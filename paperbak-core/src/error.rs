use thiserror::Error;

/// Reasons a byte string is not accepted as a frame.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame too short: {len} bytes, need at least {min}")]
    TooShort { len: usize, min: usize },

    #[error("binary data without magic number (leading byte {0:#04x})")]
    BadMagic(u8),

    #[error("unrecognized frame version: {0}")]
    UnsupportedVersion(u8),

    #[error("CRC checksum mismatch: frame says {expected:#010x}, computed {actual:#010x}")]
    Integrity { expected: u32, actual: u32 },
}

impl FrameError {
    /// True for inputs that are not frames of this protocol at all.
    pub fn is_format(&self) -> bool {
        matches!(self, FrameError::TooShort { .. } | FrameError::BadMagic(_))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TextError {
    #[error("invalid character {ch:?} at position {pos}")]
    InvalidChar { ch: char, pos: usize },

    #[error("base85 group overflows 32 bits at position {0}")]
    Overflow(usize),

    #[error("invalid base64: {0}")]
    Base64(String),

    #[error("invalid hex: {0}")]
    Hex(String),
}

#[derive(Error, Debug)]
pub enum PaperbakError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    #[error("Text decode error: {0}")]
    Text(#[from] TextError),

    #[error("offset {0} does not fit the 32-bit frame offset field")]
    OffsetOverflow(u64),

    #[error("conflicting payloads differ at offset {offset}")]
    Conflict { offset: u64 },

    #[error("restore incomplete: {missing} bytes missing in {gaps} gap(s)")]
    Incomplete { gaps: usize, missing: u64 },

    #[error("Config error: {0}")]
    Config(String),
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, PaperbakError>;
