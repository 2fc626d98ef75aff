#![forbid(unsafe_code)]

pub mod error;

pub mod util {
    pub mod hash_forward;
}

pub mod checksum;
pub mod digest;
pub mod frame;
pub mod text;

pub mod coverage;
pub mod progress;
pub mod reconstruct;
pub mod sequencer;

pub mod export;
pub mod import;

pub mod backup;
pub mod restore;

// Re-exports: stable API surface
pub use backup::{BackupOptions, BackupSummary, backup};
pub use frame::{Frame, decode_frame, encode_frame};
pub use restore::{RestoreOptions, RestoreSummary, decode_code, restore};
