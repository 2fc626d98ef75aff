use crate::digest::DigestKind;
use crate::error::{PaperbakError, Result};
use crate::export::Exporter;
use crate::progress::{Progress, ProgressEvent};
use crate::sequencer::{ChunkSequencer, expected_chunks};
use crate::text::TextCodec;
use serde::{Deserialize, Serialize};
use std::io::Read;

pub const DEFAULT_CHUNK_SIZE: usize = 256;
/// Far beyond what a single printed code can hold.
pub const MAX_CHUNK_SIZE: usize = 64 * 1024;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BackupOptions {
    /// Input bytes per code.
    pub chunk_size: usize,
    pub codec: TextCodec,
    /// Whole-file digest to compute while reading, if any.
    pub digest: Option<DigestKind>,
}

impl Default for BackupOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            codec: TextCodec::default(),
            digest: None,
        }
    }
}

impl BackupOptions {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 || self.chunk_size > MAX_CHUNK_SIZE {
            return Err(PaperbakError::Config(format!(
                "chunk size must be between 1 and {MAX_CHUNK_SIZE}, got {}",
                self.chunk_size
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupSummary {
    pub frames: u64,
    pub bytes: u64,
    pub expected_frames: u64,
    pub digest_kind: Option<DigestKind>,
    pub digest: Option<String>,
}

/// Frames `input` and hands each code to `exporter`. `total_size` only feeds
/// the expected-count estimate shown in progress events.
pub fn backup<R: Read>(
    input: R,
    total_size: u64,
    mut exporter: Exporter,
    opts: &BackupOptions,
    progress: &mut dyn Progress,
) -> Result<BackupSummary> {
    opts.validate()?;
    let expected = expected_chunks(total_size, opts.chunk_size);
    progress.on_event(&ProgressEvent::BackupStarted {
        total_size,
        expected_frames: expected,
    });

    let mut seq = ChunkSequencer::new(input, opts.chunk_size)?;
    if let Some(kind) = opts.digest {
        seq = seq.with_digest(kind);
    }

    while let Some(chunk) = seq.next_chunk()? {
        let code = opts.codec.encode(&chunk.to_frame());
        exporter.accept(&code)?;
        progress.on_event(&ProgressEvent::FrameExported {
            number: exporter.accepted(),
            expected,
            offset: chunk.offset,
            len: chunk.data.len(),
        });
    }

    let frames = exporter.accepted();
    let bytes = seq.consumed();
    let digest = seq.finish_digest();
    exporter.finish(opts.digest.zip(digest.as_deref()))?;
    progress.on_event(&ProgressEvent::BackupFinished { frames, bytes });

    Ok(BackupSummary {
        frames,
        bytes,
        expected_frames: expected,
        digest_kind: opts.digest,
        digest,
    })
}
