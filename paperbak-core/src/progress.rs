//! Progress reporting for backup and restore runs.
//!
//! The pipelines never print; they hand events to whatever `Progress` the
//! caller passed in.

use crate::restore::RejectKind;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProgressEvent {
    BackupStarted {
        total_size: u64,
        expected_frames: u64,
    },
    FrameExported {
        number: u64,
        expected: u64,
        offset: u32,
        len: usize,
    },
    BackupFinished {
        frames: u64,
        bytes: u64,
    },
    ImageScanned {
        image: String,
        codes: usize,
    },
    FrameApplied {
        offset: u32,
        len: usize,
        duplicate: bool,
    },
    CodeRejected {
        image: String,
        index: usize,
        kind: RejectKind,
        reason: String,
    },
    RestoreFinished {
        frames: u64,
        gaps: usize,
    },
}

pub trait Progress {
    fn on_event(&mut self, event: &ProgressEvent);
}

/// Discards everything.
pub struct NoProgress;

impl Progress for NoProgress {
    fn on_event(&mut self, _event: &ProgressEvent) {}
}

#[derive(Default, Debug)]
pub struct RecordingProgress {
    pub events: Vec<ProgressEvent>,
}

impl Progress for RecordingProgress {
    fn on_event(&mut self, event: &ProgressEvent) {
        self.events.push(event.clone());
    }
}
