use paperbak_core::progress::{Progress, ProgressEvent};
use tracing::{debug, info, warn};

/// Routes pipeline progress into the log.
pub struct TracingProgress;

impl Progress for TracingProgress {
    fn on_event(&mut self, event: &ProgressEvent) {
        match event {
            ProgressEvent::BackupStarted {
                total_size,
                expected_frames,
            } => {
                info!("Original file size: {}KiB", total_size / 1024);
                info!("Total number of codes: {expected_frames}");
            }
            ProgressEvent::FrameExported {
                number,
                expected,
                offset,
                len,
            } => info!(offset, len, "Exporting code {number} of {expected}"),
            ProgressEvent::BackupFinished { frames, bytes } => {
                info!(frames, bytes, "Finished exporting")
            }
            ProgressEvent::ImageScanned { image, codes } => {
                info!(codes, "Scanned {image}")
            }
            ProgressEvent::FrameApplied {
                offset,
                len,
                duplicate,
            } => debug!(offset, len, duplicate, "applied frame"),
            ProgressEvent::CodeRejected {
                image,
                index,
                kind,
                reason,
            } => warn!(?kind, "Skipping code #{index} in {image}: {reason}"),
            ProgressEvent::RestoreFinished { frames, gaps } => {
                info!(frames, gaps, "Finished importing")
            }
        }
    }
}
