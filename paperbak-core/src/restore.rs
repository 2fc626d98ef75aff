use crate::digest::{DigestKind, digest_reader};
use crate::error::{FrameError, PaperbakError, Result};
use crate::frame::{Frame, decode_frame};
use crate::import::{CodeScanner, Image};
use crate::progress::{Progress, ProgressEvent};
use crate::reconstruct::{ApplyOutcome, Reconstructor};
use crate::text::TextCodec;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::io::{Read, Seek, SeekFrom, Write};

/// Why a scanned code was skipped.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RejectKind {
    Text,
    Format,
    Version,
    Integrity,
}

impl RejectKind {
    /// `None` for errors that must end the run rather than skip one code.
    pub fn classify(err: &PaperbakError) -> Option<Self> {
        match err {
            PaperbakError::Text(_) => Some(RejectKind::Text),
            PaperbakError::Frame(e) if e.is_format() => Some(RejectKind::Format),
            PaperbakError::Frame(FrameError::UnsupportedVersion(_)) => Some(RejectKind::Version),
            PaperbakError::Frame(_) => Some(RejectKind::Integrity),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectCounts {
    pub text: u64,
    pub format: u64,
    pub version: u64,
    pub integrity: u64,
}

impl RejectCounts {
    fn bump(&mut self, kind: RejectKind) {
        match kind {
            RejectKind::Text => self.text += 1,
            RejectKind::Format => self.format += 1,
            RejectKind::Version => self.version += 1,
            RejectKind::Integrity => self.integrity += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.text + self.format + self.version + self.integrity
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RestoreOptions {
    pub codec: TextCodec,
    /// Digest of the restored sink, read back after every frame is applied.
    pub digest: Option<DigestKind>,
    /// Fail on overlapping frames whose bytes disagree.
    pub strict: bool,
    /// Fail when the restored range has holes.
    pub require_complete: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gap {
    pub start: u64,
    pub end: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreSummary {
    pub images: u64,
    pub codes: u64,
    pub frames_applied: u64,
    pub rewritten: u64,
    pub rejected: RejectCounts,
    pub covered_bytes: u64,
    pub extent: u64,
    pub gaps: Vec<Gap>,
    pub digest_kind: Option<DigestKind>,
    pub digest: Option<String>,
}

impl RestoreSummary {
    pub fn missing_bytes(&self) -> u64 {
        self.gaps.iter().map(|g| g.end - g.start).sum()
    }
}

/// Text-decodes then frame-decodes one scanned string.
pub fn decode_code(codec: TextCodec, code: &str) -> Result<Frame> {
    let bytes = codec.decode(code)?;
    Ok(decode_frame(&bytes)?)
}

/// Applies every decodable code found in `images` to `sink`. Bad codes are
/// reported and skipped; I/O failures and strict-mode conflicts end the run.
pub fn restore<I, S, W>(
    images: I,
    scanner: &S,
    sink: W,
    opts: &RestoreOptions,
    progress: &mut dyn Progress,
) -> Result<(W, RestoreSummary)>
where
    I: IntoIterator<Item = Result<Image>>,
    S: CodeScanner + ?Sized,
    W: Read + Write + Seek,
{
    let mut rec = if opts.strict {
        Reconstructor::strict(sink)
    } else {
        Reconstructor::new(sink)
    };
    let mut summary = RestoreSummary::default();

    for image in images {
        let image = image?;
        summary.images += 1;
        let codes = scanner.scan(&image.data);
        summary.codes += codes.len() as u64;
        progress.on_event(&ProgressEvent::ImageScanned {
            image: image.name.clone(),
            codes: codes.len(),
        });

        // Decoding is independent per code; writes stay sequential.
        let decoded: Vec<Result<Frame>> = codes
            .par_iter()
            .map(|c| decode_code(opts.codec, c))
            .collect();

        for (index, res) in decoded.into_iter().enumerate() {
            match res {
                Ok(frame) => {
                    let outcome = rec.apply(&frame.payload, frame.offset)?;
                    progress.on_event(&ProgressEvent::FrameApplied {
                        offset: frame.offset,
                        len: frame.payload.len(),
                        duplicate: outcome == ApplyOutcome::Rewritten,
                    });
                }
                Err(err) => {
                    let kind = match RejectKind::classify(&err) {
                        Some(k) => k,
                        None => return Err(err),
                    };
                    summary.rejected.bump(kind);
                    progress.on_event(&ProgressEvent::CodeRejected {
                        image: image.name.clone(),
                        index,
                        kind,
                        reason: err.to_string(),
                    });
                }
            }
        }
    }

    summary.frames_applied = rec.applied();
    summary.rewritten = rec.rewritten();
    let cov = rec.coverage();
    summary.covered_bytes = cov.covered_bytes();
    summary.extent = cov.extent();
    summary.gaps = cov
        .gaps()
        .into_iter()
        .map(|r| Gap {
            start: r.start,
            end: r.end,
        })
        .collect();

    let mut sink = rec.finish()?;
    if let Some(kind) = opts.digest {
        // Write order was arbitrary, so hash a fresh sequential read.
        sink.seek(SeekFrom::Start(0))?;
        let (hex, _) = digest_reader(&mut sink, kind)?;
        summary.digest_kind = Some(kind);
        summary.digest = Some(hex);
    }

    progress.on_event(&ProgressEvent::RestoreFinished {
        frames: summary.frames_applied,
        gaps: summary.gaps.len(),
    });

    if opts.require_complete && !summary.gaps.is_empty() {
        return Err(PaperbakError::Incomplete {
            gaps: summary.gaps.len(),
            missing: summary.missing_bytes(),
        });
    }
    Ok((sink, summary))
}
