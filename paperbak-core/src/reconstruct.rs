//! Restore side: positioned writes of decoded payloads into a sink.
//!
//! Frames may arrive in any order, more than once, or not at all. Each one
//! is written at its own offset; the sink is never read back while frames
//! are still being applied.

use crate::coverage::Coverage;
use crate::error::{PaperbakError, Result};
use std::collections::BTreeMap;
use std::io::{Seek, SeekFrom, Write};
use std::ops::Range;

/// Bytes of the original file a payload occupies.
pub fn target_range(offset: u32, len: usize) -> Range<u64> {
    let start = offset as u64;
    start..start + len as u64
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// At least one byte landed somewhere not written before.
    Written,
    /// Every byte of the range had already been written by earlier frames.
    Rewritten,
}

/// Payloads already applied, kept only in strict mode.
#[derive(Default)]
struct Ledger {
    by_offset: BTreeMap<u64, Vec<u8>>,
    longest: u64,
}

impl Ledger {
    fn check(&self, range: &Range<u64>, payload: &[u8]) -> Result<()> {
        let from = range.start.saturating_sub(self.longest);
        for (&s, data) in self.by_offset.range(from..range.end) {
            let e = s + data.len() as u64;
            let lo = s.max(range.start);
            let hi = e.min(range.end);
            if lo >= hi {
                continue;
            }
            let mine = &payload[(lo - range.start) as usize..(hi - range.start) as usize];
            let theirs = &data[(lo - s) as usize..(hi - s) as usize];
            if let Some(i) = mine.iter().zip(theirs).position(|(a, b)| a != b) {
                return Err(PaperbakError::Conflict { offset: lo + i as u64 });
            }
        }
        Ok(())
    }

    fn record(&mut self, start: u64, payload: &[u8]) {
        self.longest = self.longest.max(payload.len() as u64);
        match self.by_offset.get(&start) {
            // Checked consistent already, so the longer one subsumes the other.
            Some(prev) if prev.len() >= payload.len() => {}
            _ => {
                self.by_offset.insert(start, payload.to_vec());
            }
        }
    }
}

pub struct Reconstructor<W: Write + Seek> {
    sink: W,
    coverage: Coverage,
    ledger: Option<Ledger>,
    applied: u64,
    rewritten: u64,
}

impl<W: Write + Seek> Reconstructor<W> {
    /// Last write wins on overlapping offsets.
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            coverage: Coverage::new(),
            ledger: None,
            applied: 0,
            rewritten: 0,
        }
    }

    /// Fails with `Conflict` instead of overwriting bytes with different content.
    pub fn strict(sink: W) -> Self {
        Self {
            ledger: Some(Ledger::default()),
            ..Self::new(sink)
        }
    }

    pub fn apply(&mut self, payload: &[u8], offset: u32) -> Result<ApplyOutcome> {
        let range = target_range(offset, payload.len());
        if let Some(ledger) = &self.ledger {
            ledger.check(&range, payload)?;
        }

        if !payload.is_empty() {
            self.sink.seek(SeekFrom::Start(range.start))?;
            self.sink.write_all(payload)?;
        }

        // An empty range is trivially covered; it never repeats earlier bytes.
        let outcome = if !payload.is_empty() && self.coverage.contains(range.clone()) {
            self.rewritten += 1;
            ApplyOutcome::Rewritten
        } else {
            ApplyOutcome::Written
        };
        if let Some(ledger) = &mut self.ledger {
            ledger.record(range.start, payload);
        }
        self.coverage.insert(range);
        self.applied += 1;
        Ok(outcome)
    }

    pub fn coverage(&self) -> &Coverage {
        &self.coverage
    }

    /// Frames applied, rewrites included.
    pub fn applied(&self) -> u64 {
        self.applied
    }

    pub fn rewritten(&self) -> u64 {
        self.rewritten
    }

    pub fn finish(mut self) -> Result<W> {
        self.sink.flush()?;
        Ok(self.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sink() -> Cursor<Vec<u8>> {
        Cursor::new(Vec::new())
    }

    #[test]
    fn example_in_either_order() {
        let mut a = Reconstructor::new(sink());
        a.apply(b"ABCD", 0).unwrap();
        a.apply(b"EFGH", 4).unwrap();
        assert_eq!(a.finish().unwrap().into_inner(), b"ABCDEFGH");

        let mut b = Reconstructor::new(sink());
        b.apply(b"EFGH", 4).unwrap();
        b.apply(b"ABCD", 0).unwrap();
        assert_eq!(b.finish().unwrap().into_inner(), b"ABCDEFGH");
    }

    #[test]
    fn duplicates_are_idempotent() {
        let mut r = Reconstructor::new(sink());
        assert_eq!(r.apply(b"EFGH", 4).unwrap(), ApplyOutcome::Written);
        assert_eq!(r.apply(b"EFGH", 4).unwrap(), ApplyOutcome::Rewritten);
        assert_eq!((r.applied(), r.rewritten()), (2, 1));
        // Gap before the first frame is zero-filled by the sink.
        assert_eq!(r.finish().unwrap().into_inner(), b"\0\0\0\0EFGH");
    }

    #[test]
    fn empty_payload_is_not_a_duplicate() {
        let mut r = Reconstructor::new(sink());
        assert_eq!(r.apply(b"", 0).unwrap(), ApplyOutcome::Written);
        assert_eq!(r.apply(b"", 0).unwrap(), ApplyOutcome::Written);
        assert_eq!((r.applied(), r.rewritten()), (2, 0));
        assert!(r.coverage().gaps().is_empty());
        assert!(r.finish().unwrap().into_inner().is_empty());
    }

    #[test]
    fn gaps_are_reported_not_fatal() {
        let mut r = Reconstructor::new(sink());
        r.apply(b"ABCD", 0).unwrap();
        r.apply(b"IJ", 8).unwrap();
        assert_eq!(r.coverage().gaps(), vec![4..8]);
        assert_eq!(r.coverage().extent(), 10);
        assert_eq!(r.coverage().covered_bytes(), 6);
    }

    #[test]
    fn last_write_wins_by_default() {
        let mut r = Reconstructor::new(sink());
        r.apply(b"ABCD", 0).unwrap();
        r.apply(b"XY", 1).unwrap();
        assert_eq!(r.finish().unwrap().into_inner(), b"AXYD");
    }

    #[test]
    fn strict_mode_rejects_conflicts() {
        let mut r = Reconstructor::strict(sink());
        r.apply(b"ABCD", 0).unwrap();
        assert_eq!(r.apply(b"BC", 1).unwrap(), ApplyOutcome::Rewritten);
        assert!(matches!(
            r.apply(b"BX", 1),
            Err(PaperbakError::Conflict { offset: 2 })
        ));
        // A rejected frame leaves the sink untouched.
        assert_eq!(r.finish().unwrap().into_inner(), b"ABCD");
    }

    #[test]
    fn strict_mode_checks_across_neighbours() {
        let mut r = Reconstructor::strict(sink());
        r.apply(b"ABCD", 0).unwrap();
        r.apply(b"EFGH", 4).unwrap();
        r.apply(b"DE", 3).unwrap();
        assert!(matches!(
            r.apply(b"CDEX", 2),
            Err(PaperbakError::Conflict { offset: 5 })
        ));
    }

    #[test]
    fn target_range_is_absolute() {
        assert_eq!(target_range(u32::MAX, 2), (u32::MAX as u64)..(u32::MAX as u64 + 2));
    }
}
