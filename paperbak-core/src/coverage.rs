//! Merged set of byte ranges written during a restore.

use std::collections::BTreeMap;
use std::ops::Range;

#[derive(Debug, Default, Clone)]
pub struct Coverage {
    // start -> end, disjoint and non-adjacent
    ranges: BTreeMap<u64, u64>,
}

impl Coverage {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if every byte of `r` was already covered.
    pub fn contains(&self, r: Range<u64>) -> bool {
        if r.is_empty() {
            return true;
        }
        self.ranges
            .range(..=r.start)
            .next_back()
            .is_some_and(|(_, &end)| end >= r.end)
    }

    pub fn insert(&mut self, r: Range<u64>) {
        if r.is_empty() {
            return;
        }
        let mut start = r.start;
        let mut end = r.end;
        // Absorb a predecessor that touches or overlaps.
        if let Some((&s, &e)) = self.ranges.range(..=start).next_back() {
            if e >= start {
                start = s;
                end = end.max(e);
            }
        }
        let absorbed: Vec<u64> = self.ranges.range(start..=end).map(|(&s, _)| s).collect();
        for s in absorbed {
            if let Some(e) = self.ranges.remove(&s) {
                end = end.max(e);
            }
        }
        self.ranges.insert(start, end);
    }

    pub fn covered_bytes(&self) -> u64 {
        self.ranges.iter().map(|(s, e)| e - s).sum()
    }

    /// One past the highest covered byte.
    pub fn extent(&self) -> u64 {
        self.ranges.values().next_back().copied().unwrap_or(0)
    }

    /// Holes in `[0, extent)`.
    pub fn gaps(&self) -> Vec<Range<u64>> {
        let mut out = Vec::new();
        let mut cursor = 0u64;
        for (&s, &e) in &self.ranges {
            if s > cursor {
                out.push(cursor..s);
            }
            cursor = e;
        }
        out
    }

    #[cfg(test)]
    fn ranges(&self) -> impl Iterator<Item = Range<u64>> + '_ {
        self.ranges.iter().map(|(&s, &e)| s..e)
    }
}
