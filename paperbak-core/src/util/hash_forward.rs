use crate::digest::ContentDigest;
use std::io::{Result, Write};

/// Forwards writes to `inner`, feeding every accepted byte into a digest.
pub struct HashingForward<'a, W: Write> {
    inner: W,
    digest: &'a mut ContentDigest,
    pub counted: u64,
}

impl<'a, W: Write> HashingForward<'a, W> {
    pub fn new(inner: W, digest: &'a mut ContentDigest) -> Self {
        Self {
            inner,
            digest,
            counted: 0,
        }
    }
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<'a, W: Write> Write for HashingForward<'a, W> {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        // Only hash what the inner writer took.
        let n = self.inner.write(buf)?;
        self.digest.update(&buf[..n]);
        self.counted += n as u64;
        Ok(n)
    }
    fn flush(&mut self) -> Result<()> {
        self.inner.flush()
    }
}
