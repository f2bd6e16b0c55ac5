//! Checksummed index reader
//!
//! Wraps the index file and feeds every byte read into a running SHA-1 so the
//! trailing checksum can be verified once the entries and extensions have
//! been consumed.

use crate::artifacts::index::CHECKSUM_SIZE;
use crate::errors::CoreError;
use bytes::Bytes;
use sha1::{Digest, Sha1};
use std::io::Read;

#[derive(Debug)]
pub struct Checksum<R> {
    inner: R,
    digest: Sha1,
    bytes_read: usize,
}

impl<R: Read> Checksum<R> {
    pub fn new(inner: R) -> Self {
        Checksum {
            inner,
            digest: Sha1::new(),
            bytes_read: 0,
        }
    }

    /// Bytes consumed so far, excluding the trailing checksum.
    pub fn bytes_read(&self) -> usize {
        self.bytes_read
    }

    pub fn read(&mut self, size: usize) -> anyhow::Result<Bytes> {
        let mut buffer = vec![0; size];
        self.inner
            .read_exact(&mut buffer)
            .map_err(|_| CoreError::CorruptIndex("unexpected end of index".to_string()))?;

        self.digest.update(&buffer);
        self.bytes_read += size;
        Ok(Bytes::from(buffer))
    }

    /// Read the trailing 20 bytes and compare them against the digest of
    /// everything read before.
    pub fn verify(&mut self) -> anyhow::Result<()> {
        let mut expected = [0u8; CHECKSUM_SIZE];
        self.inner
            .read_exact(&mut expected)
            .map_err(|_| CoreError::CorruptIndex("missing checksum".to_string()))?;

        let actual = self.digest.clone().finalize();
        if expected != actual.as_slice() {
            return Err(CoreError::CorruptIndex("checksum mismatch".to_string()).into());
        }

        Ok(())
    }
}
