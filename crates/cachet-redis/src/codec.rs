//! Payload compression codec.
//!
//! Compression is a construction-time choice, fixed for the backend's
//! lifetime: a backend configured with level 0 stores raw bytes, any higher
//! level stores gzip. Mixing levels against the same namespace corrupts
//! reads, so the option must not change between deployments without a flush.

use std::io::{self, Read, Write};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

/// Encodes payloads for storage and decodes them transparently on read.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PayloadCodec {
    level: u32,
}

impl PayloadCodec {
    pub fn new(compression_level: u32) -> Self {
        Self {
            level: compression_level,
        }
    }

    pub fn uses_compression(&self) -> bool {
        self.level > 0
    }

    /// Compress a payload for storage. Level 0 stores the bytes verbatim.
    pub fn encode(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        if !self.uses_compression() {
            return Ok(data.to_vec());
        }
        let mut encoder = GzEncoder::new(Vec::new(), Compression::new(self.level));
        encoder.write_all(data)?;
        encoder.finish()
    }

    /// Inverse transform, applied on every read.
    ///
    /// A missing or empty stored value decodes to `None`, which is how
    /// callers distinguish "not found" from a found payload. A decoded
    /// payload may itself be empty (an empty string gzips to a non-empty
    /// frame).
    pub fn decode(&self, stored: Option<Vec<u8>>) -> io::Result<Option<Vec<u8>>> {
        let stored = match stored {
            Some(bytes) if !bytes.is_empty() => bytes,
            _ => return Ok(None),
        };
        if !self.uses_compression() {
            return Ok(Some(stored));
        }
        let mut decoder = GzDecoder::new(stored.as_slice());
        let mut data = Vec::new();
        decoder.read_to_end(&mut data)?;
        Ok(Some(data))
    }
}
