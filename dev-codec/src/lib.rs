//! # Dev Codec
//!
//! `dev-codec` is the block-oriented codec layer used by the compression
//! filters of `ark-streams`. A codec is driven one window at a time: the
//! caller hands it a slice of input and a slice of output space, and the
//! codec reports how much of each it used.
//!
//! The on-wire format is always the codec family's own standard container,
//! so anything written here can be read back by any compliant decoder.
//!
//! ## Codecs
//!
//! - [`ZlibEncoder`] / [`ZlibDecoder`]: zlib (RFC 1950) or raw deflate
//!   (RFC 1951), backed by [`flate2`].

use data_error::{Result, StreamError};
use serde::{Deserialize, Serialize};

pub mod zlib;

pub use zlib::{Format, ZlibDecoder, ZlibEncoder};

/// Size of the scratch window used by the whole-buffer helpers.
const WINDOW_SIZE: usize = 4096;

/// Compression level in the usual `0..=9` range,
/// where 0 stores data uncompressed and 9 compresses best.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "u32", into = "u32")]
pub struct CompressionLevel(u32);

impl CompressionLevel {
    pub const NONE: CompressionLevel = CompressionLevel(0);
    pub const FAST: CompressionLevel = CompressionLevel(1);
    pub const DEFAULT: CompressionLevel = CompressionLevel(6);
    pub const BEST: CompressionLevel = CompressionLevel(9);

    pub fn new(level: u32) -> Result<Self> {
        if level > Self::BEST.0 {
            return Err(StreamError::InvalidArgument(format!(
                "compression level {} is outside 0..=9",
                level
            )));
        }
        Ok(CompressionLevel(level))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for CompressionLevel {
    type Error = StreamError;

    fn try_from(level: u32) -> Result<Self> {
        Self::new(level)
    }
}

impl From<CompressionLevel> for u32 {
    fn from(level: CompressionLevel) -> u32 {
        level.0
    }
}

/// How much of its internal state an encoder must emit after a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flush {
    /// Emit output only when the codec decides to.
    None,
    /// Emit everything buffered so far, aligned to a byte boundary,
    /// without terminating the stream.
    Sync,
    /// Emit everything and terminate the stream.
    Finish,
}

/// Result of a single codec call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    /// Bytes taken from the input slice.
    pub consumed: usize,
    /// Bytes written into the output slice.
    pub produced: usize,
    /// The end of the stream has been written (encoder)
    /// or reached (decoder).
    pub done: bool,
}

impl Progress {
    /// Neither input was consumed nor output produced.
    pub fn is_stalled(&self) -> bool {
        self.consumed == 0 && self.produced == 0
    }
}

/// A streaming compressor.
pub trait Encoder {
    /// Feed `input` and write encoded bytes into `output`.
    ///
    /// Must be called with [`Flush::Finish`] until [`Progress::done`]
    /// is reported, otherwise the encoded stream is truncated.
    fn encode(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: Flush,
    ) -> Result<Progress>;

    /// Forget all state and start a new stream.
    fn reset(&mut self);

    /// Codec name
    fn name(&self) -> &'static str;

    /// Encode a whole buffer into a terminated stream.
    fn encode_all(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::with_capacity(input.len() / 2 + 64);
        let mut window = [0u8; WINDOW_SIZE];
        let mut consumed = 0;
        loop {
            let progress =
                self.encode(&input[consumed..], &mut window, Flush::Finish)?;
            consumed += progress.consumed;
            output.extend_from_slice(&window[..progress.produced]);
            if progress.done {
                return Ok(output);
            }
            if progress.is_stalled() {
                return Err(StreamError::Compress(format!(
                    "{} encoder made no progress",
                    self.name()
                )));
            }
        }
    }
}

/// A streaming decompressor.
pub trait Decoder {
    /// Feed `input` and write decoded bytes into `output`.
    fn decode(&mut self, input: &[u8], output: &mut [u8]) -> Result<Progress>;

    /// Forget all state and expect a new stream.
    fn reset(&mut self);

    /// Codec name
    fn name(&self) -> &'static str;

    /// Decode a complete stream held in memory.
    ///
    /// Input that ends before the end-of-stream marker is reported
    /// as a [`StreamError::Decompress`] error.
    fn decode_all(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::with_capacity(input.len() * 2);
        let mut window = [0u8; WINDOW_SIZE];
        let mut consumed = 0;
        loop {
            let progress = self.decode(&input[consumed..], &mut window)?;
            consumed += progress.consumed;
            output.extend_from_slice(&window[..progress.produced]);
            if progress.done {
                return Ok(output);
            }
            if progress.is_stalled() {
                return Err(StreamError::Decompress(format!(
                    "{} stream ended before its end marker",
                    self.name()
                )));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compression_level_bounds() {
        assert_eq!(CompressionLevel::new(0).unwrap(), CompressionLevel::NONE);
        assert_eq!(CompressionLevel::new(9).unwrap().get(), 9);
        assert!(matches!(
            CompressionLevel::new(10),
            Err(StreamError::InvalidArgument(_))
        ));
        assert_eq!(CompressionLevel::default().get(), 6);
    }

    #[test]
    fn compression_level_serde() {
        let level: CompressionLevel = serde_json::from_str("3").unwrap();
        assert_eq!(level.get(), 3);
        assert!(serde_json::from_str::<CompressionLevel>("12").is_err());
        assert_eq!(serde_json::to_string(&CompressionLevel::BEST).unwrap(), "9");
    }
}
