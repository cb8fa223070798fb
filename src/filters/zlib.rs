use std::io::ErrorKind;

use log::{debug, trace};

use data_error::{Result, StreamError};
use dev_codec::{
    CompressionLevel, Decoder, Encoder, Flush, ZlibDecoder, ZlibEncoder,
};

use super::Filter;
use crate::{Category, Stream, StreamConfig};

/// Window size used when none is given.
pub const DEFAULT_CHUNK_SIZE: usize = 256;

/// Compresses everything written through it into a zlib stream.
///
/// Input is fed to the encoder in windows of `CHUNK_SIZE` bytes. At most
/// one window of compressed output is held back when the lower stream
/// stops accepting data; past that, writes are short.
/// Flushing the filter terminates the zlib stream and hands every
/// remaining byte to the lower stream, so nothing can be written
/// afterwards. A pipeline holding this filter flushes it when dropped.
pub struct ZlibCompressFilter<const CHUNK_SIZE: usize = DEFAULT_CHUNK_SIZE> {
    encoder: ZlibEncoder,
    window: Vec<u8>,
    pending: Vec<u8>,
    finished: bool,
}

impl ZlibCompressFilter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<const CHUNK_SIZE: usize> ZlibCompressFilter<CHUNK_SIZE> {
    pub fn with_level(level: CompressionLevel) -> Self {
        Self {
            encoder: ZlibEncoder::new(level),
            window: vec![0; CHUNK_SIZE.max(1)],
            pending: Vec::new(),
            finished: false,
        }
    }

    pub fn from_config(config: &StreamConfig) -> Self {
        Self::with_level(config.compression_level)
    }

    pub fn level(&self) -> CompressionLevel {
        self.encoder.level()
    }

    /// Whether the zlib stream has been terminated.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Compressed bytes the lower stream has not accepted yet.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    fn encode(&mut self, mut input: &[u8], flush: Flush) -> Result<()> {
        loop {
            let progress = self.encoder.encode(input, &mut self.window, flush)?;
            input = &input[progress.consumed..];
            self.pending
                .extend_from_slice(&self.window[..progress.produced]);

            if progress.done {
                return Ok(());
            }
            let window_full = progress.produced == self.window.len();
            if input.is_empty() && !window_full && flush != Flush::Finish {
                return Ok(());
            }
            if progress.is_stalled() {
                return Err(StreamError::Compress(
                    "zlib encoder made no progress".to_owned(),
                ));
            }
        }
    }

    fn write_pending<S: Stream>(&mut self, source: &mut S) -> Result<()> {
        let mut written = 0;
        while written < self.pending.len() {
            let n = source.write(&self.pending[written..])?;
            if n == 0 {
                break;
            }
            written += n;
        }
        self.pending.drain(..written);
        Ok(())
    }
}

impl<const CHUNK_SIZE: usize> Default for ZlibCompressFilter<CHUNK_SIZE> {
    fn default() -> Self {
        Self::with_level(CompressionLevel::default())
    }
}

impl<const CHUNK_SIZE: usize> Filter for ZlibCompressFilter<CHUNK_SIZE> {
    const CATEGORY: Category = Category::OUTPUT;
    const INTRINSIC: Category = Category::FLUSHABLE;
    const REQUIRES: Category = Category::OUTPUT;

    fn write<S: Stream>(&mut self, source: &mut S, buf: &[u8]) -> Result<usize> {
        if self.finished {
            return Err(StreamError::Compress(
                "write after the zlib stream was terminated".to_owned(),
            ));
        }
        let mut consumed = 0;
        for chunk in buf.chunks(self.window.len()) {
            self.write_pending(source)?;
            if self.pending.len() > self.window.len() {
                break;
            }
            self.encode(chunk, Flush::None)?;
            consumed += chunk.len();
        }
        self.write_pending(source)?;
        if consumed < buf.len() {
            debug!(
                "Lower stream is full: took {} of {} bytes, {} compressed bytes pending",
                consumed,
                buf.len(),
                self.pending.len()
            );
        }
        Ok(consumed)
    }

    fn flush<S: Stream>(&mut self, source: &mut S) -> Result<()> {
        if !self.finished {
            self.encode(&[], Flush::Finish)?;
            self.finished = true;
            trace!(
                "zlib stream terminated: {} bytes in, {} bytes out",
                self.encoder.total_in(),
                self.encoder.total_out()
            );
        }
        self.write_pending(source)?;
        if !self.pending.is_empty() {
            return Err(StreamError::Io(std::io::Error::new(
                ErrorKind::WriteZero,
                format!(
                    "lower stream refused {} compressed bytes",
                    self.pending.len()
                ),
            )));
        }
        if S::CATEGORY.is_flushable() {
            source.flush()?;
        }
        Ok(())
    }

    fn finalize<S: Stream>(&mut self, source: &mut S) -> Result<()> {
        if self.finished && self.pending.is_empty() {
            return Ok(());
        }
        self.flush(source)
    }
}

/// Decompresses a zlib stream read from the lower stream.
///
/// Compressed input is pulled in windows of `CHUNK_SIZE` bytes. Input
/// that ends before the zlib end marker, or that is not zlib data at
/// all, is a [`StreamError::Decompress`] error. Once the end marker
/// has been decoded the filter reports end of data.
pub struct ZlibDecompressFilter<const CHUNK_SIZE: usize = DEFAULT_CHUNK_SIZE> {
    decoder: ZlibDecoder,
    window: Vec<u8>,
    start: usize,
    end: usize,
    done: bool,
}

impl ZlibDecompressFilter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<const CHUNK_SIZE: usize> ZlibDecompressFilter<CHUNK_SIZE> {
    /// Whether the end of the zlib stream has been decoded.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Move unread input to the front of the window and read more
    /// from below. Returns `false` once the lower stream has no more.
    fn refill<S: Stream>(&mut self, source: &mut S) -> Result<bool> {
        self.window.copy_within(self.start..self.end, 0);
        self.end -= self.start;
        self.start = 0;
        if self.end == self.window.len() {
            return Err(StreamError::Decompress(
                "zlib decoder made no progress".to_owned(),
            ));
        }
        let n = source.read(&mut self.window[self.end..])?;
        self.end += n;
        Ok(n > 0)
    }
}

impl<const CHUNK_SIZE: usize> Default for ZlibDecompressFilter<CHUNK_SIZE> {
    fn default() -> Self {
        Self {
            decoder: ZlibDecoder::new(),
            window: vec![0; CHUNK_SIZE.max(1)],
            start: 0,
            end: 0,
            done: false,
        }
    }
}

impl<const CHUNK_SIZE: usize> Filter for ZlibDecompressFilter<CHUNK_SIZE> {
    const CATEGORY: Category = Category::INPUT;
    const INTRINSIC: Category = Category::HAS_EOF;
    const REQUIRES: Category = Category::INPUT;

    fn read<S: Stream>(&mut self, source: &mut S, buf: &mut [u8]) -> Result<usize> {
        if self.done || buf.is_empty() {
            return Ok(0);
        }
        loop {
            // the decoder may hold output from input it already consumed
            let progress = self
                .decoder
                .decode(&self.window[self.start..self.end], buf)?;
            self.start += progress.consumed;

            if progress.done {
                self.done = true;
                trace!(
                    "zlib stream complete: {} bytes in, {} bytes out",
                    self.decoder.total_in(),
                    self.decoder.total_out()
                );
            }
            if progress.produced > 0 || self.done {
                return Ok(progress.produced);
            }
            if progress.consumed > 0 && self.start < self.end {
                continue;
            }
            if !self.refill(source)? && progress.is_stalled() {
                return Err(StreamError::Decompress(
                    "zlib stream ended before its end marker".to_owned(),
                ));
            }
        }
    }

    fn eof<S: Stream>(&self, _source: &S) -> Result<bool> {
        Ok(self.done)
    }
}
