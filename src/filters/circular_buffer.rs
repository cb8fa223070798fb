use std::io::ErrorKind;

use log::{debug, warn};
use ringbuf::traits::{Consumer, Observer, Producer};
use ringbuf::HeapRb;
use serde::{Deserialize, Serialize};

use data_error::{Result, StreamError};

use super::Filter;
use crate::{Category, Stream};

pub const DEFAULT_RING_CAPACITY: usize = 4096;

/// What a write does with bytes that don't fit in the ring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Accept what fits and report a short write.
    #[default]
    ShortWrite,
    /// Accept what fits and fail with [`StreamError::BufferFull`].
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircularBufferConfig {
    pub capacity: usize,
    pub overflow: OverflowPolicy,
}

impl Default for CircularBufferConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_RING_CAPACITY,
            overflow: OverflowPolicy::default(),
        }
    }
}

/// Fixed-capacity ring buffers between the consumer and the lower stream.
///
/// Reads are served from a read-ahead ring which is refilled from below
/// until the request can be satisfied or the lower stream runs dry, so
/// many small reads from a chunky source turn into full-sized ones.
/// Writes are staged in a write-behind ring and handed down when it
/// fills up, before the next read, on flush and when the pipeline is
/// dropped. Bytes are never dropped: a write that does not fit is
/// either shortened or rejected with [`StreamError::BufferFull`].
pub struct CircularBufferFilter {
    input: HeapRb<u8>,
    output: HeapRb<u8>,
    scratch: Vec<u8>,
    overflow: OverflowPolicy,
}

impl CircularBufferFilter {
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_policy(capacity, OverflowPolicy::default())
    }

    pub fn with_policy(capacity: usize, overflow: OverflowPolicy) -> Result<Self> {
        if capacity == 0 {
            return Err(StreamError::InvalidArgument(
                "circular buffer capacity must be positive".to_owned(),
            ));
        }
        Ok(Self {
            input: HeapRb::new(capacity),
            output: HeapRb::new(capacity),
            scratch: vec![0; capacity],
            overflow,
        })
    }

    pub fn from_config(config: &CircularBufferConfig) -> Result<Self> {
        Self::with_policy(config.capacity, config.overflow)
    }

    pub fn capacity(&self) -> usize {
        self.scratch.len()
    }

    pub fn overflow_policy(&self) -> OverflowPolicy {
        self.overflow
    }

    /// Bytes read ahead from the lower stream, not consumed yet.
    pub fn buffered_input(&self) -> usize {
        self.input.occupied_len()
    }

    /// Bytes written but not handed to the lower stream yet.
    pub fn pending_output(&self) -> usize {
        self.output.occupied_len()
    }

    /// Hand staged bytes to the lower stream until it stops accepting.
    fn drain<S: Stream>(&mut self, source: &mut S) -> Result<()> {
        while !self.output.is_empty() {
            let (head, _) = self.output.as_slices();
            let n = source.write(head)?;
            if n == 0 {
                break;
            }
            self.output.skip(n);
        }
        Ok(())
    }

    fn drain_all<S: Stream>(&mut self, source: &mut S) -> Result<()> {
        self.drain(source)?;
        if !self.output.is_empty() {
            return Err(StreamError::Io(std::io::Error::new(
                ErrorKind::WriteZero,
                format!(
                    "lower stream refused {} buffered bytes",
                    self.output.occupied_len()
                ),
            )));
        }
        Ok(())
    }

    fn fill<S: Stream>(&mut self, source: &mut S, wanted: usize) -> Result<()> {
        while self.input.occupied_len() < wanted && !self.input.is_full() {
            let room = self.input.vacant_len();
            let n = source.read(&mut self.scratch[..room])?;
            if n == 0 {
                break;
            }
            self.input.push_slice(&self.scratch[..n]);
        }
        Ok(())
    }
}

impl Filter for CircularBufferFilter {
    const CATEGORY: Category = Category::INPUT
        .union(Category::OUTPUT)
        .union(Category::HAS_EOF)
        .union(Category::HAS_STATUS);
    const INTRINSIC: Category = Category::FLUSHABLE.union(Category::HAS_SIZE);

    fn read<S: Stream>(&mut self, source: &mut S, buf: &mut [u8]) -> Result<usize> {
        if S::CATEGORY.is_output() && !self.output.is_empty() {
            self.drain(source)?;
        }
        self.fill(source, buf.len())?;
        Ok(self.input.pop_slice(buf))
    }

    fn write<S: Stream>(&mut self, source: &mut S, buf: &[u8]) -> Result<usize> {
        if self.output.vacant_len() < buf.len() {
            self.drain(source)?;
        }
        let accepted = self.output.push_slice(buf);
        if accepted < buf.len() {
            match self.overflow {
                OverflowPolicy::ShortWrite => {
                    debug!(
                        "Circular buffer full, accepted {} of {} bytes",
                        accepted,
                        buf.len()
                    );
                }
                OverflowPolicy::Error => {
                    warn!(
                        "Circular buffer overflow, accepted {} of {} bytes",
                        accepted,
                        buf.len()
                    );
                    return Err(StreamError::BufferFull {
                        accepted,
                        requested: buf.len(),
                    });
                }
            }
        }
        Ok(accepted)
    }

    fn size<S: Stream>(&self, source: &S) -> Result<u64> {
        if S::CATEGORY.has_size() {
            source.size()
        } else {
            Ok(self.capacity() as u64)
        }
    }

    fn flush<S: Stream>(&mut self, source: &mut S) -> Result<()> {
        self.drain_all(source)?;
        if S::CATEGORY.is_flushable() {
            source.flush()?;
        }
        Ok(())
    }

    fn eof<S: Stream>(&self, source: &S) -> Result<bool> {
        Ok(self.input.is_empty() && source.eof()?)
    }

    fn finalize<S: Stream>(&mut self, source: &mut S) -> Result<()> {
        if self.output.is_empty() {
            return Ok(());
        }
        self.flush(source)
    }
}
