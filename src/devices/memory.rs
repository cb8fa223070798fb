use log::trace;

use data_error::Result;

use super::OpenMode;
use crate::stream::resolve_seek;
use crate::{Category, Device, SeekDirection, Stream};

/// Growable in-memory byte store.
///
/// Reads and writes use independent cursors, so data written at the
/// end can be read back from the start without seeking in between.
/// Writing past the end grows the buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryDevice {
    buffer: Vec<u8>,
    read_pos: usize,
    write_pos: usize,
    mode: OpenMode,
}

impl MemoryDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Device over existing data, with the read cursor at the start
    /// and the write cursor at the end.
    pub fn from_vec(buffer: Vec<u8>) -> Self {
        let write_pos = buffer.len();
        Self {
            buffer,
            read_pos: 0,
            write_pos,
            mode: OpenMode::READ_WRITE,
        }
    }

    pub fn with_mode(buffer: Vec<u8>, mode: OpenMode) -> Result<Self> {
        let mode = mode.validate()?;
        let mut device = Self::from_vec(buffer);
        device.mode = mode;
        if mode.contains(OpenMode::TRUNCATE) {
            device.clear();
        }
        trace!(
            "Memory device over {} bytes opened with {:?}",
            device.buffer.len(),
            mode
        );
        Ok(device)
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// Copy bytes at the read cursor without consuming them.
    pub fn peek(&self, buf: &mut [u8]) -> Result<usize> {
        self.mode.check_read()?;
        let available = &self.buffer[self.read_pos.min(self.buffer.len())..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        Ok(n)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Drop all data and rewind both cursors.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.read_pos = 0;
        self.write_pos = 0;
    }
}

impl Stream for MemoryDevice {
    const CATEGORY: Category = Category::INPUT
        .union(Category::INPUT_SEEKABLE)
        .union(Category::OUTPUT)
        .union(Category::OUTPUT_SEEKABLE)
        .union(Category::HAS_SIZE)
        .union(Category::HAS_EOF);

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = self.peek(buf)?;
        self.read_pos += n;
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.mode.check_write()?;
        if self.mode.is_append() {
            self.write_pos = self.buffer.len();
        }
        let end = self.write_pos + buf.len();
        if end > self.buffer.len() {
            self.buffer.resize(end, 0);
        }
        self.buffer[self.write_pos..end].copy_from_slice(buf);
        self.write_pos = end;
        Ok(buf.len())
    }

    fn seekg(&mut self, offset: i64, direction: SeekDirection) -> Result<bool> {
        self.mode.check_read()?;
        let target = resolve_seek(
            self.read_pos as u64,
            self.buffer.len() as u64,
            offset,
            direction,
        );
        Ok(match target {
            Some(position) => {
                self.read_pos = position as usize;
                true
            }
            None => false,
        })
    }

    fn tellg(&self) -> Result<u64> {
        Ok(self.read_pos as u64)
    }

    fn seekp(&mut self, offset: i64, direction: SeekDirection) -> Result<bool> {
        self.mode.check_write()?;
        if self.mode.is_append() {
            return Ok(false);
        }
        let target = resolve_seek(
            self.write_pos as u64,
            self.buffer.len() as u64,
            offset,
            direction,
        );
        Ok(match target {
            Some(position) => {
                self.write_pos = position as usize;
                true
            }
            None => false,
        })
    }

    fn tellp(&self) -> Result<u64> {
        Ok(self.write_pos as u64)
    }

    fn size(&self) -> Result<u64> {
        Ok(self.buffer.len() as u64)
    }

    fn eof(&self) -> Result<bool> {
        Ok(self.read_pos >= self.buffer.len())
    }
}

impl Device for MemoryDevice {}
