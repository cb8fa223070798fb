use data_error::Result;

use crate::stream::resolve_seek;
use crate::{Category, Device, SeekDirection, Stream};

/// Fixed-capacity device over a borrowed mutable slice.
///
/// The whole slice is addressable: reads see its current contents and
/// writes overwrite it in place. A write that does not fit in the space
/// left before the end of the slice is shortened.
#[derive(Debug)]
pub struct SpanDevice<'a> {
    data: &'a mut [u8],
    read_pos: usize,
    write_pos: usize,
}

impl<'a> SpanDevice<'a> {
    pub fn new(data: &'a mut [u8]) -> Self {
        Self {
            data,
            read_pos: 0,
            write_pos: 0,
        }
    }

    /// Room left before the write cursor reaches the end of the slice.
    pub fn remaining_capacity(&self) -> usize {
        self.data.len() - self.write_pos
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data[..]
    }
}

impl Stream for SpanDevice<'_> {
    const CATEGORY: Category = Category::INPUT
        .union(Category::INPUT_SEEKABLE)
        .union(Category::OUTPUT)
        .union(Category::OUTPUT_SEEKABLE)
        .union(Category::HAS_SIZE)
        .union(Category::HAS_EOF);

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let available = &self.data[self.read_pos..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.read_pos += n;
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let n = self.remaining_capacity().min(buf.len());
        self.data[self.write_pos..self.write_pos + n].copy_from_slice(&buf[..n]);
        self.write_pos += n;
        Ok(n)
    }

    fn seekg(&mut self, offset: i64, direction: SeekDirection) -> Result<bool> {
        let len = self.data.len() as u64;
        Ok(match resolve_seek(self.read_pos as u64, len, offset, direction) {
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
        let len = self.data.len() as u64;
        Ok(match resolve_seek(self.write_pos as u64, len, offset, direction) {
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
        Ok(self.data.len() as u64)
    }

    fn eof(&self) -> Result<bool> {
        Ok(self.read_pos >= self.data.len())
    }
}

impl Device for SpanDevice<'_> {}
