use std::io;

use data_error::Result;

use crate::stream::require;
use crate::{Category, SeekDirection, Stream};

/// Object-safe mirror of [`Stream`], implemented for every stream.
trait ErasedStream {
    fn category(&self) -> Category;
    fn filter_count(&self) -> usize;
    fn erased_read(&mut self, buf: &mut [u8]) -> Result<usize>;
    fn erased_write(&mut self, buf: &[u8]) -> Result<usize>;
    fn erased_seekg(&mut self, offset: i64, direction: SeekDirection) -> Result<bool>;
    fn erased_tellg(&self) -> Result<u64>;
    fn erased_seekp(&mut self, offset: i64, direction: SeekDirection) -> Result<bool>;
    fn erased_tellp(&self) -> Result<u64>;
    fn erased_size(&self) -> Result<u64>;
    fn erased_flush(&mut self) -> Result<()>;
    fn erased_eof(&self) -> Result<bool>;
    fn erased_good(&self) -> Result<bool>;
}

impl<T: Stream> ErasedStream for T {
    fn category(&self) -> Category {
        T::CATEGORY
    }

    fn filter_count(&self) -> usize {
        T::FILTER_COUNT
    }

    fn erased_read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.read(buf)
    }

    fn erased_write(&mut self, buf: &[u8]) -> Result<usize> {
        self.write(buf)
    }

    fn erased_seekg(&mut self, offset: i64, direction: SeekDirection) -> Result<bool> {
        self.seekg(offset, direction)
    }

    fn erased_tellg(&self) -> Result<u64> {
        self.tellg()
    }

    fn erased_seekp(&mut self, offset: i64, direction: SeekDirection) -> Result<bool> {
        self.seekp(offset, direction)
    }

    fn erased_tellp(&self) -> Result<u64> {
        self.tellp()
    }

    fn erased_size(&self) -> Result<u64> {
        self.size()
    }

    fn erased_flush(&mut self) -> Result<()> {
        self.flush()
    }

    fn erased_eof(&self) -> Result<bool> {
        self.eof()
    }

    fn erased_good(&self) -> Result<bool> {
        self.good()
    }
}

/// A stream of any composition behind one concrete type.
///
/// Useful where the exact pipeline type can't be named, e.g. to keep
/// streams of different shapes in one container or to pass them across
/// an API boundary. The capabilities, lost from the type, are available
/// through the `is_*` / `has_*` queries, and operations outside them
/// fail with [`StreamError::Unsupported`](data_error::StreamError) just
/// like on the concrete stream.
///
/// A dynamic stream either owns the wrapped stream ([`DynamicStream::new`])
/// or borrows it ([`DynamicStream::from_mut`]) for the lifetime `'a`.
pub struct DynamicStream<'a> {
    inner: Box<dyn ErasedStream + 'a>,
}

impl<'a> DynamicStream<'a> {
    pub fn new<S: Stream + 'a>(stream: S) -> Self {
        Self {
            inner: Box::new(stream),
        }
    }

    pub fn from_mut<S: Stream>(stream: &'a mut S) -> Self {
        Self::new(stream)
    }

    pub fn category(&self) -> Category {
        self.inner.category()
    }

    pub fn filter_count(&self) -> usize {
        self.inner.filter_count()
    }

    pub fn is_input(&self) -> bool {
        self.category().is_input()
    }

    pub fn is_input_seekable(&self) -> bool {
        self.category().is_input_seekable()
    }

    pub fn is_output(&self) -> bool {
        self.category().is_output()
    }

    pub fn is_output_seekable(&self) -> bool {
        self.category().is_output_seekable()
    }

    pub fn has_size(&self) -> bool {
        self.category().has_size()
    }

    pub fn has_status(&self) -> bool {
        self.category().has_status()
    }

    pub fn has_eof(&self) -> bool {
        self.category().has_eof()
    }

    pub fn is_flushable(&self) -> bool {
        self.category().is_flushable()
    }

    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        require(self.category(), Category::INPUT)?;
        self.inner.erased_read(buf)
    }

    pub fn write(&mut self, buf: &[u8]) -> Result<usize> {
        require(self.category(), Category::OUTPUT)?;
        self.inner.erased_write(buf)
    }

    pub fn seekg(&mut self, offset: i64, direction: SeekDirection) -> Result<bool> {
        require(self.category(), Category::INPUT_SEEKABLE)?;
        self.inner.erased_seekg(offset, direction)
    }

    pub fn tellg(&self) -> Result<u64> {
        require(self.category(), Category::INPUT_SEEKABLE)?;
        self.inner.erased_tellg()
    }

    pub fn seekp(&mut self, offset: i64, direction: SeekDirection) -> Result<bool> {
        require(self.category(), Category::OUTPUT_SEEKABLE)?;
        self.inner.erased_seekp(offset, direction)
    }

    pub fn tellp(&self) -> Result<u64> {
        require(self.category(), Category::OUTPUT_SEEKABLE)?;
        self.inner.erased_tellp()
    }

    pub fn size(&self) -> Result<u64> {
        require(self.category(), Category::HAS_SIZE)?;
        self.inner.erased_size()
    }

    pub fn flush(&mut self) -> Result<()> {
        require(self.category(), Category::FLUSHABLE)?;
        self.inner.erased_flush()
    }

    pub fn eof(&self) -> Result<bool> {
        require(self.category(), Category::HAS_EOF)?;
        self.inner.erased_eof()
    }

    pub fn good(&self) -> Result<bool> {
        require(self.category(), Category::HAS_STATUS)?;
        self.inner.erased_good()
    }
}

/// Wrap `stream` in an owning dynamic stream.
pub fn make_dynamic_stream<'a, S: Stream + 'a>(stream: S) -> DynamicStream<'a> {
    DynamicStream::new(stream)
}

/// Like [`make_dynamic_stream`], boxed for callers that keep
/// the handle behind a pointer.
pub fn make_dynamic_stream_ptr<'a, S: Stream + 'a>(
    stream: S,
) -> Box<DynamicStream<'a>> {
    Box::new(DynamicStream::new(stream))
}

impl io::Read for DynamicStream<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(DynamicStream::read(self, buf)?)
    }
}

impl io::Write for DynamicStream<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(DynamicStream::write(self, buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.is_flushable() {
            DynamicStream::flush(self)?;
        }
        Ok(())
    }
}
