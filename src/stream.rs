use std::marker::PhantomData;

use data_error::{Result, StreamError};

use crate::Category;

/// Origin of a seek offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekDirection {
    /// Offset from the first byte.
    Begin,
    /// Offset from the current cursor position.
    Current,
    /// Offset from the end of the data, usually zero or negative.
    End,
}

/// The read/write/seek contract shared by devices, pipelines and
/// everything in between.
///
/// A stream declares what it supports through [`Stream::CATEGORY`].
/// Operations outside that set keep their default body, which reports
/// [`StreamError::Unsupported`] naming the missing capability.
///
/// Transfers follow `std::io` conventions: `read` returning `Ok(0)` for
/// a non-empty buffer means there is no more data, and a `write`
/// returning less than the buffer length means the stream is out of
/// room. Neither is an error. Seeks outside the addressable range
/// return `Ok(false)` and leave the cursor untouched.
pub trait Stream {
    const CATEGORY: Category;

    /// Number of filters stacked above the device.
    const FILTER_COUNT: usize = 0;

    /// Reads and writes move one cursor, as with a file, so `seekg`
    /// and `seekp` are the same operation.
    const SHARED_CURSOR: bool = false;

    fn read(&mut self, _buf: &mut [u8]) -> Result<usize> {
        Err(unsupported(Category::INPUT))
    }

    fn write(&mut self, _buf: &[u8]) -> Result<usize> {
        Err(unsupported(Category::OUTPUT))
    }

    /// Move the read cursor.
    fn seekg(&mut self, _offset: i64, _direction: SeekDirection) -> Result<bool> {
        Err(unsupported(Category::INPUT_SEEKABLE))
    }

    /// Position of the read cursor.
    fn tellg(&self) -> Result<u64> {
        Err(unsupported(Category::INPUT_SEEKABLE))
    }

    /// Move the write cursor.
    fn seekp(&mut self, _offset: i64, _direction: SeekDirection) -> Result<bool> {
        Err(unsupported(Category::OUTPUT_SEEKABLE))
    }

    /// Position of the write cursor.
    fn tellp(&self) -> Result<u64> {
        Err(unsupported(Category::OUTPUT_SEEKABLE))
    }

    fn size(&self) -> Result<u64> {
        Err(unsupported(Category::HAS_SIZE))
    }

    fn flush(&mut self) -> Result<()> {
        Err(unsupported(Category::FLUSHABLE))
    }

    fn eof(&self) -> Result<bool> {
        Err(unsupported(Category::HAS_EOF))
    }

    /// Whether no I/O error has been observed so far.
    fn good(&self) -> Result<bool> {
        Err(unsupported(Category::HAS_STATUS))
    }
}

/// Terminal endpoint of a pipeline: the layer that owns or views the
/// actual bytes.
pub trait Device: Stream {}

impl<S: Stream> Stream for &mut S {
    const CATEGORY: Category = S::CATEGORY;
    const FILTER_COUNT: usize = S::FILTER_COUNT;
    const SHARED_CURSOR: bool = S::SHARED_CURSOR;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        (**self).write(buf)
    }

    fn seekg(&mut self, offset: i64, direction: SeekDirection) -> Result<bool> {
        (**self).seekg(offset, direction)
    }

    fn tellg(&self) -> Result<u64> {
        (**self).tellg()
    }

    fn seekp(&mut self, offset: i64, direction: SeekDirection) -> Result<bool> {
        (**self).seekp(offset, direction)
    }

    fn tellp(&self) -> Result<u64> {
        (**self).tellp()
    }

    fn size(&self) -> Result<u64> {
        (**self).size()
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn eof(&self) -> Result<bool> {
        (**self).eof()
    }

    fn good(&self) -> Result<bool> {
        (**self).good()
    }
}

pub(crate) fn unsupported(capability: Category) -> StreamError {
    StreamError::Unsupported(capability.name())
}

/// Fails with [`StreamError::Unsupported`] unless `category`
/// includes `capability`.
pub(crate) fn require(category: Category, capability: Category) -> Result<()> {
    if category.contains(capability) {
        Ok(())
    } else {
        Err(unsupported(capability))
    }
}

/// Build-time capability checks: each constant fails to evaluate, and
/// so fails the build, when `S` lacks the capability.
pub(crate) struct Capable<S>(PhantomData<S>);

impl<S: Stream> Capable<S> {
    pub(crate) const INPUT: () =
        assert!(S::CATEGORY.is_input(), "stream is not readable");
    pub(crate) const OUTPUT: () =
        assert!(S::CATEGORY.is_output(), "stream is not writable");
    pub(crate) const INPUT_SEEKABLE: () = assert!(
        S::CATEGORY.is_input_seekable(),
        "stream has no seekable read cursor"
    );
    pub(crate) const OUTPUT_SEEKABLE: () = assert!(
        S::CATEGORY.is_output_seekable(),
        "stream has no seekable write cursor"
    );
    pub(crate) const HAS_SIZE: () =
        assert!(S::CATEGORY.has_size(), "stream has no size");
    pub(crate) const FLUSHABLE: () =
        assert!(S::CATEGORY.is_flushable(), "stream is not flushable");
    pub(crate) const HAS_EOF: () =
        assert!(S::CATEGORY.has_eof(), "stream does not report end of data");
    pub(crate) const HAS_STATUS: () =
        assert!(S::CATEGORY.has_status(), "stream does not report status");
}

/// Inherent versions of the [`Stream`] operations for a concrete stack.
///
/// They shadow the trait methods in method-call syntax, so calling an
/// operation the stack's category lacks is a build error rather than a
/// runtime [`StreamError::Unsupported`]. Generic and dynamic callers go
/// through the trait and keep the runtime check.
macro_rules! checked_operations {
    ($($op:ident($($arg:ident: $ty:ty),*) -> $ret:ty, $self_:ty, $cap:ident;)+) => {
        $(
            #[allow(clippy::let_unit_value)]
            pub fn $op(self: $self_, $($arg: $ty),*) -> $crate::Result<$ret> {
                let () = $crate::stream::Capable::<Self>::$cap;
                <Self as $crate::Stream>::$op(self, $($arg),*)
            }
        )+
    };
    () => {
        $crate::stream::checked_operations! {
            read(buf: &mut [u8]) -> usize, &mut Self, INPUT;
            write(buf: &[u8]) -> usize, &mut Self, OUTPUT;
            seekg(offset: i64, direction: $crate::SeekDirection) -> bool, &mut Self, INPUT_SEEKABLE;
            tellg() -> u64, &Self, INPUT_SEEKABLE;
            seekp(offset: i64, direction: $crate::SeekDirection) -> bool, &mut Self, OUTPUT_SEEKABLE;
            tellp() -> u64, &Self, OUTPUT_SEEKABLE;
            size() -> u64, &Self, HAS_SIZE;
            flush() -> (), &mut Self, FLUSHABLE;
            eof() -> bool, &Self, HAS_EOF;
            good() -> bool, &Self, HAS_STATUS;
        }
    };
}

pub(crate) use checked_operations;

/// Resolve a seek request against a cursor and the end of the data.
///
/// Returns `None` when the target falls outside `0..=end`.
pub fn resolve_seek(
    current: u64,
    end: u64,
    offset: i64,
    direction: SeekDirection,
) -> Option<u64> {
    let base = match direction {
        SeekDirection::Begin => 0,
        SeekDirection::Current => current as i128,
        SeekDirection::End => end as i128,
    };
    let target = base + offset as i128;
    if target < 0 || target > end as i128 {
        return None;
    }
    Some(target as u64)
}
