use data_error::Result;

use crate::{Category, SeekDirection, Stream};

mod circular_buffer;
mod seek_offset;
mod size;
mod zlib;

pub use circular_buffer::{
    CircularBufferConfig, CircularBufferFilter, OverflowPolicy,
    DEFAULT_RING_CAPACITY,
};
pub use seek_offset::SeekOffsetFilter;
pub use size::SizeFilter;
pub use zlib::{ZlibCompressFilter, ZlibDecompressFilter, DEFAULT_CHUNK_SIZE};

/// A transformation stage stacked above a device or another filter.
///
/// Every operation receives the layer directly below as `source`.
/// The default bodies forward the request untouched, so a filter only
/// overrides what it actually changes.
///
/// The capabilities of the composed [`Pipeline`](crate::Pipeline) are
/// `(CATEGORY ∩ lower) ∪ INTRINSIC`:
///
/// * `CATEGORY` lists the operations the filter lets through or
///   implements on top of the lower layer,
/// * `INTRINSIC` lists what the filter provides on its own, whether or
///   not the lower layer has it,
/// * `REQUIRES` lists what the lower layer must provide. Stacking the
///   filter over a layer that lacks one of these does not compile.
pub trait Filter {
    const CATEGORY: Category;
    const INTRINSIC: Category = Category::empty();
    const REQUIRES: Category = Category::empty();

    fn read<S: Stream>(&mut self, source: &mut S, buf: &mut [u8]) -> Result<usize> {
        source.read(buf)
    }

    fn write<S: Stream>(&mut self, source: &mut S, buf: &[u8]) -> Result<usize> {
        source.write(buf)
    }

    fn seekg<S: Stream>(
        &mut self,
        source: &mut S,
        offset: i64,
        direction: SeekDirection,
    ) -> Result<bool> {
        source.seekg(offset, direction)
    }

    fn tellg<S: Stream>(&self, source: &S) -> Result<u64> {
        source.tellg()
    }

    fn seekp<S: Stream>(
        &mut self,
        source: &mut S,
        offset: i64,
        direction: SeekDirection,
    ) -> Result<bool> {
        source.seekp(offset, direction)
    }

    fn tellp<S: Stream>(&self, source: &S) -> Result<u64> {
        source.tellp()
    }

    fn size<S: Stream>(&self, source: &S) -> Result<u64> {
        source.size()
    }

    fn flush<S: Stream>(&mut self, source: &mut S) -> Result<()> {
        source.flush()
    }

    fn eof<S: Stream>(&self, source: &S) -> Result<bool> {
        source.eof()
    }

    fn good<S: Stream>(&self, source: &S) -> Result<bool> {
        source.good()
    }

    /// Called once when the owning pipeline is dropped, before the
    /// layers below are dropped.
    fn finalize<S: Stream>(&mut self, _source: &mut S) -> Result<()> {
        Ok(())
    }
}

/// Whether `F` may be stacked directly above `S`.
pub const fn compatible<F: Filter, S: Stream>() -> bool {
    S::CATEGORY.contains(F::REQUIRES)
}
