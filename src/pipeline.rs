use std::marker::PhantomData;
use std::ops::BitOr;

use log::{error, trace};

use data_error::Result;

use crate::filters::Filter;
use crate::stream::{checked_operations, require};
use crate::{
    Category, Device, FileDevice, MemoryDevice, MemoryViewDevice,
    SeekDirection, SocketDevice, SpanDevice, Stream,
};

/// A filter stacked over a lower stream, which is either a device or
/// another pipeline.
///
/// Stacks are built bottom-up with [`compose`], [`Pipeline::pipe`] or the
/// `|` operator, so the first filter named sits directly above the
/// device:
///
/// ```
/// use ark_streams::{MemoryDevice, SeekOffsetFilter, ZlibDecompressFilter};
///
/// let pipeline = MemoryDevice::new()
///     | SeekOffsetFilter::new(10)
///     | ZlibDecompressFilter::new();
/// assert_eq!(pipeline.filter_count(), 2);
/// let _offset: &SeekOffsetFilter = pipeline.filter::<0>();
/// ```
///
/// The capabilities of a pipeline are fixed by its type. Stacking a
/// filter over a layer lacking a capability the filter requires is a
/// compile error, and so is calling an operation outside the pipeline's
/// category. Code that only knows the pipeline as some [`Stream`], like
/// a [`DynamicStream`](crate::DynamicStream), gets
/// [`StreamError::Unsupported`](data_error::StreamError) instead.
///
/// ```compile_fail
/// use ark_streams::{MemoryDevice, SeekDirection, ZlibCompressFilter};
///
/// let mut pipeline = MemoryDevice::new() | ZlibCompressFilter::new();
/// pipeline.seekp(0, SeekDirection::Begin).unwrap();
/// ```
///
/// Dropping a pipeline finalizes its filters from the top down, so a
/// compression filter always terminates its output.
pub struct Pipeline<F: Filter, S: Stream> {
    filter: F,
    source: S,
}

struct Compatible<F, S>(PhantomData<(F, S)>);

impl<F: Filter, S: Stream> Compatible<F, S> {
    const CHECK: () = assert!(
        S::CATEGORY.contains(F::REQUIRES),
        "filter requires a capability the stream below does not provide"
    );
}

/// Stack `filter` directly above `stream`.
pub fn compose<S: Stream, F: Filter>(stream: S, filter: F) -> Pipeline<F, S> {
    Pipeline::new(stream, filter)
}

impl<F: Filter, S: Stream> Pipeline<F, S> {
    pub fn new(source: S, filter: F) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Compatible::<F, S>::CHECK;
        trace!(
            "Stacking filter {} over {} ({:?})",
            Self::FILTER_COUNT - 1,
            std::any::type_name::<S>(),
            Self::CATEGORY
        );
        Self { filter, source }
    }

    checked_operations!();

    /// Stack another filter on top.
    pub fn pipe<G: Filter>(self, filter: G) -> Pipeline<G, Self> {
        Pipeline::new(self, filter)
    }

    pub fn filter_count(&self) -> usize {
        Self::FILTER_COUNT
    }

    pub fn category(&self) -> Category {
        Self::CATEGORY
    }

    /// The outermost filter.
    pub fn top(&self) -> &F {
        &self.filter
    }

    pub fn top_mut(&mut self) -> &mut F {
        &mut self.filter
    }

    /// Everything below the outermost filter.
    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// The device at the bottom of the stack.
    pub fn device(&self) -> &<Self as DeviceAccess>::Device
    where
        Self: DeviceAccess,
    {
        self.device_ref()
    }

    pub fn device_mut(&mut self) -> &mut <Self as DeviceAccess>::Device
    where
        Self: DeviceAccess,
    {
        self.device_mut_ref()
    }

    /// Filter number `K`, counting from 0 directly above the device.
    pub fn filter<const K: usize>(&self) -> &<Self as FilterAt<K>>::Filter
    where
        Self: FilterAt<K>,
    {
        self.filter_at()
    }

    pub fn filter_mut<const K: usize>(
        &mut self,
    ) -> &mut <Self as FilterAt<K>>::Filter
    where
        Self: FilterAt<K>,
    {
        self.filter_at_mut()
    }

    /// The device together with the first `K` filters.
    pub fn layer<const K: usize>(&self) -> &<Self as LayerAt<K>>::Layer
    where
        Self: LayerAt<K>,
    {
        self.layer_at()
    }

    pub fn layer_mut<const K: usize>(
        &mut self,
    ) -> &mut <Self as LayerAt<K>>::Layer
    where
        Self: LayerAt<K>,
    {
        self.layer_at_mut()
    }

    /// Borrow the device and the first `K` filters as a device of its
    /// own, so different filters can be stacked on the shared lower
    /// part. The filters above `K` are untouched and usable again once
    /// the split is dropped.
    pub fn split<const K: usize>(&mut self) -> Split<'_, <Self as LayerAt<K>>::Layer>
    where
        Self: LayerAt<K>,
    {
        make_split(self.layer_at_mut())
    }
}

impl<F: Filter, S: Stream> Stream for Pipeline<F, S> {
    const CATEGORY: Category = F::CATEGORY
        .intersection(S::CATEGORY)
        .union(F::INTRINSIC);
    const FILTER_COUNT: usize = S::FILTER_COUNT + 1;
    const SHARED_CURSOR: bool = S::SHARED_CURSOR;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        require(Self::CATEGORY, Category::INPUT)?;
        if buf.is_empty() {
            return Ok(0);
        }
        self.filter.read(&mut self.source, buf)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        require(Self::CATEGORY, Category::OUTPUT)?;
        if buf.is_empty() {
            return Ok(0);
        }
        self.filter.write(&mut self.source, buf)
    }

    fn seekg(&mut self, offset: i64, direction: SeekDirection) -> Result<bool> {
        require(Self::CATEGORY, Category::INPUT_SEEKABLE)?;
        self.filter.seekg(&mut self.source, offset, direction)
    }

    fn tellg(&self) -> Result<u64> {
        require(Self::CATEGORY, Category::INPUT_SEEKABLE)?;
        self.filter.tellg(&self.source)
    }

    fn seekp(&mut self, offset: i64, direction: SeekDirection) -> Result<bool> {
        require(Self::CATEGORY, Category::OUTPUT_SEEKABLE)?;
        self.filter.seekp(&mut self.source, offset, direction)
    }

    fn tellp(&self) -> Result<u64> {
        require(Self::CATEGORY, Category::OUTPUT_SEEKABLE)?;
        self.filter.tellp(&self.source)
    }

    fn size(&self) -> Result<u64> {
        require(Self::CATEGORY, Category::HAS_SIZE)?;
        self.filter.size(&self.source)
    }

    fn flush(&mut self) -> Result<()> {
        require(Self::CATEGORY, Category::FLUSHABLE)?;
        self.filter.flush(&mut self.source)
    }

    fn eof(&self) -> Result<bool> {
        require(Self::CATEGORY, Category::HAS_EOF)?;
        self.filter.eof(&self.source)
    }

    fn good(&self) -> Result<bool> {
        require(Self::CATEGORY, Category::HAS_STATUS)?;
        self.filter.good(&self.source)
    }
}

impl<F: Filter, S: Stream> Drop for Pipeline<F, S> {
    fn drop(&mut self) {
        if let Err(err) = self.filter.finalize(&mut self.source) {
            error!(
                "Failed to finalize filter {} of {}: {}",
                Self::FILTER_COUNT - 1,
                std::any::type_name::<F>(),
                err
            );
        }
    }
}

impl<F: Filter, S: Stream, G: Filter> BitOr<G> for Pipeline<F, S> {
    type Output = Pipeline<G, Self>;

    fn bitor(self, filter: G) -> Self::Output {
        Pipeline::new(self, filter)
    }
}

/// A mutable borrow of a stream, usable as the device of a new pipeline.
///
/// While the split exists the borrowed stream can only be reached
/// through it, so the two stacks sharing the lower layers never
/// interleave their I/O.
pub struct Split<'a, S: Stream> {
    inner: &'a mut S,
}

/// Borrow `stream` as the device of a new pipeline.
pub fn make_split<S: Stream>(stream: &mut S) -> Split<'_, S> {
    Split { inner: stream }
}

impl<S: Stream> Split<'_, S> {
    checked_operations!();

    pub fn get_ref(&self) -> &S {
        self.inner
    }

    pub fn get_mut(&mut self) -> &mut S {
        self.inner
    }
}

impl<S: Stream> Stream for Split<'_, S> {
    const CATEGORY: Category = S::CATEGORY;
    const SHARED_CURSOR: bool = S::SHARED_CURSOR;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.inner.read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.inner.write(buf)
    }

    fn seekg(&mut self, offset: i64, direction: SeekDirection) -> Result<bool> {
        self.inner.seekg(offset, direction)
    }

    fn tellg(&self) -> Result<u64> {
        self.inner.tellg()
    }

    fn seekp(&mut self, offset: i64, direction: SeekDirection) -> Result<bool> {
        self.inner.seekp(offset, direction)
    }

    fn tellp(&self) -> Result<u64> {
        self.inner.tellp()
    }

    fn size(&self) -> Result<u64> {
        self.inner.size()
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()
    }

    fn eof(&self) -> Result<bool> {
        self.inner.eof()
    }

    fn good(&self) -> Result<bool> {
        self.inner.good()
    }
}

impl<S: Stream> Device for Split<'_, S> {}

impl<'a, S: Stream, F: Filter> BitOr<F> for Split<'a, S> {
    type Output = Pipeline<F, Split<'a, S>>;

    fn bitor(self, filter: F) -> Self::Output {
        Pipeline::new(self, filter)
    }
}

macro_rules! impl_pipe_operator {
    ($device:ident) => {
        impl<F: Filter> BitOr<F> for $device {
            type Output = Pipeline<F, $device>;

            fn bitor(self, filter: F) -> Self::Output {
                Pipeline::new(self, filter)
            }
        }
    };
    ($device:ident<$lt:lifetime>) => {
        impl<$lt, F: Filter> BitOr<F> for $device<$lt> {
            type Output = Pipeline<F, $device<$lt>>;

            fn bitor(self, filter: F) -> Self::Output {
                Pipeline::new(self, filter)
            }
        }
    };
}

impl_pipe_operator!(MemoryDevice);
impl_pipe_operator!(MemoryViewDevice<'a>);
impl_pipe_operator!(SpanDevice<'a>);
impl_pipe_operator!(FileDevice);
impl_pipe_operator!(SocketDevice);

/// Access to the device at the bottom of a stack.
pub trait DeviceAccess {
    type Device: Device;

    fn device_ref(&self) -> &Self::Device;
    fn device_mut_ref(&mut self) -> &mut Self::Device;
}

impl<D: Device> DeviceAccess for D {
    type Device = D;

    fn device_ref(&self) -> &D {
        self
    }

    fn device_mut_ref(&mut self) -> &mut D {
        self
    }
}

impl<F: Filter, S: Stream + DeviceAccess> DeviceAccess for Pipeline<F, S> {
    type Device = S::Device;

    fn device_ref(&self) -> &S::Device {
        self.source.device_ref()
    }

    fn device_mut_ref(&mut self) -> &mut S::Device {
        self.source.device_mut_ref()
    }
}

/// Static access to filter number `K` of a stack.
pub trait FilterAt<const K: usize> {
    type Filter: Filter;

    fn filter_at(&self) -> &Self::Filter;
    fn filter_at_mut(&mut self) -> &mut Self::Filter;
}

/// Static access to the device plus the first `K` filters of a stack.
pub trait LayerAt<const K: usize> {
    type Layer: Stream;

    fn layer_at(&self) -> &Self::Layer;
    fn layer_at_mut(&mut self) -> &mut Self::Layer;
}

macro_rules! impl_filter_at {
    ($k:literal => $target:ident, [$($f:ident),+], $stack:ty, $($path:tt)+) => {
        impl<$($f: Filter,)+ D: Device> FilterAt<$k> for $stack {
            type Filter = $target;

            fn filter_at(&self) -> &$target {
                &self.$($path)+
            }

            fn filter_at_mut(&mut self) -> &mut $target {
                &mut self.$($path)+
            }
        }
    };
}

macro_rules! impl_layer_at {
    ($k:literal => $layer:ty, [$($f:ident),+], $stack:ty, $($path:tt)+) => {
        impl<$($f: Filter,)+ D: Device> LayerAt<$k> for $stack {
            type Layer = $layer;

            fn layer_at(&self) -> &$layer {
                &self.$($path)+
            }

            fn layer_at_mut(&mut self) -> &mut $layer {
                &mut self.$($path)+
            }
        }
    };
}

type Stack1<F0, D> = Pipeline<F0, D>;
type Stack2<F0, F1, D> = Pipeline<F1, Stack1<F0, D>>;
type Stack3<F0, F1, F2, D> = Pipeline<F2, Stack2<F0, F1, D>>;
type Stack4<F0, F1, F2, F3, D> = Pipeline<F3, Stack3<F0, F1, F2, D>>;
type Stack5<F0, F1, F2, F3, F4, D> = Pipeline<F4, Stack4<F0, F1, F2, F3, D>>;

impl_filter_at!(0 => F0, [F0], Stack1<F0, D>, filter);

impl_filter_at!(0 => F0, [F0, F1], Stack2<F0, F1, D>, source.filter);
impl_filter_at!(1 => F1, [F0, F1], Stack2<F0, F1, D>, filter);

impl_filter_at!(0 => F0, [F0, F1, F2], Stack3<F0, F1, F2, D>, source.source.filter);
impl_filter_at!(1 => F1, [F0, F1, F2], Stack3<F0, F1, F2, D>, source.filter);
impl_filter_at!(2 => F2, [F0, F1, F2], Stack3<F0, F1, F2, D>, filter);

impl_filter_at!(0 => F0, [F0, F1, F2, F3], Stack4<F0, F1, F2, F3, D>, source.source.source.filter);
impl_filter_at!(1 => F1, [F0, F1, F2, F3], Stack4<F0, F1, F2, F3, D>, source.source.filter);
impl_filter_at!(2 => F2, [F0, F1, F2, F3], Stack4<F0, F1, F2, F3, D>, source.filter);
impl_filter_at!(3 => F3, [F0, F1, F2, F3], Stack4<F0, F1, F2, F3, D>, filter);

impl_filter_at!(0 => F0, [F0, F1, F2, F3, F4], Stack5<F0, F1, F2, F3, F4, D>, source.source.source.source.filter);
impl_filter_at!(1 => F1, [F0, F1, F2, F3, F4], Stack5<F0, F1, F2, F3, F4, D>, source.source.source.filter);
impl_filter_at!(2 => F2, [F0, F1, F2, F3, F4], Stack5<F0, F1, F2, F3, F4, D>, source.source.filter);
impl_filter_at!(3 => F3, [F0, F1, F2, F3, F4], Stack5<F0, F1, F2, F3, F4, D>, source.filter);
impl_filter_at!(4 => F4, [F0, F1, F2, F3, F4], Stack5<F0, F1, F2, F3, F4, D>, filter);

impl_layer_at!(0 => D, [F0], Stack1<F0, D>, source);

impl_layer_at!(0 => D, [F0, F1], Stack2<F0, F1, D>, source.source);
impl_layer_at!(1 => Stack1<F0, D>, [F0, F1], Stack2<F0, F1, D>, source);

impl_layer_at!(0 => D, [F0, F1, F2], Stack3<F0, F1, F2, D>, source.source.source);
impl_layer_at!(1 => Stack1<F0, D>, [F0, F1, F2], Stack3<F0, F1, F2, D>, source.source);
impl_layer_at!(2 => Stack2<F0, F1, D>, [F0, F1, F2], Stack3<F0, F1, F2, D>, source);

impl_layer_at!(0 => D, [F0, F1, F2, F3], Stack4<F0, F1, F2, F3, D>, source.source.source.source);
impl_layer_at!(1 => Stack1<F0, D>, [F0, F1, F2, F3], Stack4<F0, F1, F2, F3, D>, source.source.source);
impl_layer_at!(2 => Stack2<F0, F1, D>, [F0, F1, F2, F3], Stack4<F0, F1, F2, F3, D>, source.source);
impl_layer_at!(3 => Stack3<F0, F1, F2, D>, [F0, F1, F2, F3], Stack4<F0, F1, F2, F3, D>, source);

impl_layer_at!(0 => D, [F0, F1, F2, F3, F4], Stack5<F0, F1, F2, F3, F4, D>, source.source.source.source.source);
impl_layer_at!(1 => Stack1<F0, D>, [F0, F1, F2, F3, F4], Stack5<F0, F1, F2, F3, F4, D>, source.source.source.source);
impl_layer_at!(2 => Stack2<F0, F1, D>, [F0, F1, F2, F3, F4], Stack5<F0, F1, F2, F3, F4, D>, source.source.source);
impl_layer_at!(3 => Stack3<F0, F1, F2, D>, [F0, F1, F2, F3, F4], Stack5<F0, F1, F2, F3, F4, D>, source.source);
impl_layer_at!(4 => Stack4<F0, F1, F2, F3, D>, [F0, F1, F2, F3, F4], Stack5<F0, F1, F2, F3, F4, D>, source);
