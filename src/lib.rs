//! # ARK Streams
//!
//! Composable byte streams: a device at the bottom, any number of
//! filters stacked on top, and one read/write/seek interface for the
//! whole stack.
//!
//! ```
//! use ark_streams::{MemoryDevice, Stream, ZlibCompressFilter};
//!
//! let mut pipeline = MemoryDevice::new() | ZlibCompressFilter::new();
//! pipeline.write(b"hello").unwrap();
//! pipeline.flush().unwrap();
//! assert!(pipeline.device().len() > 0);
//! ```
//!
//! Every stream carries its [`Category`] as a constant, so composing a
//! filter over a stream that lacks what the filter needs is rejected by
//! the compiler. [`DynamicStream`] hides the concrete type when it gets
//! in the way and checks capabilities at runtime instead.

mod category;
mod config;
pub mod devices;
mod dynamic;
pub mod filters;
pub mod io;
mod pipeline;
mod stream;

pub use category::Category;
pub use config::StreamConfig;
pub use devices::{
    FileDevice, MemoryDevice, MemoryViewDevice, OpenMode, SocketDevice,
    SpanDevice,
};
pub use dynamic::{make_dynamic_stream, make_dynamic_stream_ptr, DynamicStream};
pub use filters::{
    compatible, CircularBufferConfig, CircularBufferFilter, Filter,
    OverflowPolicy, SeekOffsetFilter, SizeFilter, ZlibCompressFilter,
    ZlibDecompressFilter,
};
pub use io::{IoAdapter, StreamReader, StreamWriter};
pub use pipeline::{
    compose, make_split, DeviceAccess, FilterAt, LayerAt, Pipeline, Split,
};
pub use stream::{resolve_seek, Device, SeekDirection, Stream};

pub use data_error::{Result, StreamError};
pub use dev_codec::CompressionLevel;
