use std::io::{self, ErrorKind, SeekFrom};

use data_error::{Result, StreamError};

use crate::stream::Capable;
use crate::{Category, SeekDirection, Stream};

macro_rules! read_le {
    ($($name:ident -> $ty:ty),+ $(,)?) => {
        $(
            pub fn $name(&mut self) -> Result<$ty> {
                let mut bytes = [0u8; std::mem::size_of::<$ty>()];
                self.read_exact(&mut bytes)?;
                Ok(<$ty>::from_le_bytes(bytes))
            }
        )+
    };
}

macro_rules! write_le {
    ($($name:ident($ty:ty)),+ $(,)?) => {
        $(
            pub fn $name(&mut self, value: $ty) -> Result<()> {
                self.write_all(&value.to_le_bytes())
            }
        )+
    };
}

/// Typed reading on top of an input stream.
///
/// Takes the stream by value; pass `&mut stream` to keep using it
/// afterwards.
pub struct StreamReader<S: Stream> {
    stream: S,
}

impl<S: Stream> StreamReader<S> {
    pub fn new(stream: S) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Capable::<S>::INPUT;
        Self { stream }
    }

    /// Fill `buf` completely or fail with
    /// [`ErrorKind::UnexpectedEof`].
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.stream.read(&mut buf[filled..])?;
            if n == 0 {
                return Err(StreamError::Io(io::Error::new(
                    ErrorKind::UnexpectedEof,
                    format!("stream ended after {} of {} bytes", filled, buf.len()),
                )));
            }
            filled += n;
        }
        Ok(())
    }

    pub fn read_to_end(&mut self) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = self.stream.read(&mut chunk)?;
            if n == 0 {
                return Ok(data);
            }
            data.extend_from_slice(&chunk[..n]);
        }
    }

    /// Read up to the next `\n`, which is not included, nor is a
    /// preceding `\r`. Returns `None` at the end of the data.
    pub fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            if self.stream.read(&mut byte)? == 0 {
                if line.is_empty() {
                    return Ok(None);
                }
                break;
            }
            if byte[0] == b'\n' {
                break;
            }
            line.push(byte[0]);
        }
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        String::from_utf8(line)
            .map(Some)
            .map_err(|err| StreamError::Parse(err.to_string()))
    }

    read_le! {
        read_u8 -> u8,
        read_u16 -> u16,
        read_u32 -> u32,
        read_u64 -> u64,
        read_i32 -> i32,
        read_i64 -> i64,
        read_f32 -> f32,
        read_f64 -> f64,
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

/// Typed writing on top of an output stream.
pub struct StreamWriter<S: Stream> {
    stream: S,
}

impl<S: Stream> StreamWriter<S> {
    pub fn new(stream: S) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Capable::<S>::OUTPUT;
        Self { stream }
    }

    /// Write all of `buf` or fail with [`ErrorKind::WriteZero`].
    pub fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        let mut written = 0;
        while written < buf.len() {
            let n = self.stream.write(&buf[written..])?;
            if n == 0 {
                return Err(StreamError::Io(io::Error::new(
                    ErrorKind::WriteZero,
                    format!("stream accepted {} of {} bytes", written, buf.len()),
                )));
            }
            written += n;
        }
        Ok(())
    }

    pub fn write_str(&mut self, text: &str) -> Result<()> {
        self.write_all(text.as_bytes())
    }

    pub fn write_line(&mut self, text: &str) -> Result<()> {
        self.write_str(text)?;
        self.write_all(b"\n")
    }

    write_le! {
        write_u8(u8),
        write_u16(u16),
        write_u32(u32),
        write_u64(u64),
        write_i32(i32),
        write_i64(i64),
        write_f32(f32),
        write_f64(f64),
    }

    /// Flush the stream if it can be flushed.
    pub fn flush(&mut self) -> Result<()> {
        if S::CATEGORY.is_flushable() {
            self.stream.flush()?;
        }
        Ok(())
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

/// Exposes a stream through the `std::io` traits.
///
/// [`Seek`](io::Seek) moves every cursor the stream can seek, so for
/// devices with separate read and write cursors both end up at the same
/// position.
pub struct IoAdapter<S: Stream> {
    stream: S,
}

impl<S: Stream> IoAdapter<S> {
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: Stream> io::Read for IoAdapter<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.stream.read(buf)?)
    }
}

impl<S: Stream> io::Write for IoAdapter<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.stream.write(buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        if S::CATEGORY.is_flushable() {
            self.stream.flush()?;
        }
        Ok(())
    }
}

impl<S: Stream> io::Seek for IoAdapter<S> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let (offset, direction) = match pos {
            SeekFrom::Start(offset) => {
                let offset = i64::try_from(offset).map_err(|_| {
                    io::Error::new(ErrorKind::InvalidInput, "offset too large")
                })?;
                (offset, SeekDirection::Begin)
            }
            SeekFrom::Current(offset) => (offset, SeekDirection::Current),
            SeekFrom::End(offset) => (offset, SeekDirection::End),
        };

        let input = S::CATEGORY.is_input_seekable();
        let output = S::CATEGORY.is_output_seekable();
        let moved = if input {
            self.stream.seekg(offset, direction)?
        } else if output {
            self.stream.seekp(offset, direction)?
        } else {
            return Err(StreamError::Unsupported(Category::INPUT_SEEKABLE.name()).into());
        };
        if !moved {
            return Err(io::Error::new(
                ErrorKind::InvalidInput,
                "seek position out of range",
            ));
        }

        let position = if input {
            self.stream.tellg()?
        } else {
            self.stream.tellp()?
        };
        if input && output {
            self.stream.seekp(position as i64, SeekDirection::Begin)?;
        }
        Ok(position)
    }
}
