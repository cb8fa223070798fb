use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};

use log::debug;

use data_error::Result;

use crate::{Category, Device, Stream};

/// Device over a connected TCP stream.
///
/// Sockets have neither a size nor a seekable position. A read returns
/// as soon as any data arrives, so short reads are common.
#[derive(Debug)]
pub struct SocketDevice {
    stream: TcpStream,
    failed: bool,
}

impl SocketDevice {
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        debug!("Connected to {:?}", stream.peer_addr().ok());
        Ok(Self::from_stream(stream))
    }

    pub fn from_stream(stream: TcpStream) -> Self {
        Self {
            stream,
            failed: false,
        }
    }

    pub fn peer_addr(&self) -> Result<SocketAddr> {
        Ok(self.stream.peer_addr()?)
    }

    /// Close one or both directions of the connection.
    pub fn shutdown(&self, how: Shutdown) -> Result<()> {
        debug!("Shutting down socket ({:?})", how);
        Ok(self.stream.shutdown(how)?)
    }

    pub fn into_inner(self) -> TcpStream {
        self.stream
    }

    fn track<T>(&mut self, result: std::io::Result<T>) -> Result<T> {
        result.map_err(|err| {
            self.failed = true;
            err.into()
        })
    }
}

impl Stream for SocketDevice {
    const CATEGORY: Category = Category::INPUT
        .union(Category::OUTPUT)
        .union(Category::FLUSHABLE)
        .union(Category::HAS_STATUS);

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let result = self.stream.read(buf);
        self.track(result)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let result = self.stream.write(buf);
        self.track(result)
    }

    fn flush(&mut self) -> Result<()> {
        let result = self.stream.flush();
        self.track(result)
    }

    fn good(&self) -> Result<bool> {
        Ok(!self.failed)
    }
}

impl Device for SocketDevice {}
