use data_error::Result;

use crate::stream::resolve_seek;
use crate::{Category, Device, SeekDirection, Stream};

/// Read-only device over borrowed bytes.
#[derive(Debug, Clone, Copy)]
pub struct MemoryViewDevice<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> MemoryViewDevice<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Bytes not read yet.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.position..]
    }
}

impl Stream for MemoryViewDevice<'_> {
    const CATEGORY: Category = Category::INPUT
        .union(Category::INPUT_SEEKABLE)
        .union(Category::HAS_SIZE)
        .union(Category::HAS_EOF);

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let remaining = self.remaining();
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.position += n;
        Ok(n)
    }

    fn seekg(&mut self, offset: i64, direction: SeekDirection) -> Result<bool> {
        match resolve_seek(
            self.position as u64,
            self.data.len() as u64,
            offset,
            direction,
        ) {
            Some(position) => {
                self.position = position as usize;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn tellg(&self) -> Result<u64> {
        Ok(self.position as u64)
    }

    fn size(&self) -> Result<u64> {
        Ok(self.data.len() as u64)
    }

    fn eof(&self) -> Result<bool> {
        Ok(self.position >= self.data.len())
    }
}

impl Device for MemoryViewDevice<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_is_read_only() {
        let data = b"0123456789";
        let mut view = MemoryViewDevice::new(data);
        assert!(!MemoryViewDevice::CATEGORY.is_output());
        assert!(view.write(b"x").unwrap_err().is_unsupported());

        let mut buf = [0u8; 4];
        view.seekg(-4, SeekDirection::End).unwrap();
        assert_eq!(view.read(&mut buf).unwrap(), 4);
        assert_eq!(&buf, b"6789");
        assert!(view.eof().unwrap());
        assert_eq!(view.remaining(), b"");
    }
}
