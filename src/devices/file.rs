use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::{debug, trace};

use data_error::Result;

use super::OpenMode;
use crate::stream::resolve_seek;
use crate::{Category, Device, SeekDirection, Stream};

/// Device over a file on disk.
///
/// The file is opened when the device is created and closed when it is
/// dropped. Unlike [`MemoryDevice`](super::MemoryDevice) there is a
/// single cursor shared by reads and writes.
#[derive(Debug)]
pub struct FileDevice {
    file: File,
    path: PathBuf,
    mode: OpenMode,
    position: u64,
    failed: bool,
}

impl FileDevice {
    /// Open `path` with the given mode. Write modes create the file
    /// when it does not exist.
    pub fn open<P: AsRef<Path>>(path: P, mode: OpenMode) -> Result<Self> {
        let mode = mode.validate()?;
        let path = path.as_ref();

        let file = OpenOptions::new()
            .read(mode.is_readable())
            .write(mode.is_writable())
            .append(mode.is_append())
            .truncate(mode.contains(OpenMode::TRUNCATE) && !mode.is_append())
            .create(mode.is_writable())
            .open(path)?;

        let mut device = Self {
            file,
            path: path.to_path_buf(),
            mode,
            position: 0,
            failed: false,
        };
        if mode.is_append() {
            device.position = device.file.seek(SeekFrom::End(0))?;
        }

        debug!("Opened {} with {:?}", path.display(), mode);
        Ok(device)
    }

    /// Shorthand for opening an existing file for reading.
    pub fn open_read<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open(path, OpenMode::READ)
    }

    /// Shorthand for creating or truncating a file for writing.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open(path, OpenMode::WRITE | OpenMode::TRUNCATE)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// Flush and close the file, reporting errors that a plain drop
    /// would swallow.
    pub fn close(mut self) -> Result<()> {
        if self.mode.is_writable() {
            self.file.flush()?;
            self.file.sync_all()?;
        }
        debug!("Closed {}", self.path.display());
        Ok(())
    }

    /// Release the underlying file handle.
    pub fn into_file(self) -> File {
        self.file
    }

    fn track<T>(&mut self, result: std::io::Result<T>) -> Result<T> {
        result.map_err(|err| {
            self.failed = true;
            err.into()
        })
    }

    fn seek_to(&mut self, offset: i64, direction: SeekDirection) -> Result<bool> {
        let size = self.size()?;
        let target = match resolve_seek(self.position, size, offset, direction)
        {
            Some(target) => target,
            None => return Ok(false),
        };
        let result = self.file.seek(SeekFrom::Start(target));
        self.position = self.track(result)?;
        trace!("{}: cursor at {}", self.path.display(), self.position);
        Ok(true)
    }
}

impl Stream for FileDevice {
    const CATEGORY: Category = Category::all();
    const SHARED_CURSOR: bool = true;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.mode.check_read()?;
        let result = self.file.read(buf);
        let n = self.track(result)?;
        self.position += n as u64;
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.mode.check_write()?;
        let result = self.file.write(buf);
        let n = self.track(result)?;
        if self.mode.is_append() {
            let result = self.file.stream_position();
            self.position = self.track(result)?;
        } else {
            self.position += n as u64;
        }
        Ok(n)
    }

    fn seekg(&mut self, offset: i64, direction: SeekDirection) -> Result<bool> {
        self.mode.check_read()?;
        self.seek_to(offset, direction)
    }

    fn tellg(&self) -> Result<u64> {
        Ok(self.position)
    }

    fn seekp(&mut self, offset: i64, direction: SeekDirection) -> Result<bool> {
        self.mode.check_write()?;
        if self.mode.is_append() {
            return Ok(false);
        }
        self.seek_to(offset, direction)
    }

    fn tellp(&self) -> Result<u64> {
        Ok(self.position)
    }

    fn size(&self) -> Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    fn flush(&mut self) -> Result<()> {
        let result = self.file.flush();
        self.track(result)
    }

    fn eof(&self) -> Result<bool> {
        Ok(self.position >= self.size()?)
    }

    fn good(&self) -> Result<bool> {
        Ok(!self.failed)
    }
}

impl Device for FileDevice {}

#[cfg(test)]
mod tests {
    use super::*;
    use data_error::StreamError;
    use tempdir::TempDir;

    #[test]
    fn file_device_category() {
        let category = FileDevice::CATEGORY;
        assert!(category.is_input_seekable());
        assert!(category.is_output_seekable());
        assert!(category.is_flushable());
        assert!(category.has_status());
    }

    #[test]
    fn write_then_read_file() {
        let dir = TempDir::new("ark-streams").unwrap();
        let path = dir.path().join("data.bin");

        let mut writer = FileDevice::create(&path).unwrap();
        assert_eq!(writer.write(b"0123456789").unwrap(), 10);
        assert_eq!(writer.tellp().unwrap(), 10);
        writer.flush().unwrap();
        assert!(writer.good().unwrap());
        writer.close().unwrap();

        let mut reader = FileDevice::open_read(&path).unwrap();
        assert_eq!(reader.size().unwrap(), 10);
        assert!(reader.seekg(4, SeekDirection::Begin).unwrap());
        let mut buf = [0u8; 3];
        assert_eq!(reader.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf, b"456");
        assert!(!reader.seekg(11, SeekDirection::Begin).unwrap());
        assert_eq!(reader.tellg().unwrap(), 7);

        assert!(reader.seekg(0, SeekDirection::End).unwrap());
        assert!(reader.eof().unwrap());
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn append_mode_writes_at_end() {
        let dir = TempDir::new("ark-streams").unwrap();
        let path = dir.path().join("log.txt");
        std::fs::write(&path, b"first\n").unwrap();

        let mut device =
            FileDevice::open(&path, OpenMode::WRITE | OpenMode::APPEND)
                .unwrap();
        assert_eq!(device.tellp().unwrap(), 6);
        assert!(!device.seekp(0, SeekDirection::Begin).unwrap());
        device.write(b"second\n").unwrap();
        assert_eq!(device.tellp().unwrap(), 13);
        drop(device);

        assert_eq!(std::fs::read(&path).unwrap(), b"first\nsecond\n");
    }

    #[test]
    fn access_mode_and_missing_files() {
        let dir = TempDir::new("ark-streams").unwrap();
        let path = dir.path().join("missing.bin");
        assert!(matches!(
            FileDevice::open_read(&path),
            Err(StreamError::Io(_))
        ));

        let mut device = FileDevice::create(&path).unwrap();
        let mut buf = [0u8; 4];
        assert!(matches!(
            device.read(&mut buf),
            Err(StreamError::AccessMode("reading"))
        ));
        assert_eq!(device.path(), path.as_path());
    }

    #[test]
    fn truncate_discards_contents() {
        let dir = TempDir::new("ark-streams").unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, b"stale contents").unwrap();

        let device = FileDevice::open(
            &path,
            OpenMode::READ_WRITE | OpenMode::TRUNCATE,
        )
        .unwrap();
        assert_eq!(device.size().unwrap(), 0);
        let file = device.into_file();
        assert_eq!(file.metadata().unwrap().len(), 0);
    }
}
