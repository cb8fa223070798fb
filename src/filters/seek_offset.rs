use log::trace;

use data_error::{Result, StreamError};

use super::Filter;
use crate::{Category, SeekDirection, Stream, StreamConfig};

/// Exposes the part of the lower stream that starts at a fixed offset
/// as if it began at position zero.
///
/// All positions seen through the filter are shifted by the offset, and
/// the region before the offset can't be reached. When the lower stream
/// is seekable, the first read or write moves it to the offset. Over a
/// stream with one shared cursor that happens once, whichever comes
/// first, so a read after some writes continues where they ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeekOffsetFilter {
    offset: u64,
    input_positioned: bool,
    output_positioned: bool,
}

impl SeekOffsetFilter {
    pub fn new(offset: u64) -> Self {
        Self {
            offset,
            input_positioned: false,
            output_positioned: false,
        }
    }

    /// Filter skipping the configured header.
    pub fn from_config(config: &StreamConfig) -> Self {
        Self::new(config.header_offset)
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    fn position_input<S: Stream>(&mut self, source: &mut S) -> Result<()> {
        if !self.input_positioned && S::CATEGORY.is_input_seekable() {
            trace!("Positioning input at offset {}", self.offset);
            if !source.seekg(self.offset_i64()?, SeekDirection::Begin)? {
                return Err(self.beyond_end());
            }
        }
        self.mark_positioned::<S>(true);
        Ok(())
    }

    fn position_output<S: Stream>(&mut self, source: &mut S) -> Result<()> {
        if !self.output_positioned && S::CATEGORY.is_output_seekable() {
            trace!("Positioning output at offset {}", self.offset);
            if !source.seekp(self.offset_i64()?, SeekDirection::Begin)? {
                return Err(self.beyond_end());
            }
        }
        self.mark_positioned::<S>(false);
        Ok(())
    }

    fn mark_positioned<S: Stream>(&mut self, input: bool) {
        if S::SHARED_CURSOR || input {
            self.input_positioned = true;
        }
        if S::SHARED_CURSOR || !input {
            self.output_positioned = true;
        }
    }

    fn offset_i64(&self) -> Result<i64> {
        i64::try_from(self.offset).map_err(|_| self.beyond_end())
    }

    fn beyond_end(&self) -> StreamError {
        StreamError::InvalidArgument(format!(
            "offset {} lies beyond the end of the lower stream",
            self.offset
        ))
    }

    /// Translate a logical seek into an absolute position below,
    /// or `None` when it would land before the offset.
    fn target<S: Stream>(
        &self,
        source: &S,
        current: u64,
        offset: i64,
        direction: SeekDirection,
    ) -> Result<Option<i64>> {
        let base = match direction {
            SeekDirection::Begin => 0,
            SeekDirection::Current => current as i128,
            SeekDirection::End => self.size(source)? as i128,
        };
        let logical = base + offset as i128;
        if logical < 0 {
            return Ok(None);
        }
        Ok(i64::try_from(logical + self.offset as i128).ok())
    }

    fn logical(&self, positioned: bool, absolute: u64) -> u64 {
        if positioned {
            absolute.saturating_sub(self.offset)
        } else {
            0
        }
    }
}

impl Filter for SeekOffsetFilter {
    const CATEGORY: Category = Category::all();

    fn read<S: Stream>(&mut self, source: &mut S, buf: &mut [u8]) -> Result<usize> {
        self.position_input(source)?;
        source.read(buf)
    }

    fn write<S: Stream>(&mut self, source: &mut S, buf: &[u8]) -> Result<usize> {
        self.position_output(source)?;
        source.write(buf)
    }

    fn seekg<S: Stream>(
        &mut self,
        source: &mut S,
        offset: i64,
        direction: SeekDirection,
    ) -> Result<bool> {
        let current = self.tellg(source)?;
        let Some(target) = self.target(source, current, offset, direction)?
        else {
            return Ok(false);
        };
        let moved = source.seekg(target, SeekDirection::Begin)?;
        if moved {
            self.mark_positioned::<S>(true);
        }
        Ok(moved)
    }

    fn tellg<S: Stream>(&self, source: &S) -> Result<u64> {
        Ok(self.logical(self.input_positioned, source.tellg()?))
    }

    fn seekp<S: Stream>(
        &mut self,
        source: &mut S,
        offset: i64,
        direction: SeekDirection,
    ) -> Result<bool> {
        let current = self.tellp(source)?;
        let Some(target) = self.target(source, current, offset, direction)?
        else {
            return Ok(false);
        };
        let moved = source.seekp(target, SeekDirection::Begin)?;
        if moved {
            self.mark_positioned::<S>(false);
        }
        Ok(moved)
    }

    fn tellp<S: Stream>(&self, source: &S) -> Result<u64> {
        Ok(self.logical(self.output_positioned, source.tellp()?))
    }

    fn size<S: Stream>(&self, source: &S) -> Result<u64> {
        Ok(source.size()?.saturating_sub(self.offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FileDevice, MemoryDevice, OpenMode};
    use tempdir::TempDir;

    fn device() -> MemoryDevice {
        MemoryDevice::from_vec((0u8..32).collect())
    }

    #[test]
    fn first_read_starts_at_offset() {
        let mut source = device();
        let mut filter = SeekOffsetFilter::new(10);
        assert_eq!(filter.tellg(&source).unwrap(), 0);

        let mut buf = [0u8; 4];
        assert_eq!(filter.read(&mut source, &mut buf).unwrap(), 4);
        assert_eq!(buf, [10, 11, 12, 13]);
        assert_eq!(filter.tellg(&source).unwrap(), 4);
        assert_eq!(source.tellg().unwrap(), 14);
    }

    #[test]
    fn seek_translates_by_offset() {
        let mut source = device();
        let mut filter = SeekOffsetFilter::new(10);

        assert!(filter.seekg(&mut source, 0, SeekDirection::Begin).unwrap());
        assert_eq!(source.tellg().unwrap(), 10);

        assert!(filter.seekg(&mut source, -2, SeekDirection::End).unwrap());
        assert_eq!(filter.tellg(&source).unwrap(), 20);
        assert_eq!(source.tellg().unwrap(), 30);

        assert!(filter.seekg(&mut source, -5, SeekDirection::Current).unwrap());
        assert_eq!(filter.tellg(&source).unwrap(), 15);
    }

    #[test]
    fn header_is_unreachable() {
        let mut source = device();
        let mut filter = SeekOffsetFilter::new(10);
        assert!(filter.seekg(&mut source, 3, SeekDirection::Begin).unwrap());
        assert!(!filter
            .seekg(&mut source, -4, SeekDirection::Current)
            .unwrap());
        assert!(!filter.seekg(&mut source, -1, SeekDirection::Begin).unwrap());
        assert_eq!(filter.tellg(&source).unwrap(), 3);
        assert!(!filter.seekg(&mut source, 23, SeekDirection::Begin).unwrap());
    }

    #[test]
    fn size_excludes_offset() {
        let source = device();
        assert_eq!(SeekOffsetFilter::new(10).size(&source).unwrap(), 22);
        assert_eq!(SeekOffsetFilter::new(64).size(&source).unwrap(), 0);
    }

    #[test]
    fn offset_past_the_end() {
        let mut source = MemoryDevice::from_vec(vec![1, 2, 3]);
        let mut filter = SeekOffsetFilter::new(8);
        let mut buf = [0u8; 2];
        assert!(matches!(
            filter.read(&mut source, &mut buf),
            Err(StreamError::InvalidArgument(_))
        ));
    }

    #[test]
    fn shared_cursor_is_positioned_once() {
        let dir = TempDir::new("ark-streams").unwrap();
        let path = dir.path().join("offset.bin");
        std::fs::write(&path, b"HEADER").unwrap();
        let mut source = FileDevice::open(&path, OpenMode::READ_WRITE).unwrap();
        let mut filter = SeekOffsetFilter::new(6);

        assert_eq!(filter.write(&mut source, b"abc").unwrap(), 3);
        assert_eq!(filter.tellg(&source).unwrap(), 3);
        let mut buf = [0u8; 3];
        assert_eq!(filter.read(&mut source, &mut buf).unwrap(), 0);

        assert!(filter.seekg(&mut source, 0, SeekDirection::Begin).unwrap());
        assert_eq!(filter.read(&mut source, &mut buf).unwrap(), 3);
        assert_eq!(&buf, b"abc");
        assert_eq!(filter.tellp(&source).unwrap(), 3);
    }

    #[test]
    fn separate_cursors_are_positioned_separately() {
        let mut source = MemoryDevice::from_vec(b"HEADER".to_vec());
        let mut filter = SeekOffsetFilter::new(6);
        filter.write(&mut source, b"abc").unwrap();

        let mut buf = [0u8; 3];
        assert_eq!(filter.read(&mut source, &mut buf).unwrap(), 3);
        assert_eq!(&buf, b"abc");
    }

    #[test]
    fn writes_land_after_offset() {
        let mut source = MemoryDevice::from_vec(vec![0u8; 4]);
        let mut filter = SeekOffsetFilter::new(2);
        filter.write(&mut source, b"ab").unwrap();
        assert_eq!(source.as_slice(), &[0, 0, b'a', b'b']);
        assert_eq!(filter.tellp(&source).unwrap(), 2);
    }
}
