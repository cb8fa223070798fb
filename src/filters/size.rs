use data_error::Result;

use super::Filter;
use crate::{Category, Stream, StreamConfig};

/// Caps the size reported by the lower stream.
///
/// Reads and writes are not restricted, only [`Stream::size`] is.
/// A pipeline with this filter always has a size, even when the stream
/// below does not: the cap is reported as is in that case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeFilter {
    max_size: u64,
}

impl SizeFilter {
    pub fn new(max_size: u64) -> Self {
        Self { max_size }
    }

    /// Filter for the configured size limit, if any.
    pub fn from_config(config: &StreamConfig) -> Option<Self> {
        config.size_limit.map(Self::new)
    }

    pub fn max_size(&self) -> u64 {
        self.max_size
    }
}

impl Filter for SizeFilter {
    const CATEGORY: Category = Category::all();
    const INTRINSIC: Category = Category::HAS_SIZE;

    fn size<S: Stream>(&self, source: &S) -> Result<u64> {
        if S::CATEGORY.has_size() {
            Ok(source.size()?.min(self.max_size))
        } else {
            Ok(self.max_size)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryDevice;
    use rstest::rstest;

    #[rstest]
    #[case(100, 10, 10)]
    #[case(4, 10, 4)]
    #[case(0, 10, 0)]
    fn capped_by_source(
        #[case] source_len: usize,
        #[case] max_size: u64,
        #[case] expected: u64,
    ) {
        let source = MemoryDevice::from_vec(vec![1; source_len]);
        assert_eq!(SizeFilter::new(max_size).size(&source).unwrap(), expected);
    }

    #[test]
    fn cap_without_sized_source() {
        struct Unsized;
        impl Stream for Unsized {
            const CATEGORY: Category = Category::INPUT;
        }
        assert_eq!(SizeFilter::new(42).size(&Unsized).unwrap(), 42);
    }

    #[test]
    fn from_config() {
        let mut config = StreamConfig::default();
        assert!(SizeFilter::from_config(&config).is_none());
        config.size_limit = Some(512);
        assert_eq!(SizeFilter::from_config(&config).unwrap().max_size(), 512);
    }
}
