use flate2::{
    Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status,
};

use data_error::{Result, StreamError};

use crate::{CompressionLevel, Decoder, Encoder, Flush, Progress};

/// Container format of a deflate stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// zlib header and adler32 trailer around the deflate data (RFC 1950)
    Zlib,
    /// Bare deflate data (RFC 1951)
    Deflate,
}

impl Format {
    fn has_header(self) -> bool {
        self == Format::Zlib
    }
}

/// Streaming zlib / deflate compressor.
///
/// Uses [`flate2`] crate's low-level [`Compress`] state.
pub struct ZlibEncoder {
    inner: Compress,
    level: CompressionLevel,
    format: Format,
}

impl ZlibEncoder {
    /// Encoder producing a zlib container
    pub fn new(level: CompressionLevel) -> Self {
        Self::with_format(level, Format::Zlib)
    }

    /// Encoder producing raw deflate data
    pub fn raw(level: CompressionLevel) -> Self {
        Self::with_format(level, Format::Deflate)
    }

    pub fn with_format(level: CompressionLevel, format: Format) -> Self {
        Self {
            inner: Compress::new(
                Compression::new(level.get()),
                format.has_header(),
            ),
            level,
            format,
        }
    }

    pub fn level(&self) -> CompressionLevel {
        self.level
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Total number of bytes fed into the encoder since the last reset.
    pub fn total_in(&self) -> u64 {
        self.inner.total_in()
    }

    /// Total number of bytes produced since the last reset.
    pub fn total_out(&self) -> u64 {
        self.inner.total_out()
    }
}

impl Default for ZlibEncoder {
    fn default() -> Self {
        Self::new(CompressionLevel::default())
    }
}

impl Encoder for ZlibEncoder {
    fn encode(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: Flush,
    ) -> Result<Progress> {
        if output.is_empty() {
            return Err(StreamError::InvalidArgument(
                "encoder output window is empty".to_owned(),
            ));
        }

        let flush = match flush {
            Flush::None => FlushCompress::None,
            Flush::Sync => FlushCompress::Sync,
            Flush::Finish => FlushCompress::Finish,
        };

        let before_in = self.inner.total_in();
        let before_out = self.inner.total_out();
        let status = self
            .inner
            .compress(input, output, flush)
            .map_err(|err| StreamError::Compress(err.to_string()))?;

        Ok(Progress {
            consumed: (self.inner.total_in() - before_in) as usize,
            produced: (self.inner.total_out() - before_out) as usize,
            done: matches!(status, Status::StreamEnd),
        })
    }

    fn reset(&mut self) {
        self.inner.reset();
    }

    fn name(&self) -> &'static str {
        match self.format {
            Format::Zlib => "zlib",
            Format::Deflate => "deflate",
        }
    }
}

/// Streaming zlib / deflate decompressor.
pub struct ZlibDecoder {
    inner: Decompress,
    format: Format,
}

impl ZlibDecoder {
    /// Decoder expecting a zlib container
    pub fn new() -> Self {
        Self::with_format(Format::Zlib)
    }

    /// Decoder expecting raw deflate data
    pub fn raw() -> Self {
        Self::with_format(Format::Deflate)
    }

    pub fn with_format(format: Format) -> Self {
        Self {
            inner: Decompress::new(format.has_header()),
            format,
        }
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn total_in(&self) -> u64 {
        self.inner.total_in()
    }

    pub fn total_out(&self) -> u64 {
        self.inner.total_out()
    }
}

impl Default for ZlibDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for ZlibDecoder {
    fn decode(&mut self, input: &[u8], output: &mut [u8]) -> Result<Progress> {
        if output.is_empty() {
            return Err(StreamError::InvalidArgument(
                "decoder output window is empty".to_owned(),
            ));
        }

        let before_in = self.inner.total_in();
        let before_out = self.inner.total_out();
        let status = self
            .inner
            .decompress(input, output, FlushDecompress::None)
            .map_err(|err| StreamError::Decompress(err.to_string()))?;

        Ok(Progress {
            consumed: (self.inner.total_in() - before_in) as usize,
            produced: (self.inner.total_out() - before_out) as usize,
            done: matches!(status, Status::StreamEnd),
        })
    }

    fn reset(&mut self) {
        self.inner.reset(self.format.has_header());
    }

    fn name(&self) -> &'static str {
        match self.format {
            Format::Zlib => "zlib",
            Format::Deflate => "deflate",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;
    use rstest::rstest;
    use std::io::Read;

    const TEXT: &[u8] = b"hello world hello world hello world hello world";

    #[test]
    fn test_roundtrip() {
        let compressed =
            ZlibEncoder::default().encode_all(TEXT).unwrap();
        let decompressed =
            ZlibDecoder::default().decode_all(&compressed).unwrap();

        assert_eq!(TEXT, decompressed.as_slice());
        assert!(compressed.len() < TEXT.len());
    }

    #[test]
    fn output_is_a_standard_zlib_stream() {
        let compressed =
            ZlibEncoder::new(CompressionLevel::BEST).encode_all(TEXT).unwrap();

        // zlib header: deflate method, 32K window
        assert_eq!(compressed[0], 0x78);

        let mut decoded = Vec::new();
        flate2::read::ZlibDecoder::new(compressed.as_slice())
            .read_to_end(&mut decoded)
            .unwrap();
        assert_eq!(decoded, TEXT);
    }

    #[test]
    fn reads_streams_written_by_other_encoders() {
        let mut writer = flate2::write::ZlibEncoder::new(
            Vec::new(),
            Compression::default(),
        );
        std::io::Write::write_all(&mut writer, TEXT).unwrap();
        let compressed = writer.finish().unwrap();

        let decoded = ZlibDecoder::new().decode_all(&compressed).unwrap();
        assert_eq!(decoded, TEXT);
    }

    #[test]
    fn malformed_input_is_a_decompress_error() {
        let err = ZlibDecoder::new()
            .decode_all(b"definitely not zlib")
            .unwrap_err();
        assert!(matches!(err, StreamError::Decompress(_)));
    }

    #[test]
    fn truncated_input_is_a_decompress_error() {
        let compressed = ZlibEncoder::default().encode_all(TEXT).unwrap();
        let err = ZlibDecoder::new()
            .decode_all(&compressed[..compressed.len() - 4])
            .unwrap_err();
        assert!(matches!(err, StreamError::Decompress(_)));
    }

    #[test]
    fn empty_windows_are_rejected() {
        let err = ZlibEncoder::default()
            .encode(TEXT, &mut [], Flush::None)
            .unwrap_err();
        assert!(matches!(err, StreamError::InvalidArgument(_)));
    }

    #[test]
    fn reset_starts_a_new_stream() {
        let mut encoder = ZlibEncoder::default();
        let first = encoder.encode_all(TEXT).unwrap();
        encoder.reset();
        let second = encoder.encode_all(TEXT).unwrap();
        assert_eq!(first, second);

        let mut decoder = ZlibDecoder::new();
        assert_eq!(decoder.decode_all(&first).unwrap(), TEXT);
        decoder.reset();
        assert_eq!(decoder.decode_all(&second).unwrap(), TEXT);
    }

    #[rstest]
    #[case(Format::Zlib, 0)]
    #[case(Format::Zlib, 9)]
    #[case(Format::Deflate, 1)]
    #[case(Format::Deflate, 6)]
    fn formats_and_levels(#[case] format: Format, #[case] level: u32) {
        let level = CompressionLevel::new(level).unwrap();
        let compressed = ZlibEncoder::with_format(level, format)
            .encode_all(TEXT)
            .unwrap();
        let decoded = ZlibDecoder::with_format(format)
            .decode_all(&compressed)
            .unwrap();
        assert_eq!(decoded, TEXT);
    }

    #[quickcheck]
    fn zlib_roundtrip(data: Vec<u8>) -> bool {
        let compressed = ZlibEncoder::default().encode_all(&data).unwrap();
        ZlibDecoder::default().decode_all(&compressed).unwrap() == data
    }
}
