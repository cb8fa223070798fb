#[cfg(test)]
mod tests {
    use ark_streams::{
        compose, make_dynamic_stream, make_split, CircularBufferFilter,
        DynamicStream, FileDevice, MemoryDevice, OpenMode, Pipeline,
        SeekDirection, SeekOffsetFilter, SizeFilter, SocketDevice, SpanDevice,
        Stream, StreamConfig, StreamReader, StreamWriter, ZlibCompressFilter,
        ZlibDecompressFilter,
    };
    use dev_codec::{Decoder, Encoder, ZlibDecoder, ZlibEncoder};
    use quickcheck_macros::quickcheck;
    use tempdir::TempDir;
    use uuid::Uuid;

    const HEADER: [u8; 10] = *b"ARKHEADER\n";
    const TEXT: &[u8] = b"Lorem ipsum dolor sit amet, consectetur adipiscing \
        elit, sed do eiusmod tempor incididunt ut labore et dolore magna \
        aliqua. Lorem ipsum dolor sit amet, consectetur adipiscing elit.";

    fn with_header(payload: &[u8]) -> Vec<u8> {
        let mut data = HEADER.to_vec();
        data.extend_from_slice(payload);
        data
    }

    #[test_log::test]
    fn memory_pipeline_basic_io() {
        let compressed = ZlibEncoder::default()
            .encode_all(TEXT)
            .expect("Failed to compress");
        let mut pipeline = MemoryDevice::from_vec(with_header(&compressed))
            | SeekOffsetFilter::new(10)
            | ZlibDecompressFilter::new();

        assert_eq!(pipeline.filter_count(), 2);
        let _: &MemoryDevice = pipeline.device();
        let _: &SeekOffsetFilter = pipeline.filter::<0>();
        let _: &ZlibDecompressFilter<256> = pipeline.filter::<1>();

        let decoded = StreamReader::new(&mut pipeline)
            .read_to_end()
            .expect("Failed to read through pipeline");
        assert_eq!(decoded, TEXT);
        assert!(pipeline.eof().unwrap());
    }

    #[test]
    fn dynamic_stream_round_trip() {
        let mut stream = make_dynamic_stream(MemoryDevice::new());
        assert!(stream.is_input());
        assert!(stream.is_output());
        assert!(stream.is_input_seekable());
        assert!(stream.is_output_seekable());
        assert!(!stream.has_status());

        assert_eq!(stream.write(b"12345").unwrap(), 5);
        let mut buf = [0u8; 5];
        assert_eq!(stream.read(&mut buf).unwrap(), 5);
        assert_eq!(&buf, b"12345");
    }

    #[test_log::test]
    fn offset_and_compression_split() {
        let mut pipeline = MemoryDevice::from_vec(HEADER.to_vec())
            | SeekOffsetFilter::new(10)
            | ZlibDecompressFilter::new();

        {
            let mut compressing = pipeline.split::<1>() | ZlibCompressFilter::new();
            assert_eq!(compressing.filter_count(), 1);
            let _: &ZlibCompressFilter = compressing.filter::<0>();
            StreamWriter::new(&mut compressing)
                .write_all(TEXT)
                .expect("Failed to write through split");
            // dropping the split terminates the zlib stream
        }
        assert_eq!(pipeline.filter_count(), 2);
        assert_eq!(&pipeline.device().as_slice()[..10], &HEADER);

        let decoded = StreamReader::new(&mut pipeline).read_to_end().unwrap();
        assert_eq!(decoded, TEXT);

        let whole = make_split(&mut pipeline) | SizeFilter::new(4);
        assert_eq!(whole.filter_count(), 1);
    }

    #[test]
    fn split_state_does_not_leak() {
        let mut pipeline = MemoryDevice::from_vec(b"abcdef".to_vec())
            | CircularBufferFilter::new(4).unwrap();
        let mut first = [0u8; 1];
        pipeline.read(&mut first).unwrap();
        assert_eq!(&first, b"a");
        assert_eq!(pipeline.filter::<0>().buffered_input(), 3);

        {
            let mut other = pipeline.split::<0>()
                | CircularBufferFilter::new(16).unwrap();
            other.write(b"XYZ").unwrap();
            assert_eq!(other.filter::<0>().pending_output(), 3);
            other.flush().unwrap();
        }
        assert_eq!(pipeline.filter::<0>().buffered_input(), 3);
        assert_eq!(pipeline.filter::<0>().pending_output(), 0);

        let rest = StreamReader::new(&mut pipeline).read_to_end().unwrap();
        assert_eq!(rest, b"bcdefXYZ");
    }

    #[test]
    fn non_seekable_device_stays_non_seekable() {
        type Raw = SocketDevice;
        type Offset = Pipeline<SeekOffsetFilter, Raw>;
        type Capped = Pipeline<SizeFilter, Offset>;
        type Ring = Pipeline<CircularBufferFilter, Capped>;
        type Inflate = Pipeline<ZlibDecompressFilter, Ring>;
        type Deflate = Pipeline<ZlibCompressFilter, Ring>;

        for category in [
            Raw::CATEGORY,
            Offset::CATEGORY,
            Capped::CATEGORY,
            Ring::CATEGORY,
            Inflate::CATEGORY,
            Deflate::CATEGORY,
        ] {
            assert!(!category.is_input_seekable());
            assert!(!category.is_output_seekable());
        }
    }

    #[test]
    fn file_pipeline_round_trip() {
        let temp_dir =
            TempDir::new("ark-streams").expect("Failed to create temporary directory");
        let path = temp_dir.path().join("text.z");

        {
            let device = FileDevice::open(
                &path,
                OpenMode::WRITE | OpenMode::TRUNCATE,
            )
            .expect("Failed to create file");
            let mut pipeline = compose(device, ZlibCompressFilter::new());
            StreamWriter::new(&mut pipeline).write_all(TEXT).unwrap();
        }

        let mut pipeline = FileDevice::open_read(&path).unwrap()
            | CircularBufferFilter::new(64).unwrap()
            | ZlibDecompressFilter::new();
        let decoded = StreamReader::new(&mut pipeline).read_to_end().unwrap();
        assert_eq!(decoded, TEXT);

        let standard = ZlibDecoder::new()
            .decode_all(&std::fs::read(&path).unwrap())
            .unwrap();
        assert_eq!(standard, TEXT);
    }

    #[test]
    fn config_driven_pipeline() {
        let config = StreamConfig::from_json(
            r#"{"compression_level": 9, "ring_capacity": 32, "header_offset": 10}"#,
        )
        .unwrap();

        let mut storage = MemoryDevice::from_vec(HEADER.to_vec());
        {
            let mut writer = make_split(&mut storage)
                | SeekOffsetFilter::from_config(&config)
                | ZlibCompressFilter::<64>::from_config(&config);
            assert_eq!(writer.filter::<1>().level().get(), 9);
            StreamWriter::new(&mut writer).write_all(TEXT).unwrap();
        }

        let mut reader = storage
            | SeekOffsetFilter::from_config(&config)
            | CircularBufferFilter::from_config(&config.circular_buffer())
                .unwrap()
            | ZlibDecompressFilter::new();
        assert_eq!(reader.filter::<1>().capacity(), 32);
        let decoded = StreamReader::new(&mut reader).read_to_end().unwrap();
        assert_eq!(decoded, TEXT);
    }

    #[test]
    fn uuid_through_reader_and_writer() {
        let id = Uuid::new_v4();
        let mut device = MemoryDevice::new();
        StreamWriter::new(&mut device)
            .write_all(id.as_bytes())
            .unwrap();
        assert_eq!(device.size().unwrap(), 16);

        let mut bytes = [0u8; 16];
        StreamReader::new(&mut device).read_exact(&mut bytes).unwrap();
        assert_eq!(Uuid::from_bytes(bytes), id);
    }

    #[test]
    fn referencing_dynamic_stream_sees_pipeline_writes() {
        let mut pipeline = MemoryDevice::new() | SizeFilter::new(3);
        {
            let mut stream = DynamicStream::from_mut(&mut pipeline);
            assert!(stream.has_size());
            stream.write(b"abcdef").unwrap();
            assert_eq!(stream.size().unwrap(), 3);
        }
        assert_eq!(pipeline.device().as_slice(), b"abcdef");
    }

    #[quickcheck]
    fn compression_round_trip(data: Vec<u8>) -> bool {
        let mut storage = MemoryDevice::new();
        {
            let mut pipeline =
                make_split(&mut storage) | ZlibCompressFilter::<32>::default();
            StreamWriter::new(&mut pipeline).write_all(&data).unwrap();
        }
        let mut pipeline = storage | ZlibDecompressFilter::<32>::default();
        StreamReader::new(&mut pipeline).read_to_end().unwrap() == data
    }

    #[quickcheck]
    fn repetitive_data_survives_small_reads(
        seed: Vec<u8>,
        repeats: u16,
        read_size: u8,
    ) -> bool {
        let unit = if seed.is_empty() {
            vec![b'a']
        } else {
            seed[..seed.len().min(8)].to_vec()
        };
        let data: Vec<u8> = unit
            .iter()
            .copied()
            .cycle()
            .take(unit.len() * (usize::from(repeats) % 4096 + 1))
            .collect();
        let read_size = usize::from(read_size) % 64 + 1;

        let mut storage = MemoryDevice::new();
        {
            let mut pipeline = make_split(&mut storage)
                | CircularBufferFilter::new(32).unwrap()
                | ZlibCompressFilter::new();
            StreamWriter::new(&mut pipeline).write_all(&data).unwrap();
        }

        let mut pipeline = storage
            | CircularBufferFilter::new(32).unwrap()
            | ZlibDecompressFilter::<16>::default()
            | CircularBufferFilter::new(8).unwrap();
        let mut decoded = Vec::new();
        let mut buf = vec![0u8; read_size];
        loop {
            let n = pipeline.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            decoded.extend_from_slice(&buf[..n]);
        }
        decoded == data
    }

    #[quickcheck]
    fn circular_buffer_round_trip(data: Vec<u8>, capacity: u8) -> bool {
        let capacity = usize::from(capacity) % 64 + 1;
        let mut storage = MemoryDevice::new();
        {
            let mut pipeline = make_split(&mut storage)
                | CircularBufferFilter::new(capacity).unwrap();
            StreamWriter::new(&mut pipeline).write_all(&data).unwrap();
            pipeline.flush().unwrap();
        }
        let mut pipeline = storage | CircularBufferFilter::new(capacity).unwrap();
        StreamReader::new(&mut pipeline).read_to_end().unwrap() == data
    }

    #[quickcheck]
    fn short_writes_keep_accepted_bytes(
        first: Vec<u8>,
        second: Vec<u8>,
        capacity: u8,
    ) -> bool {
        let capacity = usize::from(capacity);
        let mut storage = vec![0u8; capacity];
        let mut span = SpanDevice::new(&mut storage);

        let written = span.write(&first).unwrap();
        let remaining = capacity - written;
        let more = span.write(&second).unwrap();

        let mut expected = first[..written].to_vec();
        expected.extend_from_slice(&second[..more]);

        written == first.len().min(capacity)
            && more == second.len().min(remaining)
            && span.as_slice()[..expected.len()] == expected[..]
            && span.seekp(0, SeekDirection::Begin).unwrap()
    }
}
