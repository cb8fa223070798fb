use std::env;

use anyhow::{Context, Result};
use ark_streams::{
    CircularBufferFilter, FileDevice, OpenMode, SeekOffsetFilter,
    StreamConfig, StreamReader, StreamWriter, ZlibDecompressFilter,
};
use log::info;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 3 && args.len() != 4 {
        println!("Usage: {} <input> <output> [config.json]", args[0]);
        return Ok(());
    }

    let config = match args.get(3) {
        Some(path) => StreamConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path))?,
        None => StreamConfig::default(),
    };

    let input = FileDevice::open_read(&args[1])
        .with_context(|| format!("Failed to open {}", args[1]))?;
    let output =
        FileDevice::open(&args[2], OpenMode::WRITE | OpenMode::TRUNCATE)
            .with_context(|| format!("Failed to create {}", args[2]))?;

    // a non-zero header offset skips a container header before the zlib data
    let mut pipeline = input
        | SeekOffsetFilter::from_config(&config)
        | CircularBufferFilter::from_config(&config.circular_buffer())?
        | ZlibDecompressFilter::new();

    let data = StreamReader::new(&mut pipeline)
        .read_to_end()
        .with_context(|| format!("Failed to decompress {}", args[1]))?;

    let mut writer = StreamWriter::new(output);
    writer.write_all(&data)?;
    writer.into_inner().close()?;

    info!("Decompressed {} bytes", data.len());
    println!("{} -> {} ({} bytes)", args[1], args[2], data.len());
    Ok(())
}
