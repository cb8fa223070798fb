use std::env;

use anyhow::{Context, Result};
use ark_streams::{
    CircularBufferFilter, FileDevice, OpenMode, Stream, StreamConfig,
    StreamWriter, ZlibCompressFilter,
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

    let mut input = FileDevice::open_read(&args[1])
        .with_context(|| format!("Failed to open {}", args[1]))?;
    let output =
        FileDevice::open(&args[2], OpenMode::WRITE | OpenMode::TRUNCATE)
            .with_context(|| format!("Failed to create {}", args[2]))?;

    let mut pipeline = output
        | CircularBufferFilter::from_config(&config.circular_buffer())?
        | ZlibCompressFilter::<256>::from_config(&config);

    let mut chunk = vec![0u8; config.ring_capacity.max(1)];
    let mut total = 0u64;
    let mut writer = StreamWriter::new(&mut pipeline);
    loop {
        let n = input.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        writer.write_all(&chunk[..n])?;
        total += n as u64;
    }
    pipeline.flush()?;

    let compressed = pipeline.device().size()?;
    info!("Compressed {} bytes into {}", total, compressed);
    println!("{} -> {} ({} -> {} bytes)", args[1], args[2], total, compressed);
    Ok(())
}
