use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use data_error::Result;
use dev_codec::CompressionLevel;

use crate::filters::{
    CircularBufferConfig, OverflowPolicy, DEFAULT_RING_CAPACITY,
};

/// Runtime settings for building pipelines, usually read from a JSON
/// file. Missing keys take their default values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    pub compression_level: CompressionLevel,
    pub ring_capacity: usize,
    pub overflow: OverflowPolicy,
    /// Cap applied by a [`SizeFilter`](crate::SizeFilter), if any.
    pub size_limit: Option<u64>,
    /// Bytes skipped by a [`SeekOffsetFilter`](crate::SeekOffsetFilter).
    pub header_offset: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            compression_level: CompressionLevel::default(),
            ring_capacity: DEFAULT_RING_CAPACITY,
            overflow: OverflowPolicy::default(),
            size_limit: None,
            header_offset: 0,
        }
    }
}

impl StreamConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading stream configuration from {}", path.display());
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn circular_buffer(&self) -> CircularBufferConfig {
        CircularBufferConfig {
            capacity: self.ring_capacity,
            overflow: self.overflow,
        }
    }
}
