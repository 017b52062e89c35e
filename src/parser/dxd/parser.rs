use super::container::ByteSource;
use super::decoder::{expected_samples, to_engineering_units, try_decode_raw};
use super::metadata::{valid_sample_rate, valid_scale, ChannelDescriptor, MetadataSource};
use super::scanner::scan;
use super::{DxdDataType, DxdError, IndexEntry, LoaderConfig, Result};
use polars::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Decoded samples of one channel.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ChannelData {
    pub time: Vec<f64>,
    pub values: Vec<f64>,
    pub sample_rate: f64,
    pub units: String,
}

/// An open DXD/DXZ recording. Metadata is resolved eagerly in `open`;
/// samples are decoded per channel on request.
pub struct DxdParser {
    path: PathBuf,
    source: Option<ByteSource>,
    channels: Vec<ChannelDescriptor>,
    by_name: HashMap<String, usize>,
    metadata_source: MetadataSource,
    is_compressed: bool,
    data_offset: usize,
    payload_len: usize,
    index_entries: Vec<IndexEntry>,
}

impl DxdParser {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, &LoaderConfig::default())
    }

    pub fn open_with<P: AsRef<Path>>(path: P, config: &LoaderConfig) -> Result<Self> {
        config.validate()?;
        let path = path.as_ref();
        let mut source = ByteSource::open(path)?;
        let is_compressed = source.is_compressed();
        if let Some(member) = source.member_name() {
            debug!("{:?}: reading archive member '{}'", path, member);
        }

        let buffer = source.read_all()?;
        let scan = scan(&buffer, config);
        let payload_len = buffer.len().saturating_sub(scan.data_offset);
        drop(buffer);

        let metadata_source = scan.metadata.source();
        let channels = scan.metadata.into_channels();
        let by_name = channels
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.clone(), i))
            .collect();

        if metadata_source == MetadataSource::Inferred {
            warn!(
                "{:?}: no usable setup block, {} channel(s) inferred with default settings",
                path,
                channels.len()
            );
        }

        Ok(DxdParser {
            path: path.to_path_buf(),
            source: Some(source),
            channels,
            by_name,
            metadata_source,
            is_compressed,
            data_offset: scan.data_offset,
            payload_len,
            index_entries: scan.index_entries,
        })
    }

    /// Release the file handle (and archive reader). Safe to call repeatedly.
    pub fn close(&mut self) {
        if let Some(source) = self.source.take() {
            debug!("Closing {:?}", self.path);
            drop(source);
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_closed(&self) -> bool {
        self.source.is_none()
    }

    pub fn is_compressed(&self) -> bool {
        self.is_compressed
    }

    pub fn data_offset(&self) -> usize {
        self.data_offset
    }

    pub fn payload_len(&self) -> usize {
        self.payload_len
    }

    pub fn index_entries(&self) -> &[IndexEntry] {
        &self.index_entries
    }

    pub fn metadata_source(&self) -> MetadataSource {
        self.metadata_source
    }

    pub fn is_inferred(&self) -> bool {
        self.metadata_source == MetadataSource::Inferred
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn get_channel_names(&self) -> Vec<String> {
        self.channels.iter().map(|c| c.name.clone()).collect()
    }

    pub fn channels(&self) -> &[ChannelDescriptor] {
        &self.channels
    }

    pub fn get_channel_info(&self, name: &str) -> Option<&ChannelDescriptor> {
        self.by_name.get(name).map(|&i| &self.channels[i])
    }

    fn position(&self, name: &str) -> Result<usize> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| DxdError::UnknownChannel {
                name: name.to_string(),
                available: self.get_channel_names(),
            })
    }

    /// Samples the channel would decode to, without reading the payload.
    pub fn estimated_samples(&self, name: &str) -> Result<usize> {
        let channel = &self.channels[self.position(name)?];
        if channel.num_samples > 0 {
            return Ok(channel.num_samples);
        }
        Ok(expected_samples(self.payload_len, channel.data_type, self.channels.len()))
    }

    /// `(time_seconds, values)` in engineering units. A payload too short to
    /// hold one sample yields two empty vectors.
    pub fn get_channel_data(&mut self, name: &str) -> Result<(Vec<f64>, Vec<f64>)> {
        let pos = self.position(name)?;
        let num_channels = self.channels.len();
        let payload = self
            .source
            .as_mut()
            .ok_or(DxdError::SessionClosed)?
            .read_from(self.data_offset as u64)?;
        Ok(decode_channel(&mut self.channels[pos], &payload, num_channels, &self.path))
    }

    /// Every channel decoded from a single read of the payload.
    pub fn load_all_channels(&mut self) -> Result<HashMap<String, ChannelData>> {
        let num_channels = self.channels.len();
        let payload = self
            .source
            .as_mut()
            .ok_or(DxdError::SessionClosed)?
            .read_from(self.data_offset as u64)?;

        let mut all = HashMap::with_capacity(num_channels);
        for channel in self.channels.iter_mut() {
            let (time, values) = decode_channel(channel, &payload, num_channels, &self.path);
            all.insert(
                channel.name.clone(),
                ChannelData {
                    time,
                    values,
                    sample_rate: channel.sample_rate_hz,
                    units: channel.units.clone(),
                },
            );
        }
        Ok(all)
    }

    // Corrections for channels whose metadata was missing or wrong.

    pub fn set_data_type(&mut self, name: &str, data_type: DxdDataType) -> Result<()> {
        let pos = self.position(name)?;
        let channel = &mut self.channels[pos];
        if channel.data_type != data_type {
            channel.data_type = data_type;
            channel.num_samples = 0;
        }
        Ok(())
    }

    pub fn set_sample_rate(&mut self, name: &str, sample_rate_hz: f64) -> Result<()> {
        let rate = valid_sample_rate(sample_rate_hz).ok_or_else(|| {
            DxdError::Config(format!("sample rate must be positive, got {}", sample_rate_hz))
        })?;
        let pos = self.position(name)?;
        self.channels[pos].sample_rate_hz = rate;
        Ok(())
    }

    pub fn set_scaling(&mut self, name: &str, scale: f64, offset: f64) -> Result<()> {
        let scale = valid_scale(scale)
            .ok_or_else(|| DxdError::Config(format!("scale must be finite and non-zero, got {}", scale)))?;
        if !offset.is_finite() {
            return Err(DxdError::Config(format!("offset must be finite, got {}", offset)));
        }
        let pos = self.position(name)?;
        self.channels[pos].scale = scale;
        self.channels[pos].offset = offset;
        Ok(())
    }

    pub fn set_units(&mut self, name: &str, units: impl Into<String>) -> Result<()> {
        let pos = self.position(name)?;
        self.channels[pos].units = units.into();
        Ok(())
    }

    /// One row per channel describing the recording.
    pub fn to_summary_rows(&self) -> Result<DataFrame> {
        let file = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let n = self.channels.len();
        let samples: Vec<u64> = self
            .channels
            .iter()
            .map(|c| {
                let count = if c.num_samples > 0 {
                    c.num_samples
                } else {
                    expected_samples(self.payload_len, c.data_type, n)
                };
                count as u64
            })
            .collect();

        let df = df! {
            "file" => vec![file; n],
            "channel" => self.channels.iter().map(|c| c.name.clone()).collect::<Vec<_>>(),
            "index" => self.channels.iter().map(|c| c.index as u64).collect::<Vec<_>>(),
            "sample_rate_hz" => self.channels.iter().map(|c| c.sample_rate_hz).collect::<Vec<_>>(),
            "units" => self.channels.iter().map(|c| c.units.clone()).collect::<Vec<_>>(),
            "scale" => self.channels.iter().map(|c| c.scale).collect::<Vec<_>>(),
            "offset" => self.channels.iter().map(|c| c.offset).collect::<Vec<_>>(),
            "data_type" => self.channels.iter().map(|c| c.data_type.to_string()).collect::<Vec<_>>(),
            "num_samples" => samples.clone(),
            "duration_s" => self.channels.iter().zip(&samples)
                .map(|(c, &s)| c.duration_s(s as usize))
                .collect::<Vec<_>>(),
            "compressed" => vec![self.is_compressed; n],
            "metadata_source" => vec![self.metadata_source.as_str().to_string(); n],
        }?;
        Ok(df)
    }
}

// Decode failures become an empty channel; the first decode fixes `num_samples`.
fn decode_channel(
    channel: &mut ChannelDescriptor,
    payload: &[u8],
    num_channels: usize,
    path: &Path,
) -> (Vec<f64>, Vec<f64>) {
    let mut raw = match try_decode_raw(payload, channel.data_type, num_channels, channel.index) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("{:?} channel '{}': {}", path, channel.name, e);
            Vec::new()
        }
    };

    if channel.num_samples == 0 {
        channel.num_samples = raw.len();
    } else {
        raw.truncate(channel.num_samples);
    }
    debug!("Decoded {} samples for '{}'", raw.len(), channel.name);
    to_engineering_units(&raw, channel)
}

impl Drop for DxdParser {
    fn drop(&mut self) {
        self.close();
    }
}
