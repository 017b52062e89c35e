use super::{DxdDataType, LoaderConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChannelDescriptor {
    pub name: String,
    /// Position inside one interleaved sample group.
    pub index: usize,
    pub sample_rate_hz: f64,
    pub units: String,
    pub scale: f64,
    pub offset: f64,
    pub data_type: DxdDataType,
    /// 0 until the channel is first decoded.
    pub num_samples: usize,
    pub description: Option<String>,
}

impl ChannelDescriptor {
    pub fn with_defaults(index: usize, config: &LoaderConfig) -> Self {
        Self {
            name: default_channel_name(index),
            index,
            sample_rate_hz: config.default_sample_rate_hz,
            units: String::new(),
            scale: 1.0,
            offset: 0.0,
            data_type: config.default_data_type,
            num_samples: 0,
            description: None,
        }
    }

    pub fn duration_s(&self, num_samples: usize) -> f64 {
        num_samples as f64 / self.sample_rate_hz
    }
}

pub fn default_channel_name(index: usize) -> String {
    format!("Channel_{}", index + 1)
}

/// Positive finite rate or `None`.
pub fn valid_sample_rate(value: f64) -> Option<f64> {
    (value.is_finite() && value > 0.0).then_some(value)
}

/// Non-zero finite scale or `None`.
pub fn valid_scale(value: f64) -> Option<f64> {
    (value.is_finite() && value != 0.0).then_some(value)
}

/// Where the channel list came from.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MetadataSource {
    Structured,
    Inferred,
}

impl MetadataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetadataSource::Structured => "structured",
            MetadataSource::Inferred => "inferred",
        }
    }
}

/// Channel descriptors tagged with how trustworthy they are.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedMetadata {
    /// Read from an embedded configuration document.
    Structured(Vec<ChannelDescriptor>),
    /// Synthesized from header byte patterns; rates, units and types are defaults.
    Inferred(Vec<ChannelDescriptor>),
}

impl ResolvedMetadata {
    pub fn source(&self) -> MetadataSource {
        match self {
            ResolvedMetadata::Structured(_) => MetadataSource::Structured,
            ResolvedMetadata::Inferred(_) => MetadataSource::Inferred,
        }
    }

    pub fn channels(&self) -> &[ChannelDescriptor] {
        match self {
            ResolvedMetadata::Structured(channels) | ResolvedMetadata::Inferred(channels) => channels,
        }
    }

    pub fn into_channels(self) -> Vec<ChannelDescriptor> {
        match self {
            ResolvedMetadata::Structured(channels) | ResolvedMetadata::Inferred(channels) => channels,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelField {
    Name,
    SampleRate,
    Units,
    Scale,
    Offset,
    DataType,
    Description,
}

/// Attribute / child element names seen across DEWESoft versions, highest priority first.
pub const CHANNEL_FIELD_KEYS: &[(ChannelField, &[&str])] = &[
    (ChannelField::Name, &["Name", "name", "ChannelName", "channel_name", "Label"]),
    (
        ChannelField::SampleRate,
        &["SampleRate", "sample_rate", "SamplingRate", "SampleFrequency", "Rate", "rate"],
    ),
    (ChannelField::Units, &["Unit", "Units", "unit", "units", "EngUnit"]),
    (ChannelField::Scale, &["Scale", "scale", "Gain", "gain", "Factor"]),
    (ChannelField::Offset, &["Offset", "offset"]),
    (ChannelField::DataType, &["DataType", "data_type", "Type", "type", "SampleType"]),
    (ChannelField::Description, &["Description", "description", "Desc", "Comment"]),
];

/// Root-level properties that hold a bare channel count.
pub const CHANNEL_COUNT_KEYS: &[&str] = &[
    "ChannelCount",
    "NumChannels",
    "NumberOfChannels",
    "channel_count",
    "num_channels",
];

impl ChannelField {
    pub fn candidate_keys(self) -> &'static [&'static str] {
        CHANNEL_FIELD_KEYS
            .iter()
            .find(|(field, _)| *field == self)
            .map(|(_, keys)| *keys)
            .unwrap_or(&[])
    }
}

/// Rename duplicates so every channel name in a file is unique.
pub fn dedupe_names(channels: &mut [ChannelDescriptor]) {
    let mut seen = HashSet::new();
    for channel in channels.iter_mut() {
        if seen.contains(&channel.name) {
            let mut suffix = channel.index + 1;
            let mut candidate = format!("{}_{}", channel.name, suffix);
            while seen.contains(&candidate) {
                suffix += 1;
                candidate = format!("{}_{}", channel.name, suffix);
            }
            channel.name = candidate;
        }
        seen.insert(channel.name.clone());
    }
}
