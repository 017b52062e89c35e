// Locates the embedded setup document and the payload start inside a DXD buffer.
use super::extractor::extract_channels;
use super::index::{parse_index_block, IndexEntry};
use super::metadata::{ChannelDescriptor, ResolvedMetadata};
use super::LoaderConfig;
use std::ops::Range;
use tracing::{debug, info};

/// Root element variants seen in DEWESoft setup blocks, tried in order.
pub const CONFIG_TAG_PATTERNS: &[(&[u8], &[u8])] = &[
    (b"<DEWESoftSetup", b"</DEWESoftSetup>"),
    (b"<DewesoftSetup", b"</DewesoftSetup>"),
    (b"<Setup", b"</Setup>"),
    (b"<setup", b"</setup>"),
    (b"<DEWESoft", b"</DEWESoft>"),
    (b"<Dewesoft", b"</Dewesoft>"),
    (b"<Configuration", b"</Configuration>"),
    (b"<configuration", b"</configuration>"),
];

/// Marker preceding the optional record index.
pub const INDEX_MARKER: &[u8] = b"DXDINDEX";

pub const MAX_INFERRED_CHANNELS: u16 = 256;

#[derive(Debug, Clone)]
pub struct ScanResult {
    pub metadata: ResolvedMetadata,
    pub config_block: Option<Range<usize>>,
    pub data_offset: usize,
    pub index_entries: Vec<IndexEntry>,
}

pub fn scan(buffer: &[u8], config: &LoaderConfig) -> ScanResult {
    let config_block = find_config_block(buffer);

    let (metadata, data_offset) = match &config_block {
        Some(range) => {
            debug!("Configuration block at bytes {}..{}", range.start, range.end);
            let metadata = match extract_channels(&buffer[range.clone()], config) {
                Some(channels) => ResolvedMetadata::Structured(channels),
                None => infer_channels(buffer, config),
            };
            (metadata, range.end)
        }
        None => {
            let offset = fallback_data_offset(buffer.len(), config);
            debug!("No configuration block, guessing payload at byte {}", offset);
            (infer_channels(buffer, config), offset)
        }
    };

    let index_entries = find_pattern(&buffer[..buffer.len().min(config.index_scan_bytes)], INDEX_MARKER, 0)
        .map(|pos| parse_index_block(buffer, pos + INDEX_MARKER.len()))
        .unwrap_or_default();

    info!(
        "Resolved {} {} channel(s), payload at byte {}",
        metadata.channels().len(),
        metadata.source().as_str(),
        data_offset
    );

    ScanResult {
        metadata,
        config_block,
        data_offset,
        index_entries,
    }
}

/// First tag pair present in the buffer, as an inclusive start..end-of-end-tag span.
pub fn find_config_block(buffer: &[u8]) -> Option<Range<usize>> {
    CONFIG_TAG_PATTERNS.iter().find_map(|(start_tag, end_tag)| {
        let start = find_pattern(buffer, start_tag, 0)?;
        let end = find_pattern(buffer, end_tag, start + start_tag.len())?;
        Some(start..end + end_tag.len())
    })
}

/// Payload offset guess for files without a setup block: a sixteenth of the
/// buffer, capped, rounded down to 8 bytes and never past the end.
pub fn fallback_data_offset(buffer_len: usize, config: &LoaderConfig) -> usize {
    let guess = (buffer_len / 16).min(config.max_fallback_header_bytes);
    (guess & !7).min(buffer_len)
}

/// Channel count from the first little-endian u16 in `1..=256` found at an
/// even offset of the header window; one channel when nothing qualifies.
pub fn infer_channel_count(buffer: &[u8], config: &LoaderConfig) -> usize {
    let window = &buffer[..buffer.len().min(config.header_scan_bytes)];
    window
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .find(|value| (1..=MAX_INFERRED_CHANNELS).contains(value))
        .map(usize::from)
        .unwrap_or(1)
}

fn infer_channels(buffer: &[u8], config: &LoaderConfig) -> ResolvedMetadata {
    let count = infer_channel_count(buffer, config);
    debug!("Inferred {} channel(s) from header bytes", count);
    ResolvedMetadata::Inferred(
        (0..count)
            .map(|i| ChannelDescriptor::with_defaults(i, config))
            .collect(),
    )
}

pub(crate) fn find_pattern(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || from >= haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| pos + from)
}
