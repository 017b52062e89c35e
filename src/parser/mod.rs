pub mod dxd;

pub use dxd::{ChannelData, ChannelDescriptor, DxdDataset, DxdError, DxdParser, LoaderConfig, Result};

use dxd::{extension_of, find_pattern, MetadataSource, COMPRESSED_EXTENSIONS, UNCOMPRESSED_EXTENSIONS};
use polars::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Bytes read by `is_dxd_file` when the extension is not conclusive.
const SNIFF_BYTES: u64 = 1024;

/// Header signatures of DXD recordings and their zip packaging.
const DXD_SIGNATURES: &[&[u8]] = &[
    b"PK\x03\x04",
    b"DEWESoft",
    b"Dewesoft",
    b"DEWESOFT",
    b"<?xml",
];

pub struct FileParser;

impl FileParser {
    pub fn parse_dxd_summary<P: AsRef<Path>>(path: P, config: &LoaderConfig) -> Result<DataFrame> {
        let parser = DxdParser::open_with(path, config)?;
        parser.to_summary_rows()
    }

    pub fn parse_file<P: AsRef<Path>>(path: P, config: &LoaderConfig) -> Result<LazyFrame> {
        let path = path.as_ref();
        if !has_dxd_extension(path) {
            return Err(DxdError::FormatError(format!(
                "Unsupported file extension: {}",
                extension_of(path)
            )));
        }
        Ok(Self::parse_dxd_summary(path, config)?.lazy())
    }

    pub fn parse_directory<P: AsRef<Path>>(dir_path: P, config: &LoaderConfig) -> Result<LazyFrame> {
        let df = DxdDataset::from_directory(dir_path, config)?;
        Ok(df.lazy())
    }
}

/// Outcome of a metadata-only open.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FormatReport {
    pub path: PathBuf,
    pub is_compressed: bool,
    pub num_channels: usize,
    pub channel_names: Vec<String>,
    pub sample_rates: Vec<f64>,
    pub file_size: u64,
    pub metadata_source: MetadataSource,
}

/// Decode every channel of every file. Any failing file fails the whole call.
pub fn load_dxd_files<P: AsRef<Path>>(
    paths: &[P],
    config: &LoaderConfig,
) -> Result<HashMap<PathBuf, HashMap<String, ChannelData>>> {
    let mut results = HashMap::with_capacity(paths.len());
    for path in paths {
        let path = path.as_ref();
        let mut parser = DxdParser::open_with(path, config)?;
        let channels = parser.load_all_channels()?;
        parser.close();
        results.insert(path.to_path_buf(), channels);
    }
    Ok(results)
}

/// Channel names and rates without decoding any samples.
pub fn detect_dxd_format<P: AsRef<Path>>(path: P, config: &LoaderConfig) -> Result<FormatReport> {
    let path = path.as_ref();
    let mut parser = DxdParser::open_with(path, config)?;
    let report = FormatReport {
        path: path.to_path_buf(),
        is_compressed: parser.is_compressed(),
        num_channels: parser.num_channels(),
        channel_names: parser.get_channel_names(),
        sample_rates: parser.channels().iter().map(|c| c.sample_rate_hz).collect(),
        file_size: std::fs::metadata(path)?.len(),
        metadata_source: parser.metadata_source(),
    };
    parser.close();
    Ok(report)
}

pub fn has_dxd_extension(path: &Path) -> bool {
    let ext = extension_of(path);
    UNCOMPRESSED_EXTENSIONS.contains(&ext.as_str()) || COMPRESSED_EXTENSIONS.contains(&ext.as_str())
}

/// Cheap hint, not a confirmation. A known extension is accepted outright;
/// otherwise the first KiB is scanned for signatures that any zip or XML
/// file also carries, so a `true` here can still fail in `DxdParser::open`.
/// Never opens a session and never fails: unreadable paths are `false`.
pub fn is_dxd_file<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref();
    if !path.is_file() {
        return false;
    }
    if has_dxd_extension(path) {
        return true;
    }
    let mut header = Vec::new();
    let read = File::open(path).and_then(|file| file.take(SNIFF_BYTES).read_to_end(&mut header));
    if let Err(e) = read {
        debug!("Cannot sniff {:?}: {}", path, e);
        return false;
    }
    DXD_SIGNATURES
        .iter()
        .any(|signature| find_pattern(&header, signature, 0).is_some())
}
