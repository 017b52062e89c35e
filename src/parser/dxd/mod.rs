mod config;
mod container;
mod dataset;
mod datatypes;
mod decoder;
mod error;
mod extractor;
mod index;
mod metadata;
mod parser;
mod scanner;

pub use config::LoaderConfig;
pub use container::{is_compressed_path, ByteSource, COMPRESSED_EXTENSIONS, UNCOMPRESSED_EXTENSIONS};
pub use dataset::DxdDataset;
pub use datatypes::DxdDataType;
pub use decoder::{decode_values, expected_samples, time_vector, to_engineering_units, try_decode_raw};
pub use error::{DxdError, Result};
pub use index::IndexEntry;
pub use metadata::{ChannelDescriptor, ChannelField, MetadataSource, ResolvedMetadata};
pub use parser::{ChannelData, DxdParser};
pub use scanner::{fallback_data_offset, find_config_block, infer_channel_count, scan, ScanResult, INDEX_MARKER};

pub(crate) use container::extension_of;
pub(crate) use scanner::find_pattern;
