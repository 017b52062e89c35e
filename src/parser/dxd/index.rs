// Best-effort record index. Nothing here is needed to decode samples.
use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;
use tracing::debug;

pub const MAX_INDEX_ENTRIES: u32 = 10_000;
pub const MAX_INDEX_ENTRY_SIZE: u32 = 256;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Byte position of the entry inside the decoded buffer.
    pub position: usize,
    pub bytes: Vec<u8>,
}

impl IndexEntry {
    /// Leading little-endian u32, usually a page offset.
    pub fn leading_u32(&self) -> Option<u32> {
        (self.bytes.len() >= 4).then(|| LittleEndian::read_u32(&self.bytes[..4]))
    }
}

/// Parse `(entry_count: u32, entry_size: u32)` at `start` followed by the
/// entries. Out-of-range parameters or a truncated entry yield an empty index.
pub fn parse_index_block(buffer: &[u8], start: usize) -> Vec<IndexEntry> {
    let Some(header) = buffer.get(start..start + 8) else {
        debug!("Index header truncated at byte {}", start);
        return Vec::new();
    };
    let entry_count = LittleEndian::read_u32(&header[..4]);
    let entry_size = LittleEndian::read_u32(&header[4..]);

    if !(1..MAX_INDEX_ENTRIES).contains(&entry_count) || !(1..MAX_INDEX_ENTRY_SIZE).contains(&entry_size) {
        debug!(
            "Ignoring index with {} entries of {} bytes",
            entry_count, entry_size
        );
        return Vec::new();
    }

    let entry_size = entry_size as usize;
    let mut entries = Vec::with_capacity(entry_count as usize);
    let mut position = start + 8;
    for _ in 0..entry_count {
        let Some(bytes) = buffer.get(position..position + entry_size) else {
            debug!("Index entry at byte {} truncated, dropping index", position);
            return Vec::new();
        };
        entries.push(IndexEntry {
            position,
            bytes: bytes.to_vec(),
        });
        position += entry_size;
    }
    debug!("Parsed {} index entries of {} bytes", entries.len(), entry_size);
    entries
}
