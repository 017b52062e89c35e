// Normalizes .dxd files and .dxz archives into one readable byte source.
use super::{DxdError, Result};
use std::borrow::Cow;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use tracing::{debug, info};
use zip::ZipArchive;

pub const UNCOMPRESSED_EXTENSIONS: &[&str] = &["dxd", "d7d"];
pub const COMPRESSED_EXTENSIONS: &[&str] = &["dxz", "d7z"];
const METADATA_MEMBER_EXTENSIONS: &[&str] = &[".xml", ".txt", ".log"];

pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

pub fn is_compressed_path(path: &Path) -> bool {
    COMPRESSED_EXTENSIONS.contains(&extension_of(path).as_str())
}

pub enum ByteSource {
    File { file: File, len: u64 },
    Archive {
        // kept open for the lifetime of the source
        _archive: ZipArchive<File>,
        member: String,
        data: Vec<u8>,
    },
}

impl ByteSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DxdError::NotFound(path.to_path_buf()));
        }
        if is_compressed_path(path) {
            Self::open_archive(path)
        } else {
            let file = File::open(path)?;
            let len = file.metadata()?.len();
            debug!("Opened {:?} ({} bytes)", path, len);
            Ok(ByteSource::File { file, len })
        }
    }

    fn open_archive(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(file)
            .map_err(|e| DxdError::FormatError(format!("{:?} is not a readable archive: {}", path, e)))?;
        let names: Vec<String> = archive.file_names().map(str::to_string).collect();
        let member = select_member(&names)
            .ok_or_else(|| DxdError::FormatError(format!("{:?} contains no data member", path)))?
            .to_string();

        let mut data = Vec::new();
        {
            let mut entry = archive.by_name(&member).map_err(|e| {
                DxdError::FormatError(format!("cannot open member '{}': {}", member, e))
            })?;
            entry.read_to_end(&mut data)?;
        }
        info!(
            "Decompressed '{}' from {:?} ({} bytes)",
            member,
            path,
            data.len()
        );
        Ok(ByteSource::Archive {
            _archive: archive,
            member,
            data,
        })
    }

    pub fn is_compressed(&self) -> bool {
        matches!(self, ByteSource::Archive { .. })
    }

    pub fn member_name(&self) -> Option<&str> {
        match self {
            ByteSource::Archive { member, .. } => Some(member),
            ByteSource::File { .. } => None,
        }
    }

    pub fn len(&self) -> u64 {
        match self {
            ByteSource::File { len, .. } => *len,
            ByteSource::Archive { data, .. } => data.len() as u64,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn read_all(&mut self) -> Result<Cow<'_, [u8]>> {
        self.read_from(0)
    }

    /// Everything from `offset` to the end. Archive members are borrowed
    /// from the decompressed buffer, plain files are read from disk.
    pub fn read_from(&mut self, offset: u64) -> Result<Cow<'_, [u8]>> {
        match self {
            ByteSource::File { file, len } => {
                if offset >= *len {
                    return Ok(Cow::Owned(Vec::new()));
                }
                file.seek(SeekFrom::Start(offset))?;
                let mut buf = Vec::with_capacity((*len - offset) as usize);
                file.read_to_end(&mut buf)?;
                Ok(Cow::Owned(buf))
            }
            ByteSource::Archive { data, .. } => {
                let start = (offset as usize).min(data.len());
                Ok(Cow::Borrowed(&data[start..]))
            }
        }
    }
}

/// Inner member used as the data stream: a `.dxd`/`.d7d` member, else the
/// first member that is not a metadata sidecar, else the first member.
pub fn select_member(names: &[String]) -> Option<&str> {
    let lower: Vec<String> = names.iter().map(|n| n.to_ascii_lowercase()).collect();
    let by_extension = lower.iter().position(|name| {
        UNCOMPRESSED_EXTENSIONS
            .iter()
            .any(|ext| name.ends_with(&format!(".{}", ext)))
    });
    let non_metadata = || {
        lower.iter().position(|name| {
            !name.ends_with('/')
                && !METADATA_MEMBER_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
        })
    };
    by_extension
        .or_else(non_metadata)
        .or(if names.is_empty() { None } else { Some(0) })
        .map(|i| names[i].as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn prefers_data_extension() {
        let list = names(&["setup.xml", "notes.txt", "Run_01.DXD", "blob.bin"]);
        assert_eq!(select_member(&list), Some("Run_01.DXD"));
    }

    #[test]
    fn skips_metadata_members() {
        let list = names(&["setup.xml", "events.log", "payload.bin"]);
        assert_eq!(select_member(&list), Some("payload.bin"));
    }

    #[test]
    fn falls_back_to_first_member() {
        let list = names(&["setup.xml", "readme.txt"]);
        assert_eq!(select_member(&list), Some("setup.xml"));
        assert_eq!(select_member(&[]), None);
    }

    #[test]
    fn extension_checks_ignore_case() {
        assert!(is_compressed_path(Path::new("run.DXZ")));
        assert!(is_compressed_path(Path::new("run.d7z")));
        assert!(!is_compressed_path(Path::new("run.dxd")));
    }
}
