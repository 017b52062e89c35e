use super::{DxdError, DxdParser, LoaderConfig, Result};
use crate::parser::has_dxd_extension;
use polars::prelude::*;
use std::path::Path;
use tracing::{info, warn};
use walkdir::WalkDir;

/// Channel inventory across many recordings.
pub struct DxdDataset;

impl DxdDataset {
    /// Summarize every DXD/DXZ file below `dir_path`. Files that fail to open
    /// are logged and skipped.
    pub fn from_directory<P: AsRef<Path>>(dir_path: P, config: &LoaderConfig) -> Result<DataFrame> {
        let mut all_rows = Vec::new();
        let mut processed_count = 0;
        let mut error_count = 0;

        info!("Scanning directory: {:?}", dir_path.as_ref());

        for entry in WalkDir::new(dir_path.as_ref()).follow_links(true) {
            let entry = entry.map_err(|e| DxdError::Io(e.into()))?;
            let path = entry.path();
            if !entry.file_type().is_file() || !has_dxd_extension(path) {
                continue;
            }

            processed_count += 1;
            if processed_count % 10 == 0 {
                info!("Processed {} files...", processed_count);
            }

            match DxdParser::open_with(path, config).and_then(|parser| parser.to_summary_rows()) {
                Ok(rows) => all_rows.push(rows),
                Err(e) => {
                    error_count += 1;
                    warn!("Failed to summarize {:?}: {}", path, e);
                }
            }
        }

        info!("Processed {} files, {} errors", processed_count, error_count);

        let mut rows = all_rows.into_iter();
        let Some(mut combined) = rows.next() else {
            return Err(DxdError::FormatError(format!(
                "no readable DXD files found in {:?}",
                dir_path.as_ref()
            )));
        };
        for row_df in rows {
            combined.vstack_mut(&row_df)?;
        }

        info!("Final dataset shape: {:?}", combined.shape());
        Ok(combined)
    }

    /// Summarize specific files; the first failure aborts.
    pub fn from_files<P: AsRef<Path>>(file_paths: &[P], config: &LoaderConfig) -> Result<DataFrame> {
        let mut rows = file_paths
            .iter()
            .map(|path| DxdParser::open_with(path, config)?.to_summary_rows());
        let mut combined = match rows.next() {
            Some(first) => first?,
            None => return Err(DxdError::FormatError("no files provided".to_string())),
        };
        for row_df in rows {
            combined.vstack_mut(&row_df?)?;
        }
        Ok(combined)
    }
}
