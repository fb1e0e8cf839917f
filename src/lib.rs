use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod extract;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Source not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid GeoJSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Runs the full extract: reads the source collection, keeps rain garden
/// assets, writes the core output file. Returns the number of features
/// written.
pub fn run_extract(source: &Path, dest: &Path) -> Result<usize, ExtractError> {
    extract::extract_core_features(source, dest)
}
