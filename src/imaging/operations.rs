//! High-level single-image operations.
//!
//! These functions combine a codec with an [`Operation`]: decode the source,
//! run the operation, and write the result next to wherever the caller asked,
//! with the file extension forced to match the source's.

use super::backend::{CodecError, ImageCodec};
use super::params::Operation;
use super::pixel::PixelError;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OperationError {
    #[error("Failed to load source image {path}: {source}")]
    SourceLoad { path: PathBuf, source: CodecError },
    #[error("Invalid operation on {path}: {source}")]
    Pixel { path: PathBuf, source: PixelError },
    #[error("Failed to create directory {path}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    OutputWrite { path: PathBuf, source: CodecError },
}

/// Replace `path`'s extension with `source`'s (or remove it if the source has none).
pub fn with_source_extension(path: &Path, source: &Path) -> PathBuf {
    match source.extension() {
        Some(ext) => path.with_extension(ext),
        None => path.with_extension(""),
    }
}

/// Decode `source`, run `operation`, and write the result to `output`.
///
/// The output's extension is replaced by the source's, its parent directory is
/// created if missing, and an existing file is overwritten. Returns the path
/// actually written.
pub fn process_file(
    codec: &impl ImageCodec,
    source: &Path,
    output: &Path,
    operation: &Operation,
) -> Result<PathBuf, OperationError> {
    let buffer = codec
        .decode(source)
        .map_err(|e| OperationError::SourceLoad {
            path: source.to_path_buf(),
            source: e,
        })?;

    let output = with_source_extension(output, source);
    log::debug!(
        "{}: {} ({}x{})",
        source.display(),
        operation.describe(),
        buffer.width(),
        buffer.height()
    );

    let result = operation.run(buffer).map_err(|e| OperationError::Pixel {
        path: source.to_path_buf(),
        source: e,
    })?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| OperationError::DirectoryCreate {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    codec
        .encode(&result, &output)
        .map_err(|e| OperationError::OutputWrite {
            path: output.clone(),
            source: e,
        })?;

    log::info!("wrote {}", output.display());
    Ok(output)
}
