//! Result persistence: whole-file writes with parent directories created on demand.

use crate::error::StorageError;
use std::path::Path;
use tracing::debug;

/// Write `content` to `path`, overwriting any existing file. No retry.
pub async fn write_output(path: &Path, content: &str) -> Result<(), StorageError> {
    if path.as_os_str().is_empty() {
        return Err(StorageError::InvalidPath("empty output path".to_string()));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| StorageError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    tokio::fs::write(path, content)
        .await
        .map_err(|source| StorageError::Write {
            path: path.to_path_buf(),
            source,
        })?;

    debug!(path = %path.display(), bytes = content.len(), "Wrote output");
    Ok(())
}
