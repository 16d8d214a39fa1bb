//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::ApiError;

/// Map domain errors to the message printed on stderr before a non-zero exit.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::CredentialMissing | ApiError::PresetNotFound(_) => e.to_string(),
        ApiError::TaskSource(msg) => format!("Invalid tasks: {}", msg),
        ApiError::ChunkFailed { .. } => format!("Analysis aborted: {}", e),
        _ => format!("Error: {}", e),
    }
}
