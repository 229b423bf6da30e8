//! Generated document output

use crate::pipeline::PipelineError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes `json` to `dir/file_name`, creating `dir` if needed
///
/// # Errors
///
/// Returns [`PipelineError::Io`] if the directory or file cannot be written.
pub async fn write_generated(
    dir: &Path,
    file_name: &str,
    json: &str,
) -> Result<PathBuf, PipelineError> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(file_name);
    tokio::fs::write(&path, json).await?;
    debug!(path = %path.display(), bytes = json.len(), "Wrote generated document");
    Ok(path)
}
