//! Buildkite agent CLI
//!
//! Thin async wrapper over the `buildkite-agent` subcommands the generator
//! needs: meta-data lookup and pipeline upload.

use crate::pipeline::PipelineError;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Default name of the agent binary
pub const DEFAULT_AGENT_BINARY: &str = "buildkite-agent";

/// Handle on the agent binary
#[derive(Debug, Clone)]
pub struct BuildkiteAgent {
    binary: String,
}

impl BuildkiteAgent {
    /// Uses `buildkite-agent` from `PATH`
    #[must_use]
    pub fn new() -> Self {
        Self::with_binary(DEFAULT_AGENT_BINARY)
    }

    /// Uses a specific agent binary
    #[must_use]
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Agent binary invoked
    #[must_use]
    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Runs `meta-data exists <key>`
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Io`] if the agent cannot be started.
    pub async fn metadata_exists(&self, key: &str) -> Result<bool, PipelineError> {
        let status = Command::new(&self.binary)
            .args(["meta-data", "exists", key])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await?;
        Ok(status.success())
    }

    /// Runs `meta-data get <key>` and returns the trimmed value
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::CommandFailed`] on a non-zero exit.
    pub async fn metadata_get(&self, key: &str) -> Result<String, PipelineError> {
        let output = Command::new(&self.binary)
            .args(["meta-data", "get", key])
            .output()
            .await?;

        if !output.status.success() {
            return Err(PipelineError::CommandFailed {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Pipes `json` into `pipeline upload`
    ///
    /// Stdin is fed while stderr is drained so a chatty agent cannot stall
    /// the upload.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Io`] if the agent cannot be started or fed,
    /// [`PipelineError::CommandFailed`] on a non-zero exit.
    pub async fn pipeline_upload(&self, json: &str) -> Result<(), PipelineError> {
        let mut child = Command::new(&self.binary)
            .args(["pipeline", "upload"])
            .stdin(Stdio::piped())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdin = child.stdin.take();
        let feed = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(json.as_bytes()).await?;
                stdin.shutdown().await?;
            }
            Ok::<(), std::io::Error>(())
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());

        let output = output?;
        if !output.status.success() {
            return Err(PipelineError::CommandFailed {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }
        fed?;
        Ok(())
    }
}

impl Default for BuildkiteAgent {
    fn default() -> Self {
        Self::new()
    }
}
