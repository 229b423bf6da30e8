//! kiteline - generate Buildkite pipelines from Rust definitions
//!
//! ## Usage
//!
//! ```bash
//! # Write .buildkite/.generated/release.pipeline.json
//! kiteline release
//!
//! # Dynamic steps from another base directory
//! kiteline deploy --type steps --dir ci
//! ```
//!
//! With `CI=true` the generated document is also piped into
//! `buildkite-agent pipeline upload`.

use std::process::ExitCode;

mod cli;
mod pipelines;

#[tokio::main]
async fn main() -> ExitCode {
    match cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
