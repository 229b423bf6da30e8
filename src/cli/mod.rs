//! Command line entry point
//!
//! `kiteline <name> [--dir DIR] [--type pipeline|steps] [--verbose]`
//! generates one pipeline and, in CI, uploads it.

pub mod generate;

use crate::pipelines;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use kiteline::infrastructure::{Settings, init_logging};
use kiteline::pipeline::{PipelineSource, SourceKind, derive_pipeline_name};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

/// CLI arguments for kiteline
#[derive(Parser, Debug)]
#[command(name = "kiteline")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Name of the pipeline to generate
    name: Option<String>,

    /// Base directory for configuration and generated output
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Kind of definition unit
    #[arg(short = 't', long = "type", value_enum, default_value_t = KindArg::Pipeline)]
    kind: KindArg,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum KindArg {
    Pipeline,
    Steps,
}

impl From<KindArg> for SourceKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Pipeline => SourceKind::Pipeline,
            KindArg::Steps => SourceKind::Steps,
        }
    }
}

/// Parse and execute CLI arguments
pub async fn run() -> Result<ExitCode> {
    match execute(Args::parse()).await? {
        Some(_) => Ok(ExitCode::SUCCESS),
        None => Ok(ExitCode::FAILURE),
    }
}

/// Generates the requested pipeline, `None` when no name was given
async fn execute(args: Args) -> Result<Option<PathBuf>> {
    let mut settings = Settings::from_env();
    if args.verbose {
        settings.log_level = "debug".to_string();
    }
    init_logging(&settings.log_level);

    if let Some(dir) = args.dir {
        settings.base_dir = dir;
    }
    settings.base_dir = std::env::current_dir()
        .context("Failed to read the working directory")?
        .join(&settings.base_dir);

    let catalog = pipelines::catalog();

    let Some(name) = args.name else {
        error!("Usage: kiteline <pipeline-name> [--dir <dir>] [--type pipeline|steps]");
        info!("Available pipelines: {}", available_names(&catalog).join(", "));
        return Ok(None);
    };

    let path = generate::generate(&settings, &catalog, &name, args.kind.into()).await?;
    Ok(Some(path))
}

/// Names of the bundled definition units, sorted and deduplicated
fn available_names(catalog: &[PipelineSource]) -> Vec<String> {
    let mut names: Vec<String> = catalog
        .iter()
        .map(|source| derive_pipeline_name(source.location()))
        .collect();
    names.sort();
    names.dedup();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_arguments() {
        let args =
            Args::try_parse_from(["kiteline", "deploy", "-d", "ci", "--type", "steps", "-v"])
                .unwrap();

        assert_eq!(args.name.as_deref(), Some("deploy"));
        assert_eq!(args.dir, Some(PathBuf::from("ci")));
        assert_eq!(args.kind, KindArg::Steps);
        assert!(args.verbose);
    }

    #[test]
    fn test_parse_defaults() {
        let args = Args::try_parse_from(["kiteline"]).unwrap();

        assert!(args.name.is_none());
        assert_eq!(SourceKind::from(args.kind), SourceKind::Pipeline);
        assert!(!args.verbose);
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        assert!(Args::try_parse_from(["kiteline", "x", "-t", "workflow"]).is_err());
    }

    #[tokio::test]
    async fn test_missing_name_generates_nothing() {
        let dir = tempfile::TempDir::new().unwrap();
        let dir_arg = dir.path().to_string_lossy().to_string();
        let args = Args::try_parse_from(["kiteline", "--dir", dir_arg.as_str()]).unwrap();

        assert!(execute(args).await.unwrap().is_none());
        assert!(!dir.path().join(".generated").exists());
    }

    #[test]
    fn test_available_names() {
        assert_eq!(
            available_names(&pipelines::catalog()),
            vec!["deploy", "example", "release"]
        );
    }
}
