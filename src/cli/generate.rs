//! Pipeline generation
//!
//! Loads the shared configuration, registers the requested definition
//! unit, builds it and writes the document to
//! `<dir>/.generated/<name>.<type>.json`. In CI the document is then
//! uploaded with `buildkite-agent pipeline upload`.

use anyhow::{Context, Result};
use kiteline::infrastructure::{Settings, write_generated};
use kiteline::pipeline::{
    BuildContext, ConfigStore, PipelineError, PipelineRegistry, PipelineSource, SourceKind,
};
use std::path::PathBuf;
use tracing::{debug, info};

/// Finds the bundled unit whose file name is `file`
pub fn find_source<'a>(catalog: &'a [PipelineSource], file: &str) -> Option<&'a PipelineSource> {
    catalog.iter().find(|source| source.file_name() == file)
}

/// Generates pipeline `name` and returns the path written
pub async fn generate(
    settings: &Settings,
    catalog: &[PipelineSource],
    name: &str,
    kind: SourceKind,
) -> Result<PathBuf> {
    let config_path = settings.config_path();
    debug!(path = %config_path.display(), "Loading configuration");
    let config = ConfigStore::new().load(&config_path).await;

    let file = kind.source_file_name(name);
    let source = find_source(catalog, &file)
        .ok_or_else(|| PipelineError::SourceNotFound { file: file.clone() })?;

    let mut registry = PipelineRegistry::new();
    let registered = registry.register_from_source(source)?;
    debug!(pipeline = %registered, location = %source.location().display(), "Registered source");

    let context = BuildContext::new(config).with_parameters(settings.parameter_source());
    let json = registry
        .generate_json(&registered, &context)
        .await
        .with_context(|| format!("Failed to generate pipeline '{name}'"))?;

    let path = write_generated(&settings.output_dir(), &kind.output_file_name(name), &json)
        .await
        .context("Failed to write generated pipeline")?;
    info!(path = %path.display(), "Pipeline written");

    if settings.ci {
        settings
            .agent()
            .pipeline_upload(&json)
            .await
            .context("Pipeline upload failed")?;
        info!(pipeline = name, "Pipeline uploaded");
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipelines;
    use kiteline::pipeline::Document;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    fn settings_in(dir: &TempDir) -> Settings {
        Settings {
            base_dir: dir.path().to_path_buf(),
            ..Settings::default()
        }
    }

    #[test]
    fn test_find_source() {
        let catalog = pipelines::catalog();
        assert!(find_source(&catalog, "release.pipeline.rs").is_some());
        assert!(find_source(&catalog, "deploy.steps.rs").is_some());
        assert!(find_source(&catalog, "deploy.pipeline.rs").is_none());
    }

    #[tokio::test]
    async fn test_generate_writes_document() {
        let dir = TempDir::new().unwrap();
        let settings = settings_in(&dir);

        let path = generate(&settings, &pipelines::catalog(), "example", SourceKind::Pipeline)
            .await
            .unwrap();

        assert_eq!(path, dir.path().join(".generated").join("example.pipeline.json"));
        let document = Document::from_json(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(document.step_count(), 2);
    }

    #[tokio::test]
    async fn test_generate_merges_configuration() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("config.yaml"),
            "env:\n  RUST_BACKTRACE: \"1\"\nplugins:\n  docker:\n    docker#v5.11.0:\n      image: rust:1.85\n",
        )
        .unwrap();
        let settings = settings_in(&dir);

        let path = generate(&settings, &pipelines::catalog(), "release", SourceKind::Pipeline)
            .await
            .unwrap();

        let document = Document::from_json(&std::fs::read_to_string(path).unwrap()).unwrap();
        let env = document.env.unwrap();
        assert_eq!(env.get("RUST_BACKTRACE"), Some(&json!("1")));
        for step in &document.steps {
            let plugins = step.as_command().unwrap().plugins.clone().unwrap();
            assert_eq!(plugins[0], json!({"docker#v5.11.0": {"image": "rust:1.85"}}));
        }
    }

    #[tokio::test]
    async fn test_generate_unknown_source() {
        let dir = TempDir::new().unwrap();
        let settings = settings_in(&dir);

        let err = generate(&settings, &pipelines::catalog(), "missing", SourceKind::Steps)
            .await
            .unwrap_err();

        assert_eq!(
            err.downcast_ref::<PipelineError>(),
            Some(&PipelineError::SourceNotFound {
                file: "missing.steps.rs".to_string()
            })
        );
        assert!(!dir.path().join(".generated").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_upload_keeps_written_file() {
        let dir = TempDir::new().unwrap();
        let settings = Settings {
            ci: true,
            agent_binary: "false".to_string(),
            ..settings_in(&dir)
        };

        let err = generate(&settings, &pipelines::catalog(), "example", SourceKind::Pipeline)
            .await
            .unwrap_err();

        assert!(format!("{err:#}").starts_with("Pipeline upload failed"));
        assert!(err.downcast_ref::<PipelineError>().is_some());
        assert!(
            dir.path()
                .join(".generated")
                .join("example.pipeline.json")
                .is_file()
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_successful_upload() {
        let dir = TempDir::new().unwrap();
        let settings = Settings {
            ci: true,
            agent_binary: "true".to_string(),
            ..settings_in(&dir)
        };

        let path = generate(&settings, &pipelines::catalog(), "example", SourceKind::Pipeline)
            .await
            .unwrap();
        assert!(path.is_file());
    }
}
