//! Release pipeline: format and lint checks, then a publish step on tags

use kiteline::prelude::*;

/// Checks the crate and publishes tagged builds
pub struct ReleasePipeline {
    base: BasePipeline,
}

impl FromContext for ReleasePipeline {
    fn from_context(context: &BuildContext) -> Self {
        Self {
            base: BasePipeline::new(context),
        }
    }
}

#[async_trait]
impl Pipeline for ReleasePipeline {
    async fn build(&mut self) -> Result<Document, PipelineError> {
        self.base.add_command_step(
            CommandStep::new("cargo fmt --all -- --check")
                .with_label(":rust: Format")
                .with_key("fmt"),
        );
        self.base.add_command_step(
            CommandStep::new("cargo clippy --all-targets -- -D warnings")
                .with_label(":paperclip: Clippy")
                .with_key("clippy"),
        );
        self.base.add_command_step(
            CommandStep::new("cargo publish")
                .with_label(":package: Publish")
                .with_key("publish")
                .with_condition("build.tag != null")
                .depends_on(["fmt", "clippy"]),
        );
        Ok(self.base.to_document())
    }
}

/// Exports of this unit
pub fn source() -> PipelineSource {
    pipeline_source!(ReleasePipeline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiteline::pipeline::PipelineConfig;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_release_document() {
        let config = PipelineConfig::new().with_plugin("cache", json!("cache#v1.0.0"));
        let context = BuildContext::new(Arc::new(config));
        let json = ReleasePipeline::from_context(&context)
            .generate_json()
            .await
            .unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["steps"].as_array().unwrap().len(), 3);
        assert_eq!(value["steps"][2]["if"], "build.tag != null");
        assert_eq!(value["steps"][2]["depends_on"], json!(["fmt", "clippy"]));
        assert_eq!(value["steps"][0]["plugins"], json!(["cache#v1.0.0"]));
    }
}
