//! Parameter-driven pipelines
//!
//! A [`DynamicPipeline`] loads named value lists from a
//! [`ParameterSource`] and expands one command step per value.

use super::base::BasePipeline;
use super::config::PipelineConfig;
use super::context::BuildContext;
use super::document::Document;
use super::errors::PipelineError;
use super::steps::{CommandStep, Step};
use crate::infrastructure::ParameterSource;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Splits a raw parameter value into a list
///
/// Values containing a newline or comma are split on either delimiter,
/// trimmed, and empty pieces dropped. Anything else is a single-element
/// list holding the raw value, even when it is empty.
#[must_use]
pub fn split_param_value(raw: &str) -> Vec<String> {
    if raw.contains(['\n', ',']) {
        raw.split(['\n', ','])
            .map(str::trim)
            .filter(|piece| !piece.is_empty())
            .map(str::to_string)
            .collect()
    } else {
        vec![raw.to_string()]
    }
}

/// Builder that expands step templates over runtime parameter lists
///
/// The document starts without the configuration `env`; shared plugins are
/// still merged into every expanded step.
pub struct DynamicPipeline {
    base: BasePipeline,
    parameters: Arc<dyn ParameterSource>,
    input_params: HashMap<String, Vec<String>>,
}

impl DynamicPipeline {
    /// Creates an empty dynamic builder
    #[must_use]
    pub fn new(context: &BuildContext) -> Self {
        Self {
            base: BasePipeline::without_env(context),
            parameters: Arc::clone(&context.parameters),
            input_params: HashMap::new(),
        }
    }

    /// Resolves and splits the value of every key, in order
    ///
    /// Must complete before [`add_dynamic_step`](Self::add_dynamic_step) is
    /// called for any of these keys. Reloading a key replaces its list.
    pub async fn load_input_params<I, K>(&mut self, keys: I)
    where
        I: IntoIterator<Item = K> + Send,
        I::IntoIter: Send,
        K: AsRef<str> + Send,
    {
        for key in keys {
            let key = key.as_ref();
            let raw = self.parameters.get(key).await;
            let values = split_param_value(&raw);
            debug!(key, count = values.len(), "Loaded input parameter");
            self.input_params.insert(key.to_string(), values);
        }
    }

    /// Loaded values for `key`
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ParameterNotLoaded`] if `key` was never loaded.
    pub fn input_param(&self, key: &str) -> Result<&[String], PipelineError> {
        self.input_params
            .get(key)
            .map(Vec::as_slice)
            .ok_or_else(|| PipelineError::ParameterNotLoaded(key.to_string()))
    }

    /// Appends one command step per loaded value of `key`
    ///
    /// Each step is produced by `template`, receives the shared plugins, and
    /// is appended in list order.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ParameterNotLoaded`] if `key` was never loaded.
    pub fn add_dynamic_step<F>(&mut self, mut template: F, key: &str) -> Result<(), PipelineError>
    where
        F: FnMut(&str) -> CommandStep,
    {
        let values = self
            .input_params
            .get(key)
            .ok_or_else(|| PipelineError::ParameterNotLoaded(key.to_string()))?;

        for value in values {
            self.base.add_command_step(template(value));
        }
        Ok(())
    }

    /// Appends a step as-is
    pub fn add_step(&mut self, step: impl Into<Step>) {
        self.base.add_step(step);
    }

    /// Merges shared plugins into `step`, then appends it
    pub fn add_command_step(&mut self, step: CommandStep) {
        self.base.add_command_step(step);
    }

    /// Shared configuration
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        self.base.config()
    }

    /// Document assembled so far
    #[must_use]
    pub fn document(&self) -> &Document {
        self.base.document()
    }

    /// Mutable access for document-level settings
    pub fn document_mut(&mut self) -> &mut Document {
        self.base.document_mut()
    }

    /// Copy of the document assembled so far
    #[must_use]
    pub fn to_document(&self) -> Document {
        self.base.to_document()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::StaticParameterSource;
    use crate::pipeline::document::Notify;
    use crate::pipeline::steps::StringOrList;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    fn context(params: StaticParameterSource) -> BuildContext {
        let config = PipelineConfig::new()
            .with_env("SHOULD_NOT", "APPEAR")
            .with_plugin("docker", json!({"docker#v5.11.0": {"image": "rust"}}));
        BuildContext::new(Arc::new(config)).with_parameters(Arc::new(params))
    }

    #[test]
    fn test_split_comma_list() {
        assert_eq!(split_param_value("a, b,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_split_newline_list() {
        assert_eq!(split_param_value("a\nb"), vec!["a", "b"]);
    }

    #[test]
    fn test_split_single_value() {
        assert_eq!(split_param_value("single"), vec!["single"]);
    }

    #[test]
    fn test_split_empty_value() {
        assert_eq!(split_param_value(""), vec![""]);
    }

    #[test]
    fn test_split_drops_empty_pieces() {
        assert_eq!(split_param_value("a,,\n b ,"), vec!["a", "b"]);
    }

    #[test]
    fn test_new_has_no_env() {
        let pipeline = DynamicPipeline::new(&context(StaticParameterSource::default()));
        assert!(pipeline.document().env.is_none());
        assert!(pipeline.document().steps.is_empty());
    }

    #[test]
    fn test_document_mut_sets_document_fields() {
        let mut pipeline = DynamicPipeline::new(&context(StaticParameterSource::default()));
        pipeline.document_mut().priority = Some(5);
        pipeline.document_mut().notify = Some(vec![Notify::email("ops@example.com")]);

        let document = pipeline.to_document();
        assert_eq!(document.priority, Some(5));
        assert_eq!(document.notify.map(|n| n.len()), Some(1));
        assert!(document.env.is_none());
    }

    #[test]
    fn test_input_param_not_loaded() {
        let pipeline = DynamicPipeline::new(&context(StaticParameterSource::default()));
        assert_eq!(
            pipeline.input_param("services"),
            Err(PipelineError::ParameterNotLoaded("services".to_string()))
        );
    }

    #[tokio::test]
    async fn test_load_input_params() {
        let params = StaticParameterSource::default()
            .with("services", "api, web")
            .with("region", "eu-west-1");
        let mut pipeline = DynamicPipeline::new(&context(params));

        pipeline.load_input_params(["services", "region", "missing"]).await;

        assert_eq!(pipeline.input_param("services").unwrap(), ["api", "web"]);
        assert_eq!(pipeline.input_param("region").unwrap(), ["eu-west-1"]);
        assert_eq!(pipeline.input_param("missing").unwrap(), [""]);
    }

    #[tokio::test]
    async fn test_add_dynamic_step_expands_in_order() {
        let params = StaticParameterSource::default().with("targets", "x,y");
        let mut pipeline = DynamicPipeline::new(&context(params));
        pipeline.load_input_params(["targets"]).await;

        pipeline
            .add_dynamic_step(|target| CommandStep::new(target), "targets")
            .unwrap();

        let steps = &pipeline.document().steps;
        assert_eq!(steps.len(), 2);
        let first = steps[0].as_command().unwrap();
        let second = steps[1].as_command().unwrap();
        assert_eq!(first.command, Some(StringOrList::Single("x".to_string())));
        assert_eq!(second.command, Some(StringOrList::Single("y".to_string())));
        assert_eq!(
            first.plugins,
            Some(vec![json!({"docker#v5.11.0": {"image": "rust"}})])
        );
    }

    #[test]
    fn test_add_dynamic_step_unloaded_key() {
        let mut pipeline = DynamicPipeline::new(&context(StaticParameterSource::default()));
        let result = pipeline.add_dynamic_step(|target| CommandStep::new(target), "targets");

        assert_eq!(
            result,
            Err(PipelineError::ParameterNotLoaded("targets".to_string()))
        );
        assert!(pipeline.document().steps.is_empty());
    }

    proptest! {
        #[test]
        fn prop_split_has_no_delimiters(raw in "[a-z ,\n]{0,40}") {
            let values = split_param_value(&raw);
            prop_assert!(!values.is_empty() || raw.contains([',', '\n']));
            if raw.contains([',', '\n']) {
                for value in &values {
                    prop_assert!(!value.is_empty());
                    prop_assert!(!value.contains([',', '\n']));
                    prop_assert_eq!(value.trim(), value.as_str());
                }
            }
        }
    }
}
