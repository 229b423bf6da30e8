//! Name-based pipeline registry
//!
//! Pipeline definition units describe themselves with a [`PipelineSource`]
//! listing their exports. The registry maps names to constructors, builds
//! the requested pipeline and returns its document.

use super::base::{FromContext, Pipeline};
use super::context::BuildContext;
use super::document::Document;
use super::errors::PipelineError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Name used when none can be derived from a source location
pub const UNKNOWN_PIPELINE_NAME: &str = "unknown";

/// Creates a boxed pipeline from a build context
pub type PipelineConstructor = Arc<dyn Fn(&BuildContext) -> Box<dyn Pipeline> + Send + Sync>;

/// Constructor for any pipeline type built from a context
#[must_use]
pub fn constructor_of<P>() -> PipelineConstructor
where
    P: Pipeline + FromContext + 'static,
{
    Arc::new(|context: &BuildContext| Box::new(P::from_context(context)) as Box<dyn Pipeline>)
}

/// A named value declared by a pipeline source
#[derive(Clone)]
pub enum Export {
    /// A pipeline constructor
    Pipeline(PipelineConstructor),
    /// Any other value
    Other,
}

impl Export {
    /// Returns true for pipeline constructors
    #[must_use]
    pub fn is_pipeline(&self) -> bool {
        matches!(self, Self::Pipeline(_))
    }
}

impl fmt::Debug for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pipeline(_) => f.write_str("Pipeline(..)"),
            Self::Other => f.write_str("Other"),
        }
    }
}

/// A pipeline definition unit and its declared exports
#[derive(Debug, Clone)]
pub struct PipelineSource {
    location: PathBuf,
    exports: Vec<(String, Export)>,
}

impl PipelineSource {
    /// Creates a source at `location` with no exports
    #[must_use]
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
            exports: Vec::new(),
        }
    }

    /// Declares a pipeline export
    #[must_use]
    pub fn export_pipeline<P>(mut self, name: impl Into<String>) -> Self
    where
        P: Pipeline + FromContext + 'static,
    {
        self.exports
            .push((name.into(), Export::Pipeline(constructor_of::<P>())));
        self
    }

    /// Declares a non-pipeline export
    #[must_use]
    pub fn export_value(mut self, name: impl Into<String>) -> Self {
        self.exports.push((name.into(), Export::Other));
        self
    }

    /// Location of the unit
    #[must_use]
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// File name of the unit, empty if the location has none
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.location
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
    }

    /// Declared exports in declaration order
    #[must_use]
    pub fn exports(&self) -> &[(String, Export)] {
        &self.exports
    }

    /// First pipeline constructor among the exports
    #[must_use]
    pub fn pipeline_export(&self) -> Option<&PipelineConstructor> {
        self.exports.iter().find_map(|(_, export)| match export {
            Export::Pipeline(constructor) => Some(constructor),
            Export::Other => None,
        })
    }
}

/// Kind of pipeline definition unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceKind {
    /// `<name>.pipeline.rs`
    #[default]
    Pipeline,
    /// `<name>.steps.rs`
    Steps,
}

impl SourceKind {
    /// Suffix between the name and the extension
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Pipeline => "pipeline",
            Self::Steps => "steps",
        }
    }

    /// File name of the unit defining `name`
    #[must_use]
    pub fn source_file_name(self, name: &str) -> String {
        format!("{name}.{}.rs", self.suffix())
    }

    /// File name of the generated document for `name`
    #[must_use]
    pub fn output_file_name(self, name: &str) -> String {
        format!("{name}.{}.json", self.suffix())
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Derives a pipeline name from a unit location
///
/// Drops the last extension, then a trailing `.pipeline` or `.steps`.
/// Falls back to `unknown` when nothing is left.
#[must_use]
pub fn derive_pipeline_name(location: &Path) -> String {
    let stem = location
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default();

    let name = stem
        .strip_suffix(".pipeline")
        .or_else(|| stem.strip_suffix(".steps"))
        .unwrap_or(stem);

    if name.is_empty() {
        UNKNOWN_PIPELINE_NAME.to_string()
    } else {
        name.to_string()
    }
}

/// Catalog of pipeline constructors keyed by name
#[derive(Default, Clone)]
pub struct PipelineRegistry {
    pipelines: HashMap<String, PipelineConstructor>,
}

impl PipelineRegistry {
    /// Creates an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `constructor` under `name`, replacing any previous entry
    pub fn register(&mut self, name: impl Into<String>, constructor: PipelineConstructor) {
        let name = name.into();
        if self.pipelines.insert(name.clone(), constructor).is_some() {
            warn!(pipeline = %name, "Replacing previously registered pipeline");
        } else {
            debug!(pipeline = %name, "Registered pipeline");
        }
    }

    /// Registers pipeline type `P` under `name`
    pub fn register_pipeline<P>(&mut self, name: impl Into<String>)
    where
        P: Pipeline + FromContext + 'static,
    {
        self.register(name, constructor_of::<P>());
    }

    /// Registers the first pipeline export of `source`
    ///
    /// The name is derived from the source location.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NoPipelineExport`] if the source exports no
    /// pipeline.
    pub fn register_from_source(&mut self, source: &PipelineSource) -> Result<String, PipelineError> {
        let constructor =
            source
                .pipeline_export()
                .ok_or_else(|| PipelineError::NoPipelineExport {
                    location: source.location().display().to_string(),
                    exports: source
                        .exports()
                        .iter()
                        .map(|(name, _)| name.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                })?;

        let name = derive_pipeline_name(source.location());
        self.register(name.clone(), Arc::clone(constructor));
        Ok(name)
    }

    /// Constructor registered under `name`
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<PipelineConstructor> {
        self.pipelines.get(name).cloned()
    }

    /// Returns true if `name` is registered
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.pipelines.contains_key(name)
    }

    /// Registered names, sorted
    #[must_use]
    pub fn list_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.pipelines.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered pipelines
    #[must_use]
    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    /// Returns true if nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }

    /// Builds the pipeline registered under `name`
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NotFound`] for unknown names and propagates
    /// build errors.
    pub async fn generate(
        &self,
        name: &str,
        context: &BuildContext,
    ) -> Result<Document, PipelineError> {
        let constructor = self
            .resolve(name)
            .ok_or_else(|| PipelineError::NotFound(name.to_string()))?;
        build_with(name, &constructor, context).await
    }

    /// Builds the pipeline registered under `name` and renders it as JSON
    ///
    /// # Errors
    ///
    /// Same as [`generate`](Self::generate), plus serialization errors.
    pub async fn generate_json(
        &self,
        name: &str,
        context: &BuildContext,
    ) -> Result<String, PipelineError> {
        self.generate(name, context).await?.to_json()
    }
}

impl fmt::Debug for PipelineRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineRegistry")
            .field("pipelines", &self.list_names())
            .finish()
    }
}

async fn build_with(
    name: &str,
    constructor: &PipelineConstructor,
    context: &BuildContext,
) -> Result<Document, PipelineError> {
    let mut pipeline = constructor(context);
    let document = pipeline.build().await?;
    info!(pipeline = name, steps = document.step_count(), "Generated pipeline");
    Ok(document)
}

/// Registry shared between tasks
///
/// The lock is only held while touching the map, never across a build.
#[derive(Debug, Clone, Default)]
pub struct SharedRegistry {
    inner: Arc<RwLock<PipelineRegistry>>,
}

impl SharedRegistry {
    /// Creates an empty shared registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `constructor` under `name`
    pub fn register(&self, name: impl Into<String>, constructor: PipelineConstructor) {
        self.inner.write().register(name, constructor);
    }

    /// Registers the first pipeline export of `source`
    ///
    /// # Errors
    ///
    /// See [`PipelineRegistry::register_from_source`].
    pub fn register_from_source(&self, source: &PipelineSource) -> Result<String, PipelineError> {
        self.inner.write().register_from_source(source)
    }

    /// Registered names, sorted
    #[must_use]
    pub fn list_names(&self) -> Vec<String> {
        self.inner.read().list_names()
    }

    /// Builds the pipeline registered under `name`
    ///
    /// # Errors
    ///
    /// See [`PipelineRegistry::generate`].
    pub async fn generate(
        &self,
        name: &str,
        context: &BuildContext,
    ) -> Result<Document, PipelineError> {
        let constructor = self
            .inner
            .read()
            .resolve(name)
            .ok_or_else(|| PipelineError::NotFound(name.to_string()))?;
        build_with(name, &constructor, context).await
    }
}

impl From<PipelineRegistry> for SharedRegistry {
    fn from(registry: PipelineRegistry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
        }
    }
}
