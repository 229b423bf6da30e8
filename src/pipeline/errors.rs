//! Error types for pipeline generation

use thiserror::Error;

/// Errors that can occur while registering or generating pipelines
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// No pipeline is registered under the requested name
    #[error("Pipeline '{0}' not found")]
    NotFound(String),

    /// The pipeline definition file does not exist
    #[error("Pipeline file not found: {file}")]
    SourceNotFound {
        /// File name that was looked up.
        file: String,
    },

    /// A pipeline source declares no pipeline constructor
    #[error(
        "No valid pipeline class found in {location}. Expected a type implementing Pipeline. Found exports: {exports}"
    )]
    NoPipelineExport {
        /// Location of the source.
        location: String,
        /// Comma-separated names of the exports found.
        exports: String,
    },

    /// Input parameter values were requested before being loaded
    #[error("Input parameter '{0}' has not been loaded")]
    ParameterNotLoaded(String),

    /// External command execution failed
    #[error("Command failed with exit code {code}: {stderr}")]
    CommandFailed {
        /// Exit code returned by the command.
        code: i32,
        /// Standard error output from the command.
        stderr: String,
    },

    /// Document could not be rendered or parsed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Errors raised while reading a shared configuration file
///
/// These never reach callers of [`ConfigStore::load`](super::ConfigStore::load);
/// they are logged and the default configuration is used instead.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read
    #[error("Could not read {path}: {source}")]
    Io {
        /// Path of the configuration file.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The file is not valid YAML
    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The file is not valid JSON, or does not match the configuration shape
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The file does not contain a configuration object
    #[error("Configuration must be an object, got {0}")]
    Shape(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_pipeline() {
        let err = PipelineError::NotFound("missing".to_string());
        assert_eq!(err.to_string(), "Pipeline 'missing' not found");
    }

    #[test]
    fn test_no_pipeline_export_lists_exports() {
        let err = PipelineError::NoPipelineExport {
            location: "src/pipelines/util.rs".to_string(),
            exports: "helper, VERSION".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("src/pipelines/util.rs"));
        assert!(message.contains("Found exports: helper, VERSION"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = PipelineError::from(io_err);
        assert!(matches!(err, PipelineError::Io(ref m) if m.contains("denied")));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(
            PipelineError::from(json_err),
            PipelineError::Serialization(_)
        ));
    }

    #[test]
    fn test_config_shape_error() {
        let err = ConfigError::Shape("array".to_string());
        assert_eq!(err.to_string(), "Configuration must be an object, got array");
    }
}
