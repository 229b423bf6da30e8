//! Top-level pipeline document
//!
//! The [`Document`] is what gets uploaded to Buildkite. Its JSON rendering
//! (two-space indentation) is the canonical output of every builder.

use super::errors::PipelineError;
use super::steps::{Agents, Step};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::skip_serializing_none;
use std::fmt;

/// Environment variables in insertion order, each value a string
pub type EnvVars = Map<String, Value>;

/// Slack notification target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlackTarget {
    /// Single channel or user
    Channel(String),
    /// Several channels with a custom message
    Message {
        /// Channels notified
        channels: Vec<String>,
        /// Message text
        message: String,
    },
}

/// GitHub status or check context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubContext {
    /// Context name
    pub context: String,
}

/// Build notification rule
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Notify {
    /// `github_check` or `github_commit_status`
    Simple(String),
    /// Email notification
    Email {
        /// Recipient
        email: String,
        /// Condition
        #[serde(rename = "if")]
        condition: Option<String>,
    },
    /// Basecamp Campfire notification
    BasecampCampfire {
        /// Campfire URL
        basecamp_campfire: String,
        /// Condition
        #[serde(rename = "if")]
        condition: Option<String>,
    },
    /// Slack notification
    Slack {
        /// Target
        slack: SlackTarget,
        /// Condition
        #[serde(rename = "if")]
        condition: Option<String>,
    },
    /// Webhook notification
    Webhook {
        /// Webhook URL
        webhook: String,
        /// Condition
        #[serde(rename = "if")]
        condition: Option<String>,
    },
    /// PagerDuty change event
    PagerdutyChangeEvent {
        /// Integration key
        pagerduty_change_event: String,
        /// Condition
        #[serde(rename = "if")]
        condition: Option<String>,
    },
    /// GitHub commit status with a custom context
    GitHubCommitStatus {
        /// Status context
        github_commit_status: GitHubContext,
        /// Condition
        #[serde(rename = "if")]
        condition: Option<String>,
    },
    /// GitHub check with a custom context
    GitHubCheck {
        /// Check context
        github_check: GitHubContext,
        /// Condition
        #[serde(rename = "if")]
        condition: Option<String>,
    },
}

impl Notify {
    /// Notifies an email address on every build
    pub fn email(address: impl Into<String>) -> Self {
        Self::Email {
            email: address.into(),
            condition: None,
        }
    }

    /// Notifies a Slack channel on every build
    pub fn slack(channel: impl Into<String>) -> Self {
        Self::Slack {
            slack: SlackTarget::Channel(channel.into()),
            condition: None,
        }
    }
}

/// A complete Buildkite pipeline document
///
/// `steps` is always serialized, even when empty, and keeps insertion order.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    /// Pipeline-level environment
    pub env: Option<EnvVars>,
    /// Default agent targeting rules
    pub agents: Option<Agents>,
    /// Notification rules
    pub notify: Option<Vec<Notify>>,
    /// Steps in execution order
    #[serde(default)]
    pub steps: Vec<Step>,
    /// Build priority
    pub priority: Option<i32>,
}

impl Document {
    /// Creates an empty document without environment
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty document with the given environment
    #[must_use]
    pub fn with_env(env: EnvVars) -> Self {
        Self {
            env: Some(env),
            ..Self::default()
        }
    }

    /// Number of top-level steps
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Renders the document as two-space indented JSON
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Serialization`] if a plugin value cannot be
    /// rendered.
    pub fn to_json(&self) -> Result<String, PipelineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a document previously rendered with [`Document::to_json`]
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Serialization`] on malformed input.
    pub fn from_json(json: &str) -> Result<Self, PipelineError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Document: {} steps", self.steps.len())
    }
}
