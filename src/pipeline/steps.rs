//! Step types for Buildkite pipelines
//!
//! A [`Step`] is one of six shapes. The variant is implied by the
//! discriminating key present in the serialized object (`group`, `trigger`,
//! `block`, `input`, `wait`/`waiter`), with [`CommandStep`] as the shape of
//! everything else.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use serde_with::skip_serializing_none;
use std::collections::BTreeMap;
use std::fmt;

/// A value given either as a single string or as a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StringOrList {
    /// A single string
    Single(String),
    /// A list of strings
    List(Vec<String>),
}

impl From<&str> for StringOrList {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for StringOrList {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<String>> for StringOrList {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl<const N: usize> From<[&str; N]> for StringOrList {
    fn from(value: [&str; N]) -> Self {
        Self::List(value.iter().map(|s| (*s).to_string()).collect())
    }
}

/// A flag that may also be given as a conditional expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoolOrString {
    /// Literal flag
    Bool(bool),
    /// Expression or reason
    String(String),
}

impl From<bool> for BoolOrString {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for BoolOrString {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

/// One entry of a `depends_on` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dependency {
    /// Key of the step depended on
    Key(String),
    /// Dependency that may tolerate failure of the upstream step
    Detailed {
        /// Key of the step depended on
        step: String,
        /// Whether the dependent runs even if the upstream step failed
        allow_failure: bool,
    },
}

/// Steps a step waits for before running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependsOn {
    /// A single step key
    Single(String),
    /// Several keys, optionally with failure tolerance
    List(Vec<Dependency>),
}

impl From<&str> for DependsOn {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl<const N: usize> From<[&str; N]> for DependsOn {
    fn from(value: [&str; N]) -> Self {
        Self::List(
            value
                .iter()
                .map(|s| Dependency::Key((*s).to_string()))
                .collect(),
        )
    }
}

impl From<Vec<Dependency>> for DependsOn {
    fn from(value: Vec<Dependency>) -> Self {
        Self::List(value)
    }
}

/// Agent targeting rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Agents {
    /// Tag name to value
    Tags(BTreeMap<String, String>),
    /// `key=value` query strings
    Queries(Vec<String>),
}

/// An exit status, either a code or the `*` wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExitStatus {
    /// Specific exit code
    Code(i32),
    /// Pattern, `*` for any non-zero status
    Pattern(String),
}

impl ExitStatus {
    /// Matches any failing exit status
    pub fn any() -> Self {
        Self::Pattern("*".to_string())
    }
}

/// Soft-fail rule for a single exit status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftFailConfig {
    /// Exit status tolerated
    pub exit_status: ExitStatus,
}

/// Soft-fail policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SoftFail {
    /// Tolerate every failure, or none
    Enabled(bool),
    /// Tolerate only the listed exit statuses
    ExitStatuses(Vec<SoftFailConfig>),
}

/// Reason reported when an agent signal ends a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalReason {
    /// The agent refused the job
    AgentRefused,
    /// The agent was stopped
    AgentStop,
    /// The job was cancelled
    Cancel,
    /// The process could not be started
    ProcessRunError,
    /// The job signature was rejected
    SignatureRejected,
}

/// One automatic retry rule
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AutomaticRetryRule {
    /// Exit status that triggers the retry
    pub exit_status: Option<ExitStatus>,
    /// Maximum number of retries
    pub limit: Option<u32>,
    /// Signal that triggers the retry
    pub signal: Option<String>,
    /// Signal reason that triggers the retry
    pub signal_reason: Option<SignalReason>,
}

/// Automatic retry policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AutomaticRetry {
    /// Enable or disable with defaults
    Enabled(bool),
    /// Conditional expression
    Expression(String),
    /// Single rule
    Rule(AutomaticRetryRule),
    /// Several rules, first match wins
    Rules(Vec<AutomaticRetryRule>),
}

/// Manual retry rule
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ManualRetryRule {
    /// Whether manual retries are allowed
    pub allowed: Option<BoolOrString>,
    /// Whether a passed job may be retried
    pub permit_on_passed: Option<BoolOrString>,
    /// Reason shown when retries are disallowed
    pub reason: Option<String>,
}

/// Manual retry policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ManualRetry {
    /// Allow or forbid
    Enabled(bool),
    /// Conditional expression
    Expression(String),
    /// Detailed rule
    Rule(ManualRetryRule),
}

/// Retry policy of a command step
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Automatic retries
    pub automatic: Option<AutomaticRetry>,
    /// Manual retries
    pub manual: Option<ManualRetry>,
}

/// A scalar value of a matrix dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatrixValue {
    /// Boolean element
    Bool(bool),
    /// Numeric element
    Number(serde_json::Number),
    /// String element
    String(String),
}

/// Matrix setup: a flat list or named dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatrixSetup {
    /// Single anonymous dimension
    Values(Vec<String>),
    /// Named dimensions
    Dimensions(BTreeMap<String, Vec<MatrixValue>>),
}

/// Combination selected by a matrix adjustment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatrixWith {
    /// Element of an anonymous dimension
    Values(Vec<String>),
    /// Dimension name to element
    Dimensions(BTreeMap<String, String>),
}

/// Adjustment applied to one matrix combination
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixAdjustment {
    /// Combination adjusted
    pub with: MatrixWith,
    /// Skip the combination
    pub skip: Option<BoolOrString>,
    /// Soft-fail policy for the combination
    pub soft_fail: Option<SoftFail>,
}

/// Matrix with setup and adjustments
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixConfig {
    /// Dimensions to expand
    pub setup: MatrixSetup,
    /// Per-combination adjustments
    pub adjustments: Option<Vec<MatrixAdjustment>>,
}

/// Matrix expansion of a command step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Matrix {
    /// Single anonymous dimension
    Values(Vec<String>),
    /// Full configuration
    Config(MatrixConfig),
}

/// Option of a select field
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    /// Text shown to the user
    pub label: String,
    /// Value stored in meta-data
    pub value: String,
    /// Help text
    pub hint: Option<String>,
}

impl SelectOption {
    /// Creates an option
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            hint: None,
        }
    }
}

/// Input field of a block or input step
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Field {
    /// Label of a text field
    pub text: Option<String>,
    /// Label of a select field
    pub select: Option<String>,
    /// Meta-data key the answer is stored under
    pub key: String,
    /// Help text
    pub hint: Option<String>,
    /// Whether an answer is required
    pub required: Option<bool>,
    /// Default answer
    pub default: Option<StringOrList>,
    /// Options of a select field
    pub options: Option<Vec<SelectOption>>,
    /// Whether several options may be selected
    pub multiple: Option<bool>,
}

impl Field {
    /// Creates a free-text field
    pub fn text(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: Some(label.into()),
            key: key.into(),
            ..Self::default()
        }
    }

    /// Creates a select field
    pub fn select(
        key: impl Into<String>,
        label: impl Into<String>,
        options: Vec<SelectOption>,
    ) -> Self {
        Self {
            select: Some(label.into()),
            key: key.into(),
            options: Some(options),
            ..Self::default()
        }
    }
}

/// Options shared by every step variant
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommonStepOptions {
    /// Run even if a dependency failed
    pub allow_dependency_failure: Option<bool>,
    /// Branch filter
    pub branches: Option<StringOrList>,
    /// Steps that must finish first
    pub depends_on: Option<DependsOn>,
    /// Step identifier
    pub id: Option<String>,
    /// Step identifier (alternative spelling)
    pub identifier: Option<String>,
    /// Conditional-run expression
    #[serde(rename = "if")]
    pub condition: Option<String>,
    /// Step key
    pub key: Option<String>,
    /// Label shown in the UI
    pub label: Option<String>,
    /// Label shown in the UI (alternative spelling)
    pub name: Option<String>,
    /// Skip flag or skip reason
    pub skip: Option<BoolOrString>,
}

/// State a build shows while blocked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockedState {
    /// Build shows as passed
    Passed,
    /// Build shows as failed
    Failed,
    /// Build shows as running
    Running,
}

/// Manual gate that pauses the build
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockStep {
    /// Common options
    #[serde(flatten)]
    pub common: CommonStepOptions,
    /// Label of the block
    pub block: String,
    /// Build state while blocked
    pub blocked_state: Option<BlockedState>,
    /// Fields to collect on unblock
    pub fields: Option<Vec<Field>>,
    /// Instructions for the person unblocking
    pub prompt: Option<String>,
}

impl BlockStep {
    /// Creates a block step
    pub fn new(block: impl Into<String>) -> Self {
        Self {
            block: block.into(),
            ..Self::default()
        }
    }

    /// Sets the prompt
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Adds a field
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.get_or_insert_with(Vec::new).push(field);
        self
    }
}

/// Collects input without blocking dependent steps
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InputStep {
    /// Common options
    #[serde(flatten)]
    pub common: CommonStepOptions,
    /// Label of the input
    pub input: String,
    /// Fields to collect
    pub fields: Option<Vec<Field>>,
    /// Instructions for the person answering
    pub prompt: Option<String>,
}

impl InputStep {
    /// Creates an input step
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }

    /// Adds a field
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.get_or_insert_with(Vec::new).push(field);
        self
    }
}

/// Order in which a concurrency group runs jobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConcurrencyMethod {
    /// Jobs run in creation order
    Ordered,
    /// Jobs run as soon as a slot frees up
    Eager,
}

/// Explicit type tag of a command step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandType {
    /// `script`
    Script,
    /// `command`
    Command,
    /// `commands`
    Commands,
}

/// Runs one or more shell commands on an agent
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CommandStep {
    /// Common options
    #[serde(flatten)]
    pub common: CommonStepOptions,
    /// Agent targeting rules
    pub agents: Option<Agents>,
    /// Artifacts to upload
    pub artifact_paths: Option<StringOrList>,
    /// Command(s) to run
    pub command: Option<StringOrList>,
    /// Command(s) to run (alternative spelling)
    pub commands: Option<StringOrList>,
    /// Maximum concurrent jobs in the group
    pub concurrency: Option<u32>,
    /// Concurrency group name
    pub concurrency_group: Option<String>,
    /// Concurrency ordering
    pub concurrency_method: Option<ConcurrencyMethod>,
    /// Environment overrides
    pub env: Option<BTreeMap<String, String>>,
    /// Matrix expansion
    pub matrix: Option<Matrix>,
    /// Number of parallel jobs
    pub parallelism: Option<u32>,
    /// Plugins, each a name or a single-key object
    pub plugins: Option<Vec<Value>>,
    /// Soft-fail policy
    pub soft_fail: Option<SoftFail>,
    /// Retry policy
    pub retry: Option<RetryConfig>,
    /// Timeout in minutes
    pub timeout_in_minutes: Option<u32>,
    /// Explicit type tag
    #[serde(rename = "type")]
    pub step_type: Option<CommandType>,
    /// Job priority
    pub priority: Option<i32>,
}

impl CommandStep {
    /// Creates a step running a single command
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: Some(StringOrList::Single(command.into())),
            ..Self::default()
        }
    }

    /// Sets the label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.common.label = Some(label.into());
        self
    }

    /// Sets the key
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.common.key = Some(key.into());
        self
    }

    /// Sets the id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.common.id = Some(id.into());
        self
    }

    /// Sets the conditional-run expression
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.common.condition = Some(condition.into());
        self
    }

    /// Sets the dependencies
    pub fn depends_on(mut self, depends_on: impl Into<DependsOn>) -> Self {
        self.common.depends_on = Some(depends_on.into());
        self
    }

    /// Sets an environment override
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Appends a plugin
    pub fn with_plugin(mut self, plugin: Value) -> Self {
        self.plugins.get_or_insert_with(Vec::new).push(plugin);
        self
    }

    /// Sets parallelism
    pub fn with_parallelism(mut self, parallelism: u32) -> Self {
        self.parallelism = Some(parallelism);
        self
    }

    /// Sets the timeout
    pub fn with_timeout_in_minutes(mut self, minutes: u32) -> Self {
        self.timeout_in_minutes = Some(minutes);
        self
    }
}

/// Accepts `null` or a string but requires the key to be present.
fn present_nullable<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)
}

/// Waits for all previous steps to finish
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WaitStep {
    /// Common options
    #[serde(flatten)]
    pub common: CommonStepOptions,
    /// Wait marker, `null` or `""`
    #[serialize_always]
    #[serde(alias = "waiter", deserialize_with = "present_nullable")]
    pub wait: Option<String>,
    /// Continue even if previous steps failed
    pub continue_on_failure: Option<bool>,
}

impl WaitStep {
    /// Creates a wait step
    pub fn new() -> Self {
        Self::default()
    }

    /// Continues past failed steps
    pub fn continue_on_failure(mut self) -> Self {
        self.continue_on_failure = Some(true);
        self
    }
}

/// Build settings of a triggered pipeline
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TriggerBuild {
    /// Branch to build
    pub branch: Option<String>,
    /// Commit to build
    pub commit: Option<String>,
    /// Environment of the triggered build
    pub env: Option<BTreeMap<String, String>>,
    /// Build message
    pub message: Option<String>,
    /// Meta-data of the triggered build
    pub meta_data: Option<serde_json::Map<String, Value>>,
    /// Trigger reference
    pub trigger: Option<String>,
}

/// Creates a build on another pipeline
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TriggerStep {
    /// Common options
    #[serde(flatten)]
    pub common: CommonStepOptions,
    /// Slug of the pipeline to trigger
    pub trigger: String,
    /// Do not wait for the triggered build
    #[serde(rename = "async")]
    pub is_async: Option<bool>,
    /// Settings of the triggered build
    pub build: Option<TriggerBuild>,
    /// Soft-fail policy
    pub soft_fail: Option<SoftFail>,
}

impl TriggerStep {
    /// Creates a trigger step
    pub fn new(trigger: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
            ..Self::default()
        }
    }
}

/// Named group of nested steps
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GroupStep {
    /// Common options
    #[serde(flatten)]
    pub common: CommonStepOptions,
    /// Group name, `null` for an anonymous group
    #[serialize_always]
    #[serde(deserialize_with = "present_nullable")]
    pub group: Option<String>,
    /// Nested steps in order
    pub steps: Vec<Step>,
}

impl GroupStep {
    /// Creates a named group
    pub fn new(group: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            group: Some(group.into()),
            steps,
            ..Self::default()
        }
    }
}

/// A single step of a pipeline document
///
/// Variant order is the order tried when parsing: every variant but
/// `Command` requires its discriminating key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Step {
    /// Group of nested steps
    Group(GroupStep),
    /// Trigger of another pipeline
    Trigger(TriggerStep),
    /// Blocking manual gate
    Block(BlockStep),
    /// Non-blocking input collection
    Input(InputStep),
    /// Barrier
    Wait(WaitStep),
    /// Command execution
    Command(CommandStep),
}

impl Step {
    /// Creates a plain wait step
    pub fn wait() -> Self {
        Self::Wait(WaitStep::new())
    }

    /// Options shared by every variant
    pub fn common(&self) -> &CommonStepOptions {
        match self {
            Self::Group(s) => &s.common,
            Self::Trigger(s) => &s.common,
            Self::Block(s) => &s.common,
            Self::Input(s) => &s.common,
            Self::Wait(s) => &s.common,
            Self::Command(s) => &s.common,
        }
    }

    /// Label of the step, if any
    pub fn label(&self) -> Option<&str> {
        self.common()
            .label
            .as_deref()
            .or(self.common().name.as_deref())
    }

    /// Returns the command step, if this is one
    pub fn as_command(&self) -> Option<&CommandStep> {
        match self {
            Self::Command(step) => Some(step),
            _ => None,
        }
    }

    /// Returns true for command steps
    pub fn is_command(&self) -> bool {
        matches!(self, Self::Command(_))
    }
}

impl From<CommandStep> for Step {
    fn from(step: CommandStep) -> Self {
        Self::Command(step)
    }
}

impl From<WaitStep> for Step {
    fn from(step: WaitStep) -> Self {
        Self::Wait(step)
    }
}

impl From<BlockStep> for Step {
    fn from(step: BlockStep) -> Self {
        Self::Block(step)
    }
}

impl From<InputStep> for Step {
    fn from(step: InputStep) -> Self {
        Self::Input(step)
    }
}

impl From<TriggerStep> for Step {
    fn from(step: TriggerStep) -> Self {
        Self::Trigger(step)
    }
}

impl From<GroupStep> for Step {
    fn from(step: GroupStep) -> Self {
        Self::Group(step)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Group(s) => write!(
                f,
                "group({}, {} steps)",
                s.group.as_deref().unwrap_or("~"),
                s.steps.len()
            ),
            Self::Trigger(s) => write!(f, "trigger({})", s.trigger),
            Self::Block(s) => write!(f, "block({})", s.block),
            Self::Input(s) => write!(f, "input({})", s.input),
            Self::Wait(_) => write!(f, "wait"),
            Self::Command(s) => match s.common.label.as_deref() {
                Some(label) => write!(f, "command({label})"),
                None => write!(f, "command"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_command_step_omits_absent_fields() {
        let step = Step::from(CommandStep::new("cargo test").with_label("Test"));
        let value = serde_json::to_value(&step).unwrap();
        assert_eq!(value, json!({"label": "Test", "command": "cargo test"}));
    }

    #[test]
    fn test_wait_step_serializes_null_marker() {
        let value = serde_json::to_value(Step::wait()).unwrap();
        assert_eq!(value, json!({"wait": null}));
    }

    #[test]
    fn test_condition_serializes_as_if() {
        let step = CommandStep::new("./release.sh").with_condition("build.tag != null");
        let value = serde_json::to_value(&step).unwrap();
        assert_eq!(value["if"], json!("build.tag != null"));
    }

    #[test]
    fn test_parse_discriminates_variants() {
        let steps: Vec<Step> = serde_json::from_value(json!([
            {"command": "make"},
            {"wait": null},
            {"waiter": ""},
            {"block": "Release?"},
            {"input": "Details", "fields": [{"text": "Version", "key": "version"}]},
            {"trigger": "deploy", "async": true},
            {"group": null, "steps": [{"command": "a"}]},
        ]))
        .unwrap();

        assert!(matches!(steps[0], Step::Command(_)));
        assert!(matches!(steps[1], Step::Wait(_)));
        assert!(matches!(&steps[2], Step::Wait(w) if w.wait.as_deref() == Some("")));
        assert!(matches!(steps[3], Step::Block(_)));
        assert!(matches!(steps[4], Step::Input(_)));
        assert!(matches!(&steps[5], Step::Trigger(t) if t.is_async == Some(true)));
        assert!(matches!(&steps[6], Step::Group(g) if g.group.is_none() && g.steps.len() == 1));
    }

    #[test]
    fn test_depends_on_forms() {
        let single: DependsOn = serde_json::from_value(json!("build")).unwrap();
        assert_eq!(single, DependsOn::from("build"));

        let detailed: DependsOn =
            serde_json::from_value(json!(["lint", {"step": "test", "allow_failure": true}]))
                .unwrap();
        assert_eq!(
            detailed,
            DependsOn::List(vec![
                Dependency::Key("lint".to_string()),
                Dependency::Detailed {
                    step: "test".to_string(),
                    allow_failure: true,
                },
            ])
        );
    }

    #[test]
    fn test_retry_and_soft_fail_forms() {
        let step: CommandStep = serde_json::from_value(json!({
            "command": "flaky",
            "soft_fail": [{"exit_status": "*"}],
            "retry": {
                "automatic": [{"exit_status": -1, "limit": 2}, {"signal_reason": "agent_stop"}],
                "manual": {"allowed": false, "reason": "no"}
            }
        }))
        .unwrap();

        assert_eq!(
            step.soft_fail,
            Some(SoftFail::ExitStatuses(vec![SoftFailConfig {
                exit_status: ExitStatus::any()
            }]))
        );
        let retry = step.retry.unwrap();
        assert!(matches!(retry.automatic, Some(AutomaticRetry::Rules(ref r)) if r.len() == 2));
        assert!(matches!(retry.manual, Some(ManualRetry::Rule(_))));
    }

    #[test]
    fn test_matrix_forms() {
        let flat: Matrix = serde_json::from_value(json!(["linux", "macos"])).unwrap();
        assert!(matches!(flat, Matrix::Values(ref v) if v.len() == 2));

        let config: Matrix = serde_json::from_value(json!({
            "setup": {"os": ["linux"], "shard": [1, 2], "debug": [true]},
            "adjustments": [{"with": {"os": "linux"}, "skip": true}]
        }))
        .unwrap();
        assert!(matches!(config, Matrix::Config(_)));
    }

    #[test]
    fn test_group_round_trip() {
        let group = Step::from(GroupStep::new(
            "Checks",
            vec![CommandStep::new("a").into(), Step::wait(), BlockStep::new("Go").into()],
        ));
        let json = serde_json::to_string(&group).unwrap();
        let parsed: Step = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, group);
    }

    #[test]
    fn test_step_display() {
        assert_eq!(Step::wait().to_string(), "wait");
        assert_eq!(
            Step::from(CommandStep::new("x").with_label("Build")).to_string(),
            "command(Build)"
        );
        assert_eq!(Step::from(TriggerStep::new("deploy")).to_string(), "trigger(deploy)");
    }

    #[test]
    fn test_step_label_falls_back_to_name() {
        let mut step = CommandStep::new("x");
        step.common.name = Some("Named".to_string());
        assert_eq!(Step::from(step).label(), Some("Named"));
    }
}
