use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Azure Pipelines build run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Build {
    /// Unique identifier for the build
    pub id: u32,
    /// Human-facing build number (e.g., "20240731.4")
    #[serde(default)]
    pub build_number: Option<String>,
    /// Current status of the build
    #[serde(default)]
    pub status: Option<BuildStatus>,
    /// Final result of the build, absent while in progress
    #[serde(default)]
    pub result: Option<BuildResult>,
    /// Git ref the build ran against (e.g., "refs/heads/main")
    #[serde(default)]
    pub source_branch: Option<String>,
    /// SHA of the commit the build ran against
    #[serde(default)]
    pub source_version: Option<String>,
    /// Pipeline definition the build belongs to
    pub definition: DefinitionReference,
    /// Identity that requested the build
    #[serde(default)]
    pub requested_by: Option<IdentityRef>,
    /// Identity the build was requested for
    #[serde(default)]
    pub requested_for: Option<IdentityRef>,
    /// When the build was queued
    #[serde(default)]
    pub queue_time: Option<DateTime<Utc>>,
    /// When the build started
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    /// When the build finished
    #[serde(default)]
    pub finish_time: Option<DateTime<Utc>>,
    /// REST hyperlinks attached to the build
    #[serde(rename = "_links", default)]
    pub links: Option<ReferenceLinks>,
}

/// Reference to a pipeline definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionReference {
    pub id: u32,
    pub name: String,
}

/// A user or service identity as the platform reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRef {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub unique_name: Option<String>,
}

/// Hyperlink collection the platform attaches to resources.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceLinks {
    #[serde(default)]
    pub web: Option<Link>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
}

/// Ordered record of everything that ran within a build.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub change_id: Option<i64>,
    #[serde(default)]
    pub last_changed_on: Option<DateTime<Utc>>,
    /// All stage/phase/job/task records, in timeline order
    #[serde(default)]
    pub records: Vec<TimelineRecord>,
}

/// A single entry in a build timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineRecord {
    /// Record identifier (a GUID)
    pub id: String,
    /// Identifier of the enclosing record, absent for top-level stages
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Kind of work this record represents
    #[serde(rename = "type", default)]
    pub record_type: RecordType,
    /// Display name of the stage/phase/job/task
    #[serde(default)]
    pub name: Option<String>,
    /// Execution state of the record
    #[serde(default)]
    pub state: Option<String>,
    /// Final result, absent while the record is still running
    #[serde(default)]
    pub result: Option<TaskResult>,
    /// Log attached to the record, if any output was captured
    #[serde(default)]
    pub log: Option<LogReference>,
    /// Issues (errors/warnings) the platform attached to the record
    #[serde(default)]
    pub issues: Vec<Issue>,
    /// Position among siblings
    #[serde(default)]
    pub order: Option<i32>,
    #[serde(default)]
    pub error_count: Option<u32>,
    #[serde(default)]
    pub warning_count: Option<u32>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finish_time: Option<DateTime<Utc>>,
    /// Agent the record ran on
    #[serde(default)]
    pub worker_name: Option<String>,
}

/// Reference to a build log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogReference {
    pub id: u32,
    #[serde(default)]
    pub url: Option<String>,
}

/// An error or warning message attached to a timeline record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    #[serde(rename = "type", default)]
    pub kind: Option<IssueKind>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IssueKind {
    Error,
    Warning,
    #[serde(other)]
    Unknown,
}

/// Lifecycle status of a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BuildStatus {
    None,
    InProgress,
    Completed,
    Cancelling,
    Postponed,
    NotStarted,
    #[serde(other)]
    Unknown,
}

impl BuildStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::InProgress => "inProgress",
            Self::Completed => "completed",
            Self::Cancelling => "cancelling",
            Self::Postponed => "postponed",
            Self::NotStarted => "notStarted",
            Self::Unknown => "unknown",
        }
    }
}

/// Final result of a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BuildResult {
    None,
    Succeeded,
    PartiallySucceeded,
    Failed,
    Canceled,
    #[serde(other)]
    Unknown,
}

impl BuildResult {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Succeeded => "succeeded",
            Self::PartiallySucceeded => "partiallySucceeded",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
            Self::Unknown => "unknown",
        }
    }
}

/// Final result of a timeline record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskResult {
    Succeeded,
    SucceededWithIssues,
    Failed,
    Canceled,
    Skipped,
    Abandoned,
    #[serde(other)]
    Unknown,
}

/// Kind of work a timeline record represents.
///
/// The platform nests records as Stage > Phase > Job > Task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum RecordType {
    Stage,
    Phase,
    Job,
    Task,
    Checkpoint,
    #[serde(other)]
    #[default]
    Other,
}
