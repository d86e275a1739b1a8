use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// An overview of the facts worth knowing about a build run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSummary {
    pub name: String,
    pub build_id: u32,
    pub result: String,
    pub status: String,
    pub url: String,
    pub branch: String,
    pub commit_id: String,
    pub triggered_by: String,
}

/// Log output and context for a single failed task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedTaskLog {
    /// Task name as shown in the timeline
    pub task: String,
    /// Name of the job the task ran under, if resolvable
    pub parent_job: Option<String>,
    /// Issue messages the platform attached to the task
    pub issues: Vec<String>,
    /// Full log lines for the task; empty when the task has no log
    pub lines: Vec<String>,
}

/// Failed jobs of a build, grouped by the stage they ran in.
///
/// Stage order follows the timeline; job names within a stage are
/// deduplicated and sorted. Equality between two values of this type is
/// what build comparison is computed from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedJobs {
    pub stages: IndexMap<String, Vec<String>>,
}

impl FailedJobs {
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Total number of failed jobs across all stages.
    pub fn job_count(&self) -> usize {
        self.stages.values().map(Vec::len).sum()
    }
}

/// Outcome of diffing the failure sets of two builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildComparison {
    /// The current build is clean while the previous one had failures
    BackToNormal,
    /// Both builds failed with the same failure set
    RepeatedFailure,
    /// The current build failed in a way the previous one did not
    NewFailure,
}

impl std::fmt::Display for BuildComparison {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            Self::BackToNormal => "back to normal",
            Self::RepeatedFailure => "repeated failure",
            Self::NewFailure => "new failure!",
        };
        f.write_str(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(stage: &str, jobs: &[&str]) -> FailedJobs {
        let mut stages = IndexMap::new();
        stages.insert(
            stage.to_string(),
            jobs.iter().map(ToString::to_string).collect(),
        );
        FailedJobs { stages }
    }

    #[test]
    fn test_failed_jobs_equality_ignores_nothing() {
        let a = failed("Build", &["compile", "lint"]);
        let b = failed("Build", &["compile", "lint"]);
        let c = failed("Build", &["compile"]);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_failed_jobs_counts() {
        let jobs = failed("Deploy", &["push-image", "rollout"]);
        assert!(!jobs.is_empty());
        assert_eq!(jobs.job_count(), 2);
        assert!(FailedJobs::default().is_empty());
    }

    #[test]
    fn test_comparison_feedback_messages() {
        assert_eq!(BuildComparison::BackToNormal.to_string(), "back to normal");
        assert_eq!(
            BuildComparison::RepeatedFailure.to_string(),
            "repeated failure"
        );
        assert_eq!(BuildComparison::NewFailure.to_string(), "new failure!");
    }
}
