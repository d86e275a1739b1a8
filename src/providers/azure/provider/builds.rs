use futures::future::try_join_all;
use indexmap::IndexMap;
use log::{debug, info, warn};

use super::core::AzurePipeline;
use crate::error::Result;
use crate::output::write_json;
use crate::providers::azure::links;
use crate::providers::azure::types::{RecordType, TaskResult, Timeline, TimelineRecord};
use crate::summary::{BuildComparison, BuildSummary, FailedJobs, FailedTaskLog};

impl AzurePipeline {
    /// An overview of the useful facts about the current build.
    pub fn summary(&self) -> BuildSummary {
        let build = &self.build;

        BuildSummary {
            name: build.definition.name.clone(),
            build_id: build.id,
            result: build
                .result
                .map_or("none", |result| result.as_str())
                .to_string(),
            status: build
                .status
                .map_or("none", |status| status.as_str())
                .to_string(),
            url: self.build_url(),
            branch: build.source_branch.clone().unwrap_or_default(),
            commit_id: build.source_version.clone().unwrap_or_default(),
            triggered_by: build
                .requested_by
                .as_ref()
                .and_then(|identity| identity.display_name.clone())
                .unwrap_or_default(),
        }
    }

    /// Web URL of the current build, taken from the platform's `web` link
    /// when present and constructed otherwise.
    pub fn build_url(&self) -> String {
        self.build
            .links
            .as_ref()
            .and_then(|links| links.web.as_ref())
            .map(|web| web.href.clone())
            .unwrap_or_else(|| {
                links::build_web_url(&self.organization_url, &self.project, self.build.id)
            })
    }

    /// Fetches the timeline of a build.
    ///
    /// # Arguments
    ///
    /// * `build_id` - Build to fetch the timeline for; the current build when `None`
    pub async fn timeline(&self, build_id: Option<u32>) -> Result<Timeline> {
        let build_id = build_id.unwrap_or(self.build_id);

        info!("Getting timeline for build id = {build_id}");
        let timeline = self.client.get_build_timeline(build_id).await?;

        if let Some(dir) = &self.artifacts_dir {
            write_json(&dir.join("timeline.json"), &timeline)?;
        }

        Ok(timeline)
    }

    /// Failed tasks of a timeline, in timeline order.
    pub fn failed_tasks<'a>(&self, timeline: &'a Timeline) -> Vec<&'a TimelineRecord> {
        debug!("Collecting failed tasks from the timeline...");
        let failed = failed_records(timeline, RecordType::Task);

        if let Some(dir) = &self.artifacts_dir {
            if let Err(e) = write_json(&dir.join("failed_tasks.json"), &failed) {
                warn!("Could not save failed tasks artifact: {e}");
            }
        }

        debug!("Failed tasks have been extracted -> length={}", failed.len());
        failed
    }

    /// Full logs plus issue messages and parent-job names for every failed
    /// task in the timeline. Logs are fetched concurrently; a task without a
    /// log reference yields empty lines.
    pub async fn failed_task_logs(&self, timeline: &Timeline) -> Result<Vec<FailedTaskLog>> {
        debug!("Collecting logs for failed tasks...");
        let failed = self.failed_tasks(timeline);

        let fetches = failed
            .into_iter()
            .map(|task| self.fetch_task_log(timeline, task));
        let logs = try_join_all(fetches).await?;

        if let Some(dir) = &self.artifacts_dir {
            write_json(&dir.join("task_logs.json"), &logs)?;
        }

        debug!("Logs have been extracted -> length={}", logs.len());
        Ok(logs)
    }

    async fn fetch_task_log(
        &self,
        timeline: &Timeline,
        task: &TimelineRecord,
    ) -> Result<FailedTaskLog> {
        let lines = match &task.log {
            Some(log) => self.client.get_build_log_lines(self.build_id, log.id).await?,
            None => Vec::new(),
        };

        let parent_job = task
            .parent_id
            .as_deref()
            .and_then(|parent_id| {
                timeline
                    .records
                    .iter()
                    .find(|record| record.record_type == RecordType::Job && record.id == parent_id)
            })
            .and_then(|job| job.name.clone());

        let issues = task
            .issues
            .iter()
            .filter_map(|issue| issue.message.clone())
            .collect();

        Ok(FailedTaskLog {
            task: record_name(task),
            parent_job,
            issues,
            lines,
        })
    }

    /// Failed jobs of a build, grouped by the stage they ran in.
    ///
    /// # Arguments
    ///
    /// * `build_id` - Build to inspect; the current build when `None`
    pub async fn failed_jobs(&self, build_id: Option<u32>) -> Result<FailedJobs> {
        let timeline = self.timeline(build_id).await?;
        Ok(group_failed_jobs(&timeline))
    }

    /// The build that ran immediately before the current one on the same
    /// definition and source branch, or `None` when the current build is the
    /// oldest known one.
    pub async fn previous_build(&self) -> Result<Option<u32>> {
        let builds = self
            .client
            .get_builds(self.build.definition.id, self.build.source_branch.as_deref())
            .await?;

        let ids: Vec<u32> = builds.iter().map(|build| build.id).collect();
        info!("Builds on this definition and branch: {ids:?}");

        Ok(previous_of(&ids, self.build.id))
    }

    /// Diffs the failure sets of two builds.
    ///
    /// # Arguments
    ///
    /// * `prev_build` - Previous build id; treated as a clean build when `None`
    /// * `curr_build` - Current build id; the connected build when `None`
    ///
    /// # Returns
    ///
    /// `None` when both builds are clean, otherwise the comparison verdict.
    pub async fn compare_builds(
        &self,
        prev_build: Option<u32>,
        curr_build: Option<u32>,
    ) -> Result<Option<BuildComparison>> {
        let curr_build = curr_build.unwrap_or(self.build_id);
        info!("Comparing previous build {prev_build:?} to current build {curr_build}");

        let curr_failed = self.failed_jobs(Some(curr_build)).await?;

        // An unavailable previous build counts as a clean one
        let prev_failed = match prev_build {
            Some(id) => self.failed_jobs(Some(id)).await?,
            None => FailedJobs::default(),
        };

        info!(
            "Current failed jobs = {}, previous failed jobs = {}",
            curr_failed.job_count(),
            prev_failed.job_count()
        );

        Ok(compare_failure_sets(&prev_failed, &curr_failed))
    }
}

fn failed_records(timeline: &Timeline, kind: RecordType) -> Vec<&TimelineRecord> {
    timeline
        .records
        .iter()
        .filter(|record| record.record_type == kind && record.result == Some(TaskResult::Failed))
        .collect()
}

fn record_name(record: &TimelineRecord) -> String {
    record.name.clone().unwrap_or_else(|| record.id.clone())
}

/// Walks `parent_id` links up to the enclosing stage record.
///
/// Timelines are shallow (Stage > Phase > Job > Task); the hop bound guards
/// against malformed parent links forming a cycle.
fn stage_of<'a>(timeline: &'a Timeline, record: &'a TimelineRecord) -> Option<&'a str> {
    let mut current = record;
    for _ in 0..8 {
        if current.record_type == RecordType::Stage {
            return current.name.as_deref();
        }
        let parent_id = current.parent_id.as_deref()?;
        current = timeline.records.iter().find(|r| r.id == parent_id)?;
    }
    None
}

fn group_failed_jobs(timeline: &Timeline) -> FailedJobs {
    let mut stages: IndexMap<String, Vec<String>> = IndexMap::new();

    for record in failed_records(timeline, RecordType::Job) {
        let stage = stage_of(timeline, record).unwrap_or("unknown").to_string();
        let jobs = stages.entry(stage).or_default();
        let name = record_name(record);
        if !jobs.contains(&name) {
            jobs.push(name);
        }
    }

    for jobs in stages.values_mut() {
        jobs.sort();
    }

    FailedJobs { stages }
}

fn previous_of(ids: &[u32], current: u32) -> Option<u32> {
    let index = ids.iter().position(|&id| id == current)?;
    ids.get(index + 1).copied()
}

fn compare_failure_sets(prev: &FailedJobs, curr: &FailedJobs) -> Option<BuildComparison> {
    match (curr.is_empty(), prev.is_empty()) {
        (true, true) => None,
        (true, false) => Some(BuildComparison::BackToNormal),
        (false, true) => Some(BuildComparison::NewFailure),
        (false, false) if prev == curr => Some(BuildComparison::RepeatedFailure),
        (false, false) => Some(BuildComparison::NewFailure),
    }
}
