use serde::Deserialize;

use super::core::AdoClient;
use crate::error::{AdoLensError, Result};
use crate::providers::azure::types::{Build, Timeline};

impl AdoClient {
    /// Fetch a single build by id.
    pub async fn get_build(&self, build_id: u32) -> Result<Build> {
        let url = self.endpoint(&format!("builds/{build_id}"))?;
        self.get_json(url).await.map_err(|e| match e {
            AdoLensError::Api { status: 404, .. } => AdoLensError::BuildNotFound(build_id),
            other => other,
        })
    }

    /// Fetch the timeline of a build.
    pub async fn get_build_timeline(&self, build_id: u32) -> Result<Timeline> {
        let url = self.endpoint(&format!("builds/{build_id}/timeline"))?;
        self.get_json(url).await.map_err(|e| match e {
            AdoLensError::Api { status: 404, .. } => AdoLensError::TimelineNotFound(build_id),
            other => other,
        })
    }

    /// Fetch the full log of a timeline record as individual lines.
    pub async fn get_build_log_lines(&self, build_id: u32, log_id: u32) -> Result<Vec<String>> {
        let url = self.endpoint(&format!("builds/{build_id}/logs/{log_id}"))?;
        let response: LogLinesResponse = self.get_json(url).await?;
        Ok(response.value)
    }

    /// List builds of one definition, newest first.
    ///
    /// # Arguments
    ///
    /// * `definition_id` - Pipeline definition to list builds for
    /// * `branch` - Optional source branch filter (e.g., "refs/heads/main")
    pub async fn get_builds(&self, definition_id: u32, branch: Option<&str>) -> Result<Vec<Build>> {
        let mut url = self.endpoint("builds")?;
        url.query_pairs_mut()
            .append_pair("definitions", &definition_id.to_string())
            .append_pair("queryOrder", "startTimeDescending");

        if let Some(branch) = branch {
            url.query_pairs_mut().append_pair("branchName", branch);
        }

        let response: BuildsResponse = self.get_json(url).await?;
        Ok(response.value)
    }
}

/// Response envelope for build list requests.
#[derive(Deserialize)]
struct BuildsResponse {
    value: Vec<Build>,
}

/// Response envelope for log line requests.
#[derive(Deserialize)]
struct LogLinesResponse {
    value: Vec<String>,
}
