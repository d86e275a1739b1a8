use std::path::PathBuf;

use log::info;

use crate::auth::Token;
use crate::error::Result;
use crate::providers::azure::client::AdoClient;
use crate::providers::azure::types::Build;

/// Facade over a single Azure Pipelines build run.
///
/// Holds the connection parameters for its whole lifetime and forwards read
/// requests to the build API, post-processing the returned records into more
/// convenient shapes (failed tasks, joined logs, failure-set diffs).
pub struct AzurePipeline {
    pub client: AdoClient,
    pub organization_url: String,
    pub project: String,
    pub build_id: u32,
    pub(super) build: Build,
    pub(super) artifacts_dir: Option<PathBuf>,
}

impl AzurePipeline {
    /// Creates a facade for `build_id` and fetches the build record up front.
    ///
    /// # Arguments
    ///
    /// * `organization_url` - Organization base URL (e.g., <https://dev.azure.com/myorg>)
    /// * `project` - Project the build belongs to
    /// * `build_id` - Numeric build identifier
    /// * `token` - Optional personal access token
    ///
    /// # Errors
    ///
    /// Returns `BuildNotFound` when the platform has no such build, or a
    /// configuration error when the organization URL is invalid.
    pub async fn connect(
        organization_url: &str,
        project: &str,
        build_id: u32,
        token: Option<Token>,
    ) -> Result<Self> {
        let client = AdoClient::new(organization_url, project, token)?;

        info!("Fetching build {build_id} for project {project}");
        let build = client.get_build(build_id).await?;

        Ok(Self {
            client,
            organization_url: organization_url.trim_end_matches('/').to_owned(),
            project: project.to_owned(),
            build_id,
            build,
            artifacts_dir: None,
        })
    }

    /// Opts into JSON artifact dumps (timeline, failed tasks, task logs)
    /// under `dir`.
    #[must_use]
    pub fn with_artifacts(mut self, dir: PathBuf) -> Self {
        self.artifacts_dir = Some(dir);
        self
    }

    /// The build record fetched at connect time.
    pub fn build(&self) -> &Build {
        &self.build
    }
}
