use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use serde::Serialize;
use std::path::PathBuf;

use crate::auth::Token;
use crate::config::{Config, OutputFormat};
use crate::output;
use crate::providers::azure::AzurePipeline;

#[derive(Parser)]
#[command(name = "adolens")]
#[command(author, version, about = "Azure Pipelines Build Inspector", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Write JSON output to this file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,

    /// Emit JSON instead of human-readable output
    #[arg(short, long, global = true, default_value_t = false)]
    json: bool,

    /// Load settings from this config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct ConnectionArgs {
    /// Organization base URL (e.g., <https://dev.azure.com/myorg>)
    #[arg(short = 'u', long)]
    organization_url: Option<String>,

    /// Project the build belongs to
    #[arg(short = 'P', long)]
    project: Option<String>,

    /// Build to inspect
    #[arg(short, long)]
    build_id: Option<u32>,

    /// Personal access token
    #[arg(short, long, env = "AZURE_PIPELINES_TOKEN")]
    token: Option<String>,

    /// Save fetched data as JSON artifacts to this directory
    #[arg(long)]
    artifacts: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show an overview of the build
    Summary {
        #[command(flatten)]
        connection: ConnectionArgs,
    },
    /// Dump the raw build record as JSON
    Build {
        #[command(flatten)]
        connection: ConnectionArgs,
    },
    /// Dump the build timeline as JSON
    Timeline {
        #[command(flatten)]
        connection: ConnectionArgs,
    },
    /// List the failed tasks of the build
    FailedTasks {
        #[command(flatten)]
        connection: ConnectionArgs,
    },
    /// Fetch full logs for every failed task
    FailedLogs {
        #[command(flatten)]
        connection: ConnectionArgs,
    },
    /// List failed jobs grouped by stage
    FailedJobs {
        #[command(flatten)]
        connection: ConnectionArgs,
    },
    /// Find the build that ran before this one on the same branch
    PreviousBuild {
        #[command(flatten)]
        connection: ConnectionArgs,
    },
    /// Compare this build's failures with a previous build
    Compare {
        #[command(flatten)]
        connection: ConnectionArgs,

        /// Previous build id; discovered automatically when omitted
        #[arg(long)]
        prev: Option<u32>,
    },
}

impl Cli {
    pub async fn execute(&self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;

        match &self.command {
            Commands::Summary { connection } => self.execute_summary(connection, &config).await,
            Commands::Build { connection } => self.execute_build(connection, &config).await,
            Commands::Timeline { connection } => self.execute_timeline(connection, &config).await,
            Commands::FailedTasks { connection } => {
                self.execute_failed_tasks(connection, &config).await
            }
            Commands::FailedLogs { connection } => {
                self.execute_failed_logs(connection, &config).await
            }
            Commands::FailedJobs { connection } => {
                self.execute_failed_jobs(connection, &config).await
            }
            Commands::PreviousBuild { connection } => {
                self.execute_previous_build(connection, &config).await
            }
            Commands::Compare { connection, prev } => {
                self.execute_compare(connection, &config, *prev).await
            }
        }
    }

    async fn connect(&self, connection: &ConnectionArgs, config: &Config) -> Result<AzurePipeline> {
        let organization_url = connection
            .organization_url
            .clone()
            .or_else(|| config.azure.organization_url.clone())
            .context("No organization URL provided (use --organization-url or the config file)")?;

        let project = connection
            .project
            .clone()
            .or_else(|| config.azure.project.clone())
            .context("No project provided (use --project or the config file)")?;

        let build_id = connection
            .build_id
            .or(config.azure.build_id)
            .context("No build id provided (use --build-id or the config file)")?;

        let token = connection
            .token
            .clone()
            .or_else(|| config.azure.token.clone())
            .map(Token::from);

        info!("Inspecting build {build_id} of project {project}");
        let pipeline = AzurePipeline::connect(&organization_url, &project, build_id, token).await?;

        let artifacts_dir = connection
            .artifacts
            .clone()
            .or_else(|| config.artifacts.save.then(|| config.artifacts.dir.clone()));

        Ok(match artifacts_dir {
            Some(dir) => pipeline.with_artifacts(dir),
            None => pipeline,
        })
    }

    fn wants_json(&self, config: &Config) -> bool {
        self.json || self.output.is_some() || config.output.format == OutputFormat::Json
    }

    fn emit_json<T: Serialize>(&self, value: &T, config: &Config) -> Result<()> {
        let pretty = self.pretty || config.output.pretty;

        if let Some(path) = &self.output {
            let mut file = std::fs::File::create(path)?;
            output::export_json(value, pretty, &mut file)?;
            info!("Output written to: {}", path.display());
        } else {
            let mut stdout = std::io::stdout().lock();
            output::export_json(value, pretty, &mut stdout)?;
        }

        Ok(())
    }

    async fn execute_summary(&self, connection: &ConnectionArgs, config: &Config) -> Result<()> {
        let pipeline = self.connect(connection, config).await?;
        let summary = pipeline.summary();

        if self.wants_json(config) {
            self.emit_json(&summary, config)?;
        } else {
            output::print_summary(&summary);
        }

        Ok(())
    }

    async fn execute_build(&self, connection: &ConnectionArgs, config: &Config) -> Result<()> {
        let pipeline = self.connect(connection, config).await?;

        self.emit_json(pipeline.build(), config)
    }

    async fn execute_timeline(&self, connection: &ConnectionArgs, config: &Config) -> Result<()> {
        let pipeline = self.connect(connection, config).await?;
        let timeline = pipeline.timeline(None).await?;

        self.emit_json(&timeline, config)
    }

    async fn execute_failed_tasks(
        &self,
        connection: &ConnectionArgs,
        config: &Config,
    ) -> Result<()> {
        let pipeline = self.connect(connection, config).await?;
        let timeline = pipeline.timeline(None).await?;
        let failed = pipeline.failed_tasks(&timeline);

        if self.wants_json(config) {
            self.emit_json(&failed, config)?;
        } else {
            output::print_failed_tasks(&failed);
        }

        Ok(())
    }

    async fn execute_failed_logs(
        &self,
        connection: &ConnectionArgs,
        config: &Config,
    ) -> Result<()> {
        let pipeline = self.connect(connection, config).await?;

        let progress = output::PhaseProgress::start_timeline_phase(pipeline.build_id);
        let timeline = pipeline.timeline(None).await?;

        let progress = progress.finish_timeline_start_logs(pipeline.failed_tasks(&timeline).len());
        let logs = pipeline.failed_task_logs(&timeline).await?;
        progress.finish_logs();

        self.emit_json(&logs, config)
    }

    async fn execute_failed_jobs(
        &self,
        connection: &ConnectionArgs,
        config: &Config,
    ) -> Result<()> {
        let pipeline = self.connect(connection, config).await?;
        let failed = pipeline.failed_jobs(None).await?;

        if self.wants_json(config) {
            self.emit_json(&failed, config)?;
        } else {
            output::print_failed_jobs(&failed);
        }

        Ok(())
    }

    async fn execute_previous_build(
        &self,
        connection: &ConnectionArgs,
        config: &Config,
    ) -> Result<()> {
        let pipeline = self.connect(connection, config).await?;
        let previous = pipeline.previous_build().await?;

        if self.wants_json(config) {
            self.emit_json(&previous, config)?;
        } else {
            match previous {
                Some(id) => println!("{id}"),
                None => println!("No previous build found."),
            }
        }

        Ok(())
    }

    async fn execute_compare(
        &self,
        connection: &ConnectionArgs,
        config: &Config,
        prev: Option<u32>,
    ) -> Result<()> {
        let pipeline = self.connect(connection, config).await?;

        let prev = match prev {
            Some(id) => Some(id),
            None => pipeline.previous_build().await?,
        };

        let verdict = pipeline.compare_builds(prev, None).await?;

        if self.wants_json(config) {
            self.emit_json(
                &serde_json::json!({ "previous_build": prev, "verdict": verdict }),
                config,
            )?;
        } else {
            output::print_comparison(prev, verdict);
        }

        Ok(())
    }
}
