pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod providers;
pub mod summary;

pub use auth::Token;
pub use error::{AdoLensError, Result};
pub use providers::azure::AzurePipeline;
pub use summary::{BuildComparison, BuildSummary, FailedJobs, FailedTaskLog};
