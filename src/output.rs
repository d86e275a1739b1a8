mod exports;
mod progress;
mod styling;
mod summary;
mod tables;

pub use exports::{export_json, write_json};
pub use progress::PhaseProgress;
pub use styling::{dim, magenta_bold};
pub use summary::{print_comparison, print_failed_jobs, print_failed_tasks, print_summary};

/// Prints the `AdoLens` banner to stderr.
///
/// Displays the tool name, version, and description at the start of execution.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("🔍 AdoLens"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("Azure Pipelines Build Inspector")
    );
}
