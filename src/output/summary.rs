use std::fmt::Write;

use comfy_table::Cell;

use crate::providers::azure::types::TimelineRecord;
use crate::summary::{BuildComparison, BuildSummary, FailedJobs};

use super::styling::{bright, bright_green, bright_red, bright_yellow, cyan, dim};
use super::tables::{create_table, header_cells, issue_count_cell};

/// Prints a human-readable overview of a build to stdout.
pub fn print_summary(summary: &BuildSummary) {
    println!("{}", render_summary(summary));
}

/// Prints the failed tasks of a timeline as a table.
pub fn print_failed_tasks(tasks: &[&TimelineRecord]) {
    println!("{}", render_failed_tasks(tasks));
}

/// Prints failed jobs grouped by stage as a table.
pub fn print_failed_jobs(failed: &FailedJobs) {
    println!("{}", render_failed_jobs(failed));
}

/// Prints the verdict of a build comparison.
pub fn print_comparison(prev_build: Option<u32>, verdict: Option<BuildComparison>) {
    println!("{}", render_comparison(prev_build, verdict));
}

fn add_section_header(output: &mut String, emoji: &str, title: &str) {
    let _ = writeln!(output, "{} {}", bright(emoji), bright(title).underlined());
}

fn result_display(result: &str) -> console::StyledObject<String> {
    match result {
        "succeeded" => bright_green(result),
        "failed" => bright_red(result),
        _ => bright_yellow(result),
    }
}

fn render_summary(summary: &BuildSummary) -> String {
    let mut output = String::new();

    add_section_header(&mut output, "📊", "Build Overview");

    output.push_str(&format!(
        "  {} {}\n  {} {}\n  {} {}\n  {} {}\n  {} {}\n  {} {}\n  {} {}\n  {} {}\n",
        dim("Pipeline:"),
        cyan(&summary.name),
        dim("Build id:"),
        bright_yellow(summary.build_id),
        dim("Result:"),
        result_display(&summary.result),
        dim("Status:"),
        bright(&summary.status),
        dim("Branch:"),
        cyan(&summary.branch),
        dim("Commit:"),
        dim(&summary.commit_id),
        dim("Triggered by:"),
        bright(&summary.triggered_by),
        dim("Url:"),
        dim(&summary.url)
    ));

    output
}

fn render_failed_tasks(tasks: &[&TimelineRecord]) -> String {
    let mut output = String::new();

    add_section_header(&mut output, "❌", "Failed Tasks");

    if tasks.is_empty() {
        output.push_str(&format!("{}\n", bright_green("No failed tasks found.")));
        return output;
    }

    let mut table = create_table();
    table.set_header(header_cells(&["#", "Task", "Issues", "First Error", "Agent"]));

    for (idx, task) in tasks.iter().enumerate() {
        let first_issue = task
            .issues
            .iter()
            .find_map(|issue| issue.message.as_deref())
            .unwrap_or("N/A");

        table.add_row(vec![
            Cell::new(idx + 1),
            Cell::new(task.name.as_deref().unwrap_or(&task.id)),
            issue_count_cell(task.issues.len()),
            Cell::new(first_issue),
            Cell::new(task.worker_name.as_deref().unwrap_or("N/A")),
        ]);
    }

    output.push_str(&format!("{table}\n"));
    output
}

fn render_failed_jobs(failed: &FailedJobs) -> String {
    let mut output = String::new();

    add_section_header(&mut output, "💥", "Failed Jobs");

    if failed.is_empty() {
        output.push_str(&format!("{}\n", bright_green("No failed jobs found.")));
        return output;
    }

    let mut table = create_table();
    table.set_header(header_cells(&["Stage", "Failed Jobs"]));

    for (stage, jobs) in &failed.stages {
        table.add_row(vec![Cell::new(stage), Cell::new(jobs.join("\n"))]);
    }

    output.push_str(&format!("{table}\n"));
    output
}

fn render_comparison(prev_build: Option<u32>, verdict: Option<BuildComparison>) -> String {
    let mut output = String::new();

    add_section_header(&mut output, "🔁", "Comparison");

    let against = match prev_build {
        Some(id) => format!("previous build {id}"),
        None => "no previous build".to_string(),
    };

    let line = match verdict {
        None => bright_green("no failures in either build".to_string()),
        Some(BuildComparison::BackToNormal) => bright_green(BuildComparison::BackToNormal),
        Some(BuildComparison::RepeatedFailure) => bright_yellow(BuildComparison::RepeatedFailure),
        Some(BuildComparison::NewFailure) => bright_red(BuildComparison::NewFailure),
    };

    output.push_str(&format!("  {} {}\n", dim(format!("Against {against}:")), line));
    output
}
