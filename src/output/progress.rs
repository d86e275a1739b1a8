use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::styling::{bright, bright_green, bright_yellow};

/// Progress tracking for the timeline-then-logs fetch
pub struct PhaseProgress {
    pb: ProgressBar,
}

impl PhaseProgress {
    pub fn start_timeline_phase(build_id: u32) -> Self {
        eprintln!("{}  {}", bright("⚙️"), bright("Phases").underlined());
        let pb = create_spinner(
            bright_yellow(format!("Phase 1/2: Fetching timeline for build {build_id}")).to_string(),
        );
        Self { pb }
    }

    pub fn finish_timeline_start_logs(self, failed_count: usize) -> Self {
        self.pb.finish_with_message(
            bright_green(format!(
                "Phase 1/2: Timeline fetched, {failed_count} failed tasks ✓"
            ))
            .to_string(),
        );
        let pb = create_spinner(bright_yellow("Phase 2/2: Fetching failed task logs").to_string());
        Self { pb }
    }

    pub fn finish_logs(self) {
        self.pb.finish_with_message(
            bright_green("Phase 2/2: Failed task logs fetched ✓").to_string(),
        );
        eprintln!();
    }
}

fn create_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {msg} {spinner}")
            .unwrap(),
    );
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
