use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Visual progress for a sequential run: one overall bar plus a spinner
/// for the task in flight.
pub struct ProgressMonitor {
    multi: MultiProgress,
    overall: ProgressBar,
    current: Option<ProgressBar>,
    enabled: bool,
}

impl ProgressMonitor {
    pub fn new(total_tasks: usize, enabled: bool) -> Self {
        let multi = MultiProgress::new();
        if !enabled {
            return Self {
                multi,
                overall: ProgressBar::hidden(),
                current: None,
                enabled: false,
            };
        }

        let overall = multi.add(ProgressBar::new(total_tasks as u64));
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} tasks ({percent}%) {msg}")
        {
            overall.set_style(style.progress_chars("█▓▒░  "));
        }
        overall.set_message("Starting...");

        Self {
            multi,
            overall,
            current: None,
            enabled: true,
        }
    }

    pub fn start_task(&mut self, task_id: &str, role: &str) {
        if !self.enabled {
            return;
        }

        let bar = self.multi.add(ProgressBar::new_spinner());
        if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner:.green} {msg}") {
            bar.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
        }
        bar.set_message(format!("{task_id} ({role})"));
        bar.enable_steady_tick(Duration::from_millis(100));
        self.overall.set_message(task_id.to_string());
        self.current = Some(bar);
    }

    pub fn complete_task(&mut self, task_id: &str, success: bool, duration_ms: u64) {
        if !self.enabled {
            return;
        }

        if let Some(bar) = self.current.take() {
            let icon = if success { "✅" } else { "❌" };
            bar.finish_with_message(format!("{icon} {task_id} ({duration_ms}ms)"));
        }
        if success {
            self.overall.inc(1);
        }
    }

    pub fn finish(&self, success: bool) {
        if !self.enabled {
            return;
        }

        let msg = if success {
            "✅ All tasks completed"
        } else {
            "❌ Run aborted"
        };
        self.overall.finish_with_message(msg);
    }
}

impl Drop for ProgressMonitor {
    fn drop(&mut self) {
        if let Some(bar) = self.current.take() {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_monitor_disabled() {
        let mut monitor = ProgressMonitor::new(3, false);
        monitor.start_task("research", "Researcher");
        monitor.complete_task("research", true, 100);
        monitor.finish(true);
    }

    #[test]
    fn test_progress_monitor_enabled() {
        let mut monitor = ProgressMonitor::new(2, true);
        monitor.start_task("research", "Researcher");
        monitor.complete_task("research", true, 100);
        monitor.start_task("write", "Writer");
        monitor.complete_task("write", false, 200);
        monitor.finish(false);
    }
}
