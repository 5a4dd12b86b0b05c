use dossier_core::executor::traits::{RunEvent, RunObserverPlugin};

pub struct TextObserverPlugin {
    ascii_only: bool,
}

impl TextObserverPlugin {
    pub fn new(ascii_only: bool) -> Self {
        Self { ascii_only }
    }

    fn format_event(&self, event: &RunEvent) -> String {
        match event {
            RunEvent::RunStart {
                run_id,
                pipeline,
                total_tasks,
            } => format!(
                "RUN START {} (pipeline {}, tasks: {})",
                run_id, pipeline, total_tasks
            ),
            RunEvent::Plan { run_id, order } => {
                let mut out = format!("PLAN {}:", run_id);
                for (idx, task_id) in order.iter().enumerate() {
                    out.push_str(&format!("\n  {}. {}", idx + 1, task_id));
                }
                out
            }
            RunEvent::TaskStart {
                run_id,
                task_id,
                role,
                index,
            } => format!(
                "TASK START {} (#{} {}, agent {})",
                run_id,
                index + 1,
                task_id,
                role
            ),
            RunEvent::TaskComplete { run_id, result } => {
                let status = if self.ascii_only { "OK" } else { "SUCCESS" };
                format!(
                    "TASK END {} (task {}, status {}, {} chars, duration {}ms, attempts {})",
                    run_id,
                    result.task_id,
                    status,
                    result.output.chars().count(),
                    result.duration_ms,
                    result.attempts
                )
            }
            RunEvent::TaskFailed {
                run_id,
                task_id,
                error,
            } => {
                let status = if self.ascii_only { "FAIL" } else { "FAILED" };
                format!(
                    "TASK END {} (task {}, status {}, kind {}): {}",
                    run_id,
                    task_id,
                    status,
                    error.kind(),
                    error
                )
            }
            RunEvent::RunEnd {
                run_id,
                summary,
                success,
            } => format!(
                "RUN END {} ({}, completed {}/{}, failed {}, duration {}ms)",
                run_id,
                if *success { "success" } else { "aborted" },
                summary.completed,
                summary.total_tasks,
                summary.failed,
                summary.duration_ms
            ),
        }
    }
}

impl RunObserverPlugin for TextObserverPlugin {
    fn name(&self) -> &str {
        "text-observer"
    }

    fn format(&self) -> &str {
        "text"
    }

    fn observe(&self, event: &RunEvent) {
        println!("{}", self.format_event(event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_core::error::{GatewayError, TaskError};
    use dossier_core::executor::TaskResult;

    #[test]
    fn test_text_observer_task_complete() {
        let observer = TextObserverPlugin::new(true);
        let event = RunEvent::TaskComplete {
            run_id: "run".to_string(),
            result: TaskResult {
                task_id: "research".to_string(),
                output: "four".to_string(),
                duration_ms: 5,
                attempts: 2,
            },
        };

        let line = observer.format_event(&event);
        assert!(line.contains("TASK END"));
        assert!(line.contains("status OK"));
        assert!(line.contains("attempts 2"));
    }

    #[test]
    fn test_text_observer_task_failed_names_kind() {
        let observer = TextObserverPlugin::new(false);
        let event = RunEvent::TaskFailed {
            run_id: "run".to_string(),
            task_id: "analysis".to_string(),
            error: TaskError::Gateway(GatewayError::BudgetExhausted { limit: 3 }),
        };

        let line = observer.format_event(&event);
        assert!(line.contains("FAILED"));
        assert!(line.contains("kind BudgetExhausted"));
    }
}
