use chrono::Local;
use dossier_core::executor::traits::{RunEvent, RunObserverPlugin};
use serde_json::{json, Value};

pub struct JsonlObserverPlugin {
    pretty_print: bool,
}

impl JsonlObserverPlugin {
    pub fn new(pretty_print: bool) -> Self {
        Self { pretty_print }
    }

    fn event_to_json(&self, event: &RunEvent) -> Value {
        let ts = Local::now().to_rfc3339();
        let event_type = event.event_type();
        match event {
            RunEvent::RunStart {
                run_id,
                pipeline,
                total_tasks,
            } => json!({
                "v": 1,
                "event_type": event_type,
                "ts": ts,
                "run_id": run_id,
                "metadata": {
                    "pipeline": pipeline,
                    "total_tasks": total_tasks,
                }
            }),
            RunEvent::Plan { run_id, order } => json!({
                "v": 1,
                "event_type": event_type,
                "ts": ts,
                "run_id": run_id,
                "metadata": {
                    "order": order,
                    "total_tasks": order.len(),
                }
            }),
            RunEvent::TaskStart {
                run_id,
                task_id,
                role,
                index,
            } => json!({
                "v": 1,
                "event_type": event_type,
                "ts": ts,
                "run_id": run_id,
                "task_id": task_id,
                "metadata": {
                    "role": role,
                    "index": index,
                }
            }),
            RunEvent::TaskComplete { run_id, result } => json!({
                "v": 1,
                "event_type": event_type,
                "ts": ts,
                "run_id": run_id,
                "task_id": result.task_id,
                "metadata": {
                    "duration_ms": result.duration_ms,
                    "attempts": result.attempts,
                    "output_chars": result.output.chars().count(),
                    "success": true,
                }
            }),
            RunEvent::TaskFailed {
                run_id,
                task_id,
                error,
            } => json!({
                "v": 1,
                "event_type": event_type,
                "ts": ts,
                "run_id": run_id,
                "task_id": task_id,
                "code": error.error_code().as_u16(),
                "metadata": {
                    "kind": error.kind(),
                    "message": error.to_string(),
                    "success": false,
                }
            }),
            RunEvent::RunEnd {
                run_id,
                summary,
                success,
            } => json!({
                "v": 1,
                "event_type": event_type,
                "ts": ts,
                "run_id": run_id,
                "metadata": {
                    "success": success,
                    "total_tasks": summary.total_tasks,
                    "completed": summary.completed,
                    "failed": summary.failed,
                    "duration_ms": summary.duration_ms,
                }
            }),
        }
    }
}

impl RunObserverPlugin for JsonlObserverPlugin {
    fn name(&self) -> &str {
        "jsonl-observer"
    }

    fn format(&self) -> &str {
        "jsonl"
    }

    fn observe(&self, event: &RunEvent) {
        let value = self.event_to_json(event);
        if self.pretty_print {
            println!("{}", serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".into()));
        } else {
            println!("{}", serde_json::to_string(&value).unwrap_or_else(|_| "{}".into()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_core::error::{GatewayError, TaskError};
    use dossier_core::executor::RunSummary;

    #[test]
    fn test_jsonl_observer_event_type() {
        let observer = JsonlObserverPlugin::new(false);
        let event = RunEvent::RunStart {
            run_id: "run".to_string(),
            pipeline: "market".to_string(),
            total_tasks: 3,
        };

        let value = observer.event_to_json(&event);
        assert_eq!(value["event_type"], "run.start");
        assert_eq!(value["metadata"]["pipeline"], "market");
    }

    #[test]
    fn test_jsonl_observer_task_failed() {
        let observer = JsonlObserverPlugin::new(false);
        let event = RunEvent::TaskFailed {
            run_id: "run".to_string(),
            task_id: "analysis".to_string(),
            error: TaskError::Gateway(GatewayError::ServiceUnavailable("503".into())),
        };

        let value = observer.event_to_json(&event);
        assert_eq!(value["event_type"], "task.failed");
        assert_eq!(value["task_id"], "analysis");
        assert_eq!(value["code"], 20);
        assert_eq!(value["metadata"]["kind"], "ServiceUnavailable");
    }

    #[test]
    fn test_jsonl_observer_run_end() {
        let observer = JsonlObserverPlugin::new(false);
        let event = RunEvent::RunEnd {
            run_id: "run".to_string(),
            summary: RunSummary {
                total_tasks: 3,
                completed: 3,
                failed: 0,
                duration_ms: 100,
            },
            success: true,
        };

        let value = observer.event_to_json(&event);
        assert_eq!(value["metadata"]["total_tasks"], 3);
        assert_eq!(value["metadata"]["success"], true);
    }
}
