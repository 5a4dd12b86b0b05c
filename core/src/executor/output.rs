use super::traits::RunEvent;

/// Fallback reporting when no observer plugin is installed.
pub fn emit_event(event: &RunEvent) {
    match event {
        RunEvent::RunStart {
            run_id,
            pipeline,
            total_tasks,
        } => {
            tracing::info!(
                target: "dossier.executor",
                %run_id,
                pipeline = %pipeline,
                total_tasks,
                "run started"
            );
        }
        RunEvent::Plan { run_id, order } => {
            tracing::info!(
                target: "dossier.executor",
                %run_id,
                order = %order.join(" -> "),
                "execution plan"
            );
        }
        RunEvent::TaskStart {
            run_id,
            task_id,
            role,
            index,
        } => {
            tracing::info!(
                target: "dossier.executor",
                %run_id,
                task_id = %task_id,
                role = %role,
                index,
                "task started"
            );
        }
        RunEvent::TaskComplete { run_id, result } => {
            tracing::info!(
                target: "dossier.executor",
                %run_id,
                task_id = %result.task_id,
                duration_ms = result.duration_ms,
                attempts = result.attempts,
                output_chars = result.output.chars().count(),
                "task completed"
            );
        }
        RunEvent::TaskFailed {
            run_id,
            task_id,
            error,
        } => {
            tracing::error!(
                target: "dossier.executor",
                %run_id,
                task_id = %task_id,
                kind = error.kind(),
                error = %error,
                "task failed"
            );
        }
        RunEvent::RunEnd {
            run_id,
            summary,
            success,
        } => {
            tracing::info!(
                target: "dossier.executor",
                %run_id,
                success,
                completed = summary.completed,
                total = summary.total_tasks,
                duration_ms = summary.duration_ms,
                "run finished"
            );
        }
    }
}
