use crate::config::ExecutorConfig;

/// Per-engine execution options.
#[derive(Debug, Clone, Default)]
pub struct ExecutionOpts {
    /// Show an indicatif progress bar while tasks run.
    pub progress_bar: bool,
}

impl From<&ExecutorConfig> for ExecutionOpts {
    fn from(cfg: &ExecutorConfig) -> Self {
        Self {
            progress_bar: cfg.progress_bar && cfg.stream_format != "jsonl",
        }
    }
}
