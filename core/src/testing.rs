//! In-memory collaborators for pipeline tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::gateway::{GenerationService, PromptContext};

type Reply = Result<String, GatewayError>;

/// Generation service that replays scripted replies per task id and
/// records every prompt it receives.
///
/// Tasks without a script (or whose script ran out) get `"output of <task_id>"`.
#[derive(Default)]
pub struct ScriptedGenerationService {
    scripts: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<PromptContext>>,
    delay: Option<Duration>,
}

impl ScriptedGenerationService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, task_id: &str, text: impl Into<String>) -> Self {
        self.push(task_id, Ok(text.into()));
        self
    }

    pub fn fail(self, task_id: &str, error: GatewayError) -> Self {
        self.push(task_id, Err(error));
        self
    }

    /// Every call sleeps this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<PromptContext> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Task ids in the order they were called.
    pub fn called_task_ids(&self) -> Vec<String> {
        lock(&self.calls).iter().map(|p| p.task_id.clone()).collect()
    }

    pub fn prompt_for(&self, task_id: &str) -> Option<PromptContext> {
        lock(&self.calls)
            .iter()
            .rev()
            .find(|p| p.task_id == task_id)
            .cloned()
    }

    fn push(&self, task_id: &str, reply: Reply) {
        lock(&self.scripts)
            .entry(task_id.to_string())
            .or_default()
            .push_back(reply);
    }
}

#[async_trait]
impl GenerationService for ScriptedGenerationService {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, prompt: &PromptContext) -> Result<String, GatewayError> {
        lock(&self.calls).push(prompt.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = lock(&self.scripts)
            .get_mut(&prompt.task_id)
            .and_then(VecDeque::pop_front);
        scripted.unwrap_or_else(|| Ok(format!("output of {}", prompt.task_id)))
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
