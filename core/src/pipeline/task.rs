use std::sync::Arc;

use crate::error::TemplateError;
use crate::executor::types::TaskLike;

use super::agent::AgentDescriptor;
use super::context::Variables;
use super::template::PromptTemplate;

/// One pipeline step: what to produce, for which agent, after which tasks.
#[derive(Debug, Clone)]
pub struct TaskDescriptor {
    id: String,
    description: PromptTemplate,
    expected_output: String,
    agent: Arc<AgentDescriptor>,
    dependencies: Vec<String>,
}

/// Prompt fields after placeholder substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTask {
    pub description: String,
    pub goal: String,
    pub backstory: String,
}

impl TaskDescriptor {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<PromptTemplate>,
        expected_output: impl Into<String>,
        agent: Arc<AgentDescriptor>,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            expected_output: expected_output.into(),
            agent,
            dependencies: Vec::new(),
        }
    }

    pub fn depends_on(mut self, task_id: impl Into<String>) -> Self {
        self.dependencies.push(task_id.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> &PromptTemplate {
        &self.description
    }

    pub fn expected_output(&self) -> &str {
        &self.expected_output
    }

    pub fn agent(&self) -> &Arc<AgentDescriptor> {
        &self.agent
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Every template this task sends, with the location used in error messages.
    fn templates(&self) -> [(&PromptTemplate, String); 3] {
        [
            (&self.description, format!("task '{}' description", self.id)),
            (
                self.agent.goal(),
                format!("agent '{}' goal (task '{}')", self.agent.role(), self.id),
            ),
            (
                self.agent.backstory(),
                format!("agent '{}' backstory (task '{}')", self.agent.role(), self.id),
            ),
        ]
    }

    pub fn check_bindings(&self, vars: &Variables) -> Result<(), TemplateError> {
        for (template, location) in self.templates() {
            template.check(vars, &location)?;
        }
        Ok(())
    }

    pub fn render(&self, vars: &Variables) -> Result<RenderedTask, TemplateError> {
        let [description, goal, backstory] = self.templates();
        Ok(RenderedTask {
            description: description.0.render(vars, &description.1)?,
            goal: goal.0.render(vars, &goal.1)?,
            backstory: backstory.0.render(vars, &backstory.1)?,
        })
    }
}

impl TaskLike for TaskDescriptor {
    fn id(&self) -> &str {
        &self.id
    }

    fn dependencies(&self) -> &[String] {
        &self.dependencies
    }
}
