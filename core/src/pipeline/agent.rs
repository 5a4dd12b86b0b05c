use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::template::PromptTemplate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Delegate,
    WebSearch,
    WebScrape,
}

/// Role-scoped prompt configuration. Built once, then shared through `Arc`.
#[derive(Debug, Clone)]
pub struct AgentDescriptor {
    role: String,
    goal: PromptTemplate,
    backstory: PromptTemplate,
    capabilities: BTreeSet<Capability>,
}

impl AgentDescriptor {
    pub fn new(
        role: impl Into<String>,
        goal: impl Into<PromptTemplate>,
        backstory: impl Into<PromptTemplate>,
    ) -> Self {
        Self {
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
            capabilities: BTreeSet::new(),
        }
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn goal(&self) -> &PromptTemplate {
        &self.goal
    }

    pub fn backstory(&self) -> &PromptTemplate {
        &self.backstory
    }

    pub fn capabilities(&self) -> &BTreeSet<Capability> {
        &self.capabilities
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities() {
        let agent = AgentDescriptor::new("Researcher", "Find data on {sector}", "Veteran analyst")
            .with_capability(Capability::WebSearch)
            .with_capability(Capability::WebSearch);
        assert!(agent.can(Capability::WebSearch));
        assert!(!agent.can(Capability::WebScrape));
        assert_eq!(agent.capabilities().len(), 1);
        assert!(agent.goal().slots().contains("sector"));
    }
}
