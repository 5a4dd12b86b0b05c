use serde::Serialize;

/// Everything a generation call may see for one task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PromptContext {
    pub task_id: String,
    pub role: String,
    pub goal: String,
    pub backstory: String,
    pub description: String,
    pub expected_output: String,

    /// Rendered transcript of prior tasks; empty for the first task.
    pub transcript: String,

    /// Source document text with page markers.
    pub source_document: Option<String>,

    /// Notes added by prompt processors (search results, scraped pages).
    pub research_notes: Vec<String>,
}

impl PromptContext {
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {}.\nYour goal: {}\n\nBackground: {}",
            self.role, self.goal, self.backstory
        )
    }

    pub fn user_prompt(&self) -> String {
        let mut sections: Vec<String> = Vec::new();

        if let Some(doc) = self.source_document.as_deref().filter(|d| !d.trim().is_empty()) {
            sections.push(format!("=== Source Document ===\n{doc}\n=== End Source Document ==="));
        }
        if !self.transcript.is_empty() {
            sections.push(self.transcript.clone());
        }
        if !self.research_notes.is_empty() {
            sections.push(format!(
                "=== Research Notes ===\n{}\n=== End Research Notes ===",
                self.research_notes.join("\n\n")
            ));
        }

        sections.push(format!("Task:\n{}", self.description));
        if !self.expected_output.trim().is_empty() {
            sections.push(format!("Expected output:\n{}", self.expected_output));
        }

        sections.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_prompt_sections_in_order() {
        let prompt = PromptContext {
            description: "Summarize".into(),
            expected_output: "One paragraph".into(),
            transcript: "=== Prior Task Outputs ===\nfacts".into(),
            source_document: Some("[Page 1]\nclause".into()),
            research_notes: vec!["hit one".into()],
            ..Default::default()
        };
        let text = prompt.user_prompt();

        let doc = text.find("[Page 1]").unwrap();
        let prior = text.find("facts").unwrap();
        let notes = text.find("hit one").unwrap();
        let task = text.find("Task:\nSummarize").unwrap();
        assert!(doc < prior && prior < notes && notes < task);
        assert!(text.ends_with("Expected output:\nOne paragraph"));
    }

    #[test]
    fn test_first_task_prompt_has_no_empty_sections() {
        let prompt = PromptContext {
            description: "Research".into(),
            ..Default::default()
        };
        assert_eq!(prompt.user_prompt(), "Task:\nResearch");
    }
}
