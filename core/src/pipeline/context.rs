use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::input::SourceDocument;

/// Named values bound into prompt templates. Read-only during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variables(BTreeMap<String, String>);

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse `name=value` pairs as given on the command line.
    pub fn parse_pairs<I, S>(pairs: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vars = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (name, value) = pair
                .split_once('=')
                .ok_or_else(|| format!("expected name=value, got '{pair}'"))?;
            let name = name.trim();
            if name.is_empty() {
                return Err(format!("empty variable name in '{pair}'"));
            }
            vars.insert(name, value.trim());
        }
        Ok(vars)
    }
}

impl FromIterator<(String, String)> for Variables {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptEntry {
    pub task_id: String,
    pub output: String,
}

/// Append-only log of the outputs produced so far in one run.
#[derive(Debug, Clone, Default)]
pub struct TranscriptLog {
    entries: Vec<TranscriptEntry>,
}

impl TranscriptLog {
    pub(crate) fn append(&mut self, task_id: &str, output: &str) {
        self.entries.push(TranscriptEntry {
            task_id: task_id.to_string(),
            output: output.to_string(),
        });
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn output_of(&self, task_id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.task_id == task_id)
            .map(|e| e.output.as_str())
    }

    /// Prompt section carrying every prior output, oldest first. Empty when nothing ran yet.
    pub fn render(&self) -> String {
        if self.entries.is_empty() {
            return String::new();
        }

        let mut out = String::from("=== Prior Task Outputs ===\n\n");
        for entry in &self.entries {
            out.push_str(&format!("# Task: {}\nOutput:\n{}\n\n", entry.task_id, entry.output));
        }
        out.push_str("=== End Prior Task Outputs ===");
        out
    }
}

/// State threaded through one pipeline run.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    run_id: String,
    variables: Variables,
    source_document: Option<SourceDocument>,
    transcript: TranscriptLog,
}

impl ExecutionContext {
    pub fn new(variables: Variables) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            variables,
            source_document: None,
            transcript: TranscriptLog::default(),
        }
    }

    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = run_id.into();
        self
    }

    pub fn with_source_document(mut self, document: SourceDocument) -> Self {
        self.source_document = Some(document);
        self
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn source_document(&self) -> Option<&SourceDocument> {
        self.source_document.as_ref()
    }

    pub fn transcript(&self) -> &TranscriptLog {
        &self.transcript
    }

    pub(crate) fn record(&mut self, task_id: &str, output: &str) {
        self.transcript.append(task_id, output);
    }
}
