use std::fmt::Write;
use std::sync::Arc;

use async_trait::async_trait;
use dossier_core::config::{SearchConfig, SearchFailureMode};
use dossier_core::error::{GatewayError, ProcessorError};
use dossier_core::executor::traits::{ProcessContext, PromptProcessorPlugin};
use dossier_core::gateway::{PromptContext, SearchGateway, SearchHit};
use dossier_core::pipeline::{Capability, TaskDescriptor};

const MAX_QUERY_CHARS: usize = 160;

/// Adds web research to the prompts of agents allowed to search.
///
/// Queries come from the rendered task description and agent goal. Agents
/// that may also scrape get the text of the top hits. A failed call either
/// aborts the task or leaves an explicit "no data found" note, depending on
/// `search.on_failure`.
pub struct ResearchProcessorPlugin {
    gateway: Arc<SearchGateway>,
    on_failure: SearchFailureMode,
    scrape_top: usize,
    max_queries: usize,
}

impl ResearchProcessorPlugin {
    pub fn new(gateway: Arc<SearchGateway>, cfg: &SearchConfig) -> Self {
        Self {
            gateway,
            on_failure: cfg.on_failure,
            scrape_top: cfg.scrape_top,
            max_queries: 2,
        }
    }

    pub fn with_max_queries(mut self, max_queries: usize) -> Self {
        self.max_queries = max_queries.max(1);
        self
    }

    fn queries(&self, prompt: &PromptContext) -> Vec<String> {
        let mut queries: Vec<String> = Vec::new();
        for source in [prompt.description.as_str(), prompt.goal.as_str()] {
            let Some(query) = to_query(source) else {
                continue;
            };
            if !queries.contains(&query) {
                queries.push(query);
            }
        }
        queries.truncate(self.max_queries);
        queries
    }

    /// `Ok(None)` when the failure was absorbed into a note.
    fn absorb<T>(
        &self,
        result: Result<T, GatewayError>,
        what: &str,
        notes: &mut Vec<String>,
    ) -> Result<Option<T>, ProcessorError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err) if self.on_failure == SearchFailureMode::Degrade => {
                tracing::warn!(target: "dossier.research", %what, error = %err, "research degraded");
                notes.push(format!("No data found for {what} ({})", err.kind()));
                Ok(None)
            }
            Err(err) => Err(ProcessorError::Gateway(err)),
        }
    }
}

#[async_trait]
impl PromptProcessorPlugin for ResearchProcessorPlugin {
    fn name(&self) -> &str {
        "research"
    }

    fn priority(&self) -> i32 {
        20
    }

    async fn process(
        &self,
        task: &TaskDescriptor,
        mut prompt: PromptContext,
        context: &ProcessContext<'_>,
    ) -> Result<PromptContext, ProcessorError> {
        let agent = task.agent();
        if !agent.can(Capability::WebSearch) {
            return Ok(prompt);
        }

        let mut notes = Vec::new();
        let mut to_scrape: Vec<String> = Vec::new();

        for query in self.queries(&prompt) {
            let what = format!("query \"{query}\"");
            let Some(hits) = self.absorb(self.gateway.search(&query).await, &what, &mut notes)?
            else {
                continue;
            };
            if hits.is_empty() {
                notes.push(format!("No data found for {what}"));
                continue;
            }
            for hit in &hits {
                if to_scrape.len() < self.scrape_top && !to_scrape.contains(&hit.link) {
                    to_scrape.push(hit.link.clone());
                }
            }
            notes.push(format_hits(&query, &hits));
        }

        if agent.can(Capability::WebScrape) {
            for url in to_scrape {
                let what = format!("page {url}");
                if let Some(text) =
                    self.absorb(self.gateway.scrape(&url).await, &what, &mut notes)?
                {
                    notes.push(format!("Page content from {url}:\n{text}"));
                }
            }
        }

        tracing::debug!(
            target: "dossier.research",
            run_id = %context.run_id,
            task_id = %task.id(),
            notes = notes.len(),
            "research notes added"
        );
        prompt.research_notes.extend(notes);
        Ok(prompt)
    }
}

/// First non-empty line, without list numbering or a trailing colon.
fn to_query(text: &str) -> Option<String> {
    let line = text.lines().map(str::trim).find(|l| !l.is_empty())?;
    let line = line.trim_end_matches([':', '.', ' ']);
    let query: String = line.chars().take(MAX_QUERY_CHARS).collect();
    (!query.is_empty()).then_some(query)
}

fn format_hits(query: &str, hits: &[SearchHit]) -> String {
    let mut out = format!("Search results for \"{query}\":");
    for (idx, hit) in hits.iter().enumerate() {
        let _ = write!(out, "\n{}. {} ({})", idx + 1, hit.title, hit.link);
        if !hit.snippet.is_empty() {
            let _ = write!(out, "\n   {}", hit.snippet);
        }
    }
    out
}
