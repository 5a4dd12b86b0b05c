use async_trait::async_trait;
use dossier_core::error::ProcessorError;
use dossier_core::executor::traits::{ProcessContext, PromptProcessorPlugin};
use dossier_core::gateway::PromptContext;
use dossier_core::pipeline::TaskDescriptor;

/// Wraps every task description in a fixed prefix and suffix
/// (report language, house style).
pub struct PromptEnhancerPlugin {
    prefix: Option<String>,
    suffix: Option<String>,
}

impl PromptEnhancerPlugin {
    pub fn new() -> Self {
        Self {
            prefix: None,
            suffix: None,
        }
    }

    pub fn with_prefix_suffix(prefix: Option<String>, suffix: Option<String>) -> Self {
        Self { prefix, suffix }
    }

    /// "Write your answer in {language}."
    pub fn for_language(language: &str) -> Self {
        Self::with_prefix_suffix(None, Some(format!("Write your answer in {language}.")))
    }
}

impl Default for PromptEnhancerPlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PromptProcessorPlugin for PromptEnhancerPlugin {
    fn name(&self) -> &str {
        "prompt-enhancer"
    }

    fn priority(&self) -> i32 {
        10
    }

    async fn process(
        &self,
        _task: &TaskDescriptor,
        mut prompt: PromptContext,
        _context: &ProcessContext<'_>,
    ) -> Result<PromptContext, ProcessorError> {
        let mut enhanced = String::new();

        if let Some(prefix) = &self.prefix {
            enhanced.push_str(prefix);
            if !enhanced.ends_with('\n') {
                enhanced.push('\n');
            }
        }

        enhanced.push_str(&prompt.description);

        if let Some(suffix) = &self.suffix {
            if !enhanced.ends_with('\n') {
                enhanced.push('\n');
            }
            enhanced.push_str(suffix);
        }

        prompt.description = enhanced;
        Ok(prompt)
    }
}
