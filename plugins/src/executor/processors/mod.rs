pub mod prompt;
pub mod research;

pub use prompt::PromptEnhancerPlugin;
pub use research::ResearchProcessorPlugin;
