pub mod observers;
pub mod processors;
pub mod strategies;

pub use observers::{JsonlObserverPlugin, TextObserverPlugin};
pub use processors::{PromptEnhancerPlugin, ResearchProcessorPlugin};
pub use strategies::{ExponentialBackoffPlugin, LinearRetryPlugin};
