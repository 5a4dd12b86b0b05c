//! Choke points between the engine and external services.

mod budget;
mod generation;
mod prompt;
mod search;

pub use budget::{CallBudget, Throttle};
pub use generation::{GenerationGateway, GenerationService, Invocation};
pub use prompt::PromptContext;
pub use search::{SearchGateway, SearchHit, SearchService};
