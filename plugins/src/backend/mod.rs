mod http;
pub mod openai;
pub mod serper;

pub use openai::OpenAiGenerationService;
pub use serper::SerperSearchService;
