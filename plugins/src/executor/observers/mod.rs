pub mod jsonl;
pub mod text;

pub use jsonl::JsonlObserverPlugin;
pub use text::TextObserverPlugin;
