//! Dossier core: agent pipeline orchestration and Markdown-to-document rendering.

pub mod api;
pub mod artifacts;
pub mod config;
pub mod diagnostics;
pub mod document;
pub mod error;
pub mod executor;
pub mod gateway;
pub mod input;
pub mod markdown;
pub mod pipeline;
pub mod report;
pub mod testing;
