pub mod code;
#[allow(clippy::module_inception)]
pub mod error;
pub mod executor;
pub mod gateway;
pub mod render;

pub use code::ErrorCode;
pub use error::{CliError, ReportError};
pub use executor::{ExecutorError, ProcessorError, TaskError};
pub use gateway::{GatewayError, TemplateError};
pub use render::RenderError;
