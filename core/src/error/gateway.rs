use thiserror::Error;

use super::code::ErrorCode;

/// Failures surfaced by the generation and search gateways.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Network failure, non-2xx status or per-call timeout.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Empty or non-text payload.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("call budget exhausted ({limit} calls)")]
    BudgetExhausted { limit: u32 },
}

impl GatewayError {
    /// Only transient transport failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ServiceUnavailable(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::ServiceUnavailable(_) => "ServiceUnavailable",
            Self::MalformedResponse(_) => "MalformedResponse",
            Self::BudgetExhausted { .. } => "BudgetExhausted",
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::ServiceUnavailable(_) => ErrorCode::ServiceUnavailable,
            Self::MalformedResponse(_) => ErrorCode::MalformedResponse,
            Self::BudgetExhausted { .. } => ErrorCode::BudgetExhausted,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unbound placeholder {{{name}}} in {location}")]
    UnboundPlaceholder { name: String, location: String },
}

impl TemplateError {
    pub fn error_code(&self) -> ErrorCode {
        ErrorCode::UnboundPlaceholder
    }
}
