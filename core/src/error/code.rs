/// Stable numeric error codes, shared by the JSONL observer and the CLI exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    Success = 0,
    GeneralError = 1,
    ParseError = 2,
    ValidationError = 3,
    TaskNotFound = 10,
    DependencyError = 11,
    CircularDependency = 12,
    UnboundPlaceholder = 13,
    ServiceUnavailable = 20,
    MalformedResponse = 21,
    BudgetExhausted = 22,
    Timeout = 30,
    Cancelled = 31,
    ProcessorError = 50,
    RenderIoFailure = 60,
}

impl ErrorCode {
    pub fn as_u16(self) -> u16 {
        self as u16
    }
}
