use thiserror::Error;

/// Internal evaluation failures. These surface to callers as the
/// `RuntimeError` variant of [`crate::SandboxResult`], never as a panic.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SandboxError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("unknown identifier: {0}")]
    UnknownIdentifier(String),

    #[error("function not available in sandbox: {0}")]
    UnknownFunction(String),

    #[error("{function}: {message}")]
    BadArgument { function: String, message: String },

    #[error("type error: {0}")]
    Type(String),

    #[error("evaluation budget exceeded")]
    BudgetExceeded,

    #[error("result is not a chart: {0}")]
    NotAChart(String),
}
