use thiserror::Error;

/// Normalization failures. The only hard failure is a validation error on
/// a synthetic chart type whose data shape cannot be repaired.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("invalid chart: {0}")]
    Validation(String),
}
