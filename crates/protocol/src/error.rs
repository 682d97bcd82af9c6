use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// The only hard failure in the legacy protocol: every other malformed
    /// parameter is skipped or defaulted.
    #[error("unsupported chart type code: {0:?}")]
    UnsupportedChartType(String),
}
