use chartwright_defaults::NormalizeError;
use chartwright_protocol::DecodeError;
use chartwright_render_core::RenderError;
use thiserror::Error;

/// Everything that can go wrong between a raw request and an image
/// buffer. All variants are recoverable per-request failures; nothing
/// here is retried.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Render(#[from] RenderError),

    /// The sandbox refused the input before evaluating it.
    #[error("spec rejected: {0}")]
    SandboxRejected(String),

    /// The sandbox started evaluating but the spec failed.
    #[error("spec evaluation failed: {0}")]
    SandboxRuntime(String),

    #[error("request body is not valid {encoding}: {message}")]
    BadEncoding {
        encoding: &'static str,
        message: String,
    },

    #[error("request body is not a chart spec: {0}")]
    BadSpec(String),
}
