//! Chartwright: a chart translation and normalization pipeline.
//!
//! Three request shapes converge on one renderer-ready form:
//!
//! - legacy query-parameter maps, decoded by `chartwright-protocol`
//!   (series payloads by `chartwright-codec`),
//! - free-form spec text, evaluated under budget by
//!   `chartwright-sandbox`,
//! - structured JSON specs from trusted callers.
//!
//! All three are normalized by `chartwright-defaults` and rendered
//! through the backend pool in `chartwright-render-core`.

pub mod error;
pub mod pipeline;

pub use error::PipelineError;
pub use pipeline::{ChartRequest, TextEncoding, prepare, render_chart, DEFAULT_BACKGROUND};

pub use chartwright_defaults::{NormalizeContext, NormalizeError, normalize};
pub use chartwright_protocol::{DecodeError, DecodedChart, decode};
pub use chartwright_render_core::{
    BackendKey, BackendPool, NormalizedChart, RenderBackend, RenderError,
};
pub use chartwright_sandbox::{Sandbox, SandboxResult};
pub use chartwright_types::ChartSpec;
