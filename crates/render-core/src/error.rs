use crate::MAX_DIMENSION;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("chart dimensions {width}x{height} exceed the {MAX_DIMENSION}px limit")]
    DimensionsExceeded { width: u32, height: u32 },

    #[error("render backend failure: {0}")]
    Backend(String),
}
