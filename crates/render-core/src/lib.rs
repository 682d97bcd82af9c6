//! Render backend abstraction.
//!
//! A [`RenderBackend`] turns a normalized chart into an image buffer.
//! Actual rasterization lives behind the trait; this crate owns the
//! shared contract (dimension limits, pixel-ratio semantics) and the
//! [`BackendPool`] that caches backends per canvas geometry.

mod error;
mod pool;

pub use error::RenderError;
pub use pool::{BackendFactory, BackendPool};

use chartwright_types::ChartSpec;

/// Hard ceiling on either canvas dimension, before pixel-ratio scaling.
pub const MAX_DIMENSION: u32 = 3000;

/// A chart after normalization, ready to draw. Raster output is
/// `width * device_pixel_ratio` by `height * device_pixel_ratio` pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedChart {
    pub spec: ChartSpec,
    pub width: u32,
    pub height: u32,
    pub device_pixel_ratio: f64,
}

impl NormalizedChart {
    pub fn new(spec: ChartSpec, width: u32, height: u32) -> Self {
        let device_pixel_ratio = spec.options.device_pixel_ratio.unwrap_or(1.0);
        Self {
            spec,
            width,
            height,
            device_pixel_ratio,
        }
    }

    fn check_dimensions(&self) -> Result<(), RenderError> {
        if self.width > MAX_DIMENSION || self.height > MAX_DIMENSION {
            return Err(RenderError::DimensionsExceeded {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// One rendering engine instance, typically pinned to a canvas geometry.
pub trait RenderBackend: Send + Sync {
    fn render(&self, chart: &NormalizedChart) -> Result<Vec<u8>, RenderError>;
}

/// What a pooled backend is keyed by: geometry plus the engine version,
/// so an engine upgrade never reuses a stale instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BackendKey {
    pub width: u32,
    pub height: u32,
    pub engine_version: String,
}

impl BackendKey {
    pub fn new(width: u32, height: u32, engine_version: impl Into<String>) -> Self {
        Self {
            width,
            height,
            engine_version: engine_version.into(),
        }
    }
}

/// Renders `chart` through a pooled backend for `engine_version`.
pub fn render_with_pool(
    pool: &BackendPool,
    chart: &NormalizedChart,
    engine_version: &str,
) -> Result<Vec<u8>, RenderError> {
    chart.check_dimensions()?;
    let key = BackendKey::new(chart.width, chart.height, engine_version);
    let backend = pool.checkout(&key)?;
    backend.render(chart)
}
