//! Legacy chart-protocol decoding.
//!
//! This crate reverse-engineers the dense query-parameter charting
//! protocol (`cht`, `chd`, `chxt`, ...) into a canonical [`ChartSpec`]
//! plus canvas geometry and background fill. Series payload decoding
//! lives in `chartwright-codec`; this crate owns everything else: type
//! codes, titles, legends, margins, colors, axes, gridlines, and markers.

pub mod axis_format;
pub mod decoder;
pub mod error;

pub use axis_format::{parse_axis_format, AxisFormatRule, TickVisibility};
pub use decoder::{decode, parse_background_color, parse_size, DecodedChart};
pub use error::DecodeError;
