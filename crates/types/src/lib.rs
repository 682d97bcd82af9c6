//! The canonical chart specification model.
//!
//! A [`ChartSpec`] is the renderer-ready object graph produced by the legacy
//! protocol decoder or the spec sandbox and refined by the defaults engine.
//! Everything here is plain serde data: tick callbacks and datalabel
//! formatters that were closures in older chart stacks are modeled as
//! structured rules with an `apply`/`format` method, so they can be
//! serialized to a rendering backend and unit tested in isolation.

pub mod formatter;
pub mod kind;
pub mod options;
pub mod palette;
pub mod spec;
pub mod ticks;

pub use formatter::DatalabelFormatter;
pub use kind::{is_boxplot_type, is_round_type, uses_cartesian_scales};
pub use palette::{wheel_color, DEFAULT_COLOR_WHEEL};
pub use options::{
    Axis, ChartOptions, Datalabels, DatalabelDisplay, Elements, FontSpec, GridLines, Layout,
    Legend, LegendLabels, LineElement, Padding, PluginOptions, PointElement, Scales, Ticks, Title,
};
pub use spec::{ChartData, ChartSpec, DataPoint, Dataset, Fill, PluginRef};
pub use ticks::{TickCallback, TickFormat, TickLabels};
