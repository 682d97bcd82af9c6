//! The individual normalization passes, in pipeline order.

use crate::error::NormalizeError;
use crate::{NormalizeContext, PassState};
use chartwright_types::{
    ChartSpec, Datalabels, DatalabelDisplay, DatalabelFormatter, Dataset, Elements, Fill, Legend,
    LineElement, PluginRef, PointElement, is_boxplot_type, is_round_type, uses_cartesian_scales,
    wheel_color,
};
use serde_json::json;

pub type Pass = fn(ChartSpec, &NormalizeContext, &mut PassState) -> Result<ChartSpec, NormalizeError>;

/// The pipeline. Order matters: synthetic types must be rewritten before
/// any pass that dispatches on the chart type, and plugin composition
/// runs last so it sees the final type and option set.
pub const PASSES: &[(&str, Pass)] = &[
    ("alias-chart-types", alias_chart_types),
    ("synthesize-sparkline", synthesize_sparkline),
    ("synthesize-progress-bar", synthesize_progress_bar),
    ("device-pixel-ratio", device_pixel_ratio),
    ("begin-at-zero", begin_at_zero),
    ("assign-wheel-colors", assign_wheel_colors),
    ("line-tension", line_tension),
    ("default-datalabels", default_datalabels),
    ("outlabels", outlabels),
    ("compose-plugins", compose_plugins),
];

fn alias_chart_types(
    mut spec: ChartSpec,
    _ctx: &NormalizeContext,
    _state: &mut PassState,
) -> Result<ChartSpec, NormalizeError> {
    if spec.type_str() == "donut" {
        spec.chart_type = Some("doughnut".to_string());
    }
    Ok(spec)
}

/// Rewrites `sparkline` into an undecorated line chart: no axes, no
/// legend, a thin black line, and a y-range padded 5% outward so the
/// line never touches the canvas edge.
fn synthesize_sparkline(
    mut spec: ChartSpec,
    _ctx: &NormalizeContext,
    _state: &mut PassState,
) -> Result<ChartSpec, NormalizeError> {
    if spec.type_str() != "sparkline" {
        return Ok(spec);
    }
    if spec.data.datasets.len() != 1 {
        return Err(NormalizeError::Validation(format!(
            "sparkline charts take exactly one dataset, got {}",
            spec.data.datasets.len()
        )));
    }

    spec.chart_type = Some("line".to_string());

    let values: Vec<f64> = spec.data.datasets[0]
        .data
        .iter()
        .filter_map(|p| p.magnitude())
        .collect();
    let range = values
        .iter()
        .copied()
        .fold(None::<(f64, f64)>, |acc, v| match acc {
            Some((min, max)) => Some((min.min(v), max.max(v))),
            None => Some((v, v)),
        });

    if spec.data.labels.is_none() {
        let len = spec.data.datasets[0].data.len();
        spec.data.labels = Some((0..len).map(|i| json!(i)).collect());
    }
    {
        let dataset = &mut spec.data.datasets[0];
        dataset.fill.get_or_insert(false);
        dataset.point_radius.get_or_insert(0.0);
    }

    let options = &mut spec.options;
    if options.legend.is_none() {
        options.legend = Some(Legend::default());
    }

    let elements = options.elements.get_or_insert_with(Elements::default);
    let line = elements.line.get_or_insert_with(LineElement::default);
    line.border_color.get_or_insert_with(|| "#000".to_string());
    line.border_width.get_or_insert(1.0);
    let point = elements.point.get_or_insert_with(PointElement::default);
    point.radius.get_or_insert(0.0);

    let scales = options.scales_mut();
    scales.x_axis_mut().display.get_or_insert(false);
    let y_axis = scales.y_axis_mut();
    y_axis.display.get_or_insert(false);
    if let Some((min, max)) = range {
        let ticks = y_axis.ticks_mut();
        ticks.min.get_or_insert(min - min.abs() * 0.05);
        ticks.max.get_or_insert(max + max.abs() * 0.05);
    }

    Ok(spec)
}

/// Rewrites `progressBar` into a stacked horizontal bar: the first
/// dataset is the filled portion, the second the track behind it. With a
/// single dataset the track is synthesized at 100 and values read as
/// percentages. Injected styling always yields to caller options.
fn synthesize_progress_bar(
    mut spec: ChartSpec,
    _ctx: &NormalizeContext,
    _state: &mut PassState,
) -> Result<ChartSpec, NormalizeError> {
    if spec.type_str() != "progressBar" {
        return Ok(spec);
    }

    let percentage = match spec.data.datasets.len() {
        1 => true,
        2 => {
            let (filled, track) = (&spec.data.datasets[0], &spec.data.datasets[1]);
            if filled.data.len() != track.data.len() {
                return Err(NormalizeError::Validation(
                    "progressBar datasets must have equal lengths".to_string(),
                ));
            }
            false
        }
        n => {
            return Err(NormalizeError::Validation(format!(
                "progressBar charts take one or two datasets, got {n}"
            )));
        }
    };

    spec.chart_type = Some("horizontalBar".to_string());

    let len = spec.data.datasets[0].data.len();
    if percentage {
        spec.data
            .datasets
            .push(Dataset::from_values(vec![Some(100.0); len]));
    }
    {
        let track = &mut spec.data.datasets[1];
        track
            .background_color
            .get_or_insert_with(|| Fill::Single("#fff".to_string()));
        track
            .border_color
            .get_or_insert_with(|| Fill::Single("#4e78a7".to_string()));
        track.border_width.get_or_insert(1.0);
    }
    if spec.data.labels.is_none() {
        spec.data.labels = Some((0..len).map(|i| json!(i)).collect());
    }

    let options = &mut spec.options;
    if options.legend.is_none() {
        options.legend = Some(Legend::default());
    }

    let scales = options.scales_mut();
    {
        let x_axis = scales.x_axis_mut();
        x_axis.stacked.get_or_insert(true);
        x_axis.grid_lines_mut().display.get_or_insert(false);
        let ticks = x_axis.ticks_mut();
        ticks.display.get_or_insert(false);
        ticks.begin_at_zero.get_or_insert(true);
    }
    {
        let y_axis = scales.y_axis_mut();
        y_axis.stacked.get_or_insert(true);
        let grid = y_axis.grid_lines_mut();
        grid.display.get_or_insert(false);
        grid.mirror.get_or_insert(true);
        y_axis.ticks_mut().display.get_or_insert(false);
    }

    let plugins = options.plugins_mut();
    if plugins.datalabels.is_none() {
        plugins.datalabels = Some(Datalabels {
            display: Some(DatalabelDisplay::DatasetIndex { dataset_index: 0 }),
            color: Some("#fff".to_string()),
            formatter: Some(DatalabelFormatter::ProgressValue { percentage }),
            ..Datalabels::default()
        });
    }

    Ok(spec)
}

fn device_pixel_ratio(
    mut spec: ChartSpec,
    _ctx: &NormalizeContext,
    _state: &mut PassState,
) -> Result<ChartSpec, NormalizeError> {
    spec.options.device_pixel_ratio.get_or_insert(2.0);
    Ok(spec)
}

/// Cartesian charts default the value axis to start at zero, but only
/// when the caller left the scales entirely unconfigured.
fn begin_at_zero(
    mut spec: ChartSpec,
    _ctx: &NormalizeContext,
    _state: &mut PassState,
) -> Result<ChartSpec, NormalizeError> {
    if uses_cartesian_scales(spec.type_str()) && spec.options.scales.is_none() {
        spec.options
            .scales_mut()
            .y_axis_mut()
            .ticks_mut()
            .begin_at_zero = Some(true);
    }
    Ok(spec)
}

/// Uncolored datasets get deterministic wheel colors: one color per
/// dataset for rectangular types, one per value for round types. A
/// colorschemes plugin configuration disables this entirely.
fn assign_wheel_colors(
    mut spec: ChartSpec,
    _ctx: &NormalizeContext,
    _state: &mut PassState,
) -> Result<ChartSpec, NormalizeError> {
    if spec.options.has_colorschemes() {
        return Ok(spec);
    }

    let round = is_round_type(spec.type_str());
    for (idx, dataset) in spec.data.datasets.iter_mut().enumerate() {
        if round {
            if dataset.background_color.is_none() {
                let colors = (0..dataset.data.len())
                    .map(|i| wheel_color(i).to_string())
                    .collect();
                dataset.background_color = Some(Fill::PerValue(colors));
            }
        } else {
            dataset
                .background_color
                .get_or_insert_with(|| Fill::Single(wheel_color(idx).to_string()));
            dataset
                .border_color
                .get_or_insert_with(|| Fill::Single(wheel_color(idx).to_string()));
        }
    }
    Ok(spec)
}

fn line_tension(
    mut spec: ChartSpec,
    _ctx: &NormalizeContext,
    _state: &mut PassState,
) -> Result<ChartSpec, NormalizeError> {
    if spec.type_str() == "line" {
        for dataset in &mut spec.data.datasets {
            dataset.line_tension.get_or_insert(0.0);
        }
    }
    Ok(spec)
}

/// Pie and doughnut charts show value labels by default; everything else
/// hides them. Only applies when the caller configured no datalabels.
fn default_datalabels(
    mut spec: ChartSpec,
    _ctx: &NormalizeContext,
    state: &mut PassState,
) -> Result<ChartSpec, NormalizeError> {
    let configured = spec
        .options
        .plugins
        .as_ref()
        .is_some_and(|p| p.datalabels.is_some());
    if configured {
        return Ok(spec);
    }

    let shown = matches!(spec.type_str(), "pie" | "doughnut");
    spec.options.plugins_mut().datalabels = Some(if shown {
        Datalabels::shown()
    } else {
        Datalabels::hidden()
    });
    state.datalabels_defaulted = true;
    Ok(spec)
}

/// Round and gauge charts: every dataset carries an explicit outlabels
/// configuration, and enabling outlabels anywhere suppresses the default
/// datalabels so the two label layers do not overlap.
fn outlabels(
    mut spec: ChartSpec,
    _ctx: &NormalizeContext,
    state: &mut PassState,
) -> Result<ChartSpec, NormalizeError> {
    let chart_type = spec.type_str().to_string();
    if !(is_round_type(&chart_type) || chart_type == "radialGauge") {
        return Ok(spec);
    }

    let global = spec
        .options
        .plugins
        .as_ref()
        .is_some_and(|p| p.outlabels.is_some());
    let user_enabled = global || spec.data.datasets.iter().any(|d| d.outlabels.is_some());

    // A global outlabels configuration applies to every dataset; injecting
    // a per-dataset `display: false` would override it.
    if !global {
        for dataset in &mut spec.data.datasets {
            if dataset.outlabels.is_none() {
                dataset.outlabels = Some(json!({ "display": false }));
            }
        }
    }

    if user_enabled && state.datalabels_defaulted {
        spec.options.plugins_mut().datalabels = Some(Datalabels::hidden());
    }
    Ok(spec)
}

/// Installs the plugin list. The background fill is always last so it
/// paints underneath everything the other plugins draw.
fn compose_plugins(
    mut spec: ChartSpec,
    ctx: &NormalizeContext,
    _state: &mut PassState,
) -> Result<ChartSpec, NormalizeError> {
    let chart_type = spec.type_str().to_string();

    if spec.plugins.is_empty() {
        spec.plugins.push(PluginRef::Datalabels);
        spec.plugins.push(PluginRef::Annotation);
        if chart_type == "radialGauge" {
            spec.plugins.push(PluginRef::RadialGauge);
        }
        if is_boxplot_type(&chart_type) {
            spec.plugins.push(PluginRef::BoxViolin);
        }
        if is_round_type(&chart_type) || chart_type == "radialGauge" {
            spec.plugins.push(PluginRef::Outlabels);
        }
        if matches!(chart_type.as_str(), "doughnut" | "outlabeledDoughnut") {
            spec.plugins.push(PluginRef::DoughnutLabel);
        }
        if spec.options.has_colorschemes() {
            spec.plugins.push(PluginRef::ColorSchemes);
        }
    }

    let has_background = spec
        .plugins
        .iter()
        .any(|p| matches!(p, PluginRef::Background { .. }));
    if !has_background {
        spec.plugins.push(PluginRef::Background {
            color: ctx.background_color.clone(),
        });
    }
    Ok(spec)
}
