//! The legacy parameter set, decoded step by step.
//!
//! Each step reads data written by earlier ones, so the order in
//! [`decode`] is load-bearing: the chart type configures the base scales,
//! the data step fills datasets the legend and color steps index into,
//! and axis range rewriting must happen before explicit labels land.

use crate::axis_format::{parse_axis_format, TickVisibility};
use crate::error::DecodeError;
use chartwright_codec::{decode_series, SeriesMatrix};
use chartwright_types::{
    wheel_color, ChartSpec, Datalabels, DatalabelDisplay, DatalabelFormatter, DataPoint, Dataset,
    Fill, FontSpec, Legend, LegendLabels, Layout, Padding, TickCallback, TickLabels, Title,
};
use log::warn;
use serde_json::json;
use std::collections::BTreeMap;

pub const DEFAULT_WIDTH: u32 = 500;
pub const DEFAULT_HEIGHT: u32 = 300;
const MAX_DIMENSION: u32 = 2048;

/// The decoder's output: canvas geometry, background fill, and the raw
/// chart spec ready for normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedChart {
    pub width: u32,
    pub height: u32,
    pub background_color: String,
    pub spec: ChartSpec,
}

/// Decodes a full legacy parameter map.
///
/// Malformed values are skipped or defaulted throughout; the only hard
/// failure is a chart type code the protocol does not recognize.
pub fn decode(params: &BTreeMap<String, String>) -> Result<DecodedChart, DecodeError> {
    let get = |key: &str| params.get(key).map(String::as_str).filter(|v| !v.is_empty());

    let (width, height) = parse_size(get("chs"));
    let background_color = parse_background_color(get("chf"));

    let series = match get("chd") {
        Some(chd) => decode_series(chd, get("chds")),
        None => Vec::new(),
    };

    let mut spec = ChartSpec::default();
    set_chart_type(get("cht"), &mut spec);
    set_data(&series, &mut spec);
    set_title(get("chtt"), get("chts"), &mut spec);
    set_grid_lines(get("chg"), &mut spec);
    set_legend(get("chdl"), get("chdlp"), get("chdls"), &mut spec);
    set_margins(get("chma"), &mut spec);
    set_data_labels(get("chl"), &mut spec);
    set_colors(get("chco"), &mut spec);
    set_axis_ranges(get("chxt"), get("chxr"), &mut spec);
    set_axis_labels(get("chxt"), get("chxl"), get("chxs"), &mut spec);
    set_markers(get("chm"), &mut spec);
    set_line_thickness(get("chls"), &mut spec);

    if spec.chart_type.is_none() {
        return Err(DecodeError::UnsupportedChartType(
            get("cht").unwrap_or("").to_string(),
        ));
    }

    Ok(DecodedChart {
        width,
        height,
        background_color,
        spec,
    })
}

/// `chs`: `WxH`, capped at 2048 per side.
pub fn parse_size(chs: Option<&str>) -> (u32, u32) {
    let Some(chs) = chs else {
        return (DEFAULT_WIDTH, DEFAULT_HEIGHT);
    };
    let mut parts = chs.split('x');
    let width = parts
        .next()
        .and_then(|p| p.trim().parse::<u32>().ok())
        .unwrap_or(DEFAULT_WIDTH)
        .min(MAX_DIMENSION);
    let height = parts
        .next()
        .and_then(|p| p.trim().parse::<u32>().ok())
        .unwrap_or(DEFAULT_HEIGHT)
        .min(MAX_DIMENSION);
    (width, height)
}

/// `chf`: flat fill `s,lg/ls,<color>` or alpha fill `a,s,<color+alpha>`.
/// Only the first series entry is honored.
pub fn parse_background_color(chf: Option<&str>) -> String {
    let Some(chf) = chf else {
        return "white".to_string();
    };

    let first = chf.split('|').next().unwrap_or("");
    let parts: Vec<&str> = first.split(',').collect();
    let Some(color) = parts.get(2) else {
        warn!("malformed background fill: {:?}", chf);
        return "white".to_string();
    };

    if parts[0] == "a" {
        // Transparency: an alpha channel over black, from the last two hex
        // digits of the color field.
        let alpha = &color[color.len().saturating_sub(2)..];
        format!("#000000{}", alpha)
    } else {
        format!("#{}", color)
    }
}

/// `cht`: maps a type code to a normalized type and base scale layout.
/// Unrecognized codes leave the type unset.
fn set_chart_type(cht: Option<&str>, spec: &mut ChartSpec) {
    let Some(cht) = cht else {
        return;
    };

    match cht {
        "bhs" | "bvs" | "bvo" | "bhg" | "bvg" => {
            spec.chart_type = Some(
                if cht.starts_with("bh") { "horizontalBar" } else { "bar" }.to_string(),
            );
            let stacked = cht == "bhs" || cht == "bvs" || cht == "bvo";
            // `bvo` overlaps bars: only the category axis stacks, and the
            // axes stay visible.
            let overlapped = cht == "bvo";

            let scales = spec.options.scales_mut();
            let x = scales.x_axis_mut();
            x.display = Some(overlapped);
            if stacked {
                x.stacked = Some(true);
            }
            x.grid_lines_mut().display = Some(false);

            let y = scales.y_axis_mut();
            y.display = Some(overlapped);
            if stacked && !overlapped {
                y.stacked = Some(true);
            } else if overlapped {
                y.stacked = Some(false);
            }
            y.grid_lines_mut().display = Some(false);
            y.ticks_mut().begin_at_zero = Some(true);
        }
        "lc" | "ls" => {
            spec.chart_type = Some("line".to_string());
            let scales = spec.options.scales_mut();

            let x = scales.x_axis_mut();
            x.display = Some(false);
            let x_grid = x.grid_lines_mut();
            if cht == "lc" {
                x_grid.draw_on_chart_area = Some(false);
                x_grid.draw_ticks = Some(false);
            } else {
                x_grid.display = Some(false);
            }

            let y = scales.y_axis_mut();
            y.display = Some(false);
            let y_grid = y.grid_lines_mut();
            if cht == "lc" {
                y_grid.draw_on_chart_area = Some(false);
                y_grid.draw_ticks = Some(false);
            } else {
                y_grid.display = Some(false);
            }
            y.ticks_mut().begin_at_zero = Some(true);
        }
        "p" | "p3" | "pc" => {
            spec.chart_type = Some("pie".to_string());
            spec.options.plugins_mut().datalabels = Some(Datalabels::hidden());
        }
        other => {
            warn!("unrecognized chart type code: {:?}", other);
        }
    }
}

/// Fills labels and datasets from the decoded series matrix. Pie datasets
/// are reversed (legacy stacking-order quirk) and left uncolored; round
/// chart coloring is the defaults engine's job.
fn set_data(series: &SeriesMatrix, spec: &mut ChartSpec) {
    let longest = series.iter().map(Vec::len).max().unwrap_or(0);
    spec.data.labels = Some((0..longest).map(|idx| json!(idx)).collect());

    let is_round = spec.type_str() == "pie";

    spec.data.datasets = series
        .iter()
        .enumerate()
        .map(|(idx, values)| {
            let color = (!is_round).then(|| Fill::Single(wheel_color(idx).to_string()));
            Dataset {
                data: values.iter().map(|v| DataPoint::from(*v)).collect(),
                fill: Some(false),
                background_color: color.clone(),
                border_color: color,
                border_width: Some(2.0),
                point_radius: Some(0.0),
                ..Dataset::default()
            }
        })
        .collect();

    if is_round {
        spec.data.datasets.reverse();
    }
}

/// `chtt`/`chts`: title text (`|` becomes a newline) with optional
/// `<hexcolor>,<size>` styling.
fn set_title(chtt: Option<&str>, chts: Option<&str>, spec: &mut ChartSpec) {
    let Some(chtt) = chtt else {
        return;
    };

    let mut title = Title {
        display: true,
        text: Some(chtt.replace('|', "\n")),
        ..Title::default()
    };

    if let Some(chts) = chts {
        let mut parts = chts.split(',');
        if let Some(color) = parts.next().filter(|c| !c.is_empty()) {
            title.font_color = Some(format!("#{}", color));
        }
        title.font_size = parts.next().and_then(|s| s.trim().parse().ok());
    }

    spec.options.title = Some(title);
}

/// `chg`: grid line spacing percentages, converted to tick-count limits.
fn set_grid_lines(chg: Option<&str>, spec: &mut ChartSpec) {
    let Some(chg) = chg else {
        return;
    };

    let parts: Vec<Option<f64>> = chg.split(',').map(|p| p.trim().parse().ok()).collect();
    let x_spacing = parts.first().copied().flatten().unwrap_or(0.0);
    let y_spacing = parts.get(1).copied().flatten().unwrap_or(0.0);

    let scales = spec.options.scales_mut();
    if x_spacing > 0.0 {
        let x = scales.x_axis_mut();
        let grid = x.grid_lines_mut();
        grid.display = Some(true);
        grid.draw_on_chart_area = Some(true);
        x.ticks_mut().max_ticks_limit = Some(100.0 / x_spacing);
    }
    if y_spacing > 0.0 {
        let y = scales.y_axis_mut();
        let grid = y.grid_lines_mut();
        grid.display = Some(true);
        grid.draw_on_chart_area = Some(true);
        y.ticks_mut().max_ticks_limit = Some(100.0 / y_spacing);
    }
}

/// `chdl`/`chdlp`/`chdls`: per-dataset legend labels, position code, and
/// font styling. An unrecognized position code leaves the position unset
/// (a documented protocol gap, not an error).
fn set_legend(
    chdl: Option<&str>,
    chdlp: Option<&str>,
    chdls: Option<&str>,
    spec: &mut ChartSpec,
) {
    let Some(chdl) = chdl else {
        spec.options.legend = Some(Legend::default());
        return;
    };

    let mut legend = Legend {
        display: true,
        labels: Some(LegendLabels { box_width: Some(10) }),
        ..Legend::default()
    };

    for (idx, label) in chdl.split('|').enumerate() {
        if let Some(dataset) = spec.data.datasets.get_mut(idx) {
            dataset.label = Some(label.to_string());
        }
    }

    match chdlp.unwrap_or("r") {
        "b" => legend.position = Some("bottom".to_string()),
        "t" => legend.position = Some("top".to_string()),
        "r" => {
            legend.position = Some("right".to_string());
            legend.align = Some("start".to_string());
        }
        "l" => {
            legend.position = Some("left".to_string());
            legend.align = Some("start".to_string());
        }
        other => {
            warn!("unsupported legend position code: {:?}", other);
        }
    }

    if let Some(chdls) = chdls {
        let mut parts = chdls.split(',');
        if let Some(color) = parts.next().filter(|c| !c.is_empty()) {
            legend.font_color = Some(format!("#{}", color));
        }
        legend.font_size = parts.next().and_then(|s| s.trim().parse().ok());
    }

    spec.options.legend = Some(legend);
}

/// `chma`: four comma-separated margins, left/right/top/bottom.
fn set_margins(chma: Option<&str>, spec: &mut ChartSpec) {
    let mut padding = Padding {
        left: 0,
        right: 0,
        top: 10,
        bottom: 0,
    };

    if let Some(chma) = chma {
        let values: Vec<Option<i32>> = chma.split(',').map(|p| p.trim().parse().ok()).collect();
        let field = |idx: usize| values.get(idx).copied().flatten();
        if let Some(left) = field(0) {
            padding.left = left;
        }
        if let Some(right) = field(1) {
            padding.right = right;
        }
        if let Some(top) = field(2) {
            padding.top = top;
        }
        if let Some(bottom) = field(3) {
            padding.bottom = bottom;
        }
    }

    spec.options.layout = Some(Layout {
        padding: Some(padding),
    });
}

/// `chl`: datalabel text, indexed by flattening dataset order then
/// datapoint order.
fn set_data_labels(chl: Option<&str>, spec: &mut ChartSpec) {
    let Some(chl) = chl else {
        return;
    };

    let labels: Vec<String> = chl.split('|').map(|l| l.replace("\\n", "\n")).collect();

    spec.options.plugins_mut().datalabels = Some(Datalabels {
        display: Some(DatalabelDisplay::Flag(true)),
        color: Some("#000".to_string()),
        font: Some(FontSpec {
            size: Some(14.0),
            weight: None,
        }),
        formatter: Some(DatalabelFormatter::IndexedLabels { labels }),
        ..Datalabels::default()
    });
}

/// `chco`: either one hex color per dataset, or `|`-delimited per-value
/// color arrays (round-chart semantics).
fn set_colors(chco: Option<&str>, spec: &mut ChartSpec) {
    let Some(chco) = chco else {
        return;
    };

    let colors: Vec<Fill> = chco
        .split(',')
        .map(|entry| {
            if entry.contains('|') {
                Fill::PerValue(entry.split('|').map(|c| format!("#{}", c)).collect())
            } else {
                Fill::Single(format!("#{}", entry))
            }
        })
        .collect();

    for (idx, dataset) in spec.data.datasets.iter_mut().enumerate() {
        if let Some(color) = colors.get(idx) {
            dataset.background_color = Some(color.clone());
            dataset.border_color = Some(color.clone());
        }
    }
}

/// `chxr`: numeric min/max/step per enabled axis.
///
/// Category x-axes cannot honor numeric ranges, so an x-axis range
/// switches the axis to linear and rewrites every data point into `{x,y}`
/// pairs evenly spaced across `[min,max]`.
fn set_axis_ranges(chxt: Option<&str>, chxr: Option<&str>, spec: &mut ChartSpec) {
    let (Some(chxt), Some(chxr)) = (chxt, chxr) else {
        return;
    };
    let enabled: Vec<&str> = chxt.split(',').collect();

    for setting in chxr.split('|') {
        let opts: Vec<Option<f64>> = setting.split(',').map(|p| p.trim().parse().ok()).collect();
        let axis_idx = match opts.first().copied().flatten() {
            Some(idx) if idx >= 0.0 => idx as usize,
            _ => {
                warn!("malformed axis range rule: {:?}", setting);
                continue;
            }
        };
        let (Some(min), Some(max)) = (
            opts.get(1).copied().flatten(),
            opts.get(2).copied().flatten(),
        ) else {
            warn!("axis range rule without min/max: {:?}", setting);
            continue;
        };
        let step = opts.get(3).copied().flatten();

        match enabled.get(axis_idx).copied() {
            Some("x") => {
                let axis = spec.options.scales_mut().x_axis_mut();
                axis.axis_type = Some("linear".to_string());
                let ticks = axis.ticks_mut();
                ticks.min = Some(min);
                ticks.max = Some(max);
                ticks.step_size = step;
                ticks.max_ticks_limit = Some(f64::MAX);

                for dataset in &mut spec.data.datasets {
                    let len = dataset.data.len();
                    if len == 0 {
                        continue;
                    }
                    let stride = (max - min) / len as f64;
                    dataset.data = dataset
                        .data
                        .iter()
                        .enumerate()
                        .map(|(i, point)| DataPoint::Xy {
                            x: min + stride * i as f64,
                            y: point.magnitude(),
                        })
                        .collect();
                }
            }
            Some("y") => {
                let ticks = spec.options.scales_mut().y_axis_mut().ticks_mut();
                ticks.min = Some(min);
                ticks.max = Some(max);
                ticks.step_size = step;
                ticks.max_ticks_limit = Some(f64::MAX);
            }
            _ => {}
        }
    }
}

/// `chxt` + `chxs` + `chxl`: axis visibility, tick formats, and explicit
/// labels, in that precedence order.
fn set_axis_labels(
    chxt: Option<&str>,
    chxl: Option<&str>,
    chxs: Option<&str>,
    spec: &mut ChartSpec,
) {
    let Some(chxt) = chxt else {
        return;
    };
    let enabled: Vec<&str> = chxt.split(',').collect();
    let is_horizontal = spec.type_str() == "horizontalBar";

    if enabled.contains(&"x") {
        let x = spec.options.scales_mut().x_axis_mut();
        x.display = Some(true);

        if is_horizontal {
            // Horizontal bar charts show x-axis tick marks.
            let grid = x.grid_lines_mut();
            grid.display.get_or_insert(true);
            grid.draw_on_chart_area.get_or_insert(false);
            grid.draw_ticks.get_or_insert(true);
        }
        x.ticks_mut().auto_skip.get_or_insert(false);
    }
    if enabled.contains(&"y") {
        let y = spec.options.scales_mut().y_axis_mut();
        y.display = Some(true);

        // The legacy protocol shows y-axis tick marks.
        let grid = y.grid_lines_mut();
        grid.display.get_or_insert(true);
        grid.draw_on_chart_area.get_or_insert(false);
        grid.offset_grid_lines.get_or_insert(false);
        grid.draw_ticks.get_or_insert(true);
    }

    if let Some(chxs) = chxs {
        for rule in chxs.split('|') {
            apply_axis_style_rule(rule, &enabled, spec);
        }
    }

    if let Some(chxl) = chxl {
        let lookup = collect_axis_labels(chxl, &enabled);
        apply_axis_tick_labels("x", lookup.x, spec);
        apply_axis_tick_labels("y", lookup.y, spec);
    }
}

fn apply_axis_style_rule(rule: &str, enabled: &[&str], spec: &mut ChartSpec) {
    let parts: Vec<&str> = rule.split(',').collect();
    let Some(parsed) = parts.first().and_then(|field| parse_axis_format(field)) else {
        warn!("malformed axis style rule: {:?}", rule);
        return;
    };

    let axis_name = match enabled.get(parsed.axis_index).copied() {
        Some(name @ ("x" | "y")) => name,
        _ => return,
    };
    let scales = spec.options.scales_mut();
    let axis = if axis_name == "x" {
        scales.x_axis_mut()
    } else {
        scales.y_axis_mut()
    };

    match TickVisibility::from_code(parts.get(4).copied()) {
        TickVisibility::LineOnly => {
            axis.display = Some(true);
            axis.grid_lines_mut().draw_ticks = Some(false);
        }
        TickVisibility::TicksOnly | TickVisibility::Both => {
            axis.display = Some(true);
            axis.grid_lines_mut().draw_ticks = Some(true);
        }
        TickVisibility::Neither => {
            axis.display = Some(false);
        }
    }

    if let Some(format) = parsed.format {
        axis.ticks_mut().callback = Some(TickCallback::Format(format));
    }
}

#[derive(Default)]
struct AxisLabelLookup {
    x: Vec<String>,
    y: Vec<String>,
}

/// Splits a `chxl` value (`0:|Jan|Feb|1:|low|high`) into per-axis lists.
fn collect_axis_labels(chxl: &str, enabled: &[&str]) -> AxisLabelLookup {
    let mut lookup = AxisLabelLookup::default();
    let mut current: Option<&str> = None;

    for token in chxl.split('|') {
        let marker = token
            .strip_suffix(':')
            .and_then(|idx| idx.parse::<usize>().ok())
            .and_then(|idx| enabled.get(idx).copied());
        if let Some(axis) = marker {
            current = Some(axis);
            continue;
        }
        match current {
            Some("x") => lookup.x.push(token.to_string()),
            Some("y") => lookup.y.push(token.to_string()),
            _ => {}
        }
    }
    lookup
}

/// Explicit tick labels override any `chxs` format callback. Y-axis labels
/// arrive top-down and must be reversed to match bottom-up tick order.
fn apply_axis_tick_labels(axis_name: &str, mut labels: Vec<String>, spec: &mut ChartSpec) {
    if labels.is_empty() {
        return;
    }
    if axis_name == "y" {
        labels.reverse();
    }

    let scales = spec.options.scales_mut();
    let axis = if axis_name == "x" {
        scales.x_axis_mut()
    } else {
        scales.y_axis_mut()
    };
    let ticks = axis.ticks_mut();
    ticks.callback = Some(TickCallback::Labels(TickLabels { labels }));
    ticks.min_rotation = Some(0.0);
    ticks.max_rotation = Some(0.0);
    ticks.padding = Some(2.0);
}

/// `chm`: per-series marker rules. Fill markers (`B`/`b`) enable dataset
/// fill with the rule's color; a zero marker size suppresses every
/// datalabel.
fn set_markers(chm: Option<&str>, spec: &mut ChartSpec) {
    let Some(chm) = chm else {
        return;
    };

    let mut enabled_series = std::collections::BTreeSet::new();
    let mut hide_markers = false;

    for (idx, rule) in chm.split('|').enumerate() {
        let parts: Vec<&str> = rule.split(',').collect();
        let marker_type = parts.first().copied().unwrap_or("");
        let marker_color = parts.get(1).copied().unwrap_or("");

        if marker_type == "B" || marker_type == "b" {
            if let Some(dataset) = spec.data.datasets.get_mut(idx) {
                dataset.fill = Some(true);
                dataset.background_color = Some(Fill::Single(format!("#{}", marker_color)));
            }
        }

        if let Some(series_idx) = parts.get(2).and_then(|p| p.trim().parse::<usize>().ok()) {
            enabled_series.insert(series_idx);
        }
        if let Some(0) = parts.get(4).and_then(|p| p.trim().parse::<i64>().ok()) {
            hide_markers = true;
        }
    }

    spec.options.plugins_mut().datalabels = Some(Datalabels {
        display: Some(DatalabelDisplay::Flag(!hide_markers)),
        anchor: Some("end".to_string()),
        align: Some("end".to_string()),
        offset: Some(0.0),
        font: Some(FontSpec {
            size: Some(10.0),
            weight: Some("bold".to_string()),
        }),
        formatter: Some(DatalabelFormatter::SeriesValues {
            series: enabled_series,
        }),
        ..Datalabels::default()
    });
}

/// `chls`: per-series line thickness.
fn set_line_thickness(chls: Option<&str>, spec: &mut ChartSpec) {
    let Some(chls) = chls else {
        return;
    };

    for (idx, entry) in chls.split('|').enumerate() {
        let thickness = entry.split(',').next().and_then(|p| p.trim().parse::<f64>().ok());
        if let (Some(thickness), Some(dataset)) = (thickness, spec.data.datasets.get_mut(idx)) {
            dataset.border_width = Some(thickness);
        }
    }
}
