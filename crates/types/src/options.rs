//! The chart options tree.
//!
//! Every field is optional so that decoded and user-supplied specs can be
//! distinguished from defaults the normalization engine injects later.
//! Unknown option keys are preserved through flattened passthrough maps.

use crate::formatter::DatalabelFormatter;
use crate::ticks::TickCallback;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legend: Option<Legend>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scales: Option<Scales>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elements: Option<Elements>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugins: Option<PluginOptions>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_pixel_ratio: Option<f64>,

    #[serde(flatten, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl ChartOptions {
    /// The scales entry, created on first use.
    pub fn scales_mut(&mut self) -> &mut Scales {
        self.scales.get_or_insert_with(Scales::default)
    }

    /// The plugin options entry, created on first use.
    pub fn plugins_mut(&mut self) -> &mut PluginOptions {
        self.plugins.get_or_insert_with(PluginOptions::default)
    }

    pub fn has_colorschemes(&self) -> bool {
        self.plugins
            .as_ref()
            .map(|p| p.colorschemes.is_some())
            .unwrap_or(false)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Title {
    #[serde(default)]
    pub display: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_color: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Legend {
    #[serde(default)]
    pub display: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<LegendLabels>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_color: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LegendLabels {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub box_width: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<Padding>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Padding {
    #[serde(default)]
    pub left: i32,
    #[serde(default)]
    pub right: i32,
    #[serde(default)]
    pub top: i32,
    #[serde(default)]
    pub bottom: i32,
}

/// One x-axis and one y-axis in the legacy-protocol path; kept as lists
/// because free-form specs may carry more.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Scales {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub x_axes: Vec<Axis>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub y_axes: Vec<Axis>,
}

impl Scales {
    pub fn x_axis_mut(&mut self) -> &mut Axis {
        if self.x_axes.is_empty() {
            self.x_axes.push(Axis::default());
        }
        &mut self.x_axes[0]
    }

    pub fn y_axis_mut(&mut self) -> &mut Axis {
        if self.y_axes.is_empty() {
            self.y_axes.push(Axis::default());
        }
        &mut self.y_axes[0]
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Axis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stacked: Option<bool>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub axis_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_lines: Option<GridLines>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticks: Option<Ticks>,

    #[serde(flatten, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl Axis {
    pub fn grid_lines_mut(&mut self) -> &mut GridLines {
        self.grid_lines.get_or_insert_with(GridLines::default)
    }

    pub fn ticks_mut(&mut self) -> &mut Ticks {
        self.ticks.get_or_insert_with(Ticks::default)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GridLines {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draw_on_chart_area: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draw_ticks: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_grid_lines: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mirror: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Ticks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_size: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_ticks_limit: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub begin_at_zero: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_skip: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_rotation: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rotation: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback: Option<TickCallback>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Elements {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<LineElement>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point: Option<PointElement>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LineElement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PointElement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PluginOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datalabels: Option<Datalabels>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outlabels: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colorschemes: Option<Value>,

    #[serde(flatten, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

/// Which data points a datalabel configuration is shown for.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum DatalabelDisplay {
    Flag(bool),
    #[serde(rename_all = "camelCase")]
    DatasetIndex {
        dataset_index: usize,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Datalabels {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<DatalabelDisplay>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<FontSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatter: Option<DatalabelFormatter>,

    #[serde(flatten, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl Datalabels {
    pub fn hidden() -> Self {
        Self {
            display: Some(DatalabelDisplay::Flag(false)),
            ..Self::default()
        }
    }

    pub fn shown() -> Self {
        Self {
            display: Some(DatalabelDisplay::Flag(true)),
            ..Self::default()
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct FontSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn options_preserve_unknown_keys() {
        let options: ChartOptions = serde_json::from_value(json!({
            "legend": { "display": true },
            "tooltips": { "enabled": false }
        }))
        .unwrap();
        assert!(options.legend.as_ref().unwrap().display);
        assert_eq!(options.extra.get("tooltips"), Some(&json!({ "enabled": false })));
    }

    #[test]
    fn datalabel_display_accepts_flag_and_dataset_filter() {
        let flag: DatalabelDisplay = serde_json::from_value(json!(true)).unwrap();
        assert_eq!(flag, DatalabelDisplay::Flag(true));

        let filter: DatalabelDisplay =
            serde_json::from_value(json!({ "datasetIndex": 0 })).unwrap();
        assert_eq!(filter, DatalabelDisplay::DatasetIndex { dataset_index: 0 });
    }

    #[test]
    fn scales_accessors_create_single_axes() {
        let mut scales = Scales::default();
        scales.y_axis_mut().ticks_mut().begin_at_zero = Some(true);
        assert_eq!(scales.y_axes.len(), 1);
        assert!(scales.x_axes.is_empty());
    }
}
