//! Top-level chart specification structures.

use crate::options::ChartOptions;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A renderer-ready chart description.
///
/// `chart_type` is left unset when the source protocol carried an
/// unrecognized type code; callers decide whether that is an error.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ChartSpec {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub chart_type: Option<String>,

    #[serde(default)]
    pub data: ChartData,

    #[serde(default)]
    pub options: ChartOptions,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plugins: Vec<PluginRef>,
}

impl ChartSpec {
    pub fn with_type(chart_type: &str) -> Self {
        Self {
            chart_type: Some(chart_type.to_string()),
            ..Self::default()
        }
    }

    /// The chart type, or the empty string when unset.
    pub fn type_str(&self) -> &str {
        self.chart_type.as_deref().unwrap_or("")
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ChartData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<Value>>,

    #[serde(default)]
    pub datasets: Vec<Dataset>,
}

/// A single data point. The unit variant serializes to JSON `null`; an
/// `{x, y}` pair may carry a null `y`, keeping a gap anchored on a
/// linear axis.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum DataPoint {
    Xy { x: f64, y: Option<f64> },
    Value(f64),
    Null,
}

impl DataPoint {
    /// The numeric magnitude of the point, if it has one (`y` for pairs).
    pub fn magnitude(&self) -> Option<f64> {
        match self {
            DataPoint::Xy { y, .. } => *y,
            DataPoint::Value(v) => Some(*v),
            DataPoint::Null => None,
        }
    }
}

impl From<Option<f64>> for DataPoint {
    fn from(v: Option<f64>) -> Self {
        match v {
            Some(v) => DataPoint::Value(v),
            None => DataPoint::Null,
        }
    }
}

/// A fill or stroke specification for a dataset.
///
/// Round chart types color per value, so a fill may be a whole array of
/// colors. Gradient and pattern descriptors produced by the sandbox
/// helpers arrive as opaque structured values.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Fill {
    Single(String),
    PerValue(Vec<String>),
    Structured(Value),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default)]
    pub data: Vec<DataPoint>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Fill>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<Fill>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_tension: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_radius: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outlabels: Option<Value>,

    /// Caller-supplied fields the pipeline does not interpret.
    #[serde(flatten, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl Dataset {
    pub fn from_values<I: IntoIterator<Item = Option<f64>>>(values: I) -> Self {
        Self {
            data: values.into_iter().map(DataPoint::from).collect(),
            ..Self::default()
        }
    }
}

/// A reference to a chart plugin composed into the final spec.
///
/// The background fill is the one plugin that carries data of its own; it
/// is always appended last so it paints before everything else draws.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum PluginRef {
    Datalabels,
    Annotation,
    Outlabels,
    DoughnutLabel,
    RadialGauge,
    BoxViolin,
    ColorSchemes,
    Background {
        #[serde(skip_serializing_if = "Option::is_none")]
        color: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn data_point_null_round_trips_as_json_null() {
        let points: Vec<DataPoint> = serde_json::from_value(
            json!([1.5, null, { "x": 0.0, "y": 2.0 }, { "x": 1.0, "y": null }]),
        )
        .unwrap();
        assert_eq!(
            points,
            vec![
                DataPoint::Value(1.5),
                DataPoint::Null,
                DataPoint::Xy { x: 0.0, y: Some(2.0) },
                DataPoint::Xy { x: 1.0, y: None },
            ]
        );
        assert_eq!(
            serde_json::to_value(&points).unwrap(),
            json!([1.5, null, { "x": 0.0, "y": 2.0 }, { "x": 1.0, "y": null }])
        );
    }

    #[test]
    fn dataset_preserves_unknown_fields() {
        let dataset: Dataset = serde_json::from_value(json!({
            "data": [1, 2],
            "borderDash": [5, 5]
        }))
        .unwrap();
        assert_eq!(dataset.extra.get("borderDash"), Some(&json!([5, 5])));
    }

    #[test]
    fn fill_accepts_single_and_per_value_colors() {
        let single: Fill = serde_json::from_value(json!("#ff0000")).unwrap();
        assert_eq!(single, Fill::Single("#ff0000".to_string()));

        let per_value: Fill = serde_json::from_value(json!(["red", "blue"])).unwrap();
        assert_eq!(
            per_value,
            Fill::PerValue(vec!["red".to_string(), "blue".to_string()])
        );
    }

    #[test]
    fn spec_parses_minimal_chart() {
        let spec: ChartSpec = serde_json::from_value(json!({
            "type": "bar",
            "data": { "labels": ["a", "b"], "datasets": [{ "data": [10, 20] }] }
        }))
        .unwrap();
        assert_eq!(spec.type_str(), "bar");
        assert_eq!(spec.data.datasets.len(), 1);
    }
}
