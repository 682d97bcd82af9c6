//! Datalabel formatters as data.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How a datalabel's text is produced for a given data point.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum DatalabelFormatter {
    /// Labels indexed by flattening dataset order then datapoint order
    /// (legacy `chl` behavior).
    IndexedLabels { labels: Vec<String> },

    /// Show the raw value, but only for datasets named in a marker rule
    /// (legacy `chm` behavior).
    SeriesValues { series: BTreeSet<usize> },

    /// Progress-bar value labels; `percentage` appends a percent sign.
    ProgressValue { percentage: bool },
}

impl DatalabelFormatter {
    /// Formats the label for a data point, or `None` to suppress it.
    ///
    /// `dataset_lengths` carries the length of every dataset in the spec,
    /// which indexed labels need to flatten their position.
    pub fn format(
        &self,
        dataset_index: usize,
        data_index: usize,
        value: f64,
        dataset_lengths: &[usize],
    ) -> Option<String> {
        match self {
            DatalabelFormatter::IndexedLabels { labels } => {
                let offset: usize = dataset_lengths.iter().take(dataset_index).sum();
                labels
                    .get(offset + data_index)
                    .filter(|label| !label.is_empty())
                    .cloned()
            }
            DatalabelFormatter::SeriesValues { series } => {
                if series.contains(&dataset_index) {
                    Some(format_value(value))
                } else {
                    None
                }
            }
            DatalabelFormatter::ProgressValue { percentage } => {
                if *percentage {
                    Some(format!("{}%", format_value(value)))
                } else {
                    Some(format_value(value))
                }
            }
        }
    }
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexed_labels_flatten_across_datasets() {
        let formatter = DatalabelFormatter::IndexedLabels {
            labels: vec!["a".into(), "b".into(), "c".into(), "d".into()],
        };
        // Second dataset starts after the first's 3 points.
        assert_eq!(formatter.format(1, 0, 0.0, &[3, 2]), Some("d".to_string()));
        assert_eq!(formatter.format(0, 1, 0.0, &[3, 2]), Some("b".to_string()));
        // Out of range labels are suppressed.
        assert_eq!(formatter.format(1, 1, 0.0, &[3, 2]), None);
    }

    #[test]
    fn series_values_filter_by_dataset() {
        let formatter = DatalabelFormatter::SeriesValues {
            series: BTreeSet::from([0, 2]),
        };
        assert_eq!(formatter.format(0, 0, 42.0, &[5]), Some("42".to_string()));
        assert_eq!(formatter.format(1, 0, 42.0, &[5]), None);
    }

    #[test]
    fn progress_value_appends_percent_in_percentage_mode() {
        let formatter = DatalabelFormatter::ProgressValue { percentage: true };
        assert_eq!(formatter.format(0, 0, 75.0, &[1]), Some("75%".to_string()));
    }
}
