//! The defaults engine.
//!
//! Decoded and sandboxed chart specs arrive sparse: no colors, no axis
//! defaults, no plugin list. Normalization is an ordered pipeline of
//! pure passes over the spec, each of which only fills what the caller
//! left unset, so running the engine over its own output changes
//! nothing. Synthetic chart types (`sparkline`, `progressBar`) are
//! rewritten into real ones up front; plugin composition always runs
//! last.

mod error;
mod passes;

pub use error::NormalizeError;

use chartwright_types::ChartSpec;

/// Ambient facts the passes need but the spec does not carry.
#[derive(Debug, Clone, Default)]
pub struct NormalizeContext {
    /// Canvas background, painted by the background plugin.
    pub background_color: Option<String>,
}

impl NormalizeContext {
    pub fn with_background(color: impl Into<String>) -> Self {
        Self {
            background_color: Some(color.into()),
        }
    }
}

/// Facts earlier passes record for later ones.
#[derive(Debug, Default)]
pub struct PassState {
    /// The datalabels configuration was injected by this run, not the
    /// caller; the outlabels pass may override it.
    pub datalabels_defaulted: bool,
}

/// Runs every pass in order. Idempotent: `normalize(normalize(s)) ==
/// normalize(s)`.
pub fn normalize(spec: ChartSpec, ctx: &NormalizeContext) -> Result<ChartSpec, NormalizeError> {
    let mut state = PassState::default();
    let mut spec = spec;
    for (name, pass) in passes::PASSES {
        log::debug!("normalization pass: {}", name);
        spec = pass(spec, ctx, &mut state)?;
    }
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartwright_types::{
        DataPoint, DatalabelDisplay, DatalabelFormatter, Dataset, Fill, PluginRef,
    };
    use serde_json::json;

    fn spec_with(chart_type: &str, values: Vec<Option<f64>>) -> ChartSpec {
        let mut spec = ChartSpec::with_type(chart_type);
        spec.data.datasets.push(Dataset::from_values(values));
        spec
    }

    fn ctx() -> NormalizeContext {
        NormalizeContext::with_background("white")
    }

    #[test]
    fn donut_is_an_alias_for_doughnut() {
        let spec = normalize(spec_with("donut", vec![Some(1.0)]), &ctx()).unwrap();
        assert_eq!(spec.type_str(), "doughnut");
        assert!(spec.plugins.contains(&PluginRef::DoughnutLabel));
    }

    #[test]
    fn sparkline_becomes_a_bare_line_chart() {
        let spec = normalize(
            spec_with("sparkline", vec![Some(10.0), Some(-20.0), Some(30.0)]),
            &ctx(),
        )
        .unwrap();

        assert_eq!(spec.type_str(), "line");
        assert_eq!(spec.data.labels, Some(vec![json!(0), json!(1), json!(2)]));

        let scales = spec.options.scales.as_ref().unwrap();
        assert_eq!(scales.x_axes[0].display, Some(false));
        assert_eq!(scales.y_axes[0].display, Some(false));
        let ticks = scales.y_axes[0].ticks.as_ref().unwrap();
        // Padded outward by 5% of each bound's magnitude.
        assert_eq!(ticks.min, Some(-21.0));
        assert_eq!(ticks.max, Some(31.5));

        let line = spec.options.elements.as_ref().unwrap().line.as_ref().unwrap();
        assert_eq!(line.border_color.as_deref(), Some("#000"));
        assert!(!spec.options.legend.as_ref().unwrap().display);
    }

    #[test]
    fn sparkline_requires_exactly_one_dataset() {
        let mut spec = spec_with("sparkline", vec![Some(1.0)]);
        spec.data.datasets.push(Dataset::from_values(vec![Some(2.0)]));
        assert!(matches!(
            normalize(spec, &ctx()),
            Err(NormalizeError::Validation(_))
        ));

        let empty = ChartSpec::with_type("sparkline");
        assert!(matches!(
            normalize(empty, &ctx()),
            Err(NormalizeError::Validation(_))
        ));
    }

    #[test]
    fn progress_bar_synthesizes_a_percentage_track() {
        let spec = normalize(spec_with("progressBar", vec![Some(65.0)]), &ctx()).unwrap();

        assert_eq!(spec.type_str(), "horizontalBar");
        assert_eq!(spec.data.datasets.len(), 2);
        assert_eq!(spec.data.datasets[1].data, vec![DataPoint::Value(100.0)]);
        assert_eq!(
            spec.data.datasets[1].background_color,
            Some(Fill::Single("#fff".to_string()))
        );
        assert_eq!(
            spec.data.datasets[1].border_color,
            Some(Fill::Single("#4e78a7".to_string()))
        );

        let scales = spec.options.scales.as_ref().unwrap();
        assert_eq!(scales.x_axes[0].stacked, Some(true));
        assert_eq!(scales.y_axes[0].stacked, Some(true));

        let labels = spec.options.plugins.as_ref().unwrap().datalabels.as_ref().unwrap();
        assert_eq!(
            labels.display,
            Some(DatalabelDisplay::DatasetIndex { dataset_index: 0 })
        );
        assert_eq!(
            labels.formatter,
            Some(DatalabelFormatter::ProgressValue { percentage: true })
        );
    }

    #[test]
    fn progress_bar_with_explicit_track_is_not_percentage_mode() {
        let mut spec = spec_with("progressBar", vec![Some(30.0)]);
        spec.data.datasets.push(Dataset::from_values(vec![Some(80.0)]));
        let spec = normalize(spec, &ctx()).unwrap();
        let labels = spec.options.plugins.as_ref().unwrap().datalabels.as_ref().unwrap();
        assert_eq!(
            labels.formatter,
            Some(DatalabelFormatter::ProgressValue { percentage: false })
        );
    }

    #[test]
    fn progress_bar_rejects_mismatched_dataset_lengths() {
        let mut spec = spec_with("progressBar", vec![Some(1.0), Some(2.0)]);
        spec.data.datasets.push(Dataset::from_values(vec![Some(3.0)]));
        assert!(matches!(
            normalize(spec, &ctx()),
            Err(NormalizeError::Validation(_))
        ));
    }

    #[test]
    fn device_pixel_ratio_defaults_to_two() {
        let spec = normalize(spec_with("bar", vec![Some(1.0)]), &ctx()).unwrap();
        assert_eq!(spec.options.device_pixel_ratio, Some(2.0));

        let mut custom = spec_with("bar", vec![Some(1.0)]);
        custom.options.device_pixel_ratio = Some(1.0);
        let custom = normalize(custom, &ctx()).unwrap();
        assert_eq!(custom.options.device_pixel_ratio, Some(1.0));
    }

    #[test]
    fn cartesian_types_begin_at_zero_when_scales_are_unset() {
        let spec = normalize(spec_with("bar", vec![Some(5.0)]), &ctx()).unwrap();
        let ticks = spec.options.scales.as_ref().unwrap().y_axes[0]
            .ticks
            .as_ref()
            .unwrap();
        assert_eq!(ticks.begin_at_zero, Some(true));

        // Any caller-supplied scale config disables the default.
        let mut custom = spec_with("bar", vec![Some(5.0)]);
        custom.options.scales_mut().y_axis_mut().display = Some(true);
        let custom = normalize(custom, &ctx()).unwrap();
        let y_axis = &custom.options.scales.as_ref().unwrap().y_axes[0];
        assert!(y_axis.ticks.as_ref().and_then(|t| t.begin_at_zero).is_none());
    }

    #[test]
    fn wheel_colors_go_per_dataset_for_bars_and_per_value_for_pies() {
        let mut spec = spec_with("bar", vec![Some(1.0)]);
        spec.data.datasets.push(Dataset::from_values(vec![Some(2.0)]));
        let spec = normalize(spec, &ctx()).unwrap();
        assert_eq!(
            spec.data.datasets[0].background_color,
            Some(Fill::Single("#4D89F9".to_string()))
        );
        assert_eq!(
            spec.data.datasets[1].background_color,
            Some(Fill::Single("#00B88A".to_string()))
        );

        let pie = normalize(
            spec_with("pie", vec![Some(1.0), Some(2.0), Some(3.0)]),
            &ctx(),
        )
        .unwrap();
        assert_eq!(
            pie.data.datasets[0].background_color,
            Some(Fill::PerValue(vec![
                "#4D89F9".to_string(),
                "#00B88A".to_string(),
                "red".to_string(),
            ]))
        );
    }

    #[test]
    fn colorschemes_option_disables_wheel_colors() {
        let mut spec = spec_with("bar", vec![Some(1.0)]);
        spec.options.plugins_mut().colorschemes = Some(json!({ "scheme": "brewer.Paired12" }));
        let spec = normalize(spec, &ctx()).unwrap();
        assert!(spec.data.datasets[0].background_color.is_none());
        assert!(spec.plugins.contains(&PluginRef::ColorSchemes));
    }

    #[test]
    fn line_charts_default_to_straight_segments() {
        let spec = normalize(spec_with("line", vec![Some(1.0), Some(2.0)]), &ctx()).unwrap();
        assert_eq!(spec.data.datasets[0].line_tension, Some(0.0));
    }

    #[test]
    fn datalabels_default_on_for_pies_and_off_elsewhere() {
        let pie = normalize(spec_with("pie", vec![Some(1.0)]), &ctx()).unwrap();
        let labels = pie.options.plugins.as_ref().unwrap().datalabels.as_ref().unwrap();
        assert_eq!(labels.display, Some(DatalabelDisplay::Flag(true)));

        let bar = normalize(spec_with("bar", vec![Some(1.0)]), &ctx()).unwrap();
        let labels = bar.options.plugins.as_ref().unwrap().datalabels.as_ref().unwrap();
        assert_eq!(labels.display, Some(DatalabelDisplay::Flag(false)));
    }

    #[test]
    fn user_outlabels_suppress_the_datalabel_default() {
        let mut spec = spec_with("pie", vec![Some(1.0), Some(2.0)]);
        spec.data.datasets[0].outlabels = Some(json!({ "text": "%l %p" }));
        let spec = normalize(spec, &ctx()).unwrap();

        let labels = spec.options.plugins.as_ref().unwrap().datalabels.as_ref().unwrap();
        assert_eq!(labels.display, Some(DatalabelDisplay::Flag(false)));
    }

    #[test]
    fn global_outlabels_reach_every_dataset() {
        let mut spec = spec_with("outlabeledPie", vec![Some(1.0), Some(2.0)]);
        spec.data.datasets.push(Dataset::from_values(vec![Some(3.0)]));
        spec.options.plugins_mut().outlabels = Some(json!({ "text": "%l %p.2" }));
        let spec = normalize(spec, &ctx()).unwrap();

        // No per-dataset override: the global configuration stays in force.
        assert!(spec.data.datasets.iter().all(|d| d.outlabels.is_none()));
        // Enabling outlabels still suppresses the datalabel default.
        let labels = spec.options.plugins.as_ref().unwrap().datalabels.as_ref().unwrap();
        assert_eq!(labels.display, Some(DatalabelDisplay::Flag(false)));
    }

    #[test]
    fn round_datasets_get_explicit_outlabel_configs() {
        let mut spec = spec_with("outlabeledPie", vec![Some(1.0)]);
        spec.data.datasets.push(Dataset::from_values(vec![Some(2.0)]));
        spec.data.datasets[0].outlabels = Some(json!({ "text": "%l" }));
        let spec = normalize(spec, &ctx()).unwrap();

        assert_eq!(spec.data.datasets[0].outlabels, Some(json!({ "text": "%l" })));
        assert_eq!(
            spec.data.datasets[1].outlabels,
            Some(json!({ "display": false }))
        );
    }

    #[test]
    fn plugin_list_always_ends_with_the_background_fill() {
        let spec = normalize(spec_with("radialGauge", vec![Some(50.0)]), &ctx()).unwrap();
        assert_eq!(spec.plugins[0], PluginRef::Datalabels);
        assert_eq!(spec.plugins[1], PluginRef::Annotation);
        assert!(spec.plugins.contains(&PluginRef::RadialGauge));
        assert!(spec.plugins.contains(&PluginRef::Outlabels));
        assert_eq!(
            spec.plugins.last(),
            Some(&PluginRef::Background {
                color: Some("white".to_string())
            })
        );
    }

    #[test]
    fn boxplots_get_the_box_violin_plugin() {
        let spec = normalize(spec_with("violin", vec![Some(1.0)]), &ctx()).unwrap();
        assert!(spec.plugins.contains(&PluginRef::BoxViolin));
    }

    #[test]
    fn normalization_is_idempotent() {
        for chart_type in ["bar", "line", "pie", "doughnut", "sparkline", "progressBar", "radialGauge"] {
            let spec = spec_with(chart_type, vec![Some(10.0), Some(20.0)]);
            let once = normalize(spec, &ctx()).unwrap();
            let twice = normalize(once.clone(), &ctx()).unwrap();
            assert_eq!(once, twice, "normalize is not idempotent for {}", chart_type);
        }
    }
}
