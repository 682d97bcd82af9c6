//! Chart type classification.
//!
//! Round chart types color per value rather than per dataset and interact
//! with out-labels; cartesian types get the `beginAtZero` axis default.

const ROUND_CHART_TYPES: &[&str] = &[
    "pie",
    "doughnut",
    "polarArea",
    "outlabeledPie",
    "outlabeledDoughnut",
];

const BOXPLOT_CHART_TYPES: &[&str] = &[
    "boxplot",
    "horizontalBoxplot",
    "violin",
    "horizontalViolin",
];

pub fn is_round_type(chart_type: &str) -> bool {
    ROUND_CHART_TYPES.contains(&chart_type)
}

pub fn is_boxplot_type(chart_type: &str) -> bool {
    BOXPLOT_CHART_TYPES.contains(&chart_type)
}

/// Types whose value axis defaults to starting at zero.
pub fn uses_cartesian_scales(chart_type: &str) -> bool {
    matches!(
        chart_type,
        "bar" | "horizontalBar" | "line" | "scatter" | "bubble"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_types_include_outlabeled_variants() {
        assert!(is_round_type("pie"));
        assert!(is_round_type("outlabeledDoughnut"));
        assert!(!is_round_type("bar"));
    }

    #[test]
    fn cartesian_types_cover_bar_and_line_families() {
        assert!(uses_cartesian_scales("horizontalBar"));
        assert!(uses_cartesian_scales("bubble"));
        assert!(!uses_cartesian_scales("radar"));
    }
}
