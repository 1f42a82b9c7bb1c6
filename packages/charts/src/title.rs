//! Chart title generation.
//!
//! Titles are Swedish, assembled from the flow direction ("Inflytt" /
//! "Utflytt"), the matching preposition ("till" / "från"), the area of
//! interest when one is set, and a volume/percent qualifier.

use flyttstat_chart_models::{ChartConfig, MeasureCalculation};
use flyttstat_models::Measure;

/// Fallback for a chart whose configuration yields no title.
pub const MISSING_TITLE: &str = "Diagram saknar titel";

const fn measure_word(measure: Measure) -> &'static str {
    match measure {
        Measure::Inflow => "Inflytt",
        Measure::Outflow => "Utflytt",
    }
}

const fn preposition(measure: Measure) -> &'static str {
    match measure {
        Measure::Inflow => "till",
        Measure::Outflow => "från",
    }
}

fn area_part(measure: Measure, area: Option<&str>) -> String {
    area.map_or_else(String::new, |area| {
        format!(" {} {area}", preposition(measure))
    })
}

const fn calculation_word(calculation: MeasureCalculation) -> &'static str {
    match calculation {
        MeasureCalculation::Volume => "(volym)",
        MeasureCalculation::Percent => "(procent)",
    }
}

/// Generates a title from the configuration and the area of interest.
///
/// No area means the area clause is omitted entirely.
#[must_use]
pub fn generate_title(config: &ChartConfig, area: Option<&str>) -> String {
    match config {
        ChartConfig::Temporal(c) => format!(
            "{} per år{} (volym)",
            measure_word(c.measure),
            area_part(c.measure, area)
        ),
        ChartConfig::Category(c) => format!(
            "{} per kategori{} (volym)",
            measure_word(c.measure),
            area_part(c.measure, area)
        ),
        ChartConfig::TemporalCategory(c) => format!(
            "{} per år och kategori{} {}",
            measure_word(c.measure),
            area_part(c.measure, area),
            calculation_word(c.measure_calculation)
        ),
        ChartConfig::NetFlow(_) => area.map_or_else(
            || "Nettoflytt per år (volym)".to_string(),
            |area| format!("Nettoflytt per år {area} (volym)"),
        ),
    }
}

/// The effective title of a chart: the configured one when set and
/// non-empty, otherwise the generated one.
#[must_use]
pub fn effective_title(config: &ChartConfig, area: Option<&str>) -> String {
    config
        .explicit_title()
        .map_or_else(|| generate_title(config, area), ToString::to_string)
}

#[cfg(test)]
mod tests {
    use flyttstat_chart_models::{
        CategoryChartKind, NetFlowChartConfig, TemporalCategoryChartConfig, TemporalChartConfig,
    };
    use flyttstat_models::CategoryDimension;

    use super::*;

    fn temporal(measure: Measure) -> ChartConfig {
        ChartConfig::Temporal(TemporalChartConfig {
            title: None,
            filters: None,
            ui_settings: None,
            measure,
        })
    }

    #[test]
    fn inflow_uses_till() {
        assert_eq!(
            generate_title(&temporal(Measure::Inflow), Some("eskilstuna")),
            "Inflytt per år till eskilstuna (volym)"
        );
    }

    #[test]
    fn outflow_uses_fran() {
        assert_eq!(
            generate_title(&temporal(Measure::Outflow), Some("eskilstuna")),
            "Utflytt per år från eskilstuna (volym)"
        );
    }

    #[test]
    fn missing_area_omits_the_clause() {
        assert_eq!(
            generate_title(&temporal(Measure::Inflow), None),
            "Inflytt per år (volym)"
        );
    }

    #[test]
    fn temporal_category_uses_calculation_qualifier() {
        let config = ChartConfig::TemporalCategory(TemporalCategoryChartConfig {
            title: None,
            filters: None,
            ui_settings: None,
            measure: Measure::Inflow,
            category: CategoryDimension::Municipality,
            max_number_of_categories: 5,
            combine_remaining_categories: true,
            measure_calculation: MeasureCalculation::Percent,
        });
        assert_eq!(
            generate_title(&config, Some("uppsala")),
            "Inflytt per år och kategori till uppsala (procent)"
        );
    }

    #[test]
    fn netflow_title_names_the_area() {
        let config = ChartConfig::NetFlow(NetFlowChartConfig {
            title: None,
            filters: None,
            ui_settings: None,
        });
        assert_eq!(
            generate_title(&config, Some("eskilstuna")),
            "Nettoflytt per år eskilstuna (volym)"
        );
        assert_eq!(generate_title(&config, None), "Nettoflytt per år (volym)");
    }

    #[test]
    fn explicit_title_wins_over_generated() {
        let config = ChartConfig::Category(flyttstat_chart_models::CategoryChartConfig {
            title: Some("Min rubrik".to_string()),
            filters: None,
            ui_settings: None,
            measure: Measure::Inflow,
            category: CategoryDimension::CompanyType,
            max_number_of_categories: 5,
            combine_remaining_categories: false,
            chart_type: CategoryChartKind::Bar,
        });
        assert_eq!(effective_title(&config, None), "Min rubrik");
    }
}
