//! The four chart builders and the per-report assembly.
//!
//! Builders share the signature `(db, area, filters, config) ->
//! ChartModel` and are pure apart from their read-only aggregate
//! queries: the same inputs against an unchanged dataset produce an
//! identical model. Empty result sets produce a model with an empty
//! `data` array; "no data" rendering is the frontend's call.

use flyttstat_chart_models::{
    CategoryChartConfig, ChartConfig, ChartDataPoint, ChartKind, ChartModel, MeasureCalculation,
    NetFlowChartConfig, PointValue, TemporalCategoryChartConfig, TemporalChartConfig,
};
use flyttstat_database::queries;
use flyttstat_models::{CategoryDimension, FilterPredicate, Measure};
use switchy_database::Database;

use crate::shape;
use crate::title::effective_title;
use crate::ChartError;

/// Builds the chart for any configuration by dispatching on its type.
///
/// # Errors
///
/// Returns [`ChartError`] if an aggregate query fails.
pub async fn build_chart(
    db: &dyn Database,
    area: Option<&str>,
    filters: &[FilterPredicate],
    config: &ChartConfig,
) -> Result<ChartModel, ChartError> {
    match config {
        ChartConfig::Temporal(c) => build_temporal_chart(db, area, filters, c).await,
        ChartConfig::Category(c) => build_category_chart(db, area, filters, c).await,
        ChartConfig::TemporalCategory(c) => {
            build_temporal_category_chart(db, area, filters, c).await
        }
        ChartConfig::NetFlow(c) => build_net_flow_chart(db, area, filters, c).await,
    }
}

/// Concatenates base filters (e.g. a report's) with the filters saved on
/// the chart configuration itself. Both constrain the query; duplicates
/// are harmless since every predicate narrows the result set.
#[must_use]
pub fn effective_filters(base: &[FilterPredicate], config: &ChartConfig) -> Vec<FilterPredicate> {
    base.iter()
        .chain(config.filters().iter())
        .cloned()
        .collect()
}

/// Builds the charts of a report, concurrently, preserving input order.
///
/// Each entry pairs an opaque id (the saved chart's id) with its
/// configuration; the result pairs the same ids with the built models in
/// the same order regardless of query completion order. Each chart runs
/// against the base filters combined with its own configured filters.
///
/// # Errors
///
/// Returns [`ChartError`] if any chart's aggregate query fails.
pub async fn build_report_charts(
    db: &dyn Database,
    area: Option<&str>,
    filters: &[FilterPredicate],
    charts: &[(String, ChartConfig)],
) -> Result<Vec<(String, ChartModel)>, ChartError> {
    let built = futures::future::try_join_all(charts.iter().map(|(_, config)| async move {
        let merged = effective_filters(filters, config);
        build_chart(db, area, &merged, config).await
    }))
    .await?;

    Ok(charts
        .iter()
        .map(|(id, _)| id.clone())
        .zip(built)
        .collect())
}

/// Builds a column chart of event counts per year.
///
/// Years without matching events are omitted, not zero-filled.
///
/// # Errors
///
/// Returns [`ChartError`] if the aggregate query fails.
pub async fn build_temporal_chart(
    db: &dyn Database,
    area: Option<&str>,
    filters: &[FilterPredicate],
    config: &TemporalChartConfig,
) -> Result<ChartModel, ChartError> {
    log::debug!("Building temporal chart: area={area:?} measure={}", config.measure);

    let rows = queries::count_by_year(db, filters, area, config.measure).await?;

    let series_key = config.measure.to_string();
    let data = shape::temporal_points(&rows, &series_key);

    Ok(ChartModel {
        title: effective_title(&ChartConfig::Temporal(config.clone()), area),
        kind: ChartKind::Column,
        measure: config.measure,
        dimension: "year".to_string(),
        series: vec![series_key],
        data,
        ui_settings: config.ui_settings.clone(),
    })
}

/// Builds a pie or bar chart of event counts per category, collapsed to
/// the configured top N.
///
/// Employee-range breakdowns are re-sorted into bucket order after the
/// top-N selection so the bars read small-to-large company size.
///
/// # Errors
///
/// Returns [`ChartError`] if the aggregate query fails.
pub async fn build_category_chart(
    db: &dyn Database,
    area: Option<&str>,
    filters: &[FilterPredicate],
    config: &CategoryChartConfig,
) -> Result<ChartModel, ChartError> {
    log::debug!(
        "Building category chart: area={area:?} measure={} category={}",
        config.measure,
        config.category
    );

    let column = config.category.column(config.measure);
    let rows = queries::count_by_category(db, filters, area, config.measure, column).await?;

    let mut rows = shape::collapse_top_n(
        rows,
        config.max_number_of_categories,
        config.combine_remaining_categories,
    );
    if config.category == CategoryDimension::EmployeeRange {
        shape::sort_employee_range_rows(&mut rows);
    }

    let dimension_key = config.category.to_string();
    let series_key = config.measure.to_string();
    let data: Vec<ChartDataPoint> = rows
        .into_iter()
        .map(|row| {
            let mut point = ChartDataPoint::new();
            point.insert(dimension_key.clone(), PointValue::Label(row.key));
            point.insert(series_key.clone(), PointValue::Count(row.count));
            point
        })
        .collect();

    Ok(ChartModel {
        title: effective_title(&ChartConfig::Category(config.clone()), area),
        kind: config.chart_type.into(),
        measure: config.measure,
        dimension: dimension_key,
        series: vec![series_key],
        data,
        ui_settings: config.ui_settings.clone(),
    })
}

/// Builds a line chart of event counts per year, one series per top
/// category (plus "Övrigt" when combining), optionally normalized to
/// percent within each year.
///
/// # Errors
///
/// Returns [`ChartError`] if the aggregate query fails.
pub async fn build_temporal_category_chart(
    db: &dyn Database,
    area: Option<&str>,
    filters: &[FilterPredicate],
    config: &TemporalCategoryChartConfig,
) -> Result<ChartModel, ChartError> {
    log::debug!(
        "Building temporal+category chart: area={area:?} measure={} category={}",
        config.measure,
        config.category
    );

    let column = config.category.column(config.measure);
    let rows =
        queries::count_by_year_and_category(db, filters, area, config.measure, column).await?;

    let retained = shape::rank_categories_by_total(&rows, config.max_number_of_categories);
    let mut data =
        shape::temporal_category_points(&rows, &retained, config.combine_remaining_categories);

    if config.measure_calculation == MeasureCalculation::Percent {
        shape::normalize_points_to_percent(&mut data, "year");
    }

    let mut series = retained;
    if config.combine_remaining_categories {
        series.push(shape::OTHER_LABEL.to_string());
    }

    Ok(ChartModel {
        title: effective_title(&ChartConfig::TemporalCategory(config.clone()), area),
        kind: ChartKind::Line,
        measure: config.measure,
        dimension: "year".to_string(),
        series,
        data,
        ui_settings: config.ui_settings.clone(),
    })
}

/// Builds a column chart of inflow, outflow, and net flow per year.
///
/// The two aggregate queries are independent reads over the same filter
/// and run concurrently; the merge covers the union of both year sets.
///
/// # Errors
///
/// Returns [`ChartError`] if either aggregate query fails.
pub async fn build_net_flow_chart(
    db: &dyn Database,
    area: Option<&str>,
    filters: &[FilterPredicate],
    config: &NetFlowChartConfig,
) -> Result<ChartModel, ChartError> {
    log::debug!("Building net flow chart: area={area:?}");

    let (inflow, outflow) = futures::try_join!(
        queries::count_by_year(db, filters, area, Measure::Inflow),
        queries::count_by_year(db, filters, area, Measure::Outflow),
    )?;

    let data = shape::merge_net_flow(&inflow, &outflow);

    Ok(ChartModel {
        title: effective_title(&ChartConfig::NetFlow(config.clone()), area),
        kind: ChartKind::Column,
        measure: Measure::Inflow,
        dimension: "year".to_string(),
        series: vec![
            "inflow".to_string(),
            "outflow".to_string(),
            "net".to_string(),
        ],
        data,
        ui_settings: config.ui_settings.clone(),
    })
}

#[cfg(test)]
mod tests {
    use flyttstat_models::{FilterDimension, FilterOperator, FilterValue};

    use super::*;

    #[test]
    fn chart_filters_append_after_base_filters() {
        let base = vec![FilterPredicate {
            key: FilterDimension::RelocationYear,
            operator: FilterOperator::In,
            value: vec![FilterValue::Int(2023)],
        }];
        let config = ChartConfig::Temporal(TemporalChartConfig {
            title: None,
            filters: Some(vec![FilterPredicate {
                key: FilterDimension::CompanyType,
                operator: FilterOperator::In,
                value: vec![FilterValue::Text("AB".to_string())],
            }]),
            ui_settings: None,
            measure: Measure::Inflow,
        });

        let merged = effective_filters(&base, &config);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].key, FilterDimension::RelocationYear);
        assert_eq!(merged[1].key, FilterDimension::CompanyType);
    }

    #[test]
    fn configs_without_filters_keep_the_base_list() {
        let config = ChartConfig::NetFlow(NetFlowChartConfig {
            title: None,
            filters: None,
            ui_settings: None,
        });
        assert!(effective_filters(&[], &config).is_empty());
    }
}
