//! Pure reshaping rules applied to aggregate rows.
//!
//! Everything here is a function of its inputs: top-N collapsing into the
//! "Övrigt" bucket, ranking categories into series, per-point percent
//! normalization, and the inflow/outflow merge for net-flow charts. The
//! builders run the queries and delegate all row manipulation to these.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use flyttstat_chart_models::{ChartDataPoint, PointValue};
use flyttstat_database_models::{CategoryCount, YearCategoryCount, YearCount};
use flyttstat_models::compare_employee_ranges;

/// Label of the synthetic bucket absorbing categories beyond the top N.
pub const OTHER_LABEL: &str = "Övrigt";

/// Keeps the top `max` rows (input must already be ordered largest
/// first) and either sums the rest into one [`OTHER_LABEL`] row or drops
/// them.
#[must_use]
pub fn collapse_top_n(mut rows: Vec<CategoryCount>, max: usize, combine: bool) -> Vec<CategoryCount> {
    if rows.len() <= max {
        return rows;
    }

    let other_sum: i64 = rows[max..].iter().map(|row| row.count).sum();
    rows.truncate(max);

    if combine {
        rows.push(CategoryCount {
            key: OTHER_LABEL.to_string(),
            count: other_sum,
        });
    }

    rows
}

/// Reorders employee-range rows into bucket order (numeric lower bound
/// ascending), keeping the [`OTHER_LABEL`] row last.
pub fn sort_employee_range_rows(rows: &mut [CategoryCount]) {
    rows.sort_by(|a, b| match (a.key == OTHER_LABEL, b.key == OTHER_LABEL) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => compare_employee_ranges(&a.key, &b.key),
    });
}

/// Builds one point per year row, carrying the year label under `year`
/// and the count under `series_key`.
///
/// Strictly one point per input row: a year with no matching events has
/// no row and gets no zero-filled point either.
#[must_use]
pub fn temporal_points(rows: &[YearCount], series_key: &str) -> Vec<ChartDataPoint> {
    rows.iter()
        .map(|row| {
            let mut point = ChartDataPoint::new();
            point.insert("year".to_string(), PointValue::Label(row.year.to_string()));
            point.insert(series_key.to_string(), PointValue::Count(row.count));
            point
        })
        .collect()
}

/// Ranks the categories in a (year, category) result by total count
/// across all years, descending, and returns the top `max` labels.
///
/// Ties keep first-appearance order, so repeated invocations over the
/// same rows produce the same ranking.
#[must_use]
pub fn rank_categories_by_total(rows: &[YearCategoryCount], max: usize) -> Vec<String> {
    let mut totals: Vec<(String, i64)> = Vec::new();

    for row in rows {
        if let Some(entry) = totals.iter_mut().find(|(key, _)| *key == row.category) {
            entry.1 += row.count;
        } else {
            totals.push((row.category.clone(), row.count));
        }
    }

    totals.sort_by(|a, b| b.1.cmp(&a.1));
    totals.truncate(max);
    totals.into_iter().map(|(key, _)| key).collect()
}

/// Builds one data point per distinct year in the rows.
///
/// Each point carries the year label under `year`, every retained
/// category zero-filled, and, when `combine` is set, an [`OTHER_LABEL`]
/// field summing the non-retained categories for that year (present even
/// when the sum is zero).
#[must_use]
pub fn temporal_category_points(
    rows: &[YearCategoryCount],
    retained: &[String],
    combine: bool,
) -> Vec<ChartDataPoint> {
    let mut years: Vec<i32> = Vec::new();
    for row in rows {
        if !years.contains(&row.year) {
            years.push(row.year);
        }
    }

    let mut points = Vec::with_capacity(years.len());

    for year in years {
        let mut point = ChartDataPoint::new();
        point.insert("year".to_string(), PointValue::Label(year.to_string()));
        for category in retained {
            point.insert(category.clone(), PointValue::Count(0));
        }

        let mut other_sum = 0;
        for row in rows.iter().filter(|row| row.year == year) {
            if retained.contains(&row.category) {
                point.insert(row.category.clone(), PointValue::Count(row.count));
            } else {
                other_sum += row.count;
            }
        }

        if combine {
            point.insert(OTHER_LABEL.to_string(), PointValue::Count(other_sum));
        }

        points.push(point);
    }

    points
}

/// Rewrites every count field of every point as a rounded percentage of
/// that point's total, leaving the `dimension` label untouched.
///
/// A point whose fields sum to zero stays all zero instead of dividing
/// by zero.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn normalize_points_to_percent(points: &mut [ChartDataPoint], dimension: &str) {
    for point in points {
        let total: i64 = point
            .iter()
            .filter(|(key, _)| key.as_str() != dimension)
            .filter_map(|(_, value)| match value {
                PointValue::Count(count) => Some(*count),
                PointValue::Label(_) => None,
            })
            .sum();

        for (key, value) in point.iter_mut() {
            if key.as_str() == dimension {
                continue;
            }
            if let PointValue::Count(count) = value {
                *count = if total == 0 {
                    0
                } else {
                    (*count as f64 / total as f64 * 100.0).round() as i64
                };
            }
        }
    }
}

/// Merges inflow and outflow year counts into net-flow points over the
/// union of both year sets, ascending.
///
/// A year present on only one side gets zero for the other, so a year
/// with outflow but no inflow still appears (with a negative net).
#[must_use]
pub fn merge_net_flow(inflow: &[YearCount], outflow: &[YearCount]) -> Vec<ChartDataPoint> {
    let years: BTreeSet<i32> = inflow
        .iter()
        .chain(outflow.iter())
        .map(|row| row.year)
        .collect();

    years
        .into_iter()
        .map(|year| {
            let inflow_count = inflow
                .iter()
                .find(|row| row.year == year)
                .map_or(0, |row| row.count);
            let outflow_count = outflow
                .iter()
                .find(|row| row.year == year)
                .map_or(0, |row| row.count);

            let mut point = ChartDataPoint::new();
            point.insert("year".to_string(), PointValue::Label(year.to_string()));
            point.insert("inflow".to_string(), PointValue::Count(inflow_count));
            point.insert("outflow".to_string(), PointValue::Count(outflow_count));
            point.insert(
                "net".to_string(),
                PointValue::Count(inflow_count - outflow_count),
            );
            point
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category_rows(rows: &[(&str, i64)]) -> Vec<CategoryCount> {
        rows.iter()
            .map(|(key, count)| CategoryCount {
                key: (*key).to_string(),
                count: *count,
            })
            .collect()
    }

    fn count_of(point: &ChartDataPoint, key: &str) -> i64 {
        match point.get(key) {
            Some(PointValue::Count(count)) => *count,
            other => panic!("expected count for {key}, got {other:?}"),
        }
    }

    #[test]
    fn top_n_with_combine_appends_other_bucket() {
        let rows = category_rows(&[("A", 10), ("B", 8), ("C", 5), ("D", 1)]);
        let collapsed = collapse_top_n(rows, 2, true);
        assert_eq!(
            collapsed,
            category_rows(&[("A", 10), ("B", 8), ("Övrigt", 6)])
        );
    }

    #[test]
    fn top_n_without_combine_drops_the_rest() {
        let rows = category_rows(&[("A", 10), ("B", 8), ("C", 5), ("D", 1)]);
        let collapsed = collapse_top_n(rows, 2, false);
        assert_eq!(collapsed, category_rows(&[("A", 10), ("B", 8)]));
    }

    #[test]
    fn top_n_leaves_short_results_untouched() {
        let rows = category_rows(&[("A", 10), ("B", 8)]);
        let collapsed = collapse_top_n(rows.clone(), 5, true);
        assert_eq!(collapsed, rows);
    }

    #[test]
    fn employee_range_rows_sort_by_bucket_with_other_last() {
        let mut rows = category_rows(&[("10-19", 40), ("Övrigt", 9), ("2-4", 25), ("0", 3)]);
        sort_employee_range_rows(&mut rows);
        assert_eq!(
            rows,
            category_rows(&[("0", 3), ("2-4", 25), ("10-19", 40), ("Övrigt", 9)])
        );
    }

    #[test]
    fn temporal_points_carry_year_label_and_series_count() {
        let points = temporal_points(
            &[YearCount {
                year: 2023,
                count: 3,
            }],
            "inflow",
        );
        assert_eq!(points.len(), 1);
        assert_eq!(
            points[0].get("year"),
            Some(&PointValue::Label("2023".to_string()))
        );
        assert_eq!(count_of(&points[0], "inflow"), 3);
    }

    #[test]
    fn temporal_points_omit_absent_years() {
        // A gap between 2023 and 2025 stays a gap, not a zero point.
        let rows = [
            YearCount {
                year: 2023,
                count: 3,
            },
            YearCount {
                year: 2025,
                count: 1,
            },
        ];
        let points = temporal_points(&rows, "outflow");

        assert_eq!(points.len(), 2);
        let years: Vec<_> = points.iter().map(|point| point.get("year")).collect();
        assert!(!years.contains(&Some(&PointValue::Label("2024".to_string()))));
    }

    fn year_category_rows(rows: &[(i32, &str, i64)]) -> Vec<YearCategoryCount> {
        rows.iter()
            .map(|(year, category, count)| YearCategoryCount {
                year: *year,
                category: (*category).to_string(),
                count: *count,
            })
            .collect()
    }

    #[test]
    fn categories_rank_by_total_across_years() {
        let rows = year_category_rows(&[
            (2022, "stockholm", 5),
            (2022, "uppsala", 9),
            (2023, "stockholm", 10),
            (2023, "uppsala", 2),
        ]);
        assert_eq!(
            rank_categories_by_total(&rows, 1),
            vec!["stockholm".to_string()]
        );
    }

    #[test]
    fn points_zero_fill_retained_categories() {
        let rows = year_category_rows(&[(2022, "stockholm", 5), (2023, "uppsala", 2)]);
        let retained = vec!["stockholm".to_string(), "uppsala".to_string()];
        let points = temporal_category_points(&rows, &retained, false);

        assert_eq!(points.len(), 2);
        assert_eq!(count_of(&points[0], "stockholm"), 5);
        assert_eq!(count_of(&points[0], "uppsala"), 0);
        assert_eq!(count_of(&points[1], "stockholm"), 0);
        assert_eq!(count_of(&points[1], "uppsala"), 2);
    }

    #[test]
    fn other_field_is_present_even_when_zero() {
        let rows = year_category_rows(&[(2022, "stockholm", 5)]);
        let retained = vec!["stockholm".to_string()];
        let points = temporal_category_points(&rows, &retained, true);
        assert_eq!(count_of(&points[0], OTHER_LABEL), 0);
    }

    #[test]
    fn non_retained_counts_sum_into_other() {
        let rows = year_category_rows(&[
            (2022, "stockholm", 5),
            (2022, "uppsala", 3),
            (2022, "luleå", 2),
        ]);
        let retained = vec!["stockholm".to_string()];
        let points = temporal_category_points(&rows, &retained, true);
        assert_eq!(count_of(&points[0], OTHER_LABEL), 5);
    }

    #[test]
    fn percent_normalization_rounds_per_point() {
        let rows = year_category_rows(&[(2022, "stockholm", 30), (2022, "other", 10)]);
        let retained = vec!["stockholm".to_string(), "other".to_string()];
        let mut points = temporal_category_points(&rows, &retained, false);
        normalize_points_to_percent(&mut points, "year");

        assert_eq!(count_of(&points[0], "stockholm"), 75);
        assert_eq!(count_of(&points[0], "other"), 25);
    }

    #[test]
    fn percent_normalization_leaves_zero_points_at_zero() {
        let mut point = ChartDataPoint::new();
        point.insert("year".to_string(), PointValue::Label("2022".to_string()));
        point.insert("stockholm".to_string(), PointValue::Count(0));
        point.insert("uppsala".to_string(), PointValue::Count(0));
        let mut points = vec![point];

        normalize_points_to_percent(&mut points, "year");
        assert_eq!(count_of(&points[0], "stockholm"), 0);
        assert_eq!(count_of(&points[0], "uppsala"), 0);
    }

    fn year_rows(rows: &[(i32, i64)]) -> Vec<YearCount> {
        rows.iter()
            .map(|(year, count)| YearCount {
                year: *year,
                count: *count,
            })
            .collect()
    }

    #[test]
    fn net_flow_derives_inflow_minus_outflow() {
        let points = merge_net_flow(&year_rows(&[(2023, 50)]), &year_rows(&[(2023, 30)]));
        assert_eq!(points.len(), 1);
        assert_eq!(count_of(&points[0], "inflow"), 50);
        assert_eq!(count_of(&points[0], "outflow"), 30);
        assert_eq!(count_of(&points[0], "net"), 20);
    }

    #[test]
    fn net_flow_zero_fills_missing_outflow_years() {
        let points = merge_net_flow(&year_rows(&[(2023, 7)]), &[]);
        assert_eq!(count_of(&points[0], "outflow"), 0);
        assert_eq!(count_of(&points[0], "net"), 7);
    }

    #[test]
    fn net_flow_keeps_outflow_only_years() {
        // The union merge must not drop a year that only appears on the
        // outflow side.
        let points = merge_net_flow(&year_rows(&[(2023, 5)]), &year_rows(&[(2022, 4)]));
        assert_eq!(points.len(), 2);
        assert_eq!(
            points[0].get("year"),
            Some(&PointValue::Label("2022".to_string()))
        );
        assert_eq!(count_of(&points[0], "inflow"), 0);
        assert_eq!(count_of(&points[0], "net"), -4);
    }
}
