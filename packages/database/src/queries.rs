//! Aggregate queries over the relocation dataset.
//!
//! All chart data comes from group-by-count queries built here: a shared
//! WHERE-fragment builder translates the dimensional filters and the
//! optional area predicate into numbered Postgres placeholders, and one
//! query function per grouping shape (year, category, year+category)
//! executes the aggregation. Rows for keys with no matching events are
//! never synthesized; callers that need dense series fill gaps
//! themselves.

use flyttstat_database_models::{CategoryCount, FilterOptions, YearCategoryCount, YearCount};
use flyttstat_models::{
    FilterDimension, FilterPredicate, FilterValue, Measure, compare_employee_ranges,
};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};

use crate::DbError;

/// Converts a filter value to a database parameter.
///
/// Relocation years are stored as `integer`, so numeric values on that
/// dimension bind as `Int32`; everything else binds as text. A year
/// outside the `i32` range binds as `i32::MIN`, which matches no stored
/// year, instead of wrapping into a year that exists.
fn to_database_value(dimension: FilterDimension, value: &FilterValue) -> DatabaseValue {
    match value {
        FilterValue::Int(v) => match dimension {
            FilterDimension::RelocationYear => {
                DatabaseValue::Int32(i32::try_from(*v).unwrap_or(i32::MIN))
            }
            _ => DatabaseValue::Int64(*v),
        },
        FilterValue::Text(s) => DatabaseValue::String(s.clone()),
    }
}

/// Builds WHERE fragments and the parameter list for the dimensional
/// filters plus the optional area predicate.
///
/// Each predicate with a non-empty value list becomes one
/// `column IN ($n, ...)` fragment; an empty value list means the
/// dimension is unconstrained and emits nothing. The area becomes a
/// `location_column @> ARRAY[$n]` containment check against the
/// measure-dependent location array, lower-cased to match stored
/// casing. Containment (rather than `= ANY(...)`) is what the GIN
/// indexes on the location arrays can serve.
/// Returns `(fragments, params, next_param_index)`.
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn push_filter_fragments(
    filters: &[FilterPredicate],
    area: Option<&str>,
    measure: Measure,
    start_idx: u32,
) -> (Vec<String>, Vec<DatabaseValue>, u32) {
    let mut frags = Vec::new();
    let mut params: Vec<DatabaseValue> = Vec::new();
    let mut idx = start_idx;

    for predicate in filters {
        if predicate.value.is_empty() {
            continue;
        }

        let placeholders: Vec<String> = (0..predicate.value.len() as u32)
            .map(|offset| format!("${}", idx + offset))
            .collect();
        frags.push(format!(
            "r.{} IN ({})",
            predicate.key.column(),
            placeholders.join(", ")
        ));
        for value in &predicate.value {
            params.push(to_database_value(predicate.key, value));
        }
        idx += predicate.value.len() as u32;
    }

    if let Some(area) = area {
        frags.push(format!("r.{} @> ARRAY[${idx}]", measure.location_column()));
        params.push(DatabaseValue::String(area.to_lowercase()));
        idx += 1;
    }

    (frags, params, idx)
}

fn where_clause(frags: &[String]) -> String {
    if frags.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", frags.join(" AND "))
    }
}

/// Counts relocation events per year, ordered chronologically.
///
/// # Errors
///
/// Returns [`DbError`] if the database query fails.
pub async fn count_by_year(
    db: &dyn Database,
    filters: &[FilterPredicate],
    area: Option<&str>,
    measure: Measure,
) -> Result<Vec<YearCount>, DbError> {
    let (frags, params, _) = push_filter_fragments(filters, area, measure, 1);
    let wc = where_clause(&frags);

    let sql = format!(
        "SELECT r.relocation_year as year, COUNT(*) as cnt
         FROM relocation r
         {wc}
         GROUP BY r.relocation_year
         ORDER BY year"
    );

    let rows = db.query_raw_params(&sql, &params).await?;

    Ok(rows
        .iter()
        .map(|row| YearCount {
            year: row.to_value("year").unwrap_or(0),
            count: row.to_value("cnt").unwrap_or(0),
        })
        .collect())
}

/// Counts relocation events per value of `column`, largest group first.
///
/// `NULL` category values are excluded; a row that lacks the dimension
/// cannot be attributed to any bucket. Ties order by key so repeated
/// invocations return identical row order.
///
/// # Errors
///
/// Returns [`DbError`] if the database query fails.
pub async fn count_by_category(
    db: &dyn Database,
    filters: &[FilterPredicate],
    area: Option<&str>,
    measure: Measure,
    column: &str,
) -> Result<Vec<CategoryCount>, DbError> {
    let (mut frags, params, _) = push_filter_fragments(filters, area, measure, 1);
    frags.push(format!("r.{column} IS NOT NULL"));
    let wc = where_clause(&frags);

    let sql = format!(
        "SELECT r.{column} as key, COUNT(*) as cnt
         FROM relocation r
         {wc}
         GROUP BY r.{column}
         ORDER BY cnt DESC, key"
    );

    let rows = db.query_raw_params(&sql, &params).await?;

    Ok(rows
        .iter()
        .map(|row| CategoryCount {
            key: row.to_value("key").unwrap_or_default(),
            count: row.to_value("cnt").unwrap_or(0),
        })
        .collect())
}

/// Counts relocation events per (year, value of `column`) pair, ordered
/// by year ascending.
///
/// # Errors
///
/// Returns [`DbError`] if the database query fails.
pub async fn count_by_year_and_category(
    db: &dyn Database,
    filters: &[FilterPredicate],
    area: Option<&str>,
    measure: Measure,
    column: &str,
) -> Result<Vec<YearCategoryCount>, DbError> {
    let (mut frags, params, _) = push_filter_fragments(filters, area, measure, 1);
    frags.push(format!("r.{column} IS NOT NULL"));
    let wc = where_clause(&frags);

    let sql = format!(
        "SELECT r.relocation_year as year, r.{column} as category, COUNT(*) as cnt
         FROM relocation r
         {wc}
         GROUP BY r.relocation_year, r.{column}
         ORDER BY year, category"
    );

    let rows = db.query_raw_params(&sql, &params).await?;

    Ok(rows
        .iter()
        .map(|row| YearCategoryCount {
            year: row.to_value("year").unwrap_or(0),
            category: row.to_value("category").unwrap_or_default(),
            count: row.to_value("cnt").unwrap_or(0),
        })
        .collect())
}

/// Returns the distinct values available for each filter dimension, for
/// populating the filter selector.
///
/// Employee ranges come back in bucket order (numeric lower bound), not
/// the lexical order the database would give.
///
/// # Errors
///
/// Returns [`DbError`] if any database query fails.
pub async fn filter_options(db: &dyn Database) -> Result<FilterOptions, DbError> {
    let year_rows = db
        .query_raw_params(
            "SELECT DISTINCT r.relocation_year as v FROM relocation r
             WHERE r.relocation_year IS NOT NULL ORDER BY v",
            &[],
        )
        .await?;
    let years: Vec<i32> = year_rows
        .iter()
        .map(|row| row.to_value("v").unwrap_or(0))
        .collect();

    let mut employee_ranges = distinct_text(db, "employee_range").await?;
    employee_ranges.sort_by(|a, b| compare_employee_ranges(a, b));

    let company_types = distinct_text(db, "company_type").await?;
    let industry_clusters = distinct_text(db, "industry_cluster").await?;

    Ok(FilterOptions {
        years,
        employee_ranges,
        company_types,
        industry_clusters,
    })
}

async fn distinct_text(db: &dyn Database, column: &str) -> Result<Vec<String>, DbError> {
    let sql = format!(
        "SELECT DISTINCT r.{column} as v FROM relocation r
         WHERE r.{column} IS NOT NULL ORDER BY v"
    );
    let rows = db.query_raw_params(&sql, &[]).await?;
    Ok(rows
        .iter()
        .map(|row| row.to_value("v").unwrap_or_default())
        .collect())
}

#[cfg(test)]
mod tests {
    use flyttstat_models::FilterOperator;

    use super::*;

    fn in_predicate(key: FilterDimension, value: Vec<FilterValue>) -> FilterPredicate {
        FilterPredicate {
            key,
            operator: FilterOperator::In,
            value,
        }
    }

    #[test]
    fn no_filters_and_no_area_emit_nothing() {
        let (frags, params, idx) = push_filter_fragments(&[], None, Measure::Inflow, 1);
        assert!(frags.is_empty());
        assert!(params.is_empty());
        assert_eq!(idx, 1);
        assert_eq!(where_clause(&frags), "");
    }

    #[test]
    fn empty_value_list_means_unconstrained() {
        let filters = vec![in_predicate(FilterDimension::CompanyType, vec![])];
        let (frags, params, _) = push_filter_fragments(&filters, None, Measure::Inflow, 1);
        assert!(frags.is_empty());
        assert!(params.is_empty());
    }

    #[test]
    fn predicates_get_sequential_placeholders() {
        let filters = vec![
            in_predicate(
                FilterDimension::RelocationYear,
                vec![FilterValue::Int(2023), FilterValue::Int(2024)],
            ),
            in_predicate(
                FilterDimension::IndustryCluster,
                vec![FilterValue::Text("IT".to_string())],
            ),
        ];
        let (frags, params, idx) =
            push_filter_fragments(&filters, Some("Stockholm"), Measure::Outflow, 1);

        assert_eq!(
            frags,
            vec![
                "r.relocation_year IN ($1, $2)".to_string(),
                "r.industry_cluster IN ($3)".to_string(),
                "r.from_location @> ARRAY[$4]".to_string(),
            ]
        );
        assert_eq!(params.len(), 4);
        assert_eq!(idx, 5);
    }

    #[test]
    fn area_is_lower_cased_before_comparison() {
        let (_, params, _) = push_filter_fragments(&[], Some("Stockholm"), Measure::Inflow, 1);
        assert_eq!(
            params,
            vec![DatabaseValue::String("stockholm".to_string())]
        );
    }

    #[test]
    fn area_column_follows_measure() {
        let (inflow_frags, _, _) = push_filter_fragments(&[], Some("luleå"), Measure::Inflow, 1);
        let (outflow_frags, _, _) = push_filter_fragments(&[], Some("luleå"), Measure::Outflow, 1);
        assert_eq!(inflow_frags, vec!["r.to_location @> ARRAY[$1]".to_string()]);
        assert_eq!(outflow_frags, vec!["r.from_location @> ARRAY[$1]".to_string()]);
    }

    #[test]
    fn year_values_bind_as_int32() {
        let filters = vec![in_predicate(
            FilterDimension::RelocationYear,
            vec![FilterValue::Int(2023)],
        )];
        let (_, params, _) = push_filter_fragments(&filters, None, Measure::Inflow, 1);
        assert_eq!(params, vec![DatabaseValue::Int32(2023)]);
    }

    #[test]
    fn out_of_range_year_matches_nothing() {
        let filters = vec![in_predicate(
            FilterDimension::RelocationYear,
            vec![FilterValue::Int(i64::from(i32::MAX) + 2023)],
        )];
        let (_, params, _) = push_filter_fragments(&filters, None, Measure::Inflow, 1);
        assert_eq!(params, vec![DatabaseValue::Int32(i32::MIN)]);
    }

    #[test]
    fn where_clause_joins_with_and() {
        let frags = vec!["a = $1".to_string(), "b = $2".to_string()];
        assert_eq!(where_clause(&frags), " WHERE a = $1 AND b = $2");
    }
}
