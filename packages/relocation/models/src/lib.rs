#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Relocation domain vocabulary shared across the flyttstat system.
//!
//! Defines the flow measures (inflow/outflow), the discrete dimensions a
//! chart can break a measure down by, the filter predicates applied to the
//! relocation dataset, and the custom collation for employee-count range
//! buckets. All enums map to concrete `relocation` table columns here, so
//! an invalid dimension name is rejected when a configuration is parsed
//! rather than surfacing as a bad column reference at query time.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Direction of a relocation flow relative to the area of interest.
///
/// `Inflow` counts events where the area is the destination, `Outflow`
/// events where the area is the origin.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Measure {
    /// Companies relocating into the area of interest.
    Inflow,
    /// Companies relocating out of the area of interest.
    Outflow,
}

impl Measure {
    /// The location-set column an area filter for this measure matches
    /// against: the destination for inflow, the origin for outflow.
    #[must_use]
    pub const fn location_column(self) -> &'static str {
        match self {
            Self::Inflow => "to_location",
            Self::Outflow => "from_location",
        }
    }
}

/// A non-temporal dimension a measure can be broken down by.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum CategoryDimension {
    /// Employee-count range bucket (e.g. `"10-19"`).
    EmployeeRange,
    /// Industry cluster.
    IndustryCluster,
    /// Company type (public/private/other sector).
    CompanyType,
    /// Postal-area granularity of the counterpart location.
    PostalArea,
    /// Municipality granularity of the counterpart location.
    Municipality,
    /// County granularity of the counterpart location.
    County,
}

impl CategoryDimension {
    /// Resolves this dimension to a `relocation` table column.
    ///
    /// Location granularities break down the *counterpart* side of the
    /// flow: an inflow chart shows where companies came from, so it
    /// groups by the `from_*` column, and vice versa for outflow. The
    /// non-location dimensions are single columns regardless of measure.
    #[must_use]
    pub const fn column(self, measure: Measure) -> &'static str {
        match self {
            Self::EmployeeRange => "employee_range",
            Self::IndustryCluster => "industry_cluster",
            Self::CompanyType => "company_type",
            Self::PostalArea => match measure {
                Measure::Inflow => "from_postal_area",
                Measure::Outflow => "to_postal_area",
            },
            Self::Municipality => match measure {
                Measure::Inflow => "from_municipality",
                Measure::Outflow => "to_municipality",
            },
            Self::County => match measure {
                Measure::Inflow => "from_county",
                Measure::Outflow => "to_county",
            },
        }
    }
}

/// A dimension that a report-level filter predicate can constrain.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum FilterDimension {
    /// Relocation year.
    RelocationYear,
    /// Employee-count range bucket.
    EmployeeRange,
    /// Company type.
    CompanyType,
    /// Industry cluster.
    IndustryCluster,
}

impl FilterDimension {
    /// The `relocation` table column this dimension filters on.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::RelocationYear => "relocation_year",
            Self::EmployeeRange => "employee_range",
            Self::CompanyType => "company_type",
            Self::IndustryCluster => "industry_cluster",
        }
    }
}

/// A single filter value. Years are numeric, everything else is text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Numeric value (relocation years).
    Int(i64),
    /// Text value (ranges, types, clusters).
    Text(String),
}

/// One inclusion predicate over a filter dimension.
///
/// Predicates in a filter list are combined with logical AND. An empty
/// `value` list means the dimension is unconstrained and the predicate
/// is skipped entirely, never treated as "match nothing".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterPredicate {
    /// Dimension the predicate constrains.
    pub key: FilterDimension,
    /// Set-membership operator. Only `in` exists today.
    pub operator: FilterOperator,
    /// Values to match; the row passes if its dimension value is any of
    /// these.
    pub value: Vec<FilterValue>,
}

/// Operator of a [`FilterPredicate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    /// Set membership.
    In,
}

/// Parses the numeric lower bound from an employee-range bucket label.
///
/// `"10-19"` yields `10`, `"500+"` yields `500`, a bare `"0"` yields `0`.
/// Labels without a leading number yield `None`.
#[must_use]
pub fn employee_range_lower_bound(label: &str) -> Option<i64> {
    let digits: String = label
        .trim()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Compares two employee-range bucket labels by numeric lower bound.
///
/// Lexical order misorders the buckets (`"10-19"` would sort before
/// `"2-4"`), so ordering parses the leading number instead. Labels
/// without a numeric prefix sort last; ties fall back to lexical order.
#[must_use]
pub fn compare_employee_ranges(a: &str, b: &str) -> std::cmp::Ordering {
    match (employee_range_lower_bound(a), employee_range_lower_bound(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_resolves_location_column() {
        assert_eq!(Measure::Inflow.location_column(), "to_location");
        assert_eq!(Measure::Outflow.location_column(), "from_location");
    }

    #[test]
    fn location_dimension_resolves_counterpart_side() {
        assert_eq!(
            CategoryDimension::Municipality.column(Measure::Inflow),
            "from_municipality"
        );
        assert_eq!(
            CategoryDimension::Municipality.column(Measure::Outflow),
            "to_municipality"
        );
        assert_eq!(
            CategoryDimension::EmployeeRange.column(Measure::Inflow),
            "employee_range"
        );
    }

    #[test]
    fn dimension_names_are_camel_case() {
        assert_eq!(CategoryDimension::EmployeeRange.to_string(), "employeeRange");
        assert_eq!(
            "industryCluster".parse::<CategoryDimension>().unwrap(),
            CategoryDimension::IndustryCluster
        );
    }

    #[test]
    fn unknown_filter_dimension_is_rejected() {
        let json = r#"{"key":"favoriteColor","operator":"in","value":["blue"]}"#;
        assert!(serde_json::from_str::<FilterPredicate>(json).is_err());
    }

    #[test]
    fn filter_predicate_round_trips() {
        let json = r#"{"key":"relocationYear","operator":"in","value":[2023,2024]}"#;
        let predicate: FilterPredicate = serde_json::from_str(json).unwrap();
        assert_eq!(predicate.key, FilterDimension::RelocationYear);
        assert_eq!(
            predicate.value,
            vec![FilterValue::Int(2023), FilterValue::Int(2024)]
        );
    }

    #[test]
    fn lower_bound_parses_leading_digits() {
        assert_eq!(employee_range_lower_bound("10-19"), Some(10));
        assert_eq!(employee_range_lower_bound("500+"), Some(500));
        assert_eq!(employee_range_lower_bound("0"), Some(0));
        assert_eq!(employee_range_lower_bound("okänt"), None);
    }

    #[test]
    fn collation_orders_by_numeric_prefix_not_lexically() {
        // Lexical order would put "10-19" before "2-4".
        let mut buckets = vec!["10-19", "2-4", "0", "5-9", "1-4"];
        buckets.sort_by(|a, b| compare_employee_ranges(a, b));
        assert_eq!(buckets, vec!["0", "1-4", "2-4", "5-9", "10-19"]);
    }

    #[test]
    fn collation_sorts_unparseable_labels_last() {
        let mut buckets = vec!["okänt", "1-4"];
        buckets.sort_by(|a, b| compare_employee_ranges(a, b));
        assert_eq!(buckets, vec!["1-4", "okänt"]);
    }
}
