// src/api/query.rs
//! Filter and sort builders for database queries.
//!
//! All constructors are pure. Operators and directions are closed enums
//! parsed from their Notion names, so a typo fails before any request.

use crate::constants::NOTION_API_PAGE_SIZE;
use crate::types::ValidationError;
use serde::ser::SerializeMap;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::str::FromStr;

macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident, $field:literal, $expected:literal, { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    _ => Err(ValidationError::InvalidChoice {
                        field: $field,
                        value: s.to_string(),
                        expected: $expected,
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }
    };
}

wire_enum!(
    /// Logic joining the conditions of a compound filter.
    FilterOperator, "operator", "'and' or 'or'", {
        And => "and",
        Or => "or",
    }
);

wire_enum!(
    SortDirection, "direction", "'ascending' or 'descending'", {
        Ascending => "ascending",
        Descending => "descending",
    }
);

wire_enum!(
    /// Date conditions. Relative ranges such as `past_week` take no value.
    DateCondition, "date condition", "a Notion date filter condition", {
        Equals => "equals",
        Before => "before",
        After => "after",
        OnOrBefore => "on_or_before",
        OnOrAfter => "on_or_after",
        IsEmpty => "is_empty",
        IsNotEmpty => "is_not_empty",
        PastWeek => "past_week",
        PastMonth => "past_month",
        PastYear => "past_year",
        NextWeek => "next_week",
        NextMonth => "next_month",
        NextYear => "next_year",
    }
);

wire_enum!(
    TextCondition, "text condition", "a Notion text filter condition", {
        Equals => "equals",
        DoesNotEqual => "does_not_equal",
        Contains => "contains",
        DoesNotContain => "does_not_contain",
        StartsWith => "starts_with",
        EndsWith => "ends_with",
    }
);

wire_enum!(
    NumberCondition, "number condition", "a Notion number filter condition", {
        Equals => "equals",
        DoesNotEqual => "does_not_equal",
        GreaterThan => "greater_than",
        LessThan => "less_than",
        GreaterThanOrEqualTo => "greater_than_or_equal_to",
        LessThanOrEqualTo => "less_than_or_equal_to",
    }
);

impl Default for SortDirection {
    fn default() -> Self {
        SortDirection::Ascending
    }
}

/// A database query filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `{"and": [...]}` or `{"or": [...]}`.
    Compound {
        operator: FilterOperator,
        conditions: Vec<Filter>,
    },
    /// `{"property": name, "<kind>": {"<condition>": value}}`; the property
    /// is omitted for title search.
    Condition {
        property: Option<String>,
        kind: &'static str,
        condition: &'static str,
        value: Value,
    },
    /// A filter object passed through unchanged.
    Raw(Value),
}

impl Serialize for Filter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Filter::Compound {
                operator,
                conditions,
            } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(operator.as_str(), conditions)?;
                map.end()
            }
            Filter::Condition {
                property,
                kind,
                condition,
                value,
            } => {
                let mut map = serializer.serialize_map(None)?;
                if let Some(property) = property {
                    map.serialize_entry("property", property)?;
                }
                let mut inner = Map::new();
                inner.insert(condition.to_string(), value.clone());
                map.serialize_entry(kind, &inner)?;
                map.end()
            }
            Filter::Raw(value) => value.serialize(serializer),
        }
    }
}

/// Combines conditions under `operator` (`and` or `or`).
pub fn create_filter(conditions: Vec<Filter>, operator: &str) -> Result<Filter, ValidationError> {
    Ok(Filter::Compound {
        operator: operator.parse()?,
        conditions,
    })
}

/// A date condition on `property`.
///
/// `equals`, `before`, `after`, `on_or_before` and `on_or_after` need an
/// ISO 8601 `value`. `is_empty` and `is_not_empty` send `true`; relative
/// ranges send `{}`. A value given to those is ignored.
pub fn create_date_filter(
    property: &str,
    condition: DateCondition,
    value: Option<&str>,
) -> Result<Filter, ValidationError> {
    use DateCondition::*;
    let value = match condition {
        Equals | Before | After | OnOrBefore | OnOrAfter => {
            json!(value.ok_or(ValidationError::EmptyField("date filter value"))?)
        }
        IsEmpty | IsNotEmpty => Value::Bool(true),
        PastWeek | PastMonth | PastYear | NextWeek | NextMonth | NextYear => json!({}),
    };
    Ok(Filter::Condition {
        property: Some(property.to_string()),
        kind: "date",
        condition: condition.as_str(),
        value,
    })
}

/// A text condition on a rich text `property`.
pub fn create_text_filter(property: &str, condition: TextCondition, value: &str) -> Filter {
    Filter::Condition {
        property: Some(property.to_string()),
        kind: "rich_text",
        condition: condition.as_str(),
        value: json!(value),
    }
}

pub fn create_number_filter(property: &str, condition: NumberCondition, value: f64) -> Filter {
    Filter::Condition {
        property: Some(property.to_string()),
        kind: "number",
        condition: condition.as_str(),
        value: json!(value),
    }
}

/// Matches rows whose `property` contains `query`, or whose title does when
/// no property is given.
pub fn create_search_filter(query: &str, property: Option<&str>) -> Filter {
    match property {
        Some(property) => Filter::Condition {
            property: Some(property.to_string()),
            kind: "rich_text",
            condition: "contains",
            value: json!(query),
        },
        None => Filter::Condition {
            property: None,
            kind: "title",
            condition: "contains",
            value: json!(query),
        },
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sort {
    pub property: String,
    pub direction: SortDirection,
}

pub fn create_sort(property: &str, direction: &str) -> Result<Sort, ValidationError> {
    Ok(Sort {
        property: property.to_string(),
        direction: direction.parse()?,
    })
}

/// Body of a database query. Unset fields are left out of the request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatabaseQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sorts: Vec<Sort>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,
    pub page_size: u32,
}

impl Default for DatabaseQuery {
    fn default() -> Self {
        Self {
            filter: None,
            sorts: Vec::new(),
            start_cursor: None,
            page_size: NOTION_API_PAGE_SIZE,
        }
    }
}

impl DatabaseQuery {
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sorts.push(sort);
        self
    }

    pub fn starting_at(mut self, cursor: Option<String>) -> Self {
        self.start_cursor = cursor;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn compound_filter_rejects_unknown_operator() {
        let err = create_filter(vec![], "xor").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value for operator: xor (expected 'and' or 'or')"
        );
    }

    #[test]
    fn compound_filter_shape() {
        let filter = create_filter(
            vec![
                create_number_filter("Points", NumberCondition::GreaterThan, 3.5),
                create_text_filter("Notes", TextCondition::Contains, "urgent"),
            ],
            "or",
        )
        .unwrap();
        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({"or": [
                {"property": "Points", "number": {"greater_than": 3.5}},
                {"property": "Notes", "rich_text": {"contains": "urgent"}}
            ]})
        );
    }

    #[test]
    fn date_filter_values_follow_condition() {
        let on = create_date_filter("Due Date", DateCondition::OnOrBefore, Some("2024-06-01"))
            .unwrap();
        assert_eq!(
            serde_json::to_value(&on).unwrap(),
            json!({"property": "Due Date", "date": {"on_or_before": "2024-06-01"}})
        );

        let empty = create_date_filter("Due Date", DateCondition::IsEmpty, None).unwrap();
        assert_eq!(
            serde_json::to_value(&empty).unwrap()["date"],
            json!({"is_empty": true})
        );

        let week = create_date_filter("Due Date", DateCondition::PastWeek, None).unwrap();
        assert_eq!(serde_json::to_value(&week).unwrap()["date"], json!({"past_week": {}}));

        assert_eq!(
            create_date_filter("Due Date", DateCondition::Before, None).unwrap_err(),
            ValidationError::EmptyField("date filter value")
        );
    }

    #[test]
    fn search_filter_targets_property_or_title() {
        assert_eq!(
            serde_json::to_value(create_search_filter("milk", Some("Task"))).unwrap(),
            json!({"property": "Task", "rich_text": {"contains": "milk"}})
        );
        assert_eq!(
            serde_json::to_value(create_search_filter("milk", None)).unwrap(),
            json!({"title": {"contains": "milk"}})
        );
    }

    #[test]
    fn sort_direction_is_validated() {
        assert_eq!(
            serde_json::to_value(create_sort("Due Date", "descending").unwrap()).unwrap(),
            json!({"property": "Due Date", "direction": "descending"})
        );
        assert!(matches!(
            create_sort("Due Date", "up"),
            Err(ValidationError::InvalidChoice { field: "direction", .. })
        ));
    }

    #[test]
    fn query_body_only_has_supplied_fields() {
        assert_eq!(
            serde_json::to_value(DatabaseQuery::default()).unwrap(),
            json!({"page_size": 100})
        );
        let query = DatabaseQuery::default()
            .with_sort(create_sort("Task", "ascending").unwrap())
            .starting_at(Some("c".to_string()))
            .with_page_size(10);
        assert_eq!(
            serde_json::to_value(query).unwrap(),
            json!({"sorts": [{"property": "Task", "direction": "ascending"}],
                   "start_cursor": "c", "page_size": 10})
        );
    }

    #[test]
    fn condition_names_parse() {
        assert_eq!("next_month".parse::<DateCondition>().unwrap(), DateCondition::NextMonth);
        assert!("someday".parse::<DateCondition>().is_err());
    }
}
