use std::collections::HashMap;

use crate::core::store::{FieldValue, ListQuery, SortDirection};
use crate::shared::validation::FieldErrors;

/// Query-string key carrying the comma-separated ordering list
pub const ORDERING_PARAM: &str = "ordering";

/// How a filter value from the query string is parsed.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Text,
    /// Integers, including foreign-key ids
    Integer,
    Boolean,
    /// Text limited to a fixed set of choices
    Choice(&'static [&'static str]),
}

/// A field allowed in equality filters.
#[derive(Debug, Clone, Copy)]
pub struct FilterField {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FilterField {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

impl FieldKind {
    pub fn parse(&self, raw: &str) -> Result<FieldValue, String> {
        match self {
            FieldKind::Text => Ok(FieldValue::Text(Some(raw.to_string()))),
            FieldKind::Integer => raw
                .trim()
                .parse::<i64>()
                .map(|v| FieldValue::Int(Some(v)))
                .map_err(|_| "Enter a whole number.".to_string()),
            FieldKind::Boolean => match raw.trim() {
                "true" | "True" | "1" => Ok(FieldValue::Bool(true)),
                "false" | "False" | "0" => Ok(FieldValue::Bool(false)),
                _ => Err("Enter a valid boolean.".to_string()),
            },
            FieldKind::Choice(choices) => {
                if choices.iter().any(|c| *c == raw) {
                    Ok(FieldValue::Text(Some(raw.to_string())))
                } else {
                    Err(format!(
                        "Select a valid choice. {} is not one of the available choices.",
                        raw
                    ))
                }
            }
        }
    }
}

/// Build a list query from raw query-string parameters.
///
/// Only allow-listed keys are read. Unknown keys, unknown ordering fields and empty
/// values are ignored. A malformed value for an allow-listed key is an error.
pub fn parse_list_query(
    filter_fields: &[FilterField],
    ordering_fields: &[&'static str],
    params: &HashMap<String, String>,
) -> Result<ListQuery, FieldErrors> {
    let mut errors = FieldErrors::default();
    let mut query = ListQuery::default();

    for field in filter_fields {
        let Some(raw) = params.get(field.name) else {
            continue;
        };
        if raw.is_empty() {
            continue;
        }
        match field.kind.parse(raw) {
            Ok(value) => query.filters.push((field.name, value)),
            Err(message) => errors.add(field.name, message),
        }
    }

    if let Some(raw) = params.get(ORDERING_PARAM) {
        for term in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let (name, direction) = match term.strip_prefix('-') {
                Some(name) => (name, SortDirection::Desc),
                None => (term, SortDirection::Asc),
            };
            if let Some(column) = ordering_fields.iter().find(|f| **f == name) {
                query.ordering.push((*column, direction));
            }
        }
    }

    errors.into_result().map(|_| query)
}
