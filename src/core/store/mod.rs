//! Data-access layer.
//!
//! Controllers never talk to a database directly. They go through the traits below,
//! which have two implementations:
//! - [`postgres::PgStore`]: the production backend (sqlx `PgPool`)
//! - [`memory::MemoryStore`]: process-local maps, used by tests and `STORE_BACKEND=memory`
//!
//! Rows cross the seam as typed models on the way out and as a column-ordered [`Record`]
//! on the way in, so both backends share one description of every writable column.

use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::core::error::Result;
use crate::features::auth::model::{Account, AuthToken, NewAccount};
use crate::features::catalog::resource::Resource;

pub mod memory;
pub mod postgres;

/// A single typed column value.
///
/// Every variant except `Bool` carries an `Option` so a SQL NULL keeps its column type
/// when bound as a query parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(Option<String>),
    Int(Option<i64>),
    Float(Option<f64>),
    Bool(bool),
    Decimal(Option<Decimal>),
    Timestamp(Option<DateTime<Utc>>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        match self {
            FieldValue::Text(v) => v.is_none(),
            FieldValue::Int(v) => v.is_none(),
            FieldValue::Float(v) => v.is_none(),
            FieldValue::Bool(_) => false,
            FieldValue::Decimal(v) => v.is_none(),
            FieldValue::Timestamp(v) => v.is_none(),
        }
    }

    /// Integer payload, used for foreign-key checks.
    pub fn as_id(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => *v,
            _ => None,
        }
    }

    /// JSON rendering matching what the row models deserialize from.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            FieldValue::Text(v) => v.clone().map(Value::String).unwrap_or(Value::Null),
            FieldValue::Int(v) => v.map(Value::from).unwrap_or(Value::Null),
            FieldValue::Float(v) => v.map(Value::from).unwrap_or(Value::Null),
            FieldValue::Bool(v) => Value::Bool(*v),
            FieldValue::Decimal(v) => v
                .map(|d| Value::String(d.to_string()))
                .unwrap_or(Value::Null),
            FieldValue::Timestamp(v) => v
                .map(|t| Value::String(t.to_rfc3339()))
                .unwrap_or(Value::Null),
        }
    }

    /// Ascending order with NULLs last, as Postgres sorts.
    pub fn compare(&self, other: &FieldValue) -> Ordering {
        fn nulls_last<T>(a: &Option<T>, b: &Option<T>, cmp: impl Fn(&T, &T) -> Ordering) -> Ordering {
            match (a, b) {
                (Some(a), Some(b)) => cmp(a, b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        }

        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => nulls_last(a, b, |a, b| a.cmp(b)),
            (FieldValue::Int(a), FieldValue::Int(b)) => nulls_last(a, b, |a, b| a.cmp(b)),
            (FieldValue::Float(a), FieldValue::Float(b)) => {
                nulls_last(a, b, |a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
            }
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a.cmp(b),
            (FieldValue::Decimal(a), FieldValue::Decimal(b)) => nulls_last(a, b, |a, b| a.cmp(b)),
            (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => {
                nulls_last(a, b, |a, b| a.cmp(b))
            }
            _ => Ordering::Equal,
        }
    }
}

/// Writable columns of one row, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record(Vec<(&'static str, FieldValue)>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, column: &'static str, value: FieldValue) -> Self {
        self.set(column, value);
        self
    }

    /// Insert or overwrite a column.
    pub fn set(&mut self, column: &'static str, value: FieldValue) {
        match self.0.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = value,
            None => self.0.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.0.iter().find(|(c, _)| *c == column).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(&'static str, FieldValue)> {
        self.0.iter()
    }
}

/// What happens to referencing rows when the referenced row is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDelete {
    Cascade,
    SetNull,
}

/// A foreign-key column declared by a resource.
#[derive(Debug, Clone, Copy)]
pub struct Reference {
    pub column: &'static str,
    pub target: &'static str,
    pub on_delete: OnDelete,
}

/// A reference together with the table that owns the column.
#[derive(Debug, Clone, Copy)]
pub struct Relation {
    pub table: &'static str,
    pub reference: Reference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Equality filters and ordering for a list query. Column names are always taken from
/// a resource's allow-lists, never from raw client input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub filters: Vec<(&'static str, FieldValue)>,
    pub ordering: Vec<(&'static str, SortDirection)>,
}

#[async_trait]
pub trait Repository<R: Resource>: Send + Sync {
    /// Matching rows, ordered by `query.ordering` then by id.
    async fn list(&self, query: &ListQuery) -> Result<Vec<R::Model>>;
    async fn find(&self, id: i64) -> Result<Option<R::Model>>;
    async fn insert(&self, record: &Record) -> Result<R::Model>;
    /// `None` when no row has this id.
    async fn update(&self, id: i64, record: &Record) -> Result<Option<R::Model>>;
    /// `false` when no row has this id.
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// Cross-table checks used while validating writes.
#[async_trait]
pub trait Lookup: Send + Sync {
    async fn exists(&self, table: &'static str, id: i64) -> Result<bool>;
    /// Whether another row (other than `exclude_id`) already holds all of `criteria`.
    async fn is_taken(
        &self,
        table: &'static str,
        criteria: &[(&'static str, FieldValue)],
        exclude_id: Option<i64>,
    ) -> Result<bool>;
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn create_account(&self, account: NewAccount) -> Result<Account>;
    async fn find_account_by_username(&self, username: &str) -> Result<Option<Account>>;
    async fn username_taken(&self, username: &str) -> Result<bool>;
    async fn email_taken(&self, email: &str) -> Result<bool>;
    async fn record_login(&self, account_id: i64, at: DateTime<Utc>) -> Result<()>;
    async fn find_token_for_account(&self, account_id: i64) -> Result<Option<AuthToken>>;
    /// Insert the token, replacing any token already bound to the same account.
    async fn save_token(&self, token: &AuthToken) -> Result<()>;
    async fn find_account_by_token(&self, key: &str) -> Result<Option<(Account, AuthToken)>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_set_overwrites_in_place() {
        let mut record = Record::new()
            .with("name", FieldValue::Text(Some("Bali".into())))
            .with("population", FieldValue::Int(None));
        record.set("name", FieldValue::Text(Some("Jawa Barat".into())));

        let columns: Vec<_> = record.iter().map(|(c, _)| *c).collect();
        assert_eq!(columns, vec!["name", "population"]);
        assert_eq!(
            record.get("name"),
            Some(&FieldValue::Text(Some("Jawa Barat".into())))
        );
    }

    #[test]
    fn test_compare_sorts_nulls_last() {
        let some = FieldValue::Int(Some(1));
        let none = FieldValue::Int(None);
        assert_eq!(some.compare(&none), Ordering::Less);
        assert_eq!(none.compare(&some), Ordering::Greater);
    }

    #[test]
    fn test_decimal_renders_as_string() {
        let value = FieldValue::Decimal(Some(Decimal::new(1250, 2)));
        assert_eq!(value.to_json(), serde_json::json!("12.50"));
    }
}
