use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use sqlx::{postgres::PgRow, FromRow};
use validator::Validate;

use crate::core::store::{Record, Reference, Relation};
use crate::features::auth::model::Caller;
use crate::features::auth::policy::ResourcePolicy;
use crate::features::catalog::query::FilterField;
use crate::shared::validation::FieldErrors;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteAction {
    Create,
    Update,
}

/// Server-side facts about a write, applied after validation.
#[derive(Debug, Clone, Copy)]
pub struct Audit {
    pub action: WriteAction,
    pub caller: Option<i64>,
    pub at: DateTime<Utc>,
}

impl Audit {
    pub fn new(action: WriteAction, caller: &Caller) -> Self {
        Self {
            action,
            caller: caller.account_id(),
            at: Utc::now(),
        }
    }
}

/// Schema and policy binding for one catalog resource.
///
/// The generic controller in [`crate::features::catalog::services`] drives every
/// resource through this trait; implementations only describe columns and rules.
pub trait Resource: Sized + Send + Sync + 'static {
    /// Stored row, also the serialized response shape. Field names match column names.
    type Model: Serialize
        + DeserializeOwned
        + for<'r> FromRow<'r, PgRow>
        + Clone
        + Send
        + Sync
        + Unpin
        + 'static;
    type CreateDto: DeserializeOwned + Validate + Send + 'static;
    type UpdateDto: DeserializeOwned + Validate + Send + 'static;

    const TABLE: &'static str;
    /// URL segment, e.g. `tourist-spots`
    const PATH: &'static str;
    /// Human label used in response messages
    const LABEL: &'static str;
    const POLICY: ResourcePolicy;
    const FILTER_FIELDS: &'static [FilterField];
    const ORDERING_FIELDS: &'static [&'static str];
    const REFERENCES: &'static [Reference] = &[];
    const UNIQUE_TOGETHER: &'static [&'static [&'static str]] = &[];

    fn id(model: &Self::Model) -> i64;

    /// Every writable column of an existing row.
    fn to_record(model: &Self::Model) -> Record;

    /// Required-ness and defaults for a new row. Range and length checks come from `Validate`.
    fn from_create(dto: Self::CreateDto) -> Result<Record, FieldErrors>;

    /// Overwrite only the columns the client supplied.
    fn apply_update(record: &mut Record, dto: Self::UpdateDto);

    /// Overwrite server-owned columns. Runs after validation on every write.
    fn stamp(_record: &mut Record, _audit: &Audit) {}

    fn relations() -> Vec<Relation> {
        Self::REFERENCES
            .iter()
            .map(|reference| Relation {
                table: Self::TABLE,
                reference: *reference,
            })
            .collect()
    }
}

/// Field errors for a violated uniqueness rule.
pub fn unique_violation<R: Resource>(columns: &[&str]) -> FieldErrors {
    let mut errors = FieldErrors::default();
    match columns {
        [column] => errors.add(
            column,
            format!(
                "{} with this {} already exists.",
                R::LABEL.to_lowercase(),
                column.replace('_', " ")
            ),
        ),
        _ => errors.add(
            "non_field_errors",
            format!("The fields {} must make a unique set.", columns.join(", ")),
        ),
    }
    errors
}
