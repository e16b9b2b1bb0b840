use std::collections::HashMap;
use std::sync::Arc;

use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::store::{FieldValue, ListQuery, Lookup, Record, Repository};
use crate::features::auth::model::Caller;
use crate::features::catalog::query::parse_list_query;
use crate::features::catalog::resource::{unique_violation, Audit, Resource, WriteAction};
use crate::shared::constants::{MSG_ADMIN_ONLY, MSG_PERMISSION_DENIED};
use crate::shared::validation::FieldErrors;

/// CRUD and filtering for one resource type, driven entirely by its [`Resource`] binding.
pub struct ResourceService<R: Resource> {
    repo: Arc<dyn Repository<R>>,
    lookup: Arc<dyn Lookup>,
}

impl<R: Resource> ResourceService<R> {
    pub fn new(repo: Arc<dyn Repository<R>>, lookup: Arc<dyn Lookup>) -> Self {
        Self { repo, lookup }
    }

    pub fn not_found() -> AppError {
        AppError::NotFound(format!("{} not found", R::LABEL))
    }

    /// All rows, ordered by id
    pub async fn list(&self, caller: &Caller) -> Result<Vec<R::Model>> {
        R::POLICY.read.enforce(caller, MSG_PERMISSION_DENIED)?;
        self.repo.list(&ListQuery::default()).await
    }

    pub async fn get(&self, caller: &Caller, id: i64) -> Result<R::Model> {
        R::POLICY.read.enforce(caller, MSG_PERMISSION_DENIED)?;
        self.repo.find(id).await?.ok_or_else(Self::not_found)
    }

    /// Create a row.
    ///
    /// Both authorization layers run before the body is looked at, so a caller without
    /// the right role is told so even when the payload is malformed.
    pub async fn create(&self, caller: &Caller, payload: Result<R::CreateDto>) -> Result<R::Model> {
        R::POLICY.write.enforce(caller, MSG_PERMISSION_DENIED)?;
        R::POLICY.create.enforce(caller, MSG_ADMIN_ONLY)?;

        let dto = payload?;
        let mut errors = validation_errors(&dto);
        let mut record = match R::from_create(dto) {
            Ok(record) => record,
            Err(more) => {
                errors.merge(more);
                return Err(AppError::Validation(errors));
            }
        };
        errors.into_result().map_err(AppError::Validation)?;

        self.check_relations(&record, None).await?;
        R::stamp(&mut record, &Audit::new(WriteAction::Create, caller));

        let model = self.repo.insert(&record).await?;
        tracing::info!(
            resource = R::TABLE,
            id = R::id(&model),
            caller = ?caller.account_id(),
            "Created"
        );
        Ok(model)
    }

    /// Partial update: only the supplied fields change.
    pub async fn update(
        &self,
        caller: &Caller,
        id: i64,
        payload: Result<R::UpdateDto>,
    ) -> Result<R::Model> {
        R::POLICY.write.enforce(caller, MSG_PERMISSION_DENIED)?;

        let existing = self.repo.find(id).await?.ok_or_else(Self::not_found)?;
        let dto = payload?;
        validation_errors(&dto)
            .into_result()
            .map_err(AppError::Validation)?;

        let mut record = R::to_record(&existing);
        R::apply_update(&mut record, dto);
        self.check_relations(&record, Some(id)).await?;
        R::stamp(&mut record, &Audit::new(WriteAction::Update, caller));

        let model = self
            .repo
            .update(id, &record)
            .await?
            .ok_or_else(Self::not_found)?;
        tracing::info!(
            resource = R::TABLE,
            id,
            caller = ?caller.account_id(),
            "Updated"
        );
        Ok(model)
    }

    pub async fn delete(&self, caller: &Caller, id: i64) -> Result<()> {
        R::POLICY.write.enforce(caller, MSG_PERMISSION_DENIED)?;

        if !self.repo.delete(id).await? {
            return Err(Self::not_found());
        }
        tracing::info!(
            resource = R::TABLE,
            id,
            caller = ?caller.account_id(),
            "Deleted"
        );
        Ok(())
    }

    /// Open filter/sort endpoint. No authorization.
    pub async fn filter(&self, params: &HashMap<String, String>) -> Result<Vec<R::Model>> {
        let query = parse_list_query(R::FILTER_FIELDS, R::ORDERING_FIELDS, params)
            .map_err(AppError::Validation)?;
        self.repo.list(&query).await
    }

    /// Foreign keys must point at existing rows and unique groups must stay unique.
    async fn check_relations(&self, record: &Record, exclude_id: Option<i64>) -> Result<()> {
        let mut errors = FieldErrors::default();

        for reference in R::REFERENCES {
            let Some(target_id) = record.get(reference.column).and_then(FieldValue::as_id) else {
                continue;
            };
            if !self.lookup.exists(reference.target, target_id).await? {
                errors.add(
                    reference.column,
                    format!("Invalid pk \"{}\" - object does not exist.", target_id),
                );
            }
        }
        // Uniqueness is only meaningful once the referenced rows are known to exist
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        for columns in R::UNIQUE_TOGETHER {
            let criteria: Vec<(&'static str, FieldValue)> = columns
                .iter()
                .filter_map(|column| record.get(column).map(|value| (*column, value.clone())))
                .collect();
            if criteria.len() != columns.len() || criteria.iter().any(|(_, v)| v.is_null()) {
                continue;
            }
            if self.lookup.is_taken(R::TABLE, &criteria, exclude_id).await? {
                errors.merge(unique_violation::<R>(columns));
            }
        }

        errors.into_result().map_err(AppError::Validation)
    }
}

fn validation_errors<T: Validate>(dto: &T) -> FieldErrors {
    dto.validate().err().map(FieldErrors::from).unwrap_or_default()
}
