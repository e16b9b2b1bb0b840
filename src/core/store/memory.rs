//! In-memory implementation of the data-access layer.
//!
//! All state lives in maps guarded by a single `tokio::sync::RwLock`. It exists for tests
//! and for local runs with `STORE_BACKEND=memory`; nothing survives a restart.
//!
//! The relational rules Postgres enforces through the schema are replayed here:
//! - ids come from a per-table counter and are never reused
//! - deleting a row walks the registered [`Relation`]s, cascading or nulling dependents
//! - list ordering matches Postgres (NULLs last ascending, first descending, then id)

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::core::error::{AppError, Result};
use crate::core::store::{
    AccountStore, FieldValue, ListQuery, Lookup, OnDelete, Record, Relation, Repository,
    SortDirection,
};
use crate::features::auth::model::{Account, AuthToken, NewAccount};
use crate::features::catalog::resource::Resource;

type Row = BTreeMap<&'static str, FieldValue>;

#[derive(Debug, Default)]
struct Table {
    last_id: i64,
    rows: BTreeMap<i64, Row>,
}

#[derive(Debug, Default)]
struct State {
    tables: HashMap<&'static str, Table>,
    accounts: BTreeMap<i64, Account>,
    last_account_id: i64,
    /// Keyed by account id; one token per account
    tokens: HashMap<i64, AuthToken>,
}

impl State {
    /// Remove a row and apply every relation that points at its table.
    fn delete_row(&mut self, relations: &[Relation], table: &'static str, id: i64) -> bool {
        let removed = self
            .tables
            .get_mut(table)
            .and_then(|t| t.rows.remove(&id))
            .is_some();
        if !removed {
            return false;
        }

        for relation in relations.iter().filter(|r| r.reference.target == table) {
            let column = relation.reference.column;
            let dependents: Vec<i64> = self
                .tables
                .get(relation.table)
                .map(|t| {
                    t.rows
                        .iter()
                        .filter(|(_, row)| row.get(column).and_then(FieldValue::as_id) == Some(id))
                        .map(|(dependent_id, _)| *dependent_id)
                        .collect()
                })
                .unwrap_or_default();

            for dependent_id in dependents {
                match relation.reference.on_delete {
                    OnDelete::Cascade => {
                        self.delete_row(relations, relation.table, dependent_id);
                    }
                    OnDelete::SetNull => {
                        if let Some(row) = self
                            .tables
                            .get_mut(relation.table)
                            .and_then(|t| t.rows.get_mut(&dependent_id))
                        {
                            row.insert(column, FieldValue::Int(None));
                        }
                    }
                }
            }
        }
        true
    }
}

pub struct MemoryStore {
    state: RwLock<State>,
    relations: Vec<Relation>,
}

impl MemoryStore {
    /// `relations` drives cascade and set-null behaviour on delete.
    pub fn new(relations: Vec<Relation>) -> Self {
        Self {
            state: RwLock::new(State::default()),
            relations,
        }
    }
}

/// Build a typed model from a stored row by way of its JSON shape.
fn materialize<R: Resource>(id: i64, row: &Row) -> Result<R::Model> {
    let mut object = serde_json::Map::new();
    object.insert("id".to_string(), serde_json::Value::from(id));
    for (column, value) in row {
        object.insert(column.to_string(), value.to_json());
    }
    serde_json::from_value(serde_json::Value::Object(object)).map_err(|e| {
        tracing::error!("Failed to materialize {} row {}: {}", R::TABLE, id, e);
        AppError::Internal(format!("Corrupt {} row", R::TABLE))
    })
}

fn matches(row: &Row, criteria: &[(&'static str, FieldValue)]) -> bool {
    criteria
        .iter()
        .all(|(column, value)| row.get(column) == Some(value))
}

fn compare_rows(
    ordering: &[(&'static str, SortDirection)],
    (a_id, a): (&i64, &Row),
    (b_id, b): (&i64, &Row),
) -> Ordering {
    for (column, direction) in ordering {
        let ord = match (a.get(column), b.get(column)) {
            (Some(x), Some(y)) => x.compare(y),
            _ => Ordering::Equal,
        };
        let ord = match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a_id.cmp(b_id)
}

#[async_trait]
impl<R: Resource> Repository<R> for MemoryStore {
    async fn list(&self, query: &ListQuery) -> Result<Vec<R::Model>> {
        let state = self.state.read().await;
        let Some(table) = state.tables.get(R::TABLE) else {
            return Ok(Vec::new());
        };

        let mut rows: Vec<(&i64, &Row)> = table
            .rows
            .iter()
            .filter(|(_, row)| matches(row, &query.filters))
            .collect();
        rows.sort_by(|a, b| compare_rows(&query.ordering, *a, *b));

        rows.into_iter()
            .map(|(id, row)| materialize::<R>(*id, row))
            .collect()
    }

    async fn find(&self, id: i64) -> Result<Option<R::Model>> {
        let state = self.state.read().await;
        state
            .tables
            .get(R::TABLE)
            .and_then(|t| t.rows.get(&id))
            .map(|row| materialize::<R>(id, row))
            .transpose()
    }

    async fn insert(&self, record: &Record) -> Result<R::Model> {
        let mut state = self.state.write().await;
        let table = state.tables.entry(R::TABLE).or_default();
        table.last_id += 1;
        let id = table.last_id;

        let row: Row = record.iter().map(|(c, v)| (*c, v.clone())).collect();
        let model = materialize::<R>(id, &row)?;
        table.rows.insert(id, row);
        Ok(model)
    }

    async fn update(&self, id: i64, record: &Record) -> Result<Option<R::Model>> {
        let mut state = self.state.write().await;
        let Some(row) = state
            .tables
            .get_mut(R::TABLE)
            .and_then(|t| t.rows.get_mut(&id))
        else {
            return Ok(None);
        };

        for (column, value) in record.iter() {
            row.insert(*column, value.clone());
        }
        materialize::<R>(id, row).map(Some)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut state = self.state.write().await;
        Ok(state.delete_row(&self.relations, R::TABLE, id))
    }
}

#[async_trait]
impl Lookup for MemoryStore {
    async fn exists(&self, table: &'static str, id: i64) -> Result<bool> {
        let state = self.state.read().await;
        if table == "accounts" {
            return Ok(state.accounts.contains_key(&id));
        }
        Ok(state
            .tables
            .get(table)
            .is_some_and(|t| t.rows.contains_key(&id)))
    }

    async fn is_taken(
        &self,
        table: &'static str,
        criteria: &[(&'static str, FieldValue)],
        exclude_id: Option<i64>,
    ) -> Result<bool> {
        let state = self.state.read().await;
        Ok(state.tables.get(table).is_some_and(|t| {
            t.rows
                .iter()
                .any(|(id, row)| Some(*id) != exclude_id && matches(row, criteria))
        }))
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn create_account(&self, account: NewAccount) -> Result<Account> {
        let mut state = self.state.write().await;
        if state.accounts.values().any(|a| a.username == account.username) {
            return Err(AppError::field(
                "username",
                "A user with that username already exists.",
            ));
        }
        if state.accounts.values().any(|a| a.email == account.email) {
            return Err(AppError::field("email", "A user with that email already exists."));
        }

        state.last_account_id += 1;
        let created = Account {
            id: state.last_account_id,
            username: account.username,
            email: account.email,
            password_hash: account.password_hash,
            first_name: account.first_name,
            last_name: account.last_name,
            is_active: account.is_active,
            is_admin: account.is_admin,
            is_editor: account.is_editor,
            date_joined: Utc::now(),
            last_login: None,
        };
        state.accounts.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_account_by_username(&self, username: &str) -> Result<Option<Account>> {
        let state = self.state.read().await;
        Ok(state
            .accounts
            .values()
            .find(|a| a.username == username)
            .cloned())
    }

    async fn username_taken(&self, username: &str) -> Result<bool> {
        let state = self.state.read().await;
        Ok(state.accounts.values().any(|a| a.username == username))
    }

    async fn email_taken(&self, email: &str) -> Result<bool> {
        let state = self.state.read().await;
        Ok(state.accounts.values().any(|a| a.email == email))
    }

    async fn record_login(&self, account_id: i64, at: DateTime<Utc>) -> Result<()> {
        let mut state = self.state.write().await;
        if let Some(account) = state.accounts.get_mut(&account_id) {
            account.last_login = Some(at);
        }
        Ok(())
    }

    async fn find_token_for_account(&self, account_id: i64) -> Result<Option<AuthToken>> {
        let state = self.state.read().await;
        Ok(state.tokens.get(&account_id).cloned())
    }

    async fn save_token(&self, token: &AuthToken) -> Result<()> {
        let mut state = self.state.write().await;
        state.tokens.insert(token.account_id, token.clone());
        Ok(())
    }

    async fn find_account_by_token(&self, key: &str) -> Result<Option<(Account, AuthToken)>> {
        let state = self.state.read().await;
        let Some(token) = state.tokens.values().find(|t| t.key == key) else {
            return Ok(None);
        };
        Ok(state
            .accounts
            .get(&token.account_id)
            .map(|account| (account.clone(), token.clone())))
    }
}
