//! Postgres implementation of the data-access layer.
//!
//! Statements are assembled with `QueryBuilder` from the resource's static table and
//! column names; every client-supplied value is bound as a parameter. Relational
//! behaviour (cascade, set-null, uniqueness) is enforced by the schema in `migrations/`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::core::error::{AppError, Result};
use crate::core::store::{AccountStore, FieldValue, ListQuery, Lookup, Record, Repository};
use crate::features::auth::model::{Account, AuthToken, NewAccount};
use crate::features::catalog::resource::{unique_violation, Resource};

/// Postgres error code for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_value(builder: &mut QueryBuilder<'_, Postgres>, value: &FieldValue) {
    match value.clone() {
        FieldValue::Text(v) => builder.push_bind(v),
        FieldValue::Int(v) => builder.push_bind(v),
        FieldValue::Float(v) => builder.push_bind(v),
        FieldValue::Bool(v) => builder.push_bind(v),
        FieldValue::Decimal(v) => builder.push_bind(v),
        FieldValue::Timestamp(v) => builder.push_bind(v),
    };
}

fn push_conditions(builder: &mut QueryBuilder<'_, Postgres>, criteria: &[(&'static str, FieldValue)]) {
    for (i, (column, value)) in criteria.iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        builder.push(*column);
        builder.push(" = ");
        push_value(builder, value);
    }
}

/// Map a failed write, turning a unique-constraint race into a validation error.
fn write_error<R: Resource>(operation: &str, e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db) = e {
        if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
            if let Some(columns) = R::UNIQUE_TOGETHER.first() {
                return AppError::Validation(unique_violation::<R>(columns));
            }
        }
    }
    tracing::error!("Failed to {} {}: {:?}", operation, R::TABLE, e);
    AppError::Database(e)
}

fn read_error(operation: &str, table: &str, e: sqlx::Error) -> AppError {
    tracing::error!("Failed to {} {}: {:?}", operation, table, e);
    AppError::Database(e)
}

#[async_trait]
impl<R: Resource> Repository<R> for PgStore {
    async fn list(&self, query: &ListQuery) -> Result<Vec<R::Model>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT * FROM {}", R::TABLE));
        push_conditions(&mut builder, &query.filters);

        builder.push(" ORDER BY ");
        for (column, direction) in &query.ordering {
            builder.push(*column);
            builder.push(" ");
            builder.push(direction.as_sql());
            builder.push(", ");
        }
        builder.push("id ASC");

        builder
            .build_query_as::<R::Model>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| read_error("list", R::TABLE, e))
    }

    async fn find(&self, id: i64) -> Result<Option<R::Model>> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", R::TABLE);
        sqlx::query_as::<_, R::Model>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| read_error("fetch", R::TABLE, e))
    }

    async fn insert(&self, record: &Record) -> Result<R::Model> {
        let mut builder = QueryBuilder::<Postgres>::new(format!("INSERT INTO {} (", R::TABLE));
        for (i, (column, _)) in record.iter().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            builder.push(*column);
        }
        builder.push(") VALUES (");
        for (i, (_, value)) in record.iter().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            push_value(&mut builder, value);
        }
        builder.push(") RETURNING *");

        builder
            .build_query_as::<R::Model>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| write_error::<R>("insert", e))
    }

    async fn update(&self, id: i64, record: &Record) -> Result<Option<R::Model>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!("UPDATE {} SET ", R::TABLE));
        for (i, (column, value)) in record.iter().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            builder.push(*column);
            builder.push(" = ");
            push_value(&mut builder, value);
        }
        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(" RETURNING *");

        builder
            .build_query_as::<R::Model>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| write_error::<R>("update", e))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE id = $1", R::TABLE);
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| write_error::<R>("delete", e))?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Lookup for PgStore {
    async fn exists(&self, table: &'static str, id: i64) -> Result<bool> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)", table);
        sqlx::query_scalar::<_, bool>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| read_error("check", table, e))
    }

    async fn is_taken(
        &self,
        table: &'static str,
        criteria: &[(&'static str, FieldValue)],
        exclude_id: Option<i64>,
    ) -> Result<bool> {
        let mut builder =
            QueryBuilder::<Postgres>::new(format!("SELECT EXISTS(SELECT 1 FROM {}", table));
        push_conditions(&mut builder, criteria);
        if let Some(id) = exclude_id {
            builder.push(if criteria.is_empty() { " WHERE " } else { " AND " });
            builder.push("id <> ");
            builder.push_bind(id);
        }
        builder.push(")");

        builder
            .build_query_scalar::<bool>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| read_error("check uniqueness on", table, e))
    }
}

#[async_trait]
impl AccountStore for PgStore {
    async fn create_account(&self, account: NewAccount) -> Result<Account> {
        sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (
                username, email, password_hash, first_name, last_name,
                is_active, is_admin, is_editor
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(account.is_active)
        .bind(account.is_admin)
        .bind(account.is_editor)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db) = e {
                if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
                    let field = match db.constraint() {
                        Some(c) if c.contains("email") => "email",
                        _ => "username",
                    };
                    return AppError::field(
                        field,
                        format!("A user with that {} already exists.", field),
                    );
                }
            }
            tracing::error!("Failed to insert account: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn find_account_by_username(&self, username: &str) -> Result<Option<Account>> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| read_error("fetch", "accounts", e))
    }

    async fn username_taken(&self, username: &str) -> Result<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM accounts WHERE username = $1)")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| read_error("check", "accounts", e))
    }

    async fn email_taken(&self, email: &str) -> Result<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM accounts WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| read_error("check", "accounts", e))
    }

    async fn record_login(&self, account_id: i64, at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE accounts SET last_login = $1 WHERE id = $2")
            .bind(at)
            .bind(account_id)
            .execute(&self.pool)
            .await
            .map_err(|e| read_error("record login on", "accounts", e))?;
        Ok(())
    }

    async fn find_token_for_account(&self, account_id: i64) -> Result<Option<AuthToken>> {
        sqlx::query_as::<_, AuthToken>("SELECT * FROM auth_tokens WHERE account_id = $1")
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| read_error("fetch", "auth_tokens", e))
    }

    async fn save_token(&self, token: &AuthToken) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO auth_tokens (key, account_id, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (account_id)
            DO UPDATE SET key = EXCLUDED.key, created_at = EXCLUDED.created_at
            "#,
        )
        .bind(&token.key)
        .bind(token.account_id)
        .bind(token.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| read_error("save", "auth_tokens", e))?;
        Ok(())
    }

    async fn find_account_by_token(&self, key: &str) -> Result<Option<(Account, AuthToken)>> {
        let Some(token) =
            sqlx::query_as::<_, AuthToken>("SELECT * FROM auth_tokens WHERE key = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| read_error("fetch", "auth_tokens", e))?
        else {
            return Ok(None);
        };

        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
            .bind(token.account_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| read_error("fetch", "accounts", e))?;

        Ok(account.map(|account| (account, token)))
    }
}
