//! HTTP handlers shared by every catalog resource.
//!
//! Each handler is generic over the [`Resource`] binding and is mounted once per
//! resource type by [`crate::features::catalog::routes`].

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppJsonRejection, AppPath, AppPathRejection};
use crate::features::auth::model::Caller;
use crate::features::auth::policy::Policy;
use crate::features::catalog::resource::Resource;
use crate::features::catalog::services::ResourceService;
use crate::shared::constants::MSG_PERMISSION_DENIED;
use crate::shared::types::{ApiResponse, EmptyData};

type Body<T> = std::result::Result<AppJson<T>, AppJsonRejection>;

fn decode<T>(body: Body<T>) -> Result<T> {
    body.map(|AppJson(value)| value).map_err(AppError::from)
}

type Id = std::result::Result<AppPath<i64>, AppPathRejection>;

/// The role gate answers before a malformed id does.
fn resolve_id(caller: &Caller, policy: Policy, id: Id) -> Result<i64> {
    policy.enforce(caller, MSG_PERMISSION_DENIED)?;
    id.map(|AppPath(value)| value).map_err(AppError::from)
}

/// List every row. Returns the bare array, not the envelope.
pub async fn list<R: Resource>(
    State(service): State<Arc<ResourceService<R>>>,
    caller: Caller,
) -> Result<Json<Vec<R::Model>>> {
    let rows = service.list(&caller).await?;
    Ok(Json(rows))
}

pub async fn get<R: Resource>(
    State(service): State<Arc<ResourceService<R>>>,
    caller: Caller,
    id: Id,
) -> Result<Json<ApiResponse<R::Model>>> {
    let id = resolve_id(&caller, R::POLICY.read, id)?;
    let row = service.get(&caller, id).await?;
    Ok(Json(ApiResponse::ok(format!("{} found", R::LABEL), row)))
}

pub async fn create<R: Resource>(
    State(service): State<Arc<ResourceService<R>>>,
    caller: Caller,
    body: Body<R::CreateDto>,
) -> Result<(StatusCode, Json<ApiResponse<R::Model>>)> {
    let row = service.create(&caller, decode(body)).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::created(
            format!("{} successfully created", R::LABEL),
            row,
        )),
    ))
}

pub async fn update<R: Resource>(
    State(service): State<Arc<ResourceService<R>>>,
    caller: Caller,
    id: Id,
    body: Body<R::UpdateDto>,
) -> Result<Json<ApiResponse<R::Model>>> {
    let id = resolve_id(&caller, R::POLICY.write, id)?;
    let row = service.update(&caller, id, decode(body)).await?;
    Ok(Json(ApiResponse::ok(
        format!("{} successfully updated", R::LABEL),
        row,
    )))
}

pub async fn delete<R: Resource>(
    State(service): State<Arc<ResourceService<R>>>,
    caller: Caller,
    id: Id,
) -> Result<Json<ApiResponse<EmptyData>>> {
    let id = resolve_id(&caller, R::POLICY.write, id)?;
    service.delete(&caller, id).await?;
    Ok(Json(ApiResponse::ack(format!(
        "{} successfully deleted",
        R::LABEL
    ))))
}

/// Open filter/sort endpoint. Returns the bare array.
pub async fn filter<R: Resource>(
    State(service): State<Arc<ResourceService<R>>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<R::Model>>> {
    let rows = service.filter(&params).await?;
    Ok(Json(rows))
}
