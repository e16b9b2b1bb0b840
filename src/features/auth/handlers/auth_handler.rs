use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::dtos::{
    LoginRequestDto, LoginResponseDto, RegisterRequestDto, RegisteredAccountDto,
};
use crate::features::auth::services::AuthService;
use crate::shared::types::ApiResponse;

/// Register a new account
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequestDto,
    responses(
        (status = 201, description = "Account registered", body = ApiResponse<RegisteredAccountDto>),
        (status = 400, description = "Validation error, data lists the offending fields")
    ),
    tag = "auth"
)]
pub async fn register(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<RegisterRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<RegisteredAccountDto>>)> {
    let account = service.register(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::created("User registered successfully", account)),
    ))
}

/// Log in with username and password
///
/// Returns the account's opaque token. Logging in again returns the same token while it
/// is still valid.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequestDto,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<LoginResponseDto>),
        (status = 400, description = "Missing or invalid credentials, or inactive account")
    ),
    tag = "auth"
)]
pub async fn login(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<LoginRequestDto>,
) -> Result<Json<ApiResponse<LoginResponseDto>>> {
    let session = service.authenticate(dto).await?;
    Ok(Json(ApiResponse::ok("Login successful", session)))
}
