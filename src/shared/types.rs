use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Uniform response envelope: `{status, message, data}`.
///
/// List endpoints bypass the envelope and return the bare array.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub message: String,
    pub data: T,
}

/// Serializes as `{}`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema)]
pub struct EmptyData {}

impl<T> ApiResponse<T> {
    pub fn new(status: StatusCode, message: impl Into<String>, data: T) -> Self {
        Self {
            status: status.as_u16(),
            message: message.into(),
            data,
        }
    }

    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::new(StatusCode::OK, message, data)
    }

    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::new(StatusCode::CREATED, message, data)
    }
}

impl ApiResponse<EmptyData> {
    pub fn ack(message: impl Into<String>) -> Self {
        Self::ok(message, EmptyData {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_data_serializes_as_object() {
        let body = serde_json::to_value(ApiResponse::ack("done")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"status": 200, "message": "done", "data": {}})
        );
    }
}
