use axum::{
    body::Body,
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts, Path, Request,
    },
    http::request::Parts,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;

use crate::core::error::AppError;
use crate::features::auth::model::Caller;

/// Custom JSON extractor that provides consistent error responses
///
/// The body is parsed in two steps so that a value of the wrong type is reported under the
/// field it was sent for, like any other validation error.
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppJsonRejection;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<serde_json::Value>::from_request(req, state)
            .await
            .map_err(AppJsonRejection::Body)?;

        serde_path_to_error::deserialize(value)
            .map(Self)
            .map_err(AppJsonRejection::Field)
    }
}

#[derive(Debug)]
pub enum AppJsonRejection {
    /// Missing content type or a body that is not JSON at all
    Body(JsonRejection),
    /// Valid JSON that does not fit the target type
    Field(serde_path_to_error::Error<serde_json::Error>),
}

/// "invalid type: string \"lots\", expected i64" -> "Invalid type: string \"lots\", expected i64."
fn field_message(error: &serde_json::Error) -> String {
    let raw = error.to_string();
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => format!("{}{}.", first.to_uppercase(), chars.as_str()),
        None => "Invalid value.".to_string(),
    }
}

impl From<AppJsonRejection> for AppError {
    fn from(rejection: AppJsonRejection) -> Self {
        match rejection {
            AppJsonRejection::Field(err) => {
                let path = err.path().to_string();
                if path == "." {
                    return AppError::BadRequest(format!("Invalid JSON data: {}", err.inner()));
                }
                AppError::field(&path, field_message(err.inner()))
            }
            AppJsonRejection::Body(rejection) => {
                let message = match rejection {
                    JsonRejection::JsonDataError(err) => format!("Invalid JSON data: {}", err),
                    JsonRejection::JsonSyntaxError(err) => {
                        format!("Invalid JSON syntax: {}", err)
                    }
                    JsonRejection::MissingJsonContentType(err) => {
                        format!("Missing JSON content type: {}", err)
                    }
                    _ => "Failed to parse JSON body".to_string(),
                };
                AppError::BadRequest(message)
            }
        }
    }
}

impl IntoResponse for AppJsonRejection {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

/// Path extractor that reports unparsable parameters through the response envelope
pub struct AppPath<T>(pub T);

impl<T, S> FromRequestParts<S> for AppPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppPathRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppPathRejection(rejection)),
        }
    }
}

#[derive(Debug)]
pub struct AppPathRejection(PathRejection);

impl From<AppPathRejection> for AppError {
    fn from(rejection: AppPathRejection) -> Self {
        AppError::BadRequest(rejection.0.body_text())
    }
}

impl IntoResponse for AppPathRejection {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

/// Identity resolved by the token middleware. Routes outside that middleware always
/// see an anonymous caller.
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Caller>().cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::validation::FieldErrors;

    #[derive(Debug, serde::Deserialize)]
    #[allow(dead_code)]
    struct Sample {
        name: Option<String>,
        population: Option<i64>,
    }

    #[test]
    fn test_wrong_type_is_reported_under_its_field() {
        let value = serde_json::json!({"name": "Bali", "population": "lots"});
        let err = serde_path_to_error::deserialize::<_, Sample>(value).unwrap_err();

        match AppError::from(AppJsonRejection::Field(err)) {
            AppError::Validation(errors) => {
                let mut expected = FieldErrors::default();
                expected.add(
                    "population",
                    "Invalid type: string \"lots\", expected i64.",
                );
                assert_eq!(errors, expected);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_wrong_top_level_shape_is_a_bad_request() {
        let value = serde_json::json!([1, 2, 3]);
        let err = serde_path_to_error::deserialize::<_, Sample>(value).unwrap_err();
        assert!(matches!(
            AppError::from(AppJsonRejection::Field(err)),
            AppError::BadRequest(_)
        ));
    }
}
