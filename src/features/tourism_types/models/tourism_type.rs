use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Category of attraction (beach, temple, museum, ...)
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct TourismType {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
}
