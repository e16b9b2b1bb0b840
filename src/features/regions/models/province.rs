use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Province: an independent top-level region
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Province {
    pub id: i64,
    pub name: String,
    pub abbreviation: Option<String>,
    pub capital_city: Option<String>,
    pub population: Option<i64>,
    pub area_km2: Option<f64>,
}
