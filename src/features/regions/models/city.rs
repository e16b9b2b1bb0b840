use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// City within a province. `(name, province)` is unique.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct City {
    pub id: i64,
    pub name: String,
    /// Owning province id; deleting the province deletes the city
    pub province: i64,
    pub is_capital: bool,
    pub area_code: Option<String>,
    #[schema(value_type = Option<String>, example = "-6.917464")]
    pub latitude: Option<Decimal>,
    #[schema(value_type = Option<String>, example = "107.619123")]
    pub longitude: Option<Decimal>,
    pub population: Option<i64>,
}
