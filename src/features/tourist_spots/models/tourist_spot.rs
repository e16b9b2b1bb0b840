use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{
    error::BoxDynError,
    postgres::{PgTypeInfo, PgValueRef},
    Decode, FromRow, Postgres, Type,
};
use utoipa::ToSchema;

/// Publication status of a tourist spot, stored as text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum SpotStatus {
    #[default]
    Active,
    Inactive,
}

impl SpotStatus {
    pub const CHOICES: &'static [&'static str] = &["Active", "Inactive"];

    pub fn as_str(&self) -> &'static str {
        match self {
            SpotStatus::Active => "Active",
            SpotStatus::Inactive => "Inactive",
        }
    }
}

impl fmt::Display for SpotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpotStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(SpotStatus::Active),
            "Inactive" => Ok(SpotStatus::Inactive),
            other => Err(format!("Unknown tourist spot status: {}", other)),
        }
    }
}

impl Type<Postgres> for SpotStatus {
    fn type_info() -> PgTypeInfo {
        <String as Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <String as Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for SpotStatus {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let raw = <&str as Decode<Postgres>>::decode(value)?;
        Ok(raw.parse()?)
    }
}

/// Tourist spot listing. Audit columns are stamped by the server and never read from input.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct TouristSpot {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    /// City id; deleting the city deletes the spot
    pub city: i64,
    /// Tourism type id; nulled when the type is deleted
    pub tourism_type: Option<i64>,
    /// Kilometers from the city center
    #[schema(value_type = String, example = "12.50")]
    pub distance_from_city: Decimal,
    /// Opaque reference to the stored image (URL or storage key)
    pub image: Option<String>,
    pub status: SpotStatus,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
    pub created_on: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_text() {
        for choice in SpotStatus::CHOICES {
            let status: SpotStatus = choice.parse().unwrap();
            assert_eq!(status.as_str(), *choice);
        }
        assert!("Aktif".parse::<SpotStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_as_label() {
        assert_eq!(
            serde_json::to_value(SpotStatus::Inactive).unwrap(),
            serde_json::json!("Inactive")
        );
    }
}
