use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::tourist_spots::models::SpotStatus;
use crate::shared::validation::{not_blank, validate_distance};

/// Request body for creating or updating a tourist spot.
///
/// On create, `name`, `address`, `city` and `distance_from_city` are required.
/// `created_by`, `updated_by`, `created_on` and `last_modified` are not accepted; any such
/// keys in the body are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct TouristSpotInputDto {
    #[validate(
        length(max = 150, message = "Ensure this field has no more than 150 characters."),
        custom(function = "not_blank")
    )]
    pub name: Option<String>,

    pub description: Option<String>,

    #[validate(custom(function = "not_blank"))]
    pub address: Option<String>,

    /// City id
    pub city: Option<i64>,

    /// Tourism type id
    pub tourism_type: Option<i64>,

    #[schema(value_type = Option<String>, example = "12.50")]
    #[validate(custom(function = "validate_distance"))]
    pub distance_from_city: Option<Decimal>,

    /// Opaque image reference; the bytes are stored elsewhere
    #[validate(length(max = 255, message = "Ensure this field has no more than 255 characters."))]
    pub image: Option<String>,

    /// Defaults to Active
    pub status: Option<SpotStatus>,
}
