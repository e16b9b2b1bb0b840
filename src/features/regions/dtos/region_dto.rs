use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::shared::validation::{not_blank, validate_latitude, validate_longitude};

/// Request body for creating or updating a province.
///
/// Every field is optional at the type level: on create, `name` is required; on update,
/// only the supplied fields change.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct ProvinceInputDto {
    #[validate(
        length(max = 100, message = "Ensure this field has no more than 100 characters."),
        custom(function = "not_blank")
    )]
    pub name: Option<String>,

    #[validate(length(max = 10, message = "Ensure this field has no more than 10 characters."))]
    pub abbreviation: Option<String>,

    #[validate(length(max = 100, message = "Ensure this field has no more than 100 characters."))]
    pub capital_city: Option<String>,

    #[validate(range(min = 0, message = "Ensure this value is greater than or equal to 0."))]
    pub population: Option<i64>,

    #[validate(range(min = 0.0, message = "Ensure this value is greater than or equal to 0."))]
    pub area_km2: Option<f64>,
}

/// Request body for creating or updating a city.
///
/// On create, `name` and `province` are required.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct CityInputDto {
    #[validate(
        length(max = 100, message = "Ensure this field has no more than 100 characters."),
        custom(function = "not_blank")
    )]
    pub name: Option<String>,

    /// Province id
    pub province: Option<i64>,

    pub is_capital: Option<bool>,

    #[validate(length(max = 10, message = "Ensure this field has no more than 10 characters."))]
    pub area_code: Option<String>,

    #[schema(value_type = Option<String>, example = "-6.917464")]
    #[validate(custom(function = "validate_latitude"))]
    pub latitude: Option<Decimal>,

    #[schema(value_type = Option<String>, example = "107.619123")]
    #[validate(custom(function = "validate_longitude"))]
    pub longitude: Option<Decimal>,

    #[validate(range(min = 0, message = "Ensure this value is greater than or equal to 0."))]
    pub population: Option<i64>,
}
