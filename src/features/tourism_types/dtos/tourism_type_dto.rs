use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::shared::validation::not_blank;

/// Request body for creating or updating a tourism type. `name` is required on create.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct TourismTypeInputDto {
    #[validate(
        length(max = 100, message = "Ensure this field has no more than 100 characters."),
        custom(function = "not_blank")
    )]
    pub name: Option<String>,

    pub description: Option<String>,

    /// Defaults to true
    pub is_active: Option<bool>,
}
