use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::auth::model::Account;
use crate::shared::validation::{not_blank, USERNAME_REGEX};

/// Request DTO for account registration
///
/// Fields are optional at the type level so that every missing field is reported at once.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterRequestDto {
    #[validate(
        length(max = 150, message = "Ensure this field has no more than 150 characters."),
        regex(
            path = *USERNAME_REGEX,
            message = "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
        )
    )]
    pub username: Option<String>,

    #[validate(
        email(message = "Enter a valid email address."),
        length(max = 254, message = "Ensure this field has no more than 254 characters.")
    )]
    pub email: Option<String>,

    #[validate(
        length(max = 150, message = "Ensure this field has no more than 150 characters."),
        custom(function = "not_blank")
    )]
    pub first_name: Option<String>,

    #[validate(
        length(max = 150, message = "Ensure this field has no more than 150 characters."),
        custom(function = "not_blank")
    )]
    pub last_name: Option<String>,

    pub password1: Option<String>,

    /// Must equal `password1`
    pub password2: Option<String>,

    /// Defaults to true
    pub is_active: Option<bool>,
    /// Defaults to false
    pub is_admin: Option<bool>,
    /// Defaults to false
    pub is_editor: Option<bool>,
}

/// Registered account, never including the password
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisteredAccountDto {
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub is_admin: bool,
    pub is_editor: bool,
    pub first_name: String,
    pub last_name: String,
}

impl From<Account> for RegisteredAccountDto {
    fn from(account: Account) -> Self {
        Self {
            username: account.username,
            email: account.email,
            is_active: account.is_active,
            is_admin: account.is_admin,
            is_editor: account.is_editor,
            first_name: account.first_name,
            last_name: account.last_name,
        }
    }
}

/// Request DTO for login
///
/// Blank or missing fields are rejected by the service with a single message.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct LoginRequestDto {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Response DTO for a successful login
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponseDto {
    /// Opaque token to send as `Authorization: Bearer <token>`
    pub token: String,
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub is_editor: bool,
}
