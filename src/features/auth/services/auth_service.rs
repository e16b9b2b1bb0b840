use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::store::AccountStore;
use crate::features::auth::dtos::{
    LoginRequestDto, LoginResponseDto, RegisterRequestDto, RegisteredAccountDto,
};
use crate::features::auth::model::NewAccount;
use crate::features::auth::services::password::{
    hash_password, password_policy_errors, verify_password,
};
use crate::features::auth::services::token_service::TokenService;
use crate::shared::constants::{
    MSG_INACTIVE_ACCOUNT, MSG_INVALID_CREDENTIALS, MSG_MISSING_CREDENTIALS, MSG_PASSWORD_MISMATCH,
};
use crate::shared::validation::{require, FieldErrors};

/// Service for account registration and login
pub struct AuthService {
    store: Arc<dyn AccountStore>,
    tokens: Arc<TokenService>,
    password_min_length: usize,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn AccountStore>,
        tokens: Arc<TokenService>,
        password_min_length: usize,
    ) -> Self {
        Self {
            store,
            tokens,
            password_min_length,
        }
    }

    /// Register a new account. Nothing is persisted unless every check passes.
    pub async fn register(&self, dto: RegisterRequestDto) -> Result<RegisteredAccountDto> {
        let mut errors = dto
            .validate()
            .err()
            .map(FieldErrors::from)
            .unwrap_or_default();

        let username = require(&mut errors, "username", dto.username);
        let email = require(&mut errors, "email", dto.email);
        let first_name = require(&mut errors, "first_name", dto.first_name);
        let last_name = require(&mut errors, "last_name", dto.last_name);
        let password1 = require(&mut errors, "password1", dto.password1);
        let password2 = require(&mut errors, "password2", dto.password2);

        if let Some(username) = username.as_deref() {
            if self.store.username_taken(username).await? {
                errors.add("username", "A user with that username already exists.");
            }
        }
        if let Some(email) = email.as_deref() {
            if self.store.email_taken(email).await? {
                errors.add("email", "A user with that email already exists.");
            }
        }

        if let (Some(password1), Some(password2)) = (password1.as_deref(), password2.as_deref()) {
            if password1 != password2 {
                errors.add("password2", MSG_PASSWORD_MISMATCH);
            } else {
                for message in password_policy_errors(
                    password1,
                    username.as_deref().unwrap_or_default(),
                    self.password_min_length,
                ) {
                    errors.add("password1", message);
                }
            }
        }

        let (
            Some(username),
            Some(email),
            Some(first_name),
            Some(last_name),
            Some(password),
            true,
        ) = (
            username,
            email,
            first_name,
            last_name,
            password1,
            errors.is_empty(),
        )
        else {
            return Err(AppError::Validation(errors));
        };

        let account = self
            .store
            .create_account(NewAccount {
                username,
                email,
                password_hash: hash_password(&password)?,
                first_name,
                last_name,
                is_active: dto.is_active.unwrap_or(true),
                is_admin: dto.is_admin.unwrap_or(false),
                is_editor: dto.is_editor.unwrap_or(false),
            })
            .await?;

        tracing::info!(
            account_id = account.id,
            username = %account.username,
            "Account registered"
        );
        Ok(account.into())
    }

    /// Check credentials and hand out the account's token.
    pub async fn authenticate(&self, dto: LoginRequestDto) -> Result<LoginResponseDto> {
        if dto.username.trim().is_empty() || dto.password.is_empty() {
            return Err(AppError::Auth(MSG_MISSING_CREDENTIALS.to_string()));
        }

        let account = self
            .store
            .find_account_by_username(&dto.username)
            .await?
            .ok_or_else(|| AppError::Auth(MSG_INVALID_CREDENTIALS.to_string()))?;

        if !verify_password(&dto.password, &account.password_hash)? {
            tracing::warn!(username = %dto.username, "Failed login attempt");
            return Err(AppError::Auth(MSG_INVALID_CREDENTIALS.to_string()));
        }
        if !account.is_active {
            return Err(AppError::Auth(MSG_INACTIVE_ACCOUNT.to_string()));
        }

        let token = self.tokens.issue(&account).await?;
        self.store.record_login(account.id, Utc::now()).await?;

        tracing::info!(account_id = account.id, "Login successful");
        Ok(LoginResponseDto {
            token: token.key,
            id: account.id,
            username: account.username,
            email: account.email,
            is_admin: account.is_admin,
            is_editor: account.is_editor,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::core::store::memory::MemoryStore;

    fn service(ttl: Option<Duration>) -> (AuthService, Arc<TokenService>) {
        let store = Arc::new(MemoryStore::new(Vec::new()));
        let tokens = Arc::new(TokenService::new(store.clone(), ttl));
        (AuthService::new(store, tokens.clone(), 8), tokens)
    }

    fn registration(username: &str) -> RegisterRequestDto {
        RegisterRequestDto {
            username: Some(username.to_string()),
            email: Some(format!("{}@example.com", username)),
            first_name: Some("Budi".to_string()),
            last_name: Some("Santoso".to_string()),
            password1: Some("kopi-luwak-42".to_string()),
            password2: Some("kopi-luwak-42".to_string()),
            ..Default::default()
        }
    }

    fn login(username: &str, password: &str) -> LoginRequestDto {
        LoginRequestDto {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_defaults_roles() {
        let (service, _) = service(None);
        let account = service.register(registration("budi")).await.unwrap();
        assert!(account.is_active);
        assert!(!account.is_admin);
        assert!(!account.is_editor);
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_username() {
        let (service, _) = service(None);
        service.register(registration("budi")).await.unwrap();

        let mut again = registration("budi");
        again.email = Some("other@example.com".to_string());
        let err = service.register(again).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref e) if e.contains("username")));
    }

    #[tokio::test]
    async fn test_register_reports_missing_names() {
        let (service, _) = service(None);
        let mut dto = registration("budi");
        dto.first_name = None;
        dto.last_name = None;

        let err = service.register(dto).await.unwrap_err();
        match err {
            AppError::Validation(errors) => {
                assert!(errors.contains("first_name"));
                assert!(errors.contains("last_name"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_authenticate_is_idempotent() {
        let (service, _) = service(None);
        service.register(registration("budi")).await.unwrap();

        let first = service.authenticate(login("budi", "kopi-luwak-42")).await.unwrap();
        let second = service.authenticate(login("budi", "kopi-luwak-42")).await.unwrap();
        assert_eq!(first.token, second.token);
    }

    #[tokio::test]
    async fn test_authenticate_failures() {
        let (service, _) = service(None);
        service.register(registration("budi")).await.unwrap();

        let err = service.authenticate(login("", "")).await.unwrap_err();
        assert!(matches!(err, AppError::Auth(ref m) if m == MSG_MISSING_CREDENTIALS));

        let err = service.authenticate(login("budi", "nope")).await.unwrap_err();
        assert!(matches!(err, AppError::Auth(ref m) if m == MSG_INVALID_CREDENTIALS));

        let err = service.authenticate(login("ghost", "nope")).await.unwrap_err();
        assert!(matches!(err, AppError::Auth(ref m) if m == MSG_INVALID_CREDENTIALS));
    }

    #[tokio::test]
    async fn test_inactive_account_cannot_log_in() {
        let (service, _) = service(None);
        let mut dto = registration("budi");
        dto.is_active = Some(false);
        service.register(dto).await.unwrap();

        let err = service.authenticate(login("budi", "kopi-luwak-42")).await.unwrap_err();
        assert!(matches!(err, AppError::Auth(ref m) if m == MSG_INACTIVE_ACCOUNT));
    }

    #[tokio::test]
    async fn test_resolve_token() {
        let (service, tokens) = service(None);
        service.register(registration("budi")).await.unwrap();
        let session = service.authenticate(login("budi", "kopi-luwak-42")).await.unwrap();

        let user = tokens.resolve(&session.token).await.unwrap();
        assert_eq!(user.account_id, session.id);
        assert_eq!(user.username, "budi");

        assert!(tokens.resolve("not-a-token").await.is_err());
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected_then_replaced() {
        let (service, tokens) = service(Some(Duration::ZERO));
        service.register(registration("budi")).await.unwrap();

        let first = service.authenticate(login("budi", "kopi-luwak-42")).await.unwrap();
        let err = tokens.resolve(&first.token).await.unwrap_err();
        assert!(matches!(err, AppError::Auth(ref m) if m == crate::shared::constants::MSG_EXPIRED_TOKEN));

        let second = service.authenticate(login("budi", "kopi-luwak-42")).await.unwrap();
        assert_ne!(first.token, second.token);
    }
}
