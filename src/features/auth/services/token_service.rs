use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::RngCore;

use crate::core::error::{AppError, Result};
use crate::core::store::AccountStore;
use crate::features::auth::model::{Account, AuthToken, AuthenticatedUser};
use crate::shared::constants::{
    MSG_EXPIRED_TOKEN, MSG_INACTIVE_ACCOUNT, MSG_INVALID_TOKEN, TOKEN_KEY_BYTES,
};

/// Random token key, hex encoded
pub fn generate_key() -> String {
    let mut bytes = [0u8; TOKEN_KEY_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Issues and resolves opaque tokens. Each account holds at most one token.
pub struct TokenService {
    store: Arc<dyn AccountStore>,
    ttl: Option<chrono::Duration>,
}

impl TokenService {
    /// `ttl = None` means tokens never expire.
    pub fn new(store: Arc<dyn AccountStore>, ttl: Option<Duration>) -> Self {
        Self {
            store,
            ttl: ttl.and_then(|ttl| chrono::Duration::from_std(ttl).ok()),
        }
    }

    fn is_expired(&self, token: &AuthToken) -> bool {
        self.ttl
            .is_some_and(|ttl| Utc::now() - token.created_at >= ttl)
    }

    /// The account's live token, or a freshly minted one when it has none or it expired.
    pub async fn issue(&self, account: &Account) -> Result<AuthToken> {
        if let Some(token) = self.store.find_token_for_account(account.id).await? {
            if !self.is_expired(&token) {
                return Ok(token);
            }
            tracing::debug!(account_id = account.id, "Replacing expired token");
        }

        let token = AuthToken {
            key: generate_key(),
            account_id: account.id,
            created_at: Utc::now(),
        };
        self.store.save_token(&token).await?;
        Ok(token)
    }

    /// Resolve a presented token to exactly one active account.
    pub async fn resolve(&self, key: &str) -> Result<AuthenticatedUser> {
        let (account, token) = self
            .store
            .find_account_by_token(key)
            .await?
            .ok_or_else(|| AppError::Auth(MSG_INVALID_TOKEN.to_string()))?;

        if !account.is_active {
            return Err(AppError::Auth(MSG_INACTIVE_ACCOUNT.to_string()));
        }
        if self.is_expired(&token) {
            return Err(AppError::Auth(MSG_EXPIRED_TOKEN.to_string()));
        }

        Ok(account.to_authenticated_user())
    }
}
