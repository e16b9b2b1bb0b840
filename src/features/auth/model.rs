use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Role capabilities held by an account.
///
/// Admin and editor are independent flags, so an account may hold both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Capabilities(u8);

impl Capabilities {
    pub const NONE: Capabilities = Capabilities(0);
    pub const ADMIN: Capabilities = Capabilities(1 << 0);
    pub const EDITOR: Capabilities = Capabilities(1 << 1);

    pub fn from_flags(is_admin: bool, is_editor: bool) -> Self {
        let mut caps = Self::NONE;
        if is_admin {
            caps = caps.union(Self::ADMIN);
        }
        if is_editor {
            caps = caps.union(Self::EDITOR);
        }
        caps
    }

    pub const fn union(self, other: Capabilities) -> Self {
        Capabilities(self.0 | other.0)
    }

    pub const fn contains(self, other: Capabilities) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_admin(self) -> bool {
        self.contains(Self::ADMIN)
    }

    pub fn is_editor(self) -> bool {
        self.contains(Self::EDITOR)
    }
}

/// Account resolved from a bearer token.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    pub account_id: i64,
    pub username: String,
    pub capabilities: Capabilities,
}

/// Identity attached to every request: nobody, or one authenticated account.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Caller {
    #[default]
    Anonymous,
    Authenticated(AuthenticatedUser),
}

impl Caller {
    pub fn user(&self) -> Option<&AuthenticatedUser> {
        match self {
            Caller::Anonymous => None,
            Caller::Authenticated(user) => Some(user),
        }
    }

    pub fn account_id(&self) -> Option<i64> {
        self.user().map(|u| u.account_id)
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }

    pub fn capabilities(&self) -> Capabilities {
        self.user()
            .map(|u| u.capabilities)
            .unwrap_or(Capabilities::NONE)
    }
}

/// Database model for account
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub is_admin: bool,
    pub is_editor: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl Account {
    pub fn capabilities(&self) -> Capabilities {
        Capabilities::from_flags(self.is_admin, self.is_editor)
    }

    pub fn to_authenticated_user(&self) -> AuthenticatedUser {
        AuthenticatedUser {
            account_id: self.id,
            username: self.username.clone(),
            capabilities: self.capabilities(),
        }
    }
}

/// Validated registration data, password already hashed
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub is_admin: bool,
    pub is_editor: bool,
}

/// Opaque token bound 1:1 to an account
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct AuthToken {
    pub key: String,
    pub account_id: i64,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_are_independent_flags() {
        let both = Capabilities::from_flags(true, true);
        assert!(both.is_admin());
        assert!(both.is_editor());

        let editor = Capabilities::from_flags(false, true);
        assert!(!editor.is_admin());
        assert!(editor.is_editor());

        assert_eq!(Capabilities::from_flags(false, false), Capabilities::NONE);
    }

    #[test]
    fn test_anonymous_caller_has_no_capabilities() {
        let caller = Caller::Anonymous;
        assert!(!caller.is_authenticated());
        assert_eq!(caller.capabilities(), Capabilities::NONE);
        assert_eq!(caller.account_id(), None);
    }
}
