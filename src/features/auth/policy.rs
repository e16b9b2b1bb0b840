//! Role-based authorization policy.
//!
//! Each predicate is a pure function of the caller's authentication status and
//! capability set:
//! - `admin_only`: authenticated and holds the admin capability
//! - `editor_only`: authenticated and holds the editor capability
//! - `admin_or_editor`: authenticated and holds either capability
//!
//! Resources bind a [`ResourcePolicy`] that names the predicate for reads, the coarse
//! gate for writes, and the fine-grained re-check applied inside create.

use crate::core::error::{AppError, Result};
use crate::features::auth::model::{Caller, Capabilities};
use crate::shared::constants::MSG_NOT_AUTHENTICATED;

pub fn admin_only(caller: &Caller) -> bool {
    caller.is_authenticated() && caller.capabilities().contains(Capabilities::ADMIN)
}

pub fn editor_only(caller: &Caller) -> bool {
    caller.is_authenticated() && caller.capabilities().contains(Capabilities::EDITOR)
}

pub fn admin_or_editor(caller: &Caller) -> bool {
    let caps = caller.capabilities();
    caller.is_authenticated() && (caps.is_admin() || caps.is_editor())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    AdminOnly,
    EditorOnly,
    AdminOrEditor,
}

impl Policy {
    pub fn allows(self, caller: &Caller) -> bool {
        match self {
            Policy::AdminOnly => admin_only(caller),
            Policy::EditorOnly => editor_only(caller),
            Policy::AdminOrEditor => admin_or_editor(caller),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Policy::AdminOnly => "admin_only",
            Policy::EditorOnly => "editor_only",
            Policy::AdminOrEditor => "admin_or_editor",
        }
    }

    /// `Forbidden` with `denied_message` when the caller fails the predicate.
    /// Anonymous callers get the "credentials not provided" message instead.
    pub fn enforce(self, caller: &Caller, denied_message: &str) -> Result<()> {
        if self.allows(caller) {
            return Ok(());
        }

        tracing::warn!(
            caller = ?caller.account_id(),
            policy = self.name(),
            "Authorization denied"
        );

        let message = if caller.is_authenticated() {
            denied_message
        } else {
            MSG_NOT_AUTHENTICATED
        };
        Err(AppError::Forbidden(message.to_string()))
    }
}

/// Policy binding for one resource type.
#[derive(Debug, Clone, Copy)]
pub struct ResourcePolicy {
    /// list / get
    pub read: Policy,
    /// Coarse gate for create, update and delete
    pub write: Policy,
    /// Re-checked inside create after the write gate has passed
    pub create: Policy,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::AuthenticatedUser;

    fn caller(is_admin: bool, is_editor: bool) -> Caller {
        Caller::Authenticated(AuthenticatedUser {
            account_id: 1,
            username: "someone".to_string(),
            capabilities: Capabilities::from_flags(is_admin, is_editor),
        })
    }

    #[test]
    fn test_admin_only() {
        assert!(admin_only(&caller(true, false)));
        assert!(admin_only(&caller(true, true)));
        assert!(!admin_only(&caller(false, true)));
        assert!(!admin_only(&Caller::Anonymous));
    }

    #[test]
    fn test_editor_only() {
        assert!(editor_only(&caller(false, true)));
        assert!(!editor_only(&caller(true, false)));
        assert!(!editor_only(&Caller::Anonymous));
    }

    #[test]
    fn test_admin_or_editor() {
        assert!(admin_or_editor(&caller(true, false)));
        assert!(admin_or_editor(&caller(false, true)));
        assert!(!admin_or_editor(&caller(false, false)));
        assert!(!admin_or_editor(&Caller::Anonymous));
    }

    #[test]
    fn test_enforce_messages() {
        let err = Policy::AdminOnly
            .enforce(&caller(false, true), "admins only")
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(ref m) if m == "admins only"));

        let err = Policy::AdminOnly
            .enforce(&Caller::Anonymous, "admins only")
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(ref m) if m == MSG_NOT_AUTHENTICATED));

        assert!(Policy::AdminOrEditor
            .enforce(&caller(false, true), "x")
            .is_ok());
    }

    #[test]
    fn test_no_policy_admits_anonymous() {
        for policy in [Policy::AdminOnly, Policy::EditorOnly, Policy::AdminOrEditor] {
            assert!(!policy.allows(&Caller::Anonymous), "{:?}", policy);
        }
    }
}
