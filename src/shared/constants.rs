// =============================================================================
// AUTHORIZATION MESSAGES
// =============================================================================

/// Caller presented no token on an endpoint gated by a role policy
pub const MSG_NOT_AUTHENTICATED: &str = "Authentication credentials were not provided.";

/// Coarse-grained gate rejected the caller's capabilities
pub const MSG_PERMISSION_DENIED: &str = "You do not have permission to perform this action.";

/// Fine-grained re-check inside create: only admins may add entries
pub const MSG_ADMIN_ONLY: &str = "Only admins can add new entries.";

// =============================================================================
// AUTHENTICATION MESSAGES
// =============================================================================

pub const MSG_MISSING_CREDENTIALS: &str = "Please fill in username and password.";
pub const MSG_INVALID_CREDENTIALS: &str = "Invalid credentials.";
pub const MSG_INACTIVE_ACCOUNT: &str = "User account is inactive.";
pub const MSG_INVALID_TOKEN: &str = "Invalid token.";
pub const MSG_EXPIRED_TOKEN: &str = "Token has expired.";
pub const MSG_INVALID_AUTH_HEADER: &str = "Invalid authorization header format.";

// =============================================================================
// FIELD VALIDATION MESSAGES
// =============================================================================

pub const MSG_REQUIRED: &str = "This field is required.";
pub const MSG_BLANK: &str = "This field may not be blank.";
pub const MSG_PASSWORD_MISMATCH: &str = "Password and password confirmation do not match.";

/// Default minimum password length when PASSWORD_MIN_LENGTH is unset
pub const DEFAULT_PASSWORD_MIN_LENGTH: usize = 8;

/// Random bytes in an issued token key (hex-encoded to 40 characters)
pub const TOKEN_KEY_BYTES: usize = 20;
