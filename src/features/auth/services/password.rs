//! Password hashing (Argon2id, PHC string format) and the registration password policy.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::core::error::{AppError, Result};

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            tracing::error!("Failed to hash password: {}", e);
            AppError::Internal("Failed to hash password".to_string())
        })
}

/// `Ok(false)` on mismatch. A stored hash that cannot be parsed is an internal error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| {
        tracing::error!("Stored password hash is malformed: {}", e);
        AppError::Internal("Malformed password hash".to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Policy violations for a candidate password. Empty when the password is acceptable.
pub fn password_policy_errors(password: &str, username: &str, min_length: usize) -> Vec<String> {
    let mut errors = Vec::new();

    if password.chars().count() < min_length {
        errors.push(format!(
            "This password is too short. It must contain at least {} characters.",
            min_length
        ));
    }
    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        errors.push("This password is entirely numeric.".to_string());
    }
    if !username.is_empty() && password.eq_ignore_ascii_case(username) {
        errors.push("The password is too similar to the username.".to_string());
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("kopi-luwak-42").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("kopi-luwak-42", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_hash_is_salted() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_policy_accepts_reasonable_password() {
        assert!(password_policy_errors("kopi-luwak-42", "budi", 8).is_empty());
    }

    #[test]
    fn test_policy_rejections() {
        assert_eq!(password_policy_errors("short", "budi", 8).len(), 1);
        assert!(password_policy_errors("12345678901", "budi", 8)
            .iter()
            .any(|e| e.contains("entirely numeric")));
        assert!(password_policy_errors("budisantoso", "BudiSantoso", 8)
            .iter()
            .any(|e| e.contains("similar")));
    }
}
