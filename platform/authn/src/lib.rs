//! Platform authentication helpers.
//!
//! Local password accounts only: argon2 PHC hashes stored on the user row and
//! verified at login. Session bookkeeping lives in `platform-db`.

use argon2::Argon2;
use once_cell::sync::Lazy;
use argon2::password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::Deserialize;
use thiserror::Error;

pub const MIN_PASSWORD_LEN: usize = 8;
const GENERATED_PASSWORD_LEN: usize = 16;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthnError {
    #[error("invalid email address")]
    InvalidEmail,
    #[error("password must have at least {MIN_PASSWORD_LEN} characters")]
    WeakPassword,
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("stored password hash is malformed")]
    MalformedHash,
}

/// Login form payload. Missing fields read as empty and fail verification.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Normalized email, or `None` when the form value cannot be an address.
    pub fn email(&self) -> Option<String> {
        normalize_email(&self.email).ok()
    }
}

pub fn normalize_email(value: &str) -> Result<String, AuthnError> {
    let trimmed = value.trim().to_lowercase();
    let Some((local, domain)) = trimmed.split_once('@') else {
        return Err(AuthnError::InvalidEmail);
    };
    if local.is_empty()
        || domain.is_empty()
        || domain.contains('@')
        || trimmed.chars().any(char::is_whitespace)
    {
        return Err(AuthnError::InvalidEmail);
    }
    Ok(trimmed)
}

pub fn validate_password(password: &str) -> Result<(), AuthnError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthnError::WeakPassword);
    }
    Ok(())
}

pub fn hash_password(password: &str) -> Result<String, AuthnError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AuthnError::Hash(err.to_string()))
}

/// `Ok(false)` on a wrong password; `Err` only when the stored hash is unusable.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, AuthnError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| AuthnError::MalformedHash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

static DECOY_HASH: Lazy<Option<String>> = Lazy::new(|| hash_password("decoy-password").ok());

/// Spends the same argon2 work as a real check when no account matches,
/// so login latency does not reveal which emails exist.
pub fn verify_decoy(password: &str) -> bool {
    match DECOY_HASH.as_deref() {
        Some(hash) => {
            let _ = verify_password(password, hash);
        }
        None => {
            let _ = hash_password(password);
        }
    }
    false
}

/// Random initial password for accounts created without one.
pub fn generate_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("Aa123456").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert_eq!(verify_password("Aa123456", &hash), Ok(true));
        assert_eq!(verify_password("Aa1234567", &hash), Ok(false));
    }

    #[test]
    fn decoy_never_matches() {
        assert!(!verify_decoy("decoy-password"));
        assert!(!verify_decoy(""));
        assert!(DECOY_HASH.as_deref().is_some_and(|h| h.starts_with("$argon2")));
    }

    #[test]
    fn missing_form_fields_default_to_empty() {
        let credentials: Credentials = serde_json::from_str(r#"{"email":"a@b.com"}"#).unwrap();
        assert_eq!(credentials.password, "");
        assert_eq!(credentials.email(), Some("a@b.com".to_string()));
        let empty: Credentials = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.email(), None);
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert_eq!(
            verify_password("Aa123456", "plaintext"),
            Err(AuthnError::MalformedHash)
        );
    }

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(
            normalize_email("  Admin@RHMangnt.com "),
            Ok("admin@rhmangnt.com".to_string())
        );
        for bad in ["", "admin", "@rhmangnt.com", "admin@", "a@b@c", "a b@c.com"] {
            assert_eq!(normalize_email(bad), Err(AuthnError::InvalidEmail), "{bad}");
        }
    }

    #[test]
    fn password_policy_and_generation() {
        assert_eq!(validate_password("short"), Err(AuthnError::WeakPassword));
        assert!(validate_password("Aa123456").is_ok());
        let generated = generate_password();
        assert_eq!(generated.len(), GENERATED_PASSWORD_LEN);
        assert!(validate_password(&generated).is_ok());
    }

    #[test]
    fn credentials_debug_hides_password() {
        let creds = Credentials {
            email: "admin@rhmangnt.com".into(),
            password: "Aa123456".into(),
        };
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("Aa123456"));
        assert_eq!(creds.email().as_deref(), Some("admin@rhmangnt.com"));
    }
}
