//! Password value object - Domain layer password handling.
//!
//! Encapsulates Argon2 hashing plus the one legacy accommodation the
//! system carries: seeded bootstrap rows may hold plaintext passwords,
//! so verification falls back to direct equality when the stored value
//! is not a PHC hash. Callers are told when that branch fired so they
//! can rehash the row.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::config::MIN_PASSWORD_LENGTH;
use crate::errors::{AppError, AppResult};

/// Outcome of a password verification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Matched against the Argon2 hash
    Valid,
    /// Matched against a legacy plaintext row; caller should rehash
    ValidLegacyPlaintext,
    Invalid,
}

impl VerifyOutcome {
    pub fn is_valid(&self) -> bool {
        !matches!(self, VerifyOutcome::Invalid)
    }
}

/// Password value object that handles hashing and verification.
#[derive(Clone)]
pub struct Password {
    hash: String,
}

// Don't expose hash in debug output
impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Create a new password by hashing the plain text.
    ///
    /// # Errors
    /// Returns validation error if password is too short.
    pub fn new(plain_text: &str) -> AppResult<Self> {
        if plain_text.len() < MIN_PASSWORD_LENGTH as usize {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        let hash = Self::hash(plain_text)?;
        Ok(Self { hash })
    }

    /// Create a Password from an existing stored value (hash or legacy plaintext).
    pub fn from_stored(stored: String) -> Self {
        Self { hash: stored }
    }

    /// Get the stored string for persistence.
    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// Consume and return the stored string.
    pub fn into_string(self) -> String {
        self.hash
    }

    /// Verify a plain text password against this stored value.
    pub fn verify(&self, plain_text: &str) -> bool {
        self.verify_detailed(plain_text).is_valid()
    }

    /// Verify with legacy detection.
    ///
    /// The stored value is treated as an Argon2 hash when it parses as one.
    /// Otherwise the single migration-compatibility branch applies: direct
    /// equality against the legacy plaintext row, reported distinctly so the
    /// caller can force a rehash.
    pub fn verify_detailed(&self, plain_text: &str) -> VerifyOutcome {
        match PasswordHash::new(&self.hash) {
            Ok(parsed) => {
                if Self::argon2()
                    .verify_password(plain_text.as_bytes(), &parsed)
                    .is_ok()
                {
                    VerifyOutcome::Valid
                } else {
                    VerifyOutcome::Invalid
                }
            }
            Err(_) => {
                if constant_time_eq(self.hash.as_bytes(), plain_text.as_bytes()) {
                    VerifyOutcome::ValidLegacyPlaintext
                } else {
                    VerifyOutcome::Invalid
                }
            }
        }
    }

    /// Hash a password using Argon2.
    fn hash(plain_text: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Self::argon2()
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))?;
        Ok(hash.to_string())
    }

    #[inline]
    fn argon2() -> Argon2<'static> {
        Argon2::default()
    }
}

/// Length-checked constant-time byte comparison for the legacy branch.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

impl From<Password> for String {
    fn from(password: Password) -> Self {
        password.hash
    }
}

impl PartialEq for Password {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for Password {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_and_verify() {
        let plain = "SecurePassword123!";
        let password = Password::new(plain).unwrap();

        assert_eq!(password.verify_detailed(plain), VerifyOutcome::Valid);
        assert!(!password.verify("WrongPassword123"));
    }

    #[test]
    fn test_password_from_stored_hash() {
        let plain = "TestPassword123";
        let password = Password::new(plain).unwrap();
        let hash = password.as_str().to_string();

        let restored = Password::from_stored(hash);
        assert!(restored.verify(plain));
    }

    #[test]
    fn test_legacy_plaintext_match_is_flagged() {
        let stored = Password::from_stored("seed-admin-password".to_string());

        assert_eq!(
            stored.verify_detailed("seed-admin-password"),
            VerifyOutcome::ValidLegacyPlaintext
        );
        assert_eq!(
            stored.verify_detailed("wrong-password"),
            VerifyOutcome::Invalid
        );
    }

    #[test]
    fn test_same_password_different_salts() {
        let plain = "SamePassword123";
        let pass1 = Password::new(plain).unwrap();
        let pass2 = Password::new(plain).unwrap();

        // Different salts produce different hashes
        assert_ne!(pass1.as_str(), pass2.as_str());
        // But both verify correctly
        assert!(pass1.verify(plain));
        assert!(pass2.verify(plain));
    }

    #[test]
    fn test_password_too_short() {
        let result = Password::new("short");
        assert!(result.is_err());
    }

    #[test]
    fn test_password_minimum_length() {
        // Exactly 8 characters should work
        let result = Password::new("12345678");
        assert!(result.is_ok());
    }
}
