//! Argon2id password hashing
//!
//! Customer, employee and supplier passwords are all stored as PHC strings
//! produced here. Verification reads the parameters back out of the stored
//! hash, so tuning the cost below never invalidates existing accounts.
//!
//! ```
//! use emporium_shared::auth::password::{hash_password, verify_password};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let hash = hash_password("Sunfl0wer-seeds")?;
//! assert!(verify_password("Sunfl0wer-seeds", &hash)?);
//! assert!(!verify_password("sunflower", &hash)?);
//! # Ok(())
//! # }
//! ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};

/// Minimum accepted password length (characters)
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Hashing failed
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// Verification failed for a reason other than a wrong password
    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    /// Stored hash is not a valid PHC string
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

fn hasher() -> Result<Argon2<'static>, PasswordError> {
    // 19 MiB, 2 passes, 1 lane: the OWASP baseline for Argon2id
    let params = ParamsBuilder::new()
        .m_cost(19 * 1024)
        .t_cost(2)
        .p_cost(1)
        .output_len(32)
        .build()
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    Ok(Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a plaintext password with a fresh random salt
///
/// # Errors
///
/// Returns [`PasswordError::HashError`] if the hasher rejects its input.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

    Ok(hash.to_string())
}

/// Checks a plaintext password against a stored hash
///
/// Returns `Ok(false)` for a wrong password. Errors are reserved for hashes
/// that cannot be parsed or verified at all.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(format!("Verification failed: {}", e))),
    }
}

/// Rejects passwords that are too weak to store
///
/// A password needs at least [`MIN_PASSWORD_LENGTH`] characters, one letter
/// and one digit.
///
/// ```
/// use emporium_shared::auth::password::validate_password_strength;
///
/// assert!(validate_password_strength("basket42").is_ok());
/// assert!(validate_password_strength("short1").is_err());
/// assert!(validate_password_strength("allletters").is_err());
/// ```
pub fn validate_password_strength(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        ));
    }

    if !password.chars().any(char::is_alphabetic) {
        return Err("Password must contain at least one letter".to_string());
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one digit".to_string());
    }

    Ok(())
}
