//! Opaque session tokens
//!
//! A token is 32 random bytes rendered as 64 lowercase hex characters. Clients
//! send it back in the `auth-token` header. The database only ever sees the
//! SHA-256 digest of the token, so a leaked table cannot be replayed as live
//! sessions.
//!
//! ```
//! use emporium_shared::auth::token::{hash_token, is_well_formed, SessionToken};
//!
//! let token = SessionToken::generate();
//! assert!(is_well_formed(token.as_str()));
//! assert_eq!(token.hash(), hash_token(token.as_str()));
//! ```

use rand::RngCore;
use sha2::{Digest, Sha256};
use std::fmt;

/// Number of random bytes in a token
pub const TOKEN_BYTES: usize = 32;

/// Length of the hex-encoded token
pub const TOKEN_LENGTH: usize = TOKEN_BYTES * 2;

/// Name of the request header carrying the token
pub const AUTH_TOKEN_HEADER: &str = "auth-token";

/// A freshly minted plaintext token
///
/// Returned to the client once at login/registration; only [`SessionToken::hash`]
/// is persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Mints a token from the thread-local CSPRNG
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Plaintext token
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Digest stored in the `auth_token_hash` columns
    pub fn hash(&self) -> String {
        hash_token(&self.0)
    }

    /// Consumes the token, returning the plaintext
    pub fn into_string(self) -> String {
        self.0
    }
}

// Keep plaintext tokens out of logs.
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

/// SHA-256 hex digest of a presented token
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Whether `token` has the shape of a minted token
///
/// Lets the middleware reject junk without a database round trip.
pub fn is_well_formed(token: &str) -> bool {
    token.len() == TOKEN_LENGTH && token.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_token_shape() {
        let token = SessionToken::generate();

        assert_eq!(token.as_str().len(), TOKEN_LENGTH);
        assert!(token.as_str().bytes().all(|b| b.is_ascii_hexdigit()));
        assert!(is_well_formed(token.as_str()));
    }

    #[test]
    fn test_tokens_are_unique() {
        let first = SessionToken::generate();
        let second = SessionToken::generate();

        assert_ne!(first, second);
        assert_ne!(first.hash(), second.hash());
    }

    #[test]
    fn test_hash_is_deterministic_sha256() {
        // Known vector: SHA-256("abc")
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(hash_token("same"), hash_token("same"));
    }

    #[test]
    fn test_is_well_formed_rejects_bad_input() {
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("abc123"));
        assert!(!is_well_formed(&"z".repeat(TOKEN_LENGTH)));
        assert!(!is_well_formed(&"a".repeat(TOKEN_LENGTH + 1)));
        assert!(is_well_formed(&"A0".repeat(TOKEN_BYTES)));
    }

    #[test]
    fn test_debug_hides_plaintext() {
        let token = SessionToken::generate();
        let rendered = format!("{:?}", token);

        assert!(!rendered.contains(token.as_str()));
    }
}
