/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and strength rules
/// - [`token`]: opaque session tokens and their SHA-256 digests
/// - [`principal`]: resolving a token to the customer, supplier or employee holding it
/// - [`middleware`]: reading the `auth-token` header and authenticating a request
/// - [`authorization`]: role groups and access checks
///
/// Only token digests are stored. A login replaces the stored digest, so each
/// account has at most one live session; logout clears it.
///
/// # Example
///
/// ```no_run
/// use emporium_shared::auth::password::{hash_password, verify_password};
/// use emporium_shared::auth::token::SessionToken;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("correct horse 1")?;
/// assert!(verify_password("correct horse 1", &hash)?);
///
/// let token = SessionToken::generate();
/// let digest = token.hash(); // store this, hand `token.as_str()` to the client
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod middleware;
pub mod password;
pub mod principal;
pub mod token;
