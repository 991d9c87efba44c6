/// Request authentication with session tokens
///
/// Clients send the token issued at registration or login in the
/// `auth-token` header. [`authenticate`] reads it, resolves the owning
/// account, and returns the [`Principal`] that handlers act on.
///
/// The API server wraps this in an axum middleware layer that inserts the
/// principal into request extensions. [`AuthError`] carries no response
/// body of its own; callers map it into their error envelope:
///
/// ```no_run
/// use axum::{extract::{Request, State}, http::StatusCode, middleware::Next, response::Response};
/// use emporium_shared::auth::middleware::authenticate;
/// use sqlx::PgPool;
///
/// async fn token_auth(
///     State(pool): State<PgPool>,
///     mut req: Request,
///     next: Next,
/// ) -> Result<Response, StatusCode> {
///     let principal = authenticate(&pool, req.headers())
///         .await
///         .map_err(|e| e.status_code())?;
///     req.extensions_mut().insert(principal);
///     Ok(next.run(req).await)
/// }
/// ```

use axum::http::{HeaderMap, StatusCode};
use sqlx::PgPool;
use tracing::debug;

use super::principal::{self, Principal};
use super::token::{is_well_formed, AUTH_TOKEN_HEADER};

/// Error type for token authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No `auth-token` header, or an empty one
    #[error("No auth token provided")]
    MissingCredentials,

    /// Token is malformed or held by no account
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Lookup failed
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCredentials | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Reads the session token from request headers
///
/// Surrounding whitespace is ignored. Returns `None` when the header is
/// absent, empty, or not valid ASCII.
pub fn extract_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTH_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolves the request's token to a principal
///
/// # Errors
///
/// - [`AuthError::MissingCredentials`] if no token was sent
/// - [`AuthError::InvalidToken`] if the token is malformed, was never
///   issued, or has been revoked by logout
/// - [`AuthError::DatabaseError`] if the lookup fails
pub async fn authenticate(pool: &PgPool, headers: &HeaderMap) -> Result<Principal, AuthError> {
    let token = extract_token(headers).ok_or(AuthError::MissingCredentials)?;

    // Skip the lookup for anything we could not have issued
    if !is_well_formed(token) {
        debug!("Rejected malformed session token");
        return Err(AuthError::InvalidToken);
    }

    principal::resolve(pool, token)
        .await?
        .ok_or(AuthError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_token(&headers), None);

        headers.insert(AUTH_TOKEN_HEADER, HeaderValue::from_static("  abc123  "));
        assert_eq!(extract_token(&headers), Some("abc123"));

        headers.insert(AUTH_TOKEN_HEADER, HeaderValue::from_static(""));
        assert_eq!(extract_token(&headers), None);
    }

    #[tokio::test]
    async fn test_authenticate_rejects_before_querying() {
        // Lazy pool never connects; both paths must fail without touching it
        let pool = PgPool::connect_lazy("postgres://localhost:1/unused").unwrap();

        let missing = authenticate(&pool, &HeaderMap::new()).await;
        assert!(matches!(missing, Err(AuthError::MissingCredentials)));

        let mut headers = HeaderMap::new();
        headers.insert(AUTH_TOKEN_HEADER, HeaderValue::from_static("not-a-token"));
        let malformed = authenticate(&pool, &headers).await;
        assert!(matches!(malformed, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_auth_error_status_codes() {
        assert_eq!(AuthError::MissingCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::DatabaseError(sqlx::Error::PoolTimedOut).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
