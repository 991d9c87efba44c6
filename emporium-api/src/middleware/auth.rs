/// Token authentication layer
///
/// Resolves the `auth-token` header to a [`Principal`] and inserts it into
/// request extensions, where handlers pick it up with
/// `Extension<Principal>`. Requests without a valid token never reach the
/// handler.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use emporium_shared::auth::{middleware::authenticate, principal::Principal};
use tracing::Span;

use crate::{app::AppState, error::ApiError};

pub async fn token_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let principal: Principal = authenticate(&state.db, req.headers()).await?;

    Span::current().record("principal", principal.role_name());
    tracing::debug!(principal_id = %principal.id(), role = principal.role_name(), "Authenticated");

    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}
