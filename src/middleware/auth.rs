use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::AuthError;
use crate::error::ApiError;
use crate::policy::{Principal, Role};

/// JWT authentication middleware that validates the bearer token and
/// injects the caller's [`Principal`] into request extensions.
///
/// Role and tenant are read from the stored user row, not from the token,
/// so a role change or removal takes effect on the next request.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(request.headers())?;
    let claims = state.keys.verify(&token)?;

    let user = state.users.find_by_id(claims.user_id).await?.ok_or_else(|| {
        tracing::warn!("Token for unknown user {}", claims.user_id);
        ApiError::from(AuthError::InvalidToken("user no longer exists".to_string()))
    })?;

    request.extensions_mut().insert(user.principal());
    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, AuthError> {
    let auth_str = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err(AuthError::MissingToken),
    }
}

/// 403 unless the caller holds one of the allowed roles.
pub fn require_role(principal: &Principal, allowed: &[Role]) -> Result<(), ApiError> {
    if allowed.contains(&principal.role) {
        Ok(())
    } else {
        tracing::warn!("User {} with role {} denied; needs one of {:?}", principal.id, principal.role, allowed);
        Err(ApiError::insufficient_permissions())
    }
}
