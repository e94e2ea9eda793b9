use axum::extract::State;

use crate::app::AppState;
use crate::handlers::extract::ValidJson;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{AuthPayload, LoginRequest, RegisterRequest};

/// POST /api/auth/register - create an account and return a token
///
/// Joins the tenant named by `tenant_name` (created on the spot) or the
/// default tenant. The new account always has the `user` role.
pub async fn register_post(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<RegisterRequest>,
) -> ApiResult<AuthPayload> {
    let payload = state.auth.register(body).await?;
    Ok(ApiResponse::created(payload))
}

/// POST /api/auth/login - exchange email and password for a token
pub async fn login_post(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<LoginRequest>,
) -> ApiResult<AuthPayload> {
    let payload = state.auth.login(body).await?;
    Ok(ApiResponse::success(payload))
}
