use axum::{extract::State, Extension};

use crate::app::AppState;
use crate::database::models::User;
use crate::middleware::{ApiResult, IntoApiResponse};
use crate::policy::Principal;

/// GET /api/auth/profile - the caller's own user record
pub async fn profile_get(State(state): State<AppState>, Extension(principal): Extension<Principal>) -> ApiResult<User> {
    Ok(state.auth.profile(&principal).await?.into_api_response())
}
