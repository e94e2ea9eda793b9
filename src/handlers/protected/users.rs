use axum::{extract::State, Extension};

use crate::app::AppState;
use crate::database::models::User;
use crate::middleware::{require_role, ApiResult, IntoApiResponse};
use crate::policy::{Principal, Role};

/// GET /api/users - users of the caller's tenant, admins only
pub async fn list(State(state): State<AppState>, Extension(principal): Extension<Principal>) -> ApiResult<Vec<User>> {
    require_role(&principal, &[Role::Admin])?;
    Ok(state.auth.list_users(&principal).await?.into_api_response())
}
