use axum::{
    extract::{Path, State},
    Extension,
};

use crate::app::AppState;
use crate::database::models::Project;
use crate::database::ProjectChanges;
use crate::handlers::extract::ValidJson;
use crate::middleware::{ApiResponse, ApiResult, IntoApiResponse};
use crate::policy::Principal;
use crate::services::CreateProjectRequest;

/// GET /api/projects
pub async fn list(State(state): State<AppState>, Extension(principal): Extension<Principal>) -> ApiResult<Vec<Project>> {
    Ok(state.projects.list(&principal).await?.into_api_response())
}

/// GET /api/projects/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i32>,
) -> ApiResult<Project> {
    Ok(state.projects.get(&principal, id).await?.into_api_response())
}

/// POST /api/projects
pub async fn post(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ValidJson(body): ValidJson<CreateProjectRequest>,
) -> ApiResult<Project> {
    let project = state.projects.create(&principal, body).await?;
    Ok(ApiResponse::created(project))
}

/// PUT /api/projects/:id - creator or same-tenant admin
pub async fn put(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i32>,
    ValidJson(changes): ValidJson<ProjectChanges>,
) -> ApiResult<Project> {
    Ok(state.projects.update(&principal, id, changes).await?.into_api_response())
}

/// DELETE /api/projects/:id - removes the project's tasks too
pub async fn delete(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i32>,
) -> ApiResult<()> {
    state.projects.delete(&principal, id).await?;
    Ok(ApiResponse::no_content())
}
