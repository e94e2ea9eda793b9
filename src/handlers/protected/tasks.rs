use axum::{
    extract::{Path, State},
    Extension,
};

use crate::app::AppState;
use crate::database::models::Task;
use crate::database::TaskChanges;
use crate::handlers::extract::ValidJson;
use crate::middleware::{ApiResponse, ApiResult, IntoApiResponse};
use crate::policy::Principal;
use crate::services::CreateTaskRequest;

/// GET /api/projects/:project_id/tasks
pub async fn list(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(project_id): Path<i32>,
) -> ApiResult<Vec<Task>> {
    Ok(state.tasks.list(&principal, project_id).await?.into_api_response())
}

/// GET /api/projects/:project_id/tasks/:task_id
pub async fn get(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((project_id, task_id)): Path<(i32, i32)>,
) -> ApiResult<Task> {
    Ok(state.tasks.get(&principal, project_id, task_id).await?.into_api_response())
}

/// POST /api/projects/:project_id/tasks
pub async fn post(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(project_id): Path<i32>,
    ValidJson(body): ValidJson<CreateTaskRequest>,
) -> ApiResult<Task> {
    let task = state.tasks.create(&principal, project_id, body).await?;
    Ok(ApiResponse::created(task))
}

/// PUT /api/projects/:project_id/tasks/:task_id - creator, assignee or same-tenant admin
pub async fn put(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((project_id, task_id)): Path<(i32, i32)>,
    ValidJson(changes): ValidJson<TaskChanges>,
) -> ApiResult<Task> {
    Ok(state
        .tasks
        .update(&principal, project_id, task_id, changes)
        .await?
        .into_api_response())
}

/// DELETE /api/projects/:project_id/tasks/:task_id - creator or same-tenant admin
pub async fn delete(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((project_id, task_id)): Path<(i32, i32)>,
) -> ApiResult<()> {
    state.tasks.delete(&principal, project_id, task_id).await?;
    Ok(ApiResponse::no_content())
}
