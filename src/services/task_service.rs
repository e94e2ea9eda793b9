use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;

use super::log_decision;
use super::validation::{validate_required_text, FieldErrors};
use crate::database::models::{Task, TaskPriority, TaskStatus};
use crate::database::{NewTask, ProjectStore, TaskChanges, TaskStore, UserStore};
use crate::error::ApiError;
use crate::policy::{can_create, can_mutate_task, can_read_scope, Action, Ownership, Principal, TenantScope};

/// Client body for a new task. The project comes from the path and the
/// ownership from the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub assigned_to: Option<i32>,
}

#[derive(Clone)]
pub struct TaskService {
    projects: Arc<dyn ProjectStore>,
    tasks: Arc<dyn TaskStore>,
    users: Arc<dyn UserStore>,
}

impl TaskService {
    pub fn new(projects: Arc<dyn ProjectStore>, tasks: Arc<dyn TaskStore>, users: Arc<dyn UserStore>) -> Self {
        Self { projects, tasks, users }
    }

    async fn require_project(&self, scope: TenantScope, project_id: i32) -> Result<(), ApiError> {
        match self.projects.find(scope, project_id).await? {
            Some(_) => Ok(()),
            None => Err(ApiError::resource_not_found("Project")),
        }
    }

    async fn require_assignee(&self, scope: TenantScope, assignee: Option<i32>) -> Result<(), ApiError> {
        let Some(user_id) = assignee else {
            return Ok(());
        };
        if self.users.exists_in(scope, user_id).await? {
            Ok(())
        } else {
            Err(ApiError::bad_request("Assignee must belong to the same tenant"))
        }
    }

    pub async fn list(&self, principal: &Principal, project_id: i32) -> Result<Vec<Task>, ApiError> {
        let scope = can_read_scope(principal);
        self.require_project(scope, project_id).await?;
        Ok(self.tasks.list(scope, project_id).await?)
    }

    pub async fn get(&self, principal: &Principal, project_id: i32, task_id: i32) -> Result<Task, ApiError> {
        self.tasks
            .find(can_read_scope(principal), project_id, task_id)
            .await?
            .ok_or_else(|| ApiError::resource_not_found("Task"))
    }

    pub async fn create(
        &self,
        principal: &Principal,
        project_id: i32,
        request: CreateTaskRequest,
    ) -> Result<Task, ApiError> {
        can_create(principal).require("Task")?;

        let mut errors = FieldErrors::new();
        errors.check("title", validate_required_text(&request.title));
        errors.into_result()?;

        let scope = can_read_scope(principal);
        self.require_project(scope, project_id).await?;
        self.require_assignee(scope, request.assigned_to).await?;

        let task = self
            .tasks
            .create(NewTask {
                project_id,
                title: request.title.trim().to_string(),
                description: request.description,
                status: request.status,
                priority: request.priority,
                due_date: request.due_date,
                assigned_to: request.assigned_to,
                owner: Ownership::from(principal),
            })
            .await?;
        tracing::info!("User {} created task {} in project {}", principal.id, task.id, project_id);
        Ok(task)
    }

    /// Creator, assignee or a same-tenant admin may update.
    pub async fn update(
        &self,
        principal: &Principal,
        project_id: i32,
        task_id: i32,
        mut changes: TaskChanges,
    ) -> Result<Task, ApiError> {
        let mut errors = FieldErrors::new();
        if let Some(title) = &changes.title {
            errors.check("title", validate_required_text(title));
        }
        errors.into_result()?;
        if let Some(title) = changes.title.as_mut() {
            *title = title.trim().to_string();
        }

        let scope = can_read_scope(principal);
        let snapshot = self
            .tasks
            .find(scope, project_id, task_id)
            .await?
            .map(|t| t.access_ref());
        let decision = can_mutate_task(principal, snapshot.as_ref(), Action::Update);
        log_decision(principal, Action::Update, "task", task_id, decision);
        decision.require("Task")?;

        if let Some(assignee) = changes.assigned_to {
            self.require_assignee(scope, assignee).await?;
        }

        let snapshot = snapshot.ok_or_else(|| ApiError::resource_not_found("Task"))?;
        Ok(self.tasks.update(&snapshot, &changes).await?)
    }

    /// Assignees may not delete; only the creator or a same-tenant admin.
    pub async fn delete(&self, principal: &Principal, project_id: i32, task_id: i32) -> Result<(), ApiError> {
        let snapshot = self
            .tasks
            .find(can_read_scope(principal), project_id, task_id)
            .await?
            .map(|t| t.access_ref());
        let decision = can_mutate_task(principal, snapshot.as_ref(), Action::Delete);
        log_decision(principal, Action::Delete, "task", task_id, decision);
        decision.require("Task")?;

        let snapshot = snapshot.ok_or_else(|| ApiError::resource_not_found("Task"))?;
        self.tasks.delete(&snapshot).await?;
        tracing::info!("User {} deleted task {}", principal.id, task_id);
        Ok(())
    }
}
