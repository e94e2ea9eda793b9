//! Store traits the services depend on, and the inputs they accept.
//!
//! Every read takes a [`TenantScope`]; there is no unscoped lookup of
//! projects or tasks. Updates and deletes take the access snapshot the
//! decision was made on and only touch the row if it still matches it.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use super::manager::DatabaseError;
use super::models::{Project, ProjectStatus, Task, TaskPriority, TaskStatus, Tenant, User};
use crate::policy::{Ownership, ProjectRef, Role, TaskRef, TenantScope};

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub tenant_id: i32,
}

#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub owner: Ownership,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectChanges {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    pub status: Option<ProjectStatus>,
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub project_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub assigned_to: Option<i32>,
    pub owner: Ownership,
}

/// Partial task update. For the nullable columns the outer `Option` says
/// whether the field was sent, the inner one whether it was `null`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskChanges {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    #[serde(default, deserialize_with = "present")]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "present")]
    pub assigned_to: Option<Option<i32>>,
}

fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[async_trait]
pub trait TenantStore: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<Tenant>, DatabaseError>;
    async fn create(&self, name: &str) -> Result<Tenant, DatabaseError>;
    async fn set_creator(&self, tenant_id: i32, user_id: i32) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, DatabaseError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;
    async fn is_taken(&self, username: &str, email: &str) -> Result<bool, DatabaseError>;
    async fn create(&self, user: NewUser) -> Result<User, DatabaseError>;
    async fn list(&self, scope: TenantScope) -> Result<Vec<User>, DatabaseError>;
    async fn exists_in(&self, scope: TenantScope, user_id: i32) -> Result<bool, DatabaseError>;
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn list(&self, scope: TenantScope) -> Result<Vec<Project>, DatabaseError>;
    async fn find(&self, scope: TenantScope, id: i32) -> Result<Option<Project>, DatabaseError>;
    async fn create(&self, project: NewProject) -> Result<Project, DatabaseError>;
    async fn update(&self, snapshot: &ProjectRef, changes: &ProjectChanges) -> Result<Project, DatabaseError>;
    async fn delete(&self, snapshot: &ProjectRef) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn list(&self, scope: TenantScope, project_id: i32) -> Result<Vec<Task>, DatabaseError>;
    async fn find(&self, scope: TenantScope, project_id: i32, task_id: i32) -> Result<Option<Task>, DatabaseError>;
    async fn create(&self, task: NewTask) -> Result<Task, DatabaseError>;
    async fn update(&self, snapshot: &TaskRef, changes: &TaskChanges) -> Result<Task, DatabaseError>;
    async fn delete(&self, snapshot: &TaskRef) -> Result<(), DatabaseError>;
}
