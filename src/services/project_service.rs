use std::sync::Arc;

use serde::Deserialize;

use super::log_decision;
use super::validation::{validate_required_text, FieldErrors};
use crate::database::models::{Project, ProjectStatus};
use crate::database::{NewProject, ProjectChanges, ProjectStore};
use crate::error::ApiError;
use crate::policy::{can_create, can_mutate_project, can_read_scope, Action, Ownership, Principal};

/// Client body for a new project. Tenant and creator come from the caller,
/// so any such fields in the body are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProjectRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: ProjectStatus,
}

#[derive(Clone)]
pub struct ProjectService {
    projects: Arc<dyn ProjectStore>,
}

impl ProjectService {
    pub fn new(projects: Arc<dyn ProjectStore>) -> Self {
        Self { projects }
    }

    pub async fn list(&self, principal: &Principal) -> Result<Vec<Project>, ApiError> {
        Ok(self.projects.list(can_read_scope(principal)).await?)
    }

    pub async fn get(&self, principal: &Principal, id: i32) -> Result<Project, ApiError> {
        self.projects
            .find(can_read_scope(principal), id)
            .await?
            .ok_or_else(|| ApiError::resource_not_found("Project"))
    }

    pub async fn create(&self, principal: &Principal, request: CreateProjectRequest) -> Result<Project, ApiError> {
        can_create(principal).require("Project")?;

        let mut errors = FieldErrors::new();
        errors.check("name", validate_required_text(&request.name));
        errors.into_result()?;

        let project = self
            .projects
            .create(NewProject {
                name: request.name.trim().to_string(),
                description: request.description,
                status: request.status,
                owner: Ownership::from(principal),
            })
            .await?;
        tracing::info!("User {} created project {}", principal.id, project.id);
        Ok(project)
    }

    pub async fn update(&self, principal: &Principal, id: i32, mut changes: ProjectChanges) -> Result<Project, ApiError> {
        let mut errors = FieldErrors::new();
        if let Some(name) = &changes.name {
            errors.check("name", validate_required_text(name));
        }
        errors.into_result()?;
        if let Some(name) = changes.name.as_mut() {
            *name = name.trim().to_string();
        }

        let snapshot = self
            .projects
            .find(can_read_scope(principal), id)
            .await?
            .map(|p| p.access_ref());
        let decision = can_mutate_project(principal, snapshot.as_ref(), Action::Update);
        log_decision(principal, Action::Update, "project", id, decision);
        decision.require("Project")?;

        let snapshot = snapshot.ok_or_else(|| ApiError::resource_not_found("Project"))?;
        Ok(self.projects.update(&snapshot, &changes).await?)
    }

    /// Deletes the project and, with it, its tasks.
    pub async fn delete(&self, principal: &Principal, id: i32) -> Result<(), ApiError> {
        let snapshot = self
            .projects
            .find(can_read_scope(principal), id)
            .await?
            .map(|p| p.access_ref());
        let decision = can_mutate_project(principal, snapshot.as_ref(), Action::Delete);
        log_decision(principal, Action::Delete, "project", id, decision);
        decision.require("Project")?;

        let snapshot = snapshot.ok_or_else(|| ApiError::resource_not_found("Project"))?;
        self.projects.delete(&snapshot).await?;
        tracing::info!("User {} deleted project {}", principal.id, id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{DatabaseError, NewTask, TaskStore};
    use crate::policy::{ProjectRef, Role, TenantScope};
    use crate::testing::MemoryStore;
    use async_trait::async_trait;
    use axum::http::StatusCode;

    /// Deletes the project right after handing it out, so the write that
    /// follows works from an outdated snapshot.
    struct DeletedAfterFind(Arc<MemoryStore>);

    #[async_trait]
    impl ProjectStore for DeletedAfterFind {
        async fn list(&self, scope: TenantScope) -> Result<Vec<Project>, DatabaseError> {
            ProjectStore::list(&*self.0, scope).await
        }

        async fn find(&self, scope: TenantScope, id: i32) -> Result<Option<Project>, DatabaseError> {
            let found = ProjectStore::find(&*self.0, scope, id).await?;
            if let Some(project) = &found {
                ProjectStore::delete(&*self.0, &project.access_ref()).await?;
            }
            Ok(found)
        }

        async fn create(&self, project: NewProject) -> Result<Project, DatabaseError> {
            ProjectStore::create(&*self.0, project).await
        }

        async fn update(&self, snapshot: &ProjectRef, changes: &ProjectChanges) -> Result<Project, DatabaseError> {
            ProjectStore::update(&*self.0, snapshot, changes).await
        }

        async fn delete(&self, snapshot: &ProjectRef) -> Result<(), DatabaseError> {
            ProjectStore::delete(&*self.0, snapshot).await
        }
    }

    fn new_project(name: &str) -> CreateProjectRequest {
        serde_json::from_value(serde_json::json!({ "name": name })).unwrap()
    }

    #[tokio::test]
    async fn create_stamps_caller_tenant_and_ignores_body_ownership() {
        let store = MemoryStore::new();
        let t1 = store.with_tenant("T1");
        let t2 = store.with_tenant("T2");
        let alice = store.with_user("alice", Role::User, t1.id);
        let projects = ProjectService::new(store.clone());

        let body = serde_json::json!({ "name": "Roadmap", "tenant_id": t2.id, "created_by": 999 });
        let request: CreateProjectRequest = serde_json::from_value(body).unwrap();
        let project = projects.create(&alice, request).await.unwrap();

        assert_eq!(project.tenant_id, t1.id);
        assert_eq!(project.created_by, alice.id);
        assert_eq!(project.status, ProjectStatus::Active);
    }

    #[tokio::test]
    async fn creator_can_update_peer_cannot() {
        let store = MemoryStore::new();
        let t1 = store.with_tenant("T1");
        let alice = store.with_user("alice", Role::User, t1.id);
        let bob = store.with_user("bob", Role::User, t1.id);
        let projects = ProjectService::new(store.clone());
        let project = projects.create(&alice, new_project("Roadmap")).await.unwrap();

        let changes: ProjectChanges = serde_json::from_str(r#"{"name": "Renamed"}"#).unwrap();
        let err = projects.update(&bob, project.id, changes.clone()).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(err.message(), "Insufficient permissions");

        let updated = projects.update(&alice, project.id, changes).await.unwrap();
        assert_eq!(updated.name, "Renamed");
    }

    #[tokio::test]
    async fn admin_can_delete_within_tenant_and_tasks_go_with_it() {
        let store = MemoryStore::new();
        let t1 = store.with_tenant("T1");
        let alice = store.with_user("alice", Role::User, t1.id);
        let admin = store.with_user("root", Role::Admin, t1.id);
        let projects = ProjectService::new(store.clone());
        let project = projects.create(&alice, new_project("Roadmap")).await.unwrap();
        TaskStore::create(
            store.as_ref(),
            NewTask {
                project_id: project.id,
                title: "First".to_string(),
                description: None,
                status: Default::default(),
                priority: Default::default(),
                due_date: None,
                assigned_to: None,
                owner: Ownership::from(&alice),
            },
        )
        .await
        .unwrap();

        projects.delete(&admin, project.id).await.unwrap();
        assert_eq!(store.project_count(), 0);
        assert_eq!(store.task_count(), 0);
    }

    #[tokio::test]
    async fn other_tenant_sees_not_found_even_as_admin() {
        let store = MemoryStore::new();
        let t1 = store.with_tenant("T1");
        let t2 = store.with_tenant("T2");
        let alice = store.with_user("alice", Role::User, t1.id);
        let outsider = store.with_user("mallory", Role::Admin, t2.id);
        let projects = ProjectService::new(store.clone());
        let project = projects.create(&alice, new_project("Roadmap")).await.unwrap();

        let err = projects.get(&outsider, project.id).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        let err = projects.delete(&outsider, project.id).await.unwrap_err();
        assert_eq!(err.message(), "Project not found");
        assert!(projects.list(&outsider).await.unwrap().is_empty());
        assert_eq!(store.project_count(), 1);
    }

    #[tokio::test]
    async fn blank_name_is_a_validation_error() {
        let store = MemoryStore::new();
        let t1 = store.with_tenant("T1");
        let alice = store.with_user("alice", Role::User, t1.id);
        let err = ProjectService::new(store.clone())
            .create(&alice, new_project("  "))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn update_trims_the_name() {
        let store = MemoryStore::new();
        let t1 = store.with_tenant("T1");
        let alice = store.with_user("alice", Role::User, t1.id);
        let projects = ProjectService::new(store.clone());
        let project = projects.create(&alice, new_project("  Roadmap ")).await.unwrap();
        assert_eq!(project.name, "Roadmap");

        let changes: ProjectChanges = serde_json::from_str(r#"{"name": "  Q  "}"#).unwrap();
        let updated = projects.update(&alice, project.id, changes).await.unwrap();
        assert_eq!(updated.name, "Q");
    }

    #[tokio::test]
    async fn project_removed_between_check_and_write_is_not_found() {
        let store = MemoryStore::new();
        let t1 = store.with_tenant("T1");
        let alice = store.with_user("alice", Role::User, t1.id);
        let project = ProjectService::new(store.clone())
            .create(&alice, new_project("Roadmap"))
            .await
            .unwrap();

        let racing = ProjectService::new(Arc::new(DeletedAfterFind(store.clone())));
        let changes: ProjectChanges = serde_json::from_str(r#"{"name": "Renamed"}"#).unwrap();
        let err = racing.update(&alice, project.id, changes).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "Project not found");
        assert_eq!(store.project_count(), 0);
    }
}
