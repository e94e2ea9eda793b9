//! In-memory stores for service tests, with the same scoping and
//! snapshot-conditional write rules as the Postgres stores.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use crate::auth::JwtKeys;
use crate::database::models::{Project, Task, Tenant, User};
use crate::database::repository::{
    NewProject, NewTask, NewUser, ProjectChanges, ProjectStore, TaskChanges, TaskStore, TenantStore, UserStore,
};
use crate::database::DatabaseError;
use crate::policy::{Principal, ProjectRef, Role, TaskRef, TenantScope};

#[derive(Default)]
struct State {
    next_id: i32,
    tenants: Vec<Tenant>,
    users: Vec<User>,
    projects: Vec<Project>,
    tasks: Vec<Task>,
}

impl State {
    fn id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn project_tenant(&self, project_id: i32) -> Option<i32> {
        self.projects.iter().find(|p| p.id == project_id).map(|p| p.tenant_id)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_tenant(&self, name: &str) -> Tenant {
        let mut state = self.state.lock().unwrap();
        let now = Utc::now();
        let tenant = Tenant {
            id: state.id(),
            name: name.to_string(),
            created_by: None,
            created_at: now,
            updated_at: now,
        };
        state.tenants.push(tenant.clone());
        tenant
    }

    pub fn with_user(&self, username: &str, role: Role, tenant_id: i32) -> Principal {
        let mut state = self.state.lock().unwrap();
        let now = Utc::now();
        let user = User {
            id: state.id(),
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password_hash: String::new(),
            role,
            tenant_id,
            created_at: now,
            updated_at: now,
        };
        let principal = user.principal();
        state.users.push(user);
        principal
    }

    pub fn project_count(&self) -> usize {
        self.state.lock().unwrap().projects.len()
    }

    pub fn task_count(&self) -> usize {
        self.state.lock().unwrap().tasks.len()
    }
}

pub fn test_keys() -> JwtKeys {
    JwtKeys::new("test-secret", 1)
}

#[async_trait]
impl TenantStore for MemoryStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<Tenant>, DatabaseError> {
        Ok(self.state.lock().unwrap().tenants.iter().find(|t| t.id == id).cloned())
    }

    async fn create(&self, name: &str) -> Result<Tenant, DatabaseError> {
        Ok(self.with_tenant(name))
    }

    async fn set_creator(&self, tenant_id: i32, user_id: i32) -> Result<(), DatabaseError> {
        let mut state = self.state.lock().unwrap();
        if let Some(t) = state.tenants.iter_mut().find(|t| t.id == tenant_id) {
            t.created_by = Some(user_id);
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, DatabaseError> {
        Ok(self.state.lock().unwrap().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self.state.lock().unwrap().users.iter().find(|u| u.email == email).cloned())
    }

    async fn is_taken(&self, username: &str, email: &str) -> Result<bool, DatabaseError> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().any(|u| u.username == username || u.email == email))
    }

    async fn create(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut state = self.state.lock().unwrap();
        if state.users.iter().any(|u| u.username == user.username || u.email == user.email) {
            return Err(DatabaseError::UniqueViolation("users_email_key".to_string()));
        }
        let now = Utc::now();
        let created = User {
            id: state.id(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            tenant_id: user.tenant_id,
            created_at: now,
            updated_at: now,
        };
        state.users.push(created.clone());
        Ok(created)
    }

    async fn list(&self, scope: TenantScope) -> Result<Vec<User>, DatabaseError> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().filter(|u| scope.contains(u.tenant_id)).cloned().collect())
    }

    async fn exists_in(&self, scope: TenantScope, user_id: i32) -> Result<bool, DatabaseError> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().any(|u| u.id == user_id && scope.contains(u.tenant_id)))
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn list(&self, scope: TenantScope) -> Result<Vec<Project>, DatabaseError> {
        let state = self.state.lock().unwrap();
        Ok(state.projects.iter().rev().filter(|p| scope.contains(p.tenant_id)).cloned().collect())
    }

    async fn find(&self, scope: TenantScope, id: i32) -> Result<Option<Project>, DatabaseError> {
        let state = self.state.lock().unwrap();
        Ok(state.projects.iter().find(|p| p.id == id && scope.contains(p.tenant_id)).cloned())
    }

    async fn create(&self, project: NewProject) -> Result<Project, DatabaseError> {
        let mut state = self.state.lock().unwrap();
        let now = Utc::now();
        let created = Project {
            id: state.id(),
            name: project.name,
            description: project.description,
            status: project.status,
            created_by: project.owner.created_by,
            tenant_id: project.owner.tenant_id,
            created_at: now,
            updated_at: now,
        };
        state.projects.push(created.clone());
        Ok(created)
    }

    async fn update(&self, snapshot: &ProjectRef, changes: &ProjectChanges) -> Result<Project, DatabaseError> {
        let mut state = self.state.lock().unwrap();
        let project = state
            .projects
            .iter_mut()
            .find(|p| p.access_ref() == *snapshot)
            .ok_or_else(|| DatabaseError::NotFound("Project".to_string()))?;

        if let Some(name) = &changes.name {
            project.name = name.clone();
        }
        if let Some(description) = &changes.description {
            project.description = description.clone();
        }
        if let Some(status) = changes.status {
            project.status = status;
        }
        project.updated_at = Utc::now();
        Ok(project.clone())
    }

    async fn delete(&self, snapshot: &ProjectRef) -> Result<(), DatabaseError> {
        let mut state = self.state.lock().unwrap();
        let before = state.projects.len();
        state.projects.retain(|p| p.access_ref() != *snapshot);
        if state.projects.len() == before {
            return Err(DatabaseError::NotFound("Project".to_string()));
        }
        state.tasks.retain(|t| t.project_id != snapshot.id);
        Ok(())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn list(&self, scope: TenantScope, project_id: i32) -> Result<Vec<Task>, DatabaseError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .tasks
            .iter()
            .rev()
            .filter(|t| t.project_id == project_id && scope.contains(t.tenant_id))
            .cloned()
            .collect())
    }

    async fn find(&self, scope: TenantScope, project_id: i32, task_id: i32) -> Result<Option<Task>, DatabaseError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .tasks
            .iter()
            .find(|t| t.id == task_id && t.project_id == project_id && scope.contains(t.tenant_id))
            .cloned())
    }

    async fn create(&self, task: NewTask) -> Result<Task, DatabaseError> {
        let mut state = self.state.lock().unwrap();
        match state.project_tenant(task.project_id) {
            Some(tenant_id) if tenant_id == task.owner.tenant_id => {}
            _ => return Err(DatabaseError::NotFound("Project".to_string())),
        }
        let now = Utc::now();
        let created = Task {
            id: state.id(),
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            due_date: task.due_date,
            project_id: task.project_id,
            assigned_to: task.assigned_to,
            created_by: task.owner.created_by,
            tenant_id: task.owner.tenant_id,
            created_at: now,
            updated_at: now,
        };
        state.tasks.push(created.clone());
        Ok(created)
    }

    async fn update(&self, snapshot: &TaskRef, changes: &TaskChanges) -> Result<Task, DatabaseError> {
        let mut state = self.state.lock().unwrap();
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.access_ref() == *snapshot)
            .ok_or_else(|| DatabaseError::NotFound("Task".to_string()))?;

        if let Some(title) = &changes.title {
            task.title = title.clone();
        }
        if let Some(description) = &changes.description {
            task.description = description.clone();
        }
        if let Some(status) = changes.status {
            task.status = status;
        }
        if let Some(priority) = changes.priority {
            task.priority = priority;
        }
        if let Some(due_date) = changes.due_date {
            task.due_date = due_date;
        }
        if let Some(assigned_to) = changes.assigned_to {
            task.assigned_to = assigned_to;
        }
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    async fn delete(&self, snapshot: &TaskRef) -> Result<(), DatabaseError> {
        let mut state = self.state.lock().unwrap();
        let before = state.tasks.len();
        // Deletes ignore the assignee.
        state.tasks.retain(|t| {
            !(t.id == snapshot.id
                && t.project_id == snapshot.project_id
                && t.tenant_id == snapshot.tenant_id
                && t.created_by == snapshot.created_by)
        });
        if state.tasks.len() == before {
            return Err(DatabaseError::NotFound("Task".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{ProjectStatus, TaskPriority, TaskStatus};
    use crate::policy::{can_read_scope, Ownership};

    struct Seeded {
        store: Arc<MemoryStore>,
        alice: Principal,
        bob: Principal,
        carol: Principal,
        project: Project,
    }

    async fn seeded() -> Seeded {
        let store = MemoryStore::new();
        let tenant = store.with_tenant("T1");
        let alice = store.with_user("alice", Role::User, tenant.id);
        let bob = store.with_user("bob", Role::User, tenant.id);
        let carol = store.with_user("carol", Role::User, tenant.id);
        let project = ProjectStore::create(
            &*store,
            NewProject {
                name: "Roadmap".to_string(),
                description: None,
                status: ProjectStatus::Active,
                owner: Ownership::from(&alice),
            },
        )
        .await
        .unwrap();
        Seeded { store, alice, bob, carol, project }
    }

    async fn task_assigned_to(s: &Seeded, assignee: i32) -> Task {
        TaskStore::create(
            &*s.store,
            NewTask {
                project_id: s.project.id,
                title: "Ship".to_string(),
                description: None,
                status: TaskStatus::Pending,
                priority: TaskPriority::Medium,
                due_date: None,
                assigned_to: Some(assignee),
                owner: Ownership::from(&s.alice),
            },
        )
        .await
        .unwrap()
    }

    fn reassign(user_id: i32) -> TaskChanges {
        TaskChanges {
            assigned_to: Some(Some(user_id)),
            ..TaskChanges::default()
        }
    }

    #[tokio::test]
    async fn task_update_with_outdated_assignee_is_rejected() {
        let s = seeded().await;
        let task = task_assigned_to(&s, s.bob.id).await;
        let stale = task.access_ref();

        TaskStore::update(&*s.store, &stale, &reassign(s.carol.id)).await.unwrap();

        let changes = TaskChanges {
            status: Some(TaskStatus::Completed),
            ..TaskChanges::default()
        };
        let err = TaskStore::update(&*s.store, &stale, &changes).await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound(ref what) if what == "Task"));

        let current = TaskStore::find(&*s.store, can_read_scope(&s.alice), s.project.id, task.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.assigned_to, Some(s.carol.id));
        assert_eq!(current.status, TaskStatus::Pending);
    }

    #[tokio::test]
    async fn task_delete_ignores_assignee_changes() {
        let s = seeded().await;
        let task = task_assigned_to(&s, s.bob.id).await;
        let stale = task.access_ref();

        TaskStore::update(&*s.store, &stale, &reassign(s.carol.id)).await.unwrap();
        TaskStore::delete(&*s.store, &stale).await.unwrap();
        assert_eq!(s.store.task_count(), 0);
    }

    #[tokio::test]
    async fn task_delete_of_a_removed_task_is_not_found() {
        let s = seeded().await;
        let task = task_assigned_to(&s, s.bob.id).await;
        let stale = task.access_ref();

        TaskStore::delete(&*s.store, &stale).await.unwrap();
        let err = TaskStore::delete(&*s.store, &stale).await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound(ref what) if what == "Task"));
    }

    #[tokio::test]
    async fn project_writes_need_a_matching_snapshot() {
        let s = seeded().await;
        let mut foreign = s.project.access_ref();
        foreign.created_by = s.bob.id;

        let changes = ProjectChanges {
            name: Some("Hijacked".to_string()),
            ..ProjectChanges::default()
        };
        let err = ProjectStore::update(&*s.store, &foreign, &changes).await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound(ref what) if what == "Project"));
        let err = ProjectStore::delete(&*s.store, &foreign).await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound(_)));

        let current = ProjectStore::find(&*s.store, can_read_scope(&s.alice), s.project.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.name, "Roadmap");
        assert_eq!(s.store.project_count(), 1);
    }

    #[tokio::test]
    async fn project_update_after_delete_is_not_found() {
        let s = seeded().await;
        let task = task_assigned_to(&s, s.bob.id).await;
        let snapshot = s.project.access_ref();

        ProjectStore::delete(&*s.store, &snapshot).await.unwrap();
        assert_eq!(s.store.task_count(), 0);

        let err = ProjectStore::update(&*s.store, &snapshot, &ProjectChanges::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound(_)));
        let err = TaskStore::update(&*s.store, &task.access_ref(), &reassign(s.carol.id))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound(_)));
    }
}
