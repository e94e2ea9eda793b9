use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::Task;
use crate::database::repository::{NewTask, TaskChanges, TaskStore};
use crate::policy::{TaskRef, TenantScope};

/// Task columns plus the owning project's tenant, for a row aliased `t`
/// joined to `projects p`.
const TASK_COLUMNS: &str = "t.id, t.title, t.description, t.status, t.priority, t.due_date, \
     t.project_id, t.assigned_to, t.created_by, p.tenant_id, t.created_at, t.updated_at";

pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn list(&self, scope: TenantScope, project_id: i32) -> Result<Vec<Task>, DatabaseError> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks t
             JOIN projects p ON p.id = t.project_id
             WHERE p.tenant_id = $1 AND t.project_id = $2
             ORDER BY t.created_at DESC, t.id DESC"
        ))
        .bind(scope.tenant_id())
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    async fn find(&self, scope: TenantScope, project_id: i32, task_id: i32) -> Result<Option<Task>, DatabaseError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks t
             JOIN projects p ON p.id = t.project_id
             WHERE p.tenant_id = $1 AND t.project_id = $2 AND t.id = $3"
        ))
        .bind(scope.tenant_id())
        .bind(project_id)
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn create(&self, task: NewTask) -> Result<Task, DatabaseError> {
        // The insert only happens if the project sits in the creator's tenant.
        let created = sqlx::query_as::<_, Task>(&format!(
            "WITH t AS (
                INSERT INTO tasks (title, description, status, priority, due_date, project_id, assigned_to, created_by)
                SELECT $1, $2, $3, $4, $5, id, $7, $8 FROM projects WHERE id = $6 AND tenant_id = $9
                RETURNING *
             )
             SELECT {TASK_COLUMNS} FROM t JOIN projects p ON p.id = t.project_id"
        ))
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(task.priority.as_str())
        .bind(task.due_date)
        .bind(task.project_id)
        .bind(task.assigned_to)
        .bind(task.owner.created_by)
        .bind(task.owner.tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        created.ok_or_else(|| DatabaseError::NotFound("Project".to_string()))
    }

    async fn update(&self, snapshot: &TaskRef, changes: &TaskChanges) -> Result<Task, DatabaseError> {
        let updated = sqlx::query_as::<_, Task>(&format!(
            "WITH t AS (
                UPDATE tasks SET
                    title = COALESCE($6, title),
                    description = CASE WHEN $7 THEN $8 ELSE description END,
                    status = COALESCE($9, status),
                    priority = COALESCE($10, priority),
                    due_date = CASE WHEN $11 THEN $12 ELSE due_date END,
                    assigned_to = CASE WHEN $13 THEN $14 ELSE assigned_to END,
                    updated_at = NOW()
                WHERE id = $1 AND project_id = $2 AND created_by = $3
                  AND assigned_to IS NOT DISTINCT FROM $4
                  AND project_id IN (SELECT id FROM projects WHERE tenant_id = $5)
                RETURNING *
             )
             SELECT {TASK_COLUMNS} FROM t JOIN projects p ON p.id = t.project_id"
        ))
        .bind(snapshot.id)
        .bind(snapshot.project_id)
        .bind(snapshot.created_by)
        .bind(snapshot.assigned_to)
        .bind(snapshot.tenant_id)
        .bind(changes.title.as_deref())
        .bind(changes.description.is_some())
        .bind(changes.description.as_ref().and_then(|d| d.as_deref()))
        .bind(changes.status.map(|s| s.as_str()))
        .bind(changes.priority.map(|p| p.as_str()))
        .bind(changes.due_date.is_some())
        .bind(changes.due_date.flatten())
        .bind(changes.assigned_to.is_some())
        .bind(changes.assigned_to.flatten())
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| DatabaseError::NotFound("Task".to_string()))
    }

    async fn delete(&self, snapshot: &TaskRef) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "DELETE FROM tasks
             WHERE id = $1 AND project_id = $2 AND created_by = $3
               AND project_id IN (SELECT id FROM projects WHERE tenant_id = $4)",
        )
        .bind(snapshot.id)
        .bind(snapshot.project_id)
        .bind(snapshot.created_by)
        .bind(snapshot.tenant_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("Task".to_string()));
        }
        Ok(())
    }
}
