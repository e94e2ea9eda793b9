use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::Project;
use crate::database::repository::{NewProject, ProjectChanges, ProjectStore};
use crate::policy::{ProjectRef, TenantScope};

const PROJECT_COLUMNS: &str = "id, name, description, status, created_by, tenant_id, created_at, updated_at";

pub struct PgProjectStore {
    pool: PgPool,
}

impl PgProjectStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectStore for PgProjectStore {
    async fn list(&self, scope: TenantScope) -> Result<Vec<Project>, DatabaseError> {
        let projects = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects
             WHERE tenant_id = $1
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(scope.tenant_id())
        .fetch_all(&self.pool)
        .await?;
        Ok(projects)
    }

    async fn find(&self, scope: TenantScope, id: i32) -> Result<Option<Project>, DatabaseError> {
        let project = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1 AND tenant_id = $2"
        ))
        .bind(id)
        .bind(scope.tenant_id())
        .fetch_optional(&self.pool)
        .await?;
        Ok(project)
    }

    async fn create(&self, project: NewProject) -> Result<Project, DatabaseError> {
        let created = sqlx::query_as::<_, Project>(&format!(
            "INSERT INTO projects (name, description, status, created_by, tenant_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.status.as_str())
        .bind(project.owner.created_by)
        .bind(project.owner.tenant_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update(&self, snapshot: &ProjectRef, changes: &ProjectChanges) -> Result<Project, DatabaseError> {
        let updated = sqlx::query_as::<_, Project>(&format!(
            "UPDATE projects SET
                name = COALESCE($4, name),
                description = CASE WHEN $5 THEN $6 ELSE description END,
                status = COALESCE($7, status),
                updated_at = NOW()
             WHERE id = $1 AND tenant_id = $2 AND created_by = $3
             RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(snapshot.id)
        .bind(snapshot.tenant_id)
        .bind(snapshot.created_by)
        .bind(changes.name.as_deref())
        .bind(changes.description.is_some())
        .bind(changes.description.as_ref().and_then(|d| d.as_deref()))
        .bind(changes.status.map(|s| s.as_str()))
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| DatabaseError::NotFound("Project".to_string()))
    }

    async fn delete(&self, snapshot: &ProjectRef) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND tenant_id = $2 AND created_by = $3")
            .bind(snapshot.id)
            .bind(snapshot.tenant_id)
            .bind(snapshot.created_by)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("Project".to_string()));
        }
        Ok(())
    }
}
