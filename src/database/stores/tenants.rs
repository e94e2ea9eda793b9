use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::Tenant;
use crate::database::repository::TenantStore;

const TENANT_COLUMNS: &str = "id, name, created_by, created_at, updated_at";

pub struct PgTenantStore {
    pool: PgPool,
}

impl PgTenantStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantStore for PgTenantStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<Tenant>, DatabaseError> {
        let tenant = sqlx::query_as::<_, Tenant>(&format!(
            "SELECT {TENANT_COLUMNS} FROM tenants WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tenant)
    }

    async fn create(&self, name: &str) -> Result<Tenant, DatabaseError> {
        let tenant = sqlx::query_as::<_, Tenant>(&format!(
            "INSERT INTO tenants (name) VALUES ($1) RETURNING {TENANT_COLUMNS}"
        ))
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("Created tenant {} ({})", tenant.id, tenant.name);
        Ok(tenant)
    }

    async fn set_creator(&self, tenant_id: i32, user_id: i32) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE tenants SET created_by = $2, updated_at = NOW() WHERE id = $1")
            .bind(tenant_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
