use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::policy::ProjectRef;

text_enum!(ProjectStatus, "project status", default = Active, {
    Active => "active",
    Completed => "completed",
    OnHold => "on-hold",
});

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Project {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: ProjectStatus,
    pub created_by: i32,
    pub tenant_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn access_ref(&self) -> ProjectRef {
        ProjectRef {
            id: self.id,
            tenant_id: self.tenant_id,
            created_by: self.created_by,
        }
    }
}
