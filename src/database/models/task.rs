use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::policy::TaskRef;

text_enum!(TaskStatus, "task status", default = Pending, {
    Pending => "pending",
    InProgress => "in-progress",
    Completed => "completed",
});

text_enum!(TaskPriority, "task priority", default = Medium, {
    Low => "low",
    Medium => "medium",
    High => "high",
});

/// A task row joined with its project's tenant.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Task {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: TaskStatus,
    #[sqlx(try_from = "String")]
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub project_id: i32,
    pub assigned_to: Option<i32>,
    pub created_by: i32,
    #[serde(skip_serializing)]
    pub tenant_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn access_ref(&self) -> TaskRef {
        TaskRef {
            id: self.id,
            project_id: self.project_id,
            tenant_id: self.tenant_id,
            created_by: self.created_by,
            assigned_to: self.assigned_to,
        }
    }
}
