use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::policy::{Principal, Role};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub tenant_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The principal for requests made by this user. Role and tenant come
    /// from the stored row, never from token claims.
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.id,
            role: self.role,
            tenant_id: self.tenant_id,
        }
    }
}

impl TryFrom<String> for Role {
    type Error = super::UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse::<Role>().map_err(|_| super::UnknownVariant { kind: "role", value })
    }
}
