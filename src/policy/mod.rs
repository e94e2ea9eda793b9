//! Tenant isolation and ownership rules for projects and tasks.
//!
//! Every function here is a pure predicate over snapshots the caller already
//! holds. Nothing is fetched, nothing is mutated, and the result is a
//! [`Decision`] value rather than an error: the handler layer decides how a
//! denial is reported over HTTP.
//!
//! Reads are never checked record by record. Instead [`can_read_scope`] hands
//! back a [`TenantScope`] that the stores bind into every query, so a record
//! from another tenant is simply never observed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role stored on the user row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// The authenticated caller of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub id: i32,
    pub role: Role,
    pub tenant_id: i32,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Mutations that go through an ownership check. Creation never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Update,
    Delete,
}

/// The fields of a project that decide access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectRef {
    pub id: i32,
    pub tenant_id: i32,
    pub created_by: i32,
}

/// The fields of a task that decide access.
///
/// `tenant_id` is the tenant of the parent project; tasks carry no tenant of
/// their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskRef {
    pub id: i32,
    pub project_id: i32,
    pub tenant_id: i32,
    pub created_by: i32,
    pub assigned_to: Option<i32>,
}

/// Outcome of an access check.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Forbidden,
    /// Missing, or present in a tenant the caller cannot see. The two are
    /// deliberately indistinguishable.
    NotFound,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Read filter for a single tenant. Only [`can_read_scope`] builds one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantScope {
    tenant_id: i32,
}

impl TenantScope {
    pub fn tenant_id(&self) -> i32 {
        self.tenant_id
    }

    pub fn contains(&self, tenant_id: i32) -> bool {
        self.tenant_id == tenant_id
    }
}

/// Tenant and creator stamped onto a newly created project or task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ownership {
    pub tenant_id: i32,
    pub created_by: i32,
}

impl From<&Principal> for Ownership {
    fn from(principal: &Principal) -> Self {
        Self {
            tenant_id: principal.tenant_id,
            created_by: principal.id,
        }
    }
}

/// Reads are confined to the caller's own tenant. Admins included.
pub fn can_read_scope(principal: &Principal) -> TenantScope {
    TenantScope {
        tenant_id: principal.tenant_id,
    }
}

/// Any authenticated principal may create inside their own tenant. The new
/// record's tenant and creator come from [`Ownership::from`], never from the
/// request body.
pub fn can_create(_principal: &Principal) -> Decision {
    Decision::Allow
}

pub fn can_mutate_project(
    principal: &Principal,
    project: Option<&ProjectRef>,
    _action: Action,
) -> Decision {
    let project = match project {
        Some(p) if p.tenant_id == principal.tenant_id => p,
        _ => return Decision::NotFound,
    };

    if principal.is_admin() || principal.id == project.created_by {
        Decision::Allow
    } else {
        Decision::Forbidden
    }
}

pub fn can_mutate_task(principal: &Principal, task: Option<&TaskRef>, action: Action) -> Decision {
    let task = match task {
        Some(t) if t.tenant_id == principal.tenant_id => t,
        _ => return Decision::NotFound,
    };

    if principal.is_admin() || principal.id == task.created_by {
        return Decision::Allow;
    }

    // Assignees may change a task but not remove it.
    match action {
        Action::Update if task.assigned_to == Some(principal.id) => Decision::Allow,
        _ => Decision::Forbidden,
    }
}
