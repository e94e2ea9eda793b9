pub mod auth_service;
pub mod project_service;
pub mod task_service;
pub mod validation;

pub use auth_service::{AuthPayload, AuthService, LoginRequest, RegisterRequest};
pub use project_service::{CreateProjectRequest, ProjectService};
pub use task_service::{CreateTaskRequest, TaskService};

use crate::policy::{Action, Decision, Principal};

/// Record the outcome of an ownership check.
fn log_decision(principal: &Principal, action: Action, resource: &str, id: i32, decision: Decision) {
    match decision {
        Decision::Allow => tracing::debug!(
            "Allowed {:?} on {} {} for user {} (tenant {})",
            action, resource, id, principal.id, principal.tenant_id
        ),
        denied => tracing::warn!(
            "Denied {:?} on {} {} for user {} (tenant {}): {:?}",
            action, resource, id, principal.id, principal.tenant_id, denied
        ),
    }
}
