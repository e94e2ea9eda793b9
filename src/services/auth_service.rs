//! Registration, login and profile lookup.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::validation::{
    validate_email_format, validate_password, validate_tenant_name, validate_username_format, FieldErrors,
};
use crate::auth::{hash_password, verify_password, AuthError, JwtKeys};
use crate::database::models::User;
use crate::database::{DatabaseError, NewUser, TenantStore, UserStore};
use crate::error::ApiError;
use crate::policy::{can_read_scope, Principal, Role};

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// Name of a new tenant to create and join. Without it the user joins
    /// the default tenant.
    #[serde(default, alias = "tenantName")]
    pub tenant_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Body returned by register and login.
#[derive(Debug, Clone, Serialize)]
pub struct AuthPayload {
    pub message: &'static str,
    pub token: String,
    pub user: User,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    tenants: Arc<dyn TenantStore>,
    keys: JwtKeys,
    default_tenant_id: i32,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        tenants: Arc<dyn TenantStore>,
        keys: JwtKeys,
        default_tenant_id: i32,
    ) -> Self {
        Self {
            users,
            tenants,
            keys,
            default_tenant_id,
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<AuthPayload, ApiError> {
        let username = request.username.trim().to_string();
        let email = normalize_email(&request.email);
        let tenant_name = request
            .tenant_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        let mut errors = FieldErrors::new();
        errors.check("username", validate_username_format(&username));
        errors.check("email", validate_email_format(&email));
        errors.check("password", validate_password(&request.password));
        if let Some(name) = &tenant_name {
            errors.check("tenant_name", validate_tenant_name(name));
        }
        errors.into_result()?;

        if self.users.is_taken(&username, &email).await? {
            return Err(ApiError::bad_request("User already exists"));
        }

        let password_hash = hash_password(&request.password)?;

        let (tenant_id, created_tenant) = match tenant_name {
            Some(name) => {
                let tenant = self.tenants.create(&name).await?;
                info!("Created tenant {} ({})", tenant.name, tenant.id);
                (tenant.id, true)
            }
            None => match self.tenants.find_by_id(self.default_tenant_id).await? {
                Some(tenant) => (tenant.id, false),
                None => {
                    return Err(ApiError::bad_request(
                        "No tenant_name provided and default tenant does not exist. Please provide a tenant_name.",
                    ))
                }
            },
        };

        let user = self
            .users
            .create(NewUser {
                username,
                email,
                password_hash,
                role: Role::User,
                tenant_id,
            })
            .await
            .map_err(|e| match e {
                DatabaseError::UniqueViolation(_) => ApiError::bad_request("User already exists"),
                other => other.into(),
            })?;

        if created_tenant {
            self.tenants.set_creator(tenant_id, user.id).await?;
        }

        info!("Registered user {} in tenant {}", user.id, user.tenant_id);
        let token = self.keys.issue(user.id, &user.email, user.role)?;
        Ok(AuthPayload {
            message: "User registered successfully",
            token,
            user,
        })
    }

    pub async fn login(&self, request: LoginRequest) -> Result<AuthPayload, ApiError> {
        let email = normalize_email(&request.email);
        if email.is_empty() || request.password.is_empty() {
            return Err(ApiError::validation_error("Email and password are required", None));
        }

        let user = match self.users.find_by_email(&email).await? {
            Some(user) if verify_password(&request.password, &user.password_hash) => user,
            _ => {
                tracing::warn!("Failed login for {}", email);
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        let token = self.keys.issue(user.id, &user.email, user.role)?;
        Ok(AuthPayload {
            message: "Login successful",
            token,
            user,
        })
    }

    pub async fn profile(&self, principal: &Principal) -> Result<User, ApiError> {
        self.users
            .find_by_id(principal.id)
            .await?
            .ok_or_else(|| ApiError::resource_not_found("User"))
    }

    /// Users of the caller's tenant.
    pub async fn list_users(&self, principal: &Principal) -> Result<Vec<User>, ApiError> {
        Ok(self.users.list(can_read_scope(principal)).await?)
    }
}
