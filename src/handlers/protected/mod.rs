// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every route here sits behind `jwt_auth_middleware`, which places the
// caller's `Principal` in request extensions. Tenant scoping and ownership
// checks happen in the services these handlers call.
pub mod auth;
pub mod projects;
pub mod tasks;
pub mod users;

pub use auth::profile_get;
