//! Postgres implementations of the store traits.

mod projects;
mod tasks;
mod tenants;
mod users;

pub use projects::PgProjectStore;
pub use tasks::PgTaskStore;
pub use tenants::PgTenantStore;
pub use users::PgUserStore;
