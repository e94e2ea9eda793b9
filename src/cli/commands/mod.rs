pub mod auth;
pub mod project;
pub mod server;
pub mod task;
pub mod users;
