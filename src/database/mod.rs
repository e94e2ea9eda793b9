pub mod manager;
pub mod models;
pub mod repository;
pub mod stores;

pub use manager::{Database, DatabaseError};
pub use repository::{
    NewProject, NewTask, NewUser, ProjectChanges, ProjectStore, TaskChanges, TaskStore, TenantStore, UserStore,
};
