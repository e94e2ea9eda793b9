//! Shared state and router assembly.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::JwtKeys;
use crate::config::{AppConfig, Environment};
use crate::database::stores::{PgProjectStore, PgTaskStore, PgTenantStore, PgUserStore};
use crate::database::{Database, ProjectStore, TaskStore, TenantStore, UserStore};
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::services::{AuthService, ProjectService, TaskService};

/// Everything a handler can reach. Cloned per request, so every field is a
/// cheap handle.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Database,
    pub keys: JwtKeys,
    pub users: Arc<dyn UserStore>,
    pub auth: AuthService,
    pub projects: ProjectService,
    pub tasks: TaskService,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        db: Database,
        tenants: Arc<dyn TenantStore>,
        users: Arc<dyn UserStore>,
        projects: Arc<dyn ProjectStore>,
        tasks: Arc<dyn TaskStore>,
    ) -> Self {
        let keys = JwtKeys::from_config(&config.security);
        let auth = AuthService::new(users.clone(), tenants, keys.clone(), config.tenancy.default_tenant_id);

        Self {
            config: Arc::new(config),
            db,
            keys,
            users: users.clone(),
            auth,
            projects: ProjectService::new(projects.clone()),
            tasks: TaskService::new(projects, tasks, users),
        }
    }

    /// State backed by the Postgres stores sharing `db`'s pool.
    pub fn postgres(config: AppConfig, db: Database) -> Self {
        let pool = db.pool().clone();
        Self::new(
            config,
            db,
            Arc::new(PgTenantStore::new(pool.clone())),
            Arc::new(PgUserStore::new(pool.clone())),
            Arc::new(PgProjectStore::new(pool.clone())),
            Arc::new(PgTaskStore::new(pool)),
        )
    }
}

pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(public::root_get))
        .route("/health", get(public::health_get))
        .merge(auth_public_routes())
        // Protected
        .merge(protected_routes(state.clone()))
        .fallback(route_not_found)
        // Global middleware
        .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes))
        .layer(cors_layer(&state.config));

    if state.config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use axum::routing::post;

    Router::new()
        .route("/api/auth/register", post(public::register_post))
        .route("/api/auth/login", post(public::login_post))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{projects, tasks, users};

    Router::new()
        .route("/api/auth/profile", get(protected::profile_get))
        .route("/api/users", get(users::list))
        .route("/api/projects", get(projects::list).post(projects::post))
        .route(
            "/api/projects/:id",
            get(projects::get).put(projects::put).delete(projects::delete),
        )
        .route(
            "/api/projects/:project_id/tasks",
            get(tasks::list).post(tasks::post),
        )
        .route(
            "/api/projects/:project_id/tasks/:task_id",
            get(tasks::get).put(tasks::put).delete(tasks::delete),
        )
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

/// Any origin in development; the configured list elsewhere.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    if config.environment == Environment::Development {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
}

async fn route_not_found() -> ApiError {
    ApiError::not_found("Route not found")
}
