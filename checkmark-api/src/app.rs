/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use checkmark_api::{app::AppState, config::Config};
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::in_memory(config)?;
/// let app = checkmark_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{
        security::SecurityHeadersLayer,
        session::{require_api_session, require_page_session},
    },
    pages::{self, render_error_pages, Views},
    routes,
};
use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use checkmark_shared::auth::password::{Argon2Hasher, CredentialHasher};
use checkmark_shared::auth::session::{MemorySessionStore, SessionManager, SessionStore};
use checkmark_shared::repository::{MemoryRepository, TaskRepository, UserRepository};
use checkmark_shared::services::{AuthService, TaskService};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Signup and login
    pub auth: Arc<AuthService>,

    /// Owner-scoped task operations
    pub tasks: Arc<TaskService>,

    /// Session binding
    pub sessions: SessionManager,

    /// User store, for health checks
    pub users: Arc<dyn UserRepository>,

    /// Page templates
    pub views: Arc<Views>,

    /// Application configuration
    pub config: Arc<Config>,
}

/// The storage and hashing a running app is wired to
pub struct Backends {
    /// User persistence
    pub users: Arc<dyn UserRepository>,

    /// Task persistence
    pub tasks: Arc<dyn TaskRepository>,

    /// Session persistence
    pub sessions: Arc<dyn SessionStore>,

    /// Password hashing
    pub hasher: Arc<dyn CredentialHasher>,
}

impl AppState {
    /// Wires services over `backends`
    ///
    /// # Errors
    ///
    /// Returns an error if the page templates fail to compile.
    pub fn new(config: Config, backends: Backends) -> anyhow::Result<Self> {
        let Backends {
            users,
            tasks,
            sessions,
            hasher,
        } = backends;

        Ok(Self {
            auth: Arc::new(AuthService::new(users.clone(), hasher)),
            tasks: Arc::new(TaskService::new(tasks, users.clone())),
            sessions: SessionManager::new(sessions, config.session.ttl()),
            users,
            views: Arc::new(Views::new()?),
            config: Arc::new(config),
        })
    }

    /// In-memory repository and session store, Argon2 from `config.password`
    pub fn in_memory(config: Config) -> anyhow::Result<Self> {
        let repo = Arc::new(MemoryRepository::new());
        let hasher = Arc::new(Argon2Hasher::new(config.password));

        Self::new(
            config,
            Backends {
                users: repo.clone(),
                tasks: repo,
                sessions: Arc::new(MemorySessionStore::new()),
                hasher,
            },
        )
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET /health                   # Health check (public)
/// ├── /api/                         # JSON API
/// │   ├── POST   /accounts          # Signup (public)
/// │   ├── POST   /sessions          # Login (public)
/// │   ├── DELETE /sessions          # Logout (public)
/// │   ├── GET    /sessions/current  # (session)
/// │   └── /tasks/                   # (session)
/// │       ├── POST   /
/// │       ├── GET    /
/// │       ├── GET    /:id
/// │       ├── PUT    /:id
/// │       ├── DELETE /:id
/// │       └── POST   /:id/toggle
/// └── HTML pages                    # see `pages`
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Security headers
/// 2. CORS (tower-http CorsLayer)
/// 3. Logging (tower-http TraceLayer)
/// 4. Session resolution (per-route basis)
pub fn build_router(state: AppState) -> Router {
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let public_api = Router::new()
        .route("/accounts", post(routes::accounts::signup))
        .route(
            "/sessions",
            post(routes::sessions::login).delete(routes::sessions::logout),
        );

    let session_api = Router::new()
        .route("/sessions/current", get(routes::sessions::current))
        .route(
            "/tasks",
            post(routes::tasks::create_task).get(routes::tasks::list_tasks),
        )
        .route(
            "/tasks/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route("/tasks/:id/toggle", post(routes::tasks::toggle_task))
        .layer(from_fn_with_state(state.clone(), require_api_session));

    let public_pages = Router::new()
        .route("/", get(pages::auth::home))
        .route(
            "/signup",
            get(pages::auth::signup_form).post(pages::auth::signup),
        )
        .route("/login", get(pages::auth::login_form).post(pages::auth::login))
        .route("/logout", post(pages::auth::logout));

    let session_pages = Router::new()
        .route("/tasks", get(pages::tasks::list))
        .route(
            "/tasks/new",
            get(pages::tasks::new_form).post(pages::tasks::create),
        )
        .route(
            "/tasks/:id/edit",
            get(pages::tasks::edit_form).post(pages::tasks::update),
        )
        .route("/tasks/:id/toggle", post(pages::tasks::toggle))
        .route("/tasks/:id/delete", post(pages::tasks::delete))
        .layer(from_fn_with_state(state.clone(), require_page_session));

    let page_routes = Router::new()
        .merge(public_pages)
        .merge(session_pages)
        .layer(from_fn_with_state(state.clone(), render_error_pages));

    let api_routes = Router::new().merge(public_api).merge(session_api);

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .merge(page_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .layer(SecurityHeadersLayer::new(state.config.is_production()))
        .with_state(state)
}

/// Permissive for `*`; otherwise the listed origins with credentials
fn cors_layer(config: &Config) -> CorsLayer {
    if config.api.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
