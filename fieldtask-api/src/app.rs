/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use fieldtask_api::app::{build_router, AppState, Backends};
/// use fieldtask_api::config::Config;
/// use fieldtask_shared::services::notification::TracingSink;
/// use sqlx::PgPool;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::load()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(config, Backends::postgres(pool, Arc::new(TracingSink)));
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, validation::RoleRule};
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use fieldtask_shared::{
    auth::{
        credentials::CredentialHasher,
        jwt::SessionCodec,
        middleware::{create_bearer_middleware, require_manager_middleware},
    },
    services::{
        auth::AuthService,
        health::HealthService,
        notification::{NotificationService, NotificationSink},
        task::TaskService,
        user::UserService,
    },
    store::{memory::MemoryStore, postgres::PgStore, HealthProbe, TaskStore, UserStore},
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Storage and delivery collaborators behind the services
#[derive(Debug, Clone)]
pub struct Backends {
    pub users: Arc<dyn UserStore>,
    pub tasks: Arc<dyn TaskStore>,
    pub health: Arc<dyn HealthProbe>,
    pub sink: Arc<dyn NotificationSink>,
}

impl Backends {
    /// Every store backed by one PostgreSQL pool
    pub fn postgres(pool: PgPool, sink: Arc<dyn NotificationSink>) -> Self {
        let store = Arc::new(PgStore::new(pool));
        Self {
            users: store.clone(),
            tasks: store.clone(),
            health: store,
            sink,
        }
    }

    /// Every store backed by one in-memory store
    pub fn memory(store: MemoryStore, sink: Arc<dyn NotificationSink>) -> Self {
        let store = Arc::new(store);
        Self {
            users: store.clone(),
            tasks: store.clone(),
            health: store,
            sink,
        }
    }
}

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Every field is `Arc`-backed, so cloning is cheap.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,

    /// Session token codec, shared with the bearer gate
    pub codec: Arc<SessionCodec>,

    pub users: UserService,
    pub auth: AuthService,
    pub tasks: TaskService,
    pub notifications: NotificationService,
    pub health: HealthService,

    /// Accepted values for the `role` field of new users
    pub role_rule: RoleRule,
}

impl AppState {
    /// Wires the services over `backends` using the keys in `config`
    pub fn new(config: Config, backends: Backends) -> Self {
        let hasher = Arc::new(CredentialHasher::new(&config.security.hash_key));
        let codec = Arc::new(SessionCodec::from_millis(
            &config.security.jwt_key,
            config.security.jwt_expires_in_ms,
        ));

        let users = UserService::new(backends.users, hasher);
        let auth = AuthService::new(users.clone(), codec.clone());
        let tasks = TaskService::new(backends.tasks);
        let notifications = NotificationService::new(
            users.clone(),
            backends.sink,
            config.notification.summary_max_len,
        );
        let health = HealthService::new(backends.health);

        Self {
            config: Arc::new(config),
            codec,
            users,
            auth,
            tasks,
            notifications,
            health,
            role_rule: RoleRule::default(),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /api
/// ├── GET  /healthcheck        # Store health (public)
/// ├── POST /auth/login         # Basic credentials → session token
/// ├── POST /users              # Create user (bearer + manager)
/// └── /tasks                   # (bearer)
///     ├── POST /               # Create task, notify managers
///     └── GET  /               # List visible tasks
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Bearer and manager gates (per-route basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let bearer = middleware::from_fn(create_bearer_middleware(state.codec.clone()));

    // Public routes
    let public_routes = Router::new()
        .route("/healthcheck", get(routes::health::health_check))
        .route("/auth/login", post(routes::auth::login));

    // Manager only; the bearer gate must run first, so it is added last
    let user_routes = Router::new()
        .route("/users", post(routes::users::create_user))
        .layer(middleware::from_fn(require_manager_middleware))
        .layer(bearer.clone());

    let task_routes = Router::new()
        .route(
            "/tasks",
            post(routes::tasks::create_task).get(routes::tasks::list_tasks),
        )
        .layer(bearer);

    let api_routes = Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(task_routes);

    // Configure CORS based on environment
    let cors = if state.config.server.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .server
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
