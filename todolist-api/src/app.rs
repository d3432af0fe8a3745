/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use todolist_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let url = config.database.as_ref().map(|db| db.url.clone()).unwrap_or_default();
/// let pool = PgPool::connect(&url).await?;
/// let state = AppState::new(pool, config);
/// let app = todolist_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use todolist_shared::{
    accounts::CredentialStore,
    auth::{jwt::TokenService, middleware::authorize, password::PasswordHasher},
    store::{MemoryStore, PgStore, TodoStore, UserStore},
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Every field is an `Arc` or wraps one, so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Registration and login
    pub accounts: CredentialStore,

    /// User records
    pub users: Arc<dyn UserStore>,

    /// Ownership-scoped todos
    pub todos: Arc<dyn TodoStore>,

    /// Access token signing and validation
    pub tokens: TokenService,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates application state backed by PostgreSQL
    pub fn new(db: PgPool, config: Config) -> Self {
        let store = Arc::new(PgStore::new(db));
        Self::with_stores(store.clone(), store, config)
    }

    /// Creates application state that keeps everything in memory
    pub fn in_memory(config: Config) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::with_stores(store.clone(), store, config)
    }

    /// Creates application state over the given stores
    pub fn with_stores(
        users: Arc<dyn UserStore>,
        todos: Arc<dyn TodoStore>,
        config: Config,
    ) -> Self {
        Self {
            accounts: CredentialStore::new(users.clone()),
            users,
            todos,
            tokens: TokenService::new(&config.jwt.secret),
            config: Arc::new(config),
        }
    }

    /// Replaces the password hasher used for registration and login
    pub fn with_password_hasher(mut self, hasher: PasswordHasher) -> Self {
        self.accounts = CredentialStore::with_hasher(self.users.clone(), hasher);
        self
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET    /health            # Health check (public)
/// ├── POST   /register          # Create account, returns token (public)
/// ├── POST   /login             # Returns token (public)
/// ├── GET    /todos             # List own todos (bearer)
/// ├── POST   /todos             # Create todo (bearer)
/// ├── PUT    /todos/:id         # Replace todo (bearer)
/// └── DELETE /todos/:id         # Delete todo (bearer)
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Bearer authentication (todo routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    // Todo routes (require bearer authentication)
    let todo_routes = Router::new()
        .route(
            "/todos",
            get(routes::todos::list_todos).post(routes::todos::create_todo),
        )
        // `/todos/` has no id segment to match, so it reaches the 404 fallback
        .route(
            "/todos/:id",
            put(routes::todos::update_todo).delete(routes::todos::delete_todo),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    Router::new()
        .merge(health_routes)
        .merge(auth_routes)
        .merge(todo_routes)
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .with_state(state)
}

/// CORS policy from configuration
fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
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
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// Bearer authentication middleware layer
///
/// Resolves the `Authorization` header to an identity and injects it into
/// the request extensions, where handlers pick it up as an `AuthContext`.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_context = authorize(req.headers(), &state.tokens)?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}

/// Resolves once `signal` fires, for use with graceful shutdown
///
/// If the signal cannot be listened for, this never resolves and the server
/// keeps running until the process is killed.
pub async fn shutdown_on<F>(signal: F)
where
    F: std::future::Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, exiting...");
}
