/// Application state and router builder
///
/// Defines the shared application state and builds the Axum router with all
/// routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskdeck_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = taskdeck_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```
use crate::config::Config;
use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskdeck_shared::{
    auth::{authenticator::Authenticator, token::TokenCodec},
    models::user::PgUserDirectory,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; everything
/// inside is either a pool handle or an `Arc`, so the clone is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Access token codec, derived from the configured secret
    pub codec: TokenCodec,

    /// Request authenticator holding both credential strategies
    pub authenticator: Arc<Authenticator>,
}

impl AppState {
    /// Creates new application state
    ///
    /// Wires the Postgres user directory and the token codec into one
    /// authenticator; the secret never leaves the codec after this point.
    pub fn new(db: PgPool, config: Config) -> Self {
        let codec = TokenCodec::new(&config.auth.secret);
        let directory = Arc::new(PgUserDirectory::new(db.clone()));
        let authenticator = Arc::new(Authenticator::new(directory, codec.clone()));

        Self {
            db,
            config: Arc::new(config),
            codec,
            authenticator,
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                   # Health check (public)
/// └── /v1/
///     ├── /auth/
///     │   ├── POST /register    # Create account (public)
///     │   └── POST /login       # Issue access token (public)
///     └── /tasks/               # Task resource (authenticated)
///         ├── GET    /
///         ├── POST   /
///         ├── GET    /:id
///         ├── PATCH  /:id
///         └── DELETE /:id
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Authentication (task routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Public: no credential exists before these are called
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    // Every task handler runs behind the authenticator; handlers receive
    // the resolved AuthContext from request extensions and never see the
    // raw credential headers.
    let task_routes = Router::new()
        .route(
            "/",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .patch(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/tasks", task_routes);

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Authentication middleware layer
///
/// Resolves the request's credential (API key or bearer token) to an
/// `AuthContext` and injects it into the request extensions. Rejections
/// convert to their HTTP form through `ApiError`.
async fn require_auth(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let context = state.authenticator.authenticate(req.headers()).await?;

    tracing::debug!(
        user_id = context.user_id,
        method = ?context.method,
        "Request authenticated"
    );

    req.extensions_mut().insert(context);

    Ok(next.run(req).await)
}
