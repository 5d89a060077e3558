/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use habitpilot_api::{app::{build_router, AppState}, config::Config};
/// use habitpilot_shared::db::pool::{create_pool, DatabaseConfig};
/// use habitpilot_shared::store::PgStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(DatabaseConfig::from_url(config.database.url.clone())).await?;
/// let app = build_router(AppState::new(PgStore::new(pool), config));
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer, routes};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{from_fn_with_state, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use chrono::Duration;
use habitpilot_shared::{
    auth::{
        jwt::JwtKeys,
        middleware::{jwt_auth_middleware, AuthError},
    },
    score::ScoreService,
    store::{ScoreStore, StoreHealth, TaskStore, UserStore},
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into every handler; all fields are reference counted.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub tasks: Arc<dyn TaskStore>,
    pub scores: Arc<dyn ScoreStore>,
    pub health: Arc<dyn StoreHealth>,

    /// Token signing keys
    pub jwt: JwtKeys,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Builds state over a single store implementing every store trait
    pub fn new<S>(store: S, config: Config) -> Self
    where
        S: UserStore + TaskStore + ScoreStore + StoreHealth + 'static,
    {
        let store = Arc::new(store);
        let jwt = JwtKeys::with_ttls(
            &config.jwt.secret,
            Duration::hours(config.jwt.access_ttl_hours),
            Duration::days(config.jwt.refresh_ttl_days),
        );

        Self {
            users: store.clone(),
            tasks: store.clone(),
            scores: store.clone(),
            health: store,
            jwt,
            config: Arc::new(config),
        }
    }

    /// Score service over this state's stores
    pub fn score_service(&self) -> ScoreService<'_> {
        ScoreService::new(self.tasks.as_ref(), self.scores.as_ref())
    }
}

/// Builds the complete router
///
/// ```text
/// /
/// ├── GET  /health
/// └── /api
///     ├── /auth
///     │   ├── POST /register
///     │   ├── POST /login
///     │   ├── POST /refresh
///     │   └── GET  /me            (bearer)
///     ├── /tasks                  (bearer)
///     │   ├── GET    /
///     │   ├── POST   /
///     │   ├── GET    /:id
///     │   ├── PUT    /:id
///     │   └── DELETE /:id
///     └── /scores                 (bearer)
///         ├── GET  /daily?date=
///         ├── GET  /weekly
///         ├── GET  /monthly
///         ├── POST /recompute?start=&end=
///         └── GET  /summary?strategy=
/// ```
///
/// Layers, outermost first: security headers, CORS, request tracing.
pub fn build_router(state: AppState) -> Router {
    let auth_layer = from_fn_with_state(state.clone(), jwt_auth_layer);

    let auth_routes = Router::new()
        .route("/me", get(routes::auth::me))
        .route_layer(auth_layer.clone())
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    let task_routes = Router::new()
        .route(
            "/",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route_layer(auth_layer.clone());

    let score_routes = Router::new()
        .route("/daily", get(routes::scores::daily))
        .route("/weekly", get(routes::scores::weekly))
        .route("/monthly", get(routes::scores::monthly))
        .route("/recompute", post(routes::scores::recompute))
        .route("/summary", get(routes::scores::summary))
        .route_layer(auth_layer);

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/tasks", task_routes)
        .nest("/scores", score_routes);

    let cors = cors_layer(&state.config.api.cors_origins);
    let production = state.config.api.production;

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api_routes)
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(production))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
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

async fn jwt_auth_layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    jwt_auth_middleware(state.jwt.clone(), req, next).await
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}
