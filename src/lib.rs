use axum::{
    Json, Router,
    extract::FromRef,
    http::HeaderName,
    middleware,
    routing::get,
};
use utoipa::OpenApi;

use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Use-cases, independent of HTTP.
pub mod accounts;
pub mod articles;

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod markdown;
pub mod models;
pub mod repository;
pub mod session;
pub mod views;

// Module for routing segregation (Public, Authenticated).
pub mod routes;
use routes::{authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use repository::{MemoryRepository, PostgresRepository, RepositoryState};
pub use session::{Session, SessionKeys};

/// ApiDoc
///
/// OpenAPI catalogue of every route, assembled from the `#[utoipa::path]`
/// annotations on the handlers and served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::index, handlers::read_article, handlers::create_form,
        handlers::update_form, handlers::save_article, handlers::delete_article,
        handlers::login_form, handlers::login, handlers::signup_form,
        handlers::signup, handlers::logout, handlers::wrong_login
    ),
    components(
        schemas(models::Article, models::SaveArticleForm, models::LoginForm, models::SignupForm)
    ),
    tags(
        (name = "blog", description = "Markdown blog with session login")
    )
)]
pub struct ApiDoc;

/// AppState
///
/// The single, immutable container of everything a request may need. Built
/// once in `main` and cloned cheaply into each handler.
#[derive(Clone)]
pub struct AppState {
    /// Persistence: every SQL statement goes through this handle.
    pub repo: RepositoryState,
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
    /// Session signing keys derived from `config`.
    pub sessions: SessionKeys,
}

impl AppState {
    pub fn new(repo: RepositoryState, config: AppConfig) -> Self {
        let sessions = SessionKeys::from_config(&config);
        Self {
            repo,
            config,
            sessions,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(app_state: &AppState) -> SessionKeys {
        app_state.sessions.clone()
    }
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// create_router
///
/// Assembles the routing structure, applies the login guard to the
/// authenticated routes and wraps everything in the request-id and tracing
/// layers.
pub fn create_router(state: AppState) -> Router {
    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .route("/api-docs/openapi.json", get(openapi_json))
        // Public Routes: No middleware applied.
        .merge(public::public_routes())
        // Authenticated Routes: anonymous visitors are redirected to /login.
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_login)),
        )
        .with_state(state);

    base_router.layer(
        ServiceBuilder::new()
            // Request ID Generation: a UUID for every incoming request.
            .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
            // Request Tracing: one span per request, carrying the request ID.
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(trace_span_logger)
                    .on_response(
                        DefaultOnResponse::new()
                            .level(Level::INFO)
                            .latency_unit(tower_http::LatencyUnit::Millis),
                    ),
            )
            // Request ID Propagation: echo x-request-id back to the client.
            .layer(PropagateRequestIdLayer::new(x_request_id)),
    )
}

/// trace_span_logger
///
/// Builds the `TraceLayer` span so every log line of a request is correlated
/// by its `x-request-id`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
