use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Reading articles and the whole login/signup flow. Nothing here consults
/// the auth guard; handlers that need the session extract it themselves.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers; answers without touching the database.
        .route("/health", get(|| async { "ok" }))
        // GET /?search=...
        // Article listing, newest first, optionally filtered.
        .route("/", get(handlers::index))
        // GET /read?id=...
        .route("/read", get(handlers::read_article))
        // GET/POST /login
        // POST consumes the pending return URL stored by the guard.
        .route("/login", get(handlers::login_form).post(handlers::login))
        // GET/POST /signup
        .route("/signup", get(handlers::signup_form).post(handlers::signup))
        // GET /logout
        .route("/logout", get(handlers::logout))
        // GET /wrong
        // Landing page for failed logins, served with 401.
        .route("/wrong", get(handlers::wrong_login))
}
