use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Every route that shows an editor or changes an article. The
/// `require_login` layer applied in `create_router` resolves the `User`
/// before any of these handlers run, and bounces anonymous visitors to
/// `/login`, remembering where they were headed.
///
/// `/save` and `/delete` sit here too: guarding only the forms would leave
/// the writes themselves open to anyone.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /create
        .route("/create", get(handlers::create_form))
        // GET /update?id=...
        // Form prefilled with the stored Markdown.
        .route("/update", get(handlers::update_form))
        // POST /save
        // Empty `articleId` inserts, otherwise updates that row.
        .route("/save", post(handlers::save_article))
        // GET /delete?id=...
        .route("/delete", get(handlers::delete_article))
}
