use axum::{
    extract::{Request, State},
    http::{Method, Uri},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    AppState,
    error::AppResult,
    models::User,
    repository::Repository,
    session::Session,
};

/// resolve_current_user
///
/// Looks up the account behind the session's user id. A missing id and an id
/// whose account no longer exists both resolve to `None`; in that case the
/// visitor is about to be bounced to the login form, so `return_url` (when
/// given) is remembered in the session for after the login.
///
/// An already-authenticated visitor's pending return URL is left alone.
pub async fn resolve_current_user(
    repo: &dyn Repository,
    session: &mut Session,
    return_url: Option<&str>,
) -> AppResult<Option<User>> {
    let user = match session.user_id() {
        Some(id) => repo.find_user(id).await?,
        None => None,
    };

    if let (None, Some(url)) = (&user, return_url) {
        session.set_return_url(url);
    }

    Ok(user)
}

/// return_url_for
///
/// Only `GET` requests are worth returning to: replaying a form post after
/// login would arrive without its body.
pub fn return_url_for(method: &Method, uri: &Uri) -> Option<String> {
    if method != Method::GET {
        return None;
    }
    uri.path_and_query().map(|pq| pq.as_str().to_string())
}

/// require_login
///
/// Middleware guarding the authenticated router. On success the resolved
/// [`User`] is placed in the request extensions for the handler to extract;
/// otherwise the request never reaches the handler and the visitor is
/// redirected to `/login` with the updated session cookie.
pub async fn require_login(
    State(state): State<AppState>,
    mut session: Session,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let return_url = return_url_for(request.method(), request.uri());

    match resolve_current_user(state.repo.as_ref(), &mut session, return_url.as_deref()).await? {
        Some(user) => {
            request.extensions_mut().insert(user);
            Ok(next.run(request).await)
        }
        None => {
            tracing::debug!(uri = %request.uri(), "anonymous request to guarded route");
            Ok((session, Redirect::to("/login")).into_response())
        }
    }
}
