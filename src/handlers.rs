use crate::{
    AppState,
    accounts::{self, LoginOutcome},
    articles,
    error::AppResult,
    models::{LoginForm, SaveArticleForm, SignupForm, User},
    session::Session,
    views,
};
use axum::{
    Extension, Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use maud::Markup;
use serde::Deserialize;

// --- Query Structs ---

/// SearchQuery
///
/// Query parameters of the home page (GET /).
#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Case-insensitive substring matched against title and content.
    pub search: Option<String>,
}

/// ArticleQuery
///
/// The `?id=` parameter shared by the read, update and delete routes.
#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ArticleQuery {
    pub id: i32,
}

// --- Article Handlers ---

/// index
///
/// [Public Route] Lists articles newest-first, optionally filtered by `?search=`.
#[utoipa::path(
    get,
    path = "/",
    params(SearchQuery),
    responses(
        (status = 200, description = "Article listing", content_type = "text/html", body = String)
    )
)]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Markup> {
    let list = articles::list(state.repo.as_ref(), query.search.as_deref()).await?;
    Ok(views::articles(&list, query.search.as_deref()))
}

/// read_article
///
/// [Public Route] Renders one article with its Markdown converted to HTML.
#[utoipa::path(
    get,
    path = "/read",
    params(ArticleQuery),
    responses(
        (status = 200, description = "Article", content_type = "text/html", body = String),
        (status = 404, description = "No such article")
    )
)]
pub async fn read_article(
    State(state): State<AppState>,
    Query(ArticleQuery { id }): Query<ArticleQuery>,
) -> AppResult<Markup> {
    let article = articles::fetch(state.repo.as_ref(), id).await?;
    Ok(views::article(&article))
}

/// create_form
///
/// [Authenticated Route] Blank article form.
#[utoipa::path(
    get,
    path = "/create",
    responses(
        (status = 200, description = "Blank form", content_type = "text/html", body = String),
        (status = 303, description = "Not logged in, redirected to /login")
    )
)]
pub async fn create_form(Extension(user): Extension<User>) -> Markup {
    tracing::debug!(user_id = user.id, "rendering blank article form");
    views::article_form(None)
}

/// update_form
///
/// [Authenticated Route] Article form prefilled with the stored Markdown.
#[utoipa::path(
    get,
    path = "/update",
    params(ArticleQuery),
    responses(
        (status = 200, description = "Prefilled form", content_type = "text/html", body = String),
        (status = 303, description = "Not logged in, redirected to /login"),
        (status = 404, description = "No such article")
    )
)]
pub async fn update_form(
    Extension(user): Extension<User>,
    State(state): State<AppState>,
    Query(ArticleQuery { id }): Query<ArticleQuery>,
) -> AppResult<Markup> {
    let article = articles::fetch_source(state.repo.as_ref(), id).await?;
    tracing::debug!(user_id = user.id, article_id = id, "rendering edit form");
    Ok(views::article_form(Some(&article)))
}

/// save_article
///
/// [Authenticated Route] Creates (empty `articleId`) or updates an article,
/// then returns to the listing.
#[utoipa::path(
    post,
    path = "/save",
    request_body(content = SaveArticleForm, content_type = "application/x-www-form-urlencoded"),
    responses((status = 303, description = "Saved, redirected to /"))
)]
pub async fn save_article(
    State(state): State<AppState>,
    Form(form): Form<SaveArticleForm>,
) -> AppResult<Redirect> {
    articles::save(state.repo.as_ref(), form.article_id, &form.title, &form.content).await?;
    Ok(Redirect::to("/"))
}

/// delete_article
///
/// [Authenticated Route] Deletes an article (absent ids are ignored), then
/// returns to the listing.
#[utoipa::path(
    get,
    path = "/delete",
    params(ArticleQuery),
    responses((status = 303, description = "Deleted, redirected to /"))
)]
pub async fn delete_article(
    State(state): State<AppState>,
    Query(ArticleQuery { id }): Query<ArticleQuery>,
) -> AppResult<Redirect> {
    articles::delete(state.repo.as_ref(), id).await?;
    Ok(Redirect::to("/"))
}

// --- Account Handlers ---

#[utoipa::path(
    get,
    path = "/login",
    responses(
        (status = 200, description = "Login form", content_type = "text/html", body = String)
    )
)]
pub async fn login_form() -> Markup {
    views::login_form()
}

/// login
///
/// [Public Route] Checks the credentials. Success stores the user in the
/// session and follows the pending return URL (or `/`); failure goes to `/wrong`.
#[utoipa::path(
    post,
    path = "/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (
            status = 303,
            description = "Redirected to the return URL or / on success, to /wrong otherwise"
        )
    )
)]
pub async fn login(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let outcome =
        accounts::login(state.repo.as_ref(), &mut session, &form.email, &form.password).await?;
    Ok(match outcome {
        LoginOutcome::Authenticated { redirect_to } => {
            (session, Redirect::to(&redirect_to)).into_response()
        }
        LoginOutcome::WrongCredentials => Redirect::to("/wrong").into_response(),
    })
}

#[utoipa::path(
    get,
    path = "/signup",
    responses(
        (status = 200, description = "Signup form", content_type = "text/html", body = String)
    )
)]
pub async fn signup_form() -> Markup {
    views::signup_form()
}

/// signup
///
/// [Public Route] Creates an account and sends the visitor to the login form.
#[utoipa::path(
    post,
    path = "/signup",
    request_body(content = SignupForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Account created, redirected to /login"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    Form(form): Form<SignupForm>,
) -> AppResult<Redirect> {
    accounts::signup(
        state.repo.as_ref(),
        state.config.bcrypt_cost,
        &form.name,
        &form.email,
        &form.password,
    )
    .await?;
    Ok(Redirect::to("/login"))
}

/// logout
///
/// [Public Route] Clears the logged-in user and confirms.
#[utoipa::path(
    get,
    path = "/logout",
    responses(
        (status = 200, description = "Logged out", content_type = "text/html", body = String)
    )
)]
pub async fn logout(mut session: Session) -> (Session, Markup) {
    accounts::logout(&mut session);
    (session, views::logged_out())
}

#[utoipa::path(
    get,
    path = "/wrong",
    responses(
        (
            status = 401,
            description = "Bad credentials page",
            content_type = "text/html",
            body = String
        )
    )
)]
pub async fn wrong_login() -> (StatusCode, Markup) {
    (StatusCode::UNAUTHORIZED, views::wrong_login())
}
