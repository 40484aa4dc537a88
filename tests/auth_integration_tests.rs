use async_trait::async_trait;
use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{Method, Request, StatusCode, Uri, header, request::Parts},
};
use blog_portal::{
    AppResult, AppState, Session, SessionKeys,
    auth::{resolve_current_user, return_url_for},
    config::AppConfig,
    create_router,
    models::{Account, Article, User},
    repository::Repository,
    session::SessionData,
};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

// --- Mock Repository for Auth Logic ---

#[derive(Default)]
struct MockAuthRepo {
    user_to_return: Option<User>,
    // Every id passed to `find_user`.
    lookups: Mutex<Vec<i32>>,
}

#[async_trait]
impl Repository for MockAuthRepo {
    async fn find_user(&self, id: i32) -> AppResult<Option<User>> {
        self.lookups.lock().unwrap().push(id);
        Ok(self.user_to_return.clone().filter(|u| u.id == id))
    }
    // Unused by the guard.
    async fn search_articles(&self, _query: Option<&str>) -> AppResult<Vec<Article>> {
        Ok(vec![])
    }
    async fn get_article(&self, _id: i32) -> AppResult<Option<Article>> {
        Ok(None)
    }
    async fn create_article(&self, _title: &str, _content: &str) -> AppResult<Article> {
        Ok(Article::default())
    }
    async fn update_article(&self, _id: i32, _title: &str, _content: &str) -> AppResult<u64> {
        Ok(0)
    }
    async fn delete_article(&self, _id: i32) -> AppResult<u64> {
        Ok(0)
    }
    async fn create_account(&self, _n: &str, _e: &str, _p: &str) -> AppResult<Account> {
        Ok(Account::default())
    }
    async fn find_account_by_email(&self, _email: &str) -> AppResult<Option<Account>> {
        Ok(None)
    }
}

// --- Helper Functions ---

const TEST_USER_ID: i32 = 7;

fn test_user() -> User {
    User {
        id: TEST_USER_ID,
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
    }
}

fn create_app_state(repo: MockAuthRepo) -> AppState {
    AppState::new(Arc::new(repo), AppConfig::default())
}

fn session_with(state: &AppState, data: SessionData) -> Session {
    Session::with_data(state.sessions.clone(), data)
}

fn cookie_header(session: &Session) -> String {
    let cookie = session.to_cookie().unwrap();
    format!("{}={}", cookie.name(), cookie.value())
}

/// Helper to get the mutable Parts struct from a generated Request
fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

// --- resolve_current_user ---

#[tokio::test]
async fn test_resolves_logged_in_user() {
    let repo = MockAuthRepo {
        user_to_return: Some(test_user()),
        ..Default::default()
    };
    let state = create_app_state(MockAuthRepo::default());
    let mut session = session_with(
        &state,
        SessionData {
            user_id: Some(TEST_USER_ID),
            return_url: None,
        },
    );

    let user = resolve_current_user(&repo, &mut session, Some("/create"))
        .await
        .unwrap();

    assert_eq!(user, Some(test_user()));
    assert_eq!(session.return_url(), None);
    assert!(!session.is_changed());
}

#[tokio::test]
async fn test_anonymous_visitor_gets_return_url_stored() {
    let repo = MockAuthRepo::default();
    let mut session = Session::new(create_app_state(MockAuthRepo::default()).sessions);

    let user = resolve_current_user(&repo, &mut session, Some("/update?id=3"))
        .await
        .unwrap();

    assert!(user.is_none());
    assert_eq!(session.return_url(), Some("/update?id=3"));
    // No user id means no lookup.
    assert!(repo.lookups.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_stale_user_id_is_treated_as_anonymous() {
    let repo = MockAuthRepo::default();
    let state = create_app_state(MockAuthRepo::default());
    let mut session = session_with(
        &state,
        SessionData {
            user_id: Some(404),
            return_url: None,
        },
    );

    let user = resolve_current_user(&repo, &mut session, Some("/create"))
        .await
        .unwrap();

    assert!(user.is_none());
    assert_eq!(*repo.lookups.lock().unwrap(), vec![404]);
    assert_eq!(session.return_url(), Some("/create"));
}

#[tokio::test]
async fn test_authenticated_visit_keeps_pending_return_url() {
    let repo = MockAuthRepo {
        user_to_return: Some(test_user()),
        ..Default::default()
    };
    let state = create_app_state(MockAuthRepo::default());
    let mut session = session_with(
        &state,
        SessionData {
            user_id: Some(TEST_USER_ID),
            return_url: Some("/update?id=1".to_string()),
        },
    );

    resolve_current_user(&repo, &mut session, Some("/create"))
        .await
        .unwrap();

    assert_eq!(session.return_url(), Some("/update?id=1"));
}

#[test]
fn test_return_url_only_for_get() {
    let uri: Uri = "/update?id=9".parse().unwrap();
    assert_eq!(
        return_url_for(&Method::GET, &uri).as_deref(),
        Some("/update?id=9")
    );
    assert_eq!(return_url_for(&Method::POST, &uri), None);
}

// --- Session extractor ---

#[tokio::test]
async fn test_session_extractor_reads_cookie() {
    let state = create_app_state(MockAuthRepo::default());
    let mut issued = Session::new(state.sessions.clone());
    issued.set_user_id(TEST_USER_ID);

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::COOKIE,
        header::HeaderValue::from_str(&cookie_header(&issued)).unwrap(),
    );

    let session = Session::from_request_parts(&mut parts, &state).await.unwrap();
    assert_eq!(session.user_id(), Some(TEST_USER_ID));
}

#[tokio::test]
async fn test_session_extractor_ignores_foreign_secret() {
    let state = create_app_state(MockAuthRepo::default());
    let mut forged = Session::new(SessionKeys::new(
        b"not-the-server-secret-at-all-0123",
        "vsauth",
        3600,
        false,
    ));
    forged.set_user_id(TEST_USER_ID);

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::COOKIE,
        header::HeaderValue::from_str(&cookie_header(&forged)).unwrap(),
    );

    let session = Session::from_request_parts(&mut parts, &state).await.unwrap();
    assert_eq!(session.user_id(), None);
}

// --- require_login middleware ---

#[tokio::test]
async fn test_guard_redirects_anonymous_and_sets_cookie() {
    let app = create_router(create_app_state(MockAuthRepo::default()));

    let response = app
        .oneshot(
            Request::get("/update?id=5")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login");

    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.starts_with("vsauth="));
    assert!(set_cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn test_guard_lets_logged_in_user_through() {
    let state = create_app_state(MockAuthRepo {
        user_to_return: Some(test_user()),
        ..Default::default()
    });
    let mut session = Session::new(state.sessions.clone());
    session.set_user_id(TEST_USER_ID);
    let cookie = cookie_header(&session);
    let app = create_router(state);

    let response = app
        .oneshot(
            Request::get("/create")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    // Nothing changed in the session, so no cookie is re-issued.
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_guard_blocks_anonymous_writes() {
    let app = create_router(create_app_state(MockAuthRepo::default()));

    let response = app
        .oneshot(
            Request::post("/save")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("articleId=&title=x&content=y"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login");
}
