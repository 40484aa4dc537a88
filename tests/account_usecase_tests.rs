use blog_portal::{
    AppError, MemoryRepository, Session, SessionKeys,
    accounts::{self, LoginOutcome},
    repository::Repository,
};

// Lowest cost bcrypt accepts.
const COST: u32 = 4;

fn session() -> Session {
    Session::new(SessionKeys::new(b"account-tests-secret-0123456789abc", "vsauth", 3600, false))
}

async fn with_account(email: &str, password: &str) -> MemoryRepository {
    let repo = MemoryRepository::new();
    accounts::signup(&repo, COST, "Ada", email, password).await.unwrap();
    repo
}

#[tokio::test]
async fn test_signup_stores_hash_not_password() {
    let repo = MemoryRepository::new();

    let account = accounts::signup(&repo, COST, "Ada", "ada@example.com", "hunter2")
        .await
        .unwrap();

    assert_ne!(account.password_hash, "hunter2");
    assert!(account.password_hash.starts_with("$2"));
    let stored = repo.find_account_by_email("ada@example.com").await.unwrap().unwrap();
    assert_eq!(stored.id, account.id);
    assert_eq!(stored.name, "Ada");
}

#[tokio::test]
async fn test_equal_passwords_hash_differently() {
    let repo = MemoryRepository::new();
    let a = accounts::signup(&repo, COST, "A", "a@example.com", "same").await.unwrap();
    let b = accounts::signup(&repo, COST, "B", "b@example.com", "same").await.unwrap();

    assert_ne!(a.password_hash, b.password_hash);
    assert!(bcrypt::verify("same", &a.password_hash).unwrap());
    assert!(bcrypt::verify("same", &b.password_hash).unwrap());
}

#[tokio::test]
async fn test_duplicate_email_is_a_constraint_error() {
    let repo = with_account("ada@example.com", "pw").await;

    let result = accounts::signup(&repo, COST, "Other", "ada@example.com", "pw2").await;

    assert!(matches!(result, Err(AppError::Constraint(_))));
}

#[tokio::test]
async fn test_login_sets_user_and_defaults_to_home() {
    let repo = with_account("ada@example.com", "pw").await;
    let mut session = session();

    let outcome = accounts::login(&repo, &mut session, "ada@example.com", "pw")
        .await
        .unwrap();

    assert_eq!(
        outcome,
        LoginOutcome::Authenticated {
            redirect_to: "/".to_string()
        }
    );
    assert_eq!(session.user_id(), Some(1));
    assert!(session.is_changed());
}

#[tokio::test]
async fn test_login_consumes_return_url() {
    let repo = with_account("ada@example.com", "pw").await;
    let mut session = session();
    session.set_return_url("/update?id=3");

    let outcome = accounts::login(&repo, &mut session, "ada@example.com", "pw")
        .await
        .unwrap();

    assert_eq!(
        outcome,
        LoginOutcome::Authenticated {
            redirect_to: "/update?id=3".to_string()
        }
    );
    assert_eq!(session.return_url(), None);
}

#[tokio::test]
async fn test_wrong_password_leaves_session_untouched() {
    let repo = with_account("ada@example.com", "pw").await;
    let mut session = session();
    session.set_return_url("/create");

    let outcome = accounts::login(&repo, &mut session, "ada@example.com", "nope")
        .await
        .unwrap();

    assert_eq!(outcome, LoginOutcome::WrongCredentials);
    assert_eq!(session.user_id(), None);
    assert_eq!(session.return_url(), Some("/create"));
}

#[tokio::test]
async fn test_unknown_email_is_wrong_credentials() {
    let repo = with_account("ada@example.com", "pw").await;
    let mut session = session();

    let outcome = accounts::login(&repo, &mut session, "bob@example.com", "pw")
        .await
        .unwrap();

    assert_eq!(outcome, LoginOutcome::WrongCredentials);
    assert!(!session.is_changed());
}

#[tokio::test]
async fn test_logout_clears_user_only() {
    let mut session = session();
    session.set_user_id(7);
    session.set_return_url("/create");

    accounts::logout(&mut session);

    assert_eq!(session.user_id(), None);
    assert_eq!(session.return_url(), Some("/create"));
}

#[tokio::test]
async fn test_logout_when_anonymous_is_a_no_op() {
    let mut session = session();
    accounts::logout(&mut session);
    assert!(!session.is_changed());
}

#[tokio::test]
async fn test_unreadable_stored_hash_is_wrong_credentials() {
    let repo = MemoryRepository::new();
    repo.create_account("Ada", "ada@example.com", "not-a-bcrypt-hash")
        .await
        .unwrap();
    let mut session = session();

    let outcome = accounts::login(&repo, &mut session, "ada@example.com", "anything")
        .await
        .unwrap();

    assert_eq!(outcome, LoginOutcome::WrongCredentials);
    assert_eq!(session.user_id(), None);
    assert!(!session.is_changed());
}
