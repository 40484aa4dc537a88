//! Account use-cases: signup, login, logout.

use crate::{error::AppResult, models::Account, repository::Repository, session::Session};

/// Where a login attempt leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Credentials matched; continue to `redirect_to`.
    Authenticated { redirect_to: String },
    /// Unknown email or wrong password. The session was not touched.
    WrongCredentials,
}

/// signup
///
/// Hashes the password with bcrypt at `cost` (salted, so equal passwords give
/// different hashes) and stores the account. A taken email surfaces as the
/// storage layer's constraint error.
pub async fn signup(
    repo: &dyn Repository,
    cost: u32,
    name: &str,
    email: &str,
    password: &str,
) -> AppResult<Account> {
    let password_hash = bcrypt::hash(password, cost)?;
    let account = repo.create_account(name, email, &password_hash).await?;
    tracing::info!(account_id = account.id, "account created");
    Ok(account)
}

/// login
///
/// Verifies the credentials and, on success, records the account id in the
/// session and consumes any pending return URL.
pub async fn login(
    repo: &dyn Repository,
    session: &mut Session,
    email: &str,
    password: &str,
) -> AppResult<LoginOutcome> {
    let Some(account) = repo.find_account_by_email(email).await? else {
        tracing::warn!("login failed: unknown email");
        return Ok(LoginOutcome::WrongCredentials);
    };

    match bcrypt::verify(password, &account.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            tracing::warn!(account_id = account.id, "login failed: password mismatch");
            return Ok(LoginOutcome::WrongCredentials);
        }
        // A stored hash bcrypt cannot parse never matches.
        Err(e) => {
            tracing::warn!(account_id = account.id, error = %e, "login failed: unreadable hash");
            return Ok(LoginOutcome::WrongCredentials);
        }
    }

    session.set_user_id(account.id);
    let redirect_to = session.take_return_url().unwrap_or_else(|| "/".to_string());
    tracing::info!(account_id = account.id, %redirect_to, "login succeeded");

    Ok(LoginOutcome::Authenticated { redirect_to })
}

/// logout
///
/// Forgets the logged-in user. Any pending return URL is kept.
pub fn logout(session: &mut Session) {
    if let Some(id) = session.user_id() {
        tracing::info!(account_id = id, "logout");
    }
    session.clear_user_id();
}
