use serde::{Deserialize, Deserializer, de};
use sqlx::FromRow;
use std::{fmt, str::FromStr};
use utoipa::ToSchema;

// --- Core Application Schemas (Mapped to Database) ---

/// Article
///
/// A blog post record from the `article` table.
/// `content` holds the raw Markdown source as stored; the article use-cases
/// replace it with rendered HTML on the way out for read views.
#[derive(Debug, Clone, PartialEq, Eq, ToSchema, FromRow, Default)]
pub struct Article {
    // SERIAL primary key, never reassigned.
    pub id: i32,
    pub title: String,
    pub content: String,
}

/// Text shown in place of an empty listing.
pub const NO_POSTS_FOUND: &str = "No posts found";

impl Article {
    /// placeholder
    ///
    /// The single stand-in entry returned by a listing with no matches.
    /// It carries no id and is never persisted.
    pub fn placeholder() -> Self {
        Self {
            id: 0,
            title: String::new(),
            content: NO_POSTS_FOUND.to_string(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.id == 0
    }
}

/// Account
///
/// A full row from the `appuser` table, including the bcrypt hash.
/// Only the account use-cases read this; everything else sees [`User`].
#[derive(Debug, Clone, FromRow, Default)]
pub struct Account {
    pub id: i32,
    pub name: String,
    pub email: String,
    /// Maps SQL column "password", which holds the hash and never the plaintext.
    #[sqlx(rename = "password")]
    pub password_hash: String,
}

/// User
///
/// The identity resolved by the auth guard for the current request.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Default)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
}

impl From<Account> for User {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            name: account.name,
            email: account.email,
        }
    }
}

// --- Request Payloads (Form Bodies) ---

/// SaveArticleForm
///
/// Body of `POST /save`. An empty `articleId` means "create".
#[derive(Debug, Clone, Deserialize, ToSchema, Default)]
pub struct SaveArticleForm {
    #[serde(
        rename = "articleId",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    #[schema(value_type = Option<i32>)]
    pub article_id: Option<i32>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// LoginForm
///
/// Body of `POST /login`.
#[derive(Debug, Clone, Deserialize, ToSchema, Default)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// SignupForm
///
/// Body of `POST /signup`. The password is hashed before it reaches storage
/// and is never logged.
#[derive(Debug, Clone, Deserialize, ToSchema, Default)]
pub struct SignupForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// empty_string_as_none
///
/// HTML forms submit an empty hidden input as `articleId=`; treat that the
/// same as an absent field.
fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse::<T>().map(Some).map_err(de::Error::custom),
    }
}
