use crate::{
    error::{AppError, AppResult},
    models::{Account, Article, User},
};
use async_trait::async_trait;
use sqlx::{PgPool, query_builder::QueryBuilder};
use std::{collections::BTreeMap, sync::Arc};
use tokio::sync::Mutex;

/// Repository Trait
///
/// The persistence contract for both tables. Handlers and use-cases only see
/// this trait, so the Postgres adapter and the in-memory one are
/// interchangeable behind `Arc<dyn Repository>`.
///
/// Every method is a single statement; there are no multi-statement
/// transactions.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Articles ---
    // Newest-first. `None` lists everything; `Some(q)` keeps rows whose title or
    // content contains `q`, ignoring case.
    async fn search_articles(&self, query: Option<&str>) -> AppResult<Vec<Article>>;
    async fn get_article(&self, id: i32) -> AppResult<Option<Article>>;
    async fn create_article(&self, title: &str, content: &str) -> AppResult<Article>;
    // Returns the number of rows touched (0 or 1).
    async fn update_article(&self, id: i32, title: &str, content: &str) -> AppResult<u64>;
    async fn delete_article(&self, id: i32) -> AppResult<u64>;

    // --- Accounts ---
    async fn create_account(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> AppResult<Account>;
    async fn find_account_by_email(&self, email: &str) -> AppResult<Option<Account>>;
    async fn find_user(&self, id: i32) -> AppResult<Option<User>>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// escape_like
///
/// Makes `%`, `_` and `\` in user input match literally inside an ILIKE
/// pattern. Backslash is Postgres' default LIKE escape character.
pub fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    /// search_articles
    ///
    /// Builds the optional filter with QueryBuilder so the search text is
    /// always a bound parameter.
    async fn search_articles(&self, query: Option<&str>) -> AppResult<Vec<Article>> {
        let mut builder: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new("SELECT id, title, content FROM article");

        if let Some(q) = query.filter(|q| !q.is_empty()) {
            let pattern = format!("%{}%", escape_like(q));
            builder.push(" WHERE title ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR content ILIKE ");
            builder.push_bind(pattern);
        }

        builder.push(" ORDER BY id DESC");

        let articles = builder
            .build_query_as::<Article>()
            .fetch_all(&self.pool)
            .await?;
        Ok(articles)
    }

    async fn get_article(&self, id: i32) -> AppResult<Option<Article>> {
        let article =
            sqlx::query_as::<_, Article>("SELECT id, title, content FROM article WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(article)
    }

    async fn create_article(&self, title: &str, content: &str) -> AppResult<Article> {
        let article = sqlx::query_as::<_, Article>(
            "INSERT INTO article (title, content) VALUES ($1, $2) RETURNING id, title, content",
        )
        .bind(title)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;
        Ok(article)
    }

    async fn update_article(&self, id: i32, title: &str, content: &str) -> AppResult<u64> {
        let result = sqlx::query("UPDATE article SET title = $1, content = $2 WHERE id = $3")
            .bind(title)
            .bind(content)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_article(&self, id: i32) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM article WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// create_account
    ///
    /// The `UNIQUE` constraint on `email` is the only duplicate check; a clash
    /// comes back as `AppError::Constraint`.
    async fn create_account(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> AppResult<Account> {
        let account = sqlx::query_as::<_, Account>(
            r#"INSERT INTO appuser (name, email, password) VALUES ($1, $2, $3)
               RETURNING id, name, email, password"#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(account)
    }

    async fn find_account_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT id, name, email, password FROM appuser WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }

    async fn find_user(&self, id: i32) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT id, name, email FROM appuser WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

// --- In-Memory Implementation (tests and local demos) ---

#[derive(Default)]
struct Tables {
    articles: BTreeMap<i32, Article>,
    accounts: Vec<Account>,
    last_article_id: i32,
    last_account_id: i32,
}

/// MemoryRepository
///
/// A `Repository` held entirely in process memory. It mirrors the Postgres
/// adapter's observable behaviour (serial ids, newest-first ordering,
/// case-insensitive search, unique emails) so use-case and HTTP tests can run
/// without a database.
#[derive(Default)]
pub struct MemoryRepository {
    tables: Mutex<Tables>,
    /// When true, every operation fails as if the pool were closed.
    pub should_fail: bool,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    fn check(&self) -> AppResult<()> {
        if self.should_fail {
            return Err(AppError::Connection(sqlx::Error::PoolClosed));
        }
        Ok(())
    }
}

fn contains_ignoring_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn search_articles(&self, query: Option<&str>) -> AppResult<Vec<Article>> {
        self.check()?;
        let tables = self.tables.lock().await;
        let needle = query.filter(|q| !q.is_empty()).map(str::to_lowercase);
        Ok(tables
            .articles
            .values()
            .rev()
            .filter(|a| match &needle {
                Some(n) => {
                    contains_ignoring_case(&a.title, n) || contains_ignoring_case(&a.content, n)
                }
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn get_article(&self, id: i32) -> AppResult<Option<Article>> {
        self.check()?;
        Ok(self.tables.lock().await.articles.get(&id).cloned())
    }

    async fn create_article(&self, title: &str, content: &str) -> AppResult<Article> {
        self.check()?;
        let mut tables = self.tables.lock().await;
        tables.last_article_id += 1;
        let article = Article {
            id: tables.last_article_id,
            title: title.to_string(),
            content: content.to_string(),
        };
        tables.articles.insert(article.id, article.clone());
        Ok(article)
    }

    async fn update_article(&self, id: i32, title: &str, content: &str) -> AppResult<u64> {
        self.check()?;
        let mut tables = self.tables.lock().await;
        match tables.articles.get_mut(&id) {
            Some(article) => {
                article.title = title.to_string();
                article.content = content.to_string();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_article(&self, id: i32) -> AppResult<u64> {
        self.check()?;
        let removed = self.tables.lock().await.articles.remove(&id);
        Ok(u64::from(removed.is_some()))
    }

    async fn create_account(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> AppResult<Account> {
        self.check()?;
        let mut tables = self.tables.lock().await;
        if tables.accounts.iter().any(|a| a.email == email) {
            return Err(AppError::Constraint(format!(
                "duplicate key value violates unique constraint on email {email:?}"
            )));
        }
        tables.last_account_id += 1;
        let account = Account {
            id: tables.last_account_id,
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
        };
        tables.accounts.push(account.clone());
        Ok(account)
    }

    async fn find_account_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        self.check()?;
        let tables = self.tables.lock().await;
        Ok(tables.accounts.iter().find(|a| a.email == email).cloned())
    }

    async fn find_user(&self, id: i32) -> AppResult<Option<User>> {
        self.check()?;
        let tables = self.tables.lock().await;
        Ok(tables
            .accounts
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .map(User::from))
    }
}
