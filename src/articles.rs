//! Article use-cases: list/search, read, save, delete.
//!
//! Transport-agnostic; each function takes the repository explicitly and
//! returns a typed result for the HTTP layer to render.

use crate::{
    error::{AppError, AppResult},
    markdown,
    models::Article,
    repository::Repository,
};

/// What a save did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Created(i32),
    Updated(i32),
    /// The form carried an id with no matching row. Nothing was written.
    NoSuchArticle(i32),
}

/// list
///
/// All articles newest-first, or only those matching `search`. An empty
/// search string lists everything. Contents come back rendered; an empty
/// result is replaced by the single [`Article::placeholder`].
pub async fn list(repo: &dyn Repository, search: Option<&str>) -> AppResult<Vec<Article>> {
    let query = search.filter(|q| !q.is_empty());
    let mut articles = repo.search_articles(query).await?;

    if articles.is_empty() {
        return Ok(vec![Article::placeholder()]);
    }

    for article in &mut articles {
        article.content = markdown::render(&article.content);
    }
    Ok(articles)
}

/// fetch
///
/// One article with its content rendered to HTML.
pub async fn fetch(repo: &dyn Repository, id: i32) -> AppResult<Article> {
    let mut article = fetch_source(repo, id).await?;
    article.content = markdown::render(&article.content);
    Ok(article)
}

/// fetch_source
///
/// One article exactly as stored, for prefilling the edit form.
pub async fn fetch_source(repo: &dyn Repository, id: i32) -> AppResult<Article> {
    repo.get_article(id)
        .await?
        .ok_or(AppError::NotFound("article"))
}

/// save
///
/// Inserts when `id` is `None`, otherwise overwrites title and content of
/// that row. Title and content are stored as given.
pub async fn save(
    repo: &dyn Repository,
    id: Option<i32>,
    title: &str,
    content: &str,
) -> AppResult<SaveOutcome> {
    match id {
        None => {
            let article = repo.create_article(title, content).await?;
            tracing::info!(article_id = article.id, "article created");
            Ok(SaveOutcome::Created(article.id))
        }
        Some(id) => {
            if repo.update_article(id, title, content).await? == 0 {
                tracing::debug!(article_id = id, "update matched no article");
                return Ok(SaveOutcome::NoSuchArticle(id));
            }
            tracing::info!(article_id = id, "article updated");
            Ok(SaveOutcome::Updated(id))
        }
    }
}

/// delete
///
/// Removes the article if present; deleting an unknown id is not an error.
pub async fn delete(repo: &dyn Repository, id: i32) -> AppResult<()> {
    let removed = repo.delete_article(id).await?;
    tracing::info!(article_id = id, removed, "article delete");
    Ok(())
}
