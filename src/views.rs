//! Server-rendered pages.
//!
//! Every dynamic value is escaped by maud except article bodies on the read
//! views, which are HTML produced by [`crate::markdown::render`].

use axum::http::StatusCode;
use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::models::Article;

/// layout
///
/// The shared page shell with the site navigation.
pub fn layout(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " | Blog" }
            }
            body {
                header {
                    nav {
                        a href="/" { "Home" } " "
                        a href="/create" { "New post" } " "
                        a href="/login" { "Log in" } " "
                        a href="/signup" { "Sign up" } " "
                        a href="/logout" { "Log out" }
                    }
                }
                main { (body) }
            }
        }
    }
}

/// Home page: search box and the (rendered) article listing.
pub fn articles(list: &[Article], search: Option<&str>) -> Markup {
    layout(
        "Articles",
        html! {
            form action="/" method="get" {
                input type="search" name="search" placeholder="Search posts" value=[search];
                " "
                button type="submit" { "Search" }
            }
            @for article in list {
                @if article.is_placeholder() {
                    p.empty { (article.content) }
                } @else {
                    article {
                        h2 { a href={ "/read?id=" (article.id) } { (article.title) } }
                        div.content { (PreEscaped(&article.content)) }
                        p.actions {
                            a href={ "/update?id=" (article.id) } { "Edit" } " "
                            a href={ "/delete?id=" (article.id) } { "Delete" }
                        }
                    }
                }
            }
        },
    )
}

pub fn article(article: &Article) -> Markup {
    layout(
        &article.title,
        html! {
            article {
                h1 { (article.title) }
                div.content { (PreEscaped(&article.content)) }
            }
            p { a href={ "/update?id=" (article.id) } { "Edit" } " " a href="/" { "Back" } }
        },
    )
}

/// Create/edit form. `existing` carries the raw Markdown of the article
/// being edited; `None` renders a blank form that creates on submit.
pub fn article_form(existing: Option<&Article>) -> Markup {
    let heading = if existing.is_some() { "Edit post" } else { "New post" };
    layout(
        heading,
        html! {
            h1 { (heading) }
            form action="/save" method="post" {
                input type="hidden" name="articleId" value=[existing.map(|a| a.id)];
                p {
                    label for="title" { "Title" }
                    br;
                    input type="text" id="title" name="title"
                        value=[existing.map(|a| a.title.as_str())];
                }
                p {
                    label for="content" { "Content (Markdown)" }
                    br;
                    textarea id="content" name="content" rows="20" cols="80" {
                        @if let Some(a) = existing { (a.content) }
                    }
                }
                button type="submit" { "Save" }
            }
        },
    )
}

pub fn login_form() -> Markup {
    layout(
        "Log in",
        html! {
            h1 { "Log in" }
            form action="/login" method="post" {
                p { label for="email" { "Email" } br; input type="email" id="email" name="email"; }
                p {
                    label for="password" { "Password" }
                    br;
                    input type="password" id="password" name="password";
                }
                button type="submit" { "Log in" }
            }
            p { "No account yet? " a href="/signup" { "Sign up" } }
        },
    )
}

pub fn signup_form() -> Markup {
    layout(
        "Sign up",
        html! {
            h1 { "Sign up" }
            form action="/signup" method="post" {
                p { label for="name" { "Name" } br; input type="text" id="name" name="name"; }
                p { label for="email" { "Email" } br; input type="email" id="email" name="email"; }
                p {
                    label for="password" { "Password" }
                    br;
                    input type="password" id="password" name="password";
                }
                button type="submit" { "Create account" }
            }
        },
    )
}

pub fn logged_out() -> Markup {
    layout(
        "Logged out",
        html! {
            h1 { "You are logged out" }
            p { a href="/" { "Back to the articles" } }
        },
    )
}

pub fn wrong_login() -> Markup {
    layout(
        "Wrong credentials",
        html! {
            h1 { "Not authorized" }
            p { "That email and password do not match an account." }
            p { a href="/login" { "Try again" } }
        },
    )
}

pub fn error_page(status: StatusCode, message: &str) -> Markup {
    let title = status.canonical_reason().unwrap_or("Error");
    layout(
        title,
        html! {
            h1 { (status.as_u16()) " " (title) }
            p { (message) }
            p { a href="/" { "Home" } }
        },
    )
}
