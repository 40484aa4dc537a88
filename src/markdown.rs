//! Markdown to HTML for article bodies.
//!
//! Plain CommonMark only: tables, footnotes, strikethrough and the other
//! extensions stay off. Raw HTML blocks and inline tags in the source are
//! emitted as escaped text, and link or image targets with a scheme other
//! than http, https or mailto are replaced by `#`, so stored content can
//! never inject markup or script.

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, html};

const ALLOWED_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

/// render
///
/// Converts a Markdown source into an HTML fragment. Pure and deterministic;
/// called on every read, nothing is cached.
pub fn render(source: &str) -> String {
    let events = Parser::new_ext(source, Options::empty()).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        other => other,
    });

    let mut out = String::with_capacity(source.len() + source.len() / 2);
    html::push_html(&mut out, events);
    out
}

/// safe_url
///
/// Keeps relative targets and the allowed schemes, replaces anything else.
/// Browsers ignore whitespace and control characters inside a scheme
/// (`java\tscript:`), so those are dropped before the scheme is read.
fn safe_url(dest: CowStr<'_>) -> CowStr<'_> {
    let normalized: String = dest
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .collect();

    let scheme_end = normalized.find(':');
    let path_start = normalized.find(['/', '?', '#']);
    let scheme = match (scheme_end, path_start) {
        (Some(colon), Some(path)) if path < colon => None,
        (Some(colon), _) => Some(&normalized[..colon]),
        (None, _) => None,
    };

    match scheme {
        Some(scheme) if !ALLOWED_SCHEMES.iter().any(|s| s.eq_ignore_ascii_case(scheme)) => {
            tracing::debug!(scheme, "dropping link with disallowed scheme");
            CowStr::Borrowed("#")
        }
        _ => dest,
    }
}
