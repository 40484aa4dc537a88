use blog_portal::markdown::render;

#[test]
fn test_renders_basic_markdown() {
    let html = render("# Title\n\nSome *emphasis* and a [link](https://example.com).");
    assert!(html.contains("<h1>Title</h1>"));
    assert!(html.contains("<em>emphasis</em>"));
    assert!(html.contains(r#"<a href="https://example.com">link</a>"#));
}

#[test]
fn test_rendering_is_deterministic() {
    let source = "## Heading\n\n- one\n- two\n\n```\ncode\n```\n";
    assert_eq!(render(source), render(source));
}

#[test]
fn test_raw_html_block_is_escaped() {
    let html = render("<script>alert('x')</script>\n");
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;"));
}

#[test]
fn test_inline_html_is_escaped() {
    let html = render("hello <b onclick=\"steal()\">world</b>");
    assert!(!html.contains("<b "));
    assert!(html.contains("&lt;b"));
}

#[test]
fn test_extensions_are_disabled() {
    let table = render("| a | b |\n|---|---|\n| 1 | 2 |\n");
    assert!(!table.contains("<table>"));

    let strike = render("~~gone~~");
    assert!(!strike.contains("<del>"));
}

#[test]
fn test_empty_source_renders_empty_fragment() {
    assert_eq!(render(""), "");
}

#[test]
fn test_script_links_are_neutralised() {
    for source in [
        "[click](javascript:alert(document.cookie))",
        "[click](JavaScript:alert(1))",
        "<javascript:alert(1)>",
        "[data](data:text/html;base64,PHNjcmlwdD4=)",
    ] {
        let html = render(source);
        let lower = html.to_lowercase();
        assert!(!lower.contains("href=\"javascript"), "{source} -> {html}");
        assert!(!lower.contains("href=\"data:"), "{source} -> {html}");
        assert!(html.contains(r##"href="#""##), "{source} -> {html}");
    }
}

#[test]
fn test_script_image_source_is_neutralised() {
    let html = render("![x](javascript:alert(1))");
    assert!(!html.contains("javascript:"));
    assert!(html.contains(r##"src="#""##));
}

#[test]
fn test_safe_links_are_kept() {
    let html = render(
        "[a](https://example.com/x) [b](http://example.com) [c](mailto:me@example.com) \
         [d](/read?id=2) [e](#top) [f](notes/page:2)",
    );
    assert!(html.contains(r#"href="https://example.com/x""#));
    assert!(html.contains(r#"href="http://example.com""#));
    assert!(html.contains(r#"href="mailto:me@example.com""#));
    assert!(html.contains(r#"href="/read?id=2""#));
    assert!(html.contains(r##"href="#top""##));
    assert!(html.contains(r#"href="notes/page:2""#));
}
