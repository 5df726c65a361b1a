//! Integration tests for rhtmx-pattern route patterns
//!
//! Tests are organized by operation:
//! - Parsing and reserialization
//! - Matching (pathname, hostname, protocol, port, search)
//! - URL generation
//! - Joining

use pretty_assertions::assert_eq;
use rhtmx_pattern::*;
use rstest::rstest;

fn pattern(source: &str) -> RoutePattern {
    RoutePattern::parse(source).unwrap()
}

// ============================================================================
// Parsing
// ============================================================================

#[rstest]
#[case("/")]
#[case("/users/:id")]
#[case("users/:id(/edit)")]
#[case("/files/*path")]
#[case("/assets/*")]
#[case("/a(/b(/c))")]
#[case("://remix.run/docs")]
#[case("http(s)://(*.)remix.run:8080/")]
#[case("/search?q=&lang=en")]
fn test_display_reparses_equal(#[case] source: &str) {
    let parsed = pattern(source);
    let reparsed = pattern(&parsed.to_string());
    assert_eq!(parsed, reparsed);
}

#[rstest]
#[case("/a/(b", PatternSyntaxError::UnbalancedParen { offset: 3 })]
#[case("/a/b)", PatternSyntaxError::UnbalancedParen { offset: 4 })]
#[case("/a/:", PatternSyntaxError::InvalidParamName { offset: 3 })]
#[case("/a/:1", PatternSyntaxError::InvalidParamName { offset: 3 })]
#[case("/a/b\\", PatternSyntaxError::TrailingEscape { offset: 4 })]
#[case(
    "/:id/:id",
    PatternSyntaxError::DuplicateParam { name: "id".to_string(), offset: 5 }
)]
fn test_syntax_errors(#[case] source: &str, #[case] expected: PatternSyntaxError) {
    assert_eq!(RoutePattern::parse(source).unwrap_err(), expected);
}

// ============================================================================
// Matching
// ============================================================================

#[rstest]
#[case("/users/:id", "/users/42", &[("id", "42")])]
#[case("/users/:id.json", "/users/42.json", &[("id", "42")])]
#[case("/files/*path", "/files/a/b/c.txt", &[("path", "a/b/c.txt")])]
#[case("/files/*path.txt", "/files/a/b.txt", &[("path", "a/b")])]
#[case("/:lang(/:page)", "/en", &[("lang", "en")])]
#[case("/:lang(/:page)", "/en/intro", &[("lang", "en"), ("page", "intro")])]
#[case("://:sub.remix.run/", "https://docs.remix.run/", &[("sub", "docs")])]
#[case("/assets/*", "/assets/css/app.css", &[("*", "css/app.css")])]
#[case("://(*.)remix.run/", "https://a.b.remix.run/", &[("*", "a.b")])]
#[case("://(*.:sub.)remix.run/", "https://a.b.remix.run/", &[("sub", "b")])]
fn test_match_params(#[case] source: &str, #[case] url: &str, #[case] expected: &[(&str, &str)]) {
    let pat = pattern(source);
    let m = pat.matches(url).unwrap();
    let expected: Params = expected
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    assert_eq!(m.params, expected);
}

#[rstest]
#[case("/users/:id", "/users")]
#[case("/users/:id", "/users/42/posts")]
#[case("/users", "/Users")]
#[case("/files/*path", "/files/")]
#[case("://remix.run/", "https://www.remix.run/")]
#[case("http://x.com/", "https://x.com/")]
#[case("://x.com:8080/", "http://x.com/")]
#[case("/search?q=", "/search")]
#[case("/search?lang=en", "/search?lang=fr")]
fn test_no_match(#[case] source: &str, #[case] url: &str) {
    assert!(pattern(source).matches(url).is_none());
}

#[test]
fn test_relative_pattern_matches_absolute_url() {
    let pat = pattern("docs/:page");
    let m = pat.matches("https://remix.run/docs/intro?x=1").unwrap();
    assert_eq!(m.get("page"), Some("intro"));
    assert_eq!(m.url.as_str(), "https://remix.run/docs/intro?x=1");
}

#[test]
fn test_ignore_case_applies_to_pathname_only() {
    let options = ParseOptions { ignore_case: true };
    let folded = RoutePattern::parse_with("/Docs/:Page", options).unwrap();
    let m = folded.matches("/DOCS/Intro").unwrap();
    assert_eq!(m.get("Page"), Some("Intro"));

    let strict = pattern("://Remix.Run/Docs");
    assert!(strict.matches("https://remix.run/Docs").is_some());
    assert!(strict.matches("https://remix.run/docs").is_none());
}

#[test]
fn test_percent_encoded_path_is_not_decoded() {
    let pat = pattern("/tags/:tag");
    let m = pat.matches("/tags/a%20b").unwrap();
    assert_eq!(m.get("tag"), Some("a%20b"));
}

#[test]
fn test_search_values() {
    let p = pattern("/list?sort=asc&sort=desc");
    assert!(p.matches("/list?sort=asc").is_some());
    assert!(p.matches("/list?page=2&sort=desc").is_some());
    assert!(p.matches("/list?sort=name").is_none());
    assert!(p.matches("/list").is_none());
}

#[test]
fn test_search_decoding() {
    let p = pattern("/find?q=hello%20world");
    assert!(p.matches("/find?q=hello+world").is_some());
    assert!(p.matches("/find?q=hello%20world").is_some());
}

// ============================================================================
// URL generation
// ============================================================================

#[rstest]
#[case("/users/:id", &[("id", "42")], "/users/42")]
#[case("/blog/:year(/:slug)", &[("year", "2024")], "/blog/2024")]
#[case("/blog/:year(/:slug)", &[("year", "2024"), ("slug", "hi")], "/blog/2024/hi")]
#[case("/files/*path", &[("path", "a/b")], "/files/a/b")]
#[case("://:tenant.remix.run/", &[("tenant", "acme")], "https://acme.remix.run/")]
#[case("http://localhost:3000/api", &[], "http://localhost:3000/api")]
fn test_href(#[case] source: &str, #[case] params: &[(&str, &str)], #[case] expected: &str) {
    assert_eq!(pattern(source).href_from(params).unwrap(), expected);
}

#[rstest]
#[case("/users/:id", "/users/7")]
#[case("/:lang(/:page)", "/en/intro")]
#[case("/:lang(/:page)", "/en")]
#[case("/files/*path", "/files/x/y/z")]
#[case("://:sub.remix.run/:id", "https://api.remix.run/1")]
#[case("/assets/*", "/assets/x/y")]
#[case("://(*.)remix.run/docs", "https://a.b.remix.run/docs")]
fn test_href_inverts_match(#[case] source: &str, #[case] url: &str) {
    let p = pattern(source);
    let m = p.matches(url).unwrap();
    let href = p.href(&m.params).unwrap();
    assert_eq!(p.matches(href.as_str()).unwrap().params, m.params);
}

#[rstest]
#[case("/assets/*", &[("*", "css/app.css")])]
#[case("/assets/*.css", &[("*", "themes/dark")])]
#[case("/docs(/*)", &[("*", "a/b")])]
#[case("/docs(/*)", &[])]
fn test_match_inverts_href(#[case] source: &str, #[case] params: &[(&str, &str)]) {
    let p = pattern(source);
    let href = p.href_from(params).unwrap();
    let expected: Params = params
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    assert_eq!(p.matches(href.as_str()).unwrap().params, expected);
}

#[test]
fn test_many_wildcards_reject_long_url_quickly() {
    let p = pattern("/*a/*b/*c/*d/end");
    let url = format!("/{}", "x/".repeat(300));
    assert!(p.matches(url.as_str()).is_none());
    assert!(p.matches(format!("{url}end").as_str()).is_some());
}

#[test]
fn test_href_missing_param() {
    let err = pattern("/users/:id/posts/:post").href_from(&[("id", "1")]).unwrap_err();
    assert_eq!(err, MissingParamError { name: "post".to_string() });
}

// ============================================================================
// Joining
// ============================================================================

#[rstest]
#[case("/api", "/users", "/api/users")]
#[case("/api/", "users/:id", "/api/users/:id")]
#[case("/docs", "(/:page)", "/docs(/:page)")]
#[case("https://remix.run", "/blog", "https://remix.run/blog")]
#[case("https://remix.run/a", "http://other.dev", "http://other.dev/a")]
fn test_join(#[case] left: &str, #[case] right: &str, #[case] expected: &str) {
    let joined = pattern(left).join(&pattern(right)).unwrap();
    assert_eq!(joined.to_string(), expected);
}

#[test]
fn test_join_keeps_receiver_options() {
    let base = RoutePattern::parse_with("/Admin", ParseOptions { ignore_case: true }).unwrap();
    let joined = base.join(&pattern("/Users")).unwrap();
    assert!(joined.ignore_case());
    assert!(joined.matches("/admin/users").is_some());
}
