/// Segment-trie matcher
///
/// Patterns are expanded into group-free variants and inserted into one trie
/// per `(protocol, hostname shape, port)` bucket. A lookup walks the URL path
/// one segment at a time, trying static edges, then dynamic edges, then
/// wildcard tails, and collects every reachable leaf. The trie only prunes;
/// ordering is left to the specificity comparator.
use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, trace, warn};
use url::Url;

use super::{Entry, MatchResult, Matcher};
use crate::config::MatcherConfig;
use crate::part::matcher::match_tokens;
use crate::part::{Binding, Token};
use crate::route::strip_root;
use crate::specificity::Specificity;
use crate::variant::{self, Variant, VariantPart};
use crate::{MatcherError, ParseOptions, RoutePattern};

const PATH_SEPARATOR: char = '/';

struct TrieEntry<T> {
    entry: Entry<T>,
    /// Precomputed score for single-variant patterns, whose trie bindings are
    /// the canonical params. Multi-variant patterns are re-confirmed instead.
    fixed: Option<Specificity>,
}

/// Root of one `(protocol, hostname, port)` combination
struct Bucket {
    protocol: VariantPart,
    hostname: VariantPart,
    port: Option<String>,
    root: Node,
    /// Entries whose pathname is unconstrained
    any_path: Vec<usize>,
}

#[derive(Default)]
struct Node {
    /// Case-sensitive literal segments
    statics: HashMap<String, Node>,
    /// Case-insensitive literal segments, keyed ASCII-lowercase
    folded: HashMap<String, Node>,
    dynamics: Vec<DynamicEdge>,
    tails: Vec<Tail>,
    leaves: Vec<usize>,
}

/// A single segment containing `:` params
struct DynamicEdge {
    tokens: Vec<Token>,
    ignore_case: bool,
    node: Node,
}

/// Everything from a wildcard segment to the end of the variant
struct Tail {
    tokens: Vec<Token>,
    ignore_case: bool,
    entry: usize,
}

enum SegmentKind {
    Static(String),
    Dynamic,
    Tail,
}

fn classify(segment: &[Token]) -> SegmentKind {
    let crosses_segments = segment.iter().any(|token| match token {
        Token::Wildcard(_) => true,
        Token::Text(text) => text.contains(PATH_SEPARATOR),
        _ => false,
    });
    if crosses_segments {
        return SegmentKind::Tail;
    }

    let mut literal = String::new();
    for token in segment {
        match token {
            Token::Text(text) => literal.push_str(text),
            _ => return SegmentKind::Dynamic,
        }
    }
    SegmentKind::Static(literal)
}

impl Node {
    fn insert(&mut self, segments: &[&[Token]], entry: usize, ignore_case: bool) {
        let Some((first, rest)) = segments.split_first() else {
            self.leaves.push(entry);
            return;
        };

        match classify(first) {
            SegmentKind::Static(literal) => {
                let child = if ignore_case {
                    self.folded.entry(literal.to_ascii_lowercase()).or_default()
                } else {
                    self.statics.entry(literal).or_default()
                };
                child.insert(rest, entry, ignore_case);
            }
            SegmentKind::Dynamic => {
                let position = self
                    .dynamics
                    .iter()
                    .position(|edge| edge.tokens == *first && edge.ignore_case == ignore_case);
                let index = position.unwrap_or_else(|| {
                    self.dynamics.push(DynamicEdge {
                        tokens: first.to_vec(),
                        ignore_case,
                        node: Node::default(),
                    });
                    self.dynamics.len() - 1
                });
                self.dynamics[index].node.insert(rest, entry, ignore_case);
            }
            SegmentKind::Tail => self.tails.push(Tail {
                tokens: segments.join(&Token::Separator),
                ignore_case,
                entry,
            }),
        }
    }
}

/// State of one path lookup
struct Walk<'a> {
    path: &'a str,
    /// Each segment with its byte offset in `path`
    segments: Vec<(usize, &'a str)>,
    found: Vec<(usize, Vec<Binding>)>,
    bindings: Vec<Binding>,
}

impl<'a> Walk<'a> {
    fn new(path: &'a str) -> Self {
        let mut segments = Vec::new();
        let mut offset = 0;
        for segment in path.split(PATH_SEPARATOR) {
            segments.push((offset, segment));
            offset += segment.len() + PATH_SEPARATOR.len_utf8();
        }
        Self {
            path,
            segments,
            found: Vec::new(),
            bindings: Vec::new(),
        }
    }

    fn visit(&mut self, node: &Node, depth: usize) {
        let Some(&(start, segment)) = self.segments.get(depth) else {
            let bindings = &self.bindings;
            self.found
                .extend(node.leaves.iter().map(|&entry| (entry, bindings.clone())));
            return;
        };

        if let Some(child) = node.statics.get(segment) {
            self.visit(child, depth + 1);
        }
        if !node.folded.is_empty() {
            if let Some(child) = node.folded.get(&segment.to_ascii_lowercase()) {
                self.visit(child, depth + 1);
            }
        }

        let no_groups = BTreeMap::new();
        for edge in &node.dynamics {
            let matched = match_tokens(
                &edge.tokens,
                &no_groups,
                segment,
                Some(PATH_SEPARATOR),
                edge.ignore_case,
            );
            if let Some(matched) = matched {
                let mark = self.bindings.len();
                self.bindings.extend(shifted(matched.bindings, start));
                self.visit(&edge.node, depth + 1);
                self.bindings.truncate(mark);
            }
        }

        let path = self.path;
        let rest = &path[start..];
        for tail in &node.tails {
            let matched = match_tokens(
                &tail.tokens,
                &no_groups,
                rest,
                Some(PATH_SEPARATOR),
                tail.ignore_case,
            );
            if let Some(matched) = matched {
                let mut bindings = self.bindings.clone();
                bindings.extend(shifted(matched.bindings, start));
                self.found.push((tail.entry, bindings));
            }
        }
    }
}

/// Moves segment-relative binding spans to path-relative ones
fn shifted(bindings: Vec<Binding>, offset: usize) -> impl Iterator<Item = Binding> {
    bindings.into_iter().map(move |mut binding| {
        binding.span.begin += offset;
        binding.span.end += offset;
        binding
    })
}

impl Bucket {
    fn for_variant(variant: &Variant) -> Self {
        Self {
            protocol: variant.protocol_shape(),
            hostname: variant.hostname_shape(),
            port: variant.port.clone(),
            root: Node::default(),
            any_path: Vec::new(),
        }
    }

    fn holds(&self, variant: &Variant) -> bool {
        self.port == variant.port
            && self.protocol == variant.protocol_shape()
            && self.hostname == variant.hostname_shape()
    }

    /// Bindings of the protocol and hostname, or `None` if the URL is outside this bucket
    fn match_origin(&self, url: &Url) -> Option<Vec<Binding>> {
        let mut bindings = Vec::new();
        match_shape(&self.protocol, Some(url.scheme()), None, &mut bindings)?;
        match_shape(&self.hostname, url.host_str(), Some('.'), &mut bindings)?;
        if let Some(port) = &self.port {
            if !url.port().is_some_and(|p| p.to_string() == *port) {
                return None;
            }
        }
        Some(bindings)
    }
}

fn match_shape(
    shape: &VariantPart,
    input: Option<&str>,
    separator: Option<char>,
    bindings: &mut Vec<Binding>,
) -> Option<()> {
    match shape {
        VariantPart::Any => Some(()),
        VariantPart::Static(literal) => input?.eq_ignore_ascii_case(literal).then_some(()),
        VariantPart::Dynamic(tokens) => {
            let matched = match_tokens(tokens, &BTreeMap::new(), input?, separator, true)?;
            bindings.extend(matched.bindings);
            Some(())
        }
    }
}

fn insert_variant(buckets: &mut Vec<Bucket>, entry: usize, variant: &Variant, ignore_case: bool) {
    let index = match buckets.iter().position(|b| b.holds(variant)) {
        Some(index) => index,
        None => {
            buckets.push(Bucket::for_variant(variant));
            buckets.len() - 1
        }
    };
    let bucket = &mut buckets[index];

    match &variant.pathname {
        None => bucket.any_path.push(entry),
        Some(tokens) => {
            let segments: Vec<&[Token]> = tokens.split(|t| *t == Token::Separator).collect();
            bucket.root.insert(&segments, entry, ignore_case);
        }
    }
}

/// Patterns matched by walking a segment trie
///
/// Lookup cost grows with the number of URL segments rather than the number
/// of patterns. Registration expands optional groups, so patterns with many
/// independent groups are refused above [`MatcherConfig::max_variants`].
///
/// # Examples
///
/// ```
/// use rhtmx_pattern::{Matcher, TrieMatcher};
///
/// let mut matcher = TrieMatcher::new();
/// matcher.add_source("/docs(/:page)", "docs").unwrap();
/// matcher.add_source("/docs/api", "api").unwrap();
///
/// let all = matcher.match_all("/docs/api");
/// assert_eq!(all.iter().map(|m| *m.data).collect::<Vec<_>>(), vec!["api", "docs"]);
/// assert_eq!(all[1].get("page"), Some("api"));
/// ```
pub struct TrieMatcher<T> {
    entries: Vec<TrieEntry<T>>,
    buckets: Vec<Bucket>,
    config: MatcherConfig,
    next_order: u64,
}

impl<T> TrieMatcher<T> {
    pub fn new() -> Self {
        Self::with_config(MatcherConfig::default())
    }

    pub fn with_config(config: MatcherConfig) -> Self {
        Self {
            entries: Vec::new(),
            buckets: Vec::new(),
            config,
            next_order: 0,
        }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Registered patterns in registration order
    pub fn patterns(&self) -> impl Iterator<Item = &RoutePattern> {
        self.entries.iter().map(|e| &e.entry.pattern)
    }

    /// Number of distinct `(protocol, hostname, port)` roots
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    fn rebuild(&mut self) {
        self.buckets.clear();
        for (index, trie_entry) in self.entries.iter().enumerate() {
            let pattern = &trie_entry.entry.pattern;
            for variant in variant::generate(pattern) {
                insert_variant(&mut self.buckets, index, &variant, pattern.ignore_case());
            }
        }
        debug!(
            "rebuilt trie: {} patterns in {} buckets",
            self.entries.len(),
            self.buckets.len()
        );
    }
}

impl<T> Default for TrieMatcher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Matcher<T> for TrieMatcher<T> {
    fn add(&mut self, pattern: RoutePattern, data: T) -> Result<(), MatcherError> {
        let count = variant::count(&pattern);
        let limit = self.config.max_variants;
        if count > limit {
            warn!(
                "refusing pattern {}: {} variants exceeds limit {}",
                pattern, count, limit
            );
            return Err(MatcherError::TooManyVariants {
                pattern: pattern.to_string(),
                count,
                limit,
            });
        }

        let variants = variant::generate(&pattern);
        let fixed = match variants.as_slice() {
            [only] => Some(Specificity::new(
                &pattern,
                only.protocol.as_deref(),
                only.hostname.as_deref(),
                only.pathname.as_deref(),
            )),
            _ => None,
        };

        let index = self.entries.len();
        for variant in &variants {
            insert_variant(&mut self.buckets, index, variant, pattern.ignore_case());
        }

        debug!(
            "registered pattern {} (#{}, {} variants)",
            pattern,
            self.next_order,
            variants.len()
        );
        self.entries.push(TrieEntry {
            entry: Entry {
                pattern,
                data,
                order: self.next_order,
            },
            fixed,
        });
        self.next_order += 1;
        Ok(())
    }

    fn remove(&mut self, pattern: &RoutePattern) -> bool {
        match self.entries.iter().position(|e| e.entry.pattern == *pattern) {
            Some(index) => {
                self.entries.remove(index);
                debug!("removed pattern {}", pattern);
                self.rebuild();
                true
            }
            None => false,
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn parse_options(&self) -> ParseOptions {
        self.config.parse_options()
    }

    fn collect_matches<'m>(&'m self, url: &Url) -> Vec<MatchResult<'m, T>>
    where
        T: 'm,
    {
        let path = strip_root(url.path());
        let mut confirmed = HashSet::new();
        let mut results = Vec::new();

        for bucket in &self.buckets {
            let Some(origin) = bucket.match_origin(url) else {
                continue;
            };

            let mut walk = Walk::new(path);
            walk.found
                .extend(bucket.any_path.iter().map(|&entry| (entry, Vec::new())));
            walk.visit(&bucket.root, 0);
            trace!("{} trie leaves reached for {}", walk.found.len(), url);

            for (index, bindings) in walk.found {
                let trie_entry = &self.entries[index];
                let entry = &trie_entry.entry;

                match trie_entry.fixed {
                    Some(specificity) => {
                        if !entry.pattern.search().matches(url.query()) {
                            continue;
                        }
                        let params = origin
                            .iter()
                            .chain(&bindings)
                            .map(|b| (b.name.clone(), b.value.clone()))
                            .collect();
                        results.push(MatchResult {
                            pattern: &entry.pattern,
                            data: &entry.data,
                            params,
                            url: url.clone(),
                            specificity,
                            order: entry.order,
                        });
                    }
                    None => {
                        if !confirmed.insert(index) {
                            continue;
                        }
                        if let Some(matched) = entry.pattern.match_parsed(url) {
                            results.push(MatchResult::new(matched, &entry.data, entry.order));
                        }
                    }
                }
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn matcher(sources: &[&str]) -> TrieMatcher<usize> {
        let mut matcher = TrieMatcher::new();
        for (i, source) in sources.iter().enumerate() {
            matcher.add_source(source, i).unwrap();
        }
        matcher
    }

    fn hits(matcher: &TrieMatcher<usize>, url: &str) -> Vec<usize> {
        matcher.match_all(url).iter().map(|m| *m.data).collect()
    }

    #[test]
    fn test_static_before_dynamic() {
        let m = matcher(&["/a/:id", "/a/b"]);
        assert_eq!(hits(&m, "/a/b"), vec![1, 0]);
        assert_eq!(hits(&m, "/a/c"), vec![0]);
        assert_eq!(m.match_url("/a/c").unwrap().get("id"), Some("c"));
    }

    #[test]
    fn test_wildcard_tail() {
        let m = matcher(&["/files/*path", "/files/:name.txt", "/files/*path.txt"]);
        let all = m.match_all("/files/a/b.txt");
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].get("path"), Some("a/b"));
        assert_eq!(all[1].get("path"), Some("a/b.txt"));
        assert_eq!(hits(&m, "/files/b.txt"), vec![1, 2, 0]);
    }

    #[test]
    fn test_anonymous_wildcard_tail_binds_star() {
        let m = matcher(&["/assets/*"]);
        assert_eq!(m.match_url("/assets/css/app.css").unwrap().get("*"), Some("css/app.css"));
    }

    #[test]
    fn test_many_wildcard_tail_rejects_long_path() {
        let m = matcher(&["/*a/*b/*c/*d/end"]);
        let url = format!("/{}", "x/".repeat(300));
        assert!(m.match_url(url.as_str()).is_none());
    }

    #[test]
    fn test_wildcard_needs_input() {
        let m = matcher(&["/files/*path"]);
        assert!(m.match_url("/files/").is_none());
        assert!(m.match_url("/files").is_none());
    }

    #[test]
    fn test_dynamic_segment_with_text() {
        let m = matcher(&["/posts/:slug.json", "/posts/:id"]);
        let best = m.match_url("/posts/hello.json").unwrap();
        assert_eq!(*best.data, 0);
        assert_eq!(best.get("slug"), Some("hello"));
    }

    #[test]
    fn test_escaped_separator_is_matched_as_tail() {
        let m = matcher(&[r"/a\/b/:id"]);
        assert_eq!(m.match_url("/a/b/1").unwrap().get("id"), Some("1"));
        assert!(m.match_url("/a/c/1").is_none());
    }

    #[test]
    fn test_optional_groups_confirmed() {
        let m = matcher(&["a(/:id)"]);
        assert!(m.match_url("/a").unwrap().params.is_empty());
        assert_eq!(m.match_url("/a/5").unwrap().get("id"), Some("5"));
        assert_eq!(m.match_all("/a/5").len(), 1);
    }

    #[test]
    fn test_trailing_slash_is_a_segment() {
        let m = matcher(&["/a", "/a/"]);
        assert_eq!(hits(&m, "/a"), vec![0]);
        assert_eq!(hits(&m, "/a/"), vec![1]);
    }

    #[test]
    fn test_root_and_any_path() {
        let m = matcher(&["/", ""]);
        assert_eq!(hits(&m, "/"), vec![0, 1]);
        assert_eq!(hits(&m, "/x"), vec![1]);
    }

    #[test]
    fn test_hostname_buckets() {
        let m = matcher(&[
            "://:tenant.remix.run/",
            "://www.remix.run/",
            "http://www.remix.run:8080/",
            "/",
        ]);
        assert_eq!(m.bucket_count(), 4);
        assert_eq!(hits(&m, "https://www.remix.run/"), vec![1, 0, 3]);
        assert_eq!(hits(&m, "http://www.remix.run:8080/"), vec![2, 1, 0, 3]);

        let tenant = m.match_url("https://acme.remix.run/").unwrap();
        assert_eq!(tenant.get("tenant"), Some("acme"));
    }

    #[test]
    fn test_ignore_case_edges() {
        let mut m = TrieMatcher::new();
        m.add(
            RoutePattern::parse_with("/Docs/:page", ParseOptions { ignore_case: true }).unwrap(),
            0,
        )
        .unwrap();
        m.add_source("/Docs/intro", 1).unwrap();
        assert_eq!(hits(&m, "/docs/intro"), vec![0]);
        assert_eq!(hits(&m, "/Docs/intro"), vec![1, 0]);
    }

    #[test]
    fn test_search_constraints() {
        let m = matcher(&["/search?q=", "/search"]);
        assert_eq!(hits(&m, "/search?q=x"), vec![0, 1]);
        assert_eq!(hits(&m, "/search"), vec![1]);
    }

    #[test]
    fn test_too_many_variants() {
        let mut m = TrieMatcher::with_config(MatcherConfig {
            max_variants: 4,
            ..MatcherConfig::default()
        });
        assert!(m.add_source("/(a)(b)", ()).is_ok());
        let err = m.add_source("/(a)(b)(c)", ()).unwrap_err();
        assert!(matches!(
            err,
            MatcherError::TooManyVariants { count: 8, limit: 4, .. }
        ));
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn test_remove_rebuilds() {
        let mut m = matcher(&["/a/:id", "/a/b", "/c(/d)"]);
        assert!(m.remove(&RoutePattern::parse("/a/b").unwrap()));
        assert_eq!(hits(&m, "/a/b"), vec![0]);
        assert_eq!(hits(&m, "/c/d"), vec![2]);
        assert!(!m.remove(&RoutePattern::parse("/zzz").unwrap()));
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn test_binding_spans_are_path_relative() {
        let m = matcher(&["/users/:id/*rest"]);
        let walk_path = "users/42/a/b";
        let mut walk = Walk::new(walk_path);
        walk.visit(&m.buckets[0].root, 0);
        let (_, bindings) = &walk.found[0];
        assert_eq!(bindings[0].span.slice(walk_path), "42");
        assert_eq!(bindings[1].span.slice(walk_path), "a/b");
    }
}
