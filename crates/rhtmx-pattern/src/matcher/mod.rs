/// Pattern collections matched against URLs
///
/// Two strategies share one trait:
/// - [`ArrayMatcher`]: linear scan behind a regex prefilter, O(1) add
/// - [`TrieMatcher`]: segment trie built from optional-group variants
///
/// Both return every matching pattern with its caller-supplied data, ordered
/// most specific first, and agree on params and order for any input.
use std::cmp::Ordering;

use url::Url;

use crate::input::UrlInput;
use crate::specificity::{self, Specificity};
use crate::{Match, MatcherError, Params, ParseOptions, RoutePattern};

pub mod array;
pub mod trie;

pub use array::ArrayMatcher;
pub use trie::TrieMatcher;

/// One pattern matched by a matcher, with its registered data
#[derive(Debug, Clone)]
pub struct MatchResult<'a, T> {
    pub pattern: &'a RoutePattern,
    pub data: &'a T,
    pub params: Params,
    pub url: Url,
    pub specificity: Specificity,
    /// Registration sequence number; earlier registrations win ties
    pub order: u64,
}

impl<'a, T> MatchResult<'a, T> {
    pub(crate) fn new(matched: Match<'a>, data: &'a T, order: u64) -> Self {
        Self {
            pattern: matched.pattern,
            data,
            params: matched.params,
            url: matched.url,
            specificity: matched.specificity,
            order,
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Default ordering: most specific first, then first registered
    pub fn compare(&self, other: &MatchResult<'_, T>) -> Ordering {
        specificity::compare(&self.specificity, &other.specificity)
            .then_with(|| self.order.cmp(&other.order))
    }
}

/// A registered pattern and its opaque payload
#[derive(Debug, Clone)]
pub(crate) struct Entry<T> {
    pub pattern: RoutePattern,
    pub data: T,
    pub order: u64,
}

/// Common interface of the array and trie matchers
///
/// # Examples
///
/// ```
/// use rhtmx_pattern::{ArrayMatcher, Matcher, RoutePattern, TrieMatcher};
///
/// fn routes<M: Matcher<&'static str>>(mut matcher: M) -> M {
///     matcher.add(RoutePattern::parse("/a/:id").unwrap(), "dynamic").unwrap();
///     matcher.add(RoutePattern::parse("/a/b").unwrap(), "static").unwrap();
///     matcher
/// }
///
/// for best in [
///     routes(ArrayMatcher::new()).match_url("/a/b").map(|m| *m.data),
///     routes(TrieMatcher::new()).match_url("/a/b").map(|m| *m.data),
/// ] {
///     assert_eq!(best, Some("static"));
/// }
/// ```
pub trait Matcher<T> {
    /// Registers a pattern with its data
    fn add(&mut self, pattern: RoutePattern, data: T) -> Result<(), MatcherError>;

    /// Removes the first registration structurally equal to `pattern`
    fn remove(&mut self, pattern: &RoutePattern) -> bool;

    /// Number of registered patterns
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Options used by [`add_source`](Self::add_source)
    fn parse_options(&self) -> ParseOptions;

    /// Parses `source` with this matcher's options and registers it
    fn add_source(&mut self, source: &str, data: T) -> Result<(), MatcherError> {
        let pattern = RoutePattern::parse_with(source, self.parse_options())?;
        self.add(pattern, data)
    }

    /// Every match for a parsed URL, in no particular order
    fn collect_matches<'m>(&'m self, url: &Url) -> Vec<MatchResult<'m, T>>
    where
        T: 'm;

    /// All matches ordered by `compare`
    fn match_all_by<'m, U, F>(&'m self, url: &U, mut compare: F) -> Vec<MatchResult<'m, T>>
    where
        T: 'm,
        U: UrlInput + ?Sized,
        F: FnMut(&MatchResult<'m, T>, &MatchResult<'m, T>) -> Ordering,
    {
        let Some(url) = url.to_url() else {
            return Vec::new();
        };
        let mut matches = self.collect_matches(&url);
        matches.sort_by(|a, b| compare(a, b));
        matches
    }

    /// All matches, most specific first
    fn match_all<'m, U>(&'m self, url: &U) -> Vec<MatchResult<'m, T>>
    where
        T: 'm,
        U: UrlInput + ?Sized,
    {
        self.match_all_by(url, MatchResult::compare)
    }

    /// The most specific match
    fn match_url<'m, U>(&'m self, url: &U) -> Option<MatchResult<'m, T>>
    where
        T: 'm,
        U: UrlInput + ?Sized,
    {
        self.match_all(url).into_iter().next()
    }

    /// The first match under a custom ordering
    fn match_url_by<'m, U, F>(&'m self, url: &U, compare: F) -> Option<MatchResult<'m, T>>
    where
        T: 'm,
        U: UrlInput + ?Sized,
        F: FnMut(&MatchResult<'m, T>, &MatchResult<'m, T>) -> Ordering,
    {
        self.match_all_by(url, compare).into_iter().next()
    }
}
