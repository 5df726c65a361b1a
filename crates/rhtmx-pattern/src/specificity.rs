/// Specificity ordering between matches
///
/// When several patterns match one URL the most specific one wins. The
/// score is derived from the tokens a match actually took (optional groups
/// that were elided do not count), so the same pattern can score differently
/// for different URLs.
use std::cmp::{Ordering, Reverse};

use crate::part::Token;
use crate::RoutePattern;

/// Comparable specificity score; greater is more specific
///
/// Fields compare in declaration order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Specificity {
    pub hostname: bool,
    pub port: bool,
    pub protocol: bool,
    pub pathname: bool,
    /// Hostname labels made only of literal text
    pub hostname_literals: usize,
    /// Pathname segments made only of literal text
    pub pathname_literals: usize,
    /// Fewer wildcards rank higher
    pub wildcards: Reverse<usize>,
    pub source_len: usize,
}

impl Specificity {
    /// Scores a match given the flattened tokens taken in each part
    pub(crate) fn new(
        pattern: &RoutePattern,
        protocol: Option<&[Token]>,
        hostname: Option<&[Token]>,
        pathname: Option<&[Token]>,
    ) -> Self {
        let wildcards = [protocol, hostname, pathname]
            .into_iter()
            .flatten()
            .flatten()
            .filter(|token| matches!(token, Token::Wildcard(_)))
            .count();

        Self {
            hostname: hostname.is_some(),
            port: pattern.port().is_some(),
            protocol: protocol.is_some(),
            pathname: pathname.is_some(),
            hostname_literals: hostname.map_or(0, literal_segments),
            pathname_literals: pathname.map_or(0, literal_segments),
            wildcards: Reverse(wildcards),
            source_len: pattern.source().len(),
        }
    }
}

/// Counts separator-delimited segments that are non-empty literal text
fn literal_segments(tokens: &[Token]) -> usize {
    tokens
        .split(|token| *token == Token::Separator)
        .filter(|segment| {
            !segment.is_empty() && segment.iter().all(|t| matches!(t, Token::Text(_)))
        })
        .count()
}

/// Sort comparator placing the more specific score first
///
/// # Examples
///
/// ```
/// use rhtmx_pattern::{specificity, RoutePattern};
///
/// let stat = RoutePattern::parse("/a/b").unwrap();
/// let dynamic = RoutePattern::parse("/a/:id").unwrap();
/// let a = stat.matches("/a/b").unwrap();
/// let b = dynamic.matches("/a/b").unwrap();
///
/// assert!(specificity::compare(&a.specificity, &b.specificity).is_lt());
/// ```
pub fn compare(a: &Specificity, b: &Specificity) -> Ordering {
    b.cmp(a)
}
