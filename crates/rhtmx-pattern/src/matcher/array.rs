/// Linear-scan matcher with a compiled regex prefilter
///
/// Each registration compiles one anchored regular expression per hostname
/// and pathname. The regex only rejects: every candidate that passes is
/// confirmed, and its params extracted, by [`RoutePattern::matches`], so
/// results never depend on the regex engine's own greediness.
use regex::{Regex, RegexBuilder};
use tracing::{debug, trace};
use url::Url;

use super::{Entry, MatchResult, Matcher};
use crate::config::MatcherConfig;
use crate::part::{PartKind, PartPattern, Token};
use crate::route::strip_root;
use crate::{MatcherError, ParseOptions, RoutePattern};

struct ArrayEntry<T> {
    entry: Entry<T>,
    hostname: Option<Regex>,
    pathname: Option<Regex>,
}

/// Patterns matched by linear scan
///
/// O(1) registration, O(patterns) matching. Best for small route tables or
/// when build time matters more than lookup time.
///
/// # Examples
///
/// ```
/// use rhtmx_pattern::{ArrayMatcher, Matcher};
///
/// let mut matcher = ArrayMatcher::new();
/// matcher.add_source("/users/:id", "user").unwrap();
/// matcher.add_source("/users/new", "new-user").unwrap();
///
/// let best = matcher.match_url("/users/new").unwrap();
/// assert_eq!(*best.data, "new-user");
/// assert_eq!(matcher.match_all("/users/new").len(), 2);
/// ```
pub struct ArrayMatcher<T> {
    entries: Vec<ArrayEntry<T>>,
    config: MatcherConfig,
    next_order: u64,
}

impl<T> ArrayMatcher<T> {
    pub fn new() -> Self {
        Self::with_config(MatcherConfig::default())
    }

    pub fn with_config(config: MatcherConfig) -> Self {
        Self {
            entries: Vec::new(),
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
}

impl<T> Default for ArrayMatcher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Matcher<T> for ArrayMatcher<T> {
    fn add(&mut self, pattern: RoutePattern, data: T) -> Result<(), MatcherError> {
        let hostname = pattern
            .hostname()
            .map(|part| prefilter(part, pattern.source()))
            .transpose()?;
        let pathname = pattern
            .pathname()
            .map(|part| prefilter(part, pattern.source()))
            .transpose()?;

        debug!("registered pattern {} (#{})", pattern, self.next_order);
        self.entries.push(ArrayEntry {
            entry: Entry {
                pattern,
                data,
                order: self.next_order,
            },
            hostname,
            pathname,
        });
        self.next_order += 1;
        Ok(())
    }

    fn remove(&mut self, pattern: &RoutePattern) -> bool {
        match self.entries.iter().position(|e| e.entry.pattern == *pattern) {
            Some(index) => {
                self.entries.remove(index);
                debug!("removed pattern {}", pattern);
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
        let host = url.host_str();
        let path = strip_root(url.path());

        let candidates: Vec<&ArrayEntry<T>> = self
            .entries
            .iter()
            .filter(|e| {
                e.hostname
                    .as_ref()
                    .map_or(true, |re| host.is_some_and(|h| re.is_match(h)))
            })
            .filter(|e| e.pathname.as_ref().map_or(true, |re| re.is_match(path)))
            .collect();

        trace!(
            "{} of {} patterns passed the prefilter for {}",
            candidates.len(),
            self.entries.len(),
            url
        );

        candidates
            .into_iter()
            .filter_map(|e| {
                e.entry
                    .pattern
                    .match_parsed(url)
                    .map(|m| MatchResult::new(m, &e.entry.data, e.entry.order))
            })
            .collect()
    }
}

/// Compiles the anchored prefilter for one part
fn prefilter(part: &PartPattern, source: &str) -> Result<Regex, MatcherError> {
    RegexBuilder::new(&regex_source(part))
        .case_insensitive(part.ignore_case())
        .dot_matches_new_line(true)
        .build()
        .map_err(|err| MatcherError::Regex {
            pattern: source.to_string(),
            source: err,
        })
}

/// Translates part tokens into an anchored regex accepting a superset of the part
fn regex_source(part: &PartPattern) -> String {
    let separator = part.kind().separator();
    let segment = match part.kind() {
        PartKind::Pathname => "[^/]+",
        PartKind::Hostname => r"[^.]+",
        PartKind::Protocol => ".+",
    };

    let mut out = String::from("^");
    for token in part.tokens() {
        match token {
            Token::Text(text) => out.push_str(&regex::escape(text)),
            Token::Separator => {
                if let Some(sep) = separator {
                    out.push_str(&regex::escape(&sep.to_string()));
                }
            }
            Token::Param(_) => out.push_str(segment),
            Token::Wildcard(_) => out.push_str(".+"),
            Token::GroupOpen => out.push_str("(?:"),
            Token::GroupClose => out.push_str(")?"),
        }
    }
    out.push('$');
    out
}
