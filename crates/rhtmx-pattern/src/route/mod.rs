/// Route patterns: the parsed form of a whole pattern source
///
/// A [`RoutePattern`] owns one part per URL component plus the search
/// constraints. `None` components are unconstrained. Patterns are immutable
/// once built; [`join`](RoutePattern::join) produces a new pattern.
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;

use url::Url;

use crate::input::UrlInput;
use crate::part::{PartKind, PartMatch, PartPattern};
use crate::search::SearchConstraints;
use crate::specificity::{self, Specificity};
use crate::split::{split, Span};
use crate::PatternSyntaxError;

mod href;
mod join;

/// Param values by name
pub type Params = HashMap<String, String>;

/// Options applied while parsing a pattern source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Compare pathname text case-insensitively (ASCII only)
    pub ignore_case: bool,
}

/// A parsed route pattern
///
/// Equality is structural: two patterns parsed from different sources that
/// describe the same AST are equal.
///
/// # Examples
///
/// ```
/// use rhtmx_pattern::RoutePattern;
///
/// let pattern = RoutePattern::parse("://(:tenant.)remix.run/products/:id").unwrap();
/// let m = pattern.matches("https://acme.remix.run/products/42").unwrap();
/// assert_eq!(m.get("tenant"), Some("acme"));
/// assert_eq!(m.get("id"), Some("42"));
///
/// assert!(pattern.matches("https://remix.run/products/42").is_some());
/// assert!(pattern.matches("https://remix.run/orders/42").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct RoutePattern {
    source: String,
    protocol: Option<PartPattern>,
    hostname: Option<PartPattern>,
    port: Option<String>,
    pathname: Option<PartPattern>,
    rooted: bool,
    search: SearchConstraints,
    ignore_case: bool,
}

/// A successful match of one pattern against one URL
#[derive(Debug, Clone)]
pub struct Match<'p> {
    pub pattern: &'p RoutePattern,
    /// Params of all components; params of elided groups are absent
    pub params: Params,
    pub url: Url,
    pub specificity: Specificity,
}

impl Match<'_> {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Most specific first; equal scores fall back to the pattern source,
    /// then case-sensitive before case-insensitive
    pub fn compare(&self, other: &Match<'_>) -> Ordering {
        specificity::compare(&self.specificity, &other.specificity)
            .then_with(|| self.pattern.source().cmp(other.pattern.source()))
            .then_with(|| self.pattern.ignore_case().cmp(&other.pattern.ignore_case()))
    }
}

// ============================================================================
// Construction
// ============================================================================

impl RoutePattern {
    /// Parses a pattern source with default options
    pub fn parse(source: &str) -> Result<Self, PatternSyntaxError> {
        Self::parse_with(source, ParseOptions::default())
    }

    /// Parses a pattern source
    ///
    /// Error offsets point into `source`. A param name may appear only once
    /// across protocol, hostname and pathname.
    ///
    /// # Examples
    ///
    /// ```
    /// use rhtmx_pattern::{ParseOptions, PatternSyntaxError, RoutePattern};
    ///
    /// let pattern = RoutePattern::parse_with("/Docs/:page", ParseOptions { ignore_case: true }).unwrap();
    /// assert!(pattern.matches("/docs/intro").is_some());
    ///
    /// let err = RoutePattern::parse("://:id.remix.run/:id").unwrap_err();
    /// assert_eq!(
    ///     err,
    ///     PatternSyntaxError::DuplicateParam { name: "id".to_string(), offset: 17 }
    /// );
    /// ```
    pub fn parse_with(source: &str, options: ParseOptions) -> Result<Self, PatternSyntaxError> {
        let spans = split(source)?;
        let mut seen = HashSet::new();

        // Scheme and host comparisons are always case-insensitive
        let protocol = spans
            .protocol
            .map(|span| parse_part(source, span, PartKind::Protocol, true, &mut seen))
            .transpose()?;
        let hostname = spans
            .hostname
            .map(|span| parse_part(source, span, PartKind::Hostname, true, &mut seen))
            .transpose()?;

        let mut rooted = false;
        let pathname = spans
            .pathname
            .map(|span| {
                let span = if span.slice(source).starts_with('/') {
                    rooted = true;
                    Span::new(span.begin + 1, span.end)
                } else {
                    span
                };
                parse_part(source, span, PartKind::Pathname, options.ignore_case, &mut seen)
            })
            .transpose()?;

        Ok(Self {
            source: source.to_string(),
            protocol,
            hostname,
            port: spans.port.map(|span| span.slice(source).to_string()),
            pathname,
            rooted,
            search: spans
                .search
                .map(|span| SearchConstraints::parse(span.slice(source)))
                .unwrap_or_default(),
            ignore_case: options.ignore_case,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The string this pattern was parsed from
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn protocol(&self) -> Option<&PartPattern> {
        self.protocol.as_ref()
    }

    pub fn hostname(&self) -> Option<&PartPattern> {
        self.hostname.as_ref()
    }

    pub fn port(&self) -> Option<&str> {
        self.port.as_deref()
    }

    pub fn pathname(&self) -> Option<&PartPattern> {
        self.pathname.as_ref()
    }

    /// Whether the pathname was written with a leading `/`
    pub fn is_rooted(&self) -> bool {
        self.rooted
    }

    pub fn search(&self) -> &SearchConstraints {
        &self.search
    }

    pub fn ignore_case(&self) -> bool {
        self.ignore_case
    }

    pub fn options(&self) -> ParseOptions {
        ParseOptions {
            ignore_case: self.ignore_case,
        }
    }

    /// Every param name declared by the pattern, protocol first
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        [&self.protocol, &self.hostname, &self.pathname]
            .into_iter()
            .flatten()
            .flat_map(PartPattern::param_names)
    }

    // ========================================================================
    // Matching
    // ========================================================================

    /// Matches a URL (or a path, resolved against `http://localhost/`)
    ///
    /// # Examples
    ///
    /// ```
    /// use rhtmx_pattern::RoutePattern;
    ///
    /// let pattern = RoutePattern::parse("/files/*rest").unwrap();
    /// let m = pattern.matches("/files/a/b/c").unwrap();
    /// assert_eq!(m.get("rest"), Some("a/b/c"));
    ///
    /// let optional = RoutePattern::parse("a(/:id)").unwrap();
    /// assert!(optional.matches("/a").unwrap().params.is_empty());
    /// assert_eq!(optional.matches("/a/5").unwrap().get("id"), Some("5"));
    /// ```
    pub fn matches<U: UrlInput + ?Sized>(&self, url: &U) -> Option<Match<'_>> {
        let url = url.to_url()?;
        self.match_parsed(&url)
    }

    pub(crate) fn match_parsed(&self, url: &Url) -> Option<Match<'_>> {
        let protocol = match_part(self.protocol.as_ref(), Some(url.scheme()))?;
        let hostname = match_part(self.hostname.as_ref(), url.host_str())?;
        if !self.port_matches(url) {
            return None;
        }
        let pathname = match_part(self.pathname.as_ref(), Some(strip_root(url.path())))?;
        if !self.search.matches(url.query()) {
            return None;
        }

        let flat = |part: &Option<PartPattern>, m: &Option<PartMatch>| {
            part.as_ref()
                .zip(m.as_ref())
                .map(|(part, m)| part.flatten(&m.included_groups))
        };
        let specificity = Specificity::new(
            self,
            flat(&self.protocol, &protocol).as_deref(),
            flat(&self.hostname, &hostname).as_deref(),
            flat(&self.pathname, &pathname).as_deref(),
        );

        let params = [protocol, hostname, pathname]
            .into_iter()
            .flatten()
            .flat_map(|m| m.bindings)
            .map(|b| (b.name, b.value))
            .collect();

        Some(Match {
            pattern: self,
            params,
            url: url.clone(),
            specificity,
        })
    }

    /// `None` accepts any port; otherwise the URL's explicit port must equal it
    pub(crate) fn port_matches(&self, url: &Url) -> bool {
        match &self.port {
            None => true,
            Some(port) => url.port().is_some_and(|p| p.to_string() == *port),
        }
    }
}

impl PartialEq for RoutePattern {
    fn eq(&self, other: &Self) -> bool {
        self.protocol == other.protocol
            && self.hostname == other.hostname
            && self.port == other.port
            && self.pathname == other.pathname
            && self.rooted == other.rooted
            && self.search == other.search
            && self.ignore_case == other.ignore_case
    }
}

impl Eq for RoutePattern {}

impl fmt::Display for RoutePattern {
    /// Reserializes the pattern; parsing the output yields an equal pattern
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let has_origin = self.protocol.is_some() || self.hostname.is_some() || self.port.is_some();

        if has_origin {
            if let Some(protocol) = &self.protocol {
                write!(f, "{protocol}")?;
            }
            f.write_str("://")?;
            if let Some(hostname) = &self.hostname {
                write!(f, "{hostname}")?;
            }
            if let Some(port) = &self.port {
                write!(f, ":{port}")?;
            }
        }

        if let Some(pathname) = &self.pathname {
            if has_origin || self.rooted {
                f.write_str("/")?;
            }
            write!(f, "{pathname}")?;
        }

        if !self.search.is_empty() {
            write!(f, "?{}", self.search)?;
        }
        Ok(())
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Parses one component span and checks its names against earlier components
fn parse_part(
    source: &str,
    span: Span,
    kind: PartKind,
    ignore_case: bool,
    seen: &mut HashSet<String>,
) -> Result<PartPattern, PatternSyntaxError> {
    let (part, offsets) = PartPattern::parse_with_offsets(span.slice(source), kind, ignore_case)
        .map_err(|err| err.shifted(span.begin))?;

    for (token, offset) in part.tokens().iter().zip(offsets) {
        if let Some(name) = token.param_name() {
            if !seen.insert(name.to_string()) {
                return Err(PatternSyntaxError::DuplicateParam {
                    name: name.to_string(),
                    offset: span.begin + offset,
                });
            }
        }
    }
    Ok(part)
}

/// `Some(None)` for an unconstrained part, `None` when a constrained part fails
fn match_part(part: Option<&PartPattern>, input: Option<&str>) -> Option<Option<PartMatch>> {
    match part {
        None => Some(None),
        Some(part) => part.matches(input?).map(Some),
    }
}

/// URL path without its leading `/`
pub(crate) fn strip_root(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}
