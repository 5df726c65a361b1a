/// Search (query string) constraints
///
/// The search part of a pattern is not a part grammar: it is a list of
/// `key`, `key=` and `key=value` entries, each narrowing which query strings
/// are accepted. Matching is constraint satisfaction, so unconstrained query
/// params in the URL are always allowed.
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Rules for one query key
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SearchConstraint {
    /// When non-empty, at least one occurrence must carry one of these values
    pub required_values: BTreeSet<String>,
    /// The key must have been written with `=`
    pub require_assignment: bool,
    /// The pattern listed the key without `=`
    pub allow_bare: bool,
}

impl SearchConstraint {
    /// A bare-only key declares the param without requiring it
    pub fn is_optional(&self) -> bool {
        !self.require_assignment && self.required_values.is_empty()
    }

    /// Whether a single query occurrence satisfies this constraint
    ///
    /// `value` is `None` for a bare `?key` occurrence.
    fn accepts(&self, value: Option<&str>) -> bool {
        if self.require_assignment && value.is_none() {
            return false;
        }
        self.required_values.is_empty()
            || value.is_some_and(|v| self.required_values.contains(v))
    }
}

/// Per-key query constraints of one pattern, ordered by key
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SearchConstraints {
    entries: BTreeMap<String, SearchConstraint>,
}

impl SearchConstraints {
    /// Parses the text after `?` in a pattern
    ///
    /// # Examples
    ///
    /// ```
    /// use rhtmx_pattern::search::SearchConstraints;
    ///
    /// let search = SearchConstraints::parse("q=&sort&lang=en&lang=fr");
    ///
    /// let q = search.get("q").unwrap();
    /// assert!(q.require_assignment && q.required_values.is_empty());
    ///
    /// let sort = search.get("sort").unwrap();
    /// assert!(sort.allow_bare && !sort.require_assignment);
    ///
    /// assert_eq!(search.get("lang").unwrap().required_values.len(), 2);
    /// ```
    pub fn parse(search: &str) -> Self {
        let mut entries: BTreeMap<String, SearchConstraint> = BTreeMap::new();

        for (key, value) in query_pairs(search) {
            let constraint = entries.entry(key).or_default();
            match value {
                None => constraint.allow_bare = true,
                Some(value) => {
                    constraint.require_assignment = true;
                    if !value.is_empty() {
                        constraint.required_values.insert(value);
                    }
                }
            }
        }

        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, key: &str) -> Option<&SearchConstraint> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SearchConstraint)> {
        self.entries.iter().map(|(k, c)| (k.as_str(), c))
    }

    /// Checks a raw URL query (without the `?`) against every constraint
    ///
    /// Keys listed with `=` must be present; bare-only keys never reject.
    ///
    /// # Examples
    ///
    /// ```
    /// use rhtmx_pattern::search::SearchConstraints;
    ///
    /// let search = SearchConstraints::parse("q=&sort");
    /// assert!(search.matches(Some("q=hello")));
    /// assert!(search.matches(Some("q=hello&sort")));
    /// assert!(search.matches(Some("q=hello&sort=asc&page=2")));
    /// assert!(!search.matches(Some("q")));
    /// assert!(!search.matches(None));
    /// ```
    pub fn matches(&self, query: Option<&str>) -> bool {
        if self.entries.is_empty() {
            return true;
        }
        let actual: Vec<(String, Option<String>)> = query.map(query_pairs).unwrap_or_default();

        self.entries.iter().all(|(key, constraint)| {
            constraint.is_optional()
                || actual
                    .iter()
                    .filter(|(k, _)| k == key)
                    .any(|(_, value)| constraint.accepts(value.as_deref()))
        })
    }
}

impl fmt::Display for SearchConstraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries = Vec::new();

        for (key, constraint) in &self.entries {
            let key = urlencoding::encode(key);
            if constraint.allow_bare {
                entries.push(key.to_string());
            }
            for value in &constraint.required_values {
                entries.push(format!("{key}={}", urlencoding::encode(value)));
            }
            if constraint.require_assignment && constraint.required_values.is_empty() {
                entries.push(format!("{key}="));
            }
        }

        f.write_str(&entries.join("&"))
    }
}

/// Splits a query into decoded `(key, value)` pairs, keeping bare keys as `None`
fn query_pairs(query: &str) -> Vec<(String, Option<String>)> {
    query
        .split('&')
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((key, value)) => (decode(key), Some(decode(value))),
            None => (decode(entry), None),
        })
        .collect()
}

/// Form-style decoding: `+` is a space, invalid UTF-8 leaves the text as-is
fn decode(raw: &str) -> String {
    let spaced: Cow<'_, str> = if raw.contains('+') {
        Cow::Owned(raw.replace('+', " "))
    } else {
        Cow::Borrowed(raw)
    };
    urlencoding::decode(&spaced)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| spaced.into_owned())
}
