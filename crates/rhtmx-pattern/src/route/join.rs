/// Pattern composition for nested route prefixes
use super::RoutePattern;
use crate::part::{serialize, PartKind, PartPattern, Token};
use crate::PatternSyntaxError;

impl RoutePattern {
    /// Mounts `other` under this pattern
    ///
    /// Pathnames are concatenated with exactly one `/` at the boundary.
    /// Protocol, hostname, port and search of `other` replace the receiver's
    /// when `other` defines them. The result is re-parsed, so a param name
    /// declared on both sides is a [`PatternSyntaxError::DuplicateParam`].
    ///
    /// # Examples
    ///
    /// ```
    /// use rhtmx_pattern::RoutePattern;
    ///
    /// let base = RoutePattern::parse("a/").unwrap();
    /// let joined = base.join(&RoutePattern::parse("/b").unwrap()).unwrap();
    /// assert_eq!(joined.to_string(), "a/b");
    ///
    /// let left = RoutePattern::parse("(a/)").unwrap();
    /// let joined = left.join(&RoutePattern::parse("(/b)").unwrap()).unwrap();
    /// assert_eq!(joined.to_string(), "(a)(/b)");
    ///
    /// let api = RoutePattern::parse("https://api.remix.run/v1").unwrap();
    /// let joined = api.join(&RoutePattern::parse("/users/:id?fields=").unwrap()).unwrap();
    /// assert_eq!(joined.to_string(), "https://api.remix.run/v1/users/:id?fields=");
    /// ```
    pub fn join(&self, other: &RoutePattern) -> Result<RoutePattern, PatternSyntaxError> {
        let pathname = match (&self.pathname, &other.pathname) {
            (Some(left), Some(right)) => Some(join_pathnames(left.tokens(), right.tokens())),
            (Some(only), None) | (None, Some(only)) => Some(only.tokens().to_vec()),
            (None, None) => None,
        };
        let rooted = if self.pathname.is_some() {
            self.rooted
        } else {
            other.rooted
        };

        let protocol = other.protocol.as_ref().or(self.protocol.as_ref());
        let hostname = other.hostname.as_ref().or(self.hostname.as_ref());
        let port = other.port.as_ref().or(self.port.as_ref());
        let search = if other.search.is_empty() {
            &self.search
        } else {
            &other.search
        };

        let mut source = String::new();
        let has_origin = protocol.is_some() || hostname.is_some() || port.is_some();
        if has_origin {
            source.push_str(&protocol.map(PartPattern::to_string).unwrap_or_default());
            source.push_str("://");
            source.push_str(&hostname.map(PartPattern::to_string).unwrap_or_default());
            if let Some(port) = port {
                source.push(':');
                source.push_str(port);
            }
        }
        if let Some(tokens) = &pathname {
            if has_origin || rooted {
                source.push('/');
            }
            source.push_str(&serialize(tokens, PartKind::Pathname));
        }
        if !search.is_empty() {
            source.push('?');
            source.push_str(&search.to_string());
        }

        tracing::trace!("joined {} + {} -> {}", self, other, source);
        RoutePattern::parse_with(&source, self.options())
    }
}

/// Concatenates two pathname token lists with one separator at the boundary
fn join_pathnames(left: &[Token], right: &[Token]) -> Vec<Token> {
    let mut joined = left.to_vec();
    // A trailing `/` may sit inside any number of closing groups
    let closes = left
        .iter()
        .rev()
        .take_while(|token| **token == Token::GroupClose)
        .count();
    let before = left.len() - closes;
    if before > 0 && left[before - 1] == Token::Separator {
        joined.remove(before - 1);
    }

    let right = match right {
        [Token::Separator, rest @ ..] => rest,
        _ => right,
    };

    // A right side opening with `(/` carries its own separator
    let carries_separator = matches!(right, [Token::GroupOpen, Token::Separator, ..]);
    if !joined.is_empty() && !right.is_empty() && !carries_separator {
        joined.push(Token::Separator);
    }
    joined.extend_from_slice(right);
    joined
}
