/// Token types shared by protocol, hostname and pathname parts
///
/// Functional sum type for pattern matching over parsed parts.

/// Params key of an anonymous `*` wildcard, both when matching and in `href`
pub const ANONYMOUS_WILDCARD: &str = "*";

/// Which URL component a part describes
///
/// The kind decides the separator character: `.` between hostname labels,
/// `/` between pathname segments, none inside a protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartKind {
    Protocol,
    Hostname,
    Pathname,
}

impl PartKind {
    /// Segment delimiter for this kind of part
    ///
    /// # Examples
    ///
    /// ```
    /// use rhtmx_pattern::part::PartKind;
    ///
    /// assert_eq!(PartKind::Hostname.separator(), Some('.'));
    /// assert_eq!(PartKind::Pathname.separator(), Some('/'));
    /// assert_eq!(PartKind::Protocol.separator(), None);
    /// ```
    pub fn separator(self) -> Option<char> {
        match self {
            PartKind::Protocol => None,
            PartKind::Hostname => Some('.'),
            PartKind::Pathname => Some('/'),
        }
    }
}

/// One lexical element of a part
///
/// # Examples
///
/// ```
/// use rhtmx_pattern::part::{PartKind, PartPattern, Token};
///
/// let part = PartPattern::parse("posts/:id(.json)", PartKind::Pathname, false).unwrap();
/// assert_eq!(
///     part.tokens(),
///     &[
///         Token::Text("posts".to_string()),
///         Token::Separator,
///         Token::Param("id".to_string()),
///         Token::GroupOpen,
///         Token::Text(".json".to_string()),
///         Token::GroupClose,
///     ]
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    /// Literal characters
    Text(String),
    /// The part's delimiter (`.` or `/`)
    Separator,
    /// `:name`: one or more characters, never the separator
    Param(String),
    /// `*name` or bare `*`: one or more characters, separators included
    Wildcard(Option<String>),
    /// `(`
    GroupOpen,
    /// `)`
    GroupClose,
}

impl Token {
    /// Name bound by this token, if any
    pub fn param_name(&self) -> Option<&str> {
        match self {
            Token::Param(name) => Some(name),
            Token::Wildcard(name) => name.as_deref(),
            _ => None,
        }
    }

    /// Params key this token binds under
    ///
    /// Anonymous wildcards share [`ANONYMOUS_WILDCARD`].
    pub fn binding_key(&self) -> Option<&str> {
        match self {
            Token::Param(name) => Some(name),
            Token::Wildcard(name) => Some(name.as_deref().unwrap_or(ANONYMOUS_WILDCARD)),
            _ => None,
        }
    }

    /// Whether this token binds input (named or not)
    pub fn is_param(&self) -> bool {
        matches!(self, Token::Param(_) | Token::Wildcard(_))
    }
}

pub(crate) fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

pub(crate) fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
