/// Error types for pattern parsing, URL generation and matcher registration
///
/// Parsing errors always carry a byte offset into the pattern source so the
/// caller can point at the offending character.
use thiserror::Error;

/// A malformed pattern source
///
/// Only ever produced by [`RoutePattern::parse`](crate::RoutePattern::parse)
/// and [`RoutePattern::join`](crate::RoutePattern::join), never while matching.
///
/// # Examples
///
/// ```
/// use rhtmx_pattern::{PatternSyntaxError, RoutePattern};
///
/// let err = RoutePattern::parse("/users/(:id").unwrap_err();
/// assert_eq!(err, PatternSyntaxError::UnbalancedParen { offset: 7 });
/// assert_eq!(err.offset(), 7);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternSyntaxError {
    /// A `(` without its `)` or a `)` without its `(`
    #[error("unbalanced parenthesis at offset {offset}")]
    UnbalancedParen { offset: usize },

    /// `:` not followed by an identifier
    #[error("invalid parameter name at offset {offset}")]
    InvalidParamName { offset: usize },

    /// The same parameter name used twice in one pattern
    #[error("duplicate parameter `{name}` at offset {offset}")]
    DuplicateParam { name: String, offset: usize },

    /// A `\` at the very end of a part
    #[error("dangling escape at offset {offset}")]
    TrailingEscape { offset: usize },
}

impl PatternSyntaxError {
    /// Byte offset into the pattern source where the error was detected
    pub fn offset(&self) -> usize {
        match self {
            Self::UnbalancedParen { offset }
            | Self::InvalidParamName { offset }
            | Self::DuplicateParam { offset, .. }
            | Self::TrailingEscape { offset } => *offset,
        }
    }

    /// Shifts the offset by `base` (part-relative → source-relative)
    pub(crate) fn shifted(self, base: usize) -> Self {
        match self {
            Self::UnbalancedParen { offset } => Self::UnbalancedParen {
                offset: offset + base,
            },
            Self::InvalidParamName { offset } => Self::InvalidParamName {
                offset: offset + base,
            },
            Self::DuplicateParam { name, offset } => Self::DuplicateParam {
                name,
                offset: offset + base,
            },
            Self::TrailingEscape { offset } => Self::TrailingEscape {
                offset: offset + base,
            },
        }
    }
}

/// A required parameter was not supplied to `href()`
///
/// Recoverable: callers typically fall back to another route.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing parameter `{name}`")]
pub struct MissingParamError {
    pub name: String,
}

impl MissingParamError {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A pattern was refused by a matcher at registration time
#[derive(Debug, Error)]
pub enum MatcherError {
    /// A pattern source given to `add_source` did not parse
    #[error(transparent)]
    Syntax(#[from] PatternSyntaxError),

    /// Optional-group expansion exceeds the configured cap
    #[error(
        "pattern `{pattern}` expands to {count} variants (limit {limit}); \
         register it with an ArrayMatcher instead"
    )]
    TooManyVariants {
        pattern: String,
        count: usize,
        limit: usize,
    },

    /// The regular-expression prefilter could not be compiled
    #[error("failed to compile prefilter for `{pattern}`")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
