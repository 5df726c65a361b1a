/// Span splitting for pattern sources
///
/// Slices `scheme://host:port/path?query` into per-component byte spans.
/// Delimiters only count outside parentheses and when not escaped, so
/// optional groups like `(*.:tenant.)` or `a(/:id)` stay inside one part.
use crate::PatternSyntaxError;

/// Half-open `[begin, end)` byte range into a pattern source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub begin: usize,
    pub end: usize,
}

impl Span {
    pub fn new(begin: usize, end: usize) -> Self {
        Self { begin, end }
    }

    /// Borrows the spanned text out of `source`
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        &source[self.begin..self.end]
    }

    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// `Some(span)` for non-empty ranges; absent components are never zero-length
    fn non_empty(begin: usize, end: usize) -> Option<Self> {
        (end > begin).then(|| Self::new(begin, end))
    }
}

/// Component spans of one pattern source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Spans {
    pub protocol: Option<Span>,
    pub hostname: Option<Span>,
    pub port: Option<Span>,
    /// Includes the leading `/` when the source has one
    pub pathname: Option<Span>,
    pub search: Option<Span>,
}

/// Splits a pattern source into component spans
///
/// # Examples
///
/// ```
/// use rhtmx_pattern::split::{split, Span};
///
/// let spans = split("http(s)://(*.:tenant.)remix.run:8080/products/:id?sort").unwrap();
/// assert_eq!(spans.protocol, Some(Span::new(0, 7)));
/// assert_eq!(spans.hostname, Some(Span::new(10, 31)));
/// assert_eq!(spans.port, Some(Span::new(32, 36)));
/// assert_eq!(spans.pathname, Some(Span::new(36, 49)));
/// assert_eq!(spans.search, Some(Span::new(50, 54)));
///
/// // No `://`: everything before `?` is the pathname
/// let spans = split("a(/:id)").unwrap();
/// assert_eq!(spans.pathname, Some(Span::new(0, 7)));
/// assert_eq!(spans.hostname, None);
/// ```
pub fn split(source: &str) -> Result<Spans, PatternSyntaxError> {
    let (delimiters, search_at) = scan(source)?;
    let path_end = search_at.unwrap_or(source.len());

    let mut spans = Spans {
        search: search_at.and_then(|q| Span::non_empty(q + 1, source.len())),
        ..Spans::default()
    };

    let scheme_at = delimiters
        .iter()
        .find(|&&(i, b)| b == b':' && source[i..path_end].starts_with("://"))
        .map(|&(i, _)| i);

    let Some(scheme_at) = scheme_at else {
        spans.pathname = Span::non_empty(0, path_end);
        return Ok(spans);
    };

    spans.protocol = Span::non_empty(0, scheme_at);

    let host_start = scheme_at + 3;
    let host_end = delimiters
        .iter()
        .find(|&&(i, b)| b == b'/' && i >= host_start)
        .map(|&(i, _)| i)
        .unwrap_or(path_end);

    // A trailing `:digits` is the port; `:name` is a hostname param
    let port_colon = delimiters
        .iter()
        .rev()
        .filter(|&&(i, b)| b == b':' && i >= host_start && i < host_end)
        .map(|&(i, _)| i)
        .next()
        .filter(|&c| {
            let digits = &source[c + 1..host_end];
            !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
        });

    match port_colon {
        Some(c) => {
            spans.hostname = Span::non_empty(host_start, c);
            spans.port = Span::non_empty(c + 1, host_end);
        }
        None => spans.hostname = Span::non_empty(host_start, host_end),
    }

    spans.pathname = Span::non_empty(host_end, path_end);
    Ok(spans)
}

/// Collects top-level `:` and `/` offsets up to the first top-level `?`
///
/// Returns the delimiters and the offset of that `?`, if any.
fn scan(source: &str) -> Result<(Vec<(usize, u8)>, Option<usize>), PatternSyntaxError> {
    let mut delimiters = Vec::new();
    let mut open_parens: Vec<usize> = Vec::new();
    let mut escaped = false;

    for (i, c) in source.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '(' => open_parens.push(i),
            ')' => {
                open_parens
                    .pop()
                    .ok_or(PatternSyntaxError::UnbalancedParen { offset: i })?;
            }
            '?' if open_parens.is_empty() => return Ok((delimiters, Some(i))),
            ':' | '/' if open_parens.is_empty() => delimiters.push((i, c as u8)),
            _ => {}
        }
    }

    match open_parens.pop() {
        Some(offset) => Err(PatternSyntaxError::UnbalancedParen { offset }),
        None => Ok((delimiters, None)),
    }
}
