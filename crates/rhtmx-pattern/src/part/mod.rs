/// Part module: the text/param/wildcard/group sub-grammar
///
/// Shared by protocol, hostname and pathname parsing. A part is a flat
/// token list plus a map of optional groups; the separator character comes
/// from the part's [`PartKind`].
use std::collections::{BTreeMap, HashSet};
use std::fmt;

pub mod matcher;
pub(crate) mod parser;
pub mod token;

pub use matcher::{Binding, PartMatch};
pub use token::{PartKind, Token, ANONYMOUS_WILDCARD};

use crate::PatternSyntaxError;
use token::is_ident_continue;

/// A parsed hostname-like or pathname-like part
///
/// Invariants: every `GroupOpen`/`GroupClose` pair appears in `optionals`,
/// groups are properly nested, and no param name repeats.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartPattern {
    tokens: Vec<Token>,
    optionals: BTreeMap<usize, usize>,
    kind: PartKind,
    ignore_case: bool,
}

impl PartPattern {
    /// Parses a part source
    ///
    /// Error offsets are relative to `source`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rhtmx_pattern::part::{PartKind, PartPattern};
    ///
    /// let part = PartPattern::parse("products/:id(/edit)", PartKind::Pathname, false).unwrap();
    /// assert_eq!(part.param_names().collect::<Vec<_>>(), vec!["id"]);
    /// assert_eq!(part.to_string(), "products/:id(/edit)");
    ///
    /// assert!(PartPattern::parse(":id/:id", PartKind::Pathname, false).is_err());
    /// ```
    pub fn parse(source: &str, kind: PartKind, ignore_case: bool) -> Result<Self, PatternSyntaxError> {
        Self::parse_with_offsets(source, kind, ignore_case).map(|(part, _)| part)
    }

    /// Like [`parse`](Self::parse), also returning each token's start offset
    pub(crate) fn parse_with_offsets(
        source: &str,
        kind: PartKind,
        ignore_case: bool,
    ) -> Result<(Self, Vec<usize>), PatternSyntaxError> {
        let tokenized = parser::tokenize(source, kind)?;

        let mut seen = HashSet::new();
        for (token, &offset) in tokenized.tokens.iter().zip(&tokenized.offsets) {
            if let Some(name) = token.param_name() {
                if !seen.insert(name) {
                    return Err(PatternSyntaxError::DuplicateParam {
                        name: name.to_string(),
                        offset,
                    });
                }
            }
        }

        let part = Self {
            tokens: tokenized.tokens,
            optionals: tokenized.optionals,
            kind,
            ignore_case,
        };
        Ok((part, tokenized.offsets))
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// GroupOpen index → GroupClose index
    pub fn optionals(&self) -> &BTreeMap<usize, usize> {
        &self.optionals
    }

    pub fn kind(&self) -> PartKind {
        self.kind
    }

    pub fn ignore_case(&self) -> bool {
        self.ignore_case
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Names of all named params and named wildcards, in token order
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(Token::param_name)
    }

    /// Matches the whole of `input` against this part
    ///
    /// # Examples
    ///
    /// ```
    /// use rhtmx_pattern::part::{PartKind, PartPattern};
    ///
    /// let host = PartPattern::parse("(:tenant.)remix.run", PartKind::Hostname, true).unwrap();
    /// assert_eq!(host.matches("acme.remix.run").unwrap().get("tenant"), Some("acme"));
    /// assert_eq!(host.matches("remix.run").unwrap().get("tenant"), None);
    /// assert!(host.matches("a.b.remix.run").is_none());
    /// ```
    pub fn matches(&self, input: &str) -> Option<PartMatch> {
        matcher::match_tokens(
            &self.tokens,
            &self.optionals,
            input,
            self.kind.separator(),
            self.ignore_case,
        )
    }

    /// Token sequence with excluded groups removed and group markers dropped
    ///
    /// `included` lists the `GroupOpen` indices to keep, as reported by
    /// [`PartMatch::included_groups`].
    pub fn flatten(&self, included: &[usize]) -> Vec<Token> {
        let mut flat = Vec::with_capacity(self.tokens.len());
        let mut i = 0;
        while i < self.tokens.len() {
            match &self.tokens[i] {
                Token::GroupOpen if !included.contains(&i) => {
                    i = self.optionals.get(&i).map_or(i + 1, |close| close + 1);
                    continue;
                }
                Token::GroupOpen | Token::GroupClose => {}
                token => push_merged(&mut flat, token),
            }
            i += 1;
        }
        flat
    }

    /// All group-free expansions of this part, include-first, de-duplicated
    pub fn variants(&self) -> Vec<Vec<Token>> {
        crate::variant::expand(self)
    }

    /// Upper bound on `variants().len()`, computed without expanding
    pub fn variant_count(&self) -> usize {
        crate::variant::count_part(self)
    }
}

impl fmt::Display for PartPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serialize(&self.tokens, self.kind))
    }
}

/// Serializes tokens back to pattern syntax
///
/// Special characters inside text are escaped so that parsing the output
/// yields the same tokens.
pub(crate) fn serialize(tokens: &[Token], kind: PartKind) -> String {
    let separator = kind.separator();
    let mut out = String::new();
    let mut after_param = false;

    for token in tokens {
        match token {
            Token::Text(text) => {
                for (i, c) in text.chars().enumerate() {
                    let glued_to_param = i == 0 && after_param && is_ident_continue(c);
                    if glued_to_param || needs_escape(c, separator) {
                        out.push('\\');
                    }
                    out.push(c);
                }
            }
            Token::Separator => {
                if let Some(sep) = separator {
                    out.push(sep);
                }
            }
            Token::Param(name) => {
                out.push(':');
                out.push_str(name);
            }
            Token::Wildcard(name) => {
                out.push('*');
                if let Some(name) = name {
                    out.push_str(name);
                }
            }
            Token::GroupOpen => out.push('('),
            Token::GroupClose => out.push(')'),
        }
        after_param = token.is_param();
    }

    out
}

/// Appends a group-free token, merging adjacent text runs
pub(crate) fn push_merged(flat: &mut Vec<Token>, token: &Token) {
    if let (Some(Token::Text(last)), Token::Text(text)) = (flat.last_mut(), token) {
        last.push_str(text);
    } else {
        flat.push(token.clone());
    }
}

fn needs_escape(c: char, separator: Option<char>) -> bool {
    matches!(c, '\\' | '(' | ')' | ':' | '*' | '?' | '/') || Some(c) == separator
}
