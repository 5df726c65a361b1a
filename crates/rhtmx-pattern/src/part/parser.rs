/// Tokenizer for hostname-like and pathname-like parts
///
/// Single left-to-right pass over the part source. All mutation is local to
/// the `ParseState` accumulator.
use std::collections::BTreeMap;
use std::iter::Peekable;
use std::str::CharIndices;

use super::token::{is_ident_continue, is_ident_start, PartKind, Token};
use crate::PatternSyntaxError;

/// Output of tokenizing one part
#[derive(Debug, Default)]
pub(crate) struct Tokenized {
    pub tokens: Vec<Token>,
    /// Byte offset (part-relative) where each token starts
    pub offsets: Vec<usize>,
    /// GroupOpen index → GroupClose index
    pub optionals: BTreeMap<usize, usize>,
}

/// Internal accumulator for the tokenizer
#[derive(Default)]
struct ParseState {
    out: Tokenized,
    text: String,
    text_start: usize,
    /// Token index and offset of every unclosed `(`
    open_groups: Vec<(usize, usize)>,
}

impl ParseState {
    /// Appends a literal character to the pending text run
    fn with_text_char(&mut self, offset: usize, c: char) {
        if self.text.is_empty() {
            self.text_start = offset;
        }
        self.text.push(c);
    }

    /// Emits the pending text run as one `Text` token
    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            let text = std::mem::take(&mut self.text);
            self.out.tokens.push(Token::Text(text));
            self.out.offsets.push(self.text_start);
        }
    }

    fn with_token(&mut self, offset: usize, token: Token) {
        self.flush_text();
        self.out.tokens.push(token);
        self.out.offsets.push(offset);
    }

    fn open_group(&mut self, offset: usize) {
        self.flush_text();
        self.open_groups.push((self.out.tokens.len(), offset));
        self.with_token(offset, Token::GroupOpen);
    }

    fn close_group(&mut self, offset: usize) -> Result<(), PatternSyntaxError> {
        self.flush_text();
        let (open_index, _) = self
            .open_groups
            .pop()
            .ok_or(PatternSyntaxError::UnbalancedParen { offset })?;
        self.out.optionals.insert(open_index, self.out.tokens.len());
        self.with_token(offset, Token::GroupClose);
        Ok(())
    }

    fn finalize(mut self) -> Result<Tokenized, PatternSyntaxError> {
        self.flush_text();
        match self.open_groups.pop() {
            Some((_, offset)) => Err(PatternSyntaxError::UnbalancedParen { offset }),
            None => Ok(self.out),
        }
    }
}

/// Consumes the longest identifier at the iterator's position
fn take_ident(chars: &mut Peekable<CharIndices<'_>>) -> String {
    let mut name = String::new();
    while let Some(&(_, c)) = chars.peek() {
        let accepted = if name.is_empty() {
            is_ident_start(c)
        } else {
            is_ident_continue(c)
        };
        if !accepted {
            break;
        }
        name.push(c);
        chars.next();
    }
    name
}

/// Tokenizes a part source
///
/// # Rules (evaluated per character)
///
/// 1. `\x` → literal `x`
/// 2. `(` / `)` → group markers, recorded in the optionals map
/// 3. `:ident` → named param (identifier required)
/// 4. `*` / `*ident` → wildcard
/// 5. the kind's separator → `Separator`
/// 6. anything else → accumulated into `Text`
pub(crate) fn tokenize(source: &str, kind: PartKind) -> Result<Tokenized, PatternSyntaxError> {
    let separator = kind.separator();
    let mut state = ParseState::default();
    let mut chars = source.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                let (_, escaped) = chars
                    .next()
                    .ok_or(PatternSyntaxError::TrailingEscape { offset: i })?;
                state.with_text_char(i, escaped);
            }
            '(' => state.open_group(i),
            ')' => state.close_group(i)?,
            ':' => {
                let name = take_ident(&mut chars);
                if name.is_empty() {
                    return Err(PatternSyntaxError::InvalidParamName { offset: i });
                }
                state.with_token(i, Token::Param(name));
            }
            '*' => {
                let name = take_ident(&mut chars);
                let name = (!name.is_empty()).then_some(name);
                state.with_token(i, Token::Wildcard(name));
            }
            c if Some(c) == separator => state.with_token(i, Token::Separator),
            c => state.with_text_char(i, c),
        }
    }

    state.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> Token {
        Token::Text(s.to_string())
    }

    #[test]
    fn test_tokenize_pathname() {
        let out = tokenize("users/:id/*rest", PartKind::Pathname).unwrap();
        assert_eq!(
            out.tokens,
            vec![
                text("users"),
                Token::Separator,
                Token::Param("id".to_string()),
                Token::Separator,
                Token::Wildcard(Some("rest".to_string())),
            ]
        );
        assert_eq!(out.offsets, vec![0, 5, 6, 9, 10]);
        assert!(out.optionals.is_empty());
    }

    #[test]
    fn test_tokenize_hostname_separator() {
        let out = tokenize("(*.:tenant.)remix.run", PartKind::Hostname).unwrap();
        assert_eq!(
            out.tokens,
            vec![
                Token::GroupOpen,
                Token::Wildcard(None),
                Token::Separator,
                Token::Param("tenant".to_string()),
                Token::Separator,
                Token::GroupClose,
                text("remix"),
                Token::Separator,
                text("run"),
            ]
        );
        assert_eq!(out.optionals.get(&0), Some(&5));
    }

    #[test]
    fn test_tokenize_dot_is_text_in_pathname() {
        let out = tokenize(":id.json", PartKind::Pathname).unwrap();
        assert_eq!(out.tokens, vec![Token::Param("id".to_string()), text(".json")]);
    }

    #[test]
    fn test_tokenize_nested_groups() {
        let out = tokenize("a(/b(/c))", PartKind::Pathname).unwrap();
        assert_eq!(out.optionals.get(&1), Some(&8));
        assert_eq!(out.optionals.get(&4), Some(&7));
    }

    #[test]
    fn test_tokenize_escapes() {
        let out = tokenize(r"a\:b\(c\/d", PartKind::Pathname).unwrap();
        assert_eq!(out.tokens, vec![text("a:b(c/d")]);
    }

    #[test]
    fn test_tokenize_errors() {
        assert_eq!(
            tokenize("a/:/b", PartKind::Pathname).unwrap_err(),
            PatternSyntaxError::InvalidParamName { offset: 2 }
        );
        assert_eq!(
            tokenize(":1st", PartKind::Pathname).unwrap_err(),
            PatternSyntaxError::InvalidParamName { offset: 0 }
        );
        assert_eq!(
            tokenize("a)", PartKind::Pathname).unwrap_err(),
            PatternSyntaxError::UnbalancedParen { offset: 1 }
        );
        assert_eq!(
            tokenize("(a(b)", PartKind::Pathname).unwrap_err(),
            PatternSyntaxError::UnbalancedParen { offset: 0 }
        );
        assert_eq!(
            tokenize(r"a\", PartKind::Pathname).unwrap_err(),
            PatternSyntaxError::TrailingEscape { offset: 1 }
        );
    }
}
