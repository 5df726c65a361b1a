/// Backtracking matcher over a token sequence and its optionals map
///
/// Groups are tried included first and elided only when the rest of the
/// part fails; params try their longest run first. A match is therefore the
/// first success of a depth-first search in token order, which is the same
/// answer a leftmost-first regex engine gives for the equivalent regex.
///
/// Whether the rest of a match succeeds depends only on the token index and
/// input position, so failed `(token, position)` states are remembered and
/// never re-explored. That bounds a match at tokens × input² steps however
/// many wildcards the part has.
use std::collections::{BTreeMap, HashSet};

use super::token::{Token, ANONYMOUS_WILDCARD};
use crate::split::Span;

/// One param bound during a match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub value: String,
    /// Byte range of `value` in the matched input
    pub span: Span,
}

/// Result of matching one part
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartMatch {
    /// Bindings in token order; params of elided groups are absent
    pub bindings: Vec<Binding>,
    /// Token indices of every `GroupOpen` whose group was included
    pub included_groups: Vec<usize>,
}

impl PartMatch {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|b| b.name == name)
            .map(|b| b.value.as_str())
    }
}

/// Matches `input` against `tokens` in full (anchored at both ends)
///
/// `optionals` may be empty for group-free (flattened) token sequences.
pub(crate) fn match_tokens(
    tokens: &[Token],
    optionals: &BTreeMap<usize, usize>,
    input: &str,
    separator: Option<char>,
    ignore_case: bool,
) -> Option<PartMatch> {
    let mut search = Search {
        tokens,
        optionals,
        input,
        separator,
        ignore_case,
        taken: Vec::new(),
        included_groups: Vec::new(),
        failed: HashSet::new(),
    };
    if !search.step(0, 0) {
        return None;
    }

    let bindings = search
        .taken
        .iter()
        .map(|&(key, span)| Binding {
            name: key.to_string(),
            value: span.slice(input).to_string(),
            span,
        })
        .collect();
    Some(PartMatch {
        bindings,
        included_groups: search.included_groups,
    })
}

struct Search<'a> {
    tokens: &'a [Token],
    optionals: &'a BTreeMap<usize, usize>,
    input: &'a str,
    separator: Option<char>,
    ignore_case: bool,
    /// Binding keys and spans along the current path
    taken: Vec<(&'a str, Span)>,
    included_groups: Vec<usize>,
    /// `(token index, input position)` states known not to reach the end
    failed: HashSet<(usize, usize)>,
}

impl<'a> Search<'a> {
    fn step(&mut self, ti: usize, pos: usize) -> bool {
        if self.failed.contains(&(ti, pos)) {
            return false;
        }
        let matched = self.try_step(ti, pos);
        if !matched {
            self.failed.insert((ti, pos));
        }
        matched
    }

    /// Anything pushed by a failed attempt is popped before it returns
    fn try_step(&mut self, ti: usize, pos: usize) -> bool {
        let tokens = self.tokens;
        let Some(token) = tokens.get(ti) else {
            return pos == self.input.len();
        };

        match token {
            Token::Text(text) => match self.eat(pos, text) {
                Some(next) => self.step(ti + 1, next),
                None => false,
            },
            Token::Separator => {
                let matched = self
                    .separator
                    .zip(self.input[pos..].chars().next())
                    .is_some_and(|(sep, c)| sep == c);
                matched && self.step(ti + 1, pos + 1)
            }
            Token::GroupOpen => {
                let Some(&close) = self.optionals.get(&ti) else {
                    return self.step(ti + 1, pos);
                };
                let (bound, groups) = (self.taken.len(), self.included_groups.len());

                self.included_groups.push(ti);
                if self.step(ti + 1, pos) {
                    return true;
                }
                self.taken.truncate(bound);
                self.included_groups.truncate(groups);

                self.step(close + 1, pos)
            }
            Token::GroupClose => self.step(ti + 1, pos),
            Token::Param(name) => {
                let limit = self
                    .separator
                    .and_then(|sep| self.input[pos..].find(sep))
                    .map(|offset| pos + offset)
                    .unwrap_or(self.input.len());
                self.bind_longest(ti, pos, limit, name)
            }
            Token::Wildcard(_) => {
                let key = token.binding_key().unwrap_or(ANONYMOUS_WILDCARD);
                self.bind_longest(ti, pos, self.input.len(), key)
            }
        }
    }

    /// Tries every non-empty run `pos..end` with `end <= limit`, longest first
    fn bind_longest(&mut self, ti: usize, pos: usize, limit: usize, key: &'a str) -> bool {
        for end in (pos + 1..=limit).rev() {
            if !self.input.is_char_boundary(end) {
                continue;
            }
            self.taken.push((key, Span::new(pos, end)));
            if self.step(ti + 1, end) {
                return true;
            }
            self.taken.pop();
        }
        false
    }

    /// Consumes `text` at `pos`, returning the position after it
    fn eat(&self, pos: usize, text: &str) -> Option<usize> {
        let end = pos + text.len();
        let candidate = self.input.as_bytes().get(pos..end)?;
        let equal = if self.ignore_case {
            candidate.eq_ignore_ascii_case(text.as_bytes())
        } else {
            candidate == text.as_bytes()
        };
        equal.then_some(end)
    }
}
