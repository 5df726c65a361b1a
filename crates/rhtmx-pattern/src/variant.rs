/// Optional-group expansion
///
/// A trie edge cannot express "this run may be absent", so every pattern is
/// expanded into its group-free variants before insertion. A part with `k`
/// independent groups yields up to `2^k` variants; nested groups only
/// contribute when their parent is included.
use std::collections::{BTreeMap, HashSet};

use crate::part::{push_merged, PartPattern, Token};
use crate::RoutePattern;

/// One group-free expansion of a [`RoutePattern`]
///
/// `None` components are unconstrained, exactly as on the pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variant {
    pub protocol: Option<Vec<Token>>,
    pub hostname: Option<Vec<Token>>,
    pub port: Option<String>,
    pub pathname: Option<Vec<Token>>,
}

/// Shape of a protocol or hostname variant, used to bucket trie roots
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VariantPart {
    /// Unconstrained
    Any,
    /// Text and separators only, rendered to the literal it must equal
    Static(String),
    /// Contains params; matched with the part grammar
    Dynamic(Vec<Token>),
}

impl VariantPart {
    pub(crate) fn from_tokens(tokens: Option<&[Token]>, separator: Option<char>) -> Self {
        let Some(tokens) = tokens else {
            return VariantPart::Any;
        };
        let mut literal = String::new();
        for token in tokens {
            match (token, separator) {
                (Token::Text(text), _) => literal.push_str(text),
                (Token::Separator, Some(sep)) => literal.push(sep),
                _ => return VariantPart::Dynamic(tokens.to_vec()),
            }
        }
        VariantPart::Static(literal.to_ascii_lowercase())
    }
}

impl Variant {
    pub fn protocol_shape(&self) -> VariantPart {
        VariantPart::from_tokens(self.protocol.as_deref(), None)
    }

    pub fn hostname_shape(&self) -> VariantPart {
        VariantPart::from_tokens(self.hostname.as_deref(), Some('.'))
    }
}

/// Expands every optional group of a pattern
///
/// Variants are ordered include-first and de-duplicated, keeping the first
/// occurrence.
///
/// # Examples
///
/// ```
/// use rhtmx_pattern::{variant, RoutePattern};
///
/// let pattern = RoutePattern::parse("http(s)://remix.run/docs(/:page)").unwrap();
/// let variants = variant::generate(&pattern);
/// assert_eq!(variants.len(), 4);
/// assert_eq!(variants[0].protocol_shape(), variant::VariantPart::Static("https".into()));
/// ```
pub fn generate(pattern: &RoutePattern) -> Vec<Variant> {
    let expand_part = |part: Option<&PartPattern>| -> Vec<Option<Vec<Token>>> {
        match part {
            Some(part) => expand(part).into_iter().map(Some).collect(),
            None => vec![None],
        }
    };

    let protocols = expand_part(pattern.protocol());
    let hostnames = expand_part(pattern.hostname());
    let pathnames = expand_part(pattern.pathname());

    let mut variants = Vec::with_capacity(protocols.len() * hostnames.len() * pathnames.len());
    for protocol in &protocols {
        for hostname in &hostnames {
            for pathname in &pathnames {
                variants.push(Variant {
                    protocol: protocol.clone(),
                    hostname: hostname.clone(),
                    port: pattern.port().map(str::to_string),
                    pathname: pathname.clone(),
                });
            }
        }
    }
    variants
}

/// Upper bound on `generate(pattern).len()`, computed without expanding
pub fn count(pattern: &RoutePattern) -> usize {
    [pattern.protocol(), pattern.hostname(), pattern.pathname()]
        .into_iter()
        .flatten()
        .map(PartPattern::variant_count)
        .fold(1usize, usize::saturating_mul)
}

pub(crate) fn expand(part: &PartPattern) -> Vec<Vec<Token>> {
    let expanded = expand_range(part.tokens(), part.optionals(), 0, part.tokens().len());
    let mut seen = HashSet::new();
    expanded
        .into_iter()
        .filter(|variant| seen.insert(variant.clone()))
        .collect()
}

pub(crate) fn count_part(part: &PartPattern) -> usize {
    count_range(part.tokens(), part.optionals(), 0, part.tokens().len())
}

fn expand_range(
    tokens: &[Token],
    optionals: &BTreeMap<usize, usize>,
    start: usize,
    end: usize,
) -> Vec<Vec<Token>> {
    let mut prefixes: Vec<Vec<Token>> = vec![Vec::new()];
    let mut i = start;

    while i < end {
        match &tokens[i] {
            Token::GroupOpen => {
                let close = optionals.get(&i).copied().unwrap_or(i);
                let inner = expand_range(tokens, optionals, i + 1, close);
                prefixes = prefixes
                    .into_iter()
                    .flat_map(|prefix| {
                        let included = inner.iter().map({
                            let prefix = prefix.clone();
                            move |suffix| {
                                let mut variant = prefix.clone();
                                suffix.iter().for_each(|t| push_merged(&mut variant, t));
                                variant
                            }
                        });
                        included.chain(std::iter::once(prefix)).collect::<Vec<_>>()
                    })
                    .collect();
                i = close + 1;
            }
            Token::GroupClose => i += 1,
            token => {
                prefixes.iter_mut().for_each(|prefix| push_merged(prefix, token));
                i += 1;
            }
        }
    }

    prefixes
}

fn count_range(tokens: &[Token], optionals: &BTreeMap<usize, usize>, start: usize, end: usize) -> usize {
    let mut total = 1usize;
    let mut i = start;
    while i < end {
        match (&tokens[i], optionals.get(&i)) {
            (Token::GroupOpen, Some(&close)) => {
                let inner = count_range(tokens, optionals, i + 1, close);
                total = total.saturating_mul(inner.saturating_add(1));
                i = close + 1;
            }
            _ => i += 1,
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::part::PartKind;
    use pretty_assertions::assert_eq;

    fn pathname(source: &str) -> PartPattern {
        PartPattern::parse(source, PartKind::Pathname, false).unwrap()
    }

    fn rendered(source: &str) -> Vec<String> {
        pathname(source)
            .variants()
            .iter()
            .map(|tokens| crate::part::serialize(tokens, PartKind::Pathname))
            .collect()
    }

    #[test]
    fn test_no_groups() {
        assert_eq!(rendered("a/:b"), vec!["a/:b"]);
    }

    #[test]
    fn test_single_group_include_first() {
        assert_eq!(rendered("a(/:id)"), vec!["a/:id", "a"]);
    }

    #[test]
    fn test_independent_groups() {
        assert_eq!(rendered("(a)(b)"), vec!["ab", "a", "b", ""]);
        assert_eq!(pathname("(a)(b)").variant_count(), 4);
    }

    #[test]
    fn test_nested_groups_require_parent() {
        assert_eq!(rendered("a(/b(/c))"), vec!["a/b/c", "a/b", "a"]);
        assert_eq!(pathname("a(/b(/c))").variant_count(), 3);
    }

    #[test]
    fn test_duplicates_removed() {
        assert_eq!(rendered("a()"), vec!["a"]);
        assert_eq!(rendered("(x)(x)"), vec!["xx", "x", ""]);
        assert_eq!(pathname("(x)(x)").variant_count(), 4);
    }

    #[test]
    fn test_adjacent_text_is_merged() {
        assert_eq!(
            pathname("a(b)c").variants()[0],
            vec![Token::Text("abc".to_string())]
        );
    }

    #[test]
    fn test_generate_cross_product() {
        let pattern = RoutePattern::parse("http(s)://(www.)example.com:8080/a(/b)").unwrap();
        let variants = generate(&pattern);
        assert_eq!(variants.len(), 8);
        assert_eq!(count(&pattern), 8);
        assert!(variants.iter().all(|v| v.port.as_deref() == Some("8080")));
        assert_eq!(
            variants[0].hostname_shape(),
            VariantPart::Static("www.example.com".to_string())
        );
    }

    #[test]
    fn test_shapes() {
        let pattern = RoutePattern::parse("://:tenant.example.com/").unwrap();
        let variant = &generate(&pattern)[0];
        assert_eq!(variant.protocol_shape(), VariantPart::Any);
        assert!(matches!(variant.hostname_shape(), VariantPart::Dynamic(_)));
    }
}
