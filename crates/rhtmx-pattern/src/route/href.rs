/// URL generation from a pattern and param values
use std::collections::BTreeMap;

use super::{Params, RoutePattern};
use crate::part::{PartPattern, Token, ANONYMOUS_WILDCARD};
use crate::MissingParamError;

impl RoutePattern {
    /// Generates a concrete URL by substituting params
    ///
    /// A group is emitted when it declares no params or when any param inside
    /// it was supplied; an emitted group needs all of its own params. Groups
    /// with nothing supplied are left out. Unknown params are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use rhtmx_pattern::{Params, RoutePattern};
    ///
    /// let pattern = RoutePattern::parse("a(/:id)").unwrap();
    /// assert_eq!(pattern.href(&Params::new()).unwrap(), "a");
    ///
    /// let params = Params::from([("id".to_string(), "5".to_string())]);
    /// assert_eq!(pattern.href(&params).unwrap(), "a/5");
    ///
    /// let pattern = RoutePattern::parse("://:tenant.remix.run/users/:id").unwrap();
    /// let err = pattern.href(&params).unwrap_err();
    /// assert_eq!(err.name, "tenant");
    /// ```
    pub fn href(&self, params: &Params) -> Result<String, MissingParamError> {
        let pathname = self
            .pathname
            .as_ref()
            .map(|part| render(part, params))
            .transpose()?;

        let mut href = match &self.hostname {
            Some(hostname) => {
                let scheme = match &self.protocol {
                    Some(protocol) => render(protocol, params)?,
                    None => "https".to_string(),
                };
                let mut origin = format!("{scheme}://{}", render(hostname, params)?);
                if let Some(port) = &self.port {
                    origin.push(':');
                    origin.push_str(port);
                }
                format!("{origin}/{}", pathname.unwrap_or_default())
            }
            None => match pathname {
                Some(path) if self.rooted => format!("/{path}"),
                Some(path) => path,
                None => "/".to_string(),
            },
        };

        if !self.search.is_empty() {
            href.push('?');
            href.push_str(&self.search.to_string());
        }
        Ok(href)
    }

    /// Convenience form of [`href`](Self::href) taking borrowed pairs
    ///
    /// # Examples
    ///
    /// ```
    /// use rhtmx_pattern::RoutePattern;
    ///
    /// let pattern = RoutePattern::parse("/files/*path").unwrap();
    /// assert_eq!(pattern.href_from(&[("path", "a/b.txt")]).unwrap(), "/files/a/b.txt");
    /// ```
    pub fn href_from(&self, params: &[(&str, &str)]) -> Result<String, MissingParamError> {
        let params: Params = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.href(&params)
    }
}

fn render(part: &PartPattern, params: &Params) -> Result<String, MissingParamError> {
    let mut out = String::new();
    let separator = part.kind().separator();
    render_range(
        part.tokens(),
        part.optionals(),
        0..part.tokens().len(),
        separator,
        params,
        &mut out,
    )?;
    Ok(out)
}

fn render_range(
    tokens: &[Token],
    optionals: &BTreeMap<usize, usize>,
    range: std::ops::Range<usize>,
    separator: Option<char>,
    params: &Params,
    out: &mut String,
) -> Result<(), MissingParamError> {
    let mut i = range.start;
    while i < range.end {
        match &tokens[i] {
            Token::Text(text) => out.push_str(text),
            Token::Separator => out.extend(separator),
            token @ (Token::Param(_) | Token::Wildcard(_)) => {
                let key = token.binding_key().unwrap_or(ANONYMOUS_WILDCARD);
                let value = params.get(key).ok_or_else(|| MissingParamError::new(key))?;
                out.push_str(value);
            }
            Token::GroupOpen => {
                let close = optionals.get(&i).copied().unwrap_or(i);
                if group_emitted(&tokens[i + 1..close], params) {
                    render_range(tokens, optionals, i + 1..close, separator, params, out)?;
                }
                i = close + 1;
                continue;
            }
            Token::GroupClose => {}
        }
        i += 1;
    }
    Ok(())
}

/// A group is emitted if it binds nothing or if any param inside it was given
fn group_emitted(inner: &[Token], params: &Params) -> bool {
    let mut keys = inner.iter().filter_map(Token::binding_key).peekable();
    keys.peek().is_none() || keys.any(|key| params.contains_key(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn href(source: &str, params: &[(&str, &str)]) -> Result<String, MissingParamError> {
        RoutePattern::parse(source).unwrap().href_from(params)
    }

    #[test]
    fn test_pathname_only() {
        assert_eq!(href("/users/:id", &[("id", "7")]).unwrap(), "/users/7");
        assert_eq!(href("users/:id", &[("id", "7")]).unwrap(), "users/7");
        assert_eq!(href("/", &[]).unwrap(), "/");
        assert_eq!(href("", &[]).unwrap(), "/");
    }

    #[test]
    fn test_missing_required_param() {
        assert_eq!(href("/users/:id", &[]), Err(MissingParamError::new("id")));
    }

    #[test]
    fn test_extra_params_ignored() {
        assert_eq!(href("/a", &[("unused", "1")]).unwrap(), "/a");
    }

    #[test]
    fn test_group_without_params_is_emitted() {
        assert_eq!(href("/docs(/index)", &[]).unwrap(), "/docs/index");
    }

    #[test]
    fn test_partial_group_is_an_error() {
        assert_eq!(
            href("/a(/:x/:y)", &[("x", "1")]),
            Err(MissingParamError::new("y"))
        );
        assert_eq!(href("/a(/:x/:y)", &[("x", "1"), ("y", "2")]).unwrap(), "/a/1/2");
    }

    #[test]
    fn test_nested_groups() {
        let source = "/a(/:b(/:c))";
        assert_eq!(href(source, &[]).unwrap(), "/a");
        assert_eq!(href(source, &[("b", "1")]).unwrap(), "/a/1");
        assert_eq!(href(source, &[("b", "1"), ("c", "2")]).unwrap(), "/a/1/2");
        // A nested param pulls in its parent, whose own param is then required
        assert_eq!(href(source, &[("c", "2")]), Err(MissingParamError::new("b")));
    }

    #[test]
    fn test_anonymous_wildcard_key() {
        assert_eq!(href("/assets/*", &[("*", "css/app.css")]).unwrap(), "/assets/css/app.css");
        assert_eq!(href("/assets/*", &[]), Err(MissingParamError::new("*")));
    }

    #[test]
    fn test_anonymous_wildcard_round_trip() {
        let pattern = RoutePattern::parse("/assets/*").unwrap();
        let matched = pattern.matches("/assets/x/y").unwrap();
        assert_eq!(pattern.href(&matched.params).unwrap(), "/assets/x/y");
    }

    #[test]
    fn test_full_url() {
        assert_eq!(
            href("://:tenant.remix.run/users/:id", &[("tenant", "acme"), ("id", "1")]).unwrap(),
            "https://acme.remix.run/users/1"
        );
        assert_eq!(href("http(s)://remix.run:8080", &[]).unwrap(), "https://remix.run:8080/");
        assert_eq!(href("http://remix.run/a", &[]).unwrap(), "http://remix.run/a");
    }

    #[test]
    fn test_search_is_serialized() {
        assert_eq!(href("/search?q=&sort", &[]).unwrap(), "/search?q=&sort");
        assert_eq!(href("/search?lang=en", &[]).unwrap(), "/search?lang=en");
    }
}
