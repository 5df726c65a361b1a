//! # RHTMX Pattern
//!
//! URL route patterns with support for:
//! - Static text (`/about`)
//! - Named params (`/users/:id`, `://:tenant.remix.run`)
//! - Wildcards (`/files/*path`, `://*.remix.run`)
//! - Optional groups, nestable (`/docs(/:page)`, `http(s)://`)
//! - Search constraints (`/search?q=&sort`)
//!
//! A pattern describes protocol, hostname, port, pathname and search at
//! once. Components left out of the source are unconstrained.
//!
//! ## Operations
//!
//! - [`RoutePattern::matches`] extracts params from a URL
//! - [`RoutePattern::href`] builds a URL from params
//! - [`RoutePattern::join`] composes a base pattern with a relative one
//! - [`ArrayMatcher`] and [`TrieMatcher`] match one URL against many patterns,
//!   ordering results by [`Specificity`]
//!
//! ## Example
//!
//! ```
//! use rhtmx_pattern::{Matcher, RoutePattern, TrieMatcher};
//!
//! let pattern = RoutePattern::parse("/blog/:year(/:slug)").unwrap();
//! let m = pattern.matches("/blog/2024/hello").unwrap();
//! assert_eq!(m.get("year"), Some("2024"));
//! assert_eq!(pattern.href_from(&[("year", "2024")]).unwrap(), "/blog/2024");
//!
//! let mut matcher = TrieMatcher::new();
//! matcher.add(pattern, "post").unwrap();
//! matcher.add_source("/blog/*rest", "fallback").unwrap();
//!
//! let best = matcher.match_url("https://example.com/blog/2024/hello").unwrap();
//! assert_eq!(*best.data, "post");
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

pub mod config;
mod error;
mod input;
pub mod matcher;
pub mod part;
mod route;
pub mod search;
pub mod specificity;
pub mod split;
pub mod variant;

pub use config::MatcherConfig;
pub use error::{MatcherError, MissingParamError, PatternSyntaxError};
pub use input::UrlInput;
pub use matcher::{ArrayMatcher, MatchResult, Matcher, TrieMatcher};
pub use route::{Match, Params, ParseOptions, RoutePattern};
pub use specificity::Specificity;
