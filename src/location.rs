//! Navigation targets and canonical URLs
//!
//! A [`Location`] is what callers hand to the router: a route name with
//! arguments, a raw path, or both. A [`Url`] is the canonical `path[?query]`
//! string produced by the route table; it is the only form written to the
//! platform history and the only form compared when matching history entries.

use crate::params::{QueryParams, RouteParams};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical URL string: `path` optionally followed by `?query`
///
/// Fragments are dropped and the path always starts with `/`.
///
/// # Example
///
/// ```
/// use gpui_stack_router::Url;
///
/// let url = Url::new("/users/42?tab=posts#top");
/// assert_eq!(url.as_str(), "/users/42?tab=posts");
/// assert_eq!(url.path(), "/users/42");
/// assert_eq!(url.query_str(), Some("tab=posts"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Url(String);

impl Url {
    /// Normalize a raw URL string
    pub fn new(raw: impl Into<String>) -> Self {
        let mut raw = raw.into();
        if let Some(hash) = raw.find('#') {
            raw.truncate(hash);
        }
        if raw.ends_with('?') {
            raw.pop();
        }
        if !raw.starts_with('/') {
            raw.insert(0, '/');
        }
        Self(raw)
    }

    /// Build from a path and a query
    pub fn from_parts(path: &str, query: &QueryParams) -> Self {
        if query.is_empty() {
            Self::new(path)
        } else {
            Self::new(format!("{}?{}", path, query.to_query_string()))
        }
    }

    /// The path part (everything before `?`)
    pub fn path(&self) -> &str {
        self.0.split_once('?').map_or(self.0.as_str(), |(path, _)| path)
    }

    /// The raw query part, if any
    pub fn query_str(&self) -> Option<&str> {
        self.0.split_once('?').map(|(_, query)| query)
    }

    /// Parsed query parameters
    pub fn query(&self) -> QueryParams {
        self.query_str()
            .map(QueryParams::from_query_string)
            .unwrap_or_default()
    }

    /// The full string form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Url {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Url {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Url {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl PartialEq<str> for Url {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Url {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A symbolic navigation target
///
/// # Example
///
/// ```
/// use gpui_stack_router::Location;
///
/// // Structural: resolved through the route table's named routes
/// let user = Location::named("user").with_arg("id", "42");
///
/// // Raw: a path with an optional query
/// let search = Location::path("/search?q=rust");
/// assert_eq!(search.path.as_deref(), Some("/search"));
/// assert_eq!(search.query.get("q"), Some("rust"));
/// # let _ = user;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Route name, resolved with `args`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Arguments substituted into the named route's pattern
    #[serde(default, skip_serializing_if = "RouteParams::is_empty")]
    pub args: RouteParams,
    /// Raw path, used when no name is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Query appended to the canonical URL
    #[serde(default, skip_serializing_if = "QueryParams::is_empty")]
    pub query: QueryParams,
}

impl Location {
    /// Structural location for a named route
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Raw location; a `?query` suffix is split into `query`
    pub fn path(path: impl Into<String>) -> Self {
        let url = Url::new(path);
        Self::from_url(&url)
    }

    /// Raw location for an already canonical URL
    pub fn from_url(url: &Url) -> Self {
        Self {
            path: Some(url.path().to_string()),
            query: url.query(),
            ..Self::default()
        }
    }

    /// Add a route argument
    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.insert(key, value);
        self
    }

    /// Append a query parameter
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key, value);
        self
    }

    /// True when the location names neither a route nor a path
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.path.is_none()
    }
}

impl From<&str> for Location {
    fn from(path: &str) -> Self {
        Self::path(path)
    }
}

impl From<String> for Location {
    fn from(path: String) -> Self {
        Self::path(path)
    }
}

impl From<&Url> for Location {
    fn from(url: &Url) -> Self {
        Self::from_url(url)
    }
}
