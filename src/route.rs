//! Route definitions and the route table contract
//!
//! [`RouteTable`] is the seam between the navigation engine and whatever knows
//! how to turn URLs into views. The engine only ever calls the three methods
//! of that trait. [`Route`] is the declarative definition consumed by the
//! bundled implementation, [`Routes`](crate::Routes).

use crate::error::RouterError;
use crate::location::{Location, Url};
use crate::matcher::{Constraint, RoutePattern};
use crate::params::{QueryParams, RouteParams};
use crate::view::{ComponentId, Props, ResolvedView};
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

// ============================================================================
// RouteTable
// ============================================================================

/// Future produced by [`RouteTable::match_url`]
pub type ResolveFuture = Pin<Box<dyn Future<Output = ResolvedView>>>;

/// Maps URLs to resolved views and locations to URLs
///
/// Implementations must be deterministic: [`link`](RouteTable::link) on the
/// location of a resolved view yields the URL that was resolved, so that the
/// history bridge can recognise neighbouring stack entries by string equality.
pub trait RouteTable {
    /// Resolve a URL to view data
    ///
    /// Never fails: unmatched URLs resolve to the not-found view.
    fn match_url(&self, url: &Url) -> ResolveFuture;

    /// Produce the canonical URL for a location
    fn link(&self, location: &Location) -> Result<Url, RouterError>;

    /// Check whether any route matches, without resolving
    fn check(&self, url: &Url) -> bool;
}

impl<T: RouteTable + ?Sized> RouteTable for Rc<T> {
    fn match_url(&self, url: &Url) -> ResolveFuture {
        (**self).match_url(url)
    }

    fn link(&self, location: &Location) -> Result<Url, RouterError> {
        (**self).link(location)
    }

    fn check(&self, url: &Url) -> bool {
        (**self).check(url)
    }
}

// ============================================================================
// Loaders
// ============================================================================

/// Input handed to a route's props loader
#[derive(Debug, Clone, PartialEq)]
pub struct LoadContext {
    /// URL being resolved
    pub url: Url,
    /// Decoded path arguments
    pub args: RouteParams,
    /// Query parameters
    pub query: QueryParams,
}

/// Future produced by a props loader
pub type PropsFuture = Pin<Box<dyn Future<Output = Props>>>;

/// Async props loader attached to a route
pub type Loader = Rc<dyn Fn(&LoadContext) -> PropsFuture>;

// ============================================================================
// Route
// ============================================================================

/// Declarative route definition
///
/// A route with children is a layout: it contributes a frame to the layout
/// chain of each child but is never matched on its own. Give it an index
/// child (`""`) to render something at the layout's own path.
///
/// # Example
///
/// ```
/// use gpui_stack_router::Route;
///
/// let routes = Route::new("/", "shell").children(vec![
///     Route::new("", "home").name("home"),
///     Route::new("users/:id", "user").name("user"),
/// ]);
/// # let _ = routes;
/// ```
#[derive(Clone)]
pub struct Route {
    pattern: String,
    component: ComponentId,
    name: Option<String>,
    loader: Option<Loader>,
    children: Vec<Route>,
}

impl Route {
    /// Create a route rendering `component` at `pattern`
    pub fn new(pattern: impl Into<String>, component: impl Into<ComponentId>) -> Self {
        Self {
            pattern: pattern.into(),
            component: component.into(),
            name: None,
            loader: None,
            children: Vec::new(),
        }
    }

    /// Set route name, used by structural locations
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach an async props loader
    ///
    /// # Example
    ///
    /// ```
    /// use gpui_stack_router::{Props, Route};
    ///
    /// let route = Route::new("/users/:id", "user").loader(|ctx| {
    ///     let id = ctx.args.get("id").cloned().unwrap_or_default();
    ///     async move {
    ///         let mut props = Props::new();
    ///         props.insert("id".into(), id.into());
    ///         props
    ///     }
    /// });
    /// # let _ = route;
    /// ```
    pub fn loader<F, Fut>(mut self, loader: F) -> Self
    where
        F: Fn(&LoadContext) -> Fut + 'static,
        Fut: Future<Output = Props> + 'static,
    {
        self.loader = Some(Rc::new(move |ctx: &LoadContext| {
            Box::pin(loader(ctx)) as PropsFuture
        }));
        self
    }

    /// Add child routes
    pub fn children(mut self, children: Vec<Route>) -> Self {
        self.children.extend(children);
        self
    }

    /// Add a single child route
    pub fn child(mut self, child: Route) -> Self {
        self.children.push(child);
        self
    }

    /// Pattern as declared (relative for children)
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Component rendered by this route
    pub fn component(&self) -> &ComponentId {
        &self.component
    }

    /// Route name
    pub fn route_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn props_loader(&self) -> Option<&Loader> {
        self.loader.as_ref()
    }

    /// Child routes
    pub fn get_children(&self) -> &[Route] {
        &self.children
    }

    /// Check if this route is a layout (has children)
    pub fn is_layout(&self) -> bool {
        !self.children.is_empty()
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern)
            .field("component", &self.component)
            .field("name", &self.name)
            .field("loader", &self.loader.is_some())
            .field("children", &self.children.len())
            .finish()
    }
}

// ============================================================================
// NamedRouteRegistry
// ============================================================================

/// Registry for named routes
#[derive(Clone, Debug, Default)]
pub struct NamedRouteRegistry {
    /// Map of route names to full patterns
    routes: HashMap<String, RoutePattern>,
}

impl NamedRouteRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named route
    pub fn register(&mut self, name: impl Into<String>, pattern: &str) {
        self.routes
            .insert(name.into(), RoutePattern::from_path(pattern));
    }

    /// Check if a route name exists
    pub fn contains(&self, name: &str) -> bool {
        self.routes.contains_key(name)
    }

    /// Generate the URL path for a named route
    ///
    /// # Example
    ///
    /// ```
    /// use gpui_stack_router::{NamedRouteRegistry, RouteParams};
    ///
    /// let mut registry = NamedRouteRegistry::new();
    /// registry.register("user.detail", "/users/:id");
    ///
    /// let params = RouteParams::new().with("id", "123");
    /// let url = registry.url_for("user.detail", &params).unwrap();
    /// assert_eq!(url, "/users/123");
    /// ```
    pub fn url_for(&self, name: &str, params: &RouteParams) -> Result<String, RouterError> {
        let pattern = self
            .routes
            .get(name)
            .ok_or_else(|| RouterError::UnknownRoute {
                name: name.to_string(),
            })?;

        pattern
            .link(params)
            .map_err(|argument| RouterError::MissingArgument {
                route: name.to_string(),
                argument,
            })
    }

    /// Get number of registered routes
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

// ============================================================================
// Path helpers
// ============================================================================

/// Validate a route path pattern
///
/// # Validation Rules
///
/// - Path can be empty (for index routes)
/// - No consecutive slashes (`//`)
/// - Parameter names must be non-empty, alphanumeric or `_`
/// - No duplicate parameter names
/// - Constraints must be `\d+` or `uuid`
pub fn validate_route_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Ok(());
    }

    if path.contains("//") {
        return Err("Route path cannot contain consecutive slashes".to_string());
    }

    let mut param_names = HashSet::new();
    for segment in path.split('/') {
        let Some(param) = segment.strip_prefix(':') else {
            continue;
        };

        let (param_name, constraint) = match param.split_once('<') {
            Some((name, rest)) => (name, Some(rest)),
            None => (param, None),
        };

        if param_name.is_empty() {
            return Err("Route parameter name cannot be empty".to_string());
        }

        if !param_name.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(format!(
                "Route parameter '{}' must contain only alphanumeric characters and underscores",
                param_name
            ));
        }

        if let Some(constraint) = constraint {
            let inner = constraint.strip_suffix('>').ok_or_else(|| {
                format!("Unterminated constraint on parameter '{}'", param_name)
            })?;
            if Constraint::parse(inner).is_none() {
                return Err(format!("Unknown constraint '<{}>'", inner));
            }
        }

        if !param_names.insert(param_name.to_string()) {
            return Err(format!("Duplicate route parameter: '{}'", param_name));
        }
    }

    Ok(())
}

/// Join a child pattern onto its parent's full pattern
///
/// # Examples
///
/// ```
/// use gpui_stack_router::build_child_path;
///
/// assert_eq!(build_child_path("/", "users"), "/users");
/// assert_eq!(build_child_path("/dashboard", "settings"), "/dashboard/settings");
/// assert_eq!(build_child_path("/dashboard", ""), "/dashboard");
/// ```
pub fn build_child_path<'a>(parent_path: &'a str, child_path: &'a str) -> Cow<'a, str> {
    let parent = parent_path.trim_end_matches('/');
    let child = child_path.trim_start_matches('/').trim_end_matches('/');

    if child.is_empty() {
        if parent.is_empty() {
            Cow::Borrowed("/")
        } else if parent == parent_path {
            Cow::Borrowed(parent_path)
        } else {
            Cow::Owned(parent.to_string())
        }
    } else if parent.is_empty() {
        Cow::Owned(format!("/{}", child))
    } else {
        Cow::Owned(format!("{}/{}", parent, child))
    }
}
