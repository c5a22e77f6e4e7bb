//! Declarative route table
//!
//! [`Routes`] flattens a tree of [`Route`] definitions into matchable leaves.
//! Each leaf remembers the chain of routes from the root down to itself, so a
//! match yields one [`LayoutFrame`] per route on that path, outermost first.

#[cfg(feature = "cache")]
use crate::cache::{CacheStats, MatchCache};
use crate::error::RouterError;
use crate::location::{Location, Url};
use crate::matcher::RoutePattern;
use crate::params::{decode_component, encode_component, RouteParams};
use crate::route::{
    build_child_path, validate_route_path, LoadContext, Loader, NamedRouteRegistry,
    ResolveFuture, Route, RouteTable,
};
use crate::view::{ComponentId, LayoutFrame, Props, ResolvedView};
use crate::{debug_log, trace_log};
#[cfg(feature = "cache")]
use std::cell::RefCell;

/// Component used for unmatched URLs unless overridden
pub const DEFAULT_NOT_FOUND: &str = "not-found";

/// One frame definition on a leaf's root-to-leaf path
#[derive(Clone)]
struct FrameDef {
    segment: String,
    component: ComponentId,
    loader: Option<Loader>,
}

/// A matchable route with its full pattern and layout chain
struct Leaf {
    pattern: RoutePattern,
    full_path: String,
    name: Option<String>,
    frames: Vec<FrameDef>,
}

/// Route table built from [`Route`] definitions
///
/// # Example
///
/// ```
/// use gpui_stack_router::{Location, Route, RouteTable, Routes, Url};
///
/// let routes = Routes::new(vec![Route::new("/", "shell").children(vec![
///     Route::new("", "home").name("home"),
///     Route::new("users/:id", "user").name("user"),
/// ])])
/// .unwrap();
///
/// let url = routes.link(&Location::named("user").with_arg("id", "7")).unwrap();
/// assert_eq!(url, "/users/7");
/// assert!(routes.check(&url));
/// assert!(!routes.check(&Url::new("/missing")));
/// ```
pub struct Routes {
    leaves: Vec<Leaf>,
    names: NamedRouteRegistry,
    not_found: ComponentId,
    #[cfg(feature = "cache")]
    cache: RefCell<MatchCache>,
}

impl Routes {
    /// Build a table from top-level routes
    ///
    /// Fails with [`RouterError::InvalidPattern`] when a pattern does not
    /// validate, including a name registered twice.
    pub fn new(routes: Vec<Route>) -> Result<Self, RouterError> {
        let mut leaves = Vec::new();
        let mut names = NamedRouteRegistry::new();

        for route in &routes {
            collect_leaves(route, "", &[], &mut leaves, &mut names)?;
        }

        // Stable sort keeps declaration order among equal priorities
        leaves.sort_by(|a, b| b.pattern.priority.cmp(&a.pattern.priority));

        debug_log!(
            "Route table built: {} leaves, {} named routes",
            leaves.len(),
            names.len()
        );

        Ok(Self {
            leaves,
            names,
            not_found: ComponentId::new(DEFAULT_NOT_FOUND),
            #[cfg(feature = "cache")]
            cache: RefCell::new(MatchCache::new()),
        })
    }

    /// Set the component rendered for unmatched URLs
    pub fn not_found(mut self, component: impl Into<ComponentId>) -> Self {
        self.not_found = component.into();
        self
    }

    /// Set the match cache capacity
    #[cfg(feature = "cache")]
    pub fn cache_capacity(self, capacity: usize) -> Self {
        self.cache.replace(MatchCache::with_capacity(capacity));
        self
    }

    /// Match cache statistics
    #[cfg(feature = "cache")]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.borrow().stats()
    }

    /// Number of matchable routes
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    /// Check if the table has no matchable routes
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Full patterns of all matchable routes, in matching order
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.leaves.iter().map(|leaf| leaf.full_path.as_str())
    }

    /// Build the not-found view for a URL
    pub fn not_found_view(&self, url: &Url) -> ResolvedView {
        let frame =
            LayoutFrame::new("*", self.not_found.clone()).with_prop("path", url.path());
        ResolvedView::not_found(Location::from_url(url), vec![frame])
    }

    fn find(&self, path: &str) -> Option<(usize, RouteParams)> {
        #[cfg(feature = "cache")]
        if let Some(cached) = self.cache.borrow_mut().get(path) {
            return cached;
        }

        let found = self
            .leaves
            .iter()
            .enumerate()
            .find_map(|(idx, leaf)| leaf.pattern.matches(path).map(|params| (idx, params)));

        #[cfg(feature = "cache")]
        self.cache
            .borrow_mut()
            .insert(path.to_string(), found.clone());

        found
    }

    /// Canonical form of a raw path
    ///
    /// A path matching a named route links through that name, so both spellings
    /// of the same view share one URL in history.
    fn canonical_path(&self, path: &str) -> Result<String, RouterError> {
        let Some((idx, args)) = self.find(path) else {
            return Ok(normalize_path(path));
        };

        let leaf = &self.leaves[idx];
        match &leaf.name {
            Some(name) => self.names.url_for(name, &args),
            None => Ok(leaf
                .pattern
                .link(&args)
                .unwrap_or_else(|_| normalize_path(path))),
        }
    }
}

/// Re-encode every segment and drop empty ones
fn normalize_path(path: &str) -> String {
    let segments: Vec<String> = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| encode_component(&decode_component(s)))
        .collect();
    format!("/{}", segments.join("/"))
}

impl RouteTable for Routes {
    fn match_url(&self, url: &Url) -> ResolveFuture {
        let Some((idx, args)) = self.find(url.path()) else {
            trace_log!("No route matched '{}'", url);
            let view = self.not_found_view(url);
            return Box::pin(async move { view });
        };

        let leaf = &self.leaves[idx];
        trace_log!("'{}' matched route '{}'", url, leaf.full_path);

        let query = url.query();
        let location = match &leaf.name {
            Some(name) => Location {
                name: Some(name.clone()),
                args: args.clone(),
                path: None,
                query: query.clone(),
            },
            None => Location::from_url(url),
        };

        let ctx = LoadContext {
            url: url.clone(),
            args,
            query,
        };
        let frames = leaf.frames.clone();

        Box::pin(async move {
            let mut chain = Vec::with_capacity(frames.len());
            for frame in frames {
                let props = match &frame.loader {
                    Some(loader) => loader(&ctx).await,
                    None => Props::new(),
                };
                chain.push(LayoutFrame::new(frame.segment, frame.component).with_props(props));
            }
            ResolvedView::new(location, chain)
        })
    }

    fn link(&self, location: &Location) -> Result<Url, RouterError> {
        let path = match (&location.name, &location.path) {
            (Some(name), _) => self.names.url_for(name, &location.args)?,
            (None, Some(path)) => self.canonical_path(path)?,
            (None, None) => return Err(RouterError::EmptyLocation),
        };

        Ok(Url::from_parts(&path, &location.query))
    }

    fn check(&self, url: &Url) -> bool {
        self.find(url.path()).is_some()
    }
}

impl std::fmt::Debug for Routes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Routes")
            .field("patterns", &self.patterns().collect::<Vec<_>>())
            .field("named", &self.names.len())
            .field("not_found", &self.not_found)
            .finish()
    }
}

fn collect_leaves(
    route: &Route,
    parent_path: &str,
    parent_frames: &[FrameDef],
    leaves: &mut Vec<Leaf>,
    names: &mut NamedRouteRegistry,
) -> Result<(), RouterError> {
    validate_route_path(route.pattern()).map_err(|message| RouterError::InvalidPattern {
        pattern: route.pattern().to_string(),
        message,
    })?;

    let full_path = build_child_path(parent_path, route.pattern()).into_owned();

    let mut frames = parent_frames.to_vec();
    frames.push(FrameDef {
        segment: route.pattern().to_string(),
        component: route.component().clone(),
        loader: route.props_loader().cloned(),
    });

    if let Some(name) = route.route_name() {
        if names.contains(name) {
            return Err(RouterError::InvalidPattern {
                pattern: full_path,
                message: format!("Duplicate route name: '{}'", name),
            });
        }
        names.register(name, &full_path);
    }

    if route.is_layout() {
        for child in route.get_children() {
            collect_leaves(child, &full_path, &frames, leaves, names)?;
        }
        return Ok(());
    }

    validate_route_path(&full_path).map_err(|message| RouterError::InvalidPattern {
        pattern: full_path.clone(),
        message,
    })?;

    leaves.push(Leaf {
        pattern: RoutePattern::from_path(&full_path),
        full_path,
        name: route.route_name().map(str::to_string),
        frames,
    });

    Ok(())
}
