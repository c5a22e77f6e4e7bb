//! Router instance
//!
//! A [`Router`] wires a route table, a platform history and a task spawner
//! around one [`NavigationStore`]. It is created explicitly and passed to
//! whoever needs it; [`RouterHandle`] is the non-owning form used by views
//! and by the GPUI global.

use crate::bridge::HistoryBridge;
use crate::channel::{NavigationCause, NavigationEvent, Subscription};
use crate::config::RouterConfig;
use crate::error::RouterError;
use crate::history::{MemoryHistory, PlatformHistory};
use crate::location::{Location, Url};
use crate::route::RouteTable;
use crate::state::NavigationStack;
use crate::store::{NavigationStore, Resolution};
use crate::task::{local_task, TaskSpawner};
use crate::view::ResolvedView;
use crate::{debug_log, info_log, NavigationChannel};
use std::ops::Deref;
use std::rc::{Rc, Weak};

struct RouterInner {
    store: NavigationStore,
    history: Rc<dyn PlatformHistory>,
    spawner: Rc<dyn TaskSpawner>,
    config: RouterConfig,
    _bridge: HistoryBridge,
}

/// Navigation engine instance
///
/// Cloning yields another owner of the same router. The router stops
/// listening to history once the last owner is dropped.
///
/// # Example
///
/// ```
/// use gpui_stack_router::{
///     hydration, LocalTask, Location, Route, Router, RouterConfig, Routes, Url,
/// };
/// use std::rc::Rc;
///
/// let routes = Rc::new(
///     Routes::new(vec![
///         Route::new("/", "home").name("home"),
///         Route::new("/users/:id", "user").name("user"),
///     ])
///     .unwrap(),
/// );
/// let seed = hydration::resolve_initial_view(routes.as_ref(), &Url::new("/"));
///
/// let router = Router::builder(routes, seed)
///     .config(RouterConfig::stacked())
///     .build(|task: LocalTask| pollster::block_on(task));
///
/// router
///     .push(Location::named("user").with_arg("id", "7"))
///     .unwrap();
/// assert_eq!(router.current_url(), "/users/7");
/// assert_eq!(router.context().index, 1);
/// ```
#[derive(Clone)]
pub struct Router {
    inner: Rc<RouterInner>,
}

/// Builder for [`Router`]
pub struct RouterBuilder {
    routes: Rc<dyn RouteTable>,
    initial: ResolvedView,
    config: RouterConfig,
    history: Option<Rc<dyn PlatformHistory>>,
}

impl RouterBuilder {
    /// Set configuration
    pub fn config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a specific platform history
    ///
    /// Defaults to a [`MemoryHistory`] seeded with the initial view's URL.
    pub fn history(mut self, history: Rc<dyn PlatformHistory>) -> Self {
        self.history = Some(history);
        self
    }

    /// Create the router
    pub fn build(self, spawner: impl TaskSpawner + 'static) -> Router {
        let history = self.history.unwrap_or_else(|| {
            let seed_url = self
                .routes
                .link(&self.initial.location)
                .unwrap_or_else(|_| Url::new("/"));
            Rc::new(MemoryHistory::new(seed_url))
        });

        let stack = NavigationStack::new(self.initial, self.config.mode)
            .with_max_depth(self.config.max_depth);
        let store = NavigationStore::new(self.routes, stack, NavigationChannel::new());
        let spawner: Rc<dyn TaskSpawner> = Rc::new(spawner);
        let bridge = HistoryBridge::attach(history.clone(), &store, spawner.clone());

        info_log!(
            "Router initialized ({:?} mode) at '{}'",
            self.config.mode,
            history.current_url()
        );

        Router {
            inner: Rc::new(RouterInner {
                store,
                history,
                spawner,
                config: self.config,
                _bridge: bridge,
            }),
        }
    }
}

impl Router {
    /// Start building a router around `routes`, seeded with `initial`
    pub fn builder(routes: impl RouteTable + 'static, initial: ResolvedView) -> RouterBuilder {
        RouterBuilder {
            routes: Rc::new(routes),
            initial,
            config: RouterConfig::default(),
            history: None,
        }
    }

    /// Non-owning handle
    pub fn handle(&self) -> RouterHandle {
        RouterHandle {
            router: Rc::downgrade(&self.inner),
        }
    }

    /// Snapshot of the current state
    pub fn context(&self) -> RouterContext {
        let store = &self.inner.store;
        RouterContext {
            view: store.current(),
            routes: store.routes().clone(),
            loading: store.is_loading(),
            index: store.index(),
            depth: store.depth(),
        }
    }

    /// Record `location` in history per `cause` and start resolving it
    ///
    /// The returned future must be driven to completion; [`push`](Self::push)
    /// and [`replace`](Self::replace) hand it to the router's spawner.
    pub fn navigate(
        &self,
        location: &Location,
        cause: NavigationCause,
    ) -> Result<Resolution, RouterError> {
        let url = self.link(location)?;

        match cause {
            NavigationCause::Push => self.inner.history.push_state(&url),
            NavigationCause::Replace => self.inner.history.replace_state(&url),
            NavigationCause::Pop => {}
        }

        debug_log!("navigate {:?} '{}'", cause, url);
        Ok(self.inner.store.request(url, cause))
    }

    /// Add a history entry for `location` and show it
    pub fn push(&self, location: impl Into<Location>) -> Result<(), RouterError> {
        let resolution = self.navigate(&location.into(), NavigationCause::Push)?;
        self.spawn(resolution);
        Ok(())
    }

    /// Overwrite the current history entry with `location` and show it
    pub fn replace(&self, location: impl Into<Location>) -> Result<(), RouterError> {
        let resolution = self.navigate(&location.into(), NavigationCause::Replace)?;
        self.spawn(resolution);
        Ok(())
    }

    /// Platform back
    pub fn back(&self) {
        self.inner.history.back();
    }

    /// Platform forward
    pub fn forward(&self) {
        self.inner.history.forward();
    }

    /// Platform traversal by `delta` entries
    pub fn go(&self, delta: isize) {
        self.inner.history.go(delta);
    }

    /// Canonical URL for a location
    pub fn link(&self, location: &Location) -> Result<Url, RouterError> {
        self.inner.store.routes().link(location)
    }

    /// URL of the current platform history entry
    pub fn current_url(&self) -> Url {
        self.inner.history.current_url()
    }

    /// Observe navigation events
    pub fn subscribe(&self, observer: impl Fn(&NavigationEvent) + 'static) -> Subscription {
        self.inner.store.channel().subscribe(observer)
    }

    /// Navigation store
    pub fn store(&self) -> &NavigationStore {
        &self.inner.store
    }

    /// Platform history
    pub fn history(&self) -> &Rc<dyn PlatformHistory> {
        &self.inner.history
    }

    /// Task spawner
    pub fn spawner(&self) -> &Rc<dyn TaskSpawner> {
        &self.inner.spawner
    }

    /// Configuration
    pub fn config(&self) -> &RouterConfig {
        &self.inner.config
    }

    fn spawn(&self, resolution: Resolution) {
        self.inner.spawner.spawn_local(local_task(async move {
            resolution.await;
        }));
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("store", &self.inner.store)
            .field("config", &self.inner.config)
            .finish()
    }
}

/// Non-owning router reference
///
/// Every operation fails with [`RouterError::Uninitialized`] once the router
/// is gone, or if the handle was never attached to one.
#[derive(Clone, Default)]
pub struct RouterHandle {
    router: Weak<RouterInner>,
}

impl RouterHandle {
    /// A handle bound to no router
    pub fn detached() -> Self {
        Self::default()
    }

    /// The router, if it still exists
    pub fn router(&self) -> Result<Router, RouterError> {
        self.router
            .upgrade()
            .map(|inner| Router { inner })
            .ok_or(RouterError::Uninitialized)
    }

    /// Check if the router still exists
    pub fn is_attached(&self) -> bool {
        self.router.strong_count() > 0
    }

    /// See [`Router::push`]
    pub fn push(&self, location: impl Into<Location>) -> Result<(), RouterError> {
        self.router()?.push(location)
    }

    /// See [`Router::replace`]
    pub fn replace(&self, location: impl Into<Location>) -> Result<(), RouterError> {
        self.router()?.replace(location)
    }

    /// See [`Router::back`]
    pub fn back(&self) -> Result<(), RouterError> {
        self.router()?.back();
        Ok(())
    }

    /// See [`Router::forward`]
    pub fn forward(&self) -> Result<(), RouterError> {
        self.router()?.forward();
        Ok(())
    }

    /// See [`Router::go`]
    pub fn go(&self, delta: isize) -> Result<(), RouterError> {
        self.router()?.go(delta);
        Ok(())
    }

    /// See [`Router::link`]
    pub fn link(&self, location: &Location) -> Result<Url, RouterError> {
        self.router()?.link(location)
    }

    /// See [`Router::current_url`]
    pub fn current_url(&self) -> Result<Url, RouterError> {
        Ok(self.router()?.current_url())
    }

    /// See [`Router::context`]
    pub fn context(&self) -> Result<RouterContext, RouterError> {
        Ok(self.router()?.context())
    }
}

impl std::fmt::Debug for RouterHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterHandle")
            .field("attached", &self.is_attached())
            .finish()
    }
}

/// Read-only snapshot handed to views
///
/// Dereferences to the current [`ResolvedView`].
#[derive(Clone)]
pub struct RouterContext {
    view: Rc<ResolvedView>,
    routes: Rc<dyn RouteTable>,
    /// A resolution is pending
    pub loading: bool,
    /// Current stack index
    pub index: usize,
    /// Stack length
    pub depth: usize,
}

impl RouterContext {
    /// Current view
    pub fn view(&self) -> &Rc<ResolvedView> {
        &self.view
    }

    /// Route table
    pub fn routes(&self) -> &Rc<dyn RouteTable> {
        &self.routes
    }

    /// Canonical URL for a location
    pub fn link(&self, location: &Location) -> Result<Url, RouterError> {
        self.routes.link(location)
    }
}

impl Deref for RouterContext {
    type Target = ResolvedView;

    fn deref(&self) -> &ResolvedView {
        &self.view
    }
}

impl std::fmt::Debug for RouterContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterContext")
            .field("location", &self.view.location)
            .field("loading", &self.loading)
            .field("index", &self.index)
            .field("depth", &self.depth)
            .finish()
    }
}
