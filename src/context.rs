//! Router context integration for GPUI
//!
//! The application owns its [`Router`]; GPUI's global only keeps a
//! [`RouterHandle`] to it so views and event handlers can navigate through the
//! static [`Navigator`] API. Background resolutions run on the foreground
//! executor and refresh every window when they finish.

use crate::config::RouterConfig;
use crate::debug_log;
use crate::error::RouterError;
use crate::location::{Location, Url};
use crate::route::RouteTable;
use crate::router::{Router, RouterContext, RouterHandle};
use crate::task::{LocalTask, TaskSpawner};
use crate::view::ResolvedView;
use gpui::{App, AsyncApp, Global};

// ============================================================================
// GpuiSpawner
// ============================================================================

/// [`TaskSpawner`] backed by GPUI's foreground executor
///
/// Windows are refreshed after every task so the outcome of a resolution is
/// drawn on the next frame.
#[derive(Clone)]
pub struct GpuiSpawner {
    cx: AsyncApp,
}

impl GpuiSpawner {
    /// Create a spawner for the running application
    pub fn new(cx: &App) -> Self {
        Self { cx: cx.to_async() }
    }
}

impl TaskSpawner for GpuiSpawner {
    fn spawn_local(&self, task: LocalTask) {
        let cx = self.cx.clone();
        self.cx
            .foreground_executor()
            .spawn(async move {
                task.await;
                let _ = cx.update(|cx| cx.refresh_windows());
            })
            .detach();
    }
}

// ============================================================================
// GlobalRouter
// ============================================================================

/// GPUI global holding a handle to the application's router
#[derive(Clone, Debug, Default)]
pub struct GlobalRouter {
    handle: RouterHandle,
}

impl GlobalRouter {
    /// Wrap a handle
    pub fn new(handle: RouterHandle) -> Self {
        Self { handle }
    }

    /// Router handle
    pub fn handle(&self) -> &RouterHandle {
        &self.handle
    }
}

impl Global for GlobalRouter {}

/// Trait for accessing the global router from context
pub trait UseRouter {
    /// Handle to the global router; detached if none was installed
    fn router(&self) -> RouterHandle;

    /// Snapshot of the global router's state
    fn router_context(&self) -> Result<RouterContext, RouterError> {
        self.router().context()
    }
}

impl UseRouter for App {
    fn router(&self) -> RouterHandle {
        self.try_global::<GlobalRouter>()
            .map(|global| global.handle.clone())
            .unwrap_or_default()
    }
}

/// Create a router and install it as the GPUI global
///
/// The returned [`Router`] must be kept alive, typically by the root view;
/// once it is dropped every [`Navigator`] call fails with
/// [`RouterError::Uninitialized`].
///
/// # Example
///
/// ```ignore
/// use gpui_stack_router::{hydration, init_router, Route, RouterConfig, Routes, Url};
///
/// Application::new().run(|cx| {
///     let routes = Routes::new(vec![Route::new("/", "home")]).unwrap();
///     let seed = hydration::resolve_initial_view(&routes, &Url::new("/"));
///     let router = init_router(cx, routes, seed, RouterConfig::stacked());
///
///     cx.open_window(WindowOptions::default(), |window, cx| {
///         cx.new(|cx| RouterView::new(router, components(), window, cx))
///     })
///     .unwrap();
/// });
/// ```
pub fn init_router(
    cx: &mut App,
    routes: impl RouteTable + 'static,
    initial: ResolvedView,
    config: RouterConfig,
) -> Router {
    let router = Router::builder(routes, initial)
        .config(config)
        .build(GpuiSpawner::new(cx));
    cx.set_global(GlobalRouter::new(router.handle()));
    router
}

// ============================================================================
// Navigator
// ============================================================================

/// Navigation API for the global router
///
/// Works with any context that dereferences to [`App`] (`Context<V>`, `App`).
/// Every operation fails with [`RouterError::Uninitialized`] when no router
/// has been installed.
///
/// # Example
///
/// ```ignore
/// use gpui_stack_router::{Location, Navigator};
///
/// Navigator::push(cx, "/users/123")?;
/// Navigator::push(cx, Location::named("user").with_arg("id", "123"))?;
/// Navigator::back(cx)?;
/// Navigator::replace(cx, "/login")?;
/// ```
pub struct Navigator;

impl Navigator {
    /// Handle to the global router
    pub fn handle(cx: &App) -> RouterHandle {
        cx.router()
    }

    /// Add a history entry and show it
    pub fn push(cx: &mut App, location: impl Into<Location>) -> Result<(), RouterError> {
        let result = cx.router().push(location);
        Self::refresh(cx, &result);
        result
    }

    /// Overwrite the current history entry
    pub fn replace(cx: &mut App, location: impl Into<Location>) -> Result<(), RouterError> {
        let result = cx.router().replace(location);
        Self::refresh(cx, &result);
        result
    }

    /// Go back one history entry
    pub fn back(cx: &mut App) -> Result<(), RouterError> {
        let result = cx.router().back();
        Self::refresh(cx, &result);
        result
    }

    /// Go forward one history entry
    pub fn forward(cx: &mut App) -> Result<(), RouterError> {
        let result = cx.router().forward();
        Self::refresh(cx, &result);
        result
    }

    /// Traverse history by `delta` entries
    pub fn go(cx: &mut App, delta: isize) -> Result<(), RouterError> {
        let result = cx.router().go(delta);
        Self::refresh(cx, &result);
        result
    }

    /// Canonical URL for a location
    pub fn link(cx: &App, location: &Location) -> Result<Url, RouterError> {
        cx.router().link(location)
    }

    /// URL of the current history entry
    pub fn current_url(cx: &App) -> Result<Url, RouterError> {
        cx.router().current_url()
    }

    /// Snapshot of the router's state
    pub fn context(cx: &App) -> Result<RouterContext, RouterError> {
        cx.router_context()
    }

    /// Check if the stack has an entry below the current one
    pub fn can_go_back(cx: &App) -> bool {
        Self::context(cx).is_ok_and(|ctx| ctx.index > 0)
    }

    /// Check if the stack has an entry above the current one
    pub fn can_go_forward(cx: &App) -> bool {
        Self::context(cx).is_ok_and(|ctx| ctx.index + 1 < ctx.depth)
    }

    fn refresh(cx: &mut App, result: &Result<(), RouterError>) {
        match result {
            Ok(()) => cx.refresh_windows(),
            Err(err) => {
                debug_log!("navigation rejected: {}", err);
            }
        }
    }
}
