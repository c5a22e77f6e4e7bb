//! # GPUI Stack Router
//!
//! Client navigation for GPUI applications:
//!
//! - **Route resolution** - URLs resolve asynchronously to a view plus the chain of
//!   layouts that wrap it; the latest request always wins
//! - **Stacked navigation** - Visited views stay mounted underneath the current
//!   one, so back and forward are instant and keep scroll positions
//! - **History sync** - Platform back/forward shifts the stack when it can and
//!   resolves the URL when it must
//! - **Named routes** - Structural locations link to canonical URLs and back
//! - **Scroll edges** - Views load older or newer content when the top or bottom
//!   is reached, without losing their place
//! - **Transitions** - Slots slide or fade in and out
//!
//! # Quick Start
//!
//! ```ignore
//! use gpui::*;
//! use gpui_stack_router::*;
//!
//! fn main() {
//!     Application::new().run(|cx| {
//!         let routes = Routes::new(vec![
//!             Route::new("/", "shell").children(vec![
//!                 Route::new("", "home").name("home"),
//!                 Route::new("users/:id", "user").name("user"),
//!             ]),
//!         ])
//!         .unwrap();
//!         let seed = hydration::resolve_initial_view(&routes, &Url::new("/"));
//!         let router = init_router(cx, routes, seed, RouterConfig::stacked());
//!
//!         cx.open_window(WindowOptions::default(), |window, cx| {
//!             cx.new(|cx| RouterView::new(router, components(), window, cx))
//!         })
//!         .unwrap();
//!     });
//! }
//! ```
//!
//! # Navigation
//!
//! ```ignore
//! use gpui_stack_router::{Location, Navigator};
//!
//! // Push a structural location
//! Navigator::push(cx, Location::named("user").with_arg("id", "42"))?;
//!
//! // Replace the current entry
//! Navigator::replace(cx, "/login")?;
//!
//! // Platform traversal
//! Navigator::back(cx)?;
//! Navigator::forward(cx)?;
//! ```
//!
//! # Without GPUI
//!
//! The engine itself is framework-free: build a [`Router`] with any
//! [`TaskSpawner`] and [`PlatformHistory`].
//!
//! ```
//! use gpui_stack_router::*;
//!
//! let routes = Routes::new(vec![
//!     Route::new("/", "home"),
//!     Route::new("/about", "about").name("about"),
//! ])
//! .unwrap();
//! let seed = hydration::resolve_initial_view(&routes, &Url::new("/"));
//! let router = Router::builder(routes, seed).build(|task: LocalTask| pollster::block_on(task));
//!
//! router.push(Location::named("about")).unwrap();
//! assert_eq!(router.context().leaf().unwrap().component.as_str(), "about");
//!
//! router.back();
//! assert_eq!(router.context().index, 0);
//! ```
//!
//! # Feature Flags
//!
//! - `log` (default) - Uses the standard `log` crate for logging
//! - `tracing` - Uses the `tracing` crate for structured logging (mutually exclusive with `log`)
//! - `cache` (default) - LRU cache for URL matching
//! - `transition` (default) - Slot enter/exit animations

#![doc(html_root_url = "https://docs.rs/gpui-stack-router/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]
// Lints are configured in Cargo.toml [lints] section

// Logging abstraction
pub mod logging;

// Cache (optional)
#[cfg(feature = "cache")]
pub mod cache;

// Locations and matching
pub mod location;
pub mod matcher;
pub mod params;
pub mod route;
pub mod table;
pub mod view;

// Navigation engine
pub mod bridge;
pub mod channel;
pub mod history;
pub mod router;
pub mod state;
pub mod store;
pub mod task;

// Rendering support
pub mod compose;
pub mod hydration;
pub mod scroll;

// Transitions
#[cfg(feature = "transition")]
pub mod transition;

// Error handling and configuration
pub mod config;
pub mod error;

// GPUI front end
mod context;
pub mod widgets;

// Re-export main types for convenient access
#[cfg(feature = "cache")]
pub use cache::{CacheStats, MatchCache};
pub use channel::{
    NavigationCause, NavigationChannel, NavigationEvent, NavigationRequest, Subscription,
};
pub use compose::{compose, compose_slot, compose_static, visible_window, RenderNode};
pub use config::RouterConfig;
pub use context::{init_router, GlobalRouter, GpuiSpawner, Navigator, UseRouter};
pub use error::{EdgeError, RouterError};
pub use history::{MemoryHistory, PlatformHistory, PopListener};
pub use location::{Location, Url};
pub use params::{QueryParams, RouteParams};
pub use route::{
    build_child_path, validate_route_path, LoadContext, NamedRouteRegistry, Route, RouteTable,
};
pub use router::{Router, RouterBuilder, RouterContext, RouterHandle};
pub use scroll::{
    Edge, EdgeHooks, ScrollEdgeController, ScrollListener, ScrollMetrics, ScrollSurface,
};
pub use state::{NavigationStack, StackChange, StackMode};
pub use store::{NavigationStore, Resolution, ResolutionOutcome, StoreState};
pub use table::Routes;
pub use task::{local_task, LocalTask, TaskSpawner};
#[cfg(feature = "transition")]
pub use transition::{SlideDirection, Transition, TransitionLayer};
pub use view::{ComponentId, LayoutFrame, Props, ResolvedView, ViewStatus};
pub use widgets::{router_link, ComponentRegistry, GpuiScrollSurface, RouterLink, RouterView};

/// Navigation direction indicator.
///
/// Used to determine the direction of navigation for animations and history management.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDirection {
    /// Navigating forward to a new route
    Forward,
    /// Navigating back in history
    Back,
    /// Replacing the current route without affecting history direction
    Replace,
}

/// Identifies a registered history or scroll listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

impl ListenerId {
    /// Wrap a raw id; for [`PlatformHistory`] and [`ScrollSurface`] implementations
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw id
    pub const fn get(self) -> u64 {
        self.0
    }
}
