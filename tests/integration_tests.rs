//! Integration tests for gpui_stack_router
//!
//! These tests drive the complete router workflow: resolution ordering,
//! stack and history synchronization, scroll edges, hydration and the GPUI
//! front end.

use gpui::TestAppContext;
use gpui_stack_router::route::ResolveFuture;
use gpui_stack_router::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tokio::sync::oneshot;
use tokio::task::LocalSet;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

fn tokio_spawner(task: LocalTask) {
    tokio::task::spawn_local(task);
}

/// One-shot gate a loader waits on
type Gate = Rc<RefCell<Option<oneshot::Receiver<()>>>>;

fn gated_routes(gate: &Gate) -> Routes {
    let gate = gate.clone();
    Routes::new(vec![Route::new("/", "shell").children(vec![
        Route::new("", "home").name("home"),
        Route::new("fast", "fast").name("fast"),
        Route::new("slow", "slow").name("slow").loader(move |_| {
            let wait = gate.borrow_mut().take();
            async move {
                if let Some(wait) = wait {
                    let _ = wait.await;
                }
                Props::new()
            }
        }),
    ])])
    .unwrap()
}

fn leaf(router: &Router) -> String {
    router.context().leaf().unwrap().component.to_string()
}

/// Route table wrapper counting resolutions
struct Counting {
    inner: Routes,
    matches: Rc<Cell<usize>>,
}

impl RouteTable for Counting {
    fn match_url(&self, url: &Url) -> ResolveFuture {
        self.matches.set(self.matches.get() + 1);
        self.inner.match_url(url)
    }

    fn link(&self, location: &Location) -> Result<Url, RouterError> {
        self.inner.link(location)
    }

    fn check(&self, url: &Url) -> bool {
        self.inner.check(url)
    }
}

fn letters() -> Routes {
    Routes::new(vec![
        Route::new("/", "a").name("a"),
        Route::new("/b", "b").name("b"),
        Route::new("/c", "c").name("c"),
        Route::new("/d", "d").name("d"),
    ])
    .unwrap()
}

// ============================================================================
// Resolution Ordering Tests
// ============================================================================

#[tokio::test]
async fn test_latest_request_wins() {
    init_logging();
    LocalSet::new()
        .run_until(async {
            let (open, wait) = oneshot::channel();
            let gate: Gate = Rc::new(RefCell::new(Some(wait)));
            let routes = gated_routes(&gate);
            let seed = hydration::resolve_initial_view(&routes, &Url::new("/"));
            let router = Router::builder(routes, seed).build(tokio_spawner);

            router.push(Location::named("slow")).unwrap();
            router.push(Location::named("fast")).unwrap();
            settle().await;

            assert_eq!(leaf(&router), "fast");
            assert!(!router.context().loading);

            open.send(()).unwrap();
            settle().await;

            assert_eq!(leaf(&router), "fast");
            assert_eq!(router.context().depth, 2);
            assert_eq!(router.current_url(), "/fast");
        })
        .await;
}

#[tokio::test]
async fn test_loading_flag_follows_latest_request() {
    init_logging();
    LocalSet::new()
        .run_until(async {
            let (open, wait) = oneshot::channel();
            let gate: Gate = Rc::new(RefCell::new(Some(wait)));
            let routes = gated_routes(&gate);
            let seed = hydration::resolve_initial_view(&routes, &Url::new("/"));
            let router = Router::builder(routes, seed).build(tokio_spawner);

            router.push(Location::named("fast")).unwrap();
            router.push(Location::named("slow")).unwrap();
            settle().await;

            assert!(router.context().loading);
            assert_eq!(leaf(&router), "home");

            open.send(()).unwrap();
            settle().await;

            let ctx = router.context();
            assert!(!ctx.loading);
            assert_eq!(ctx.leaf().unwrap().component.as_str(), "slow");
            assert_eq!(ctx.index, 1);
        })
        .await;
}

#[tokio::test]
async fn test_events_report_superseded_requests() {
    LocalSet::new()
        .run_until(async {
            let (open, wait) = oneshot::channel();
            let gate: Gate = Rc::new(RefCell::new(Some(wait)));
            let routes = gated_routes(&gate);
            let seed = hydration::resolve_initial_view(&routes, &Url::new("/"));
            let router = Router::builder(routes, seed).build(tokio_spawner);

            let log = Rc::new(RefCell::new(Vec::new()));
            let sink = log.clone();
            let _subscription = router.subscribe(move |event| {
                let entry = match event {
                    NavigationEvent::Started(req) => format!("start {}", req.url),
                    NavigationEvent::Applied { request, .. } => format!("apply {}", request.url),
                    NavigationEvent::Superseded(req) => format!("drop {}", req.url),
                    NavigationEvent::Shifted(_) => "shift".to_string(),
                };
                sink.borrow_mut().push(entry);
            });

            router.push(Location::named("slow")).unwrap();
            router.push(Location::named("fast")).unwrap();
            settle().await;
            open.send(()).unwrap();
            settle().await;

            assert_eq!(
                *log.borrow(),
                vec!["start /slow", "start /fast", "apply /fast", "drop /slow"]
            );
        })
        .await;
}

// ============================================================================
// Stack and History Tests
// ============================================================================

#[tokio::test]
async fn test_back_then_push_truncates_forward_entries() {
    LocalSet::new()
        .run_until(async {
            let routes = letters();
            let seed = hydration::resolve_initial_view(&routes, &Url::new("/"));
            let router = Router::builder(routes, seed).build(tokio_spawner);

            router.push(Location::named("b")).unwrap();
            settle().await;
            router.push(Location::named("c")).unwrap();
            settle().await;
            assert_eq!(router.context().index, 2);

            router.back();
            router.push(Location::named("d")).unwrap();
            settle().await;

            let components: Vec<String> = router
                .store()
                .stack()
                .views()
                .iter()
                .map(|view| view.leaf().unwrap().component.to_string())
                .collect();
            assert_eq!(components, vec!["a", "b", "d"]);
            assert_eq!(router.context().index, 2);
            assert!(!router.store().stack().can_go_forward());
        })
        .await;
}

#[test]
fn test_internal_traversal_skips_resolution() {
    init_logging();
    let matches = Rc::new(Cell::new(0));
    let table = Counting {
        inner: letters(),
        matches: matches.clone(),
    };
    let seed = hydration::resolve_initial_view(&table, &Url::new("/"));
    let history = Rc::new(MemoryHistory::new(Url::new("/")));
    let router = Router::builder(table, seed)
        .history(history.clone())
        .build(|task: LocalTask| pollster::block_on(task));
    matches.set(0);

    router.push("/b").unwrap();
    router.push("/c").unwrap();
    assert_eq!(matches.get(), 2);

    router.back();
    router.back();
    router.forward();
    assert_eq!(matches.get(), 2);
    assert_eq!(router.context().index, 1);
    assert_eq!(history.current_index(), 1);

    // Jump two entries: the stack cannot shift there in one step
    router.go(1);
    assert_eq!(matches.get(), 2);
    router.go(-2);
    assert_eq!(matches.get(), 3);
    assert_eq!(router.context().leaf().unwrap().component.as_str(), "a");
}

#[test]
fn test_raw_path_entry_traverses_without_resolution() {
    let matches = Rc::new(Cell::new(0));
    let table = Counting {
        inner: Routes::new(vec![
            Route::new("/", "a").name("a"),
            Route::new("/b", "b").name("b"),
            Route::new("/users/:id", "user").name("user"),
        ])
        .unwrap(),
        matches: matches.clone(),
    };
    let seed = hydration::resolve_initial_view(&table, &Url::new("/"));
    let history = Rc::new(MemoryHistory::new(Url::new("/")));
    let router = Router::builder(table, seed)
        .config(RouterConfig::stacked())
        .history(history.clone())
        .build(|task: LocalTask| pollster::block_on(task));
    matches.set(0);

    router.push(Location::path("/users/7/")).unwrap();
    assert_eq!(router.current_url(), "/users/7");
    router.push("/users/jo ann").unwrap();
    assert_eq!(router.current_url(), "/users/jo%20ann");
    router.push("/b").unwrap();
    assert_eq!(matches.get(), 3);

    router.back();
    router.back();
    assert_eq!(matches.get(), 3);
    let ctx = router.context();
    assert_eq!(ctx.index, 1);
    assert_eq!(ctx.depth, 4);
    assert_eq!(ctx.location.args.get("id"), Some(&"7".to_string()));

    router.forward();
    assert_eq!(matches.get(), 3);
    assert_eq!(router.context().index, 2);
}

#[test]
fn test_stacked_index_counts_pushes() {
    let routes = letters();
    let seed = hydration::resolve_initial_view(&routes, &Url::new("/"));
    let router = Router::builder(routes, seed)
        .config(RouterConfig::stacked())
        .build(|task: LocalTask| pollster::block_on(task));

    for (pushes, name) in ["b", "c", "d", "b", "c"].iter().enumerate() {
        router.push(Location::named(*name)).unwrap();
        let ctx = router.context();
        assert_eq!(ctx.index, pushes + 1);
        assert!(ctx.depth <= ctx.index + 1);
    }
}

#[test]
fn test_max_depth_drops_oldest() {
    let routes = letters();
    let seed = hydration::resolve_initial_view(&routes, &Url::new("/"));
    let router = Router::builder(routes, seed)
        .config(RouterConfig::stacked().max_depth(2))
        .build(|task: LocalTask| pollster::block_on(task));

    router.push("/b").unwrap();
    router.push("/c").unwrap();

    let ctx = router.context();
    assert_eq!(ctx.depth, 2);
    assert_eq!(ctx.index, 1);
    assert_eq!(
        router.store().stack().views()[0].leaf().unwrap().component.as_str(),
        "b"
    );
}

#[test]
fn test_flat_mode_resolves_every_pop() {
    let matches = Rc::new(Cell::new(0));
    let table = Counting {
        inner: letters(),
        matches: matches.clone(),
    };
    let seed = hydration::resolve_initial_view(&table, &Url::new("/"));
    let router = Router::builder(table, seed)
        .config(RouterConfig::flat())
        .build(|task: LocalTask| pollster::block_on(task));
    matches.set(0);

    router.push("/b").unwrap();
    router.back();
    router.forward();

    assert_eq!(matches.get(), 3);
    assert_eq!(router.context().depth, 1);
    assert_eq!(router.context().leaf().unwrap().component.as_str(), "b");
}

#[test]
fn test_link_round_trip() {
    let routes = Routes::new(vec![Route::new("/", "shell").children(vec![
        Route::new("users/:id", "user").name("user"),
        Route::new("files/*", "file").name("file"),
    ])])
    .unwrap();

    let location = Location::named("user")
        .with_arg("id", "jo ann")
        .with_query("tab", "posts & likes");
    let url = routes.link(&location).unwrap();
    assert_eq!(url, "/users/jo%20ann?tab=posts%20%26%20likes");

    let view = pollster::block_on(routes.match_url(&url));
    assert_eq!(view.location, location);
    assert_eq!(routes.link(&view.location).unwrap(), url);
}

#[test]
fn test_detached_handle_is_uninitialized() {
    let handle = RouterHandle::detached();
    assert_eq!(handle.push("/"), Err(RouterError::Uninitialized));
    assert_eq!(handle.back(), Err(RouterError::Uninitialized));
    assert!(handle
        .current_url()
        .unwrap_err()
        .to_string()
        .starts_with("Router is not created"));
}

// ============================================================================
// Scroll Edge Tests
// ============================================================================

/// In-memory scroll container
struct Surface {
    metrics: Cell<ScrollMetrics>,
    listeners: RefCell<Vec<(ListenerId, ScrollListener)>>,
}

impl Surface {
    fn new(scroll_height: f32, client_height: f32) -> Rc<Self> {
        Rc::new(Self {
            metrics: Cell::new(ScrollMetrics::new(0.0, scroll_height, client_height)),
            listeners: RefCell::new(Vec::new()),
        })
    }

    fn scroll_to(&self, top: f32) {
        let mut metrics = self.metrics.get();
        metrics.scroll_top = top;
        self.metrics.set(metrics);
        let listeners: Vec<ScrollListener> =
            self.listeners.borrow().iter().map(|(_, l)| l.clone()).collect();
        for listener in listeners {
            listener();
        }
    }

    fn set_height(&self, scroll_height: f32) {
        let mut metrics = self.metrics.get();
        metrics.scroll_height = scroll_height;
        self.metrics.set(metrics);
    }
}

impl ScrollSurface for Surface {
    fn metrics(&self) -> ScrollMetrics {
        self.metrics.get()
    }

    fn set_scroll_top(&self, offset: f32) {
        let mut metrics = self.metrics.get();
        metrics.scroll_top = offset;
        self.metrics.set(metrics);
    }

    fn add_scroll_listener(&self, listener: ScrollListener) -> ListenerId {
        let id = ListenerId::new(self.listeners.borrow().len() as u64);
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    fn remove_scroll_listener(&self, id: ListenerId) {
        self.listeners.borrow_mut().retain(|(other, _)| *other != id);
    }
}

#[tokio::test]
async fn test_top_edge_keeps_visible_content_in_place() {
    LocalSet::new()
        .run_until(async {
            let surface = Surface::new(1000.0, 200.0);
            let controller = ScrollEdgeController::new();
            controller.mount(surface.clone(), Rc::new(tokio_spawner), 3.0);
            assert_eq!(surface.metrics().scroll_top, 800.0);

            let (open, wait) = oneshot::channel::<()>();
            let wait = Rc::new(RefCell::new(Some(wait)));
            let calls = Rc::new(Cell::new(0));
            let grow = surface.clone();
            let counter = calls.clone();
            controller.hooks("thread").on_reach_top(move || {
                counter.set(counter.get() + 1);
                let wait = wait.borrow_mut().take();
                let surface = grow.clone();
                async move {
                    if let Some(wait) = wait {
                        let _ = wait.await;
                    }
                    surface.set_height(1400.0);
                    Ok(())
                }
            });

            surface.scroll_to(0.0);
            surface.scroll_to(0.0);
            settle().await;
            assert_eq!(calls.get(), 1);
            assert!(controller.is_locked("thread", Edge::Top));

            open.send(()).unwrap();
            settle().await;

            assert_eq!(surface.metrics().scroll_top, 400.0);
            assert!(!controller.is_locked("thread", Edge::Top));
        })
        .await;
}

#[tokio::test]
async fn test_failed_bottom_edge_unlocks() {
    LocalSet::new()
        .run_until(async {
            let surface = Surface::new(1000.0, 200.0);
            let controller = ScrollEdgeController::new();
            controller.mount(surface.clone(), Rc::new(tokio_spawner), 3.0);

            let calls = Rc::new(Cell::new(0));
            let counter = calls.clone();
            controller.hooks("feed").on_reach_bottom(move || {
                counter.set(counter.get() + 1);
                async { Err::<(), EdgeError>("offline".into()) }
            });

            surface.scroll_to(798.0);
            settle().await;
            assert_eq!(calls.get(), 1);
            assert!(!controller.is_locked("feed", Edge::Bottom));
            assert_eq!(surface.metrics().scroll_top, 798.0);

            surface.scroll_to(799.0);
            settle().await;
            assert_eq!(calls.get(), 2);
        })
        .await;
}

// ============================================================================
// Hydration Tests
// ============================================================================

#[test]
fn test_hydrated_router_starts_at_server_view() {
    let routes = Routes::new(vec![Route::new("/", "shell").children(vec![
        Route::new("", "home"),
        Route::new("posts/:slug", "post").name("post"),
    ])])
    .unwrap();

    let server_view = hydration::resolve_initial_view(&routes, &Url::new("/posts/hello"));
    let markup = compose_static(&server_view).unwrap();
    let payload = hydration::encode_view(&server_view).unwrap();

    let client_view = hydration::decode_view(&payload).unwrap();
    assert_eq!(compose_static(&client_view).unwrap(), markup);

    let router =
        Router::builder(routes, client_view).build(|task: LocalTask| pollster::block_on(task));
    assert_eq!(router.current_url(), "/posts/hello");
    assert_eq!(router.context().index, 0);
}

// ============================================================================
// GPUI Front End Tests
// ============================================================================

fn gpui_router(cx: &mut TestAppContext) -> Router {
    cx.update(|cx| {
        let routes = letters();
        let seed = hydration::resolve_initial_view(&routes, &Url::new("/"));
        init_router(cx, routes, seed, RouterConfig::stacked())
    })
}

#[gpui::test]
async fn test_router_initialization(cx: &mut TestAppContext) {
    let _router = gpui_router(cx);
    assert_eq!(cx.read(Navigator::current_url).unwrap(), "/");
    assert!(!cx.read(Navigator::can_go_back));
}

#[gpui::test]
async fn test_navigator_push_and_back(cx: &mut TestAppContext) {
    let router = gpui_router(cx);

    cx.update(|cx| Navigator::push(cx, Location::named("b"))).unwrap();
    cx.run_until_parked();
    cx.update(|cx| Navigator::push(cx, "/c")).unwrap();
    cx.run_until_parked();
    assert_eq!(router.context().index, 2);

    cx.update(|cx| Navigator::go(cx, -2)).unwrap();
    cx.run_until_parked();
    assert_eq!(cx.read(Navigator::current_url).unwrap(), "/");
    assert_eq!(router.context().leaf().unwrap().component.as_str(), "a");
}

#[gpui::test]
async fn test_navigator_without_router(cx: &mut TestAppContext) {
    let err = cx.update(|cx| Navigator::replace(cx, "/b")).unwrap_err();
    assert!(err.is_uninitialized());
    assert!(cx.read(Navigator::context).is_err());
}
