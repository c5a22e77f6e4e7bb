//! Scroll-edge detection for stack slots
//!
//! Each mounted slot owns one [`ScrollEdgeController`]. Frames inside the slot
//! register continuations through [`EdgeHooks`]: "load older content" when the
//! top is reached, "load more" when the bottom is near. While a continuation
//! runs its registration is locked, so scrolling cannot start it twice.
//!
//! Content prepended at the top pushes everything down. After a top
//! continuation succeeds the offset is set to the height difference, so the
//! content the user was looking at stays in place.

use crate::error::EdgeError;
use crate::task::{LocalTask, TaskSpawner};
use crate::{debug_log, trace_log, warn_log, ListenerId};
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};

/// Default distance from the bottom that counts as reaching it
pub const DEFAULT_EDGE_THRESHOLD: f32 = 3.0;

/// Geometry of a scroll container
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    /// Distance scrolled from the top
    pub scroll_top: f32,
    /// Total content height
    pub scroll_height: f32,
    /// Visible height
    pub client_height: f32,
}

impl ScrollMetrics {
    pub fn new(scroll_top: f32, scroll_height: f32, client_height: f32) -> Self {
        Self {
            scroll_top,
            scroll_height,
            client_height,
        }
    }

    /// Check if scrolled all the way up
    pub fn at_top(&self) -> bool {
        self.scroll_top <= 0.0
    }

    /// Remaining distance to the bottom
    pub fn distance_to_bottom(&self) -> f32 {
        self.scroll_height - self.scroll_top - self.client_height
    }

    /// Offset that shows the end of the content
    pub fn bottom_offset(&self) -> f32 {
        (self.scroll_height - self.client_height).max(0.0)
    }
}

/// Callback fired by a surface whenever its offset changes
pub type ScrollListener = Rc<dyn Fn()>;

/// A scrollable container the controller attaches to
pub trait ScrollSurface {
    /// Current geometry
    fn metrics(&self) -> ScrollMetrics;

    /// Set the distance scrolled from the top
    fn set_scroll_top(&self, offset: f32);

    /// Keep the previously first content in view after content was added above it
    ///
    /// `before` is the content height measured before the addition. Surfaces
    /// whose heights are only known after layout override this to apply the
    /// offset once the new height is measured.
    fn restore_anchor(&self, before: f32) {
        let after = self.metrics().scroll_height;
        self.set_scroll_top((after - before).max(0.0));
    }

    /// Register a scroll listener
    fn add_scroll_listener(&self, listener: ScrollListener) -> ListenerId;

    /// Unregister a scroll listener; unknown ids are ignored
    fn remove_scroll_listener(&self, id: ListenerId);
}

/// Which end of the container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Top,
    Bottom,
}

/// Future returned by an edge continuation
pub type EdgeFuture = Pin<Box<dyn Future<Output = Result<(), EdgeError>>>>;

type EdgeContinuation = Rc<dyn Fn() -> EdgeFuture>;

struct Registration {
    frame: String,
    edge: Edge,
    continuation: EdgeContinuation,
    locked: Rc<Cell<bool>>,
}

/// State of one mount
struct Mount {
    surface: Rc<dyn ScrollSurface>,
    spawner: Rc<dyn TaskSpawner>,
    listener: ListenerId,
    alive: Rc<Cell<bool>>,
}

struct SlotInner {
    mount: RefCell<Option<Mount>>,
    threshold: Cell<f32>,
    registrations: RefCell<Vec<Registration>>,
}

impl SlotInner {
    fn release(&self) {
        if let Some(mount) = self.mount.borrow_mut().take() {
            mount.alive.set(false);
            mount.surface.remove_scroll_listener(mount.listener);
        }
    }
}

impl Drop for SlotInner {
    fn drop(&mut self) {
        self.release();
    }
}

/// Releases a registration lock when dropped
struct Unlock(Rc<Cell<bool>>);

impl Drop for Unlock {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Scroll listener and edge registrations of one slot
///
/// Cloning yields another handle to the same slot. The listener is removed
/// on [`unmount`](Self::unmount) or when the last handle is dropped.
#[derive(Clone)]
pub struct ScrollEdgeController {
    inner: Rc<SlotInner>,
}

impl ScrollEdgeController {
    /// Create an unmounted controller
    pub fn new() -> Self {
        Self {
            inner: Rc::new(SlotInner {
                mount: RefCell::new(None),
                threshold: Cell::new(DEFAULT_EDGE_THRESHOLD),
                registrations: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Attach to a surface
    ///
    /// Scrolls the surface to the bottom and starts listening. Mounting again
    /// releases the previous surface first.
    pub fn mount(
        &self,
        surface: Rc<dyn ScrollSurface>,
        spawner: Rc<dyn TaskSpawner>,
        threshold: f32,
    ) {
        self.inner.release();
        self.inner.threshold.set(threshold);

        let initial = surface.metrics().bottom_offset();
        surface.set_scroll_top(initial);
        trace_log!("scroll slot mounted, initial offset {}", initial);

        let slot: Weak<SlotInner> = Rc::downgrade(&self.inner);
        let listener = surface.add_scroll_listener(Rc::new(move || {
            if let Some(inner) = slot.upgrade() {
                ScrollEdgeController { inner }.dispatch();
            }
        }));

        *self.inner.mount.borrow_mut() = Some(Mount {
            surface,
            spawner,
            listener,
            alive: Rc::new(Cell::new(true)),
        });
    }

    /// Detach from the surface; pending offset corrections are skipped
    pub fn unmount(&self) {
        self.inner.release();
    }

    /// Check if attached to a surface
    pub fn is_mounted(&self) -> bool {
        self.inner.mount.borrow().is_some()
    }

    /// Hooks for the frame identified by `frame_key`
    pub fn hooks(&self, frame_key: impl Into<String>) -> EdgeHooks {
        EdgeHooks {
            slot: Rc::downgrade(&self.inner),
            frame: frame_key.into(),
        }
    }

    /// Number of edge registrations
    pub fn registration_count(&self) -> usize {
        self.inner.registrations.borrow().len()
    }

    /// Check if a frame's continuation for `edge` is running
    pub fn is_locked(&self, frame_key: &str, edge: Edge) -> bool {
        self.inner
            .registrations
            .borrow()
            .iter()
            .any(|reg| reg.frame == frame_key && reg.edge == edge && reg.locked.get())
    }

    /// Evaluate edge conditions and build a task for each one that fired
    ///
    /// Every returned task already holds its registration's lock and has
    /// captured the content height; the caller only has to run it.
    pub fn poll_edges(&self) -> Vec<LocalTask> {
        let (surface, alive) = match self.inner.mount.borrow().as_ref() {
            Some(mount) => (mount.surface.clone(), mount.alive.clone()),
            None => return Vec::new(),
        };

        let metrics = surface.metrics();
        let threshold = self.inner.threshold.get();

        // Collect first: continuations may register hooks when invoked
        let fired: Vec<(Edge, EdgeContinuation, Rc<Cell<bool>>)> = self
            .inner
            .registrations
            .borrow()
            .iter()
            .filter(|reg| !reg.locked.get())
            .filter(|reg| match reg.edge {
                Edge::Top => metrics.at_top(),
                Edge::Bottom => metrics.distance_to_bottom() < threshold,
            })
            .map(|reg| {
                reg.locked.set(true);
                (reg.edge, reg.continuation.clone(), reg.locked.clone())
            })
            .collect();

        fired
            .into_iter()
            .map(|(edge, continuation, locked)| {
                debug_log!("scroll edge {:?} reached", edge);
                let unlock = Unlock(locked);
                let pending = continuation();
                let before = metrics.scroll_height;
                let surface = surface.clone();
                let alive = alive.clone();

                Box::pin(async move {
                    let _unlock = unlock;
                    match pending.await {
                        Ok(()) if edge == Edge::Top && alive.get() => {
                            surface.restore_anchor(before);
                        }
                        Ok(()) => {}
                        Err(err) => {
                            warn_log!("scroll edge {:?} continuation failed: {}", edge, err);
                        }
                    }
                }) as LocalTask
            })
            .collect()
    }

    /// Poll edges and hand the resulting tasks to the mount's spawner
    pub fn dispatch(&self) -> usize {
        let spawner = match self.inner.mount.borrow().as_ref() {
            Some(mount) => mount.spawner.clone(),
            None => return 0,
        };

        let tasks = self.poll_edges();
        let count = tasks.len();
        for task in tasks {
            spawner.spawn_local(task);
        }
        count
    }
}

impl Default for ScrollEdgeController {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ScrollEdgeController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollEdgeController")
            .field("mounted", &self.is_mounted())
            .field("registrations", &self.registration_count())
            .finish()
    }
}

/// Registration handle for one frame of a slot
///
/// Registering again for the same edge replaces the continuation, so hooks
/// can be re-registered on every render.
#[derive(Clone)]
pub struct EdgeHooks {
    slot: Weak<SlotInner>,
    frame: String,
}

impl EdgeHooks {
    /// Hooks not bound to any slot; registrations are dropped
    pub fn detached(frame_key: impl Into<String>) -> Self {
        Self {
            slot: Weak::new(),
            frame: frame_key.into(),
        }
    }

    /// Key of the frame these hooks belong to
    pub fn frame_key(&self) -> &str {
        &self.frame
    }

    /// Run `continuation` when the slot is scrolled to the top
    ///
    /// On success the offset is moved by the height the content grew.
    pub fn on_reach_top<F, Fut>(&self, continuation: F)
    where
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = Result<(), EdgeError>> + 'static,
    {
        self.register(Edge::Top, continuation);
    }

    /// Run `continuation` when the slot is scrolled near the bottom
    pub fn on_reach_bottom<F, Fut>(&self, continuation: F)
    where
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = Result<(), EdgeError>> + 'static,
    {
        self.register(Edge::Bottom, continuation);
    }

    /// Remove this frame's registrations
    pub fn clear(&self) {
        if let Some(slot) = self.slot.upgrade() {
            slot.registrations
                .borrow_mut()
                .retain(|reg| reg.frame != self.frame);
        }
    }

    fn register<F, Fut>(&self, edge: Edge, continuation: F)
    where
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = Result<(), EdgeError>> + 'static,
    {
        let Some(slot) = self.slot.upgrade() else {
            return;
        };

        let continuation: EdgeContinuation =
            Rc::new(move || Box::pin(continuation()) as EdgeFuture);
        let mut registrations = slot.registrations.borrow_mut();

        match registrations
            .iter_mut()
            .find(|reg| reg.frame == self.frame && reg.edge == edge)
        {
            Some(existing) => existing.continuation = continuation,
            None => registrations.push(Registration {
                frame: self.frame.clone(),
                edge,
                continuation,
                locked: Rc::new(Cell::new(false)),
            }),
        }
    }
}

impl std::fmt::Debug for EdgeHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdgeHooks")
            .field("frame", &self.frame)
            .field("bound", &(self.slot.strong_count() > 0))
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pollster::block_on;
    use tokio::sync::oneshot;

    /// In-memory scroll container
    #[derive(Default)]
    pub(crate) struct FakeSurface {
        pub(crate) metrics: Cell<ScrollMetrics>,
        pub(crate) offsets: RefCell<Vec<f32>>,
        /// Record anchors instead of applying them
        pub(crate) deferred: Cell<bool>,
        pub(crate) anchors: RefCell<Vec<f32>>,
        listeners: RefCell<Vec<(ListenerId, ScrollListener)>>,
        next_id: Cell<u64>,
    }

    impl FakeSurface {
        pub(crate) fn new(scroll_height: f32, client_height: f32) -> Rc<Self> {
            Rc::new(Self {
                metrics: Cell::new(ScrollMetrics::new(0.0, scroll_height, client_height)),
                ..Self::default()
            })
        }

        pub(crate) fn scroll_to(&self, top: f32) {
            let mut metrics = self.metrics.get();
            metrics.scroll_top = top;
            self.metrics.set(metrics);

            let listeners: Vec<ScrollListener> =
                self.listeners.borrow().iter().map(|(_, l)| l.clone()).collect();
            for listener in listeners {
                listener();
            }
        }

        pub(crate) fn grow(&self, scroll_height: f32) {
            let mut metrics = self.metrics.get();
            metrics.scroll_height = scroll_height;
            self.metrics.set(metrics);
        }

        pub(crate) fn listener_count(&self) -> usize {
            self.listeners.borrow().len()
        }
    }

    impl ScrollSurface for FakeSurface {
        fn metrics(&self) -> ScrollMetrics {
            self.metrics.get()
        }

        fn set_scroll_top(&self, offset: f32) {
            let mut metrics = self.metrics.get();
            metrics.scroll_top = offset;
            self.metrics.set(metrics);
            self.offsets.borrow_mut().push(offset);
        }

        fn restore_anchor(&self, before: f32) {
            if self.deferred.get() {
                self.anchors.borrow_mut().push(before);
            } else {
                let after = self.metrics().scroll_height;
                self.set_scroll_top((after - before).max(0.0));
            }
        }

        fn add_scroll_listener(&self, listener: ScrollListener) -> ListenerId {
            let id = ListenerId(self.next_id.get());
            self.next_id.set(id.0 + 1);
            self.listeners.borrow_mut().push((id, listener));
            id
        }

        fn remove_scroll_listener(&self, id: ListenerId) {
            self.listeners.borrow_mut().retain(|(lid, _)| *lid != id);
        }
    }

    type Queue = Rc<RefCell<Vec<LocalTask>>>;

    fn mounted(surface: &Rc<FakeSurface>) -> (ScrollEdgeController, Queue) {
        let queue: Queue = Rc::new(RefCell::new(Vec::new()));
        let sink = queue.clone();
        let controller = ScrollEdgeController::new();
        controller.mount(
            surface.clone(),
            Rc::new(move |task: LocalTask| sink.borrow_mut().push(task)),
            DEFAULT_EDGE_THRESHOLD,
        );
        (controller, queue)
    }

    fn run_all(queue: &Queue) {
        let tasks: Vec<LocalTask> = queue.borrow_mut().drain(..).collect();
        for task in tasks {
            block_on(task);
        }
    }

    #[test]
    fn test_mount_scrolls_to_bottom() {
        let surface = FakeSurface::new(1000.0, 300.0);
        let (controller, _) = mounted(&surface);

        assert!(controller.is_mounted());
        assert_eq!(surface.metrics().scroll_top, 700.0);
        assert_eq!(surface.listener_count(), 1);
    }

    #[test]
    fn test_top_edge_preserves_offset() {
        let surface = FakeSurface::new(1000.0, 300.0);
        let (controller, queue) = mounted(&surface);

        let grow = surface.clone();
        controller.hooks("feed").on_reach_top(move || {
            let surface = grow.clone();
            async move {
                surface.grow(1400.0);
                Ok(())
            }
        });

        surface.scroll_to(0.0);
        assert!(controller.is_locked("feed", Edge::Top));
        run_all(&queue);

        assert_eq!(surface.metrics().scroll_top, 400.0);
        assert!(!controller.is_locked("feed", Edge::Top));
    }

    #[test]
    fn test_top_edge_hands_height_to_deferring_surface() {
        let surface = FakeSurface::new(1000.0, 300.0);
        surface.deferred.set(true);
        let (controller, queue) = mounted(&surface);

        controller
            .hooks("feed")
            .on_reach_top(|| async { Ok(()) });

        surface.scroll_to(0.0);
        run_all(&queue);

        assert_eq!(*surface.anchors.borrow(), vec![1000.0]);
        assert_eq!(surface.metrics().scroll_top, 0.0);
        assert!(!controller.is_locked("feed", Edge::Top));
    }

    #[test]
    fn test_bottom_edge_threshold() {
        let surface = FakeSurface::new(1000.0, 300.0);
        let (controller, queue) = mounted(&surface);

        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        controller.hooks("feed").on_reach_bottom(move || {
            counter.set(counter.get() + 1);
            async { Ok(()) }
        });

        surface.scroll_to(690.0);
        assert!(queue.borrow().is_empty());

        surface.scroll_to(698.0);
        run_all(&queue);
        assert_eq!(hits.get(), 1);
        assert_eq!(surface.metrics().scroll_top, 698.0);
    }

    #[test]
    fn test_no_reentry_while_locked() {
        let surface = FakeSurface::new(1000.0, 300.0);
        let (controller, queue) = mounted(&surface);

        let gates: Rc<RefCell<Vec<oneshot::Sender<()>>>> = Rc::new(RefCell::new(Vec::new()));
        let gate_sink = gates.clone();
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        controller.hooks("feed").on_reach_top(move || {
            counter.set(counter.get() + 1);
            let (tx, rx) = oneshot::channel();
            gate_sink.borrow_mut().push(tx);
            async move {
                let _ = rx.await;
                Ok(())
            }
        });

        surface.scroll_to(0.0);
        surface.scroll_to(0.0);
        assert_eq!(calls.get(), 1);
        assert_eq!(queue.borrow().len(), 1);

        for gate in gates.borrow_mut().drain(..) {
            let _ = gate.send(());
        }
        run_all(&queue);

        surface.scroll_to(0.0);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_failure_is_swallowed_and_unlocks() {
        let surface = FakeSurface::new(1000.0, 300.0);
        let (controller, queue) = mounted(&surface);
        controller.hooks("feed").on_reach_top(|| async {
            let err: EdgeError = "backend unavailable".into();
            Err(err)
        });

        surface.scroll_to(0.0);
        let grown_before = surface.offsets.borrow().len();
        run_all(&queue);

        assert!(!controller.is_locked("feed", Edge::Top));
        assert_eq!(surface.offsets.borrow().len(), grown_before);
    }

    #[test]
    fn test_unmount_skips_offset_correction() {
        let surface = FakeSurface::new(1000.0, 300.0);
        let (controller, queue) = mounted(&surface);

        let grow = surface.clone();
        controller.hooks("feed").on_reach_top(move || {
            let surface = grow.clone();
            async move {
                surface.grow(1400.0);
                Ok(())
            }
        });

        surface.scroll_to(0.0);
        controller.unmount();
        assert_eq!(surface.listener_count(), 0);

        run_all(&queue);
        assert_eq!(surface.metrics().scroll_top, 0.0);
    }

    #[test]
    fn test_drop_removes_listener() {
        let surface = FakeSurface::new(1000.0, 300.0);
        let (controller, _) = mounted(&surface);
        drop(controller);
        assert_eq!(surface.listener_count(), 0);
    }

    #[test]
    fn test_hooks_replace_per_frame_and_edge() {
        let controller = ScrollEdgeController::new();
        let hooks = controller.hooks("feed");
        hooks.on_reach_top(|| async { Ok(()) });
        hooks.on_reach_top(|| async { Ok(()) });
        hooks.on_reach_bottom(|| async { Ok(()) });
        controller.hooks("sidebar").on_reach_top(|| async { Ok(()) });

        assert_eq!(controller.registration_count(), 3);

        hooks.clear();
        assert_eq!(controller.registration_count(), 1);
    }

    #[test]
    fn test_detached_hooks_ignore_registrations() {
        let hooks = EdgeHooks::detached("feed");
        hooks.on_reach_top(|| async { Ok(()) });
        assert_eq!(hooks.frame_key(), "feed");
    }

    #[test]
    fn test_unmounted_controller_polls_nothing() {
        let controller = ScrollEdgeController::new();
        controller.hooks("feed").on_reach_top(|| async { Ok(()) });
        assert!(controller.poll_edges().is_empty());
        assert_eq!(controller.dispatch(), 0);
    }
}
