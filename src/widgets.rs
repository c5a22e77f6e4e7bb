//! GPUI widgets
//!
//! [`RouterView`] renders the visible part of the navigation stack: one
//! absolutely positioned, scrollable slot per entry, each folded from its
//! layout chain through a [`ComponentRegistry`]. Slots keep their scroll
//! state while they stay in the stack, so going back shows the previous view
//! exactly where it was left.

use crate::compose::{compose, visible_window};
use crate::location::Location;
use crate::router::Router;
use crate::scroll::{
    EdgeHooks, ScrollEdgeController, ScrollListener, ScrollMetrics, ScrollSurface,
};
#[cfg(feature = "transition")]
use crate::transition::TransitionLayer;
use crate::view::{ComponentId, LayoutFrame, ResolvedView};
use crate::{debug_log, trace_log, ListenerId, Navigator};
#[cfg(feature = "transition")]
use gpui::relative;
use gpui::{
    div, point, px, rgb, AnyElement, App, Context, Div, InteractiveElement,
    IntoElement, MouseButton, ParentElement, Render, ScrollHandle, SharedString,
    StatefulInteractiveElement, Styled, Window,
};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
#[cfg(feature = "transition")]
use std::time::Instant;

// ============================================================================
// ComponentRegistry
// ============================================================================

/// Renders one layout frame given its already-rendered child
pub type ComponentRender =
    Rc<dyn Fn(&LayoutFrame, Option<AnyElement>, &EdgeHooks, &mut Window, &mut App) -> AnyElement>;

/// Maps component ids to render functions
///
/// # Example
///
/// ```ignore
/// use gpui_stack_router::ComponentRegistry;
///
/// let components = ComponentRegistry::new()
///     .register("shell", |_frame, child, _hooks, _window, _cx| {
///         div().size_full().children(child).into_any_element()
///     })
///     .register("feed", |frame, _child, hooks, _window, _cx| {
///         hooks.on_reach_bottom(|| async { Ok(()) });
///         div().child(frame.component.to_string()).into_any_element()
///     });
/// ```
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    components: HashMap<ComponentId, ComponentRender>,
    fallback: Option<ComponentRender>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a render function for `id`; replaces an earlier one
    pub fn register<F>(mut self, id: impl Into<ComponentId>, render: F) -> Self
    where
        F: Fn(&LayoutFrame, Option<AnyElement>, &EdgeHooks, &mut Window, &mut App) -> AnyElement
            + 'static,
    {
        self.components.insert(id.into(), Rc::new(render));
        self
    }

    /// Render function for ids that were never registered
    pub fn fallback<F>(mut self, render: F) -> Self
    where
        F: Fn(&LayoutFrame, Option<AnyElement>, &EdgeHooks, &mut Window, &mut App) -> AnyElement
            + 'static,
    {
        self.fallback = Some(Rc::new(render));
        self
    }

    /// Check if `id` has a render function
    pub fn contains(&self, id: &ComponentId) -> bool {
        self.components.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Render one frame
    pub fn render(
        &self,
        frame: &LayoutFrame,
        child: Option<AnyElement>,
        hooks: &EdgeHooks,
        window: &mut Window,
        cx: &mut App,
    ) -> AnyElement {
        match self.components.get(&frame.component).or(self.fallback.as_ref()) {
            Some(render) => render(frame, child, hooks, window, cx),
            None => {
                debug_log!("no component registered for '{}'", frame.component);
                div()
                    .size_full()
                    .child(SharedString::from(frame.component.to_string()))
                    .children(child)
                    .into_any_element()
            }
        }
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<&ComponentId> = self.components.keys().collect();
        ids.sort();
        f.debug_struct("ComponentRegistry")
            .field("components", &ids)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

// ============================================================================
// GpuiScrollSurface
// ============================================================================

/// [`ScrollSurface`] over a GPUI [`ScrollHandle`]
///
/// GPUI reports offsets as negative distances from the origin; this surface
/// converts them to a positive distance from the top.
///
/// Heights are only measured during layout, so anchors are held until
/// [`apply_pending_anchor`](Self::apply_pending_anchor) runs after the next
/// frame. Offset changes from any source are picked up by
/// [`sync_offset`](Self::sync_offset).
#[derive(Default)]
pub struct GpuiScrollSurface {
    handle: ScrollHandle,
    listeners: RefCell<Vec<(ListenerId, ScrollListener)>>,
    next_id: Cell<u64>,
    last_top: Cell<f32>,
    pending_anchor: Cell<Option<f32>>,
}

impl GpuiScrollSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to pass to `track_scroll`
    pub fn handle(&self) -> &ScrollHandle {
        &self.handle
    }

    fn scroll_top(&self) -> f32 {
        -f32::from(self.handle.offset().y)
    }

    /// Run every listener
    pub fn notify_scrolled(&self) {
        let listeners: Vec<ScrollListener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        for listener in listeners {
            listener();
        }
    }

    /// Notify listeners if the offset moved since the last check
    ///
    /// Offsets set through [`ScrollSurface::set_scroll_top`] do not count.
    pub fn sync_offset(&self) -> bool {
        let top = self.scroll_top();
        if (top - self.last_top.get()).abs() < f32::EPSILON {
            return false;
        }
        self.last_top.set(top);
        self.notify_scrolled();
        true
    }

    /// Check whether an anchor waits for the next layout
    pub fn has_pending_anchor(&self) -> bool {
        self.pending_anchor.get().is_some()
    }

    /// Apply a deferred anchor against the current layout
    pub fn apply_pending_anchor(&self) -> bool {
        let Some(before) = self.pending_anchor.take() else {
            return false;
        };
        let after = self.metrics().scroll_height;
        trace_log!("restoring scroll anchor: {} -> {}", before, after);
        self.set_scroll_top((after - before).max(0.0));
        true
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl ScrollSurface for GpuiScrollSurface {
    fn metrics(&self) -> ScrollMetrics {
        let client_height = f32::from(self.handle.bounds().size.height);
        let max_offset = f32::from(self.handle.max_offset().height);
        ScrollMetrics::new(self.scroll_top(), max_offset + client_height, client_height)
    }

    fn set_scroll_top(&self, offset: f32) {
        self.handle.set_offset(point(px(0.0), px(-offset)));
        self.last_top.set(offset);
    }

    fn restore_anchor(&self, before: f32) {
        // Several anchors before one layout: the oldest height wins
        if self.pending_anchor.get().is_none() {
            self.pending_anchor.set(Some(before));
        }
    }

    fn add_scroll_listener(&self, listener: ScrollListener) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    fn remove_scroll_listener(&self, id: ListenerId) {
        self.listeners.borrow_mut().retain(|(other, _)| *other != id);
    }
}

// ============================================================================
// RouterView
// ============================================================================

struct Slot {
    view: Rc<ResolvedView>,
    controller: ScrollEdgeController,
    surface: Rc<GpuiScrollSurface>,
}

impl Slot {
    fn new(view: Rc<ResolvedView>) -> Self {
        Self {
            view,
            controller: ScrollEdgeController::new(),
            surface: Rc::new(GpuiScrollSurface::new()),
        }
    }
}

/// Stack renderer
///
/// Keep the entity alive for as long as the window shows it; it also keeps
/// the [`Router`] alive.
pub struct RouterView {
    router: Router,
    components: Rc<ComponentRegistry>,
    slots: Vec<Slot>,
    #[cfg(feature = "transition")]
    transitions: TransitionLayer,
}

impl RouterView {
    pub fn new(
        router: Router,
        components: ComponentRegistry,
        _window: &mut Window,
        _cx: &mut Context<'_, Self>,
    ) -> Self {
        #[cfg(feature = "transition")]
        let transitions = TransitionLayer::new(router.config().transition);

        Self {
            router,
            components: Rc::new(components),
            slots: Vec::new(),
            #[cfg(feature = "transition")]
            transitions,
        }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Number of mounted slots
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Scroll-edge controller of the slot at `index`
    pub fn controller(&self, index: usize) -> Option<&ScrollEdgeController> {
        self.slots.get(index).map(|slot| &slot.controller)
    }

    /// Reconcile slots with the visible window; returns indices that need mounting
    fn sync_slots(&mut self) -> Vec<usize> {
        let visible: Vec<Rc<ResolvedView>> = visible_window(&self.router.store().stack()).to_vec();
        self.slots.truncate(visible.len());

        let mut fresh = Vec::new();
        for (index, view) in visible.into_iter().enumerate() {
            match self.slots.get_mut(index) {
                Some(slot) if Rc::ptr_eq(&slot.view, &view) => {}
                Some(slot) => {
                    *slot = Slot::new(view);
                    fresh.push(index);
                }
                None => {
                    self.slots.push(Slot::new(view));
                    fresh.push(index);
                }
            }
        }
        fresh
    }

    /// Mount controllers once their containers have been laid out
    fn mount_slots(&mut self, indices: &[usize]) {
        let spawner = self.router.spawner().clone();
        let threshold = self.router.config().edge_threshold;

        for index in indices {
            if let Some(slot) = self.slots.get(*index) {
                if !slot.controller.is_mounted() {
                    trace_log!("mounting slot {}", index);
                    slot.controller
                        .mount(slot.surface.clone(), spawner.clone(), threshold);
                }
            }
        }
    }

    /// Runs after the frame that laid out every slot
    ///
    /// Returns true when an offset was moved and the window needs another frame.
    fn after_layout(&self) -> bool {
        let mut moved = false;
        for slot in &self.slots {
            moved |= slot.surface.apply_pending_anchor();
            slot.surface.sync_offset();
        }
        moved
    }

    fn render_slot(
        &self,
        index: usize,
        slot: &Slot,
        window: &mut Window,
        cx: &mut Context<'_, Self>,
    ) -> gpui::Stateful<Div> {
        let components = self.components.clone();
        let controller = slot.controller.clone();
        let content = compose(
            &slot.view,
            |frame| controller.hooks(frame.segment.clone()),
            |frame, child, hooks| components.render(frame, child, hooks, window, cx),
        );

        div()
            .id(("router-slot", index))
            .absolute()
            .size_full()
            .overflow_y_scroll()
            .track_scroll(slot.surface.handle())
            .children(content)
    }

    #[cfg(feature = "transition")]
    fn render_exiting(&self, window: &mut Window, cx: &mut App, now: Instant) -> Vec<AnyElement> {
        let components = self.components.clone();
        self.transitions
            .exiting()
            .into_iter()
            .map(|(index, view)| {
                let style = self.transitions.style(index, now);
                let content = compose(
                    &view,
                    |frame| EdgeHooks::detached(frame.segment.clone()),
                    |frame, child, hooks| components.render(frame, child, hooks, window, cx),
                );
                div()
                    .absolute()
                    .size_full()
                    .left(relative(style.x))
                    .top(relative(style.y))
                    .opacity(style.opacity)
                    .children(content)
                    .into_any_element()
            })
            .collect()
    }
}

impl Render for RouterView {
    fn render(&mut self, window: &mut Window, cx: &mut Context<'_, Self>) -> impl IntoElement {
        let fresh = self.sync_slots();
        cx.on_next_frame(window, move |this: &mut Self, _window, cx| {
            if !fresh.is_empty() {
                this.mount_slots(&fresh);
            }
            if this.after_layout() {
                cx.notify();
            }
        });

        #[cfg(feature = "transition")]
        let now = Instant::now();
        #[cfg(feature = "transition")]
        {
            let visible: Vec<Rc<ResolvedView>> =
                self.slots.iter().map(|slot| slot.view.clone()).collect();
            self.transitions.prune(now);
            self.transitions.sync(&visible, now);
        }

        let mut root = div().relative().size_full().overflow_hidden();

        for (index, slot) in self.slots.iter().enumerate() {
            let element = self.render_slot(index, slot, window, cx);

            #[cfg(feature = "transition")]
            let element = {
                let style = self.transitions.style(index, now);
                element
                    .left(relative(style.x))
                    .top(relative(style.y))
                    .opacity(style.opacity)
            };

            root = root.child(element);
        }

        #[cfg(feature = "transition")]
        {
            root = root.children(self.render_exiting(window, cx, now));
            if self.transitions.is_animating() {
                window.request_animation_frame();
            }
        }

        root
    }
}

// ============================================================================
// RouterLink - Navigation Link Component
// ============================================================================

/// A clickable link component for router navigation
///
/// # Example
///
/// ```ignore
/// use gpui_stack_router::{Location, RouterLink};
///
/// RouterLink::new(Location::named("user").with_arg("id", "7"))
///     .child("Profile")
///     .build(cx)
/// ```
pub struct RouterLink {
    /// Target location
    location: Location,
    /// Optional custom styling when link is active
    active_class: Option<Box<dyn Fn(Div) -> Div>>,
    /// Child elements
    children: Vec<AnyElement>,
}

impl RouterLink {
    /// Create a new RouterLink to the specified location
    pub fn new(location: impl Into<Location>) -> Self {
        Self {
            location: location.into(),
            active_class: None,
            children: Vec::new(),
        }
    }

    /// Add a child element
    pub fn child(mut self, child: impl IntoElement) -> Self {
        self.children.push(child.into_any_element());
        self
    }

    /// Set custom styling for when this link is active (current route)
    pub fn active_class(mut self, style: impl Fn(Div) -> Div + 'static) -> Self {
        self.active_class = Some(Box::new(style));
        self
    }

    /// Build the link element with the given context
    pub fn build<V: 'static>(self, cx: &mut Context<'_, V>) -> Div {
        let is_active = is_current(cx, &self.location);
        let location = self.location;

        let mut link = div().cursor_pointer().on_mouse_down(
            MouseButton::Left,
            cx.listener(move |_view, _event, _window, cx| {
                if let Err(err) = Navigator::push(cx, location.clone()) {
                    debug_log!("link navigation failed: {}", err);
                }
            }),
        );

        // Apply active styling if provided and link is active
        if is_active {
            if let Some(active_fn) = self.active_class {
                link = active_fn(link);
            }
        }

        for child in self.children {
            link = link.child(child);
        }

        link
    }
}

/// Helper function to create a simple text link
pub fn router_link<V: 'static>(
    cx: &mut Context<'_, V>,
    location: impl Into<Location>,
    label: impl Into<SharedString>,
) -> Div {
    let location: Location = location.into();
    let label: SharedString = label.into();
    let is_active = is_current(cx, &location);

    div()
        .cursor_pointer()
        .text_color(if is_active {
            rgb(0x2196f3)
        } else {
            rgb(0x333333)
        })
        .hover(|this| this.text_color(rgb(0x2196f3)))
        .child(label)
        .on_mouse_down(
            MouseButton::Left,
            cx.listener(move |_view, _event, _window, cx| {
                if let Err(err) = Navigator::push(cx, location.clone()) {
                    debug_log!("link navigation failed: {}", err);
                }
            }),
        )
}

fn is_current(cx: &App, location: &Location) -> bool {
    match (Navigator::link(cx, location), Navigator::current_url(cx)) {
        (Ok(target), Ok(current)) => target == current,
        _ => false,
    }
}
