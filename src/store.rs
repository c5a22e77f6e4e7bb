//! Navigation state machine
//!
//! The store owns the [`NavigationStack`] and is the only thing that mutates
//! it. A request moves the store to `Loading`; the resolution future returned
//! by [`NavigationStore::request`] applies its view only if no newer request
//! was issued in the meantime.
//!
//! The loading flag follows the most recent request: a superseded completion
//! never clears it, so it stays raised until the newest resolution lands.

use crate::channel::{NavigationCause, NavigationChannel, NavigationEvent, NavigationRequest};
use crate::location::Url;
use crate::logging::log_resolution;
use crate::route::RouteTable;
use crate::state::{NavigationStack, StackChange};
use crate::view::ResolvedView;
use crate::{debug_log, trace_log};
use std::cell::{Cell, Ref, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};

/// Store state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// No resolution pending
    Idle,
    /// Waiting for the resolution of request `seq`
    Loading { seq: u64 },
}

/// How a resolution ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// The view was applied to the stack
    Applied(StackChange),
    /// A newer request was issued; the view was dropped
    Superseded,
    /// The store no longer exists
    Detached,
}

/// Future completing a request
pub type Resolution = Pin<Box<dyn Future<Output = ResolutionOutcome>>>;

struct StoreInner {
    stack: RefCell<NavigationStack>,
    state: Cell<StoreState>,
    channel: NavigationChannel,
    routes: Rc<dyn RouteTable>,
}

impl StoreInner {
    fn complete(&self, request: NavigationRequest, view: ResolvedView) -> ResolutionOutcome {
        if !self.channel.is_latest(request.seq) {
            debug_log!(
                "Discarding superseded resolution #{} for '{}'",
                request.seq,
                request.url
            );
            self.channel
                .publish(&NavigationEvent::Superseded(request));
            return ResolutionOutcome::Superseded;
        }

        let status = view.status;
        let view = Rc::new(view);
        let change = {
            let mut stack = self.stack.borrow_mut();
            match request.cause {
                NavigationCause::Replace => stack.replace(view),
                NavigationCause::Push | NavigationCause::Pop => stack.push(view),
            }
        };
        self.state.set(StoreState::Idle);

        trace_log!(
            "Applied #{} '{}' at index {}",
            request.seq,
            request.url,
            change.to
        );
        self.channel.publish(&NavigationEvent::Applied {
            request,
            change,
            status,
        });

        ResolutionOutcome::Applied(change)
    }
}

/// Owner of the navigation stack
///
/// Cloning yields another handle to the same store.
#[derive(Clone)]
pub struct NavigationStore {
    inner: Rc<StoreInner>,
}

impl NavigationStore {
    pub fn new(
        routes: Rc<dyn RouteTable>,
        stack: NavigationStack,
        channel: NavigationChannel,
    ) -> Self {
        Self {
            inner: Rc::new(StoreInner {
                stack: RefCell::new(stack),
                state: Cell::new(StoreState::Idle),
                channel,
                routes,
            }),
        }
    }

    /// Issue a resolution for `url`
    ///
    /// Always legal, including while another request is loading. The returned
    /// future must be driven to completion for the request to take effect.
    pub fn request(&self, url: Url, cause: NavigationCause) -> Resolution {
        log_resolution(&url, self.inner.routes.check(&url));

        let request = self.inner.channel.emit(url, cause);
        self.inner
            .state
            .set(StoreState::Loading { seq: request.seq });

        let pending = self.inner.routes.match_url(&request.url);
        let store: Weak<StoreInner> = Rc::downgrade(&self.inner);

        Box::pin(async move {
            let view = pending.await;
            match store.upgrade() {
                Some(inner) => inner.complete(request, view),
                None => ResolutionOutcome::Detached,
            }
        })
    }

    /// Move to the previous stack entry without resolution
    pub fn shift_back(&self) -> Option<StackChange> {
        let change = self.inner.stack.borrow_mut().back()?;
        self.inner.channel.publish(&NavigationEvent::Shifted(change));
        Some(change)
    }

    /// Move to the next stack entry without resolution
    pub fn shift_forward(&self) -> Option<StackChange> {
        let change = self.inner.stack.borrow_mut().forward()?;
        self.inner.channel.publish(&NavigationEvent::Shifted(change));
        Some(change)
    }

    /// Borrow the stack
    ///
    /// Do not hold the borrow across a navigation call.
    pub fn stack(&self) -> Ref<'_, NavigationStack> {
        self.inner.stack.borrow()
    }

    /// Current view
    pub fn current(&self) -> Rc<ResolvedView> {
        self.inner.stack.borrow().current().clone()
    }

    /// Current stack index
    pub fn index(&self) -> usize {
        self.inner.stack.borrow().current_index()
    }

    /// Stack length
    pub fn depth(&self) -> usize {
        self.inner.stack.borrow().len()
    }

    /// Store state
    pub fn state(&self) -> StoreState {
        self.inner.state.get()
    }

    /// True while the most recent request is unresolved
    pub fn is_loading(&self) -> bool {
        matches!(self.inner.state.get(), StoreState::Loading { .. })
    }

    /// Request stream
    pub fn channel(&self) -> &NavigationChannel {
        &self.inner.channel
    }

    /// Route table used for resolution
    pub fn routes(&self) -> &Rc<dyn RouteTable> {
        &self.inner.routes
    }

    pub(crate) fn downgrade(&self) -> WeakStore {
        WeakStore(Rc::downgrade(&self.inner))
    }
}

impl std::fmt::Debug for NavigationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationStore")
            .field("state", &self.inner.state.get())
            .field("stack", &self.inner.stack.borrow())
            .finish()
    }
}

/// Non-owning store reference
#[derive(Clone)]
pub(crate) struct WeakStore(Weak<StoreInner>);

impl WeakStore {
    pub(crate) fn upgrade(&self) -> Option<NavigationStore> {
        self.0.upgrade().map(|inner| NavigationStore { inner })
    }
}
