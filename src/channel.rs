//! Ordered navigation request stream
//!
//! Every navigation that needs a resolution goes through
//! [`NavigationChannel::emit`], which stamps it with a sequence number. Only
//! the request holding the latest number may change the stack; older ones are
//! superseded when they complete. Observers see a `Started` event for every
//! request before its `Applied` or `Superseded` event.

use crate::location::Url;
use crate::state::StackChange;
use crate::view::ViewStatus;
use crate::{trace_log, ListenerId};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// Why a resolution was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationCause {
    /// Programmatic push
    Push,
    /// Programmatic replace
    Replace,
    /// History traversal that could not be served from the stack
    Pop,
}

/// A request for resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    /// Sequence number, strictly increasing per channel
    pub seq: u64,
    /// URL to resolve
    pub url: Url,
    /// Origin of the request
    pub cause: NavigationCause,
}

/// Observable navigation lifecycle
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationEvent {
    /// A request was accepted and resolution started
    Started(NavigationRequest),
    /// The latest request resolved and was applied to the stack
    Applied {
        request: NavigationRequest,
        change: StackChange,
        status: ViewStatus,
    },
    /// A request resolved after a newer one was issued; its result was dropped
    Superseded(NavigationRequest),
    /// The index moved to a neighbouring entry without resolution
    Shifted(StackChange),
}

type Observer = Rc<dyn Fn(&NavigationEvent)>;

struct ChannelInner {
    next_seq: Cell<u64>,
    latest: Cell<Option<u64>>,
    observers: RefCell<Vec<(ListenerId, Observer)>>,
    next_id: Cell<u64>,
}

/// Sequence-numbered navigation stream with observers
///
/// Cloning yields another handle to the same stream.
///
/// # Example
///
/// ```
/// use gpui_stack_router::{NavigationCause, NavigationChannel, Url};
///
/// let channel = NavigationChannel::new();
/// let first = channel.emit(Url::new("/a"), NavigationCause::Push);
/// let second = channel.emit(Url::new("/b"), NavigationCause::Push);
///
/// assert!(!channel.is_latest(first.seq));
/// assert!(channel.is_latest(second.seq));
/// ```
#[derive(Clone)]
pub struct NavigationChannel {
    inner: Rc<ChannelInner>,
}

impl NavigationChannel {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ChannelInner {
                next_seq: Cell::new(1),
                latest: Cell::new(None),
                observers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    /// Stamp a request, record it as latest and announce it
    pub fn emit(&self, url: Url, cause: NavigationCause) -> NavigationRequest {
        let seq = self.inner.next_seq.get();
        self.inner.next_seq.set(seq + 1);
        self.inner.latest.set(Some(seq));

        let request = NavigationRequest { seq, url, cause };
        trace_log!("navigation #{} {:?} '{}'", seq, cause, request.url);
        self.publish(&NavigationEvent::Started(request.clone()));
        request
    }

    /// Check whether `seq` is the most recently emitted request
    pub fn is_latest(&self, seq: u64) -> bool {
        self.inner.latest.get() == Some(seq)
    }

    /// Sequence number of the most recent request
    pub fn latest(&self) -> Option<u64> {
        self.inner.latest.get()
    }

    /// Deliver an event to every observer
    pub fn publish(&self, event: &NavigationEvent) {
        // Observers may subscribe or navigate, so iterate over a snapshot
        let observers: Vec<Observer> = self
            .inner
            .observers
            .borrow()
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect();

        for observer in observers {
            observer(event);
        }
    }

    /// Register an observer; it stays registered while the subscription lives
    pub fn subscribe(&self, observer: impl Fn(&NavigationEvent) + 'static) -> Subscription {
        let id = ListenerId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        self.inner
            .observers
            .borrow_mut()
            .push((id, Rc::new(observer)));

        Subscription {
            channel: Some(Rc::downgrade(&self.inner)),
            id,
        }
    }

    /// Number of registered observers
    pub fn observer_count(&self) -> usize {
        self.inner.observers.borrow().len()
    }
}

impl Default for NavigationChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NavigationChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationChannel")
            .field("latest", &self.inner.latest.get())
            .field("observers", &self.observer_count())
            .finish()
    }
}

/// Observer registration; dropping it unregisters the observer
#[must_use = "dropping a Subscription unregisters the observer immediately"]
pub struct Subscription {
    channel: Option<Weak<ChannelInner>>,
    id: ListenerId,
}

impl Subscription {
    /// Keep the observer registered for the lifetime of the channel
    pub fn detach(mut self) {
        self.channel = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.channel.take().and_then(|weak| weak.upgrade()) {
            inner
                .observers
                .borrow_mut()
                .retain(|(id, _)| *id != self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.channel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_events(channel: &NavigationChannel) -> (Rc<RefCell<Vec<String>>>, Subscription) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        let subscription = channel.subscribe(move |event| {
            let entry = match event {
                NavigationEvent::Started(req) => format!("started #{}", req.seq),
                NavigationEvent::Applied { request, .. } => format!("applied #{}", request.seq),
                NavigationEvent::Superseded(req) => format!("superseded #{}", req.seq),
                NavigationEvent::Shifted(change) => format!("shifted {}", change.to),
            };
            sink.borrow_mut().push(entry);
        });
        (log, subscription)
    }

    #[test]
    fn test_sequence_numbers_increase() {
        let channel = NavigationChannel::new();
        assert_eq!(channel.latest(), None);

        let a = channel.emit(Url::new("/a"), NavigationCause::Push);
        let b = channel.emit(Url::new("/b"), NavigationCause::Replace);
        assert!(b.seq > a.seq);
        assert_eq!(channel.latest(), Some(b.seq));
        assert!(channel.is_latest(b.seq));
        assert!(!channel.is_latest(a.seq));
    }

    #[test]
    fn test_emit_announces_started_synchronously() {
        let channel = NavigationChannel::new();
        let (log, _subscription) = log_events(&channel);

        let req = channel.emit(Url::new("/a"), NavigationCause::Pop);
        assert_eq!(*log.borrow(), vec![format!("started #{}", req.seq)]);
    }

    #[test]
    fn test_dropping_subscription_unregisters() {
        let channel = NavigationChannel::new();
        let (log, subscription) = log_events(&channel);
        assert_eq!(channel.observer_count(), 1);

        drop(subscription);
        assert_eq!(channel.observer_count(), 0);

        channel.emit(Url::new("/a"), NavigationCause::Push);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_detached_subscription_stays() {
        let channel = NavigationChannel::new();
        let (log, subscription) = log_events(&channel);
        subscription.detach();

        channel.emit(Url::new("/a"), NavigationCause::Push);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_observer_may_subscribe_during_publish() {
        let channel = NavigationChannel::new();
        let held: Rc<RefCell<Vec<Subscription>>> = Rc::new(RefCell::new(Vec::new()));

        let inner_channel = channel.clone();
        let inner_held = held.clone();
        channel
            .subscribe(move |_| {
                inner_held
                    .borrow_mut()
                    .push(inner_channel.subscribe(|_| {}));
            })
            .detach();

        channel.emit(Url::new("/a"), NavigationCause::Push);
        assert_eq!(channel.observer_count(), 2);
    }
}
