//! Platform history abstraction
//!
//! [`PlatformHistory`] is the narrow surface the router needs from the host's
//! history mechanism (the browser History API, or an in-process list on
//! desktop). [`MemoryHistory`] is the in-process implementation with browser
//! semantics:
//!
//! - `push_state` / `replace_state` never notify pop listeners
//! - `go` notifies pop listeners once, and only when the position changes
//! - moving outside the recorded entries is a no-op

use crate::location::Url;
use crate::{trace_log, ListenerId};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Callback invoked with the new platform URL after a history traversal
pub type PopListener = Rc<dyn Fn(&Url)>;

/// Host history mechanism
///
/// Methods take `&self`: a history is shared between the router and the
/// bridge listening to it.
pub trait PlatformHistory {
    /// URL of the current entry
    fn current_url(&self) -> Url;

    /// Add an entry after the current one, dropping forward entries
    fn push_state(&self, url: &Url);

    /// Overwrite the current entry
    fn replace_state(&self, url: &Url);

    /// Move `delta` entries (negative = back)
    fn go(&self, delta: isize);

    /// Move one entry back
    fn back(&self) {
        self.go(-1);
    }

    /// Move one entry forward
    fn forward(&self) {
        self.go(1);
    }

    /// Register a listener for traversals
    fn add_pop_listener(&self, listener: PopListener) -> ListenerId;

    /// Unregister a listener; unknown ids are ignored
    fn remove_pop_listener(&self, id: ListenerId);
}

#[derive(Debug, Clone)]
struct Entries {
    urls: Vec<Url>,
    current: usize,
    /// Maximum history size (0 = unlimited)
    max_size: usize,
}

impl Entries {
    fn enforce_size_limit(&mut self) {
        if self.max_size > 0 && self.urls.len() > self.max_size {
            // Remove oldest entries, keeping the current one reachable
            let excess = self.urls.len() - self.max_size;
            self.urls.drain(0..excess);
            self.current = self.current.saturating_sub(excess);
        }
    }
}

/// In-process history list
///
/// # Example
///
/// ```
/// use gpui_stack_router::{MemoryHistory, PlatformHistory, Url};
///
/// let history = MemoryHistory::new(Url::new("/"));
/// history.push_state(&Url::new("/users"));
/// history.back();
/// assert_eq!(history.current_url(), "/");
/// ```
pub struct MemoryHistory {
    entries: RefCell<Entries>,
    listeners: RefCell<Vec<(ListenerId, PopListener)>>,
    next_id: Cell<u64>,
}

impl MemoryHistory {
    /// Default entry limit
    pub const DEFAULT_MAX_SIZE: usize = 1000;

    /// Create a history with one entry
    pub fn new(initial: Url) -> Self {
        Self::with_max_size(initial, Self::DEFAULT_MAX_SIZE)
    }

    /// Create with custom max size
    pub fn with_max_size(initial: Url, max_size: usize) -> Self {
        Self {
            entries: RefCell::new(Entries {
                urls: vec![initial],
                current: 0,
                max_size,
            }),
            listeners: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    /// Get history length
    pub fn len(&self) -> usize {
        self.entries.borrow().urls.len()
    }

    /// Always false; a history holds at least one entry
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().urls.is_empty()
    }

    /// Get current index
    pub fn current_index(&self) -> usize {
        self.entries.borrow().current
    }

    /// All recorded URLs
    pub fn urls(&self) -> Vec<Url> {
        self.entries.borrow().urls.clone()
    }

    /// Check if can go back
    pub fn can_go_back(&self) -> bool {
        self.entries.borrow().current > 0
    }

    /// Check if can go forward
    pub fn can_go_forward(&self) -> bool {
        let entries = self.entries.borrow();
        entries.current + 1 < entries.urls.len()
    }

    /// Number of registered pop listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    fn notify(&self, url: &Url) {
        // Listeners may navigate again, so call them on a snapshot
        let listeners: Vec<PopListener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        for listener in listeners {
            listener(url);
        }
    }
}

impl PlatformHistory for MemoryHistory {
    fn current_url(&self) -> Url {
        let entries = self.entries.borrow();
        entries.urls[entries.current].clone()
    }

    fn push_state(&self, url: &Url) {
        let mut entries = self.entries.borrow_mut();
        let keep = entries.current + 1;
        entries.urls.truncate(keep);
        entries.urls.push(url.clone());
        entries.current += 1;
        entries.enforce_size_limit();
        trace_log!("history push_state '{}' ({} entries)", url, entries.urls.len());
    }

    fn replace_state(&self, url: &Url) {
        let mut entries = self.entries.borrow_mut();
        let current = entries.current;
        entries.urls[current] = url.clone();
        trace_log!("history replace_state '{}'", url);
    }

    fn go(&self, delta: isize) {
        let url = {
            let mut entries = self.entries.borrow_mut();
            let Some(target) = entries.current.checked_add_signed(delta) else {
                return;
            };
            if delta == 0 || target >= entries.urls.len() {
                return;
            }
            entries.current = target;
            entries.urls[target].clone()
        };

        trace_log!("history go({}) -> '{}'", delta, url);
        self.notify(&url);
    }

    fn add_pop_listener(&self, listener: PopListener) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    fn remove_pop_listener(&self, id: ListenerId) {
        self.listeners
            .borrow_mut()
            .retain(|(listener_id, _)| *listener_id != id);
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new(Url::new("/"))
    }
}

impl std::fmt::Debug for MemoryHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryHistory")
            .field("entries", &self.entries.borrow())
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}
