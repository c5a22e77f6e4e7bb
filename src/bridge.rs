//! Platform history synchronization
//!
//! When the user traverses history, the platform reports only the new URL.
//! In stacked mode the bridge first checks whether that URL belongs to a
//! neighbouring stack entry; if so the index moves and nothing is resolved.
//! Anything else (flat mode, multi-step jumps, unknown entries) becomes a
//! fresh resolution request.

use crate::channel::NavigationCause;
use crate::history::PlatformHistory;
use crate::location::Url;
use crate::state::StackMode;
use crate::store::NavigationStore;
use crate::task::{local_task, TaskSpawner};
use crate::{debug_log, ListenerId};
use std::rc::Rc;

/// What a pop signal turned into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopAction {
    /// The index moved one entry back
    ShiftBack,
    /// The index moved one entry forward
    ShiftForward,
    /// A full resolution was requested
    Resolve,
}

/// Decide how to serve a traversal to `url` without touching the stack
pub fn classify_pop(store: &NavigationStore, url: &Url) -> PopAction {
    let stack = store.stack();
    if stack.mode() == StackMode::Flat {
        return PopAction::Resolve;
    }

    let routes = store.routes();
    let links_to = |view: &crate::ResolvedView| {
        routes
            .link(&view.location)
            .is_ok_and(|linked| linked == *url)
    };

    if stack.previous_entry().is_some_and(|view| links_to(view.as_ref())) {
        PopAction::ShiftBack
    } else if stack.next_entry().is_some_and(|view| links_to(view.as_ref())) {
        PopAction::ShiftForward
    } else {
        PopAction::Resolve
    }
}

/// Serve one pop signal
pub fn handle_pop(store: &NavigationStore, url: &Url, spawner: &dyn TaskSpawner) -> PopAction {
    let action = classify_pop(store, url);
    debug_log!("pop '{}' -> {:?}", url, action);

    match action {
        PopAction::ShiftBack => {
            store.shift_back();
        }
        PopAction::ShiftForward => {
            store.shift_forward();
        }
        PopAction::Resolve => {
            let resolution = store.request(url.clone(), NavigationCause::Pop);
            spawner.spawn_local(local_task(async move {
                resolution.await;
            }));
        }
    }

    action
}

/// Pop listener registration tying a store to a platform history
///
/// The listener is removed when the bridge is dropped.
pub struct HistoryBridge {
    history: Rc<dyn PlatformHistory>,
    listener: Option<ListenerId>,
}

impl HistoryBridge {
    /// Start listening to `history` on behalf of `store`
    pub fn attach(
        history: Rc<dyn PlatformHistory>,
        store: &NavigationStore,
        spawner: Rc<dyn TaskSpawner>,
    ) -> Self {
        let store = store.downgrade();
        let listener = history.add_pop_listener(Rc::new(move |url: &Url| {
            if let Some(store) = store.upgrade() {
                handle_pop(&store, url, spawner.as_ref());
            }
        }));

        Self {
            history,
            listener: Some(listener),
        }
    }

    /// History being listened to
    pub fn history(&self) -> &Rc<dyn PlatformHistory> {
        &self.history
    }

    /// Stop listening
    pub fn detach(&mut self) {
        if let Some(id) = self.listener.take() {
            self.history.remove_pop_listener(id);
        }
    }

    /// Check whether the pop listener is registered
    pub fn is_attached(&self) -> bool {
        self.listener.is_some()
    }
}

impl Drop for HistoryBridge {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for HistoryBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryBridge")
            .field("listener", &self.listener)
            .finish()
    }
}
