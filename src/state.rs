//! Navigation stack
//!
//! The stack holds every resolved view the user can move between without a
//! new resolution. In flat mode it always holds exactly one view. In stacked
//! mode it behaves like browser history: pushing drops everything after the
//! current entry.

use crate::view::ResolvedView;
use crate::NavigationDirection;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// How applied views are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackMode {
    /// Only the current view is kept
    Flat,
    /// Previously visited views stay mounted underneath the current one
    #[default]
    Stacked,
}

/// Change applied to the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackChange {
    /// Index before the change
    pub from: usize,
    /// Index after the change
    pub to: usize,
    /// Kind of move
    pub direction: NavigationDirection,
}

/// Ordered views plus the current index
///
/// Invariant: `current_index() < len()`, and `len() == 1` in flat mode.
#[derive(Debug, Clone)]
pub struct NavigationStack {
    views: Vec<Rc<ResolvedView>>,
    current: usize,
    mode: StackMode,
    /// Maximum number of entries (0 = unlimited)
    max_depth: usize,
}

impl NavigationStack {
    /// Create a stack holding the seed view
    pub fn new(seed: ResolvedView, mode: StackMode) -> Self {
        Self {
            views: vec![Rc::new(seed)],
            current: 0,
            mode,
            max_depth: 0,
        }
    }

    /// Limit the number of entries; the oldest are dropped first
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self.enforce_max_depth();
        self
    }

    /// Storage mode
    pub fn mode(&self) -> StackMode {
        self.mode
    }

    /// Current view
    pub fn current(&self) -> &Rc<ResolvedView> {
        &self.views[self.current]
    }

    /// Current position
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Always false; a stack holds at least the seed view
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Entry at `index`
    pub fn get(&self, index: usize) -> Option<&Rc<ResolvedView>> {
        self.views.get(index)
    }

    /// All entries, including those after the current one
    pub fn views(&self) -> &[Rc<ResolvedView>] {
        &self.views
    }

    /// Entries from the bottom up to and including the current one
    pub fn visible(&self) -> &[Rc<ResolvedView>] {
        &self.views[..=self.current]
    }

    /// Entry immediately before the current one
    pub fn previous_entry(&self) -> Option<&Rc<ResolvedView>> {
        self.current.checked_sub(1).and_then(|idx| self.views.get(idx))
    }

    /// Entry immediately after the current one
    pub fn next_entry(&self) -> Option<&Rc<ResolvedView>> {
        self.views.get(self.current + 1)
    }

    /// Apply a newly resolved view
    pub fn push(&mut self, view: Rc<ResolvedView>) -> StackChange {
        let from = self.current;

        match self.mode {
            StackMode::Flat => {
                self.views = vec![view];
                self.current = 0;
            }
            StackMode::Stacked => {
                // Remove forward entries when pushing
                self.views.truncate(self.current + 1);
                self.views.push(view);
                self.current = self.views.len() - 1;
                self.enforce_max_depth();
            }
        }

        StackChange {
            from,
            to: self.current,
            direction: NavigationDirection::Forward,
        }
    }

    /// Substitute the current entry
    pub fn replace(&mut self, view: Rc<ResolvedView>) -> StackChange {
        self.views[self.current] = view;

        StackChange {
            from: self.current,
            to: self.current,
            direction: NavigationDirection::Replace,
        }
    }

    /// Move to the previous entry
    pub fn back(&mut self) -> Option<StackChange> {
        if !self.can_go_back() {
            return None;
        }

        let from = self.current;
        self.current -= 1;

        Some(StackChange {
            from,
            to: self.current,
            direction: NavigationDirection::Back,
        })
    }

    /// Move to the next entry
    pub fn forward(&mut self) -> Option<StackChange> {
        if !self.can_go_forward() {
            return None;
        }

        let from = self.current;
        self.current += 1;

        Some(StackChange {
            from,
            to: self.current,
            direction: NavigationDirection::Forward,
        })
    }

    /// Check if can go back
    pub fn can_go_back(&self) -> bool {
        self.current > 0
    }

    /// Check if can go forward
    pub fn can_go_forward(&self) -> bool {
        self.current + 1 < self.views.len()
    }

    fn enforce_max_depth(&mut self) {
        if self.max_depth == 0 || self.views.len() <= self.max_depth {
            return;
        }

        let excess = self.views.len() - self.max_depth;
        self.views.drain(..excess);
        self.current = self.current.saturating_sub(excess);
    }
}
