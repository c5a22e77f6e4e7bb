//! Router configuration

use crate::scroll::DEFAULT_EDGE_THRESHOLD;
use crate::state::StackMode;
#[cfg(feature = "transition")]
use crate::transition::Transition;

/// Router configuration
///
/// # Example
///
/// ```
/// use gpui_stack_router::{RouterConfig, StackMode};
///
/// let config = RouterConfig::stacked().max_depth(20).edge_threshold(8.0);
/// assert_eq!(config.mode, StackMode::Stacked);
/// assert_eq!(config.max_depth, 20);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RouterConfig {
    /// How applied views are stored
    pub mode: StackMode,
    /// Maximum stack length (0 = unlimited)
    pub max_depth: usize,
    /// Distance from the bottom that counts as reaching it, in pixels
    pub edge_threshold: f32,
    /// Slot enter/exit animation
    #[cfg(feature = "transition")]
    pub transition: Transition,
}

impl RouterConfig {
    /// Keep only the current view
    pub fn flat() -> Self {
        Self {
            mode: StackMode::Flat,
            ..Self::default()
        }
    }

    /// Keep visited views mounted underneath the current one
    pub fn stacked() -> Self {
        Self {
            mode: StackMode::Stacked,
            ..Self::default()
        }
    }

    /// Set stack mode
    pub fn mode(mut self, mode: StackMode) -> Self {
        self.mode = mode;
        self
    }

    /// Limit the stack length
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the bottom-edge threshold
    pub fn edge_threshold(mut self, threshold: f32) -> Self {
        self.edge_threshold = threshold;
        self
    }

    /// Set the slot transition
    #[cfg(feature = "transition")]
    pub fn transition(mut self, transition: Transition) -> Self {
        self.transition = transition;
        self
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            mode: StackMode::default(),
            max_depth: 0,
            edge_threshold: DEFAULT_EDGE_THRESHOLD,
            #[cfg(feature = "transition")]
            transition: Transition::default(),
        }
    }
}
