//! Stack slot transitions
//!
//! Slots are keyed by stack index. When an index becomes visible it enters;
//! when it stops being visible it exits, and a snapshot of its view is kept
//! so it can still be drawn while it slides away. The layer only computes
//! phases and progress; drawing is left to the front end.

use crate::view::ResolvedView;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Direction for slide transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideDirection {
    /// Move leftwards, entering from the right edge
    Left,
    /// Move rightwards, entering from the left edge
    Right,
    /// Move upwards, entering from the bottom edge
    Up,
    /// Move downwards, entering from the top edge
    Down,
}

/// Built-in transition types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// No transition animation
    None,

    /// Fade transition (simple opacity animation)
    Fade {
        /// Duration in milliseconds
        duration_ms: u64,
    },

    /// Slide transition
    Slide {
        /// Direction to slide
        direction: SlideDirection,
        /// Duration in milliseconds
        duration_ms: u64,
    },
}

impl Default for Transition {
    /// Slide in from the right over 300 ms
    fn default() -> Self {
        Self::slide_left(300)
    }
}

impl Transition {
    /// Create a fade transition
    pub fn fade(duration_ms: u64) -> Self {
        Self::Fade { duration_ms }
    }

    /// Create a slide-left transition
    pub fn slide_left(duration_ms: u64) -> Self {
        Self::Slide {
            direction: SlideDirection::Left,
            duration_ms,
        }
    }

    /// Create a slide-right transition
    pub fn slide_right(duration_ms: u64) -> Self {
        Self::Slide {
            direction: SlideDirection::Right,
            duration_ms,
        }
    }

    /// Create a slide-up transition
    pub fn slide_up(duration_ms: u64) -> Self {
        Self::Slide {
            direction: SlideDirection::Up,
            duration_ms,
        }
    }

    /// Create a slide-down transition
    pub fn slide_down(duration_ms: u64) -> Self {
        Self::Slide {
            direction: SlideDirection::Down,
            duration_ms,
        }
    }

    /// Get the duration of this transition
    pub fn duration(&self) -> Duration {
        match self {
            Self::None => Duration::ZERO,
            Self::Fade { duration_ms } | Self::Slide { duration_ms, .. } => {
                Duration::from_millis(*duration_ms)
            }
        }
    }

    /// Check if this is a no-op transition
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None) || self.duration().is_zero()
    }

    /// Visual state for a given progress (0.0 hidden, 1.0 in place)
    pub fn style(&self, progress: f32) -> SlotStyle {
        match self {
            Self::None => SlotStyle::IN_PLACE,
            Self::Fade { .. } => SlotStyle {
                opacity: progress,
                ..SlotStyle::IN_PLACE
            },
            Self::Slide { direction, .. } => {
                let offset = 1.0 - progress;
                let (x, y) = match direction {
                    SlideDirection::Left => (offset, 0.0),
                    SlideDirection::Right => (-offset, 0.0),
                    SlideDirection::Up => (0.0, offset),
                    SlideDirection::Down => (0.0, -offset),
                };
                SlotStyle { x, y, opacity: 1.0 }
            }
        }
    }
}

/// Offsets as fractions of the slot size, plus opacity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotStyle {
    /// Horizontal offset (1.0 = fully off-screen right)
    pub x: f32,
    /// Vertical offset (1.0 = fully off-screen below)
    pub y: f32,
    pub opacity: f32,
}

impl SlotStyle {
    pub const IN_PLACE: SlotStyle = SlotStyle {
        x: 0.0,
        y: 0.0,
        opacity: 1.0,
    };
}

/// Animation phase of one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotPhase {
    Entering { started: Instant },
    Present,
    Exiting { started: Instant },
}

#[derive(Debug, Clone)]
struct SlotState {
    phase: SlotPhase,
    view: Rc<ResolvedView>,
}

/// Enter/exit state of every slot, keyed by stack index
#[derive(Debug, Clone)]
pub struct TransitionLayer {
    transition: Transition,
    slots: BTreeMap<usize, SlotState>,
    initialized: bool,
}

impl TransitionLayer {
    pub fn new(transition: Transition) -> Self {
        Self {
            transition,
            slots: BTreeMap::new(),
            initialized: false,
        }
    }

    /// Configured transition
    pub fn transition(&self) -> Transition {
        self.transition
    }

    /// Reconcile slots with the visible window
    ///
    /// The first sync shows everything in place; later syncs animate indices
    /// that appear or disappear.
    pub fn sync(&mut self, visible: &[Rc<ResolvedView>], now: Instant) {
        let animate = self.initialized && !self.transition.is_none();
        self.initialized = true;

        for (index, view) in visible.iter().enumerate() {
            match self.slots.get_mut(&index) {
                Some(slot) => {
                    if matches!(slot.phase, SlotPhase::Exiting { .. }) {
                        slot.phase = entering(animate, now);
                    }
                    slot.view = view.clone();
                }
                None => {
                    self.slots.insert(
                        index,
                        SlotState {
                            phase: entering(animate, now),
                            view: view.clone(),
                        },
                    );
                }
            }
        }

        let hidden: Vec<usize> = self
            .slots
            .range(visible.len()..)
            .filter(|(_, slot)| !matches!(slot.phase, SlotPhase::Exiting { .. }))
            .map(|(index, _)| *index)
            .collect();

        for index in hidden {
            if animate {
                if let Some(slot) = self.slots.get_mut(&index) {
                    slot.phase = SlotPhase::Exiting { started: now };
                }
            } else {
                self.slots.remove(&index);
            }
        }
    }

    /// Settle finished animations; returns true if anything changed
    pub fn prune(&mut self, now: Instant) -> bool {
        let duration = self.transition.duration();
        let before = self.slots.len();
        let mut settled = false;

        self.slots.retain(|_, slot| match slot.phase {
            SlotPhase::Exiting { started } => now.saturating_duration_since(started) < duration,
            _ => true,
        });

        for slot in self.slots.values_mut() {
            if let SlotPhase::Entering { started } = slot.phase {
                if now.saturating_duration_since(started) >= duration {
                    slot.phase = SlotPhase::Present;
                    settled = true;
                }
            }
        }

        settled || self.slots.len() != before
    }

    /// Phase of a slot
    pub fn phase(&self, index: usize) -> Option<SlotPhase> {
        self.slots.get(&index).map(|slot| slot.phase)
    }

    /// Eased progress of a slot: 0.0 hidden, 1.0 in place
    pub fn progress(&self, index: usize, now: Instant) -> f32 {
        let duration = self.transition.duration();
        let linear = |started: Instant| {
            if duration.is_zero() {
                1.0
            } else {
                now.saturating_duration_since(started).as_secs_f32() / duration.as_secs_f32()
            }
        };

        match self.phase(index) {
            Some(SlotPhase::Entering { started }) => apply_easing(linear(started)),
            Some(SlotPhase::Exiting { started }) => 1.0 - apply_easing(linear(started)),
            Some(SlotPhase::Present) | None => 1.0,
        }
    }

    /// Visual state of a slot
    pub fn style(&self, index: usize, now: Instant) -> SlotStyle {
        self.transition.style(self.progress(index, now))
    }

    /// Horizontal offset fraction of a slot (1.0 = fully off-screen right)
    pub fn offset(&self, index: usize, now: Instant) -> f32 {
        self.style(index, now).x
    }

    /// Check if any slot is entering or exiting
    pub fn is_animating(&self) -> bool {
        self.slots
            .values()
            .any(|slot| !matches!(slot.phase, SlotPhase::Present))
    }

    /// Snapshots of slots that are sliding away
    pub fn exiting(&self) -> Vec<(usize, Rc<ResolvedView>)> {
        self.slots
            .iter()
            .filter(|(_, slot)| matches!(slot.phase, SlotPhase::Exiting { .. }))
            .map(|(index, slot)| (*index, slot.view.clone()))
            .collect()
    }

    /// Number of tracked slots, exiting ones included
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Default for TransitionLayer {
    fn default() -> Self {
        Self::new(Transition::default())
    }
}

fn entering(animate: bool, now: Instant) -> SlotPhase {
    if animate {
        SlotPhase::Entering { started: now }
    } else {
        SlotPhase::Present
    }
}

/// Easing function - ease in out cubic
pub fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Apply easing to progress
pub fn apply_easing(progress: f32) -> f32 {
    ease_in_out_cubic(progress.clamp(0.0, 1.0))
}
