//! Resolved view data
//!
//! A [`ResolvedView`] is everything needed to render one stack entry. It is
//! produced once per successful resolution and never mutated afterwards, so it
//! is shared as `Rc<ResolvedView>` between the stack, snapshots and exiting
//! transition slots.

use crate::location::Location;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Props handed to a layout frame's component
pub type Props = serde_json::Map<String, serde_json::Value>;

/// Reference to a renderable component, looked up in a component registry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(String);

impl ComponentId {
    /// Create a component reference
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Component name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ComponentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ComponentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One layer of a view's composition (outer shell, inner layout, page)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutFrame {
    /// Route pattern segment this frame was produced for; also its render key
    pub segment: String,
    /// Component rendering this frame
    pub component: ComponentId,
    /// Props loaded for this frame
    #[serde(default)]
    pub props: Props,
}

impl LayoutFrame {
    /// Create a frame with empty props
    pub fn new(segment: impl Into<String>, component: impl Into<ComponentId>) -> Self {
        Self {
            segment: segment.into(),
            component: component.into(),
            props: Props::new(),
        }
    }

    /// Set a single prop
    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    /// Replace all props
    pub fn with_props(mut self, props: Props) -> Self {
        self.props = props;
        self
    }
}

/// Outcome of matching a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewStatus {
    /// A route matched
    #[default]
    Matched,
    /// No route matched; the view is the designated not-found view
    NotFound,
}

/// Fully resolved data for one stack entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedView {
    /// Location this view was resolved for
    pub location: Location,
    /// Layout chain, outermost first
    pub layout_chain: Vec<LayoutFrame>,
    /// Whether a route matched
    #[serde(default)]
    pub status: ViewStatus,
}

impl ResolvedView {
    /// Create a matched view
    pub fn new(location: Location, layout_chain: Vec<LayoutFrame>) -> Self {
        Self {
            location,
            layout_chain,
            status: ViewStatus::Matched,
        }
    }

    /// Create a not-found view
    pub fn not_found(location: Location, layout_chain: Vec<LayoutFrame>) -> Self {
        Self {
            location,
            layout_chain,
            status: ViewStatus::NotFound,
        }
    }

    /// Check if this is the not-found view
    pub fn is_not_found(&self) -> bool {
        self.status == ViewStatus::NotFound
    }

    /// The innermost (page) frame
    pub fn leaf(&self) -> Option<&LayoutFrame> {
        self.layout_chain.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_frame_props() {
        let frame = LayoutFrame::new("/users/:id", "user-page")
            .with_prop("id", 42)
            .with_prop("name", "Ada");

        assert_eq!(frame.component.as_str(), "user-page");
        assert_eq!(frame.props.get("id"), Some(&json!(42)));
        assert_eq!(frame.props.get("name"), Some(&json!("Ada")));
    }

    #[test]
    fn test_view_leaf_and_status() {
        let view = ResolvedView::new(
            Location::path("/users/42"),
            vec![
                LayoutFrame::new("/", "shell"),
                LayoutFrame::new("users/:id", "user-page"),
            ],
        );
        assert_eq!(view.leaf().map(|f| f.component.as_str()), Some("user-page"));
        assert!(!view.is_not_found());

        let missing = ResolvedView::not_found(Location::path("/nope"), Vec::new());
        assert!(missing.is_not_found());
        assert!(missing.leaf().is_none());
    }

    #[test]
    fn test_status_defaults_to_matched_when_absent() {
        let view: ResolvedView =
            serde_json::from_value(json!({"location": {"path": "/"}, "layout_chain": []}))
                .unwrap();
        assert_eq!(view.status, ViewStatus::Matched);
    }
}
