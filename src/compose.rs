//! Layout composition
//!
//! A view's layout chain is folded from the innermost frame outwards: the
//! page is rendered first with no child, then each enclosing layout receives
//! the result as its child. The fold is generic over the node type so the
//! same code drives GPUI elements and the plain [`RenderNode`] tree used for
//! server rendering and tests.

use crate::scroll::{EdgeHooks, ScrollEdgeController};
use crate::state::NavigationStack;
use crate::view::{ComponentId, LayoutFrame, Props, ResolvedView};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Fold a layout chain into one nested node
///
/// `hooks` supplies the scroll-edge hooks for each frame and `render` builds
/// one node from a frame, its already-built child and its hooks. Returns
/// `None` for an empty chain.
///
/// # Example
///
/// ```
/// use gpui_stack_router::{compose, EdgeHooks, LayoutFrame, Location, ResolvedView};
///
/// let view = ResolvedView::new(
///     Location::path("/inbox"),
///     vec![LayoutFrame::new("/", "shell"), LayoutFrame::new("inbox", "inbox")],
/// );
///
/// let markup = compose(
///     &view,
///     |frame| EdgeHooks::detached(frame.segment.clone()),
///     |frame, child: Option<String>, _hooks| {
///         format!("<{}>{}</{}>", frame.component, child.unwrap_or_default(), frame.component)
///     },
/// );
/// assert_eq!(markup.as_deref(), Some("<shell><inbox></inbox></shell>"));
/// ```
pub fn compose<N, H, R>(view: &ResolvedView, mut hooks: H, mut render: R) -> Option<N>
where
    H: FnMut(&LayoutFrame) -> EdgeHooks,
    R: FnMut(&LayoutFrame, Option<N>, &EdgeHooks) -> N,
{
    view.layout_chain
        .iter()
        .rev()
        .fold(None, |child, frame| {
            let frame_hooks = hooks(frame);
            Some(render(frame, child, &frame_hooks))
        })
}

/// Entries rendered for a stack: everything up to the current index
pub fn visible_window(stack: &NavigationStack) -> &[Rc<ResolvedView>] {
    stack.visible()
}

/// Framework-free render tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderNode {
    pub segment: String,
    pub component: ComponentId,
    pub props: Props,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child: Option<Box<RenderNode>>,
}

impl RenderNode {
    fn from_frame(frame: &LayoutFrame, child: Option<RenderNode>) -> Self {
        Self {
            segment: frame.segment.clone(),
            component: frame.component.clone(),
            props: frame.props.clone(),
            child: child.map(Box::new),
        }
    }

    /// Number of nested nodes, including this one
    pub fn depth(&self) -> usize {
        1 + self.child.as_ref().map_or(0, |child| child.depth())
    }

    /// Components from the outermost node inwards
    pub fn components(&self) -> Vec<&ComponentId> {
        let mut out = vec![&self.component];
        let mut node = self;
        while let Some(child) = node.child.as_deref() {
            out.push(&child.component);
            node = child;
        }
        out
    }

    /// Innermost node
    pub fn leaf(&self) -> &RenderNode {
        match self.child.as_deref() {
            Some(child) => child.leaf(),
            None => self,
        }
    }
}

/// Compose a mounted slot, binding each frame's hooks to `controller`
pub fn compose_slot(view: &ResolvedView, controller: &ScrollEdgeController) -> Option<RenderNode> {
    compose(
        view,
        |frame| controller.hooks(frame.segment.clone()),
        |frame, child, _| RenderNode::from_frame(frame, child),
    )
}

/// Compose a view with no scroll slot, as done when rendering on a server
pub fn compose_static(view: &ResolvedView) -> Option<RenderNode> {
    compose(
        view,
        |frame| EdgeHooks::detached(frame.segment.clone()),
        |frame, child, _| RenderNode::from_frame(frame, child),
    )
}

/// Compose every visible entry of a stack, bottom first
pub fn compose_window(stack: &NavigationStack) -> Vec<(usize, Option<RenderNode>)> {
    visible_window(stack)
        .iter()
        .enumerate()
        .map(|(index, view)| (index, compose_static(view)))
        .collect()
}
