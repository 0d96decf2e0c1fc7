//! The display-tree surface the gatekeeper hooks into.
//!
//! A host framework exposes each node's default accessibility behaviour and
//! lets a single [`AccessibilityDelegate`] intercept it. The types here are
//! the minimum the gatekeeper needs; hosts map their own node and event types
//! onto them.

use std::{fmt, sync::Arc};

/// Identifier of a node in the host display tree.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Wrap a host node id.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw host id.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// On-screen bounds in host pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bounds {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

/// An action an assistive service may perform on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeAction {
    /// Activate the node.
    Click,
    /// Activate the node with a long press.
    LongClick,
    /// Move input focus to the node.
    Focus,
    /// Scroll forward.
    ScrollForward,
    /// Scroll backward.
    ScrollBackward,
    /// Replace the node's text.
    SetText,
}

/// Accessibility metadata describing one node.
///
/// The default value is the "opaque" node: nothing is described and nothing
/// can be acted on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeInfo {
    /// Node being described, once populated.
    pub node: Option<NodeId>,
    /// Host widget class.
    pub class_name: Option<String>,
    /// Visible text.
    pub text: Option<String>,
    /// Alternative description for non-textual content.
    pub content_description: Option<String>,
    /// On-screen bounds.
    pub bounds: Option<Bounds>,
    /// Child nodes.
    pub children: Vec<NodeId>,
    /// Actions the node accepts.
    pub actions: Vec<NodeAction>,
    /// Whether the node can take input focus.
    pub focusable: bool,
}

impl NodeInfo {
    /// True when nothing has been populated.
    pub fn is_opaque(&self) -> bool {
        *self == Self::default()
    }
}

/// Kinds of accessibility event a node can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A node was clicked.
    ViewClicked,
    /// A node gained focus.
    ViewFocused,
    /// A node's text changed.
    ViewTextChanged,
    /// A node was scrolled.
    ViewScrolled,
    /// A window or dialog opened.
    WindowStateChanged,
    /// Window content changed.
    WindowContentChanged,
    /// Text to be spoken.
    Announcement,
}

/// An accessibility event on its way out of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessibilityEvent {
    /// Event kind.
    pub kind: EventKind,
    /// Originating node.
    pub source: NodeId,
    /// Text carried by the event.
    pub text: Vec<String>,
}

impl AccessibilityEvent {
    /// Event without text.
    pub fn new(kind: EventKind, source: NodeId) -> Self {
        Self {
            kind,
            source,
            text: Vec::new(),
        }
    }

    /// Add a text fragment.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text.push(text.into());
        self
    }
}

/// Interception table a host invokes in place of its default behaviour.
pub trait AccessibilityDelegate: Send + Sync {
    /// Populate `info` for `host`. Leaving `info` untouched reports the node as
    /// opaque.
    fn on_initialize_node_info(&self, host: &dyn DisplayNode, info: &mut NodeInfo);

    /// Decide whether `event` from `child` leaves `host`. Returns whether the
    /// event was sent.
    fn on_request_send_event(
        &self,
        host: &dyn DisplayNode,
        child: &dyn DisplayNode,
        event: &AccessibilityEvent,
    ) -> bool;
}

/// A node of the host display tree.
pub trait DisplayNode {
    /// Node id.
    fn id(&self) -> NodeId;

    /// Route this node's accessibility callbacks through `delegate`.
    fn set_accessibility_delegate(&self, delegate: Arc<dyn AccessibilityDelegate>);

    /// Platform default metadata population.
    fn default_initialize_node_info(&self, info: &mut NodeInfo);

    /// Platform default event dispatch. Returns whether the event was sent.
    fn default_request_send_event(&self, child: &dyn DisplayNode, event: &AccessibilityEvent)
    -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_info_is_opaque() {
        assert!(NodeInfo::default().is_opaque());
        let info = NodeInfo {
            focusable: true,
            ..NodeInfo::default()
        };
        assert!(!info.is_opaque());
    }

    #[test]
    fn event_builder_collects_text() {
        let ev = AccessibilityEvent::new(EventKind::Announcement, NodeId::new(4))
            .with_text("a")
            .with_text("b");
        assert_eq!(ev.text, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(ev.source.get(), 4);
    }
}
