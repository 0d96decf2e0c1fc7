//! In-memory display nodes for tests.
//! These helpers are public so integration tests and downstream crates can
//! exercise the gatekeeper without a real UI toolkit.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use parking_lot::Mutex;

use crate::host::{
    AccessibilityDelegate, AccessibilityEvent, Bounds, DisplayNode, NodeAction, NodeId, NodeInfo,
};

/// A display node whose default behaviour populates fixed metadata and
/// records dispatched events.
pub struct TestNode {
    /// Node id.
    id: NodeId,
    /// Widget class reported by the default population.
    class_name: String,
    /// Visible text reported by the default population.
    text: Option<String>,
    /// Child ids reported by the default population.
    children: Vec<NodeId>,
    /// Installed delegate, if any.
    delegate: Mutex<Option<Arc<dyn AccessibilityDelegate>>>,
    /// Number of times a delegate was installed.
    installs: AtomicUsize,
    /// Events the default dispatch sent.
    sent: Mutex<Vec<AccessibilityEvent>>,
}

impl TestNode {
    /// Node with the given id and widget class.
    pub fn new(id: u64, class_name: &str) -> Self {
        Self {
            id: NodeId::new(id),
            class_name: class_name.to_string(),
            text: None,
            children: Vec::new(),
            delegate: Mutex::new(None),
            installs: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Set the visible text.
    #[must_use]
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    /// Add a child id.
    #[must_use]
    pub fn with_child(mut self, id: u64) -> Self {
        self.children.push(NodeId::new(id));
        self
    }

    /// Whether a delegate is installed.
    pub fn has_delegate(&self) -> bool {
        self.delegate.lock().is_some()
    }

    /// Number of delegate installations.
    pub fn delegate_installs(&self) -> usize {
        self.installs.load(Ordering::SeqCst)
    }

    /// What the host does when an assistive service queries this node.
    pub fn node_info(&self) -> NodeInfo {
        let mut info = NodeInfo::default();
        let delegate = self.delegate.lock().clone();
        match delegate {
            Some(d) => d.on_initialize_node_info(self, &mut info),
            None => self.default_initialize_node_info(&mut info),
        }
        info
    }

    /// What the host does when `child` asks this node to send `event`.
    pub fn request_send_event(&self, child: &dyn DisplayNode, event: &AccessibilityEvent) -> bool {
        let delegate = self.delegate.lock().clone();
        match delegate {
            Some(d) => d.on_request_send_event(self, child, event),
            None => self.default_request_send_event(child, event),
        }
    }

    /// Events that left the tree.
    pub fn sent_events(&self) -> Vec<AccessibilityEvent> {
        self.sent.lock().clone()
    }
}

impl DisplayNode for TestNode {
    fn id(&self) -> NodeId {
        self.id
    }

    fn set_accessibility_delegate(&self, delegate: Arc<dyn AccessibilityDelegate>) {
        self.installs.fetch_add(1, Ordering::SeqCst);
        *self.delegate.lock() = Some(delegate);
    }

    fn default_initialize_node_info(&self, info: &mut NodeInfo) {
        info.node = Some(self.id);
        info.class_name = Some(self.class_name.clone());
        info.text = self.text.clone();
        info.bounds = Some(Bounds {
            x: 0,
            y: 0,
            width: 100,
            height: 40,
        });
        info.children = self.children.clone();
        info.actions = vec![NodeAction::Click, NodeAction::Focus];
        info.focusable = true;
    }

    fn default_request_send_event(
        &self,
        _child: &dyn DisplayNode,
        event: &AccessibilityEvent,
    ) -> bool {
        self.sent.lock().push(event.clone());
        true
    }
}
