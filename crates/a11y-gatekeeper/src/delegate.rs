//! The delegate installed on the root node.

use a11y_trust::{Decision, Evaluator};
use tracing::trace;

use crate::host::{AccessibilityDelegate, AccessibilityEvent, DisplayNode, NodeInfo};

/// Forwards to the host defaults on [`Decision::Allow`], suppresses on
/// [`Decision::Block`].
///
/// Every callback runs a fresh evaluation.
#[derive(Debug, Clone)]
pub struct GuardDelegate {
    /// Policy bound to the platform lookups.
    evaluator: Evaluator,
}

impl GuardDelegate {
    /// Delegate consulting `evaluator`.
    pub fn new(evaluator: Evaluator) -> Self {
        Self { evaluator }
    }

    /// The evaluator consulted on every callback.
    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }
}

impl AccessibilityDelegate for GuardDelegate {
    fn on_initialize_node_info(&self, host: &dyn DisplayNode, info: &mut NodeInfo) {
        if self.evaluator.decide() == Decision::Block {
            trace!(node = %host.id(), "node_info_suppressed");
            return;
        }
        host.default_initialize_node_info(info);
    }

    fn on_request_send_event(
        &self,
        host: &dyn DisplayNode,
        child: &dyn DisplayNode,
        event: &AccessibilityEvent,
    ) -> bool {
        if self.evaluator.decide() == Decision::Block {
            trace!(
                node = %host.id(),
                child = %child.id(),
                kind = ?event.kind,
                "event_suppressed"
            );
            return false;
        }
        host.default_request_send_event(child, event)
    }
}
