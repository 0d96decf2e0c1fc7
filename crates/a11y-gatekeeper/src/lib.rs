#![warn(missing_docs)]

//! Gate a display tree's accessibility traffic on the trust policy.
//!
//! [`attach`] installs a [`GuardDelegate`] on the root node of a host display
//! tree. From then on, every metadata query and every child event consults the
//! [`Evaluator`]:
//!
//! - on allow, the host's default behaviour runs unchanged;
//! - on block, metadata is left empty and events report "not sent".
//!
//! Blocking is silent by design of the host contract: an observer sees an
//! opaque tree and no events.

use std::sync::Arc;

use a11y_trust::Evaluator;
use tracing::{debug, warn};

mod delegate;
pub mod host;
pub mod test_support;

pub use delegate::GuardDelegate;
pub use host::{
    AccessibilityDelegate, AccessibilityEvent, Bounds, DisplayNode, EventKind, NodeAction, NodeId,
    NodeInfo,
};

/// Install the gatekeeper on `root`.
///
/// An absent root is logged and ignored. Attaching twice installs a second
/// delegate over the first; nothing detects it.
///
/// Returns the installed delegate, or `None` when there was no root.
pub fn attach(
    root: Option<&dyn DisplayNode>,
    evaluator: Evaluator,
) -> Option<Arc<GuardDelegate>> {
    let Some(root) = root else {
        warn!("cannot attach accessibility gatekeeper: no root node");
        return None;
    };
    let delegate = Arc::new(GuardDelegate::new(evaluator));
    root.set_accessibility_delegate(delegate.clone());
    debug!(node = %root.id(), "accessibility gatekeeper attached");
    Some(delegate)
}
