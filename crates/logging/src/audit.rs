//! Keep recent policy decisions in memory.
//!
//! Policy branches log with a `reason` field. [`AuditLayer`] records exactly
//! those events into a bounded buffer shared with its [`AuditLog`] handle, so
//! a host can show or export which branch fired for recent events:
//!
//! ```ignore
//! let audit = AuditLog::new(256);
//! tracing_subscriber::registry().with(audit.layer()).init();
//! // ...
//! for entry in audit.snapshot() { println!("{}", entry.line); }
//! ```

use std::{collections::VecDeque, sync::Arc};

use parking_lot::Mutex;
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::fmt;

/// Field that marks an event as a policy decision.
pub const REASON_FIELD: &str = "reason";

/// One recorded decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    /// Severity level of the event.
    pub level: String,
    /// Event target.
    pub target: String,
    /// Policy branch key, e.g. `digest_mismatch`.
    pub reason: String,
    /// Event message.
    pub message: String,
    /// Full logfmt rendering.
    pub line: String,
}

/// Bounded buffer of recent decisions.
#[derive(Debug, Clone)]
pub struct AuditLog {
    /// Shared entries, oldest first.
    entries: Arc<Mutex<VecDeque<AuditEntry>>>,
    /// Maximum number of retained entries.
    capacity: usize,
}

impl AuditLog {
    /// Log retaining at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    /// Layer feeding this log.
    pub fn layer(&self) -> AuditLayer {
        AuditLayer { log: self.clone() }
    }

    /// Record an entry, evicting the oldest when full.
    pub fn push(&self, entry: AuditEntry) {
        let mut buf = self.entries.lock();
        if buf.len() >= self.capacity {
            buf.pop_front();
        }
        buf.push_back(entry);
    }

    /// Copy of the retained entries, oldest first.
    pub fn snapshot(&self) -> Vec<AuditEntry> {
        self.entries.lock().iter().cloned().collect()
    }

    /// Drop all entries.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

/// Tracing layer that records events carrying a `reason` field.
pub struct AuditLayer {
    /// Destination log.
    log: AuditLog,
}

impl<S> Layer<S> for AuditLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if event.metadata().fields().field(REASON_FIELD).is_none() {
            return;
        }
        let r = fmt::render_event(event);
        let Some(reason) = r.field(REASON_FIELD).map(str::to_string) else {
            return;
        };
        let line = r.to_logfmt();
        self.log.push(AuditEntry {
            level: r.level,
            target: r.target,
            reason,
            message: r.message,
            line,
        });
    }
}
