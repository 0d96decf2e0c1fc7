//! Render `tracing` events into concise logfmt strings.
//!
//! Extracts level, target and message from a `tracing::Event`, and keeps the
//! remaining fields so callers can pick out structured values such as the
//! policy `reason`.

use std::fmt::{Debug, Write};

use tracing::{
    Event,
    field::{Field, Visit},
};

/// Rendered fields extracted from a tracing Event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLog {
    /// Severity level (e.g., INFO, WARN) for the event.
    pub level: String,
    /// Event target (typically the module path).
    pub target: String,
    /// Human-readable message, or rendered `key=value` pairs when the event has none.
    pub message: String,
    /// Non-message fields in recording order.
    pub fields: Vec<(String, String)>,
}

impl RenderedLog {
    /// Value of the field `name`, if recorded.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Single-line logfmt rendering: `level=.. target=.. msg=".." k=v ..`.
    pub fn to_logfmt(&self) -> String {
        let mut out = format!(
            "level={} target={} msg={:?}",
            self.level, self.target, self.message
        );
        for (k, v) in &self.fields {
            let _ignored = write!(&mut out, " {}={:?}", k, v);
        }
        out
    }
}

/// Field visitor collecting the message and the remaining fields.
#[derive(Default)]
struct FieldVisitor {
    /// Captured `message` field, if present.
    msg: Option<String>,
    /// Remaining fields as `(name, value)`.
    fields: Vec<(String, String)>,
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.msg = Some(value.to_string());
        } else {
            self.fields.push((field.name().to_string(), value.to_string()));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        if field.name() == "message" {
            self.msg = Some(format!("{:?}", value));
        } else {
            self.fields.push((field.name().to_string(), format!("{:?}", value)));
        }
    }
}

/// Extract level, target, message and fields from a tracing Event.
///
/// If the event contains a `message` field, it becomes the message; otherwise
/// the message is the `key=value` rendering of the remaining fields.
pub fn render_event(event: &Event<'_>) -> RenderedLog {
    let meta = event.metadata();
    let mut vis = FieldVisitor::default();
    event.record(&mut vis);
    let message = vis.msg.unwrap_or_else(|| {
        let mut s = String::new();
        for (k, v) in &vis.fields {
            let _ignored = write!(&mut s, "{}={} ", k, v);
        }
        s.trim_end().to_string()
    });
    RenderedLog {
        level: meta.level().to_string(),
        target: meta.target().to_string(),
        message,
        fields: vis.fields,
    }
}
