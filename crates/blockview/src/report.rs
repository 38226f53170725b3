//! Diagnostic attachments.
//!
//! Verification passes hand their results to an [`AttachmentSink`]. The sink
//! is a side channel: nothing it does feeds back into control flow.

use crate::result::ViewResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;
use uuid::Uuid;

/// Outcome an attachment reports on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentStatus {
    /// The attached checks passed
    Passed,
    /// The attached checks failed
    Failed,
}

impl AttachmentStatus {
    /// Status matching a check outcome
    #[must_use]
    pub const fn from_passed(passed: bool) -> Self {
        if passed {
            Self::Passed
        } else {
            Self::Failed
        }
    }
}

impl fmt::Display for AttachmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed => f.write_str("passed"),
            Self::Failed => f.write_str("failed"),
        }
    }
}

/// One diagnostic payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Unique id
    pub id: Uuid,
    /// Short label, e.g. `Passed mandatory checks: 2 of 3`
    pub label: String,
    /// Outcome of the attached checks
    pub status: AttachmentStatus,
    /// Plain-text body
    pub payload: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Attachment {
    /// New attachment stamped now
    #[must_use]
    pub fn new(label: impl Into<String>, status: AttachmentStatus, payload: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
            status,
            payload: payload.into(),
            created_at: Utc::now(),
        }
    }
}

/// Receiver of diagnostic attachments
pub trait AttachmentSink: Send + Sync + fmt::Debug {
    /// Accept an attachment. Fire-and-forget.
    fn attach(&self, attachment: Attachment);
}

/// Writes attachments as `tracing` events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl AttachmentSink for TracingSink {
    fn attach(&self, attachment: Attachment) {
        match attachment.status {
            AttachmentStatus::Passed => tracing::info!(
                id = %attachment.id,
                label = %attachment.label,
                "{}",
                attachment.payload
            ),
            AttachmentStatus::Failed => tracing::warn!(
                id = %attachment.id,
                label = %attachment.label,
                "{}",
                attachment.payload
            ),
        }
    }
}

/// Collects attachments in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    attachments: Mutex<Vec<Attachment>>,
}

impl MemorySink {
    /// Empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Attachment>> {
        self.attachments
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Everything attached so far, oldest first
    #[must_use]
    pub fn attachments(&self) -> Vec<Attachment> {
        self.lock().clone()
    }

    /// Labels of everything attached so far
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.lock().iter().map(|a| a.label.clone()).collect()
    }

    /// Number of attachments
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing has been attached
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop everything collected
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Serialize the collected attachments as a JSON array
    pub fn to_json(&self) -> ViewResult<String> {
        Ok(serde_json::to_string_pretty(&*self.lock())?)
    }
}

impl AttachmentSink for MemorySink {
    fn attach(&self, attachment: Attachment) {
        self.lock().push(attachment);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod memory_sink_tests {
        use super::*;

        #[test]
        fn test_collects_in_order() {
            let sink = MemorySink::new();
            sink.attach(Attachment::new("first", AttachmentStatus::Passed, "a"));
            sink.attach(Attachment::new("second", AttachmentStatus::Failed, "b"));
            assert_eq!(sink.len(), 2);
            assert_eq!(sink.labels(), vec!["first", "second"]);
        }

        #[test]
        fn test_clear() {
            let sink = MemorySink::new();
            sink.attach(Attachment::new("x", AttachmentStatus::Passed, ""));
            sink.clear();
            assert!(sink.is_empty());
        }

        #[test]
        fn test_to_json() {
            let sink = MemorySink::new();
            sink.attach(Attachment::new("label", AttachmentStatus::Failed, "body"));
            let json = sink.to_json().unwrap();
            let parsed: Vec<Attachment> = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, sink.attachments());
            assert!(json.contains("\"failed\""));
        }
    }

    #[test]
    fn test_tracing_sink_accepts_attachments() {
        TracingSink.attach(Attachment::new("l", AttachmentStatus::Passed, "p"));
        TracingSink.attach(Attachment::new("l", AttachmentStatus::Failed, "p"));
    }

    #[test]
    fn test_status_from_outcome() {
        assert_eq!(AttachmentStatus::from_passed(true), AttachmentStatus::Passed);
        assert_eq!(AttachmentStatus::from_passed(false).to_string(), "failed");
    }
}
