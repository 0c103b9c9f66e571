//! Job definitions — the unit of scheduled delivery work.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One scheduled, recipient-specific delivery task.
///
/// Jobs are never deleted; terminal ones stay in the queue file for audit.
/// Timestamps and the scheduled time are kept as the strings they were
/// written with so the persisted document round-trips byte-for-byte; the
/// scheduling module parses `scheduled_for` at the comparison boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Unique job ID, assigned at creation, immutable.
    pub id: String,
    /// Destination address. Empty means the job can never dispatch.
    pub recipient: String,
    /// When the job becomes due. RFC 3339 with or without offset, or
    /// "YYYY-MM-DD HH:MM". Only ever moved forward, by the retry policy.
    pub scheduled_for: String,
    pub status: JobStatus,
    /// Delivery attempts so far. Only increases.
    #[serde(default)]
    pub attempts: u32,
    /// Most recent failure description, empty when none.
    #[serde(default)]
    pub last_error: String,
    /// Per-job subject, applied only while composing this job's message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_override: Option<String>,
    /// Per-job template path, same scope as `subject_override`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_override: Option<String>,
    /// Variant decision captured at enqueue time. None = unthemed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_index: Option<usize>,
    /// Name of the captured variant, for operators reading the queue file.
    #[serde(default)]
    pub variant_name: String,
    pub created_at: String,
    #[serde(default)]
    pub sent_at: String,
    #[serde(default)]
    pub failed_at: String,
}

/// Job status. `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Sent,
    Failed,
}

impl JobStatus {
    /// Terminal states never transition again.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Pending)
    }
}

impl Job {
    /// Create a pending job for one recipient.
    pub fn new(recipient: &str, scheduled_for: String, created_at: String) -> Self {
        Self {
            id: format!("job-{}", Uuid::new_v4()),
            recipient: recipient.to_string(),
            scheduled_for,
            status: JobStatus::Pending,
            attempts: 0,
            last_error: String::new(),
            subject_override: None,
            template_override: None,
            variant_index: None,
            variant_name: String::new(),
            created_at,
            sent_at: String::new(),
            failed_at: String::new(),
        }
    }
}
