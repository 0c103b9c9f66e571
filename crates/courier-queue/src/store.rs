//! File-based job store — the whole queue lives in one JSON document.
//!
//! Every persist serializes the full collection and replaces the file
//! atomically (write to `<path>.tmp`, then rename), so a crash mid-write
//! never corrupts the previously committed state. No incremental writes.
//!
//! Single-writer precondition: exactly one process (the worker or the
//! enqueue command) mutates a given queue file at a time.

use courier_core::{CourierError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::job::Job;

#[derive(Debug, Default, Deserialize)]
struct QueueDocument {
    #[serde(default)]
    jobs: Vec<Job>,
}

#[derive(Serialize)]
struct QueueDocumentRef<'a> {
    jobs: &'a [Job],
}

/// File-based job store.
pub struct JobStore {
    path: PathBuf,
}

impl JobStore {
    /// Create a store bound to the given queue file.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all jobs. A missing file is an empty queue; an unreadable or
    /// corrupt file is logged and treated as empty rather than crashing
    /// the worker.
    pub fn load(&self) -> Vec<Job> {
        if !self.path.exists() {
            return Vec::new();
        }
        match std::fs::read_to_string(&self.path) {
            Ok(json) => match serde_json::from_str::<QueueDocument>(&json) {
                Ok(doc) => doc.jobs,
                Err(e) => {
                    tracing::warn!("⚠️ Failed to parse {}: {e}", self.path.display());
                    Vec::new()
                }
            },
            Err(e) => {
                tracing::warn!("⚠️ Failed to read {}: {e}", self.path.display());
                Vec::new()
            }
        }
    }

    /// Atomically replace the queue with the given collection.
    pub fn replace(&self, jobs: &[Job]) -> Result<()> {
        let json = serde_json::to_string_pretty(&QueueDocumentRef { jobs })
            .map_err(|e| CourierError::Store(format!("serialize queue: {e}")))?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CourierError::Store(format!("create {}: {e}", parent.display())))?;
        }

        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, &json)
            .map_err(|e| CourierError::Store(format!("write {}: {e}", tmp.display())))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| CourierError::Store(format!("rename into {}: {e}", self.path.display())))?;

        tracing::debug!("💾 Saved {} job(s) to {}", jobs.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobStatus;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        std::fs::remove_dir_all(&dir).ok();
        std::fs::create_dir_all(&dir).ok();
        dir
    }

    #[test]
    fn test_load_missing_is_empty() {
        let dir = scratch("courier-store-missing");
        let store = JobStore::new(&dir.join("queue.json"));
        assert!(store.load().is_empty());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_replace_then_load_round_trips() {
        let dir = scratch("courier-store-roundtrip");
        let store = JobStore::new(&dir.join("queue.json"));

        let mut job = Job::new(
            "a@x.com",
            "2026-02-12T19:30:00+01:00".into(),
            "2026-02-10T09:00:00+01:00".into(),
        );
        job.status = JobStatus::Sent;
        job.attempts = 1;
        job.sent_at = "2026-02-12T19:31:00+01:00".into();
        job.variant_index = Some(1);
        job.variant_name = "ocean".into();
        job.subject_override = Some("Hi".into());

        store.replace(std::slice::from_ref(&job)).unwrap();
        let loaded = store.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, job.id);
        assert_eq!(loaded[0].status, JobStatus::Sent);
        assert_eq!(loaded[0].sent_at, job.sent_at);
        assert_eq!(loaded[0].variant_index, Some(1));
        assert_eq!(loaded[0].variant_name, "ocean");
        assert_eq!(loaded[0].subject_override.as_deref(), Some("Hi"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_replace_leaves_no_tmp_file() {
        let dir = scratch("courier-store-tmp");
        let path = dir.join("queue.json");
        let store = JobStore::new(&path);
        store.replace(&[Job::new("a@x.com", String::new(), String::new())]).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_replace_overwrites_previous_state() {
        let dir = scratch("courier-store-overwrite");
        let store = JobStore::new(&dir.join("queue.json"));
        store.replace(&[
            Job::new("a@x.com", String::new(), String::new()),
            Job::new("b@x.com", String::new(), String::new()),
        ]).unwrap();
        store.replace(&[Job::new("c@x.com", String::new(), String::new())]).unwrap();
        let loaded = store.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].recipient, "c@x.com");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let dir = scratch("courier-store-corrupt");
        let path = dir.join("queue.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = JobStore::new(&path);
        assert!(store.load().is_empty());
        std::fs::remove_dir_all(&dir).ok();
    }
}
