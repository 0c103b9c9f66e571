//! Enqueue — schedule mode. Writes jobs into the queue and returns without
//! sending anything; a worker picks them up when they come due.

use courier_core::{CourierConfig, CourierError, Result};

use crate::job::Job;
use crate::schedule;
use crate::store::JobStore;
use crate::variants::{RotationStore, VariantSelector};

/// Create one pending job per configured recipient, each with a freshly
/// captured variant decision, and append them to the queue with a full
/// atomic replace. Returns the jobs that were added.
pub fn enqueue_from_config(config: &CourierConfig) -> Result<Vec<Job>> {
    let recipients = config.email.recipients();
    if recipients.is_empty() {
        return Err(CourierError::Config("no recipients in email.to".into()));
    }

    let scheduled = schedule::scheduled_from_config(&config.email.scheduled_for, &config.app.timezone)?;

    let store = JobStore::new(&config.queue_path());
    let mut jobs = store.load();
    let selector = VariantSelector::new(
        &config.variants,
        RotationStore::new(&config.state_path()),
    );

    let created_at = schedule::now_in(&config.app.timezone).to_iso_string();
    let mut added = Vec::with_capacity(recipients.len());

    for recipient in &recipients {
        let variant_index = selector.select(recipient, None);
        let mut job = Job::new(recipient, scheduled.clone(), created_at.clone());
        job.variant_index = variant_index;
        job.variant_name = selector.theme_name(variant_index);
        if !config.email.subject.is_empty() {
            job.subject_override = Some(config.email.subject.clone());
        }
        if !config.email.html_template.is_empty() {
            job.template_override = Some(config.email.html_template.clone());
        }

        tracing::info!(
            "📅 Enqueued {recipient} @ {scheduled}{}",
            if job.variant_name.is_empty() {
                String::new()
            } else {
                format!(" | THEME={}", job.variant_name)
            }
        );
        added.push(job.clone());
        jobs.push(job);
    }

    store.replace(&jobs)?;
    tracing::info!("💾 Queue saved to {}", store.path().display());
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::config::{Theme, VariantStrategy};
    use crate::job::JobStatus;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        std::fs::remove_dir_all(&dir).ok();
        std::fs::create_dir_all(&dir).ok();
        dir
    }

    fn config_in(dir: &PathBuf) -> CourierConfig {
        let mut config = CourierConfig::default();
        config.base_dir = dir.clone();
        config.app.timezone = "UTC".into();
        config.email.to = vec!["a@x.com".into(), "b@x.com".into()];
        config.email.subject = "Hello".into();
        config.email.scheduled_for = "2026-02-12 19:30".into();
        config.variants.enabled = true;
        config.variants.strategy = VariantStrategy::RoundRobin;
        config.variants.themes = vec![
            Theme { name: "light".into(), replace: BTreeMap::new() },
            Theme { name: "dark".into(), replace: BTreeMap::new() },
        ];
        config
    }

    #[test]
    fn test_enqueue_creates_one_job_per_recipient() {
        let dir = scratch("courier-enqueue-basic");
        let config = config_in(&dir);

        let added = enqueue_from_config(&config).unwrap();
        assert_eq!(added.len(), 2);

        let loaded = JobStore::new(&config.queue_path()).load();
        assert_eq!(loaded.len(), 2);
        for job in &loaded {
            assert_eq!(job.status, JobStatus::Pending);
            assert_eq!(job.scheduled_for, "2026-02-12T19:30:00+00:00");
            assert_eq!(job.subject_override.as_deref(), Some("Hello"));
            assert!(!job.created_at.is_empty());
        }
        // Round-robin captured at enqueue time, in recipient order.
        assert_eq!(loaded[0].variant_index, Some(0));
        assert_eq!(loaded[0].variant_name, "light");
        assert_eq!(loaded[1].variant_index, Some(1));
        assert_eq!(loaded[1].variant_name, "dark");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_enqueue_appends_to_existing_queue() {
        let dir = scratch("courier-enqueue-append");
        let config = config_in(&dir);

        let store = JobStore::new(&config.queue_path());
        let existing = Job::new("old@x.com", "2026-01-01T00:00:00".into(), String::new());
        let existing_id = existing.id.clone();
        store.replace(&[existing]).unwrap();

        enqueue_from_config(&config).unwrap();
        let loaded = store.load();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded[0].id, existing_id);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_enqueue_rejects_missing_inputs() {
        let dir = scratch("courier-enqueue-invalid");
        let mut config = config_in(&dir);
        config.email.to.clear();
        assert!(enqueue_from_config(&config).is_err());

        let mut config = config_in(&dir);
        config.email.scheduled_for = String::new();
        assert!(enqueue_from_config(&config).is_err());
        std::fs::remove_dir_all(&dir).ok();
    }
}
