//! Delivery worker — polls the queue and dispatches due jobs.
//!
//! One logical worker, sequential dispatch, blocking sleeps between
//! dispatches (rate limit) and between ticks. The queue is persisted after
//! every single job outcome, so a crash loses at most the in-flight job.
//! A crash between a successful SMTP hand-off and the status write can
//! duplicate that one send on restart: the queue is at-least-once by
//! design, not exactly-once.
//!
//! Delivery and persistence errors never stop the loop; they affect one
//! job or are logged as warnings. The loop has no built-in shutdown signal
//! and runs until the process is terminated.

use std::sync::Arc;
use std::time::Duration;

use courier_core::{ComposeRequest, CourierConfig, DeliveryGateway, MessageComposer};

use crate::audit::AuditLog;
use crate::job::{Job, JobStatus};
use crate::retry::RetryPolicy;
use crate::schedule::{self, DueTime};
use crate::store::JobStore;

pub struct Worker {
    store: JobStore,
    audit: AuditLog,
    retry: RetryPolicy,
    composer: Arc<dyn MessageComposer>,
    gateway: Arc<dyn DeliveryGateway>,
    timezone: String,
    tick_interval: Duration,
    rate_limit: Duration,
}

impl Worker {
    pub fn new(
        config: &CourierConfig,
        composer: Arc<dyn MessageComposer>,
        gateway: Arc<dyn DeliveryGateway>,
    ) -> Self {
        Self {
            store: JobStore::new(&config.queue_path()),
            audit: AuditLog::new(&config.log_path()),
            retry: RetryPolicy::from_config(&config.app),
            composer,
            gateway,
            timezone: config.app.timezone.clone(),
            tick_interval: Duration::from_secs(config.app.tick_seconds),
            rate_limit: Duration::from_secs(config.app.rate_limit_seconds),
        }
    }

    /// Run forever. Stopped only by external process termination.
    pub async fn run(&self) {
        tracing::info!(
            "⏰ Worker started. Queue: {} | tick={}s | rate_limit={}s",
            self.store.path().display(),
            self.tick_interval.as_secs(),
            self.rate_limit.as_secs(),
        );
        loop {
            self.tick().await;
            tokio::time::sleep(self.tick_interval).await;
        }
    }

    /// One polling pass. Returns how many jobs were attempted.
    pub async fn tick(&self) -> usize {
        let mut jobs = self.store.load();
        let now = schedule::now_in(&self.timezone);

        // Malformed jobs fail immediately, before any delivery attempt.
        if self.reject_malformed(&mut jobs, now) {
            self.persist(&jobs);
        }

        schedule::order(&mut jobs);

        let mut attempted = 0;
        for i in 0..jobs.len() {
            if jobs[i].status != JobStatus::Pending {
                continue;
            }
            let due = match DueTime::parse(&jobs[i].scheduled_for) {
                Some(due) => due,
                None => continue,
            };
            if !schedule::is_due(due, now) {
                continue;
            }

            tracing::info!("🔔 Job due: {} -> {}", jobs[i].id, jobs[i].recipient);
            self.dispatch(&mut jobs[i], now).await;
            attempted += 1;

            // Immediate save after each attempt: a crash from here on only
            // loses the next in-flight job.
            self.persist(&jobs);
            tokio::time::sleep(self.rate_limit).await;
        }

        attempted
    }

    /// Mark pending jobs that can never dispatch as failed. Returns true
    /// when anything changed.
    fn reject_malformed(&self, jobs: &mut [Job], now: DueTime) -> bool {
        let mut changed = false;
        for job in jobs.iter_mut() {
            if job.status != JobStatus::Pending {
                continue;
            }
            if job.recipient.trim().is_empty() {
                tracing::warn!("⚠️ Job {} has no recipient, failing it", job.id);
                job.status = JobStatus::Failed;
                job.last_error = "missing recipient".into();
                job.failed_at = now.to_iso_string();
                changed = true;
            } else if DueTime::parse(&job.scheduled_for).is_none() {
                tracing::warn!(
                    "⚠️ Job {} has invalid scheduled_for '{}', failing it",
                    job.id,
                    job.scheduled_for
                );
                job.status = JobStatus::Failed;
                job.last_error = format!("invalid scheduled_for '{}'", job.scheduled_for);
                job.failed_at = now.to_iso_string();
                changed = true;
            }
        }
        changed
    }

    /// Compose and deliver one due job, then apply the retry policy.
    async fn dispatch(&self, job: &mut Job, now: DueTime) {
        let request = ComposeRequest {
            recipient: job.recipient.clone(),
            subject_override: job.subject_override.clone(),
            template_override: job.template_override.clone(),
            variant_index: job.variant_index,
        };

        match self.composer.compose(&request) {
            Ok(email) => match self.gateway.deliver(&email).await {
                Ok(()) => {
                    self.retry.on_success(job, now);
                    tracing::info!("✅ Sent to {} (job {})", job.recipient, job.id);
                    let mut detail = String::from("sent from worker (queue)");
                    if !email.theme_name.is_empty() {
                        detail.push_str(&format!(" | THEME={}", email.theme_name));
                    }
                    if !email.ps_line.is_empty() {
                        detail.push_str(&format!(" | PS={}", email.ps_line));
                    }
                    self.audit
                        .record(&now.log_stamp(), &job.recipient, &email.subject, true, &detail);
                }
                Err(description) => {
                    tracing::warn!("⚠️ Delivery to {} failed: {description}", job.recipient);
                    self.retry.on_failure(job, &description, now);
                    self.audit.record(
                        &now.log_stamp(),
                        &job.recipient,
                        &email.subject,
                        false,
                        &description,
                    );
                }
            },
            Err(e) => {
                let description = e.to_string();
                tracing::warn!("⚠️ Compose for {} failed: {description}", job.recipient);
                self.retry.on_failure(job, &description, now);
                let subject = job.subject_override.clone().unwrap_or_default();
                self.audit
                    .record(&now.log_stamp(), &job.recipient, &subject, false, &description);
            }
        }
    }

    /// Best-effort persist: an I/O failure is a warning, never fatal, and
    /// in-memory state is unchanged — the next write retries naturally.
    fn persist(&self, jobs: &[Job]) {
        if let Err(e) = self.store.replace(jobs) {
            tracing::warn!("⚠️ Failed to persist queue: {e}");
        }
    }
}
