//! Retry policy — bounded fixed-delay backoff for failed deliveries.
//!
//! Fixed delay rather than exponential: the state machine stays trivially
//! reproducible in tests and the volume is personal-scale.

use courier_core::config::AppConfig;

use crate::job::{Job, JobStatus};
use crate::schedule::DueTime;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub retry_delay_seconds: u64,
}

impl RetryPolicy {
    pub fn from_config(app: &AppConfig) -> Self {
        Self {
            max_attempts: app.max_retries,
            retry_delay_seconds: app.retry_delay_seconds,
        }
    }

    /// Record a failed attempt. Either reschedules the job one fixed delay
    /// into the future, or — once attempts exceed the bound — moves it to
    /// terminal `failed`.
    pub fn on_failure(&self, job: &mut Job, error: &str, now: DueTime) {
        job.attempts += 1;
        job.last_error = error.to_string();

        if job.attempts > self.max_attempts {
            job.status = JobStatus::Failed;
            job.failed_at = now.to_iso_string();
            return;
        }

        job.scheduled_for = now.plus_seconds(self.retry_delay_seconds).to_iso_string();
        job.status = JobStatus::Pending;
    }

    /// Record a successful delivery. Terminal.
    pub fn on_success(&self, job: &mut Job, now: DueTime) {
        job.status = JobStatus::Sent;
        job.sent_at = now.to_iso_string();
        job.last_error.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule;

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 2,
            retry_delay_seconds: 300,
        }
    }

    fn job() -> Job {
        Job::new("a@x.com", "2026-02-12T10:00:00+00:00".into(), String::new())
    }

    #[test]
    fn test_failure_under_bound_reschedules() {
        let mut job = job();
        let now = DueTime::parse("2026-02-12T11:00:00+00:00").unwrap();
        policy().on_failure(&mut job, "connection reset", now);

        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.attempts, 1);
        assert_eq!(job.last_error, "connection reset");
        assert_eq!(job.scheduled_for, "2026-02-12T11:05:00+00:00");
        assert!(job.failed_at.is_empty());
    }

    #[test]
    fn test_scheduled_for_only_moves_forward() {
        let mut job = job();
        let before = DueTime::parse(&job.scheduled_for).unwrap();
        let now = DueTime::parse("2026-02-12T11:00:00+00:00").unwrap();
        policy().on_failure(&mut job, "x", now);
        let after = DueTime::parse(&job.scheduled_for).unwrap();
        assert!(after > before);
    }

    #[test]
    fn test_failure_past_bound_is_terminal() {
        let mut job = job();
        job.attempts = 2;
        let now = DueTime::parse("2026-02-12T11:00:00+00:00").unwrap();
        policy().on_failure(&mut job, "still down", now);

        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.attempts, 3);
        assert_eq!(job.failed_at, "2026-02-12T11:00:00+00:00");
        // The due time is untouched once terminal.
        assert_eq!(job.scheduled_for, "2026-02-12T10:00:00+00:00");
    }

    #[test]
    fn test_three_failures_with_two_retries_exhaust() {
        let mut job = job();
        let p = policy();
        for i in 0..3u32 {
            let now = schedule::now_in("UTC");
            p.on_failure(&mut job, &format!("attempt {i}"), now);
        }
        assert_eq!(job.attempts, 3);
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.last_error, "attempt 2");
    }

    #[test]
    fn test_success_is_terminal_and_clears_error() {
        let mut job = job();
        job.last_error = "earlier failure".into();
        let now = DueTime::parse("2026-02-12T11:00:00+00:00").unwrap();
        policy().on_success(&mut job, now);

        assert_eq!(job.status, JobStatus::Sent);
        assert_eq!(job.sent_at, "2026-02-12T11:00:00+00:00");
        assert!(job.last_error.is_empty());
    }
}
