//! Due-time computation — when a job becomes eligible for dispatch.
//!
//! Scheduled times may be timezone-aware or naive, depending on whether the
//! zone database was available when the job was enqueued. Rather than making
//! mixed values an error, everything is normalized into [`DueTime`] at the
//! parsing boundary: two aware values compare as absolute instants, and as
//! soon as one side is naive the comparison drops offsets and uses the
//! wall-clock projection. Unparseable values sort after everything else and
//! are never due.

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDateTime, Offset, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use courier_core::{CourierError, Result};
use std::cmp::Ordering;

use crate::job::Job;

/// Canonical comparison form of a scheduled instant: the naive wall-clock
/// value plus the offset it was written with, when known.
#[derive(Debug, Clone, Copy)]
pub struct DueTime {
    naive: NaiveDateTime,
    offset: Option<FixedOffset>,
}

impl DueTime {
    /// Sorts after every parseable time. Used for jobs whose
    /// `scheduled_for` cannot be parsed.
    pub const MAX: DueTime = DueTime {
        naive: NaiveDateTime::MAX,
        offset: None,
    };

    /// Parse a scheduled-time string.
    ///
    /// Accepts RFC 3339 with offset ("2026-02-12T19:30:00+01:00"), naive
    /// ISO ("2026-02-12T19:30:00", with or without seconds), and the
    /// config shorthand "2026-02-12 19:30". Returns None for anything else.
    pub fn parse(raw: &str) -> Option<DueTime> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(DueTime {
                naive: dt.naive_local(),
                offset: Some(*dt.offset()),
            });
        }

        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
                return Some(DueTime {
                    naive,
                    offset: None,
                });
            }
        }

        None
    }

    /// Whether this value carried an explicit UTC offset.
    pub fn has_offset(&self) -> bool {
        self.offset.is_some()
    }

    /// The same instant moved forward. Keeps the offset flag.
    pub fn plus_seconds(&self, seconds: u64) -> DueTime {
        DueTime {
            naive: self.naive + Duration::seconds(seconds as i64),
            offset: self.offset,
        }
    }

    /// Render back to the string form jobs store: RFC 3339 when the offset
    /// is known, naive ISO otherwise.
    pub fn to_iso_string(&self) -> String {
        match self.offset {
            Some(offset) => match offset.from_local_datetime(&self.naive).single() {
                Some(dt) => dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, false),
                None => self.naive.format("%Y-%m-%dT%H:%M:%S").to_string(),
            },
            None => self.naive.format("%Y-%m-%dT%H:%M:%S").to_string(),
        }
    }

    /// Human-readable stamp for the audit log.
    pub fn log_stamp(&self) -> String {
        self.naive.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

impl Ord for DueTime {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.offset, other.offset) {
            // Both aware: compare absolute instants.
            (Some(a), Some(b)) => {
                let lhs = self.naive - Duration::seconds(a.local_minus_utc() as i64);
                let rhs = other.naive - Duration::seconds(b.local_minus_utc() as i64);
                lhs.cmp(&rhs)
            }
            // Mixed or both naive: compare wall-clock projections.
            _ => self.naive.cmp(&other.naive),
        }
    }
}

impl PartialOrd for DueTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for DueTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DueTime {}

/// True iff the job's scheduled instant has passed.
pub fn is_due(scheduled: DueTime, now: DueTime) -> bool {
    scheduled <= now
}

/// Stable ascending sort by scheduled time; unparseable values sort last.
pub fn order(jobs: &mut [Job]) {
    jobs.sort_by_key(|j| DueTime::parse(&j.scheduled_for).unwrap_or(DueTime::MAX));
}

/// Current instant in the configured zone. An unresolvable zone degrades to
/// naive local time instead of failing.
pub fn now_in(tz_name: &str) -> DueTime {
    match tz_name.parse::<Tz>() {
        Ok(tz) => {
            let now = Utc::now().with_timezone(&tz);
            let naive = now.naive_local();
            DueTime {
                naive: naive.with_nanosecond(0).unwrap_or(naive),
                offset: Some(now.offset().fix()),
            }
        }
        Err(_) => {
            tracing::warn!("⚠️ Unknown timezone '{tz_name}', falling back to naive local time");
            let naive = Local::now().naive_local();
            DueTime {
                naive: naive.with_nanosecond(0).unwrap_or(naive),
                offset: None,
            }
        }
    }
}

/// Parse the config-level `scheduled_for` ("YYYY-MM-DD HH:MM") into the
/// string form stored on jobs: RFC 3339 with the zone's offset when the
/// zone resolves, naive ISO otherwise.
pub fn scheduled_from_config(raw: &str, tz_name: &str) -> Result<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(CourierError::Config(
            "email.scheduled_for is missing (e.g. '2026-02-12 19:30')".into(),
        ));
    }

    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M")
        .map_err(|e| CourierError::Config(format!("invalid email.scheduled_for '{raw}': {e}")))?;

    if let Ok(tz) = tz_name.parse::<Tz>() {
        if let Some(dt) = tz.from_local_datetime(&naive).earliest() {
            return Ok(dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, false));
        }
    }

    Ok(naive.format("%Y-%m-%dT%H:%M:%S").to_string())
}
