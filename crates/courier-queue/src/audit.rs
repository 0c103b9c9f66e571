//! Append-only delivery log — one line per attempt outcome.
//!
//! Format: `YYYY-MM-DD HH:MM:SS ; recipient ; subject ; OK|ERROR ; detail`.
//! Logging failures are warnings, never fatal.

use std::io::Write;
use std::path::{Path, PathBuf};

pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Append one outcome line.
    pub fn record(&self, stamp: &str, recipient: &str, subject: &str, success: bool, detail: &str) {
        let status = if success { "OK" } else { "ERROR" };
        let line = format!("{stamp} ; {recipient} ; {subject} ; {status} ; {detail}\n");

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let result = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut f| f.write_all(line.as_bytes()));
        if let Err(e) = result {
            tracing::warn!("⚠️ Could not write audit log {}: {e}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_appends_lines() {
        let dir = std::env::temp_dir().join("courier-audit-test");
        std::fs::remove_dir_all(&dir).ok();
        let log = AuditLog::new(&dir.join("sent.log"));

        log.record("2026-02-12 19:30:00", "a@x.com", "Hello", true, "sent");
        log.record("2026-02-12 19:31:00", "b@x.com", "Hello", false, "boom");

        let content = std::fs::read_to_string(dir.join("sent.log")).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "2026-02-12 19:30:00 ; a@x.com ; Hello ; OK ; sent");
        assert_eq!(lines[1], "2026-02-12 19:31:00 ; b@x.com ; Hello ; ERROR ; boom");
        std::fs::remove_dir_all(&dir).ok();
    }
}
