//! Variant selection — which content variant (theme) a recipient gets.
//!
//! The decision is captured at enqueue time and rides on the job, so a
//! retried or worker-processed send renders exactly what was promised.
//! Round-robin is the only strategy with persisted state: a single rotation
//! cursor, read-modified-written on every selection.

use courier_core::config::{VariantStrategy, VariantsConfig};
use courier_core::{CourierError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// The round-robin rotation cursor, persisted independently of jobs.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RotationState {
    #[serde(default)]
    pub next_index: usize,
}

/// File-based store for the rotation cursor. Same atomic tmp-then-rename
/// discipline as the job store.
pub struct RotationStore {
    path: PathBuf,
}

impl RotationStore {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Load the cursor. Missing, unreadable, or corrupt state resets to a
    /// fresh cursor rather than crashing.
    pub fn load(&self) -> RotationState {
        if !self.path.exists() {
            return RotationState::default();
        }
        match std::fs::read_to_string(&self.path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!("⚠️ Corrupt rotation state {}: {e}", self.path.display());
                RotationState::default()
            }),
            Err(e) => {
                tracing::warn!("⚠️ Failed to read {}: {e}", self.path.display());
                RotationState::default()
            }
        }
    }

    /// Atomically persist the cursor.
    pub fn save(&self, state: &RotationState) -> Result<()> {
        let json = serde_json::to_string_pretty(state)
            .map_err(|e| CourierError::Store(format!("serialize rotation state: {e}")))?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CourierError::Store(format!("create {}: {e}", parent.display())))?;
        }

        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, &json)
            .map_err(|e| CourierError::Store(format!("write {}: {e}", tmp.display())))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| CourierError::Store(format!("rename into {}: {e}", self.path.display())))?;
        Ok(())
    }
}

/// Chooses a variant index per recipient.
pub struct VariantSelector<'a> {
    config: &'a VariantsConfig,
    store: RotationStore,
}

impl<'a> VariantSelector<'a> {
    pub fn new(config: &'a VariantsConfig, store: RotationStore) -> Self {
        Self { config, store }
    }

    /// Pick a variant index, or None when variants are disabled or the
    /// theme list is empty (callers render the default, unthemed content).
    ///
    /// An in-range `index_override` (a decision captured earlier) is used
    /// verbatim and no strategy runs; an out-of-range one is ignored.
    pub fn select(&self, recipient: &str, index_override: Option<usize>) -> Option<usize> {
        if !self.config.enabled || self.config.themes.is_empty() {
            return None;
        }
        let n = self.config.themes.len();

        if let Some(idx) = index_override {
            if idx < n {
                return Some(idx);
            }
        }

        let idx = match self.config.strategy {
            VariantStrategy::RoundRobin => {
                let state = self.store.load();
                let idx = state.next_index % n;
                let next = RotationState {
                    next_index: (idx + 1) % n,
                };
                if let Err(e) = self.store.save(&next) {
                    tracing::warn!("⚠️ Failed to persist rotation state: {e}");
                }
                idx
            }
            VariantStrategy::Random => rand::thread_rng().gen_range(0..n),
            VariantStrategy::ByRecipient => stable_index(recipient, n),
        };
        Some(idx)
    }

    /// Name of the theme at `index`, empty when unthemed or out of range.
    pub fn theme_name(&self, index: Option<usize>) -> String {
        index
            .and_then(|i| self.config.themes.get(i))
            .map(|t| t.name.clone())
            .unwrap_or_default()
    }
}

/// Stable index for the by-recipient strategy: a wide hash of the trimmed,
/// lower-cased address, reduced modulo the theme count. Same address (any
/// casing or surrounding whitespace) always lands on the same variant.
fn stable_index(recipient: &str, n: usize) -> usize {
    let normalized = recipient.trim().to_lowercase();
    if normalized.is_empty() {
        return 0;
    }
    let digest = Sha256::digest(normalized.as_bytes());
    let mut wide = [0u8; 16];
    wide.copy_from_slice(&digest[..16]);
    (u128::from_be_bytes(wide) % n as u128) as usize
}
