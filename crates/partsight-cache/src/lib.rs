//! File-backed cache for analysis results.
//!
//! One JSON entry per query fingerprint plus a sidecar attempt marker:
//!
//! - `<fingerprint>.json` holds `{ timestamp, result }`, read by
//!   [`AnalysisCache::get`] until the TTL elapses (default 24 h), then
//!   deleted lazily on the read that observes expiry.
//! - `<fingerprint>.attempt` holds the RFC 3339 time of the last upstream
//!   attempt, read by [`AnalysisCache::is_throttled`]. Tracked separately
//!   from the entry so TTL eviction cannot disarm the throttle and failed
//!   attempts throttle too.
//!
//! Writes are best-effort: failures are logged and swallowed, never
//! surfaced to the analysis caller. Entries live one file per key, so
//! concurrent access to different fingerprints cannot corrupt; same-key
//! races are last-writer-wins.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use partsight_core::AnalysisResult;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cache entry serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// On-disk entry shape. Round-trips the nested patent array losslessly.
#[derive(Debug, Serialize, Deserialize)]
struct CachedEntry {
    timestamp: DateTime<Utc>,
    result: AnalysisResult,
}

/// Durable key-value cache for prior analysis results.
pub struct AnalysisCache {
    dir: PathBuf,
    ttl: Duration,
    throttle: Duration,
}

impl AnalysisCache {
    /// Open (and create if needed) a cache rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>, ttl_hours: u64, throttle_minutes: u64) -> Result<Self, CacheError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            ttl: Duration::hours(ttl_hours as i64),
            throttle: Duration::minutes(throttle_minutes as i64),
        })
    }

    /// Cached result for `fingerprint`, if present and not TTL-expired.
    ///
    /// Expired and corrupted entries are deleted on the spot and reported
    /// as a miss.
    pub fn get(&self, fingerprint: &str) -> Option<AnalysisResult> {
        let path = self.entry_path(fingerprint);
        let raw = fs::read_to_string(&path).ok()?;

        let entry: CachedEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(err) => {
                warn!(fingerprint, %err, "removing corrupted cache entry");
                remove_quietly(&path);
                return None;
            }
        };

        if Utc::now() - entry.timestamp > self.ttl {
            debug!(fingerprint, "cache entry expired");
            remove_quietly(&path);
            return None;
        }

        Some(entry.result)
    }

    /// Persist `result` for `fingerprint`, overwriting any prior entry,
    /// and refresh the throttle marker.
    ///
    /// Best-effort: write failures are logged and swallowed.
    pub fn put(&self, fingerprint: &str, result: &AnalysisResult) {
        let entry = CachedEntry {
            timestamp: Utc::now(),
            result: result.clone(),
        };
        match serde_json::to_string(&entry) {
            Ok(json) => {
                if let Err(err) = fs::write(self.entry_path(fingerprint), json) {
                    warn!(fingerprint, %err, "failed to write cache entry");
                }
            }
            Err(err) => warn!(fingerprint, %err, "failed to serialize cache entry"),
        }
        self.mark_attempt(fingerprint);
    }

    /// Stamp the throttle marker for `fingerprint` with the current time.
    ///
    /// Called before every live upstream call, so failed attempts arm the
    /// throttle without creating a cache entry.
    pub fn mark_attempt(&self, fingerprint: &str) {
        let path = self.attempt_path(fingerprint);
        if let Err(err) = fs::write(&path, Utc::now().to_rfc3339()) {
            warn!(fingerprint, %err, "failed to write attempt marker");
        }
    }

    /// True iff the last attempt for `fingerprint` is younger than the
    /// throttle window, regardless of cache TTL state.
    pub fn is_throttled(&self, fingerprint: &str) -> bool {
        let raw = match fs::read_to_string(self.attempt_path(fingerprint)) {
            Ok(raw) => raw,
            Err(_) => return false,
        };
        match DateTime::parse_from_rfc3339(raw.trim()) {
            Ok(at) => Utc::now() - at.with_timezone(&Utc) < self.throttle,
            Err(_) => false,
        }
    }

    /// Remove every entry and marker. Administrative operation.
    pub fn clear(&self) -> Result<(), CacheError> {
        fs::remove_dir_all(&self.dir)?;
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    fn entry_path(&self, fingerprint: &str) -> PathBuf {
        self.dir.join(format!("{fingerprint}.json"))
    }

    fn attempt_path(&self, fingerprint: &str) -> PathBuf {
        self.dir.join(format!("{fingerprint}.attempt"))
    }

    #[cfg(test)]
    fn write_entry_at(&self, fingerprint: &str, result: &AnalysisResult, timestamp: DateTime<Utc>) {
        let entry = CachedEntry {
            timestamp,
            result: result.clone(),
        };
        fs::write(
            self.entry_path(fingerprint),
            serde_json::to_string(&entry).unwrap(),
        )
        .unwrap();
    }

    #[cfg(test)]
    fn write_attempt_at(&self, fingerprint: &str, at: DateTime<Utc>) {
        fs::write(self.attempt_path(fingerprint), at.to_rfc3339()).unwrap();
    }
}

fn remove_quietly(path: &Path) {
    if let Err(err) = fs::remove_file(path) {
        warn!(path = %path.display(), %err, "failed to remove cache file");
    }
}
