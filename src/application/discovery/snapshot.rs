//! Persisted discovery results.
//!
//! A snapshot is a single JSON document holding the subscribed ids, the book
//! skeletons and the time it was taken. It is written to a temp file and
//! renamed into place so a crash never leaves a half-written cache.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::{book::TokenBook, id::TokenId};
use crate::error::Result;

/// Discovery output as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoverySnapshot {
    pub token_ids: BTreeSet<TokenId>,
    pub books_skeleton: BTreeMap<TokenId, TokenBook>,
    pub saved_at: DateTime<Utc>,
}

impl DiscoverySnapshot {
    /// Whether the snapshot is younger than `ttl` at `now`.
    ///
    /// A `saved_at` later than `now` is never fresh.
    #[must_use]
    pub fn is_fresh(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        let age = now - self.saved_at;
        if age < chrono::Duration::zero() {
            return false;
        }
        chrono::Duration::from_std(ttl).map_or(true, |ttl| age < ttl)
    }
}

/// File-backed snapshot cache with a freshness limit.
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    path: PathBuf,
    ttl: Duration,
}

impl SnapshotCache {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the snapshot if it exists and is fresh at `now`.
    ///
    /// A missing or stale file yields `Ok(None)`; an unreadable or corrupt
    /// one is an error.
    pub fn load(&self, now: DateTime<Utc>) -> Result<Option<DiscoverySnapshot>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No discovery snapshot");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let snapshot: DiscoverySnapshot = serde_json::from_str(&content)?;
        if snapshot.saved_at > now {
            warn!(
                path = %self.path.display(),
                saved_at = %snapshot.saved_at,
                "Discovery snapshot is from the future, ignoring"
            );
            return Ok(None);
        }
        if !snapshot.is_fresh(self.ttl, now) {
            info!(
                path = %self.path.display(),
                saved_at = %snapshot.saved_at,
                "Discovery snapshot expired"
            );
            return Ok(None);
        }
        Ok(Some(snapshot))
    }

    /// Write `snapshot` atomically.
    ///
    /// Uses write-to-temp-then-rename. Creates the parent directory if needed.
    pub fn save(&self, snapshot: &DiscoverySnapshot) -> Result<()> {
        let json = serde_json::to_vec(snapshot)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)?;

        let cleanup_and_err = |e| {
            let _ = fs::remove_file(&temp_path);
            e
        };

        file.write_all(&json).map_err(cleanup_and_err)?;
        file.sync_all().map_err(cleanup_and_err)?;
        fs::rename(&temp_path, &self.path).map_err(cleanup_and_err)?;

        debug!(
            path = %self.path.display(),
            tokens = snapshot.token_ids.len(),
            "Saved discovery snapshot"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::book::Outcome;

    fn snapshot(saved_at: DateTime<Utc>) -> DiscoverySnapshot {
        let yes = TokenBook::skeleton("y".into(), "n".into(), "m".into(), "Q?", Outcome::Yes);
        let no = TokenBook::skeleton("n".into(), "y".into(), "m".into(), "Q?", Outcome::No);
        DiscoverySnapshot {
            token_ids: [TokenId::from("y"), TokenId::from("n")].into_iter().collect(),
            books_skeleton: [(TokenId::from("y"), yes), (TokenId::from("n"), no)]
                .into_iter()
                .collect(),
            saved_at,
        }
    }

    #[test]
    fn round_trip_before_ttl() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path().join("cache.json"), Duration::from_secs(3600));
        let now = Utc::now();
        let original = snapshot(now);

        cache.save(&original).unwrap();
        let loaded = cache.load(now + chrono::Duration::minutes(59)).unwrap().unwrap();

        assert_eq!(loaded, original);
    }

    #[test]
    fn stale_snapshot_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path().join("cache.json"), Duration::from_secs(3600));
        let now = Utc::now();

        cache.save(&snapshot(now)).unwrap();
        assert!(cache.load(now + chrono::Duration::hours(1)).unwrap().is_none());
    }

    #[test]
    fn future_snapshot_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path().join("cache.json"), Duration::from_secs(3600));
        let now = Utc::now();

        cache.save(&snapshot(now + chrono::Duration::days(30))).unwrap();
        assert!(cache.load(now).unwrap().is_none());
        assert!(!snapshot(now + chrono::Duration::seconds(1)).is_fresh(Duration::from_secs(3600), now));
    }

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path().join("absent.json"), Duration::from_secs(60));
        assert!(cache.load(Utc::now()).unwrap().is_none());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "{ not json").unwrap();

        let cache = SnapshotCache::new(path, Duration::from_secs(60));
        assert!(cache.load(Utc::now()).is_err());
    }

    #[test]
    fn save_creates_parent_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/dir/cache.json");
        let cache = SnapshotCache::new(&path, Duration::from_secs(60));

        cache.save(&snapshot(Utc::now())).unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
    }
}
