//! Trail persistence: a storage trait and a filesystem implementation.
//!
//! Only the composition root (the CLI) writes trails; engines hand back
//! finalized [`Trail`] values and never touch the disk themselves.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::{Trail, TrailId};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Trail not found: {0}")]
    NotFound(TrailId),

    #[error("Trail {0} failed its integrity check")]
    IntegrityViolation(TrailId),

    #[error("Trail is not finalized (no content hash)")]
    NotFinalized,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Filters for [`TrailStore::list`]. Empty filters match everything.
#[derive(Debug, Default)]
pub struct TrailQuery {
    pub engine: Option<String>,
    /// Started at or after.
    pub from: Option<DateTime<Utc>>,
    /// Started at or before.
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

impl TrailQuery {
    fn matches(&self, trail: &Trail) -> bool {
        if let Some(engine) = &self.engine {
            if &trail.engine != engine {
                return false;
            }
        }
        if let Some(from) = &self.from {
            if &trail.started_at < from {
                return false;
            }
        }
        if let Some(to) = &self.to {
            if &trail.started_at > to {
                return false;
            }
        }
        true
    }
}

pub trait TrailStore {
    /// Persist a finalized trail.
    fn save(&self, trail: &Trail) -> Result<(), StoreError>;

    /// Load a trail and verify its hash.
    fn get(&self, id: TrailId) -> Result<Trail, StoreError>;

    /// Newest first.
    fn list(&self, query: &TrailQuery) -> Result<Vec<Trail>, StoreError>;
}

/// JSON files under `{root}/{engine}/{YYYY-MM-DD}/{trail_id}.json`.
pub struct FsTrailStore {
    root: PathBuf,
}

impl FsTrailStore {
    /// Creates `root` if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn trail_path(&self, trail: &Trail) -> PathBuf {
        self.root
            .join(&trail.engine)
            .join(trail.started_at.format("%Y-%m-%d").to_string())
            .join(format!("{}.json", trail.id))
    }

    fn find_path(&self, id: TrailId) -> Result<PathBuf, StoreError> {
        let filename = format!("{id}.json");
        let mut found = None;
        walk_json_files(&self.root, &mut |path| {
            let name = path.file_name().and_then(|n| n.to_str());
            if found.is_none() && name == Some(filename.as_str()) {
                found = Some(path.to_path_buf());
            }
            Ok(())
        })?;
        found.ok_or(StoreError::NotFound(id))
    }
}

impl TrailStore for FsTrailStore {
    fn save(&self, trail: &Trail) -> Result<(), StoreError> {
        if trail.content_hash.is_none() {
            return Err(StoreError::NotFinalized);
        }

        let path = self.trail_path(trail);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_json::to_string_pretty(trail)?)?;

        tracing::debug!(trail_id = %trail.id, path = %path.display(), "Trail saved");
        Ok(())
    }

    fn get(&self, id: TrailId) -> Result<Trail, StoreError> {
        let path = self.find_path(id)?;
        let trail: Trail = serde_json::from_str(&fs::read_to_string(&path)?)?;
        if !trail.verify_integrity() {
            return Err(StoreError::IntegrityViolation(id));
        }
        Ok(trail)
    }

    fn list(&self, query: &TrailQuery) -> Result<Vec<Trail>, StoreError> {
        let mut results = Vec::new();
        walk_json_files(&self.root, &mut |path| {
            let trail: Trail = serde_json::from_str(&fs::read_to_string(path)?)?;
            if query.matches(&trail) {
                results.push(trail);
            }
            Ok(())
        })?;

        results.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        if let Some(limit) = query.limit {
            results.truncate(limit);
        }
        Ok(results)
    }
}

fn walk_json_files(
    dir: &Path,
    visit: &mut dyn FnMut(&Path) -> Result<(), StoreError>,
) -> Result<(), StoreError> {
    if !dir.is_dir() {
        return Ok(());
    }
    for entry in fs::read_dir(dir)?.flatten() {
        let path = entry.path();
        if path.is_dir() {
            walk_json_files(&path, visit)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some("json") {
            visit(&path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::TrailSession;

    fn sealed(engine: &str) -> Trail {
        let mut session = TrailSession::new(engine, "Test run");
        session.set_context(serde_json::json!({"budget_limit": 1000.0}));
        session.add_decision("choose A", "highest ratio", 0.9);
        session.add_alternative("choose B", "dominated");
        session.add_outcome("solve", "selected 1 strategy", serde_json::json!({"n": 1}), true);
        session.finalize()
    }

    #[test]
    fn save_and_get_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsTrailStore::new(dir.path()).unwrap();
        let trail = sealed("optimizer");

        store.save(&trail).unwrap();
        let loaded = store.get(trail.id).unwrap();

        assert_eq!(loaded, trail);
        assert!(loaded.verify_integrity());
    }

    #[test]
    fn tampering_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsTrailStore::new(dir.path()).unwrap();
        let trail = sealed("wargame");
        store.save(&trail).unwrap();

        let path = store.find_path(trail.id).unwrap();
        let mut edited: Trail = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        edited.decisions[0].choice = "choose C".to_string();
        fs::write(&path, serde_json::to_string(&edited).unwrap()).unwrap();

        assert!(matches!(store.get(trail.id), Err(StoreError::IntegrityViolation(_))));
    }

    #[test]
    fn unfinalized_trail_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsTrailStore::new(dir.path()).unwrap();
        let mut trail = sealed("optimizer");
        trail.content_hash = None;

        assert!(matches!(store.save(&trail), Err(StoreError::NotFinalized)));
    }

    #[test]
    fn missing_trail_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsTrailStore::new(dir.path()).unwrap();
        assert!(matches!(store.get(TrailId::new()), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn list_filters_by_engine_and_limits() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsTrailStore::new(dir.path()).unwrap();
        for engine in ["optimizer", "horizons", "optimizer", "optimizer"] {
            store.save(&sealed(engine)).unwrap();
        }

        let query = TrailQuery {
            engine: Some("optimizer".to_string()),
            ..Default::default()
        };
        let all = store.list(&query).unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.iter().all(|t| t.engine == "optimizer"));

        let limited = store
            .list(&TrailQuery {
                limit: Some(2),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(limited.len(), 2);
    }
}
