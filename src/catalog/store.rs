//! Snapshot persistence for the movie collection.
//!
//! The whole collection lives in one JSON file; every write re-serializes
//! and atomically replaces it. Load is fail-open: a missing, unreadable or
//! malformed snapshot yields an empty collection (with a warning) rather
//! than an error, so callers never have to handle load failures.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::catalog::record::MovieRecord;
use crate::error::Result;

/// Durable store holding the full ordered collection as a single JSON
/// snapshot.
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full collection.
    ///
    /// Never fails: a missing snapshot is an empty collection, and an
    /// unreadable or malformed snapshot is treated as "start fresh". The
    /// warning log is the only signal that data was present but unusable;
    /// callers depend on this no-error contract.
    pub fn load(&self) -> Vec<MovieRecord> {
        if !self.path.exists() {
            return Vec::new();
        }

        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = ?self.path, error = %e, "snapshot unreadable, starting with empty collection");
                return Vec::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(records) => records,
            Err(e) => {
                warn!(path = ?self.path, error = %e, "snapshot malformed, starting with empty collection");
                Vec::new()
            }
        }
    }

    /// Persist the full collection, replacing any previous snapshot.
    ///
    /// Writes to a temp file in the target directory and renames it into
    /// place, so readers only ever observe a complete snapshot. Creates the
    /// storage directory if it does not exist yet.
    pub fn save(&self, records: &[MovieRecord]) -> Result<()> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;

        let json = serde_json::to_string_pretty(records)
            .map_err(|e| crate::error::Error::internal(format!("snapshot serialization: {e}")))?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        std::io::Write::write_all(&mut tmp, json.as_bytes())?;
        tmp.persist(&self.path)
            .map_err(|e| crate::error::Error::Io(e.error))?;

        Ok(())
    }
}
