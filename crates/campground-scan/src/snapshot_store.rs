//! Snapshot files live at `{dir}/park_{park_id}_{site_type}_availability.json`,
//! with spaces in the site type replaced by dashes. Saves go through a temp file
//! and a rename so a crash never leaves a half-written snapshot behind.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tokio::fs;
use tracing::{debug, error};

use crate::availability::AvailabilitySnapshot;

/// Errors raised while reading or writing snapshot files
#[derive(thiserror::Error, Debug)]
pub enum SnapshotError {
    /// Filesystem failure
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// File content is not a snapshot, or the snapshot could not be encoded
    #[error("Invalid snapshot {}: {source}", .path.display())]
    Serialization {
        /// File involved
        path: PathBuf,
        /// Underlying error
        source: serde_json::Error,
    },
}

impl SnapshotError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn serialization(path: &Path, source: serde_json::Error) -> Self {
        SnapshotError::Serialization {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Directory of per-park, per-site-type availability snapshots
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    /// Store snapshots under `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the snapshot for a park and site type
    pub fn snapshot_path(&self, park_id: &str, site_type: &str) -> PathBuf {
        let file_name = format!(
            "park_{}_{}_availability.json",
            sanitize(park_id),
            sanitize(site_type)
        );
        self.dir.join(file_name)
    }

    /// Load the previous snapshot. No file yet means an empty snapshot.
    pub async fn load(
        &self,
        park_id: &str,
        site_type: &str,
    ) -> Result<AvailabilitySnapshot, SnapshotError> {
        let path = self.snapshot_path(park_id, site_type);

        let contents = match fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No snapshot at {}, starting empty", path.display());
                return Ok(AvailabilitySnapshot::new());
            }
            Err(e) => return Err(SnapshotError::io(&path, e)),
        };

        serde_json::from_str(&contents).map_err(|e| SnapshotError::serialization(&path, e))
    }

    /// Load the previous snapshot, setting aside a file that does not parse.
    ///
    /// An unreadable snapshot is renamed to `*.json.corrupt` and the park starts
    /// over from an empty baseline, so the next save replaces it. I/O errors are
    /// still returned.
    pub async fn load_or_reset(
        &self,
        park_id: &str,
        site_type: &str,
    ) -> Result<AvailabilitySnapshot, SnapshotError> {
        match self.load(park_id, site_type).await {
            Err(SnapshotError::Serialization { path, source }) => {
                let backup = path.with_extension("json.corrupt");
                error!(
                    "Corrupt snapshot {} ({}), moving it to {} and starting empty",
                    path.display(),
                    source,
                    backup.display()
                );
                fs::rename(&path, &backup)
                    .await
                    .map_err(|e| SnapshotError::io(&backup, e))?;
                Ok(AvailabilitySnapshot::new())
            }
            other => other,
        }
    }

    /// Replace the snapshot for a park and site type, returning the file written
    pub async fn save(
        &self,
        park_id: &str,
        site_type: &str,
        snapshot: &AvailabilitySnapshot,
    ) -> Result<PathBuf, SnapshotError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| SnapshotError::io(&self.dir, e))?;

        let final_path = self.snapshot_path(park_id, site_type);
        let temp_path = final_path.with_extension("json.tmp");

        let mut json = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut json, PrettyFormatter::with_indent(b"    "));
        snapshot
            .serialize(&mut serializer)
            .map_err(|e| SnapshotError::serialization(&final_path, e))?;

        fs::write(&temp_path, &json)
            .await
            .map_err(|e| SnapshotError::io(&temp_path, e))?;

        fs::rename(&temp_path, &final_path)
            .await
            .map_err(|e| SnapshotError::io(&final_path, e))?;

        Ok(final_path)
    }
}

/// Keep file names flat: spaces and path separators become dashes
fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '-',
            other => other,
        })
        .collect()
}
