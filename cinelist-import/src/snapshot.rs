//! The snapshot format and full-dataset export.

use std::path::Path;

use cinelist_catalog::Provenance;
use cinelist_db::queries;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::reconcile::ImportError;

/// Newest snapshot format this build reads and the one it writes.
pub const SNAPSHOT_VERSION: u32 = 1;

/// A full dataset. IDs are those of the exporting database and only serve to
/// link rows within the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub exported_at: String,
    #[serde(default)]
    pub users: Vec<SnapshotUser>,
    #[serde(default)]
    pub movies: Vec<SnapshotMovie>,
    #[serde(default)]
    pub lists: Vec<SnapshotList>,
    #[serde(default)]
    pub entries: Vec<SnapshotEntry>,
}

/// Only what is needed to reattach ownership. The hash is carried verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotUser {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMovie {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub provenance: Provenance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotList {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub public_id: String,
    pub private_id: String,
    #[serde(default = "default_true")]
    pub is_public: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub id: i64,
    pub list_id: i64,
    pub movie_id: i64,
    pub rank: i64,
    #[serde(default)]
    pub annotation: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Snapshot {
    /// An empty snapshot stamped with the current time.
    pub fn empty() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            exported_at: chrono::Utc::now().to_rfc3339(),
            users: Vec::new(),
            movies: Vec::new(),
            lists: Vec::new(),
            entries: Vec::new(),
        }
    }

    /// Fail unless this build understands the snapshot's format.
    pub fn check_version(&self) -> Result<(), ImportError> {
        if self.version == 0 || self.version > SNAPSHOT_VERSION {
            return Err(ImportError::UnsupportedVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, ImportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a snapshot and reject formats newer than this build.
    pub fn from_json(json: &str) -> Result<Self, ImportError> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        snapshot.check_version()?;
        Ok(snapshot)
    }
}

/// Read every user, movie, list, and entry in one read transaction so the
/// snapshot is internally consistent even while others write.
pub fn export_snapshot(conn: &Connection) -> Result<Snapshot, ImportError> {
    let tx = conn.unchecked_transaction()?;
    let mut snapshot = Snapshot::empty();

    snapshot.users = queries::all_users(&tx)?
        .into_iter()
        .map(|u| SnapshotUser {
            id: u.id,
            username: u.username,
            password_hash: u.password_hash,
            created_at: Some(u.created_at),
        })
        .collect();
    snapshot.movies = queries::all_movies(&tx)?
        .into_iter()
        .map(|m| SnapshotMovie {
            id: m.id,
            title: m.title,
            poster_path: m.poster_path,
            release_date: m.release_date,
            provenance: m.provenance,
        })
        .collect();
    snapshot.lists = queries::all_lists(&tx)?
        .into_iter()
        .map(|l| SnapshotList {
            id: l.id,
            user_id: l.user_id,
            name: l.name,
            public_id: l.public_id,
            private_id: l.private_id,
            is_public: l.is_public,
            created_at: Some(l.created_at),
        })
        .collect();
    snapshot.entries = queries::all_entries(&tx)?
        .into_iter()
        .map(|e| SnapshotEntry {
            id: e.id,
            list_id: e.list_id,
            movie_id: e.movie_id,
            rank: e.rank,
            annotation: e.annotation,
        })
        .collect();

    tx.commit()?;
    log::debug!(
        "Exported {} users, {} movies, {} lists, {} entries",
        snapshot.users.len(),
        snapshot.movies.len(),
        snapshot.lists.len(),
        snapshot.entries.len()
    );
    Ok(snapshot)
}

/// Write a snapshot as pretty JSON.
pub fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), ImportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, snapshot.to_json()?)?;
    Ok(())
}

pub fn read_snapshot(path: &Path) -> Result<Snapshot, ImportError> {
    let json = std::fs::read_to_string(path)?;
    Snapshot::from_json(&json)
}
