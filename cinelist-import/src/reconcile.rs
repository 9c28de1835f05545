//! Merge a snapshot into a database that may already hold part of it.
//!
//! Identities are remapped in four passes that must run in order because
//! each depends on the maps built before it:
//!
//! 1. users, matched by username
//! 2. movies, matched by case-insensitive title
//! 3. lists, matched by public identifier and attached to the mapped owner
//! 4. entries, matched by (mapped list, mapped movie)
//!
//! Matched rows are never modified. Rows whose references cannot be mapped
//! are skipped with a warning. Everything runs in one transaction: any error
//! rolls back all four passes.

use std::collections::HashMap;

use cinelist_catalog::{ImportLog, NewMovie};
use cinelist_db::operations::{self, NewList, OperationError};
use cinelist_db::queries;
use rusqlite::Connection;
use thiserror::Error;

use crate::progress::ImportProgress;
use crate::snapshot::{Snapshot, SnapshotEntry};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Database error: {0}")]
    Db(#[from] OperationError),
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Snapshot version {found} is not supported (newest supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
    #[error("Entry {entry}: list {list_id} has no rank left after {max}")]
    RankExhausted { entry: i64, list_id: i64, max: i64 },
}

/// Statistics from a single snapshot import.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportStats {
    pub users_created: u64,
    pub users_matched: u64,
    pub movies_created: u64,
    pub movies_matched: u64,
    pub lists_created: u64,
    pub lists_matched: u64,
    pub lists_skipped: u64,
    pub entries_created: u64,
    pub entries_skipped: u64,
}

impl ImportStats {
    pub fn users_processed(&self) -> u64 {
        self.users_created + self.users_matched
    }

    pub fn movies_processed(&self) -> u64 {
        self.movies_created + self.movies_matched
    }

    pub fn lists_processed(&self) -> u64 {
        self.lists_created + self.lists_matched
    }
}

/// Snapshot ID → target ID, one map per entity type.
#[derive(Default)]
struct IdMaps {
    users: HashMap<i64, i64>,
    movies: HashMap<i64, i64>,
    lists: HashMap<i64, i64>,
}

/// Import a snapshot.
///
/// `source_name` is recorded in the import log (usually the file name).
/// The optional `progress` callback is invoked after each row.
pub fn import_snapshot(
    conn: &Connection,
    snapshot: &Snapshot,
    source_name: &str,
    progress: Option<&dyn ImportProgress>,
) -> Result<ImportStats, ImportError> {
    snapshot.check_version()?;

    let mut stats = ImportStats::default();
    let mut maps = IdMaps::default();

    let tx = conn.unchecked_transaction()?;

    import_users(&tx, snapshot, &mut maps, &mut stats, progress)?;
    import_movies(&tx, snapshot, &mut maps, &mut stats, progress)?;
    import_lists(&tx, snapshot, &mut maps, &mut stats, progress)?;
    import_entries(&tx, snapshot, &maps, &mut stats, progress)?;

    log_import(&tx, source_name, snapshot.version, &stats)?;
    tx.commit()?;

    if let Some(p) = progress {
        p.on_complete(&format!(
            "Imported {source_name}: {} users, {} movies, {} lists processed",
            stats.users_processed(),
            stats.movies_processed(),
            stats.lists_processed()
        ));
    }
    Ok(stats)
}

fn import_users(
    conn: &Connection,
    snapshot: &Snapshot,
    maps: &mut IdMaps,
    stats: &mut ImportStats,
    progress: Option<&dyn ImportProgress>,
) -> Result<(), ImportError> {
    if let Some(p) = progress {
        p.on_phase(&format!("Users: {} in snapshot", snapshot.users.len()));
    }

    for (i, user) in snapshot.users.iter().enumerate() {
        let target = match queries::find_user_by_username(conn, &user.username)? {
            Some(existing) => {
                stats.users_matched += 1;
                existing.id
            }
            None => {
                stats.users_created += 1;
                operations::insert_user(
                    conn,
                    &user.username,
                    &user.password_hash,
                    user.created_at.as_deref(),
                )?
            }
        };
        maps.users.insert(user.id, target);

        if let Some(p) = progress {
            p.on_item(i + 1, snapshot.users.len(), &user.username);
        }
    }
    Ok(())
}

fn import_movies(
    conn: &Connection,
    snapshot: &Snapshot,
    maps: &mut IdMaps,
    stats: &mut ImportStats,
    progress: Option<&dyn ImportProgress>,
) -> Result<(), ImportError> {
    if let Some(p) = progress {
        p.on_phase(&format!("Movies: {} in snapshot", snapshot.movies.len()));
    }

    for (i, movie) in snapshot.movies.iter().enumerate() {
        let target = match queries::find_movie_by_title(conn, &movie.title)? {
            Some(existing) => {
                stats.movies_matched += 1;
                existing.id
            }
            None => {
                stats.movies_created += 1;
                let new = NewMovie {
                    title: movie.title.clone(),
                    poster_path: movie.poster_path.clone(),
                    release_date: movie.release_date.clone(),
                };
                operations::insert_movie(conn, &new, movie.provenance)?
            }
        };
        maps.movies.insert(movie.id, target);

        if let Some(p) = progress {
            p.on_item(i + 1, snapshot.movies.len(), &movie.title);
        }
    }
    Ok(())
}

fn import_lists(
    conn: &Connection,
    snapshot: &Snapshot,
    maps: &mut IdMaps,
    stats: &mut ImportStats,
    progress: Option<&dyn ImportProgress>,
) -> Result<(), ImportError> {
    if let Some(p) = progress {
        p.on_phase(&format!("Lists: {} in snapshot", snapshot.lists.len()));
    }

    for (i, list) in snapshot.lists.iter().enumerate() {
        if let Some(p) = progress {
            p.on_item(i + 1, snapshot.lists.len(), &list.name);
        }

        let Some(&owner) = maps.users.get(&list.user_id) else {
            log::warn!(
                "Skipping list '{}': owner {} is not in the snapshot",
                list.name,
                list.user_id
            );
            stats.lists_skipped += 1;
            continue;
        };

        if let Some(existing) = queries::find_list_by_public_id(conn, &list.public_id)? {
            stats.lists_matched += 1;
            maps.lists.insert(list.id, existing.id);
            continue;
        }
        if let Some(existing) = queries::find_list_by_private_id(conn, &list.private_id)? {
            log::warn!(
                "List '{}' matched list {} by private identifier only",
                list.name,
                existing.id
            );
            stats.lists_matched += 1;
            maps.lists.insert(list.id, existing.id);
            continue;
        }

        let new = NewList {
            user_id: owner,
            name: &list.name,
            public_id: &list.public_id,
            private_id: &list.private_id,
            is_public: list.is_public,
            created_at: list.created_at.as_deref(),
        };
        match operations::insert_list(conn, &new) {
            Ok(id) => {
                stats.lists_created += 1;
                maps.lists.insert(list.id, id);
            }
            // An identifier is already used in the other token space.
            Err(e) if e.is_conflict() => {
                log::warn!("Skipping list '{}': {e}", list.name);
                stats.lists_skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

fn import_entries(
    conn: &Connection,
    snapshot: &Snapshot,
    maps: &IdMaps,
    stats: &mut ImportStats,
    progress: Option<&dyn ImportProgress>,
) -> Result<(), ImportError> {
    if let Some(p) = progress {
        p.on_phase(&format!("Entries: {} in snapshot", snapshot.entries.len()));
    }

    // Rank order, so entries that must be appended keep their relative order.
    let mut entries: Vec<&SnapshotEntry> = snapshot.entries.iter().collect();
    entries.sort_by_key(|e| (e.list_id, e.rank, e.id));

    for (i, entry) in entries.iter().enumerate() {
        if let Some(p) = progress {
            p.on_item(i + 1, entries.len(), &format!("entry {}", entry.id));
        }

        let (Some(&list_id), Some(&movie_id)) =
            (maps.lists.get(&entry.list_id), maps.movies.get(&entry.movie_id))
        else {
            log::warn!(
                "Skipping entry {}: list {} or movie {} was not imported",
                entry.id,
                entry.list_id,
                entry.movie_id
            );
            stats.entries_skipped += 1;
            continue;
        };

        if queries::find_entry_for_movie(conn, list_id, movie_id)?.is_some() {
            stats.entries_skipped += 1;
            continue;
        }

        insert_ranked(conn, list_id, movie_id, entry)?;
        stats.entries_created += 1;
    }
    Ok(())
}

/// Insert at the snapshot's rank, or append after the list's last entry when
/// that rank is unusable in the target list.
fn insert_ranked(
    conn: &Connection,
    list_id: i64,
    movie_id: i64,
    entry: &SnapshotEntry,
) -> Result<i64, ImportError> {
    let annotation = entry.annotation.as_deref();
    if entry.rank >= 0 {
        match operations::insert_entry(conn, list_id, movie_id, entry.rank, annotation) {
            Ok(id) => return Ok(id),
            Err(e) if e.is_rank_collision() => {}
            Err(e) => return Err(e.into()),
        }
    }

    let rank = match queries::max_rank(conn, list_id)? {
        None => 0,
        Some(max) => max.checked_add(1).ok_or(ImportError::RankExhausted {
            entry: entry.id,
            list_id,
            max,
        })?,
    };
    log::warn!(
        "Entry {}: rank {} unavailable in list {list_id}, appended at {rank}",
        entry.id,
        entry.rank
    );
    Ok(operations::insert_entry(
        conn, list_id, movie_id, rank, annotation,
    )?)
}

/// Record a completed import in the import log.
fn log_import(
    conn: &Connection,
    source_name: &str,
    version: u32,
    stats: &ImportStats,
) -> Result<(), ImportError> {
    let log = ImportLog {
        id: 0,
        source_name: source_name.to_string(),
        snapshot_version: version as i64,
        imported_at: chrono::Utc::now().to_rfc3339(),
        users_created: stats.users_created as i64,
        users_matched: stats.users_matched as i64,
        movies_created: stats.movies_created as i64,
        movies_matched: stats.movies_matched as i64,
        lists_created: stats.lists_created as i64,
        lists_matched: stats.lists_matched as i64,
        lists_skipped: stats.lists_skipped as i64,
        entries_created: stats.entries_created as i64,
        entries_skipped: stats.entries_skipped as i64,
    };
    operations::insert_import_log(conn, &log)?;
    Ok(())
}
