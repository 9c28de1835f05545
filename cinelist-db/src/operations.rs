//! Row-level write operations for users, movies, lists, and entries.

use cinelist_catalog::types::*;
use rusqlite::{params, Connection};
use thiserror::Error;

use crate::queries;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("SQLite error: {0}")]
    Sqlite(rusqlite::Error),
    #[error("Entity not found: {entity_type} with id '{id}'")]
    NotFound { entity_type: String, id: String },
    #[error("Uniqueness conflict on {entity_type}: {detail}")]
    Conflict { entity_type: String, detail: String },
    #[error("Rank {rank} is already taken in list {list_id}")]
    RankTaken { list_id: i64, rank: i64 },
    #[error("Invalid value: {0}")]
    Invalid(String),
}

impl From<rusqlite::Error> for OperationError {
    fn from(e: rusqlite::Error) -> Self {
        if is_unique_violation(&e) {
            return OperationError::Conflict {
                entity_type: "row".to_string(),
                detail: e.to_string(),
            };
        }
        OperationError::Sqlite(e)
    }
}

impl OperationError {
    fn not_found(entity_type: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }

    fn conflict(entity_type: &str, detail: impl Into<String>) -> Self {
        Self::Conflict {
            entity_type: entity_type.to_string(),
            detail: detail.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. } | Self::RankTaken { .. })
    }

    /// True when another entry of the same list already holds the rank.
    pub fn is_rank_collision(&self) -> bool {
        matches!(self, Self::RankTaken { .. })
    }
}

/// Whether a SQLite error is a UNIQUE/PRIMARY KEY constraint failure.
pub fn is_unique_violation(e: &rusqlite::Error) -> bool {
    match e {
        rusqlite::Error::SqliteFailure(err, _) => {
            err.code == rusqlite::ErrorCode::ConstraintViolation
                && matches!(
                    err.extended_code,
                    rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                        | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                )
        }
        _ => false,
    }
}

/// Map a constraint failure onto a conflict for the named entity type.
fn tag_conflict(e: rusqlite::Error, entity_type: &str) -> OperationError {
    if is_unique_violation(&e) {
        OperationError::conflict(entity_type, e.to_string())
    } else {
        OperationError::Sqlite(e)
    }
}

/// Map an entry write failure onto `RankTaken` when another entry of the
/// list already holds `rank`.
fn entry_conflict(
    conn: &Connection,
    e: rusqlite::Error,
    list_id: i64,
    rank: i64,
) -> OperationError {
    if !is_unique_violation(&e) {
        return OperationError::Sqlite(e);
    }
    match queries::rank_taken(conn, list_id, rank) {
        Ok(true) => OperationError::RankTaken { list_id, rank },
        Ok(false) => OperationError::conflict("entry", e.to_string()),
        Err(q) => q,
    }
}

// ── User Operations ─────────────────────────────────────────────────────────

/// Insert a user with an already-computed password hash. Returns the new ID.
///
/// `created_at` is kept verbatim when given (snapshot import), otherwise the
/// database clock is used.
pub fn insert_user(
    conn: &Connection,
    username: &str,
    password_hash: &str,
    created_at: Option<&str>,
) -> Result<i64, OperationError> {
    if username.trim().is_empty() {
        return Err(OperationError::Invalid("username must not be empty".into()));
    }
    conn.execute(
        "INSERT INTO users (username, password_hash, created_at)
         VALUES (?1, ?2, COALESCE(?3, datetime('now')))",
        params![username, password_hash, created_at],
    )
    .map_err(|e| tag_conflict(e, "user"))?;
    Ok(conn.last_insert_rowid())
}

/// Change a user's name. Fails with `Conflict` if the name is taken.
pub fn rename_user(conn: &Connection, id: i64, username: &str) -> Result<(), OperationError> {
    if username.trim().is_empty() {
        return Err(OperationError::Invalid("username must not be empty".into()));
    }
    let changed = conn
        .execute(
            "UPDATE users SET username = ?2 WHERE id = ?1",
            params![id, username],
        )
        .map_err(|e| tag_conflict(e, "user"))?;
    if changed == 0 {
        return Err(OperationError::not_found("user", id));
    }
    Ok(())
}

/// Delete a user. Their lists and those lists' entries cascade.
pub fn delete_user(conn: &Connection, id: i64) -> Result<(), OperationError> {
    let changed = conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;
    if changed == 0 {
        return Err(OperationError::not_found("user", id));
    }
    Ok(())
}

// ── Movie Operations ────────────────────────────────────────────────────────

/// Insert a movie record. Returns the generated ID.
///
/// Fails with `Conflict` if a movie with the same title (case-insensitive)
/// already exists.
pub fn insert_movie(
    conn: &Connection,
    movie: &NewMovie,
    provenance: Provenance,
) -> Result<i64, OperationError> {
    validate_title(&movie.title)?;
    conn.execute(
        "INSERT INTO movies (title, poster_path, release_date, provenance)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            movie.title.trim(),
            movie.poster_path,
            movie.release_date,
            provenance.as_str(),
        ],
    )
    .map_err(|e| tag_conflict(e, "movie"))?;
    Ok(conn.last_insert_rowid())
}

/// Insert a movie record under a caller-chosen ID (provider-keyed records).
pub fn insert_movie_with_id(
    conn: &Connection,
    id: i64,
    movie: &NewMovie,
    provenance: Provenance,
) -> Result<(), OperationError> {
    validate_title(&movie.title)?;
    conn.execute(
        "INSERT INTO movies (id, title, poster_path, release_date, provenance)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            id,
            movie.title.trim(),
            movie.poster_path,
            movie.release_date,
            provenance.as_str(),
        ],
    )
    .map_err(|e| tag_conflict(e, "movie"))?;
    Ok(())
}

/// Overwrite a movie's title and metadata. Provenance is left alone.
pub fn update_movie_metadata(
    conn: &Connection,
    id: i64,
    movie: &NewMovie,
) -> Result<(), OperationError> {
    validate_title(&movie.title)?;
    let changed = conn
        .execute(
            "UPDATE movies SET title = ?2, poster_path = ?3, release_date = ?4 WHERE id = ?1",
            params![id, movie.title.trim(), movie.poster_path, movie.release_date],
        )
        .map_err(|e| tag_conflict(e, "movie"))?;
    if changed == 0 {
        return Err(OperationError::not_found("movie", id));
    }
    Ok(())
}

/// Delete a movie. Every list entry that references it cascades.
pub fn delete_movie(conn: &Connection, id: i64) -> Result<(), OperationError> {
    let changed = conn.execute("DELETE FROM movies WHERE id = ?1", params![id])?;
    if changed == 0 {
        return Err(OperationError::not_found("movie", id));
    }
    Ok(())
}

fn validate_title(title: &str) -> Result<(), OperationError> {
    if title.trim().is_empty() {
        return Err(OperationError::Invalid("movie title must not be empty".into()));
    }
    Ok(())
}

// ── List Operations ─────────────────────────────────────────────────────────

/// Fields for a list row about to be inserted.
#[derive(Debug, Clone)]
pub struct NewList<'a> {
    pub user_id: i64,
    pub name: &'a str,
    pub public_id: &'a str,
    pub private_id: &'a str,
    pub is_public: bool,
    /// Kept verbatim when given; otherwise the database clock is used.
    pub created_at: Option<&'a str>,
}

/// Insert a list. Returns the generated ID.
///
/// Fails with `Conflict` if either identifier is already in use as a public
/// *or* a private identifier anywhere, or if the two are equal.
pub fn insert_list(conn: &Connection, list: &NewList<'_>) -> Result<i64, OperationError> {
    if list.public_id == list.private_id {
        return Err(OperationError::conflict(
            "list",
            "public and private identifiers must differ",
        ));
    }
    if queries::token_in_use(conn, list.public_id)? || queries::token_in_use(conn, list.private_id)? {
        return Err(OperationError::conflict(
            "list",
            "identifier already in use",
        ));
    }
    conn.execute(
        "INSERT INTO lists (user_id, name, public_id, private_id, is_public, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, COALESCE(?6, datetime('now')))",
        params![
            list.user_id,
            list.name,
            list.public_id,
            list.private_id,
            list.is_public,
            list.created_at,
        ],
    )
    .map_err(|e| tag_conflict(e, "list"))?;
    Ok(conn.last_insert_rowid())
}

/// Change a list's display name.
pub fn rename_list(conn: &Connection, id: i64, name: &str) -> Result<(), OperationError> {
    let changed = conn.execute(
        "UPDATE lists SET name = ?2 WHERE id = ?1",
        params![id, name],
    )?;
    if changed == 0 {
        return Err(OperationError::not_found("list", id));
    }
    Ok(())
}

/// Delete a list and, by cascade, its entries.
pub fn delete_list(conn: &Connection, id: i64) -> Result<(), OperationError> {
    let changed = conn.execute("DELETE FROM lists WHERE id = ?1", params![id])?;
    if changed == 0 {
        return Err(OperationError::not_found("list", id));
    }
    Ok(())
}

// ── Entry Operations ────────────────────────────────────────────────────────

/// Insert an entry at an explicit rank. Returns the generated ID.
///
/// A rank already taken in the same list yields
/// [`OperationError::RankTaken`].
pub fn insert_entry(
    conn: &Connection,
    list_id: i64,
    movie_id: i64,
    rank: i64,
    annotation: Option<&str>,
) -> Result<i64, OperationError> {
    if rank < 0 {
        return Err(OperationError::Invalid(format!("rank {rank} is negative")));
    }
    conn.execute(
        "INSERT INTO list_entries (list_id, movie_id, rank, annotation)
         VALUES (?1, ?2, ?3, ?4)",
        params![list_id, movie_id, rank, annotation],
    )
    .map_err(|e| entry_conflict(conn, e, list_id, rank))?;
    Ok(conn.last_insert_rowid())
}

/// Set the rank of one entry.
pub fn set_entry_rank(conn: &Connection, id: i64, rank: i64) -> Result<(), OperationError> {
    if rank < 0 {
        return Err(OperationError::Invalid(format!("rank {rank} is negative")));
    }
    let result = conn.execute(
        "UPDATE list_entries SET rank = ?2 WHERE id = ?1",
        params![id, rank],
    );
    let changed = match result {
        Ok(changed) => changed,
        Err(e) => {
            return Err(match queries::find_entry(conn, id)? {
                Some(entry) => entry_conflict(conn, e, entry.list_id, rank),
                None => OperationError::Sqlite(e),
            });
        }
    };
    if changed == 0 {
        return Err(OperationError::not_found("entry", id));
    }
    Ok(())
}

/// Set or clear an entry's annotation.
pub fn set_entry_annotation(
    conn: &Connection,
    id: i64,
    annotation: Option<&str>,
) -> Result<(), OperationError> {
    let changed = conn.execute(
        "UPDATE list_entries SET annotation = ?2 WHERE id = ?1",
        params![id, annotation],
    )?;
    if changed == 0 {
        return Err(OperationError::not_found("entry", id));
    }
    Ok(())
}

/// Delete one entry. Remaining ranks are left as they are.
pub fn delete_entry(conn: &Connection, id: i64) -> Result<(), OperationError> {
    let changed = conn.execute("DELETE FROM list_entries WHERE id = ?1", params![id])?;
    if changed == 0 {
        return Err(OperationError::not_found("entry", id));
    }
    Ok(())
}

// ── Import Log Operations ───────────────────────────────────────────────────

/// Insert an import log entry. Returns the generated ID.
///
/// An empty `imported_at` is filled in from the database clock.
pub fn insert_import_log(conn: &Connection, log: &ImportLog) -> Result<i64, OperationError> {
    conn.execute(
        "INSERT INTO import_log (source_name, snapshot_version, imported_at,
             users_created, users_matched, movies_created, movies_matched,
             lists_created, lists_matched, lists_skipped, entries_created, entries_skipped)
         VALUES (?1, ?2, COALESCE(NULLIF(?3, ''), datetime('now')),
                 ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            log.source_name,
            log.snapshot_version,
            log.imported_at,
            log.users_created,
            log.users_matched,
            log.movies_created,
            log.movies_matched,
            log.lists_created,
            log.lists_matched,
            log.lists_skipped,
            log.entries_created,
            log.entries_skipped,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

// ── Seed Loading ────────────────────────────────────────────────────────────

/// Reconcile the canonical movie set into the database.
///
/// For each seed movie, a case-insensitive title match is updated in place
/// when any field differs; otherwise the movie is inserted as
/// `system-seeded`. Runs in one transaction and is safe to call on every open.
pub fn seed_movies(conn: &Connection, movies: &[NewMovie]) -> Result<SeedStats, OperationError> {
    let mut stats = SeedStats::default();
    let tx = conn.unchecked_transaction()?;

    for seed in movies {
        match queries::find_movie_by_title(&tx, &seed.title)? {
            Some(existing) => {
                let same = existing.title == seed.title.trim()
                    && existing.poster_path == seed.poster_path
                    && existing.release_date == seed.release_date;
                if same {
                    stats.unchanged += 1;
                } else {
                    update_movie_metadata(&tx, existing.id, seed)?;
                    stats.updated += 1;
                }
            }
            None => {
                insert_movie(&tx, seed, Provenance::SystemSeeded)?;
                stats.added += 1;
            }
        }
    }

    tx.commit()?;
    Ok(stats)
}

/// Statistics from seeding the database.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedStats {
    pub added: usize,
    pub updated: usize,
    pub unchanged: usize,
}
