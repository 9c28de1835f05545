//! Read queries for the list database.
//!
//! Provides lookup by identifier, ordered entry listing, overviews, and
//! full-table dumps for snapshot export.

use cinelist_catalog::types::*;
use rusqlite::{params, Connection, Row};

use crate::operations::OperationError;

const USER_COLUMNS: &str = "id, username, password_hash, created_at";
const MOVIE_COLUMNS: &str = "id, title, poster_path, release_date, provenance";
const LIST_COLUMNS: &str = "id, user_id, name, public_id, private_id, is_public, created_at";
const ENTRY_COLUMNS: &str = "id, list_id, movie_id, rank, annotation";

/// Turn "no rows" into `None`.
fn optional<T>(result: rusqlite::Result<T>) -> Result<Option<T>, OperationError> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ── User Lookups ────────────────────────────────────────────────────────────

pub fn find_user_by_id(conn: &Connection, id: i64) -> Result<Option<User>, OperationError> {
    optional(conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
        params![id],
        row_to_user,
    ))
}

/// Find a user by exact username.
pub fn find_user_by_username(
    conn: &Connection,
    username: &str,
) -> Result<Option<User>, OperationError> {
    optional(conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
        params![username],
        row_to_user,
    ))
}

/// Users with their list counts, optionally hiding one account by name.
pub fn users_with_list_counts(
    conn: &Connection,
    exclude_username: Option<&str>,
) -> Result<Vec<UserSummary>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT u.id, u.username, u.created_at,
                (SELECT COUNT(*) FROM lists l WHERE l.user_id = u.id)
         FROM users u
         WHERE ?1 IS NULL OR u.username <> ?1
         ORDER BY u.id",
    )?;
    let rows = stmt.query_map(params![exclude_username], |row| {
        Ok(UserSummary {
            id: row.get(0)?,
            username: row.get(1)?,
            created_at: row.get(2)?,
            list_count: row.get(3)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── Movie Lookups ───────────────────────────────────────────────────────────

pub fn find_movie_by_id(conn: &Connection, id: i64) -> Result<Option<MovieRecord>, OperationError> {
    optional(conn.query_row(
        &format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE id = ?1"),
        params![id],
        row_to_movie,
    ))
}

/// Find a movie by title (case-insensitive, surrounding whitespace ignored).
pub fn find_movie_by_title(
    conn: &Connection,
    title: &str,
) -> Result<Option<MovieRecord>, OperationError> {
    optional(conn.query_row(
        &format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE title = ?1 COLLATE NOCASE LIMIT 1"),
        params![title.trim()],
        row_to_movie,
    ))
}

/// All movies with the given provenance, ordered by title.
pub fn movies_by_provenance(
    conn: &Connection,
    provenance: Provenance,
) -> Result<Vec<MovieRecord>, OperationError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {MOVIE_COLUMNS} FROM movies WHERE provenance = ?1 ORDER BY title COLLATE NOCASE"
    ))?;
    let rows = stmt.query_map(params![provenance.as_str()], row_to_movie)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── List Lookups ────────────────────────────────────────────────────────────

pub fn find_list_by_id(conn: &Connection, id: i64) -> Result<Option<MovieList>, OperationError> {
    optional(conn.query_row(
        &format!("SELECT {LIST_COLUMNS} FROM lists WHERE id = ?1"),
        params![id],
        row_to_list,
    ))
}

/// Find a list by its read-only identifier.
pub fn find_list_by_public_id(
    conn: &Connection,
    public_id: &str,
) -> Result<Option<MovieList>, OperationError> {
    optional(conn.query_row(
        &format!("SELECT {LIST_COLUMNS} FROM lists WHERE public_id = ?1"),
        params![public_id],
        row_to_list,
    ))
}

/// Find a list by its owner identifier.
pub fn find_list_by_private_id(
    conn: &Connection,
    private_id: &str,
) -> Result<Option<MovieList>, OperationError> {
    optional(conn.query_row(
        &format!("SELECT {LIST_COLUMNS} FROM lists WHERE private_id = ?1"),
        params![private_id],
        row_to_list,
    ))
}

/// Find one of an owner's lists by display name.
///
/// Names are not unique; the oldest matching list wins.
pub fn find_list_by_owner_and_name(
    conn: &Connection,
    user_id: i64,
    name: &str,
) -> Result<Option<MovieList>, OperationError> {
    optional(conn.query_row(
        &format!(
            "SELECT {LIST_COLUMNS} FROM lists WHERE user_id = ?1 AND name = ?2 ORDER BY id LIMIT 1"
        ),
        params![user_id, name],
        row_to_list,
    ))
}

/// Whether a token is already used as a public or private identifier.
pub fn token_in_use(conn: &Connection, token: &str) -> Result<bool, OperationError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM lists WHERE public_id = ?1 OR private_id = ?1)",
        params![token],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// An owner's lists with entry counts, oldest first.
pub fn lists_for_owner(conn: &Connection, user_id: i64) -> Result<Vec<ListSummary>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT l.id, l.name, l.public_id, l.private_id,
                (SELECT COUNT(*) FROM list_entries e WHERE e.list_id = l.id)
         FROM lists l
         WHERE l.user_id = ?1
         ORDER BY l.id",
    )?;
    let rows = stmt.query_map(params![user_id], |row| {
        Ok(ListSummary {
            id: row.get(0)?,
            name: row.get(1)?,
            public_id: row.get(2)?,
            private_id: row.get(3)?,
            entry_count: row.get(4)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── Entry Lookups ───────────────────────────────────────────────────────────

pub fn find_entry(conn: &Connection, id: i64) -> Result<Option<ListEntry>, OperationError> {
    optional(conn.query_row(
        &format!("SELECT {ENTRY_COLUMNS} FROM list_entries WHERE id = ?1"),
        params![id],
        row_to_entry,
    ))
}

/// Find the entry for a movie in a list, if the movie is on it.
pub fn find_entry_for_movie(
    conn: &Connection,
    list_id: i64,
    movie_id: i64,
) -> Result<Option<ListEntry>, OperationError> {
    optional(conn.query_row(
        &format!(
            "SELECT {ENTRY_COLUMNS} FROM list_entries
             WHERE list_id = ?1 AND movie_id = ?2 ORDER BY rank LIMIT 1"
        ),
        params![list_id, movie_id],
        row_to_entry,
    ))
}

/// Highest rank in a list, or `None` if the list is empty.
pub fn max_rank(conn: &Connection, list_id: i64) -> Result<Option<i64>, OperationError> {
    let max: Option<i64> = conn.query_row(
        "SELECT MAX(rank) FROM list_entries WHERE list_id = ?1",
        params![list_id],
        |row| row.get(0),
    )?;
    Ok(max)
}

/// Whether any entry of the list holds `rank`.
pub fn rank_taken(conn: &Connection, list_id: i64, rank: i64) -> Result<bool, OperationError> {
    let taken: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM list_entries WHERE list_id = ?1 AND rank = ?2)",
        params![list_id, rank],
        |row| row.get(0),
    )?;
    Ok(taken)
}

/// A list's entries in display order.
pub fn entries_for_list(conn: &Connection, list_id: i64) -> Result<Vec<ListEntry>, OperationError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ENTRY_COLUMNS} FROM list_entries WHERE list_id = ?1 ORDER BY rank, id"
    ))?;
    let rows = stmt.query_map(params![list_id], row_to_entry)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// A list's entries joined with their movies, in display order.
pub fn entries_with_movies(
    conn: &Connection,
    list_id: i64,
) -> Result<Vec<EntryWithMovie>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT e.id, e.list_id, e.movie_id, e.rank, e.annotation,
                m.id, m.title, m.poster_path, m.release_date, m.provenance
         FROM list_entries e
         JOIN movies m ON m.id = e.movie_id
         WHERE e.list_id = ?1
         ORDER BY e.rank, e.id",
    )?;
    let rows = stmt.query_map(params![list_id], |row| {
        let provenance: String = row.get(9)?;
        Ok(EntryWithMovie {
            entry: row_to_entry(row)?,
            movie: MovieRecord {
                id: row.get(5)?,
                title: row.get(6)?,
                poster_path: row.get(7)?,
                release_date: row.get(8)?,
                provenance: Provenance::from_str_loose(&provenance),
            },
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── Full Dumps ──────────────────────────────────────────────────────────────

/// Every user, ordered by ID.
pub fn all_users(conn: &Connection) -> Result<Vec<User>, OperationError> {
    let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))?;
    let rows = stmt.query_map([], row_to_user)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Every movie, ordered by ID.
pub fn all_movies(conn: &Connection) -> Result<Vec<MovieRecord>, OperationError> {
    let mut stmt = conn.prepare(&format!("SELECT {MOVIE_COLUMNS} FROM movies ORDER BY id"))?;
    let rows = stmt.query_map([], row_to_movie)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Every list, ordered by ID.
pub fn all_lists(conn: &Connection) -> Result<Vec<MovieList>, OperationError> {
    let mut stmt = conn.prepare(&format!("SELECT {LIST_COLUMNS} FROM lists ORDER BY id"))?;
    let rows = stmt.query_map([], row_to_list)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Every entry, ordered by list then rank.
pub fn all_entries(conn: &Connection) -> Result<Vec<ListEntry>, OperationError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ENTRY_COLUMNS} FROM list_entries ORDER BY list_id, rank, id"
    ))?;
    let rows = stmt.query_map([], row_to_entry)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── Import Log ──────────────────────────────────────────────────────────────

/// Most recent imports first.
pub fn list_import_logs(conn: &Connection, limit: usize) -> Result<Vec<ImportLog>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT id, source_name, snapshot_version, imported_at,
                users_created, users_matched, movies_created, movies_matched,
                lists_created, lists_matched, lists_skipped, entries_created, entries_skipped
         FROM import_log ORDER BY id DESC LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit as i64], |row| {
        Ok(ImportLog {
            id: row.get(0)?,
            source_name: row.get(1)?,
            snapshot_version: row.get(2)?,
            imported_at: row.get(3)?,
            users_created: row.get(4)?,
            users_matched: row.get(5)?,
            movies_created: row.get(6)?,
            movies_matched: row.get(7)?,
            lists_created: row.get(8)?,
            lists_matched: row.get(9)?,
            lists_skipped: row.get(10)?,
            entries_created: row.get(11)?,
            entries_skipped: row.get(12)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── Statistics ──────────────────────────────────────────────────────────────

/// Row counts across the database.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CatalogStats {
    pub users: i64,
    pub movies: i64,
    pub seeded_movies: i64,
    pub lists: i64,
    pub entries: i64,
    pub imports: i64,
}

pub fn catalog_stats(conn: &Connection) -> Result<CatalogStats, OperationError> {
    let count = |sql: &str| -> Result<i64, OperationError> {
        Ok(conn.query_row(sql, [], |row| row.get(0))?)
    };

    Ok(CatalogStats {
        users: count("SELECT COUNT(*) FROM users")?,
        movies: count("SELECT COUNT(*) FROM movies")?,
        seeded_movies: count("SELECT COUNT(*) FROM movies WHERE provenance = 'system-seeded'")?,
        lists: count("SELECT COUNT(*) FROM lists")?,
        entries: count("SELECT COUNT(*) FROM list_entries")?,
        imports: count("SELECT COUNT(*) FROM import_log")?,
    })
}

// ── Row Mappers ─────────────────────────────────────────────────────────────

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn row_to_movie(row: &Row<'_>) -> rusqlite::Result<MovieRecord> {
    let provenance: String = row.get(4)?;
    Ok(MovieRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        poster_path: row.get(2)?,
        release_date: row.get(3)?,
        provenance: Provenance::from_str_loose(&provenance),
    })
}

fn row_to_list(row: &Row<'_>) -> rusqlite::Result<MovieList> {
    Ok(MovieList {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        public_id: row.get(3)?,
        private_id: row.get(4)?,
        is_public: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<ListEntry> {
    Ok(ListEntry {
        id: row.get(0)?,
        list_id: row.get(1)?,
        movie_id: row.get(2)?,
        rank: row.get(3)?,
        annotation: row.get(4)?,
    })
}
