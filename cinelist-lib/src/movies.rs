//! The movie catalog: resolving movie references and managing seeded and
//! user-created movies.

use std::path::Path;

use cinelist_catalog::{MovieRecord, NewMovie, Provenance};
use cinelist_db::{Connection, SeedStats, operations, queries};

use crate::error::StoreError;

/// A reference to a movie supplied by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovieRef {
    /// An existing catalog record.
    Id(i64),
    /// A title with optional metadata. Matched case-insensitively, created
    /// as a user-created movie when absent.
    Title(NewMovie),
    /// An externally keyed record: matched by ID, then by title, otherwise
    /// inserted under the given ID.
    Keyed { id: i64, movie: NewMovie },
}

impl MovieRef {
    pub fn title(title: impl Into<String>) -> Self {
        MovieRef::Title(NewMovie::titled(title))
    }
}

/// A resolved movie and whether resolving it created the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub movie: MovieRecord,
    pub created: bool,
}

pub struct MovieCatalog<'c> {
    conn: &'c Connection,
}

impl<'c> MovieCatalog<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Resolve a reference to exactly one record, creating it if needed.
    pub fn resolve_or_create(&self, movie: &MovieRef) -> Result<Resolved, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let resolved = resolve_or_create_in(&tx, movie)?;
        tx.commit()?;
        Ok(resolved)
    }

    pub fn find(&self, id: i64) -> Result<MovieRecord, StoreError> {
        queries::find_movie_by_id(self.conn, id)?
            .ok_or_else(|| StoreError::not_found(format!("movie {id}")))
    }

    pub fn find_by_title(&self, title: &str) -> Result<Option<MovieRecord>, StoreError> {
        Ok(queries::find_movie_by_title(self.conn, title)?)
    }

    /// Movies added by users rather than the canonical seed.
    pub fn user_created(&self) -> Result<Vec<MovieRecord>, StoreError> {
        Ok(queries::movies_by_provenance(
            self.conn,
            Provenance::UserCreated,
        )?)
    }

    /// Delete a movie. Entries referencing it on any list are removed too;
    /// returns how many.
    pub fn delete(&self, id: i64) -> Result<usize, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let referencing: i64 = tx.query_row(
            "SELECT COUNT(*) FROM list_entries WHERE movie_id = ?1",
            [id],
            |row| row.get(0),
        )?;
        operations::delete_movie(&tx, id)?;
        tx.commit()?;
        log::info!("Deleted movie {id} and {referencing} list entries");
        Ok(referencing as usize)
    }

    /// Reconcile the canonical movie set.
    pub fn seed(&self, movies: &[NewMovie]) -> Result<SeedStats, StoreError> {
        let stats = operations::seed_movies(self.conn, movies)?;
        log::debug!(
            "Catalog seed: {} added, {} updated, {} unchanged",
            stats.added,
            stats.updated,
            stats.unchanged
        );
        Ok(stats)
    }

    /// Load the canonical movie set from a catalog directory and seed it.
    pub fn seed_from_dir(&self, catalog_dir: &Path) -> Result<SeedStats, StoreError> {
        let movies = cinelist_catalog::load_catalog(catalog_dir)
            .map_err(|e| StoreError::invalid(e.to_string()))?;
        log::debug!(
            "Loaded {} catalog movies from {}",
            movies.len(),
            catalog_dir.display()
        );
        self.seed(&movies)
    }
}

/// Resolve a movie reference on a connection that is already inside a
/// transaction.
pub(crate) fn resolve_or_create_in(
    conn: &Connection,
    movie: &MovieRef,
) -> Result<Resolved, StoreError> {
    match movie {
        MovieRef::Id(id) => {
            let movie = queries::find_movie_by_id(conn, *id)?
                .ok_or_else(|| StoreError::not_found(format!("movie {id}")))?;
            Ok(Resolved {
                movie,
                created: false,
            })
        }
        MovieRef::Title(new) => match_or_insert(conn, None, new),
        MovieRef::Keyed { id, movie: new } => {
            if let Some(movie) = queries::find_movie_by_id(conn, *id)? {
                return Ok(Resolved {
                    movie,
                    created: false,
                });
            }
            match_or_insert(conn, Some(*id), new)
        }
    }
}

fn match_or_insert(
    conn: &Connection,
    id: Option<i64>,
    new: &NewMovie,
) -> Result<Resolved, StoreError> {
    if new.title.trim().is_empty() {
        return Err(StoreError::invalid("movie title must not be empty"));
    }
    if let Some(movie) = queries::find_movie_by_title(conn, &new.title)? {
        return Ok(Resolved {
            movie,
            created: false,
        });
    }

    let inserted = match id {
        Some(id) => {
            operations::insert_movie_with_id(conn, id, new, Provenance::UserCreated).map(|_| id)
        }
        None => operations::insert_movie(conn, new, Provenance::UserCreated),
    };

    match inserted {
        Ok(id) => {
            let movie = queries::find_movie_by_id(conn, id)?
                .ok_or_else(|| StoreError::not_found(format!("movie {id}")))?;
            log::debug!("Created user movie {} '{}'", movie.id, movie.title);
            Ok(Resolved {
                movie,
                created: true,
            })
        }
        // Someone else created the same title first; use their record.
        Err(e) if e.is_conflict() => {
            let movie = queries::find_movie_by_title(conn, &new.title)?
                .ok_or_else(|| StoreError::Conflict(format!("movie '{}'", new.title.trim())))?;
            Ok(Resolved {
                movie,
                created: false,
            })
        }
        Err(e) => Err(e.into()),
    }
}
