pub(crate) mod admin;
pub(crate) mod config;
pub(crate) mod lists;
pub(crate) mod movies;
pub(crate) mod users;

use std::path::PathBuf;

use cinelist_db::Connection;
use cinelist_lib::{ListStore, MovieCatalog, Settings};

use crate::CliError;

/// Resolved settings plus the global command-line overrides.
pub(crate) struct Context {
    pub settings: Settings,
    db_override: Option<PathBuf>,
}

impl Context {
    pub(crate) fn new(settings: Settings, db_override: Option<PathBuf>) -> Self {
        Self {
            settings,
            db_override,
        }
    }

    pub(crate) fn db_path(&self) -> PathBuf {
        self.settings.database_path(self.db_override.clone())
    }

    /// Open (creating if needed) the database, then reconcile the canonical
    /// movie set when `catalog.seed_on_open` is set.
    pub(crate) fn open_db(&self) -> Result<Connection, CliError> {
        let path = self.db_path();
        let conn = cinelist_db::open_database(&path).map_err(|e| {
            CliError::database(format!("Failed to open {}: {}", path.display(), e))
        })?;
        log::debug!("Opened database {}", path.display());

        if self.settings.catalog.seed_on_open {
            match self.settings.catalog_dir(None) {
                Some(dir) => {
                    self.catalog(&conn).seed_from_dir(&dir)?;
                }
                None => log::debug!("No catalog directory; skipping seed"),
            }
        }
        Ok(conn)
    }

    pub(crate) fn store<'c>(&self, conn: &'c Connection) -> ListStore<'c> {
        ListStore::new(conn).with_policy(self.settings.lists.reorder_policy)
    }

    pub(crate) fn catalog<'c>(&self, conn: &'c Connection) -> MovieCatalog<'c> {
        MovieCatalog::new(conn)
    }
}

/// Truncate a string to a maximum width, appending "..." if needed.
pub(crate) fn truncate_str(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else if max > 3 {
        let head: String = s.chars().take(max - 3).collect();
        format!("{head}...")
    } else {
        s.chars().take(max).collect()
    }
}
