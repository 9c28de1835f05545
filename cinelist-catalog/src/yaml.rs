//! YAML loading for the human-curated canonical movie set.
//!
//! Loads seed movie definitions from the `catalog/` directory.

use crate::types::NewMovie;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum YamlError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("YAML parse error in {path}: {source}")]
    Parse {
        path: String,
        source: serde_yml::Error,
    },
    #[error("Directory not found: {0}")]
    DirNotFound(String),
    #[error("Seed movie with empty title in {0}")]
    EmptyTitle(String),
}

/// Load all seed movies from YAML files in a directory.
///
/// Each `.yaml` file should contain a YAML sequence (list) of `NewMovie`
/// entries. Files are read in name order so later files can be reasoned
/// about deterministically; a missing directory yields an empty set.
pub fn load_seed_movies(dir: &Path) -> Result<Vec<NewMovie>, YamlError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    if !dir.is_dir() {
        return Err(YamlError::DirNotFound(dir.display().to_string()));
    }

    let mut all = Vec::new();
    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .map_err(|e| YamlError::Io {
            path: dir.display().to_string(),
            source: e,
        })?
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path()
                .extension()
                .is_some_and(|ext| ext == "yaml" || ext == "yml")
        })
        .collect();
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        let contents = std::fs::read_to_string(&path).map_err(|e| YamlError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let movies: Vec<NewMovie> =
            serde_yml::from_str(&contents).map_err(|e| YamlError::Parse {
                path: path.display().to_string(),
                source: e,
            })?;
        if movies.iter().any(|m| m.title.trim().is_empty()) {
            return Err(YamlError::EmptyTitle(path.display().to_string()));
        }
        all.extend(movies);
    }

    Ok(all)
}

/// Load the canonical movie set from the standard directory layout.
///
/// Expected structure:
/// ```text
/// catalog_dir/
///   movies/
///     classics.yaml
///     ...
/// ```
pub fn load_catalog(catalog_dir: &Path) -> Result<Vec<NewMovie>, YamlError> {
    load_seed_movies(&catalog_dir.join("movies"))
}
