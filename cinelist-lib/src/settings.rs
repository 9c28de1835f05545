//! Application settings (database location, catalog directory, reorder policy).
//!
//! The settings file lives at `~/.config/cinelist/settings.toml`. Every key is
//! optional; a missing file yields the defaults. A few keys can be overridden
//! from the environment so deployments don't need a config file at all.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::ReorderPolicy;

pub const ENV_DATABASE: &str = "CINELIST_DB";
pub const ENV_CATALOG_DIR: &str = "CINELIST_CATALOG_DIR";
pub const ENV_REORDER_POLICY: &str = "CINELIST_REORDER_POLICY";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub catalog: CatalogSettings,
    pub lists: ListSettings,
    pub admin: AdminSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Defaults to `<data dir>/cinelist/cinelist.db`
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub dir: Option<PathBuf>,
    /// Reconcile the canonical movie set every time the database is opened.
    pub seed_on_open: bool,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            dir: None,
            seed_on_open: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListSettings {
    pub reorder_policy: ReorderPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminSettings {
    /// Account hidden from the administrative user listing.
    pub username: String,
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
        }
    }
}

/// Canonical path to the settings file: `~/.config/cinelist/settings.toml`.
pub fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("cinelist").join("settings.toml")
}

/// Default database location when neither the CLI, the environment, nor the
/// settings file name one.
pub fn default_database_path() -> PathBuf {
    let data = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    data.join("cinelist").join("cinelist.db")
}

/// Load settings from the canonical location and apply environment overrides.
pub fn load_settings() -> Result<Settings, SettingsError> {
    let mut settings = load_settings_from(&settings_path())?;
    settings.apply_env(|key| std::env::var(key).ok())?;
    Ok(settings)
}

/// Load settings from an explicit file. A missing file is not an error.
pub fn load_settings_from(path: &Path) -> Result<Settings, SettingsError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Settings::default()),
        Err(source) => {
            return Err(SettingsError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    toml::from_str(&contents).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl Settings {
    /// Apply environment overrides. `lookup` is `std::env::var` in production.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(db) = lookup(ENV_DATABASE).filter(|v| !v.is_empty()) {
            self.database.path = Some(PathBuf::from(db));
        }
        if let Some(dir) = lookup(ENV_CATALOG_DIR).filter(|v| !v.is_empty()) {
            self.catalog.dir = Some(PathBuf::from(dir));
        }
        if let Some(policy) = lookup(ENV_REORDER_POLICY).filter(|v| !v.is_empty()) {
            self.lists.reorder_policy =
                policy.parse().map_err(|_| SettingsError::InvalidValue {
                    key: ENV_REORDER_POLICY,
                    value: policy,
                })?;
        }
        Ok(())
    }

    /// Resolve the database path: CLI override, then settings, then default.
    pub fn database_path(&self, cli_override: Option<PathBuf>) -> PathBuf {
        cli_override
            .or_else(|| self.database.path.clone())
            .unwrap_or_else(default_database_path)
    }

    /// Resolve the catalog directory: CLI override, then settings, then
    /// `./catalog` when it exists.
    pub fn catalog_dir(&self, cli_override: Option<PathBuf>) -> Option<PathBuf> {
        cli_override.or_else(|| self.catalog.dir.clone()).or_else(|| {
            let local = PathBuf::from("catalog");
            local.is_dir().then_some(local)
        })
    }
}

/// Persist the reorder policy in the settings file at `path`.
///
/// Uses `toml::Value` for a surgical update so unrelated keys and tables are
/// preserved.
pub fn save_reorder_policy(path: &Path, policy: ReorderPolicy) -> io::Result<()> {
    let mut doc: toml::Value = if let Ok(contents) = std::fs::read_to_string(path) {
        contents
            .parse()
            .unwrap_or_else(|_| toml::Value::Table(Default::default()))
    } else {
        toml::Value::Table(Default::default())
    };

    let table = doc
        .as_table_mut()
        .ok_or_else(|| io::Error::other("settings.toml root is not a table"))?;
    let lists = table
        .entry("lists")
        .or_insert_with(|| toml::Value::Table(Default::default()));
    let lists_table = lists
        .as_table_mut()
        .ok_or_else(|| io::Error::other("[lists] is not a table"))?;
    lists_table.insert(
        "reorder_policy".to_string(),
        toml::Value::String(policy.as_str().to_string()),
    );

    // Write atomically
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let serialized = toml::to_string_pretty(&doc).map_err(io::Error::other)?;
    let tmp = path.with_extension("toml.tmp");
    std::fs::write(&tmp, &serialized)?;
    std::fs::rename(&tmp, path)?;

    Ok(())
}

/// The effective settings rendered as TOML for display.
pub fn render_settings(settings: &Settings) -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = load_settings_from(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(settings, Settings::default());
        assert!(settings.catalog.seed_on_open);
        assert_eq!(settings.admin.username, "admin");
        assert_eq!(settings.lists.reorder_policy, ReorderPolicy::Reject);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("settings.toml");
        std::fs::write(
            &path,
            "[lists]\nreorder_policy = \"renumber\"\n\n[catalog]\nseed_on_open = false\n",
        )
        .unwrap();

        let settings = load_settings_from(&path).unwrap();
        assert_eq!(settings.lists.reorder_policy, ReorderPolicy::Renumber);
        assert!(!settings.catalog.seed_on_open);
        assert_eq!(settings.database.path, None);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("settings.toml");
        std::fs::write(&path, "[lists\n").unwrap();
        assert!(matches!(
            load_settings_from(&path),
            Err(SettingsError::Parse { .. })
        ));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut settings = Settings::default();
        settings
            .apply_env(|key| match key {
                ENV_DATABASE => Some("/srv/cinelist.db".to_string()),
                ENV_REORDER_POLICY => Some("renumber".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(
            settings.database_path(None),
            PathBuf::from("/srv/cinelist.db")
        );
        assert_eq!(settings.lists.reorder_policy, ReorderPolicy::Renumber);
        assert_eq!(settings.catalog.dir, None);
    }

    #[test]
    fn bad_env_policy_is_rejected() {
        let mut settings = Settings::default();
        let err = settings
            .apply_env(|key| (key == ENV_REORDER_POLICY).then(|| "shuffle".to_string()))
            .unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue { .. }));
    }

    #[test]
    fn cli_override_wins() {
        let mut settings = Settings::default();
        settings.database.path = Some(PathBuf::from("from-file.db"));
        assert_eq!(
            settings.database_path(Some(PathBuf::from("cli.db"))),
            PathBuf::from("cli.db")
        );
    }

    #[test]
    fn save_policy_preserves_other_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("settings.toml");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[admin]\nusername = \"root\"\n").unwrap();

        save_reorder_policy(&path, ReorderPolicy::Renumber).unwrap();

        let settings = load_settings_from(&path).unwrap();
        assert_eq!(settings.admin.username, "root");
        assert_eq!(settings.lists.reorder_policy, ReorderPolicy::Renumber);
        assert!(!path.with_extension("toml.tmp").exists());
    }
}
