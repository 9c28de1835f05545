//! Data model types for the movie list store.
//!
//! These types represent the persistent schema: users, movie records, lists,
//! list entries, and import tracking.

use serde::{Deserialize, Serialize};

// ── User ────────────────────────────────────────────────────────────────────

/// A registered account. Only the fields needed to reattach list ownership
/// are modelled; the password hash is opaque and never re-hashed here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub created_at: String,
}

// ── Movie ───────────────────────────────────────────────────────────────────

/// Where a movie record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    SystemSeeded,
    UserCreated,
}

impl Default for Provenance {
    fn default() -> Self {
        Self::UserCreated
    }
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SystemSeeded => "system-seeded",
            Self::UserCreated => "user-created",
        }
    }

    pub fn from_str_loose(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "system-seeded" | "seeded" | "system" => Self::SystemSeeded,
            _ => Self::UserCreated,
        }
    }
}

/// A canonical movie record, referenced by list entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieRecord {
    pub id: i64,
    pub title: String,
    /// Artwork reference: a full URL or a provider-relative path.
    pub poster_path: Option<String>,
    /// Free-form release marker, usually just the year.
    pub release_date: Option<String>,
    pub provenance: Provenance,
}

/// Metadata for a movie that may not exist yet.
///
/// Also the shape of one item in the canonical seed YAML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMovie {
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
}

impl NewMovie {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_poster(mut self, poster_path: impl Into<String>) -> Self {
        self.poster_path = Some(poster_path.into());
        self
    }

    pub fn with_release(mut self, release_date: impl Into<String>) -> Self {
        self.release_date = Some(release_date.into());
        self
    }
}

// ── List ────────────────────────────────────────────────────────────────────

/// A named, ordered collection of movies owned by one user.
///
/// `public_id` grants read-only access and `private_id` grants owner access.
/// Neither is regenerated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieList {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub public_id: String,
    pub private_id: String,
    pub is_public: bool,
    pub created_at: String,
}

/// A movie's position within a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub id: i64,
    pub list_id: i64,
    pub movie_id: i64,
    /// Display position; unique within the list, gaps allowed.
    pub rank: i64,
    pub annotation: Option<String>,
}

/// A list entry joined with the movie it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryWithMovie {
    pub entry: ListEntry,
    pub movie: MovieRecord,
}

/// Summary row for an owner's list overview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSummary {
    pub id: i64,
    pub name: String,
    pub public_id: String,
    pub private_id: String,
    pub entry_count: i64,
}

/// Summary row for the admin user overview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub list_count: i64,
    pub created_at: String,
}

// ── Import Tracking ─────────────────────────────────────────────────────────

/// Log entry for one snapshot import.
#[derive(Debug, Clone, Default)]
pub struct ImportLog {
    pub id: i64,
    pub source_name: String,
    pub snapshot_version: i64,
    pub imported_at: String,
    pub users_created: i64,
    pub users_matched: i64,
    pub movies_created: i64,
    pub movies_matched: i64,
    pub lists_created: i64,
    pub lists_matched: i64,
    pub lists_skipped: i64,
    pub entries_created: i64,
    pub entries_skipped: i64,
}
