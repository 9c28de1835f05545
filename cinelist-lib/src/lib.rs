//! Movie lists with shareable read-only and owner identifiers.
//!
//! The [`ListStore`] owns list and entry mutation, the [`MovieCatalog`]
//! resolves movie references, and the [`AccessResolver`] turns a request's
//! identifier and credentials into a single [`Access`] decision.

pub mod access;
pub mod error;
pub mod movies;
pub mod ranks;
pub mod settings;
pub mod store;
pub mod tokens;
pub mod users;

pub use access::{
    Access, AccessRequest, AccessResolver, Caller, CredentialVerifier, Credentials,
    ListSelector, NoCredentials, resolve_identifier,
};
pub use error::StoreError;
pub use movies::{MovieCatalog, MovieRef, Resolved};
pub use ranks::{AfterLast, RankSource};
pub use settings::{Settings, SettingsError, load_settings, load_settings_from, settings_path};
pub use store::{
    AccessLevel, CreatedList, EntryView, ListStore, ListView, RankUpdate, ReorderOutcome,
    ReorderPolicy,
};
pub use tokens::{TokenGenerator, UuidTokens};
