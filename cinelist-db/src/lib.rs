//! SQLite persistence layer for users, movies, lists, and ranked entries.
//!
//! Provides schema creation, row-level write operations, and query APIs
//! backed by SQLite (via rusqlite with bundled feature).

pub mod operations;
pub mod queries;
pub mod schema;

pub use operations::{
    delete_entry, delete_list, delete_movie, delete_user, insert_entry, insert_import_log,
    insert_list, insert_movie, insert_movie_with_id, insert_user, is_unique_violation,
    rename_list, rename_user, seed_movies, set_entry_annotation,
    set_entry_rank, update_movie_metadata, NewList, OperationError, SeedStats,
};
pub use queries::{
    all_entries, all_lists, all_movies, all_users, catalog_stats, entries_for_list,
    entries_with_movies, find_entry, find_entry_for_movie, find_list_by_id,
    find_list_by_owner_and_name, find_list_by_private_id, find_list_by_public_id,
    find_movie_by_id, find_movie_by_title, find_user_by_id, find_user_by_username,
    list_import_logs, lists_for_owner, max_rank, movies_by_provenance, rank_taken, token_in_use,
    users_with_list_counts, CatalogStats,
};
pub use rusqlite::Connection;
pub use schema::{open_database, open_memory};
