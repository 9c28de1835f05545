//! Administrative user management.

use cinelist_catalog::{User, UserSummary};
use cinelist_db::{Connection, operations, queries};

use crate::error::StoreError;

/// Register a user with an already-computed password hash.
pub fn add_user(conn: &Connection, username: &str, password_hash: &str) -> Result<User, StoreError> {
    let username = username.trim();
    let id = operations::insert_user(conn, username, password_hash, None).map_err(|e| {
        if e.is_conflict() {
            StoreError::Conflict(format!("username '{username}' is taken"))
        } else {
            e.into()
        }
    })?;
    find_user(conn, id)
}

pub fn find_user(conn: &Connection, id: i64) -> Result<User, StoreError> {
    queries::find_user_by_id(conn, id)?.ok_or_else(|| StoreError::not_found(format!("user {id}")))
}

/// Every user with a list count, leaving out the administrator account.
pub fn list_users(conn: &Connection, admin_username: &str) -> Result<Vec<UserSummary>, StoreError> {
    Ok(queries::users_with_list_counts(conn, Some(admin_username))?)
}

pub fn rename_user(conn: &Connection, id: i64, username: &str) -> Result<(), StoreError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(StoreError::invalid("username must not be empty"));
    }
    operations::rename_user(conn, id, username).map_err(|e| {
        if e.is_conflict() {
            StoreError::Conflict(format!("username '{username}' is taken"))
        } else {
            e.into()
        }
    })
}

/// Delete a user along with their lists and entries. Returns how many lists
/// went with them.
pub fn delete_user(conn: &Connection, id: i64) -> Result<usize, StoreError> {
    let tx = conn.unchecked_transaction()?;
    let lists = queries::lists_for_owner(&tx, id)?.len();
    operations::delete_user(&tx, id)?;
    tx.commit()?;
    log::info!("Deleted user {id} and {lists} lists");
    Ok(lists)
}
