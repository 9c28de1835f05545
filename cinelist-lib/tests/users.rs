use cinelist_db::open_memory;
use cinelist_lib::{ListStore, MovieRef, StoreError, users};

#[test]
fn add_user_rejects_taken_username() {
    let conn = open_memory().unwrap();
    let alice = users::add_user(&conn, " alice ", "h").unwrap();
    assert_eq!(alice.username, "alice");
    assert!(matches!(
        users::add_user(&conn, "alice", "h2"),
        Err(StoreError::Conflict(_))
    ));
}

#[test]
fn listing_hides_the_admin_account() {
    let conn = open_memory().unwrap();
    users::add_user(&conn, "admin", "h").unwrap();
    let alice = users::add_user(&conn, "alice", "h").unwrap();
    ListStore::new(&conn).create_list(alice.id, "Faves").unwrap();

    let listed = users::list_users(&conn, "admin").unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].username, "alice");
    assert_eq!(listed[0].list_count, 1);
}

#[test]
fn rename_to_taken_name_is_a_conflict() {
    let conn = open_memory().unwrap();
    let alice = users::add_user(&conn, "alice", "h").unwrap();
    users::add_user(&conn, "bob", "h").unwrap();

    assert!(matches!(
        users::rename_user(&conn, alice.id, "bob"),
        Err(StoreError::Conflict(_))
    ));
    users::rename_user(&conn, alice.id, "alicia").unwrap();
    assert_eq!(users::find_user(&conn, alice.id).unwrap().username, "alicia");
}

#[test]
fn delete_user_takes_lists_and_entries() {
    let conn = open_memory().unwrap();
    let alice = users::add_user(&conn, "alice", "h").unwrap();
    let store = ListStore::new(&conn);
    let list = store.create_list(alice.id, "Faves").unwrap();
    store
        .add_entry(&list.private_id, &MovieRef::title("Heat"), None)
        .unwrap();

    assert_eq!(users::delete_user(&conn, alice.id).unwrap(), 1);
    assert!(store.get_list(&list.public_id).unwrap_err().is_not_found());
    assert!(users::find_user(&conn, alice.id).unwrap_err().is_not_found());

    // The movie outlives the list.
    assert!(cinelist_db::find_movie_by_title(&conn, "Heat").unwrap().is_some());
}
