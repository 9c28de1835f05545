use cinelist_catalog::{NewMovie, Provenance};
use cinelist_db::*;
use cinelist_import::*;

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        .unwrap()
}

fn counts(conn: &Connection) -> [i64; 4] {
    [
        count(conn, "users"),
        count(conn, "movies"),
        count(conn, "lists"),
        count(conn, "list_entries"),
    ]
}

fn new_list<'a>(user_id: i64, name: &'a str, public_id: &'a str, private_id: &'a str) -> NewList<'a> {
    NewList {
        user_id,
        name,
        public_id,
        private_id,
        is_public: true,
        created_at: None,
    }
}

/// One user, one movie, one list, one entry.
fn small_source() -> Connection {
    let conn = open_memory().unwrap();
    let user = insert_user(&conn, "alice", "$argon2id$hash", None).unwrap();
    let movie = insert_movie(&conn, &NewMovie::titled("Heat"), Provenance::UserCreated).unwrap();
    let list = insert_list(&conn, &new_list(user, "Faves", "pub-1", "priv-1")).unwrap();
    insert_entry(&conn, list, movie, 0, Some("classic")).unwrap();
    conn
}

fn entry(id: i64, list_id: i64, movie_id: i64, rank: i64) -> SnapshotEntry {
    SnapshotEntry {
        id,
        list_id,
        movie_id,
        rank,
        annotation: None,
    }
}

#[test]
fn empty_target_receives_everything_with_identifiers_preserved() {
    let source = small_source();
    let snapshot = export_snapshot(&source).unwrap();

    let target = open_memory().unwrap();
    let stats = import_snapshot(&target, &snapshot, "test", None).unwrap();

    assert_eq!(counts(&target), [1, 1, 1, 1]);
    assert_eq!(stats.users_processed(), 1);
    assert_eq!(stats.movies_processed(), 1);
    assert_eq!(stats.lists_processed(), 1);
    assert_eq!(stats.entries_created, 1);

    let list = find_list_by_public_id(&target, "pub-1").unwrap().unwrap();
    assert_eq!(list.private_id, "priv-1");
    let user = find_user_by_username(&target, "alice").unwrap().unwrap();
    assert_eq!(user.password_hash, "$argon2id$hash");
    assert_eq!(list.user_id, user.id);

    let entries = entries_with_movies(&target, list.id).unwrap();
    assert_eq!(entries[0].movie.title, "Heat");
    assert_eq!(entries[0].entry.annotation.as_deref(), Some("classic"));
}

#[test]
fn import_is_idempotent() {
    let source = small_source();
    let snapshot = export_snapshot(&source).unwrap();
    let target = open_memory().unwrap();

    import_snapshot(&target, &snapshot, "first", None).unwrap();
    let after_first = counts(&target);
    let second = import_snapshot(&target, &snapshot, "second", None).unwrap();

    assert_eq!(counts(&target), after_first);
    assert_eq!(second.users_created, 0);
    assert_eq!(second.users_matched, 1);
    assert_eq!(second.movies_matched, 1);
    assert_eq!(second.lists_matched, 1);
    assert_eq!(second.entries_created, 0);
    assert_eq!(second.entries_skipped, 1);
}

#[test]
fn existing_username_absorbs_snapshot_lists() {
    let source = small_source();
    let snapshot = export_snapshot(&source).unwrap();

    let target = open_memory().unwrap();
    insert_user(&target, "zed", "h", None).unwrap();
    let existing = insert_user(&target, "alice", "different-hash", None).unwrap();

    let stats = import_snapshot(&target, &snapshot, "test", None).unwrap();
    assert_eq!(stats.users_created, 0);
    assert_eq!(count(&target, "users"), 2);

    let list = find_list_by_public_id(&target, "pub-1").unwrap().unwrap();
    assert_eq!(list.user_id, existing);
    // The existing account is left untouched.
    let alice = find_user_by_id(&target, existing).unwrap().unwrap();
    assert_eq!(alice.password_hash, "different-hash");
}

#[test]
fn movies_match_case_insensitively() {
    let source = small_source();
    let snapshot = export_snapshot(&source).unwrap();

    let target = open_memory().unwrap();
    let heat = insert_movie(&target, &NewMovie::titled("HEAT"), Provenance::SystemSeeded).unwrap();

    let stats = import_snapshot(&target, &snapshot, "test", None).unwrap();
    assert_eq!(stats.movies_matched, 1);
    assert_eq!(count(&target, "movies"), 1);

    let list = find_list_by_public_id(&target, "pub-1").unwrap().unwrap();
    assert_eq!(entries_for_list(&target, list.id).unwrap()[0].movie_id, heat);
}

#[test]
fn matched_list_is_not_modified() {
    let source = small_source();
    let snapshot = export_snapshot(&source).unwrap();

    let target = open_memory().unwrap();
    let bob = insert_user(&target, "bob", "h", None).unwrap();
    let list = insert_list(&target, &new_list(bob, "Bob's", "pub-1", "bob-priv")).unwrap();

    let stats = import_snapshot(&target, &snapshot, "test", None).unwrap();
    assert_eq!(stats.lists_matched, 1);

    let kept = find_list_by_id(&target, list).unwrap().unwrap();
    assert_eq!(kept.name, "Bob's");
    assert_eq!(kept.user_id, bob);
    assert_eq!(kept.private_id, "bob-priv");
    // The snapshot's entry is merged into the matched list.
    assert_eq!(entries_for_list(&target, list).unwrap().len(), 1);
}

#[test]
fn orphaned_rows_are_skipped() {
    let mut snapshot = export_snapshot(&small_source()).unwrap();
    snapshot.lists.push(SnapshotList {
        id: 99,
        user_id: 404,
        name: "Nobody's".to_string(),
        public_id: "pub-orphan".to_string(),
        private_id: "priv-orphan".to_string(),
        is_public: true,
        created_at: None,
    });
    snapshot.entries.push(entry(50, 99, snapshot.movies[0].id, 0));
    snapshot.entries.push(entry(51, snapshot.lists[0].id, 777, 1));

    let target = open_memory().unwrap();
    let stats = import_snapshot(&target, &snapshot, "test", None).unwrap();

    assert_eq!(stats.lists_skipped, 1);
    assert_eq!(stats.entries_skipped, 2);
    assert_eq!(stats.entries_created, 1);
    assert!(find_list_by_public_id(&target, "pub-orphan").unwrap().is_none());
}

#[test]
fn colliding_rank_is_appended() {
    let source = small_source();
    let snapshot = export_snapshot(&source).unwrap();

    // Target already has the same list with a different movie at rank 0.
    let target = open_memory().unwrap();
    let bob = insert_user(&target, "bob", "h", None).unwrap();
    let list = insert_list(&target, &new_list(bob, "Faves", "pub-1", "priv-1")).unwrap();
    let alien = insert_movie(&target, &NewMovie::titled("Alien"), Provenance::UserCreated).unwrap();
    insert_entry(&target, list, alien, 0, None).unwrap();

    import_snapshot(&target, &snapshot, "test", None).unwrap();

    let ranks: Vec<(String, i64)> = entries_with_movies(&target, list)
        .unwrap()
        .into_iter()
        .map(|e| (e.movie.title, e.entry.rank))
        .collect();
    assert_eq!(
        ranks,
        vec![("Alien".to_string(), 0), ("Heat".to_string(), 1)]
    );
}

#[test]
fn collision_on_the_last_rank_fails_without_writing() {
    let mut snapshot = export_snapshot(&small_source()).unwrap();
    snapshot.entries[0].rank = i64::MAX;

    let target = open_memory().unwrap();
    let bob = insert_user(&target, "bob", "h", None).unwrap();
    let list = insert_list(&target, &new_list(bob, "Faves", "pub-1", "priv-1")).unwrap();
    let alien = insert_movie(&target, &NewMovie::titled("Alien"), Provenance::UserCreated).unwrap();
    insert_entry(&target, list, alien, i64::MAX, None).unwrap();
    let before = counts(&target);

    let err = import_snapshot(&target, &snapshot, "test", None).unwrap_err();
    assert!(matches!(
        err,
        ImportError::RankExhausted { list_id, max: i64::MAX, .. } if list_id == list
    ));
    assert_eq!(counts(&target), before);
    assert_eq!(count(&target, "import_log"), 0);
}

#[test]
fn failure_rolls_back_every_pass() {
    let mut snapshot = export_snapshot(&small_source()).unwrap();
    // An empty username cannot be inserted; the users pass has already
    // written alice by then.
    snapshot.users.push(SnapshotUser {
        id: 2,
        username: "   ".to_string(),
        password_hash: "h".to_string(),
        created_at: None,
    });

    let target = open_memory().unwrap();
    let before = counts(&target);
    assert!(import_snapshot(&target, &snapshot, "bad", None).is_err());
    assert_eq!(counts(&target), before);
    assert_eq!(count(&target, "import_log"), 0);
}

#[test]
fn newer_snapshot_is_rejected_before_writing() {
    let mut snapshot = export_snapshot(&small_source()).unwrap();
    snapshot.version = SNAPSHOT_VERSION + 1;

    let target = open_memory().unwrap();
    let err = import_snapshot(&target, &snapshot, "future", None).unwrap_err();
    assert!(matches!(err, ImportError::UnsupportedVersion { .. }));
    assert_eq!(counts(&target), [0, 0, 0, 0]);
}

#[test]
fn import_is_logged() {
    let snapshot = export_snapshot(&small_source()).unwrap();
    let target = open_memory().unwrap();
    import_snapshot(&target, &snapshot, "backup.json", Some(&SilentProgress)).unwrap();

    let logs = list_import_logs(&target, 10).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].source_name, "backup.json");
    assert_eq!(logs[0].snapshot_version, 1);
    assert_eq!(logs[0].lists_created, 1);
    assert_eq!(logs[0].entries_created, 1);
    assert!(!logs[0].imported_at.is_empty());
}
