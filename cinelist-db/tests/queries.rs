use cinelist_catalog::types::*;
use cinelist_db::*;

struct Fixture {
    conn: Connection,
    alice: i64,
    list: i64,
}

fn fixture() -> Fixture {
    let conn = open_memory().unwrap();
    let alice = insert_user(&conn, "alice", "hash-a", None).unwrap();
    let list = insert_list(
        &conn,
        &NewList {
            user_id: alice,
            name: "Favourites",
            public_id: "pub-1",
            private_id: "priv-1",
            is_public: true,
            created_at: None,
        },
    )
    .unwrap();
    Fixture { conn, alice, list }
}

#[test]
fn find_list_by_each_identifier() {
    let f = fixture();
    let by_public = find_list_by_public_id(&f.conn, "pub-1").unwrap().unwrap();
    let by_private = find_list_by_private_id(&f.conn, "priv-1").unwrap().unwrap();
    assert_eq!(by_public.id, f.list);
    assert_eq!(by_private.id, f.list);

    // Tokens never resolve across spaces
    assert!(find_list_by_public_id(&f.conn, "priv-1").unwrap().is_none());
    assert!(find_list_by_private_id(&f.conn, "pub-1").unwrap().is_none());
}

#[test]
fn token_in_use_checks_both_columns() {
    let f = fixture();
    assert!(token_in_use(&f.conn, "pub-1").unwrap());
    assert!(token_in_use(&f.conn, "priv-1").unwrap());
    assert!(!token_in_use(&f.conn, "fresh").unwrap());
}

#[test]
fn max_rank_of_empty_list_is_none() {
    let f = fixture();
    assert_eq!(max_rank(&f.conn, f.list).unwrap(), None);
}

#[test]
fn entries_come_back_in_rank_order_with_movies() {
    let f = fixture();
    let a = insert_movie(&f.conn, &NewMovie::titled("Alpha"), Provenance::UserCreated).unwrap();
    let b = insert_movie(&f.conn, &NewMovie::titled("Beta"), Provenance::UserCreated).unwrap();
    let c = insert_movie(&f.conn, &NewMovie::titled("Gamma"), Provenance::UserCreated).unwrap();
    insert_entry(&f.conn, f.list, a, 5, None).unwrap();
    insert_entry(&f.conn, f.list, b, 0, Some("first")).unwrap();
    insert_entry(&f.conn, f.list, c, 2, None).unwrap();

    let entries = entries_with_movies(&f.conn, f.list).unwrap();
    let titles: Vec<_> = entries.iter().map(|e| e.movie.title.as_str()).collect();
    assert_eq!(titles, ["Beta", "Gamma", "Alpha"]);
    assert_eq!(entries[0].entry.annotation.as_deref(), Some("first"));
    assert_eq!(max_rank(&f.conn, f.list).unwrap(), Some(5));
}

#[test]
fn find_entry_for_movie_in_list() {
    let f = fixture();
    let a = insert_movie(&f.conn, &NewMovie::titled("Alpha"), Provenance::UserCreated).unwrap();
    let b = insert_movie(&f.conn, &NewMovie::titled("Beta"), Provenance::UserCreated).unwrap();
    insert_entry(&f.conn, f.list, a, 0, None).unwrap();

    assert!(find_entry_for_movie(&f.conn, f.list, a).unwrap().is_some());
    assert!(find_entry_for_movie(&f.conn, f.list, b).unwrap().is_none());
}

#[test]
fn lists_for_owner_counts_entries() {
    let f = fixture();
    let a = insert_movie(&f.conn, &NewMovie::titled("Alpha"), Provenance::UserCreated).unwrap();
    insert_entry(&f.conn, f.list, a, 0, None).unwrap();
    insert_list(
        &f.conn,
        &NewList {
            user_id: f.alice,
            name: "Empty",
            public_id: "pub-2",
            private_id: "priv-2",
            is_public: false,
            created_at: None,
        },
    )
    .unwrap();

    let lists = lists_for_owner(&f.conn, f.alice).unwrap();
    assert_eq!(lists.len(), 2);
    assert_eq!(lists[0].name, "Favourites");
    assert_eq!(lists[0].entry_count, 1);
    assert_eq!(lists[1].entry_count, 0);
}

#[test]
fn find_list_by_owner_and_name_prefers_oldest() {
    let f = fixture();
    insert_list(
        &f.conn,
        &NewList {
            user_id: f.alice,
            name: "Favourites",
            public_id: "pub-2",
            private_id: "priv-2",
            is_public: true,
            created_at: None,
        },
    )
    .unwrap();
    let found = find_list_by_owner_and_name(&f.conn, f.alice, "Favourites")
        .unwrap()
        .unwrap();
    assert_eq!(found.id, f.list);
}

#[test]
fn users_with_list_counts_can_hide_admin() {
    let f = fixture();
    insert_user(&f.conn, "admin", "x", None).unwrap();

    let all = users_with_list_counts(&f.conn, None).unwrap();
    assert_eq!(all.len(), 2);

    let visible = users_with_list_counts(&f.conn, Some("admin")).unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].username, "alice");
    assert_eq!(visible[0].list_count, 1);
}

#[test]
fn movies_by_provenance_filters() {
    let f = fixture();
    seed_movies(&f.conn, &[NewMovie::titled("Seeded")]).unwrap();
    insert_movie(&f.conn, &NewMovie::titled("Custom"), Provenance::UserCreated).unwrap();

    let custom = movies_by_provenance(&f.conn, Provenance::UserCreated).unwrap();
    assert_eq!(custom.len(), 1);
    assert_eq!(custom[0].title, "Custom");
}

#[test]
fn stats_count_every_table() {
    let f = fixture();
    let a = insert_movie(&f.conn, &NewMovie::titled("Alpha"), Provenance::SystemSeeded).unwrap();
    insert_entry(&f.conn, f.list, a, 0, None).unwrap();

    let stats = catalog_stats(&f.conn).unwrap();
    assert_eq!(
        stats,
        CatalogStats {
            users: 1,
            movies: 1,
            seeded_movies: 1,
            lists: 1,
            entries: 1,
            imports: 0,
        }
    );
}

#[test]
fn import_log_round_trip() {
    let f = fixture();
    let log = ImportLog {
        source_name: "backup.json".to_string(),
        snapshot_version: 1,
        imported_at: "2026-01-01T00:00:00+00:00".to_string(),
        users_created: 2,
        entries_skipped: 1,
        ..Default::default()
    };
    insert_import_log(&f.conn, &log).unwrap();

    let logs = list_import_logs(&f.conn, 10).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].source_name, "backup.json");
    assert_eq!(logs[0].users_created, 2);
    assert_eq!(logs[0].entries_skipped, 1);
}
