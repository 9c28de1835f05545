use cinelist_catalog::{NewMovie, Provenance};
use cinelist_db::{Connection, find_entry, insert_user, open_memory};
use cinelist_lib::*;

fn setup() -> (Connection, i64) {
    let conn = open_memory().unwrap();
    let owner = insert_user(&conn, "u1", "hash", None).unwrap();
    (conn, owner)
}

#[test]
fn title_match_returns_existing_record_untouched() {
    let (conn, _) = setup();
    let catalog = MovieCatalog::new(&conn);

    let first = catalog
        .resolve_or_create(&MovieRef::Title(
            NewMovie::titled("Blade Runner").with_poster("/br.jpg"),
        ))
        .unwrap();
    assert!(first.created);

    let second = catalog
        .resolve_or_create(&MovieRef::Title(
            NewMovie::titled("blade runner").with_poster("/other.jpg"),
        ))
        .unwrap();
    assert!(!second.created);
    assert_eq!(second.movie.id, first.movie.id);
    assert_eq!(second.movie.poster_path.as_deref(), Some("/br.jpg"));
}

#[test]
fn empty_title_is_invalid() {
    let (conn, _) = setup();
    let err = MovieCatalog::new(&conn)
        .resolve_or_create(&MovieRef::title("  "))
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidInput(_)));
}

#[test]
fn keyed_reference_prefers_id_then_title() {
    let (conn, _) = setup();
    let catalog = MovieCatalog::new(&conn);

    let inserted = catalog
        .resolve_or_create(&MovieRef::Keyed {
            id: 27205,
            movie: NewMovie::titled("Inception"),
        })
        .unwrap();
    assert!(inserted.created);
    assert_eq!(inserted.movie.id, 27205);

    let by_id = catalog
        .resolve_or_create(&MovieRef::Keyed {
            id: 27205,
            movie: NewMovie::titled("Something Else"),
        })
        .unwrap();
    assert_eq!(by_id.movie.title, "Inception");

    let by_title = catalog
        .resolve_or_create(&MovieRef::Keyed {
            id: 1,
            movie: NewMovie::titled("INCEPTION"),
        })
        .unwrap();
    assert_eq!(by_title.movie.id, 27205);
    assert!(!by_title.created);
}

#[test]
fn seed_is_idempotent_and_marks_provenance() {
    let (conn, _) = setup();
    let catalog = MovieCatalog::new(&conn);
    let seed = vec![
        NewMovie::titled("Heat").with_release("1995"),
        NewMovie::titled("Alien").with_release("1979"),
    ];

    let first = catalog.seed(&seed).unwrap();
    assert_eq!(first.added, 2);
    let again = catalog.seed(&seed).unwrap();
    assert_eq!(again.added, 0);
    assert_eq!(again.unchanged, 2);

    let heat = catalog.find_by_title("heat").unwrap().unwrap();
    assert_eq!(heat.provenance, Provenance::SystemSeeded);
    assert!(catalog.user_created().unwrap().is_empty());
}

#[test]
fn seed_from_bundled_catalog() {
    let (conn, _) = setup();
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../catalog");
    let stats = MovieCatalog::new(&conn).seed_from_dir(&dir).unwrap();
    assert_eq!(stats.added, 10);

    // Every CLI invocation reseeds on open; repeats must be no-ops.
    let again = MovieCatalog::new(&conn).seed_from_dir(&dir).unwrap();
    assert_eq!(again.added, 0);
    assert_eq!(again.unchanged, 10);
}

#[test]
fn seed_from_unreadable_catalog_is_invalid_input() {
    let (conn, _) = setup();
    let tmp = tempfile::tempdir().unwrap();
    let movies = tmp.path().join("movies");
    std::fs::create_dir_all(&movies).unwrap();
    std::fs::write(movies.join("broken.yaml"), "- title: [unclosed\n").unwrap();

    let err = MovieCatalog::new(&conn).seed_from_dir(tmp.path()).unwrap_err();
    assert!(matches!(err, StoreError::InvalidInput(_)));
}

#[test]
fn delete_cascades_across_lists_only_for_that_movie() {
    let (conn, owner) = setup();
    let store = ListStore::new(&conn);
    let catalog = MovieCatalog::new(&conn);

    let first = store.create_list(owner, "One").unwrap();
    let second = store.create_list(owner, "Two").unwrap();
    let doomed = store
        .add_entry(&first.private_id, &MovieRef::title("Doomed"), None)
        .unwrap();
    let kept = store
        .add_entry(&first.private_id, &MovieRef::title("Kept"), None)
        .unwrap();
    let doomed_again = store
        .add_entry(&second.private_id, &MovieRef::Id(doomed.movie.id), None)
        .unwrap();

    let removed = catalog.delete(doomed.movie.id).unwrap();
    assert_eq!(removed, 2);

    assert!(find_entry(&conn, doomed.id).unwrap().is_none());
    assert!(find_entry(&conn, doomed_again.id).unwrap().is_none());
    let survivor = find_entry(&conn, kept.id).unwrap().unwrap();
    assert_eq!(survivor.rank, 1);
    assert!(catalog.find(doomed.movie.id).unwrap_err().is_not_found());
}

#[test]
fn user_created_lists_only_user_movies() {
    let (conn, _) = setup();
    let catalog = MovieCatalog::new(&conn);
    catalog.seed(&[NewMovie::titled("Seeded")]).unwrap();
    catalog.resolve_or_create(&MovieRef::title("Mine")).unwrap();

    let titles: Vec<String> = catalog
        .user_created()
        .unwrap()
        .into_iter()
        .map(|m| m.title)
        .collect();
    assert_eq!(titles, vec!["Mine".to_string()]);
}
