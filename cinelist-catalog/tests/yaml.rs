use cinelist_catalog::{load_catalog, load_seed_movies};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_yaml(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

#[test]
fn load_movies_from_yaml() {
    let tmp = TempDir::new().unwrap();
    let movies_dir = tmp.path().join("movies");
    fs::create_dir(&movies_dir).unwrap();

    write_yaml(
        &movies_dir,
        "classics.yaml",
        r#"
- title: Inception
  poster_path: /edv5CZvWj09upOsy2Y6IwDhK8bt.jpg
- title: "Avengers: Endgame"
  release_date: "2019"
"#,
    );

    let movies = load_seed_movies(&movies_dir).unwrap();
    assert_eq!(movies.len(), 2);
    assert_eq!(movies[0].title, "Inception");
    assert_eq!(
        movies[0].poster_path.as_deref(),
        Some("/edv5CZvWj09upOsy2Y6IwDhK8bt.jpg")
    );
    assert_eq!(movies[0].release_date, None);
    assert_eq!(movies[1].title, "Avengers: Endgame");
    assert_eq!(movies[1].release_date.as_deref(), Some("2019"));
}

#[test]
fn files_are_loaded_in_name_order() {
    let tmp = TempDir::new().unwrap();
    let movies_dir = tmp.path().join("movies");
    fs::create_dir(&movies_dir).unwrap();

    write_yaml(&movies_dir, "b.yaml", "- title: Second\n");
    write_yaml(&movies_dir, "a.yml", "- title: First\n");
    write_yaml(&movies_dir, "notes.txt", "ignored");

    let movies = load_seed_movies(&movies_dir).unwrap();
    let titles: Vec<_> = movies.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, ["First", "Second"]);
}

#[test]
fn missing_dir_returns_empty() {
    let tmp = TempDir::new().unwrap();
    let movies = load_seed_movies(&tmp.path().join("nonexistent")).unwrap();
    assert!(movies.is_empty());
}

#[test]
fn empty_title_is_rejected() {
    let tmp = TempDir::new().unwrap();
    write_yaml(tmp.path(), "bad.yaml", "- title: \"  \"\n");
    assert!(load_seed_movies(tmp.path()).is_err());
}

#[test]
fn invalid_yaml_is_a_parse_error() {
    let tmp = TempDir::new().unwrap();
    write_yaml(tmp.path(), "bad.yaml", "title: [unclosed");
    let err = load_seed_movies(tmp.path()).unwrap_err();
    assert!(err.to_string().contains("bad.yaml"));
}

#[test]
fn bundled_catalog_loads() {
    let catalog = Path::new(env!("CARGO_MANIFEST_DIR")).join("../catalog");
    let movies = load_catalog(&catalog).unwrap();
    assert_eq!(movies.len(), 10);
    assert!(movies.iter().any(|m| m.title == "The Matrix"));
}
