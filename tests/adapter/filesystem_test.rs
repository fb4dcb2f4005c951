//! Filesystem key lister tests

use std::fs;

use datasuite::adapters::FilesystemKeyLister;
use datasuite::core::ports::KeyLister;
use tempfile::TempDir;

fn tree(paths: &[&str]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for path in paths {
        let full = dir.path().join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, "").unwrap();
    }
    dir
}

#[test]
fn test_keys_are_relative_and_sorted() {
    let dir = tree(&["b/2.csv", "a/1.csv", "a/sub/3.csv", "top.csv"]);
    let lister = FilesystemKeyLister::new(dir.path()).unwrap();
    assert_eq!(
        lister.list_keys("").unwrap(),
        vec!["a/1.csv", "a/sub/3.csv", "b/2.csv", "top.csv"]
    );
}

#[test]
fn test_prefix_narrows_listing() {
    let dir = tree(&["a/1.csv", "ab/2.csv", "b/3.csv"]);
    let lister = FilesystemKeyLister::new(dir.path()).unwrap();
    assert_eq!(lister.list_keys("a/").unwrap(), vec!["a/1.csv"]);
    assert_eq!(lister.list_keys("a").unwrap(), vec!["a/1.csv", "ab/2.csv"]);
}

#[test]
fn test_hidden_entries_are_skipped() {
    let dir = tree(&[".cache/x.csv", "data/.partial.csv", "data/y.csv"]);
    let lister = FilesystemKeyLister::new(dir.path()).unwrap();
    assert_eq!(lister.list_keys("").unwrap(), vec!["data/y.csv"]);
}
