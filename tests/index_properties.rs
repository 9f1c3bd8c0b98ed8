//! Behavioral properties of the path index.

use chrono::{DateTime, Utc};
use keytree::index::FileSystemIndex;
use keytree::types::ObjectEntry;
use proptest::prelude::*;
use std::collections::BTreeSet;

fn ts() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

fn entry(path: &str, size: u64) -> ObjectEntry {
    ObjectEntry {
        path: path.to_string(),
        size,
        uploaded_at: ts(),
        entity_tag: format!("etag-{}", path),
    }
}

fn index_of(paths: &[&str]) -> FileSystemIndex {
    let mut index = FileSystemIndex::new();
    for (i, path) in paths.iter().enumerate() {
        index.insert(path, entry(path, i as u64 + 1));
    }
    index
}

#[test]
fn listing_scenario_matches_expected_partition() {
    let index = index_of(&["a/b/c.txt", "a/b/d.txt", "a/e.txt"]);

    let contents = index.directory_contents("/a");
    assert_eq!(contents.directories.len(), 1);
    assert_eq!(contents.directories[0].name, "b");
    assert_eq!(contents.directories[0].path, "/a/b");
    assert_eq!(contents.files.len(), 1);
    assert_eq!(contents.files[0].path, "a/e.txt");

    let contents = index.directory_contents("/a/b");
    assert!(contents.directories.is_empty());
    let names: Vec<_> = contents.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(names, vec!["a/b/c.txt", "a/b/d.txt"]);
}

#[test]
fn removing_last_files_removes_synthesized_directory() {
    let mut index = index_of(&["a/b/c.txt", "a/b/d.txt", "a/e.txt"]);

    index.remove("a/b/c.txt");
    index.remove("a/b/d.txt");

    let contents = index.directory_contents("/a");
    assert!(contents.directories.is_empty());
    assert_eq!(contents.files.len(), 1);
}

#[test]
fn inserted_entry_visible_in_parent_until_removed() {
    let mut index = FileSystemIndex::new();
    index.insert("docs/report.pdf", entry("docs/report.pdf", 42));

    let contents = index.directory_contents("docs");
    assert_eq!(contents.files.len(), 1);
    assert_eq!(contents.files[0].size, 42);

    index.remove("docs/report.pdf");
    let contents = index.directory_contents("docs");
    assert!(contents.files.is_empty());
    // docs itself is gone from the root listing too
    assert!(index.directory_contents("/").directories.is_empty());
}

#[test]
fn listing_is_sorted_case_sensitively() {
    let index = index_of(&["dir/Zeta.txt", "dir/alpha.txt", "dir/Beta.txt"]);
    let names: Vec<_> = index
        .directory_contents("dir")
        .files
        .iter()
        .map(|f| f.path.clone())
        .collect();
    // uppercase sorts before lowercase in a byte-wise comparison
    assert_eq!(names, vec!["dir/Beta.txt", "dir/Zeta.txt", "dir/alpha.txt"]);
}

#[test]
fn folder_structure_never_contains_childless_nodes() {
    let index = index_of(&["a/b/c.txt", "top.txt", "x/y.txt"]);
    let tree = index.folder_structure();

    fn assert_no_childless_dirs_with_files_only(
        node: &keytree::types::FolderNode,
        index: &FileSystemIndex,
    ) {
        for child in &node.children {
            // every reported folder really has children in the index
            let contents = index.directory_contents(&child.path);
            assert!(
                !contents.directories.is_empty() || !contents.files.is_empty(),
                "folder {} reported with no contents",
                child.path
            );
            assert_no_childless_dirs_with_files_only(child, index);
        }
    }
    assert_no_childless_dirs_with_files_only(&tree, &index);

    let top: Vec<_> = tree.children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(top, vec!["a", "x"]);
}

fn segment() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["a", "b", "c", "data", "x"])
}

fn key() -> impl Strategy<Value = String> {
    prop::collection::vec(segment(), 1..5).prop_map(|segs| segs.join("/"))
}

fn key_set() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set(key(), 1..16).prop_map(|set| set.into_iter().collect())
}

proptest! {
    #[test]
    fn insert_is_idempotent(paths in key_set()) {
        let mut once = FileSystemIndex::new();
        let mut twice = FileSystemIndex::new();
        for path in &paths {
            once.insert(path, entry(path, 7));
            twice.insert(path, entry(path, 7));
            twice.insert(path, entry(path, 7));
        }
        prop_assert_eq!(once.file_count(), twice.file_count());
        prop_assert_eq!(once.folder_structure(), twice.folder_structure());
        for path in &paths {
            prop_assert_eq!(once.directory_contents(path), twice.directory_contents(path));
        }
    }

    #[test]
    fn insertion_order_is_irrelevant(paths in key_set().prop_shuffle()) {
        let sorted: Vec<String> = {
            let mut s = paths.clone();
            s.sort();
            s
        };
        let shuffled_index = {
            let mut index = FileSystemIndex::new();
            for path in &paths {
                index.insert(path, entry(path, 7));
            }
            index
        };
        let sorted_index = {
            let mut index = FileSystemIndex::new();
            for path in &sorted {
                index.insert(path, entry(path, 7));
            }
            index
        };

        prop_assert_eq!(shuffled_index.folder_structure(), sorted_index.folder_structure());

        // every prefix directory lists identically
        let mut prefixes = BTreeSet::new();
        prefixes.insert(String::new());
        for path in &paths {
            let segs: Vec<_> = path.split('/').collect();
            for i in 1..=segs.len() {
                prefixes.insert(segs[..i].join("/"));
            }
        }
        for prefix in prefixes {
            prop_assert_eq!(
                shuffled_index.directory_contents(&prefix),
                sorted_index.directory_contents(&prefix)
            );
        }
    }

    #[test]
    fn removing_everything_leaves_no_phantom_directories(paths in key_set()) {
        let mut index = FileSystemIndex::new();
        for path in &paths {
            index.insert(path, entry(path, 7));
        }
        for path in &paths {
            index.remove(path);
        }
        prop_assert_eq!(index.file_count(), 0);
        prop_assert!(index.folder_structure().children.is_empty());
        prop_assert!(index.validate().is_ok());
    }

    #[test]
    fn index_always_validates(paths in key_set()) {
        let mut index = FileSystemIndex::new();
        for path in &paths {
            index.insert(path, entry(path, 7));
        }
        prop_assert!(index.validate().is_ok());
    }
}
