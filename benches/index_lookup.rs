//! Index hot-path benchmarks: directory listing and folder-tree derivation
//! against a populated index.

use chrono::DateTime;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use keytree::index::FileSystemIndex;
use keytree::types::ObjectEntry;

fn populated_index(objects: usize) -> FileSystemIndex {
    let ts = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
    let mut index = FileSystemIndex::new();
    for i in 0..objects {
        let path = format!("tenant{}/project{}/file{}.dat", i % 8, i % 64, i);
        index.insert(
            &path,
            ObjectEntry {
                path: path.clone(),
                size: (i as u64 + 1) * 100,
                uploaded_at: ts,
                entity_tag: format!("etag-{}", i),
            },
        );
    }
    index
}

fn bench_index(c: &mut Criterion) {
    let index = populated_index(10_000);

    c.bench_function("directory_contents_10k", |b| {
        b.iter(|| index.directory_contents(black_box("tenant3/project35")))
    });

    c.bench_function("directory_contents_missing_10k", |b| {
        b.iter(|| index.directory_contents(black_box("no/such/path")))
    });

    c.bench_function("folder_structure_10k", |b| {
        b.iter(|| index.folder_structure())
    });

    c.bench_function("insert_remove_10k", |b| {
        b.iter(|| {
            let mut index = index.clone();
            index.insert(
                "tenant0/incoming/new.dat",
                ObjectEntry {
                    path: "tenant0/incoming/new.dat".to_string(),
                    size: 1,
                    uploaded_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
                    entity_tag: "etag-new".to_string(),
                },
            );
            index.remove("tenant0/incoming/new.dat");
            index
        })
    });
}

criterion_group!(benches, bench_index);
criterion_main!(benches);
