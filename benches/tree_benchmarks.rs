//! Benchmarks for project tree operations.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use codepad_archive::export_zip;
use codepad_core::{ExportConfig, FileTree};
use codepad_tree::build_nodes;

/// Generates a project with `files` files spread over nested folders.
fn generate_tree(files: usize) -> FileTree {
    let mut tree = FileTree::new();
    for i in 0..files {
        let path = format!("src/module_{}/sub_{}/file_{}.js", i % 20, i % 7, i);
        tree.set_content(&path, format!("export const value{} = {};\n", i, i))
            .expect("valid path");
    }
    tree
}

/// Benchmarks turning the flat map into a sorted hierarchy.
fn bench_build_nodes(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_nodes");

    for size in [100, 1000, 10000].iter() {
        let tree = generate_tree(*size);

        group.bench_with_input(BenchmarkId::new("files", size), &tree, |b, tree| {
            b.iter(|| black_box(build_nodes(black_box(tree))))
        });
    }

    group.finish();
}

/// Benchmarks renaming a folder that carries many descendants.
fn bench_folder_rename(c: &mut Criterion) {
    let mut group = c.benchmark_group("folder_rename");

    for size in [100, 1000, 10000].iter() {
        let tree = generate_tree(*size);

        group.bench_with_input(BenchmarkId::new("src", size), &tree, |b, tree| {
            b.iter_batched(
                || tree.clone(),
                |mut tree| {
                    let events = tree.rename("src", "lib").expect("rename");
                    black_box(events)
                },
                criterion::BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

/// Benchmarks ZIP export.
fn bench_export(c: &mut Criterion) {
    let tree = generate_tree(1000);
    let config = ExportConfig::default();

    c.bench_function("export_zip_1000", |b| {
        b.iter(|| black_box(export_zip(black_box(&tree), &config).expect("export")))
    });
}

criterion_group!(benches, bench_build_nodes, bench_folder_rename, bench_export);
criterion_main!(benches);
