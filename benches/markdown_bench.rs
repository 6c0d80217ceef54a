// benches/markdown_bench.rs
//! Benchmarks for markdown <-> block conversion.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use notion_crud::formatting::{blocks_to_markdown, parse_markdown_to_blocks};

/// A document mixing every supported construct, repeated `sections` times.
fn sample_markdown(sections: usize) -> String {
    (0..sections)
        .map(|i| {
            format!(
                "# Section {i}\n\n\
                 Intro paragraph for section {i} with enough text to be realistic.\n\n\
                 - first point\n- second point\n\n\
                 1. step one\n2. step two\n\n\
                 [ ] open task {i}\n[x] done task {i}\n\n\
                 > a quote\n\n\
                 ```rust\nfn section_{i}() {{\n    println!(\"{i}\");\n}}\n```\n\n"
            )
        })
        .collect()
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_markdown_to_blocks");
    for sections in [1, 10, 100] {
        let markdown = sample_markdown(sections);
        group.bench_with_input(BenchmarkId::from_parameter(sections), &markdown, |b, md| {
            b.iter(|| parse_markdown_to_blocks(black_box(md)).unwrap())
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("blocks_to_markdown");
    for sections in [1, 10, 100] {
        let blocks = parse_markdown_to_blocks(&sample_markdown(sections)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(sections), &blocks, |b, blocks| {
            b.iter(|| blocks_to_markdown(black_box(blocks)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_render);
criterion_main!(benches);
