mod common;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use indiscript::{lexer, parser};

fn bench_frontend(c: &mut Criterion) {
    for workload in common::workloads() {
        let keywords = workload.language.keywords();
        let source = &workload.source;
        let tokens = lexer::tokenize(source, keywords);
        let label = &workload.label;

        c.bench_function(&format!("frontend_tokenize_{label}"), |b| {
            b.iter(|| {
                let out = lexer::tokenize(black_box(source), keywords);
                black_box(out);
            })
        });

        c.bench_function(&format!("frontend_parse_only_{label}"), |b| {
            b.iter(|| {
                let out = parser::parse(black_box(&tokens), keywords).expect("parse");
                black_box(out);
            })
        });

        c.bench_function(&format!("frontend_tokenize_parse_{label}"), |b| {
            b.iter(|| {
                let tokens = lexer::tokenize(black_box(source), keywords);
                let out = parser::parse(&tokens, keywords).expect("parse");
                black_box(out);
            })
        });
    }
}

criterion_group!(benches, bench_frontend);
criterion_main!(benches);
