use criterion::{criterion_group, criterion_main, Criterion};
use engine::tokenizer::tokenize;

fn bench_tokenize(c: &mut Criterion) {
    let description = "Stainless steel water bottle with double-wall vacuum \
        insulation, keeps drinks cold for twenty-four hours and hot for twelve. \
        Leak-proof lid, powder-coated finish, fits standard cup holders.";
    c.bench_function("tokenize_indexing", |b| {
        b.iter(|| tokenize(description, false))
    });
    c.bench_function("tokenize_query_with_typos", |b| {
        b.iter(|| tokenize("stainles steel watter bottle", true))
    });
}

criterion_group!(benches, bench_tokenize);
criterion_main!(benches);
