use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tetromino_feed::core::{
    BagPolicy, FilteredRepeat, OneOfEach, PassThrough, SeededSource, Unpacker,
};
use tetromino_feed::types::DEFAULT_MAX_DRAWS_PER_BAG;

fn bench_pack_one_of_each(c: &mut Criterion) {
    let policy = OneOfEach::default();
    let mut source = SeededSource::pieces(12345);

    c.bench_function("pack_one_of_each", |b| {
        b.iter(|| black_box(policy.pack(&mut source)))
    });
}

fn bench_pack_pass_through(c: &mut Criterion) {
    let policy = PassThrough;
    let mut source = SeededSource::pieces(12345);

    c.bench_function("pack_pass_through", |b| {
        b.iter(|| black_box(policy.pack(&mut source)))
    });
}

fn bench_pack_filtered_repeat(c: &mut Criterion) {
    let policy = FilteredRepeat::new(1, 7, DEFAULT_MAX_DRAWS_PER_BAG);
    let mut source = SeededSource::pieces(12345);

    c.bench_function("pack_filtered_repeat", |b| {
        b.iter(|| black_box(policy.pack(&mut source)))
    });
}

fn bench_unpacker_next(c: &mut Criterion) {
    let mut unpacker = Unpacker::new(
        Arc::new(OneOfEach::default()),
        Box::new(SeededSource::pieces(12345)),
    );

    c.bench_function("unpacker_next", |b| {
        b.iter(|| black_box(unpacker.next()))
    });
}

criterion_group!(
    benches,
    bench_pack_one_of_each,
    bench_pack_pass_through,
    bench_pack_filtered_repeat,
    bench_unpacker_next
);
criterion_main!(benches);
