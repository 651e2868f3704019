use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use oisst::partition_batches;

fn bench_partition(c: &mut Criterion) {
    let start = NaiveDate::from_ymd_opt(1982, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();

    c.bench_function("partition_batches", |b| {
        b.iter(|| partition_batches(black_box(start), black_box(end), black_box(9)))
    });
}

criterion_group!(benches, bench_partition);
criterion_main!(benches);
