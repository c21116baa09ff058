use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::time::Duration;
use substrate_containers::{Array, ObjectArray};

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn bench_add_100k(c: &mut Criterion) {
    c.bench_function("array::add_100k", |b| {
        b.iter(|| {
            let mut a: Array<u64> = Array::new();
            for x in lcg(1).take(100_000) {
                a.add(x);
            }
            black_box(a)
        })
    });

    c.bench_function("object_array::add_100k", |b| {
        b.iter(|| {
            let mut a: ObjectArray<u64> = ObjectArray::new();
            for x in lcg(1).take(100_000) {
                a.add(x);
            }
            black_box(a)
        })
    });
}

fn bench_insert_front_10k(c: &mut Criterion) {
    c.bench_function("array::insert_front_10k", |b| {
        b.iter(|| {
            let mut a: Array<u64> = Array::new();
            for x in lcg(2).take(10_000) {
                a.insert(0, x);
            }
            black_box(a)
        })
    });
}

fn bench_remove_sorted_10k(c: &mut Criterion) {
    c.bench_function("array::remove_sorted_10k_of_100k", |b| {
        b.iter_batched(
            || {
                let a: Array<u64> = lcg(3).take(100_000).collect();
                let sel: Vec<usize> = (0..100_000).step_by(10).collect();
                (a, sel)
            },
            |(mut a, sel)| {
                a.remove_sorted(&sel);
                black_box(a)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(20)
        .measurement_time(Duration::from_secs(3))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_add_100k, bench_insert_front_10k, bench_remove_sorted_10k
}
criterion_main!(benches);
