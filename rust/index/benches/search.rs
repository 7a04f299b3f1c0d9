use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{rngs::StdRng, SeedableRng};
use vafile_index::utils::generate_uniform_points;
use vafile_index::{DataRange, VaFile};

const NUM_DIM: usize = 20;
const NUM_POINTS: usize = 50_000;

fn build_index(num_bit: u32) -> VaFile {
    let mut rng = StdRng::seed_from_u64(42);
    let points = generate_uniform_points(&mut rng, NUM_POINTS, NUM_DIM, DataRange::default());
    let mut index = VaFile::construct(NUM_DIM, NUM_POINTS, num_bit, DataRange::default())
        .expect("valid configuration");
    index.bulk_load(points).expect("valid points");
    index
}

fn bulk_load(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let points = generate_uniform_points(&mut rng, NUM_POINTS, NUM_DIM, DataRange::default());
    c.bench_function("bulk_load", |b| {
        b.iter(|| {
            let mut index =
                VaFile::construct(NUM_DIM, NUM_POINTS, 60, DataRange::default()).unwrap();
            index.bulk_load(points.iter().cloned()).unwrap()
        });
    });
}

fn nearest_search(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let queries = generate_uniform_points(&mut rng, 32, NUM_DIM, DataRange::default());
    let mut group = c.benchmark_group("nearest_search");
    for num_bit in [40, 60, 80] {
        let index = build_index(num_bit);
        group.bench_with_input(BenchmarkId::from_parameter(num_bit), &index, |b, index| {
            b.iter(|| {
                for query in &queries {
                    std::hint::black_box(index.nearest_search(2.0, query, 10).unwrap());
                }
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bulk_load, nearest_search);
criterion_main!(benches);
