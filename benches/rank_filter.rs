use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rank_filter::util::Xorshift;
use rank_filter::RankFilter;

const SAMPLES: usize = 10_000;

fn signal(len: usize) -> Vec<u32> {
    let mut xshft = Xorshift::new(1972);
    (0..len).map(|_| xshft.next_val() % 4096).collect()
}

// Sort every reflected window from scratch. This is what the rolling filter
// is measured against.
fn naive(src: &[u32], half_length: usize, rank_pos: usize) -> Vec<u32> {
    let last = src.len() as isize - 1;
    let h = half_length as isize;
    let mut window = Vec::with_capacity(2 * half_length + 1);
    (0..src.len() as isize)
        .map(|p| {
            window.clear();
            for j in p - h..=p + h {
                let idx = if j < 0 {
                    -j
                } else if j > last {
                    2 * last - j
                } else {
                    j
                };
                window.push(src[idx as usize]);
            }
            window.sort_unstable();
            window[rank_pos]
        })
        .collect()
}

fn bench_median_by_window(c: &mut Criterion) {
    let src = signal(SAMPLES);
    let mut dst = vec![0u32; SAMPLES];
    let mut group = c.benchmark_group("rank_filter_median");
    group.throughput(Throughput::Elements(SAMPLES as u64));

    for half_length in [1usize, 5, 25, 125, 625].iter() {
        let filter = RankFilter::median(*half_length);
        group.bench_with_input(
            BenchmarkId::new("rolling", half_length),
            half_length,
            |b, _| {
                b.iter(|| {
                    filter.apply(black_box(&src), &mut dst).unwrap();
                })
            },
        );
        group.bench_with_input(
            BenchmarkId::new("naive_sort", half_length),
            half_length,
            |b, &half_length| {
                b.iter(|| black_box(naive(black_box(&src), half_length, filter.rank_pos())));
            },
        );
    }

    group.finish();
}

fn bench_rank_sweep(c: &mut Criterion) {
    let src = signal(SAMPLES);
    let mut dst = vec![0u32; SAMPLES];
    let mut group = c.benchmark_group("rank_filter_rank");
    group.throughput(Throughput::Elements(SAMPLES as u64));

    for rank in [0.0f64, 0.1, 0.5, 0.9, 1.0].iter() {
        let filter = RankFilter::new(50, *rank).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(rank), rank, |b, _| {
            b.iter(|| {
                filter.apply(black_box(&src), &mut dst).unwrap();
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_median_by_window, bench_rank_sweep);
criterion_main!(benches);
