use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use skipdb::logger::discard_logger;
use skipdb::{Options, Random, RandomGenerator, SkipList};

fn filled(n: u32) -> SkipList<u32, u32> {
    let mut opt = Options::default();
    opt.info_log = Some(discard_logger());
    let sl = SkipList::with_rng(opt, Random::new(301));
    let rnd = Random::new(7);
    for _ in 0..n {
        let k = rnd.next();
        if let Err(e) = sl.insert(k, k) {
            assert!(e.is_duplicate());
        }
    }
    sl
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    for n in [1_000u32, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| black_box(filled(n)))
        });
    }
    group.finish();
}

fn bench_get(c: &mut Criterion) {
    let sl = filled(100_000);
    let rnd = Random::new(7);
    let keys: Vec<u32> = (0..100_000).map(|_| rnd.next()).collect();
    let mut i = 0;
    c.bench_function("get hit", |b| {
        b.iter(|| {
            i = (i + 1) % keys.len();
            black_box(sl.get(&keys[i]).is_ok())
        })
    });
    c.bench_function("get miss", |b| b.iter(|| black_box(sl.contains_key(&0))));
}

fn bench_delete_insert(c: &mut Criterion) {
    let sl = filled(100_000);
    let rnd = Random::new(11);
    c.bench_function("delete insert", |b| {
        b.iter(|| {
            let k = rnd.uniform(1 << 20);
            match sl.delete(&k) {
                Ok(v) => black_box(v),
                Err(_) => {
                    sl.insert(k, k).unwrap();
                    k
                }
            }
        })
    });
}

criterion_group!(benches, bench_insert, bench_get, bench_delete_insert);
criterion_main!(benches);
