use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use multiscan::{Algorithm, Pattern, PatternSet, ScanConfig, Scanner};

const TEXT_LEN: usize = 256 * 1024;
const PATTERN_COUNT: usize = 50;

fn corpus() -> (PatternSet, Vec<u8>) {
    let mut rng = StdRng::seed_from_u64(0xBEEF);

    let patterns: Vec<Pattern> = (0..PATTERN_COUNT)
        .map(|_| {
            let len = rng.gen_range(5..=12);
            Pattern::new((0..len).map(|_| rng.gen::<u8>()).collect::<Vec<u8>>())
        })
        .collect();

    let mut text: Vec<u8> = (0..TEXT_LEN).map(|_| rng.gen()).collect();
    for i in 0..10 {
        let p = patterns[i * 3].bytes.clone();
        text[1000 + i * 20_000..1000 + i * 20_000 + p.len()].copy_from_slice(&p);
    }

    (PatternSet::new(patterns).unwrap(), text)
}

fn bench_scan(c: &mut Criterion) {
    let (set, text) = corpus();

    let mut group = c.benchmark_group("scan");
    group.throughput(Throughput::Bytes(text.len() as u64));

    for algorithm in [
        Algorithm::AhoCorasick,
        Algorithm::WuManberDet,
        Algorithm::WuManberProb,
        Algorithm::SetHorspool,
        Algorithm::BoyerMoore,
    ] {
        let scanner = Scanner::new(set.clone(), ScanConfig::new(algorithm));

        group.bench_with_input(
            BenchmarkId::from_parameter(algorithm),
            text.as_slice(),
            |b, text| b.iter(|| scanner.scan(black_box(text))),
        );
    }

    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let (set, _) = corpus();

    let mut group = c.benchmark_group("build");

    for algorithm in [
        Algorithm::AhoCorasick,
        Algorithm::WuManberDet,
        Algorithm::SetHorspool,
        Algorithm::BoyerMoore,
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(algorithm), &set, |b, set| {
            b.iter(|| Scanner::new(black_box(PatternSet::clone(set)), ScanConfig::new(algorithm)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_scan, bench_build);
criterion_main!(benches);
