use hashtraits::{BitAnalyzer, BitSource, BitWidth, FastRng, FeatureAnalyzer, HexSource};
use std::hint::black_box;
use std::time::Instant;

const NUM_SAMPLES: usize = 10_000;
const NUM_ITER: usize = 20;
const SEED: u64 = 0x9e3779b97f4a7c15;

fn bench_samples<F>(mut draw: F) -> f64
where
    F: FnMut(),
{
    let mut results = Vec::with_capacity(NUM_ITER);

    // Warm-up
    for _ in 0..1_000 {
        draw();
    }

    for _ in 0..NUM_ITER {
        let start = Instant::now();

        for _ in 0..NUM_SAMPLES {
            draw();
        }

        let elapsed_us = start.elapsed().as_secs_f64() * 1e6;
        results.push(NUM_SAMPLES as f64 / elapsed_us);
    }

    results.sort_by(f64::total_cmp);

    // median
    results[NUM_ITER / 2]
}

fn bench_source(label: &str, bits: BitWidth, mut source: HexSource) {
    let analyzer = BitAnalyzer;

    let draw_only = bench_samples(|| {
        black_box(source.next_sample().expect("sample"));
    });

    let draw_and_analyze = bench_samples(|| {
        let s = source.next_sample().expect("sample");

        black_box(analyzer.ones(&s));
        black_box(analyzer.passages(&s, bits));
        black_box(analyzer.symmetry_ranks(&s, bits));
    });

    println!(
        "| {:<6} | {:>4} | {:>20.3} | {:>20.3} |",
        label,
        bits.bits(),
        draw_only,
        draw_and_analyze
    );
}

fn main() {
    println!("## Sampling throughput");
    println!();
    println!("| RNG    | Bits | Draw (samples/µs)    | Full (samples/µs)    |");
    println!("|:------:|:----:|:--------------------:|:--------------------:|");

    for bits in [BitWidth::B160, BitWidth::B256] {
        bench_source("crypto", bits, HexSource::crypto(bits));
        bench_source("js", bits, HexSource::fast(bits, FastRng::new_seeded(SEED)));
    }
}
