use bridge_core::filter::SmoothingFilter;
use bridge_core::mapping::{debounce, to_device};
use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};

// Synthetic sensor trace: slow sine over [0, max] with additive noise
fn synth_trace(n: usize, max: f64, noise_amp: f64, seed: u32) -> Vec<f64> {
    let mut state = seed.max(1);
    let mut next_f64 = || {
        let mut x = state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        state = x;
        f64::from(x) / (f64::from(u32::MAX) + 1.0)
    };
    (0..n)
        .map(|i| {
            let t = i as f64 / 200.0;
            let s = (t.sin() + 1.0) * 0.5 * max;
            s + (next_f64() * 2.0 - 1.0) * noise_amp
        })
        .collect()
}

pub fn bench_filter(c: &mut Criterion) {
    let trace = synth_trace(10_000, 30.0, 1.5, 0xC0FFEE);
    c.bench_function("filter_update_10k", |b| {
        b.iter_batched(
            || SmoothingFilter::new(0.1),
            |mut f| {
                let mut y = 0.0;
                for &x in &trace {
                    y = f.update(black_box(x.clamp(0.0, 30.0)));
                }
                black_box(y)
            },
            BatchSize::SmallInput,
        )
    });
}

pub fn bench_tick_path(c: &mut Criterion) {
    let trace = synth_trace(10_000, 30.0, 1.5, 42);
    c.bench_function("map_and_debounce_10k", |b| {
        b.iter(|| {
            let mut last = None;
            let mut sent = 0u32;
            for &x in &trace {
                let v = debounce(last, to_device(black_box(x), 0.0, 30.0));
                if last != Some(v) {
                    last = Some(v);
                    sent += 1;
                }
            }
            black_box(sent)
        })
    });
}

criterion_group!(benches, bench_filter, bench_tick_path);
criterion_main!(benches);
