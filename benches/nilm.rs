use criterion::{criterion_group, criterion_main, Criterion};
use nilm_prep::{Aggregator, Padding, RawRow, Resampler};
use rand::Rng;

fn trace(len: usize) -> Vec<RawRow> {
    let mut rng = rand::thread_rng();

    (0..len)
        .map(|idx| {
            // Appliance that is mostly idle, with some switched-on periods
            let base: f32 = if (idx / 600) % 4 == 0 { 1.2 } else { 0.005 };
            let value = (base + rng.gen_range(-0.002..0.002)).max(0.0);
            RawRow::new(idx.to_string(), value.to_string())
        })
        .collect()
}

fn resample(c: &mut Criterion) {
    let rows = trace(86_400);

    for scale in [8, 60] {
        let resampler = Resampler::builder()
            .scale(scale)
            .unit_factor(1_000.0)
            .padding(Padding::None)
            .build()
            .unwrap();

        c.bench_function(&format!("resample 1 day (scale {scale})"), |b| {
            b.iter(|| resampler.resample(&rows).unwrap());
        });
    }
}

fn aggregate(c: &mut Criterion) {
    let traces = (0..7).map(|_| trace(43_200)).collect::<Vec<_>>();

    c.bench_function("aggregate 7 submeters (12 hours)", |b| {
        b.iter(|| Aggregator::new().aggregate(&traces).unwrap());
    });
}

criterion_group!(benches, resample, aggregate);
criterion_main!(benches);
