use chrono::{Duration, TimeZone, Utc};
use classifier::{classify, ThresholdConfig};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use observation::NormalizedRow;

/// A day of 5-minute samples with a slowly veering breeze
fn day_of_rows() -> Vec<NormalizedRow> {
    let start = Utc.with_ymd_and_hms(2025, 5, 17, 0, 0, 0).unwrap();
    (0..288)
        .map(|i| NormalizedRow {
            timestamp: start + Duration::minutes(5 * i),
            wind_speed: if i % 37 == 0 { None } else { Some(6.0 + (i % 12) as f64) },
            wind_gust: Some(10.0 + (i % 9) as f64),
            wind_direction: Some(((170 + i) % 360) as f64),
        })
        .collect()
}

fn bench_classify(c: &mut Criterion) {
    let rows = day_of_rows();
    let thresholds = ThresholdConfig::default();

    c.bench_function("classify_day", |b| {
        b.iter(|| classify(black_box(&rows), black_box(&thresholds)))
    });
}

criterion_group!(benches, bench_classify);
criterion_main!(benches);
