use chrono::NaiveDate;
use climatrend::{Normalizer, NormalizeConfig, RawObservation, Variable, YearMatrix};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Fifty years of synthetic TMAX/TMIN observations (~36k records), values in
/// tenths of a degree Celsius like the provider feed.
fn synthetic_history() -> Vec<RawObservation> {
    let mut raw = Vec::new();
    let start = NaiveDate::from_ymd_opt(1950, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(1999, 12, 31).unwrap();
    let mut date = start;
    let mut phase = 0.0f64;
    while date <= end {
        phase += std::f64::consts::TAU / 365.25;
        let tmax = 180.0 + 120.0 * phase.sin();
        raw.push(RawObservation {
            date: date.to_string(),
            variable: Variable::Tmax,
            value: tmax,
            station: None,
        });
        raw.push(RawObservation {
            date: date.to_string(),
            variable: Variable::Tmin,
            value: tmax - 90.0,
            station: None,
        });
        date = date.succ_opt().unwrap();
    }
    raw
}

fn bench_normalize(c: &mut Criterion) {
    let raw = synthetic_history();
    let normalizer = Normalizer::new(NormalizeConfig::default());

    c.bench_function("normalize_50y", |b| {
        b.iter(|| normalizer.normalize(black_box(raw.clone())))
    });

    let table = normalizer.normalize(raw);
    c.bench_function("matrix_build_50y", |b| {
        b.iter(|| YearMatrix::build(Variable::Tmax, black_box(table.records())))
    });
}

criterion_group!(benches, bench_normalize);
criterion_main!(benches);
