//! Aggregation and chart building over synthetic lab histories.
//!
//! Run with: cargo bench --bench chart_benchmarks

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use labtrend::core::categories::CategoryTable;
use labtrend::core::charts::{build_multi_series, build_single_series};
use labtrend::core::data::group_results_by_test;
use labtrend::core::dates::format_date;
use labtrend::models::{
    Acceptability, AllResults, ResultOutcome, Target, TargetRange, Test, TestResult, ValidResult,
};

const TEST_NAMES: [&str; 6] = [
    "HBA1c",
    "Glucose, Fasting",
    "Creatinine",
    "Cholesterol, Total",
    "Ferritin",
    "Vitamin D",
];

fn synthetic_data(results_per_test: usize) -> AllResults {
    let start = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
    let tests = TEST_NAMES
        .iter()
        .map(|name| Test {
            name: name.to_string(),
            description: String::new(),
            units: "units".into(),
            specimen_type: Default::default(),
            target: Target {
                description: String::new(),
                range: vec![
                    TargetRange { bottom: None, top: Some(50.0), value: Acceptability::Excellent },
                    TargetRange { bottom: Some(50.0), top: None, value: Acceptability::Bad },
                ],
            },
        })
        .collect();

    let mut results = Vec::with_capacity(results_per_test * TEST_NAMES.len());
    for i in 0..results_per_test {
        for (t, name) in TEST_NAMES.iter().enumerate() {
            let value = ((i * 7 + t * 13) % 100) as f64;
            results.push(TestResult {
                test: name.to_string(),
                date: format_date(start + Duration::days((i * 3 + t) as i64)),
                result: ResultOutcome::Valid(ValidResult {
                    value,
                    range: None,
                    acceptability: if value < 50.0 { Acceptability::Excellent } else { Acceptability::Bad },
                }),
                result_notes: String::new(),
                additional_info: String::new(),
            });
        }
    }
    AllResults { tests, results }
}

fn bench_single_series(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_series");
    for size in [10, 100, 1_000] {
        let data = synthetic_data(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| black_box(build_single_series(data, black_box("HBA1c"), None)));
        });
    }
    group.finish();
}

fn bench_multi_series(c: &mut Criterion) {
    let names: Vec<String> = TEST_NAMES.iter().map(|name| name.to_string()).collect();
    let mut group = c.benchmark_group("multi_series");
    for size in [10, 100, 1_000] {
        let data = synthetic_data(size);
        group.throughput(Throughput::Elements((size * names.len()) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| black_box(build_multi_series(data, &names, None)));
        });
    }
    group.finish();
}

fn bench_aggregation(c: &mut Criterion) {
    let data = synthetic_data(500);
    let table = CategoryTable::default();
    c.bench_function("group_results_by_test", |b| {
        b.iter(|| black_box(group_results_by_test(&data).len()))
    });
    c.bench_function("categorize", |b| b.iter(|| black_box(table.categorize(&data))));
}

criterion_group!(benches, bench_single_series, bench_multi_series, bench_aggregation);
criterion_main!(benches);
