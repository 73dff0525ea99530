//! Cleaning pipeline performance benchmarks.
//!
//! Measures column profiling, transformation with undo snapshots, health
//! ranking and dismissal reconciliation on synthetic survey data.

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use prepper::backend::AnalysisService;
use prepper::recommendation::{DismissalSet, reconcile, visible_recommendations};
use prepper::stats::healthiest_columns;
use prepper::{Dataset, LocalService, Session, TransformRequest};

/// Generate a survey-like CSV with gaps, a constant column and an ID column.
fn generate_survey_data(rows: usize) -> String {
    let mut data = String::from("respondent,age,income,region,score,channel,batch\n");

    let regions = ["north", "south", "east", "west"];
    let channels = ["web", "phone", "mail"];

    for row in 0..rows {
        data.push_str(&format!("R{:06},", row));
        if row % 7 == 0 {
            data.push(',');
        } else {
            data.push_str(&format!("{},", 18 + (row % 60)));
        }
        // income has a heavy tail
        let income = if row % 97 == 0 { 1_000_000 } else { 30_000 + (row % 50) * 1_000 };
        data.push_str(&format!("{},", income));
        if row % 4 == 0 {
            data.push_str("NA,");
        } else {
            data.push_str(regions[row % regions.len()]);
            data.push(',');
        }
        data.push_str(&format!("{:.2},", (row % 100) as f64 / 10.0));
        data.push_str(channels[row % channels.len()]);
        data.push_str(",b1\n");
    }

    data
}

fn open_session(service: &LocalService, rows: usize) -> Session {
    let dataset = Dataset::from_bytes("survey.csv", generate_survey_data(rows));
    let id = service
        .create_session(&dataset)
        .expect("benchmark data parses");
    Session::new(id, Arc::new(dataset))
}

fn bench_column_stats(c: &mut Criterion) {
    let mut group = c.benchmark_group("column_stats");

    for rows in [100, 1_000, 10_000] {
        let service = LocalService::new();
        let session = open_session(&service, rows);

        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |b, _| {
            b.iter(|| service.column_stats(black_box(&session)))
        });
    }

    group.finish();
}

fn bench_apply_undo(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_undo");
    let requests = [
        ("impute_median", TransformRequest::from_parts(
            "impute",
            ["age"],
            &serde_json::json!({ "method": "median" }),
        )),
        ("encode_onehot", TransformRequest::from_parts(
            "encode",
            ["region"],
            &serde_json::json!({ "method": "onehot" }),
        )),
        ("scale_standard", TransformRequest::from_parts(
            "scale",
            ["income", "score"],
            &serde_json::json!({ "method": "standard" }),
        )),
    ];

    let service = LocalService::new();
    let session = open_session(&service, 5_000);

    for (name, request) in requests {
        let request = request.expect("valid request");
        group.bench_function(name, |b| {
            b.iter(|| {
                service
                    .apply_transformation(&session, black_box(&request), 10)
                    .expect("apply");
                service.undo(&session, 10).expect("undo");
            })
        });
    }

    group.finish();
}

fn bench_recommendations(c: &mut Criterion) {
    let service = LocalService::new();
    let session = open_session(&service, 2_000);
    let stats = service.column_stats(&session).expect("stats");

    let mut dismissals = DismissalSet::new();
    for (column, stat) in &stats {
        for text in &stat.recommendations {
            dismissals.dismiss(column.clone(), text.clone());
        }
        dismissals.dismiss(column.clone(), "stale recommendation");
    }
    dismissals.dismiss("gone", "Consider dropping this column");

    c.bench_function("healthiest_columns", |b| {
        b.iter(|| healthiest_columns(black_box(&stats), 5))
    });
    c.bench_function("reconcile", |b| {
        b.iter(|| reconcile(black_box(&stats), black_box(&dismissals)))
    });
    c.bench_function("visible_recommendations", |b| {
        b.iter(|| visible_recommendations(black_box(&stats), black_box(&dismissals)))
    });
}

criterion_group!(benches, bench_column_stats, bench_apply_undo, bench_recommendations);

criterion_group!(
    name = large_table_benches;
    config = Criterion::default()
        .sample_size(10)
        .measurement_time(std::time::Duration::from_secs(20));
    targets = bench_large_table_session
);

fn bench_large_table_session(c: &mut Criterion) {
    let data = generate_survey_data(100_000);
    c.bench_function("create_session_100k", |b| {
        b.iter(|| {
            let service = LocalService::new();
            service.create_session(&Dataset::from_bytes("survey.csv", black_box(data.clone())))
        })
    });
}

criterion_main!(benches, large_table_benches);
