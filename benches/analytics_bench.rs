//! Performance benchmarks for snapshot analytics.
//!
//! Run with: cargo bench
//!
//! Every push from the repository recomputes the views from the full record
//! set, so these measure that recomputation at various snapshot sizes:
//! - Full `MoodSummary` (grid, tallies, latest mood, stability)
//! - Stability scoring alone, which sorts the snapshot

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sentio::analytics::{stability_score, MoodSummary, YearMonth};
use sentio::journal::{date_resolver, JournalRecord, Mood};

/// Builds `count` records spread over the year, a few per day, with some unparseable dates.
fn snapshot(count: usize) -> Vec<JournalRecord> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap();

    (0..count)
        .map(|i| {
            let mood = Mood::ALL[(i * 7) % Mood::ALL.len()];
            let date = if i % 50 == 0 {
                "not a date".to_string()
            } else {
                date_resolver::format(start + Duration::minutes((i as i64) * 173))
            };
            JournalRecord {
                id: format!("r{}", i),
                emoji: mood.emoji().to_string(),
                mood: mood.label().to_string(),
                date,
                ..Default::default()
            }
        })
        .collect()
}

fn bench_summary(c: &mut Criterion) {
    let mut group = c.benchmark_group("mood_summary");
    let month = YearMonth::new(2024, 3).unwrap();

    for size in [100usize, 1_000, 10_000] {
        let records = snapshot(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| black_box(MoodSummary::from_records(black_box(records), month)));
        });
    }

    group.finish();
}

fn bench_stability(c: &mut Criterion) {
    let mut group = c.benchmark_group("stability_score");

    for size in [100usize, 1_000, 10_000] {
        let records = snapshot(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| black_box(stability_score(black_box(records))));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_summary, bench_stability);
criterion_main!(benches);
