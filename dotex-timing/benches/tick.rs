use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use pprof::criterion::{Output, PProfProfiler};
use std::time::Duration;

use dotex_timing::Scheduler;

/// Scheduler preloaded with `n` repeating intervals of staggered delays.
fn prepare_scheduler(n: usize) -> Scheduler<usize> {
    let mut scheduler = Scheduler::default();
    for i in 0..n {
        scheduler.add_interval(format!("interval_{i}"), 16.0 * (i % 8 + 1) as f64, i, true);
    }
    scheduler
}

/// Benchmarks `Scheduler::tick` at a 60 Hz step across interval counts.
pub fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheduler_tick");

    group
        .sample_size(50)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1));

    for n in [4usize, 16, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let mut scheduler = prepare_scheduler(n);
            let mut fired = 0usize;
            b.iter(|| {
                scheduler.tick(black_box(16.0), |_, event| fired += event);
            });
            black_box(fired);
        });
    }

    group.bench_function("reschedule_in_handler", |b| {
        let mut scheduler = prepare_scheduler(16);
        b.iter(|| {
            scheduler.tick(black_box(16.0), |scheduler, event| {
                scheduler.add_interval("one_shot", 8.0, *event, false);
            });
        });
    });

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)))
        .confidence_level(0.95)
        .noise_threshold(0.02)
        .significance_level(0.05);
    targets = bench_tick
}

criterion_main!(benches);
