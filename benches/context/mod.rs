//! Benchmarks for the stepping loop, with the engine stubbed out so only
//! clock, tick and scheduler cost is measured.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_offline::{
    Deferred, OfflineContext, RenderConfig, RenderEngine, RenderResult, TimeSource,
};

use crate::DURATIONS;

/// Resolves immediately with an empty buffer
struct NullEngine;

impl RenderEngine for NullEngine {
    fn start_rendering(&mut self) -> RenderResult {
        Deferred::resolved(Default::default())
    }
}

fn context(duration: f64) -> OfflineContext<NullEngine> {
    let config = RenderConfig::new(2, duration, 48_000.0).expect("valid config");
    OfflineContext::with_engine(config, NullEngine).expect("engine has no config")
}

pub fn bench_stepping(c: &mut Criterion) {
    let mut group = c.benchmark_group("context/stepping");

    for &duration in DURATIONS {
        group.bench_with_input(
            BenchmarkId::new("bare", duration),
            &duration,
            |b, &duration| {
                b.iter(|| {
                    let mut ctx = context(duration);
                    black_box(ctx.render().wait().ok());
                })
            },
        );

        // Four subscribers reading the clock, like a small UI + sequencer
        group.bench_with_input(
            BenchmarkId::new("4_subscribers", duration),
            &duration,
            |b, &duration| {
                b.iter(|| {
                    let mut ctx = context(duration);
                    for _ in 0..4 {
                        let source = ctx.time_source();
                        ctx.on_tick(move |_| {
                            black_box(source.now());
                        });
                    }
                    black_box(ctx.render().wait().ok());
                })
            },
        );
    }

    group.finish();
}

pub fn bench_scheduled(c: &mut Criterion) {
    let mut group = c.benchmark_group("context/scheduled");

    for &duration in DURATIONS {
        // Sixteenth notes at 120 bpm
        group.bench_with_input(
            BenchmarkId::new("interval_125ms", duration),
            &duration,
            |b, &duration| {
                b.iter(|| {
                    let mut ctx = context(duration);
                    ctx.set_interval(0.125, |time| {
                        black_box(time);
                    })
                    .expect("valid interval");
                    black_box(ctx.render().wait().ok());
                })
            },
        );
    }

    group.finish();
}
