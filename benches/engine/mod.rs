//! Benchmarks for full graph engine renders.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_offline::{
    graph::{envelope::EnvNode, extensions::NodeExt, oscillator::OscNode},
    offline,
};

use crate::DURATIONS;

pub fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine/render");
    group.sample_size(10);

    for &duration in DURATIONS {
        group.bench_with_input(
            BenchmarkId::new("metronome", duration),
            &duration,
            |b, &duration| {
                b.iter(|| {
                    let result = offline(2, duration, 48_000.0, |ctx| {
                        let Some(engine) = ctx.engine_mut() else {
                            return;
                        };
                        let mut click = engine.add_track(
                            OscNode::square()
                                .with_frequency(1_000.0)
                                .amplify(EnvNode::adsr(0.001, 0.02, 0.0, 0.01)),
                        );
                        ctx.set_interval(0.5, move |time| {
                            let _ = click.note_on(time, 60, 100);
                        })
                        .expect("valid interval");
                    })
                    .expect("valid config");
                    black_box(result.wait().ok());
                })
            },
        );
    }

    group.finish();
}
