use criterion::{Criterion, black_box, criterion_group, criterion_main};
use dtx_model::{ChartBuilder, ChartTimeline, TempoMap};

fn dense_timeline(notes: u32) -> ChartTimeline {
    let mut builder = ChartBuilder::new(TempoMap::new(180.0).unwrap());
    for i in 0..notes {
        builder = builder.note((i % 10) as usize, i / 16, (i % 16) * 12);
    }
    ChartTimeline::new(builder.build().unwrap())
}

fn window_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("timeline");

    group.bench_function("sequential_windows_10k", |b| {
        let timeline = dense_timeline(10_000);
        let end = timeline.chart().last_note_time_ms().unwrap_or(0.0);
        b.iter(|| {
            let tl = timeline.share();
            let mut t = 0.0;
            let mut seen = 0usize;
            while t <= end {
                seen += tl.notes_in_window(t - 200.0, t + 200.0).len();
                t += 1000.0 / 60.0;
            }
            black_box(seen)
        });
    });

    group.bench_function("random_next_note_in_lane", |b| {
        let timeline = dense_timeline(10_000);
        let mut t = 0.0;
        b.iter(|| {
            t = (t + 7919.0) % 400_000.0;
            black_box(timeline.next_note_in_lane(black_box(3), black_box(t)))
        });
    });

    group.finish();
}

criterion_group!(benches, window_benchmark);
criterion_main!(benches);
