//! Benchmarks for the displacement evaluation hot path
//!
//! One evaluation runs per incoming device line (120-240Hz), so the
//! per-line cost of the lagged-window mean and Euclidean distance matters:
//! - evaluate() on a full default-sized history (300 samples)
//! - evaluate() across growing window sizes
//! - the parse-push-evaluate line path a session performs

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use stillpoint::displacement;
use stillpoint::protocol::LibertyProtocol;
use stillpoint::types::{PositionSample, RingBuffer, WindowConfig};
use stillpoint::DeviceProtocol;

fn filled_history(capacity: usize) -> RingBuffer<PositionSample> {
    let mut history = RingBuffer::new(capacity);
    for i in 0..capacity {
        let v = (i % 17) as f64 * 0.05;
        history.push(PositionSample { id: 1, x: v, y: -v, z: 2.0 * v, angles: None });
    }
    history
}

fn bench_evaluate_default_history(c: &mut Criterion) {
    let history = filled_history(300);
    let window = WindowConfig { lag_delta: 20, window_size: 3 };

    c.bench_function("evaluate_default_history", |b| {
        b.iter(|| {
            let decision =
                displacement::evaluate(black_box(&history), black_box(window), black_box(3.0));
            black_box(decision)
        })
    });
}

fn bench_evaluate_window_sizes(c: &mut Criterion) {
    let history = filled_history(300);
    let mut group = c.benchmark_group("evaluate_window_sizes");

    for window_size in [3usize, 15, 60, 240] {
        let window = WindowConfig { lag_delta: 20, window_size };
        group.bench_function(format!("window_{window_size}"), |b| {
            b.iter(|| {
                let decision =
                    displacement::evaluate(black_box(&history), black_box(window), black_box(3.0));
                black_box(decision)
            })
        });
    }

    group.finish();
}

fn bench_line_path(c: &mut Criterion) {
    let protocol = LibertyProtocol;
    let window = WindowConfig { lag_delta: 20, window_size: 3 };
    let line = "1  2.543  -0.112  10.0  12.5  -3.0  0.25";

    c.bench_function("parse_push_evaluate", |b| {
        let mut history = filled_history(300);
        b.iter(|| {
            let sample = protocol.parse_line(black_box(line)).expect("bench line parses");
            history.push(sample);
            let decision =
                displacement::evaluate(black_box(&history), black_box(window), black_box(3.0));
            black_box(decision)
        })
    });
}

criterion_group!(
    benches,
    bench_evaluate_default_history,
    bench_evaluate_window_sizes,
    bench_line_path
);
criterion_main!(benches);
