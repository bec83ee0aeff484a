use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use fanout::{args, Arg, Emitter, Listener};

fn noop() -> Listener {
    Listener::new(|args: &[Arg]| {
        black_box(args);
    })
}

fn bench_on_off(c: &mut Criterion) {
    let emitter = Emitter::new();
    let listener = noop();
    c.bench_function("emitter_on_off", |b| {
        b.iter(|| {
            emitter.on("chan", &listener);
            emitter.off("chan", &listener);
        })
    });
}

fn bench_emit_0_listeners(c: &mut Criterion) {
    let emitter = Emitter::new();
    let payload = args!["x"];
    c.bench_function("emit_0_listeners", |b| {
        b.iter(|| black_box(emitter.emit("chan", black_box(&payload))))
    });
}

fn bench_emit_n_listeners(c: &mut Criterion) {
    let mut group = c.benchmark_group("emit_n_listeners");
    for n in [1usize, 10, 100] {
        let emitter = Emitter::new();
        emitter.set_max_listeners(0).unwrap();
        for _ in 0..n {
            emitter.on("chan", &noop());
        }
        let payload = args!["x", 42];
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| black_box(emitter.emit("chan", black_box(&payload))))
        });
    }
    group.finish();
}

fn bench_once_churn(c: &mut Criterion) {
    let emitter = Emitter::new();
    let listener = noop();
    c.bench_function("once_then_emit", |b| {
        b.iter(|| {
            emitter.once("chan", &listener);
            black_box(emitter.emit("chan", &[]))
        })
    });
}

fn bench_emit_with_failure(c: &mut Criterion) {
    let emitter = Emitter::new();
    emitter
        .on(
            "chan",
            &Listener::new(|_: &[Arg]| -> anyhow::Result<()> { anyhow::bail!("fail") }),
        )
        .on("error", &noop());
    c.bench_function("emit_failure_routed", |b| {
        b.iter(|| black_box(emitter.emit("chan", &[])))
    });
}

criterion_group!(
    benches,
    bench_on_off,
    bench_emit_0_listeners,
    bench_emit_n_listeners,
    bench_once_churn,
    bench_emit_with_failure,
);
criterion_main!(benches);
