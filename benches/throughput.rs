use criterion::{black_box, criterion_group, criterion_main, Criterion};
use parking_lot::Mutex;
use std::io;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use text_pipeline::{PipelineBuilder, Sink, WorkItem, WorkQueue};

fn benchmark_queue_put_get(c: &mut Criterion) {
    c.bench_function("queue_put_get_1000_items", |b| {
        b.iter(|| {
            let queue = Arc::new(WorkQueue::new(1000));

            let consumer = {
                let queue = Arc::clone(&queue);
                thread::spawn(move || {
                    let mut received = 0usize;
                    while queue.get().is_some() {
                        received += 1;
                    }
                    received
                })
            };

            for i in 0..1000 {
                let line = format!("item-{i}");
                queue.put(black_box(WorkItem::Data(line))).expect("put failed");
            }
            queue.signal_finished();

            let received = consumer.join().expect("consumer panicked");
            assert_eq!(received, 1000);
        });
    });
}

fn benchmark_single_stage_pipeline(c: &mut Criterion) {
    c.bench_function("single_stage_1000_lines", |b| {
        b.iter(|| {
            let sink: Sink = Arc::new(Mutex::new(io::sink()));
            let pipeline = PipelineBuilder::new(1000)
                .add_stage("upper")
                .with_sink(sink)
                .build()
                .expect("build failed");

            for i in 0..1000 {
                pipeline.feed(black_box(&format!("line-{i}"))).expect("feed failed");
            }
            pipeline.finish().expect("finish failed");
            pipeline.shutdown().expect("shutdown failed");
        });
    });
}

fn benchmark_three_stage_pipeline(c: &mut Criterion) {
    c.bench_function("three_stage_1000_lines", |b| {
        b.iter(|| {
            let sink: Sink = Arc::new(Mutex::new(io::sink()));
            let pipeline = PipelineBuilder::new(1000)
                .stages(["upper", "flip", "log"])
                .with_sink(sink)
                .build()
                .expect("build failed");

            for i in 0..1000 {
                pipeline.feed(black_box(&format!("line-{i}"))).expect("feed failed");
            }
            pipeline.finish().expect("finish failed");
            pipeline.shutdown().expect("shutdown failed");
        });
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default()
        .measurement_time(Duration::from_secs(10))
        .sample_size(30);
    targets = benchmark_queue_put_get, benchmark_single_stage_pipeline, benchmark_three_stage_pipeline
);
criterion_main!(benches);
