//! Room session performance benchmarks for roomview
//!
//! Run with: cargo bench --bench session_benchmarks
//!
//! These benchmarks measure the synchronous hot paths: reducer dispatch with
//! subscribers attached, consumer updates and layer selection.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use roomview::adaptation::{select_layers, Debouncer, LayerAdaptationController};
use roomview::consumers::{ConsumerScore, ConsumerUpdate, LayerState};
use roomview::room::{RoomAction, RoomContext};
use roomview::testing::{layered_consumer, RecordingTransport};
use roomview::types::{ConsumerId, PeerId, ViewportSize};
use roomview::RoomViewConfig;
use std::time::{Duration, Instant};

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");

    for subscribers in [0usize, 1, 8] {
        group.bench_with_input(
            BenchmarkId::new("toggle_fullscreen", subscribers),
            &subscribers,
            |b, &subscribers| {
                let mut room = RoomContext::new("bench", &RoomViewConfig::default());
                let mut receivers: Vec<_> = (0..subscribers).map(|_| room.subscribe()).collect();
                let id = ConsumerId::new("c1");
                b.iter(|| {
                    let event = room.dispatch(RoomAction::ToggleFullscreen(id.clone()));
                    // Keep the unbounded queues from growing across iterations.
                    for rx in &mut receivers {
                        while rx.try_recv().is_ok() {}
                    }
                    black_box(event)
                });
            },
        );
    }

    group.bench_function("selected_peers_churn", |b| {
        let mut room = RoomContext::new("bench", &RoomViewConfig::default());
        let peers: Vec<PeerId> = (0..32).map(|i| PeerId::new(format!("p{}", i))).collect();
        b.iter(|| {
            for peer in &peers {
                room.add_selected_peer(peer.clone());
            }
            for peer in &peers {
                room.remove_selected_peer(peer.clone());
            }
        });
    });

    group.finish();
}

fn bench_consumers(c: &mut Criterion) {
    let mut room = RoomContext::new("bench", &RoomViewConfig::default());
    for i in 0..256 {
        room.add_consumer(layered_consumer(&format!("c{}", i)));
    }
    let id = ConsumerId::new("c128");

    c.bench_function("consumer_score_update", |b| {
        b.iter(|| {
            black_box(room.update_consumer(
                &id,
                ConsumerUpdate::Score(ConsumerScore {
                    score: 10,
                    producer_score: 9,
                }),
            ))
        })
    });
}

fn bench_adaptation(c: &mut Criterion) {
    let layers = LayerState::new(3, 3, 1920, 1080);
    c.bench_function("select_layers", |b| {
        b.iter(|| select_layers(black_box(&layers), black_box(ViewportSize::new(1024, 768))))
    });

    c.bench_function("debounce_burst_64", |b| {
        b.iter(|| {
            let mut debouncer = Debouncer::new(Duration::from_millis(400));
            let start = Instant::now();
            for step in 0..64u64 {
                debouncer.push(step, start + Duration::from_millis(step * 5));
            }
            black_box(debouncer.poll(start + Duration::from_secs(1)))
        })
    });

    c.bench_function("controller_evaluate_unchanged", |b| {
        let mut room = RoomContext::new("bench", &RoomViewConfig::default());
        room.add_consumer(layered_consumer("c1"));
        room.toggle_fullscreen("c1");
        let mut controller = LayerAdaptationController::new(RecordingTransport::new());
        let _ = controller.on_viewport_settled(ViewportSize::new(1280, 720), &room);
        b.iter(|| black_box(controller.evaluate(&room).is_ok()))
    });
}

criterion_group!(benches, bench_dispatch, bench_consumers, bench_adaptation);
criterion_main!(benches);
