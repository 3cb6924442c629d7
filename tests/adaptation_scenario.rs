//! End-to-end layer adaptation tests
//!
//! Drives a shared room, a debounced viewport and the adaptation driver
//! together on a paused clock and checks what reaches the transport.
//!
//! Run with: cargo test --test adaptation_scenario

use std::time::Duration;

use proptest::prelude::*;
use roomview::adaptation::{AdaptationDriver, ViewportSource};
use roomview::config::AdaptationConfig;
use roomview::consumers::{Consumer, LayerState, MediaSource};
use roomview::errors::TransportError;
use roomview::room::{RoomContext, SharedRoom};
use roomview::testing::{simple_consumer, RecordingTransport};
use roomview::types::{ConsumerId, ViewportSize};
use roomview::RoomViewConfig;
use tokio::sync::mpsc;
use tokio::time;

const SETTLE: Duration = Duration::from_millis(400);
const ADAPTATION: AdaptationConfig = AdaptationConfig {
    enabled: true,
    settle_window_ms: 400,
};

async fn room_with_c1() -> SharedRoom {
    let room = RoomContext::new("scenario", &RoomViewConfig::default()).into_shared();
    room.write().await.add_consumer(Consumer::layered(
        "c1",
        "p1",
        MediaSource::Webcam,
        LayerState::new(3, 3, 1920, 1080),
    ));
    room
}

fn paused_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .expect("runtime")
}

// ═══════════════════════════════════════════════════════════════════════════
// FULLSCREEN SCENARIO
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test(start_paused = true)]
async fn fullscreen_consumer_is_adapted_after_settle_window() {
    let room = room_with_c1().await;
    let viewport = ViewportSource::new(ViewportSize::new(800, 600), SETTLE);
    let transport = RecordingTransport::new();
    let task = AdaptationDriver::new(room.clone(), &viewport, transport.clone(), &ADAPTATION)
        .await
        .spawn();

    room.write().await.toggle_fullscreen("c1");
    time::sleep(SETTLE - Duration::from_millis(10)).await;
    assert!(transport.requests().is_empty(), "nothing before the window closes");

    time::sleep(Duration::from_millis(20)).await;
    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].consumer_id, ConsumerId::new("c1"));
    assert_eq!(requests[0].viewport(), ViewportSize::new(800, 600));

    task.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn resize_inside_window_yields_only_final_size() {
    let room = room_with_c1().await;
    let viewport = ViewportSource::new(ViewportSize::new(800, 600), SETTLE);
    let transport = RecordingTransport::new();
    let task = AdaptationDriver::new(room.clone(), &viewport, transport.clone(), &ADAPTATION)
        .await
        .spawn();

    room.write().await.toggle_fullscreen("c1");
    time::sleep(Duration::from_millis(200)).await;
    viewport.resize(ViewportSize::new(1920, 1080));

    time::sleep(Duration::from_secs(2)).await;
    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].viewport(), ViewportSize::new(1920, 1080));

    task.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn switching_target_takes_two_toggles() {
    let room = room_with_c1().await;
    room.write().await.add_consumer(Consumer::layered(
        "c2",
        "p2",
        MediaSource::Screen,
        LayerState::new(2, 1, 1920, 1080),
    ));
    let viewport = ViewportSource::new(ViewportSize::new(1024, 768), SETTLE);
    let transport = RecordingTransport::new();
    let task = AdaptationDriver::new(room.clone(), &viewport, transport.clone(), &ADAPTATION)
        .await
        .spawn();
    time::sleep(SETTLE * 2).await;

    room.write().await.toggle_fullscreen("c1");
    time::sleep(SETTLE + Duration::from_millis(1)).await;
    // Second toggle exits fullscreen instead of moving to c2.
    room.write().await.toggle_fullscreen("c2");
    time::sleep(Duration::from_millis(1)).await;
    assert!(room.read().await.session().full_screen_consumer_id().is_none());

    room.write().await.toggle_fullscreen("c2");
    time::sleep(SETTLE + Duration::from_millis(1)).await;

    let ids: Vec<_> = transport
        .requests()
        .into_iter()
        .map(|r| r.consumer_id)
        .collect();
    assert_eq!(ids, vec![ConsumerId::new("c1"), ConsumerId::new("c2")]);

    task.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn toggle_on_a_long_running_driver_waits_for_settle() {
    let room = room_with_c1().await;
    let viewport = ViewportSource::new(ViewportSize::new(800, 600), SETTLE);
    let transport = RecordingTransport::new();
    let task = AdaptationDriver::new(room.clone(), &viewport, transport.clone(), &ADAPTATION)
        .await
        .spawn();
    time::sleep(Duration::from_secs(5)).await;

    room.write().await.toggle_fullscreen("c1");
    time::sleep(Duration::from_millis(200)).await;
    viewport.resize(ViewportSize::new(1920, 1080));

    time::sleep(Duration::from_secs(2)).await;
    let sizes: Vec<_> = transport.requests().iter().map(|r| r.viewport()).collect();
    assert_eq!(sizes, vec![ViewportSize::new(1920, 1080)]);

    task.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn toggle_without_resize_adapts_one_window_later() {
    let room = room_with_c1().await;
    let viewport = ViewportSource::new(ViewportSize::new(800, 600), SETTLE);
    let transport = RecordingTransport::new();
    let task = AdaptationDriver::new(room.clone(), &viewport, transport.clone(), &ADAPTATION)
        .await
        .spawn();
    time::sleep(Duration::from_secs(3)).await;

    room.write().await.toggle_fullscreen("c1");
    time::sleep(SETTLE - Duration::from_millis(10)).await;
    assert!(transport.requests().is_empty());

    time::sleep(Duration::from_millis(20)).await;
    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].viewport(), ViewportSize::new(800, 600));

    task.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn removed_consumer_stops_adaptation() {
    let room = room_with_c1().await;
    let viewport = ViewportSource::new(ViewportSize::new(800, 600), SETTLE);
    let transport = RecordingTransport::new();
    let task = AdaptationDriver::new(room.clone(), &viewport, transport.clone(), &ADAPTATION)
        .await
        .spawn();

    room.write().await.toggle_fullscreen("c1");
    time::sleep(SETTLE * 2).await;
    assert_eq!(transport.requests().len(), 1);

    room.write().await.remove_consumer(&ConsumerId::new("c1"));
    viewport.resize(ViewportSize::new(640, 480));
    time::sleep(SETTLE * 2).await;
    assert_eq!(transport.requests().len(), 1);
    // The dangling id stays until someone toggles it off.
    assert!(room.read().await.session().full_screen_consumer_id().is_some());

    task.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn transport_failures_are_forwarded_and_not_retried() {
    let room = room_with_c1().await;
    let viewport = ViewportSource::new(ViewportSize::new(800, 600), SETTLE);
    let transport = RecordingTransport::new();
    transport.fail_next(TransportError::Network("server unreachable".into()));
    let (failures_tx, mut failures) = mpsc::unbounded_channel();
    let task = AdaptationDriver::new(room.clone(), &viewport, transport.clone(), &ADAPTATION)
        .await
        .report_failures(failures_tx)
        .spawn();

    room.write().await.toggle_fullscreen("c1");
    time::sleep(SETTLE * 2).await;

    let failure = failures.try_recv().expect("failure forwarded");
    assert!(failure.is_transient());
    assert!(failure.to_string().contains("server unreachable"));
    assert_eq!(transport.attempts(), 1);
    assert!(transport.requests().is_empty());

    time::sleep(SETTLE * 5).await;
    assert_eq!(transport.attempts(), 1, "no self-retry");

    viewport.resize(ViewportSize::new(1280, 720));
    time::sleep(SETTLE * 2).await;
    assert_eq!(transport.requests().len(), 1);

    task.shutdown().await;
}

// ═══════════════════════════════════════════════════════════════════════════
// PROPERTIES
// ═══════════════════════════════════════════════════════════════════════════

fn size() -> impl Strategy<Value = ViewportSize> {
    (1u32..4000, 1u32..3000).prop_map(|(w, h)| ViewportSize::new(w, h))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// INVARIANT: a burst inside the settle window adapts once, to the last size
    #[test]
    fn burst_is_coalesced(sizes in proptest::collection::vec(size(), 1..30)) {
        let runtime = paused_runtime();
        let (requests, last) = runtime.block_on(async {
            let room = room_with_c1().await;
            room.write().await.toggle_fullscreen("c1");
            let viewport = ViewportSource::new(ViewportSize::new(10, 10), SETTLE);
            let transport = RecordingTransport::new();
            let task = AdaptationDriver::new(room.clone(), &viewport, transport.clone(), &ADAPTATION)
                .await
                .spawn();

            for size in &sizes {
                time::sleep(Duration::from_millis(10)).await;
                viewport.resize(*size);
            }
            time::sleep(SETTLE * 2).await;
            task.shutdown().await;
            (transport.requests(), *sizes.last().unwrap())
        });

        prop_assert_eq!(requests.len(), 1);
        prop_assert_eq!(requests[0].viewport(), last);
    }

    /// INVARIANT: a simple fullscreen consumer never gets a request
    #[test]
    fn simple_consumer_is_never_adapted(
        steps in proptest::collection::vec((size(), 0u64..1000), 0..20),
    ) {
        let runtime = paused_runtime();
        let attempts = runtime.block_on(async {
            let room = RoomContext::new("simple", &RoomViewConfig::default()).into_shared();
            room.write().await.add_consumer(simple_consumer("s1"));
            room.write().await.toggle_fullscreen("s1");
            let viewport = ViewportSource::new(ViewportSize::new(800, 600), SETTLE);
            let transport = RecordingTransport::new();
            let task = AdaptationDriver::new(room.clone(), &viewport, transport.clone(), &ADAPTATION)
                .await
                .spawn();

            for (size, gap) in &steps {
                viewport.resize(*size);
                time::sleep(Duration::from_millis(*gap)).await;
            }
            time::sleep(SETTLE * 2).await;
            task.shutdown().await;
            transport.attempts()
        });

        prop_assert_eq!(attempts, 0);
    }
}
