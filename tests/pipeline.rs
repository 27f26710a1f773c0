//! End-to-end tests for the motion pipeline
//!
//! These drive a full session (transport -> parse -> history -> displacement
//! -> events) over the channel-backed mock transport, and a recorded capture
//! over the replay transport, verifying ordering, threshold decisions, and
//! error surfacing without hardware.

use futures::StreamExt;

use stillpoint::{
    Decision, DeviceSession, DriverKind, InitPolicy, MockHandle, MockTransport, SessionEvent,
    SessionState, Settings, Stillpoint,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

async fn start_session(settings: Settings) -> (DeviceSession, MockHandle) {
    init_tracing();
    let (transport, handle) = MockTransport::new();
    let session = DeviceSession::start(
        transport,
        DriverKind::Liberty.protocol(),
        settings,
        InitPolicy::BestEffort,
    )
    .await
    .expect("session should start");
    (session, handle)
}

fn expect_motion(event: &SessionEvent) -> (f64, f64, bool) {
    match event {
        SessionEvent::Reading(reading) => match reading.decision {
            Decision::Motion { displacement, threshold_pct, broke_threshold } => {
                (displacement, threshold_pct, broke_threshold)
            }
            other => panic!("expected a motion decision, got {other:?}"),
        },
        other => panic!("expected a reading, got {other:?}"),
    }
}

/// 300 still samples then a 100mm jump breaks a 10mm tolerance.
#[tokio::test]
async fn large_jump_breaks_threshold_end_to_end() {
    let (mut session, mut handle) = start_session(Settings::default()).await;
    let mut events = session.events().expect("event stream");

    for _ in 0..300 {
        handle.push_line("1 0 0 0");
    }
    // Device units are scaled x10 to mm: this is a 100mm displacement
    handle.push_line("1 10 0 0");
    handle.close();

    let collected: Vec<_> = events.by_ref().collect().await;
    assert_eq!(collected.len(), 301);

    // Warmup until the history fills
    match &collected[298] {
        SessionEvent::Reading(reading) => {
            assert_eq!(reading.decision, Decision::Warmup { have: 299, need: 300 });
        }
        other => panic!("expected a warmup reading, got {other:?}"),
    }

    // Buffer full and still: zero displacement
    let (displacement, threshold_pct, broke) = expect_motion(&collected[299]);
    assert_eq!(displacement, 0.0);
    assert_eq!(threshold_pct, 0.0);
    assert!(!broke);

    // The jump
    let (displacement, threshold_pct, broke) = expect_motion(&collected[300]);
    assert!((displacement - 100.0).abs() < 1e-9);
    assert_eq!(threshold_pct, 1.0);
    assert!(broke);

    session.wait_closed().await;
    assert_eq!(session.state(), SessionState::Closed);
}

/// A 1mm twitch against a 10mm tolerance reports 10% and no breach.
#[tokio::test]
async fn small_twitch_reports_partial_pct() {
    let (mut session, mut handle) = start_session(Settings::default()).await;
    let mut events = session.events().expect("event stream");

    for _ in 0..300 {
        handle.push_line("1 0 0 0");
    }
    handle.push_line("1 0.1 0 0");
    handle.close();

    let collected: Vec<_> = events.by_ref().collect().await;
    let (displacement, threshold_pct, broke) = expect_motion(collected.last().unwrap());
    assert!((displacement - 1.0).abs() < 1e-9);
    assert!((threshold_pct - 0.1).abs() < 1e-9);
    assert!(!broke);
}

/// A malformed line is dropped and logged; the session keeps streaming and
/// emits no event for it.
#[tokio::test]
async fn malformed_line_is_dropped_without_ending_the_stream() {
    let (mut session, mut handle) = start_session(Settings::default()).await;
    let mut events = session.events().expect("event stream");

    handle.push_line("1 0 0 0");
    handle.push_line("1 garbage 0 0");
    handle.push_line("1 0.2 0.2 0.2");

    let first = events.next().await.expect("first reading");
    let second = events.next().await.expect("second reading");

    // The malformed line produced nothing; the next event is the third line
    match (&first, &second) {
        (SessionEvent::Reading(a), SessionEvent::Reading(b)) => {
            assert_eq!(a.sample.x, 0.0);
            assert!((b.sample.x - 2.0).abs() < 1e-9);
        }
        other => panic!("expected two readings, got {other:?}"),
    }

    assert_eq!(session.state(), SessionState::Streaming);
    handle.close();
}

/// Events arrive strictly in line arrival order.
#[tokio::test]
async fn readings_preserve_arrival_order() {
    let (mut session, mut handle) = start_session(Settings::default()).await;
    let mut events = session.events().expect("event stream");

    for i in 0..50 {
        handle.push_line(&format!("{i} 0 0 0"));
    }
    handle.close();

    let collected: Vec<_> = events.by_ref().collect().await;
    let ids: Vec<u32> = collected
        .iter()
        .map(|e| match e {
            SessionEvent::Reading(r) => r.sample.id,
            other => panic!("expected a reading, got {other:?}"),
        })
        .collect();
    let expected: Vec<u32> = (0..50).collect();
    assert_eq!(ids, expected);
}

/// A tolerance update lands between two lines and affects only the second.
#[tokio::test]
async fn tolerance_update_applies_from_the_next_line_only() {
    let (mut session, mut handle) = start_session(Settings::default()).await;
    let mut events = session.events().expect("event stream");

    for _ in 0..300 {
        handle.push_line("1 0 0 0");
        events.next().await.expect("warmup/still reading");
    }

    // 5mm displacement against the default 10mm tolerance
    handle.push_line("1 0.5 0 0");
    let before = events.next().await.expect("reading before update");
    let (displacement, threshold_pct, broke) = expect_motion(&before);
    assert!((displacement - 5.0).abs() < 1e-9);
    assert!((threshold_pct - 0.5).abs() < 1e-9);
    assert!(!broke);

    // Tighten to 3mm; the already-delivered reading is untouched, the next
    // line is evaluated against the new tolerance
    session.update_tolerance(3.0);
    handle.push_line("1 0.5 0 0");
    let after = events.next().await.expect("reading after update");
    let (displacement, threshold_pct, broke) = expect_motion(&after);
    assert!((displacement - 5.0).abs() < 1e-9);
    assert_eq!(threshold_pct, 1.0);
    assert!(broke);

    handle.close();
}

/// Transport errors surface as events; the session recovers when lines resume.
#[tokio::test]
async fn transport_error_is_surfaced_then_streaming_resumes() {
    let (mut session, mut handle) = start_session(Settings::default()).await;
    let mut events = session.events().expect("event stream");

    handle.push_line("1 0 0 0");
    assert!(matches!(events.next().await, Some(SessionEvent::Reading(_))));

    handle.push_error(std::io::Error::other("cable glitch"));
    match events.next().await.expect("error event") {
        SessionEvent::TransportError { message } => assert!(message.contains("cable glitch")),
        other => panic!("expected a transport error event, got {other:?}"),
    }

    handle.push_line("1 0 0 0");
    assert!(matches!(events.next().await, Some(SessionEvent::Reading(_))));
    assert_eq!(session.state(), SessionState::Streaming);

    handle.close();
}

/// Ten consecutive transport errors surface in order, then the session
/// gives up and closes.
#[tokio::test(start_paused = true)]
async fn consecutive_transport_errors_close_the_session() {
    let (mut session, handle) = start_session(Settings::default()).await;
    let mut events = session.events().expect("event stream");

    for i in 0..10 {
        handle.push_error(std::io::Error::other(format!("glitch {i}")));
    }

    for i in 0..10 {
        match events.next().await.expect("error event") {
            SessionEvent::TransportError { message } => {
                assert!(message.contains(&format!("glitch {i}")));
            }
            other => panic!("expected a transport error event, got {other:?}"),
        }
    }

    assert_eq!(events.next().await.map(|_| ()), None);
    session.wait_closed().await;
    assert_eq!(session.state(), SessionState::Closed);
}

/// Closing the session cancels the reader and ends the event stream.
#[tokio::test]
async fn close_tears_down_deterministically() {
    let (mut session, _handle) = start_session(Settings::default()).await;
    let mut events = session.events().expect("event stream");

    session.close();
    session.wait_closed().await;
    assert_eq!(session.state(), SessionState::Closed);
    assert_eq!(events.next().await.map(|_| ()), None);
}

/// A recorded capture drives the same pipeline as live hardware.
#[tokio::test(start_paused = true)]
async fn replayed_capture_breaks_threshold_like_live() {
    init_tracing();
    let mut capture = String::new();
    for _ in 0..300 {
        capture.push_str("1 0 0 0\r\n");
    }
    capture.push_str("1 10 0 0\r\n");

    let path = std::env::temp_dir()
        .join(format!("stillpoint-pipeline-capture-{}.txt", std::process::id()));
    std::fs::write(&path, &capture).expect("capture fixture should be writable");

    let mut session = Stillpoint::replay(&path, DriverKind::Fastrak, Settings::default())
        .await
        .expect("replay session should start");
    let mut events = session.events().expect("event stream");

    let collected: Vec<_> = events.by_ref().collect().await;
    assert_eq!(collected.len(), 301);
    let (displacement, _, broke) = expect_motion(collected.last().unwrap());
    assert!((displacement - 100.0).abs() < 1e-9);
    assert!(broke);

    session.wait_closed().await;
    assert_eq!(session.state(), SessionState::Closed);

    std::fs::remove_file(path).ok();
}
