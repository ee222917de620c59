//! Session reconnect and resubscribe behavior over a scripted stream.

mod support;

use std::sync::atomic::Ordering;
use std::time::Duration;

use atomic_scanner::error::Error;
use atomic_scanner::infrastructure::config::session::SessionConfig;
use atomic_scanner::infrastructure::session::Session;
use atomic_scanner::port::outbound::exchange::StreamMessage;
use atomic_scanner::testkit::config::session;
use atomic_scanner::testkit::domain::make_tokens;
use atomic_scanner::testkit::stream::{RecordingHandler, ScriptedStream};
use support::wait_until;
use tokio::sync::watch;

const WAIT: Duration = Duration::from_secs(2);

fn frame(raw: &str) -> Option<StreamMessage> {
    Some(StreamMessage::Frame(raw.to_owned()))
}

fn dropped(code: u16) -> Option<StreamMessage> {
    Some(StreamMessage::Disconnected {
        code: Some(code),
        reason: "gone".into(),
    })
}

fn refused() -> Error {
    Error::Connection("refused".into())
}

#[tokio::test]
async fn abnormal_closure_reconnects_and_resubscribes_same_assets() {
    let tokens = make_tokens(3);
    let stream = ScriptedStream::new().with_messages(vec![frame("a"), dropped(1006), frame("b")]);
    let subscriptions = stream.subscriptions();
    let (tx, rx) = watch::channel(false);
    let mut handler = RecordingHandler::default();
    let session = Session::new(stream, session(), tokens.clone()).unwrap();

    let (stats, ()) = tokio::join!(session.run(&mut handler, rx), async {
        assert!(wait_until(WAIT, || subscriptions.lock().len() == 2).await);
        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(true).unwrap();
    });

    assert_eq!(stats.connects, 2);
    assert_eq!(stats.disconnects, 1);
    assert_eq!(stats.frames, 2);
    assert_eq!(handler.frames, vec!["a", "b"]);
    let subscriptions = subscriptions.lock();
    assert_eq!(subscriptions[0], tokens);
    assert_eq!(subscriptions[1], tokens);
}

#[tokio::test]
async fn failed_connects_are_retried() {
    let stream = ScriptedStream::new().with_connect_results(vec![Err(refused()), Err(refused()), Ok(())]);
    let (connects, subscribes) = stream.counts();
    let (tx, rx) = watch::channel(false);
    let mut handler = RecordingHandler::default();
    let session = Session::new(stream, session(), make_tokens(2)).unwrap();

    let (stats, ()) = tokio::join!(session.run(&mut handler, rx), async {
        assert!(wait_until(WAIT, || subscribes.load(Ordering::SeqCst) == 1).await);
        tx.send(true).unwrap();
    });

    assert_eq!(connects.load(Ordering::SeqCst), 3);
    assert_eq!(stats.connect_failures, 2);
    assert_eq!(stats.connects, 1);
    assert_eq!(stats.subscribe_frames, 1);
}

#[tokio::test]
async fn subscribe_failure_drops_connection_and_retries() {
    let stream = ScriptedStream::new().with_subscribe_results(vec![Err(refused())]);
    let (connects, subscribes) = stream.counts();
    let (tx, rx) = watch::channel(false);
    let mut handler = RecordingHandler::default();
    let session = Session::new(stream, session(), make_tokens(2)).unwrap();

    let (stats, ()) = tokio::join!(session.run(&mut handler, rx), async {
        assert!(wait_until(WAIT, || subscribes.load(Ordering::SeqCst) == 2).await);
        tx.send(true).unwrap();
    });

    assert_eq!(connects.load(Ordering::SeqCst), 2);
    assert_eq!(stats.connects, 2);
    assert_eq!(stats.subscribe_frames, 1);
}

#[tokio::test]
async fn large_universe_is_subscribed_in_capped_batches() {
    let tokens = make_tokens(1200);
    let stream = ScriptedStream::new();
    let subscriptions = stream.subscriptions();
    let (tx, rx) = watch::channel(false);
    let mut handler = RecordingHandler::default();
    let session = Session::new(stream, session(), tokens.clone()).unwrap();

    let (stats, ()) = tokio::join!(session.run(&mut handler, rx), async {
        assert!(wait_until(WAIT, || subscriptions.lock().len() == 3).await);
        tx.send(true).unwrap();
    });

    assert_eq!(stats.subscribe_frames, 3);
    let sizes: Vec<_> = subscriptions.lock().iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![500, 500, 200]);
    let flattened: Vec<_> = subscriptions.lock().concat();
    assert_eq!(flattened, tokens);
}

#[tokio::test]
async fn shutdown_interrupts_backoff() {
    let mut config: SessionConfig = session();
    config.reconnection.initial_delay_ms = 60_000;
    config.reconnection.max_delay_ms = 60_000;
    let stream = ScriptedStream::new().with_connect_results(vec![Err(refused())]);
    let (connects, _) = stream.counts();
    let (tx, rx) = watch::channel(false);
    let mut handler = RecordingHandler::default();
    let session = Session::new(stream, config, make_tokens(1)).unwrap();

    let run = async {
        tokio::join!(session.run(&mut handler, rx), async {
            assert!(wait_until(WAIT, || connects.load(Ordering::SeqCst) == 1).await);
            tx.send(true).unwrap();
        })
    };
    let (stats, ()) = tokio::time::timeout(WAIT, run)
        .await
        .expect("session should stop during backoff");

    assert_eq!(stats.connect_failures, 1);
    assert_eq!(connects.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn dropped_shutdown_sender_stops_session() {
    let stream = ScriptedStream::new();
    let (connects, _) = stream.counts();
    let (tx, rx) = watch::channel(false);
    let mut handler = RecordingHandler::default();
    let session = Session::new(stream, session(), make_tokens(1)).unwrap();

    let (stats, ()) = tokio::join!(session.run(&mut handler, rx), async move {
        assert!(wait_until(WAIT, || connects.load(Ordering::SeqCst) == 1).await);
        drop(tx);
    });

    assert_eq!(stats.connects, 1);
}
