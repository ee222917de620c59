//! End to end: discovery, session, dispatcher, store, inference and journals.

mod support;

use std::sync::Arc;
use std::time::Duration;

use atomic_scanner::adapter::outbound::polymarket::PolymarketFrameDecoder;
use atomic_scanner::application::discovery::snapshot::{DiscoverySnapshot, SnapshotCache};
use atomic_scanner::infrastructure::bootstrap::{run_with, Adapters, RunOptions};
use atomic_scanner::port::outbound::exchange::StreamMessage;
use atomic_scanner::testkit::domain::{binary_market, book_frame, book_pair, token};
use atomic_scanner::testkit::fetcher::FakeFetcher;
use atomic_scanner::testkit::friction::FakeFrictionSource;
use atomic_scanner::testkit::stream::ScriptedStream;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;
use std::str::FromStr;
use support::{config_in, read_jsonl};
use tokio::sync::watch;

fn adapters(fetcher: FakeFetcher, stream: ScriptedStream) -> Adapters<ScriptedStream> {
    Adapters {
        fetcher: Arc::new(fetcher),
        stream,
        decoder: Arc::new(PolymarketFrameDecoder::new()),
        friction: Arc::new(FakeFrictionSource::new(dec!(100), dec!(1))),
    }
}

/// Both sides of market `m` in one frame.
fn pair_frame(yes_ask: &str, no_ask: &str) -> String {
    json!([
        {"event_type": "book", "asset_id": "m-yes", "market": "m", "bids": [],
         "asks": [{"price": yes_ask, "size": "1000"}]},
        {"event_type": "book", "asset_id": "m-no", "market": "m", "bids": [],
         "asks": [{"price": no_ask, "size": "1000"}]}
    ])
    .to_string()
}

fn decimal(value: &serde_json::Value) -> Decimal {
    Decimal::from_str(value.as_str().expect("decimal serialized as string")).unwrap()
}

#[tokio::test]
async fn profitable_pair_is_journaled() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let fetcher = FakeFetcher::new(vec![FakeFetcher::page(vec![binary_market("m", dec!(5000))], None)]);
    let stream = ScriptedStream::new().with_messages(vec![
        Some(StreamMessage::Frame(pair_frame("0.40", "0.55"))),
        Some(StreamMessage::Frame("[]".into())),
    ]);
    let (tx, rx) = watch::channel(false);

    let (report, ()) = tokio::join!(
        run_with(&config, adapters(fetcher, stream), RunOptions { use_cache: false }, rx),
        async {
            tokio::time::sleep(Duration::from_millis(300)).await;
            tx.send(true).unwrap();
        }
    );
    let report = report.unwrap();

    assert_eq!(report.tokens, 2);
    assert!(!report.from_cache);
    assert_eq!(report.session.connects, 1);
    assert_eq!(report.dispatch.frames, 2);
    assert_eq!(report.dispatch.book_updates, 2);
    assert_eq!(report.dispatch.jobs_scheduled, 1);
    assert_eq!(report.dispatch.jobs_debounced, 1);
    assert_eq!(report.inference.evaluated, 1);
    assert_eq!(report.inference.opportunities, 1);
    assert_eq!(report.events_written, 2);
    assert_eq!(report.opportunities_written, 1);

    let events = read_jsonl(&config.journal.event_path);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["asset_id"], "m-yes");
    assert_eq!(events[0]["question"], "Will m happen?");
    assert_eq!(decimal(&events[1]["best_ask"]), dec!(0.55));

    let opportunities = read_jsonl(&config.journal.opportunity_path);
    assert_eq!(opportunities.len(), 1);
    let record = &opportunities[0];
    assert_eq!(record["market_id"], "m");
    assert_eq!(decimal(&record["wap_yes"]), dec!(0.40));
    assert_eq!(decimal(&record["wap_no"]), dec!(0.55));
    let gross = decimal(&record["gross_profit"]);
    assert_eq!(gross, dec!(25));
    assert_eq!(
        decimal(&record["net_profit"]) + decimal(&record["total_cost_usd"]),
        gross
    );
}

#[tokio::test]
async fn unprofitable_pair_writes_events_only() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let fetcher = FakeFetcher::new(vec![FakeFetcher::page(vec![binary_market("m", dec!(5000))], None)]);
    let stream = ScriptedStream::new().with_messages(vec![
        Some(StreamMessage::Frame(pair_frame("0.50", "0.52"))),
        Some(StreamMessage::Frame(book_frame("unknown", &[("0.1", "5")]))),
    ]);
    let (tx, rx) = watch::channel(false);

    let (report, ()) = tokio::join!(
        run_with(&config, adapters(fetcher, stream), RunOptions { use_cache: false }, rx),
        async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            tx.send(true).unwrap();
        }
    );
    let report = report.unwrap();

    assert_eq!(report.dispatch.unknown_assets, 1);
    assert_eq!(report.inference.evaluated, 1);
    assert_eq!(report.inference.opportunities, 0);
    assert_eq!(report.events_written, 2);
    assert!(read_jsonl(&config.journal.opportunity_path).is_empty());
}

#[tokio::test]
async fn empty_universe_exits_without_connecting() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let fetcher = FakeFetcher::new(vec![FakeFetcher::page(vec![binary_market("thin", dec!(1))], None)]);
    let stream = ScriptedStream::new();
    let (connects, _) = stream.counts();
    let (_tx, rx) = watch::channel(false);

    let report = run_with(&config, adapters(fetcher, stream), RunOptions::default(), rx)
        .await
        .unwrap();

    assert_eq!(report.tokens, 0);
    assert_eq!(connects.load(std::sync::atomic::Ordering::SeqCst), 0);
    assert!(!config.discovery.cache_path.exists());
}

#[tokio::test]
async fn second_run_is_served_from_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    for expected_from_cache in [false, true] {
        let fetcher = FakeFetcher::new(vec![FakeFetcher::page(vec![binary_market("m", dec!(5000))], None)]);
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();
        let report = run_with(&config, adapters(fetcher, ScriptedStream::new()), RunOptions::default(), rx)
            .await
            .unwrap();
        assert_eq!(report.from_cache, expected_from_cache);
        assert_eq!(report.tokens, 2);
    }
}

#[tokio::test]
async fn unopenable_journal_fails_before_connecting() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "").unwrap();
    config.journal.event_path = blocker.join("events.jsonl");

    let fetcher = FakeFetcher::new(vec![FakeFetcher::page(vec![binary_market("m", dec!(5000))], None)]);
    let stream = ScriptedStream::new();
    let (connects, _) = stream.counts();
    let (_tx, rx) = watch::channel(false);

    let result = run_with(&config, adapters(fetcher, stream), RunOptions { use_cache: false }, rx).await;

    assert!(result.is_err());
    assert_eq!(connects.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn orphaned_snapshot_books_are_not_subscribed() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let (yes, no) = book_pair("m");
    let (lonely, _) = book_pair("half");
    let books = [yes, no, lonely];
    let snapshot = DiscoverySnapshot {
        token_ids: books.iter().map(|b| b.asset_id().clone()).collect(),
        books_skeleton: books.into_iter().map(|b| (b.asset_id().clone(), b)).collect(),
        saved_at: chrono::Utc::now(),
    };
    SnapshotCache::new(&config.discovery.cache_path, config.discovery.cache_ttl())
        .save(&snapshot)
        .unwrap();

    let fetcher = FakeFetcher::new(vec![]);
    let stream = ScriptedStream::new();
    let subscriptions = stream.subscriptions();
    let (tx, rx) = watch::channel(false);

    let (report, ()) = tokio::join!(
        run_with(&config, adapters(fetcher, stream), RunOptions::default(), rx),
        async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            tx.send(true).unwrap();
        }
    );
    let report = report.unwrap();

    assert!(report.from_cache);
    assert_eq!(report.tokens, 2);
    let sent: Vec<_> = subscriptions.lock().iter().flatten().cloned().collect();
    assert_eq!(sent, vec![token("m-no"), token("m-yes")]);
}
