//! Discovery over a scripted paginated fetcher.

mod support;

use std::sync::Arc;
use std::time::Duration;

use atomic_scanner::application::{Discovery, DiscoverySettings, SnapshotCache};
use atomic_scanner::domain::Market;
use atomic_scanner::testkit::domain::{binary_market, market_id, token};
use atomic_scanner::testkit::fetcher::{FakeFetcher, END_CURSOR};
use chrono::Utc;
use rust_decimal_macros::dec;

fn discovery(fetcher: &Arc<FakeFetcher>) -> Discovery {
    Discovery::new(fetcher.clone(), DiscoverySettings::default())
}

#[tokio::test]
async fn follows_cursor_until_sentinel() {
    let fetcher = Arc::new(FakeFetcher::new(vec![
        FakeFetcher::page(vec![binary_market("a", dec!(5000))], Some("MTAw")),
        FakeFetcher::page(vec![binary_market("b", dec!(5000))], Some(END_CURSOR)),
    ]));

    let result = discovery(&fetcher).discover().await;

    assert!(result.complete);
    assert_eq!(result.pages, 2);
    assert_eq!(fetcher.cursors(), vec!["", "MTAw"]);
    assert_eq!(result.token_ids.len(), 4);
    assert!(result.token_ids.contains(&token("b-no")));
}

#[tokio::test]
async fn absent_or_empty_cursor_ends_scan() {
    for next in [None, Some("")] {
        let fetcher = Arc::new(FakeFetcher::new(vec![FakeFetcher::page(
            vec![binary_market("a", dec!(5000))],
            next,
        )]));
        let result = discovery(&fetcher).discover().await;
        assert!(result.complete);
        assert_eq!(fetcher.calls(), 1);
    }
}

#[tokio::test]
async fn empty_page_ends_scan() {
    let fetcher = Arc::new(FakeFetcher::new(vec![
        FakeFetcher::page(vec![binary_market("a", dec!(5000))], Some("MTAw")),
        FakeFetcher::page(vec![], Some("MjAw")),
    ]));
    let result = discovery(&fetcher).discover().await;
    assert!(result.complete);
    assert_eq!(fetcher.calls(), 2);
    assert_eq!(result.token_ids.len(), 2);
}

#[tokio::test]
async fn failure_mid_scan_returns_partial_result() {
    let fetcher = Arc::new(FakeFetcher::new(vec![
        FakeFetcher::page(vec![binary_market("a", dec!(5000))], Some("MTAw")),
        FakeFetcher::failure("HTTP 502"),
        FakeFetcher::page(vec![binary_market("never", dec!(5000))], None),
    ]));

    let result = discovery(&fetcher).discover().await;

    assert!(!result.complete);
    assert_eq!(fetcher.calls(), 2);
    assert_eq!(result.token_ids.len(), 2);
    assert!(!result.token_ids.contains(&token("never-yes")));
}

#[tokio::test]
async fn untradable_markets_are_pruned() {
    let closed = Market::new(
        market_id("closed"),
        "Closed?",
        vec![token("c1"), token("c2")],
        dec!(9000),
        true,
        true,
    );
    let not_accepting = Market::new(
        market_id("paused"),
        "Paused?",
        vec![token("p1"), token("p2")],
        dec!(9000),
        false,
        false,
    );
    let three_way = Market::new(
        market_id("multi"),
        "Who?",
        vec![token("m1"), token("m2"), token("m3")],
        dec!(9000),
        true,
        false,
    );
    let fetcher = Arc::new(FakeFetcher::new(vec![FakeFetcher::page(
        vec![
            binary_market("thin", dec!(999)),
            binary_market("edge", dec!(1000)),
            closed,
            not_accepting,
            three_way,
        ],
        None,
    )]));

    let result = discovery(&fetcher).discover().await;

    assert_eq!(result.markets_seen, 5);
    let ids: Vec<_> = result.token_ids.iter().map(|t| t.as_str().to_owned()).collect();
    assert_eq!(ids, vec!["edge-no", "edge-yes"]);
}

#[tokio::test]
async fn books_are_paired() {
    let fetcher = Arc::new(FakeFetcher::new(vec![FakeFetcher::page(
        vec![binary_market("a", dec!(5000))],
        None,
    )]));
    let result = discovery(&fetcher).discover().await;

    let yes = &result.books[&token("a-yes")];
    let no = &result.books[&token("a-no")];
    assert_eq!(yes.other_side(), no.asset_id());
    assert_eq!(no.other_side(), yes.asset_id());
    assert!(yes.is_skeleton() && no.is_skeleton());
}

#[tokio::test]
async fn repeated_cursor_stops_as_incomplete() {
    let fetcher = Arc::new(FakeFetcher::new(vec![
        FakeFetcher::page(vec![binary_market("a", dec!(5000))], Some("MTAw")),
        FakeFetcher::page(vec![binary_market("b", dec!(5000))], Some("MTAw")),
    ]));
    let result = discovery(&fetcher).discover().await;
    assert!(!result.complete);
    assert_eq!(fetcher.calls(), 2);
}

#[tokio::test]
async fn page_cap_stops_as_incomplete() {
    let pages = (0..5)
        .map(|i| {
            let next = format!("c{i}");
            FakeFetcher::page(vec![binary_market(&format!("m{i}"), dec!(5000))], Some(next.as_str()))
        })
        .collect();
    let fetcher = Arc::new(FakeFetcher::new(pages));
    let settings = DiscoverySettings {
        max_pages: 3,
        ..DiscoverySettings::default()
    };

    let result = Discovery::new(fetcher.clone(), settings).discover().await;
    assert!(!result.complete);
    assert_eq!(fetcher.calls(), 3);
}

#[tokio::test]
async fn fresh_snapshot_skips_network() {
    let dir = tempfile::tempdir().unwrap();
    let cache = || SnapshotCache::new(dir.path().join("cache.json"), Duration::from_secs(3600));

    let first = Arc::new(FakeFetcher::new(vec![FakeFetcher::page(
        vec![binary_market("a", dec!(5000))],
        None,
    )]));
    let scanned = discovery(&first).with_cache(cache(), true).discover().await;
    assert!(!scanned.from_cache);

    let second = Arc::new(FakeFetcher::new(vec![]));
    let cached = discovery(&second).with_cache(cache(), true).discover().await;

    assert!(cached.from_cache);
    assert_eq!(second.calls(), 0);
    assert_eq!(cached.token_ids, scanned.token_ids);
    assert_eq!(cached.books.len(), 2);
}

#[tokio::test]
async fn stale_snapshot_triggers_rescan() {
    let dir = tempfile::tempdir().unwrap();
    let cache = || SnapshotCache::new(dir.path().join("cache.json"), Duration::from_secs(3600));

    let first = Arc::new(FakeFetcher::new(vec![FakeFetcher::page(
        vec![binary_market("old", dec!(5000))],
        None,
    )]));
    discovery(&first)
        .with_cache(cache(), true)
        .discover_at(Utc::now() - chrono::Duration::hours(2))
        .await;

    let second = Arc::new(FakeFetcher::new(vec![FakeFetcher::page(
        vec![binary_market("new", dec!(5000))],
        None,
    )]));
    let result = discovery(&second).with_cache(cache(), true).discover().await;

    assert!(!result.from_cache);
    assert_eq!(second.calls(), 1);
    assert!(result.token_ids.contains(&token("new-yes")));
}

#[tokio::test]
async fn incomplete_scan_is_not_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");
    let fetcher = Arc::new(FakeFetcher::new(vec![
        FakeFetcher::page(vec![binary_market("a", dec!(5000))], Some("MTAw")),
        FakeFetcher::failure("timeout"),
    ]));

    discovery(&fetcher)
        .with_cache(SnapshotCache::new(&path, Duration::from_secs(3600)), true)
        .discover()
        .await;

    assert!(!path.exists());
}

#[tokio::test]
async fn no_cache_flag_forces_scan_but_still_saves() {
    let dir = tempfile::tempdir().unwrap();
    let cache = || SnapshotCache::new(dir.path().join("cache.json"), Duration::from_secs(3600));

    let first = Arc::new(FakeFetcher::new(vec![FakeFetcher::page(
        vec![binary_market("a", dec!(5000))],
        None,
    )]));
    discovery(&first).with_cache(cache(), true).discover().await;

    let second = Arc::new(FakeFetcher::new(vec![FakeFetcher::page(
        vec![binary_market("b", dec!(5000))],
        None,
    )]));
    let result = discovery(&second).with_cache(cache(), false).discover().await;
    assert!(!result.from_cache);
    assert_eq!(second.calls(), 1);

    let third = Arc::new(FakeFetcher::new(vec![]));
    let cached = discovery(&third).with_cache(cache(), true).discover().await;
    assert!(cached.token_ids.contains(&token("b-yes")));
}

#[tokio::test]
async fn empty_universe_is_reported_not_failed() {
    let fetcher = Arc::new(FakeFetcher::new(vec![FakeFetcher::page(
        vec![binary_market("thin", dec!(1))],
        None,
    )]));
    let result = discovery(&fetcher).discover().await;
    assert!(result.complete);
    assert!(result.is_empty());
}
