//! Polymarket listing client against a mock HTTP server.

use std::sync::Arc;

use atomic_scanner::adapter::outbound::polymarket::PolymarketClient;
use atomic_scanner::application::{Discovery, DiscoverySettings};
use atomic_scanner::error::Error;
use atomic_scanner::port::outbound::exchange::MarketFetcher;
use atomic_scanner::testkit::domain::token;
use rust_decimal_macros::dec;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn market(id: &str, volume: &str) -> serde_json::Value {
    json!({
        "condition_id": id,
        "question": format!("Will {id} happen?"),
        "accepting_orders": true,
        "closed": false,
        "clobTokenIds": format!("[\"{id}-yes\", \"{id}-no\"]"),
        "volume24hr": volume,
    })
}

#[tokio::test]
async fn decodes_page_and_cursor() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/markets"))
        .and(query_param("next_cursor", ""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                market("0xabc", "2500.5"),
                {"question": "no id, skipped"},
                {
                    "conditionId": "0xdef",
                    "acceptingOrders": true,
                    "tokens": [
                        {"token_id": "def-no", "outcome": "No"},
                        {"token_id": "def-yes", "outcome": "Yes"}
                    ]
                }
            ],
            "next_cursor": "MTAw"
        })))
        .mount(&server)
        .await;

    let client = PolymarketClient::new(server.uri());
    let page = client.fetch_page("").await.unwrap();

    assert_eq!(page.next_cursor.as_deref(), Some("MTAw"));
    assert_eq!(page.markets.len(), 2);

    let first = &page.markets[0];
    assert_eq!(first.market_id().as_str(), "0xabc");
    assert_eq!(first.volume_24h(), dec!(2500.5));
    assert_eq!(first.tokens(), &[token("0xabc-yes"), token("0xabc-no")]);

    let second = &page.markets[1];
    assert_eq!(second.volume_24h(), dec!(0));
    assert_eq!(second.token_yes(), Some(&token("def-yes")));
    assert_eq!(second.token_no(), Some(&token("def-no")));
}

#[tokio::test]
async fn http_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/markets"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = PolymarketClient::new(server.uri());
    let err = client.fetch_page("").await.unwrap_err();
    assert!(matches!(err, Error::Http(_)));
}

#[tokio::test]
async fn discovery_walks_mocked_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/markets"))
        .and(query_param("next_cursor", ""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [market("a", "5000"), market("thin", "10")],
            "next_cursor": "MTAw"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/markets"))
        .and(query_param("next_cursor", "MTAw"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [market("b", "1000")],
            "next_cursor": "LTE="
        })))
        .expect(1)
        .mount(&server)
        .await;

    let discovery = Discovery::new(
        Arc::new(PolymarketClient::new(server.uri())),
        DiscoverySettings::default(),
    );
    let result = discovery.discover().await;

    assert!(result.complete);
    assert_eq!(result.pages, 2);
    assert_eq!(result.markets_seen, 3);
    let ids: Vec<_> = result.token_ids.iter().map(|t| t.as_str().to_owned()).collect();
    assert_eq!(ids, vec!["a-no", "a-yes", "b-no", "b-yes"]);
}

fn clob_market(id: &str) -> serde_json::Value {
    json!({
        "condition_id": id,
        "question": format!("Will {id} happen?"),
        "accepting_orders": true,
        "closed": false,
        "tokens": [
            {"token_id": format!("{id}-yes"), "outcome": "Yes", "price": 0.5},
            {"token_id": format!("{id}-no"), "outcome": "No", "price": 0.5}
        ]
    })
}

#[tokio::test]
async fn clob_listing_joins_gamma_volume() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/markets"))
        .and(query_param("next_cursor", ""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                clob_market("0xhot"),
                clob_market("0xcold"),
                clob_market("0xunknown"),
                {"condition_id": "0xclosed", "accepting_orders": false, "closed": true, "tokens": []}
            ],
            "next_cursor": "LTE="
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gamma/markets"))
        .and(query_param("condition_ids", "0xhot"))
        .and(query_param("condition_ids", "0xcold"))
        .and(query_param("condition_ids", "0xunknown"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"conditionId": "0xhot", "volume24hr": 25000.5},
            {"conditionId": "0xcold", "volume24hr": "12"}
        ])))
        // Once for the direct page fetch, once for discovery.
        .expect(2)
        .mount(&server)
        .await;

    let client = PolymarketClient::new(server.uri()).with_gamma(format!("{}/gamma", server.uri()));
    let page = client.fetch_page("").await.unwrap();

    let volumes: Vec<_> = page.markets.iter().map(|m| m.volume_24h()).collect();
    assert_eq!(volumes, vec![dec!(25000.5), dec!(12), dec!(0), dec!(0)]);
    assert!(page.markets[0].is_tradable(dec!(1000)));
    assert!(!page.markets[1].is_tradable(dec!(1000)));

    let discovery = Discovery::new(Arc::new(client), DiscoverySettings::default());
    let result = discovery.discover().await;
    let ids: Vec<_> = result.token_ids.iter().map(|t| t.as_str().to_owned()).collect();
    assert_eq!(ids, vec!["0xhot-no", "0xhot-yes"]);
}

#[tokio::test]
async fn gamma_failure_fails_the_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/markets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [clob_market("0xhot")],
            "next_cursor": "LTE="
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gamma/markets"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = PolymarketClient::new(server.uri()).with_gamma(format!("{}/gamma", server.uri()));
    let err = client.fetch_page("").await.unwrap_err();
    assert!(matches!(err, Error::Http(_)));
}
