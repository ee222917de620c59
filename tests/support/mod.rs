#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;

use atomic_scanner::infrastructure::config::settings::Config;
use atomic_scanner::testkit;

/// Config with every file path under `dir` and no waiting in the session.
pub fn config_in(dir: &Path) -> Config {
    let mut config = Config::default();
    config.discovery.cache_path = dir.join("discovery_cache.json");
    config.journal.event_path = dir.join("events.jsonl");
    config.journal.opportunity_path = dir.join("opportunities.jsonl");
    config.session = testkit::config::session();
    config
}

/// Poll `check` until it holds or `timeout` elapses.
pub async fn wait_until(timeout: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    check()
}

/// Lines of a JSON-lines file, parsed.
pub fn read_jsonl(path: &Path) -> Vec<serde_json::Value> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(|line| serde_json::from_str(line).expect("journal line is JSON"))
        .collect()
}
