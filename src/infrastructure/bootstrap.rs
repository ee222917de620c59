//! Composition root: wires adapters, application services and the session.
//!
//! Startup order is discovery, store seeding, journal files, background
//! workers (journals, friction feed, inference), then the streaming session.
//! A journal file that cannot be opened aborts the run before streaming. On shutdown the
//! dispatcher is dropped first so the inference worker and journal writers
//! drain whatever is already queued before the process exits.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::adapter::outbound::friction::HttpFrictionSource;
use crate::adapter::outbound::polymarket::{
    PolymarketClient, PolymarketDataStream, PolymarketFrameDecoder,
};
use crate::application::{
    journal, BookStore, DispatchStats, Discovery, DiscoverySettings, EventDispatcher,
    FrictionFeed, FrictionSlot, InferenceSettings, InferenceStats, InferenceWorker, SnapshotCache,
};
use crate::domain::friction::FrictionState;
use crate::error::Result;
use crate::infrastructure::config::settings::{Config, Credentials};
use crate::infrastructure::session::{Session, SessionStats};
use crate::port::outbound::exchange::{FrameDecoder, MarketDataStream, MarketFetcher};
use crate::port::outbound::friction::FrictionSource;

/// Per-run switches that do not belong in the config file.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Serve discovery from a fresh snapshot when one exists.
    pub use_cache: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { use_cache: true }
    }
}

/// Outbound collaborators for one run.
pub struct Adapters<S> {
    pub fetcher: Arc<dyn MarketFetcher>,
    pub stream: S,
    pub decoder: Arc<dyn FrameDecoder>,
    pub friction: Arc<dyn FrictionSource>,
}

/// Summary of a finished run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub tokens: usize,
    pub from_cache: bool,
    pub session: SessionStats,
    pub dispatch: DispatchStats,
    pub inference: InferenceStats,
    pub events_written: u64,
    pub opportunities_written: u64,
}

/// Live Polymarket and HTTP friction adapters built from `config`.
#[must_use]
pub fn polymarket_adapters(config: &Config, credentials: &Credentials) -> Adapters<PolymarketDataStream> {
    let poly = &config.polymarket;
    Adapters {
        fetcher: Arc::new(PolymarketClient::from_config(poly)),
        stream: PolymarketDataStream::new(
            poly.ws_url.clone(),
            config.session.heartbeat_interval(),
            config.session.heartbeat_timeout(),
        ),
        decoder: Arc::new(PolymarketFrameDecoder::new()),
        friction: Arc::new(HttpFrictionSource::from_config(
            &config.friction,
            &credentials.price_api_key,
        )),
    }
}

/// Run against the live exchange until `shutdown` fires.
pub async fn run(
    config: &Config,
    credentials: &Credentials,
    options: RunOptions,
    shutdown: watch::Receiver<bool>,
) -> Result<RunReport> {
    run_with(config, polymarket_adapters(config, credentials), options, shutdown).await
}

/// Run the full pipeline over the given adapters until `shutdown` fires.
pub async fn run_with<S: MarketDataStream>(
    config: &Config,
    adapters: Adapters<S>,
    options: RunOptions,
    shutdown: watch::Receiver<bool>,
) -> Result<RunReport> {
    let Adapters {
        fetcher,
        stream,
        decoder,
        friction,
    } = adapters;

    let discovery = Discovery::new(
        fetcher,
        DiscoverySettings {
            min_volume_24h: config.discovery.min_volume_24h,
            max_pages: config.polymarket.max_pages,
        },
    )
    .with_cache(
        SnapshotCache::new(&config.discovery.cache_path, config.discovery.cache_ttl()),
        options.use_cache,
    );
    let discovered = discovery.discover().await;

    let mut report = RunReport {
        tokens: discovered.token_ids.len(),
        from_cache: discovered.from_cache,
        ..RunReport::default()
    };
    if discovered.is_empty() {
        warn!("Nothing to subscribe to, exiting");
        return Ok(report);
    }
    if !discovered.complete {
        warn!(
            tokens = discovered.token_ids.len(),
            "Discovery incomplete, continuing with partial universe"
        );
    }

    let store = Arc::new(BookStore::new());
    let seeded = store.replace_all(discovered.books);
    info!(books = seeded, "Book store seeded");
    if store.is_empty() {
        warn!("No paired books after seeding, exiting");
        return Ok(report);
    }
    let token_ids = store.token_ids();
    if token_ids.len() != report.tokens {
        warn!(
            discovered = report.tokens,
            subscribed = token_ids.len(),
            "Subscribing only to tokens with a seeded book"
        );
        report.tokens = token_ids.len();
    }

    let session = Session::new(stream, config.session.clone(), token_ids)?;

    let (events, events_writer) = journal(&config.journal.event_path, config.journal.queue_capacity);
    let (opportunities, opportunities_writer) =
        journal(&config.journal.opportunity_path, config.journal.queue_capacity);
    let events_writer = events_writer.open().await?;
    let opportunities_writer = opportunities_writer.open().await?;
    let events_task = tokio::spawn(events_writer.run());
    let opportunities_task = tokio::spawn(opportunities_writer.run());

    let slot = FrictionSlot::new(FrictionState::fallback(
        config.friction.fallback_gas_price_gwei,
        config.friction.fallback_native_usd,
    ));
    let friction_task = tokio::spawn(
        FrictionFeed::new(
            friction,
            slot.clone(),
            Duration::from_secs(config.friction.refresh_secs),
        )
        .run(shutdown.clone()),
    );

    let (jobs_tx, jobs_rx) = mpsc::channel(config.dispatch.inference_queue_capacity);
    let worker = InferenceWorker::new(
        Arc::clone(&store),
        slot,
        InferenceSettings {
            target_size: config.inference.target_size,
            fee_rate: config.inference.fee_rate,
            gas_units_per_order: config.friction.gas_units_per_order,
            orders_per_trade: config.friction.orders_per_trade,
            max_book_age: config.inference.max_book_age(),
        },
        opportunities,
        jobs_rx,
    );
    let inference_task = tokio::spawn(worker.run());

    let mut dispatcher = EventDispatcher::new(
        decoder,
        Arc::clone(&store),
        events,
        jobs_tx,
        config.dispatch.debounce_window(),
    );

    report.session = session.run(&mut dispatcher, shutdown).await;
    report.dispatch = dispatcher.stats();
    drop(dispatcher);

    report.inference = join("inference worker", inference_task).await.unwrap_or_default();
    report.events_written = join_journal("events", events_task).await;
    report.opportunities_written = join_journal("opportunities", opportunities_task).await;
    join("friction feed", friction_task).await;

    info!(
        frames = report.dispatch.frames,
        book_updates = report.dispatch.book_updates,
        opportunities = report.inference.opportunities,
        jobs_dropped = report.dispatch.jobs_dropped,
        events_dropped = report.dispatch.events_dropped,
        "Run finished"
    );
    Ok(report)
}

async fn join<T>(name: &'static str, task: JoinHandle<T>) -> Option<T> {
    match task.await {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(task = name, error = %e, "Background task failed");
            None
        }
    }
}

async fn join_journal(name: &'static str, task: JoinHandle<Result<u64>>) -> u64 {
    match join(name, task).await {
        Some(Ok(written)) => written,
        Some(Err(e)) => {
            warn!(journal = name, error = %e, "Journal writer failed");
            0
        }
        None => 0,
    }
}
