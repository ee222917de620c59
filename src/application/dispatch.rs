//! Receive-path dispatch: decode, refresh the store, journal, schedule inference.
//!
//! Everything here runs inline with the socket read, so nothing awaits.
//! Journal records and inference jobs are handed off with `try_send`; a full
//! queue drops the unit of work and bumps a counter instead of stalling the
//! feed.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use super::cache::book::BookStore;
use super::debounce::Debouncer;
use super::inference::InferenceJob;
use super::journal::JournalHandle;
use crate::domain::{id::MarketId, record::EventRecord};
use crate::port::outbound::exchange::{FeedEvent, FrameDecoder};

/// Running totals for the receive path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub frames: u64,
    pub undecodable: u64,
    pub book_updates: u64,
    pub unknown_assets: u64,
    pub other_events: u64,
    pub jobs_scheduled: u64,
    pub jobs_debounced: u64,
    pub jobs_dropped: u64,
    /// Event records lost to a full journal queue.
    pub events_dropped: u64,
}

/// Consumer of raw frames on the receive path.
///
/// Called inline with the socket read; implementations must not block.
pub trait FrameHandler: Send {
    fn on_frame(&mut self, raw: &str);
}

/// Routes raw frames into the book store and the inference queue.
pub struct EventDispatcher {
    decoder: Arc<dyn FrameDecoder>,
    store: Arc<BookStore>,
    events: JournalHandle<EventRecord>,
    jobs: mpsc::Sender<InferenceJob>,
    debouncer: Debouncer<MarketId>,
    stats: DispatchStats,
    inference_gone: bool,
}

impl EventDispatcher {
    #[must_use]
    pub fn new(
        decoder: Arc<dyn FrameDecoder>,
        store: Arc<BookStore>,
        events: JournalHandle<EventRecord>,
        jobs: mpsc::Sender<InferenceJob>,
        debounce_window: Duration,
    ) -> Self {
        Self {
            decoder,
            store,
            events,
            jobs,
            debouncer: Debouncer::new(debounce_window),
            stats: DispatchStats::default(),
            inference_gone: false,
        }
    }

    #[must_use]
    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            events_dropped: self.events.dropped(),
            ..self.stats
        }
    }

    /// Handle one raw frame with explicit clocks.
    ///
    /// `now` drives the debouncer, `wall` stamps books and records.
    pub fn on_frame_at(&mut self, raw: &str, now: Instant, wall: DateTime<Utc>) {
        self.stats.frames += 1;

        let events = match self.decoder.decode(raw) {
            Ok(events) => events,
            Err(e) => {
                self.stats.undecodable += 1;
                warn!(error = %e, len = raw.len(), "Dropping undecodable frame");
                return;
            }
        };

        for event in events {
            match event {
                FeedEvent::BookUpdate {
                    asset_id,
                    bids,
                    asks,
                } => {
                    let Some(refresh) = self.store.apply_update_at(&asset_id, bids, asks, wall) else {
                        self.stats.unknown_assets += 1;
                        continue;
                    };
                    self.stats.book_updates += 1;
                    self.events.try_record(refresh.event);

                    if !self.debouncer.should_fire(refresh.market_id.clone(), now) {
                        self.stats.jobs_debounced += 1;
                        continue;
                    }
                    self.schedule(InferenceJob {
                        asset_id,
                        market_id: refresh.market_id,
                        scheduled_at: wall,
                    });
                }
                FeedEvent::Other { kind } => {
                    self.stats.other_events += 1;
                    trace!(kind = %kind, "Ignoring non-book event");
                }
            }
        }
    }

    fn schedule(&mut self, job: InferenceJob) {
        match self.jobs.try_send(job) {
            Ok(()) => self.stats.jobs_scheduled += 1,
            Err(TrySendError::Full(job)) => {
                self.stats.jobs_dropped += 1;
                debug!(market_id = %job.market_id, dropped = self.stats.jobs_dropped, "Inference queue full, job dropped");
            }
            Err(TrySendError::Closed(job)) => {
                self.stats.jobs_dropped += 1;
                if !self.inference_gone {
                    self.inference_gone = true;
                    warn!(market_id = %job.market_id, "Inference worker stopped, jobs are being dropped");
                }
            }
        }
    }
}

impl FrameHandler for EventDispatcher {
    fn on_frame(&mut self, raw: &str) {
        self.on_frame_at(raw, Instant::now(), Utc::now());
    }
}
