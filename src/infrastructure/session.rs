//! Streaming session: connect, subscribe in batches, stream, back off, repeat.
//!
//! ```text
//! DISCONNECTED -> CONNECTING -> SUBSCRIBED -> STREAMING -> CLOSING
//!                     ^              |            |
//!                     |              v            v
//!                     +---------- BACKOFF <-------+
//! ```
//!
//! One subscription round is sent per connection, always from the in-memory
//! asset-id set, so a reconnect never triggers discovery. A streaming period
//! longer than the stability window resets the backoff to its floor.

use std::fmt;
use std::time::Duration;

use rand::Rng;
use tokio::sync::watch;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::adapter::outbound::polymarket::stream::ABNORMAL_CLOSURE;
use crate::application::dispatch::FrameHandler;
use crate::domain::id::TokenId;
use crate::error::{ConfigError, Result};
use crate::infrastructure::config::session::{ReconnectionConfig, SessionConfig, MAX_BATCH_SIZE};
use crate::port::outbound::exchange::{MarketDataStream, StreamMessage};

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Subscribed,
    Streaming,
    Backoff,
    Closing,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Subscribed => "subscribed",
            Self::Streaming => "streaming",
            Self::Backoff => "backoff",
            Self::Closing => "closing",
        };
        f.write_str(name)
    }
}

/// Capped exponential backoff with additive random jitter.
#[derive(Debug, Clone)]
pub struct Backoff {
    config: ReconnectionConfig,
    current_delay_ms: u64,
    attempts: u32,
}

impl Backoff {
    #[must_use]
    pub fn new(config: ReconnectionConfig) -> Self {
        let current_delay_ms = config.initial_delay_ms;
        Self {
            config,
            current_delay_ms,
            attempts: 0,
        }
    }

    /// Return to the initial delay.
    pub fn reset(&mut self) {
        self.current_delay_ms = self.config.initial_delay_ms;
        self.attempts = 0;
    }

    /// Consecutive delays handed out since the last reset.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Delay before the next attempt without jitter.
    #[must_use]
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.current_delay_ms)
    }

    /// Take the next delay and advance the schedule.
    pub fn next_delay(&mut self) -> Duration {
        let base_ms = self.current_delay_ms;
        let jitter_range_ms = (base_ms as f64 * self.config.jitter) as u64;
        let jitter_ms = if jitter_range_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=jitter_range_ms)
        };

        let next = (base_ms as f64 * self.config.backoff_multiplier) as u64;
        self.current_delay_ms = next.min(self.config.max_delay_ms);
        self.attempts += 1;

        Duration::from_millis(base_ms + jitter_ms)
    }
}

/// Counters for one session run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub connects: u64,
    pub connect_failures: u64,
    pub subscribe_frames: u64,
    pub disconnects: u64,
    pub frames: u64,
}

enum Outcome {
    Shutdown,
    Retry,
}

/// Owns the market-data stream and drives it through the state machine.
pub struct Session<S: MarketDataStream> {
    stream: S,
    config: SessionConfig,
    token_ids: Vec<TokenId>,
    state: SessionState,
    backoff: Backoff,
    stats: SessionStats,
}

impl<S: MarketDataStream> Session<S> {
    /// Create a session for `token_ids`.
    ///
    /// # Errors
    ///
    /// Rejects a heartbeat interval not strictly greater than its timeout and
    /// a batch size outside `1..=500`.
    #[allow(clippy::result_large_err)]
    pub fn new(
        stream: S,
        config: SessionConfig,
        token_ids: impl IntoIterator<Item = TokenId>,
    ) -> Result<Self> {
        if config.heartbeat_interval() <= config.heartbeat_timeout() {
            return Err(ConfigError::InvalidValue {
                field: "heartbeat_interval_secs",
                reason: format!(
                    "interval {}s must be greater than timeout {}s",
                    config.heartbeat_interval_secs, config.heartbeat_timeout_secs
                ),
            }
            .into());
        }
        if config.batch_size == 0 || config.batch_size > MAX_BATCH_SIZE {
            return Err(ConfigError::InvalidValue {
                field: "batch_size",
                reason: format!("must be between 1 and {MAX_BATCH_SIZE}"),
            }
            .into());
        }

        config.reconnection.check()?;

        let backoff = Backoff::new(config.reconnection.clone());
        Ok(Self {
            stream,
            config,
            token_ids: token_ids.into_iter().collect(),
            state: SessionState::Disconnected,
            backoff,
            stats: SessionStats::default(),
        })
    }

    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub const fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Subscription frames for one round.
    pub fn batches(&self) -> impl Iterator<Item = &[TokenId]> {
        self.token_ids.chunks(self.config.batch_size)
    }

    fn transition(&mut self, next: SessionState) {
        if self.state != next {
            debug!(from = %self.state, to = %next, "Session state change");
            self.state = next;
        }
    }

    /// Run until `shutdown` flips to true or its sender is dropped.
    ///
    /// Frames are handed to `handler` one at a time, in arrival order.
    pub async fn run<H: FrameHandler>(
        mut self,
        handler: &mut H,
        mut shutdown: watch::Receiver<bool>,
    ) -> SessionStats {
        info!(
            tokens = self.token_ids.len(),
            batch_size = self.config.batch_size,
            exchange = self.stream.exchange_name(),
            "Session starting"
        );

        loop {
            if is_shutdown(&shutdown) {
                break;
            }
            if let Outcome::Shutdown = self.connect_and_stream(handler, &mut shutdown).await {
                break;
            }

            self.transition(SessionState::Backoff);
            let delay = self.backoff.next_delay();
            warn!(
                delay_ms = delay.as_millis() as u64,
                attempt = self.backoff.attempts(),
                "Reconnecting after delay"
            );
            if !sleep_or_shutdown(delay, &mut shutdown).await {
                break;
            }
        }

        self.transition(SessionState::Closing);
        self.stream.close().await;
        self.transition(SessionState::Disconnected);
        info!(
            connects = self.stats.connects,
            disconnects = self.stats.disconnects,
            frames = self.stats.frames,
            "Session stopped"
        );
        self.stats
    }

    async fn connect_and_stream<H: FrameHandler>(
        &mut self,
        handler: &mut H,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Outcome {
        self.transition(SessionState::Connecting);
        let connected = tokio::select! {
            result = self.stream.connect() => result,
            _ = wait_for_shutdown(shutdown) => return Outcome::Shutdown,
        };
        if let Err(e) = connected {
            self.stats.connect_failures += 1;
            warn!(error = %e, "Connection attempt failed");
            return Outcome::Retry;
        }
        self.stats.connects += 1;
        self.transition(SessionState::Subscribed);

        match self.subscribe_all(shutdown).await {
            Ok(true) => {}
            Ok(false) => return Outcome::Shutdown,
            Err(e) => {
                warn!(error = %e, "Subscription failed, dropping connection");
                self.stream.close().await;
                return Outcome::Retry;
            }
        }

        self.transition(SessionState::Streaming);
        let started = Instant::now();
        let outcome = self.stream_frames(handler, shutdown).await;

        if started.elapsed() >= self.config.stability_window() {
            if self.backoff.attempts() > 0 {
                info!("Connection was stable, resetting backoff");
            }
            self.backoff.reset();
        }
        outcome
    }

    /// Send one subscription round. Returns `Ok(false)` on shutdown.
    async fn subscribe_all(&mut self, shutdown: &mut watch::Receiver<bool>) -> Result<bool> {
        let batch_size = self.config.batch_size;
        let batch_delay = self.config.batch_delay();
        let total = self.token_ids.len().div_ceil(batch_size);

        for (index, batch) in self.token_ids.chunks(batch_size).enumerate() {
            if index > 0 && !sleep_or_shutdown(batch_delay, shutdown).await {
                return Ok(false);
            }
            self.stream.subscribe(batch).await?;
            self.stats.subscribe_frames += 1;
            debug!(batch = index + 1, total, assets = batch.len(), "Subscription batch sent");
        }

        info!(assets = self.token_ids.len(), batches = total, "Subscribed");
        Ok(true)
    }

    async fn stream_frames<H: FrameHandler>(
        &mut self,
        handler: &mut H,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Outcome {
        loop {
            let message = tokio::select! {
                message = self.stream.next_message() => message,
                _ = wait_for_shutdown(shutdown) => return Outcome::Shutdown,
            };

            match message {
                Some(StreamMessage::Frame(raw)) => {
                    self.stats.frames += 1;
                    handler.on_frame(&raw);
                }
                Some(StreamMessage::Disconnected { code, reason }) => {
                    self.stats.disconnects += 1;
                    if code == Some(ABNORMAL_CLOSURE) {
                        warn!(code = ABNORMAL_CLOSURE, reason = %reason, "Abnormal closure");
                    } else {
                        warn!(code = ?code, reason = %reason, "Stream disconnected");
                    }
                    return Outcome::Retry;
                }
                None => {
                    self.stats.disconnects += 1;
                    warn!("Stream ended without a close notice");
                    return Outcome::Retry;
                }
            }
        }
    }
}

fn is_shutdown(shutdown: &watch::Receiver<bool>) -> bool {
    *shutdown.borrow()
}

/// Resolve once shutdown is requested or the sender is gone.
async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if is_shutdown(shutdown) || shutdown.changed().await.is_err() {
            return;
        }
    }
}

/// Sleep for `delay`. Returns false if shutdown was requested first.
async fn sleep_or_shutdown(delay: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = sleep(delay) => true,
        _ = wait_for_shutdown(shutdown) => false,
    }
}
