//! Polymarket WebSocket market-data stream.
//!
//! # Connection Lifecycle
//!
//! 1. **Connection**: `connect()` opens the public market channel (no auth payload)
//! 2. **Subscription**: `subscribe()` sends one subscription frame per call
//! 3. **Receive**: `next_message()` yields raw text frames and keeps the
//!    connection alive with an application-level `PING` on a fixed interval
//! 4. **Termination**: a close frame, transport error, end of stream or
//!    missing `PONG` yields [`StreamMessage::Disconnected`] and drops the socket
//!
//! Frames are not decoded here; that is the dispatcher's job.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::{interval_at, sleep_until, Instant, Interval, MissedTickBehavior};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, trace, warn};

use super::dto::message::{PolymarketSubscribeMessage, PING, PONG};
use crate::domain::id::TokenId;
use crate::error::{Error, Result};
use crate::port::outbound::exchange::{MarketDataStream, StreamMessage};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Close code the WebSocket protocol reserves for connections dropped without a close frame.
pub const ABNORMAL_CLOSURE: u16 = 1006;

struct Connection {
    sink: SplitSink<WsStream, Message>,
    source: SplitStream<WsStream>,
    ping: Interval,
    /// Set when a `PING` is outstanding.
    pong_deadline: Option<Instant>,
}

/// Polymarket market data stream implementing the `MarketDataStream` trait.
pub struct PolymarketDataStream {
    url: String,
    ping_interval: Duration,
    pong_timeout: Duration,
    conn: Option<Connection>,
}

impl PolymarketDataStream {
    /// Create a new data stream for the given WebSocket URL.
    #[must_use]
    pub fn new(url: impl Into<String>, ping_interval: Duration, pong_timeout: Duration) -> Self {
        Self {
            url: url.into(),
            ping_interval,
            pong_timeout,
            conn: None,
        }
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    fn disconnected(&mut self, code: Option<u16>, reason: impl Into<String>) -> StreamMessage {
        self.conn = None;
        StreamMessage::Disconnected {
            code,
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl MarketDataStream for PolymarketDataStream {
    async fn connect(&mut self) -> Result<()> {
        info!(url = %self.url, "Connecting to WebSocket");
        let (ws, response) = connect_async(&self.url).await?;
        info!(status = %response.status(), "WebSocket connected");

        let (sink, source) = ws.split();
        let mut ping = interval_at(Instant::now() + self.ping_interval, self.ping_interval);
        ping.set_missed_tick_behavior(MissedTickBehavior::Delay);

        self.conn = Some(Connection {
            sink,
            source,
            ping,
            pong_deadline: None,
        });
        Ok(())
    }

    async fn subscribe(&mut self, token_ids: &[TokenId]) -> Result<()> {
        let conn = self
            .conn
            .as_mut()
            .ok_or_else(|| Error::Connection("Not connected".into()))?;

        let asset_ids: Vec<String> = token_ids.iter().map(|t| t.as_str().to_owned()).collect();
        let total = asset_ids.len();
        let json = serde_json::to_string(&PolymarketSubscribeMessage::new(asset_ids))?;

        debug!(assets = total, "Sending subscription frame");
        conn.sink.send(Message::Text(json)).await?;
        Ok(())
    }

    async fn next_message(&mut self) -> Option<StreamMessage> {
        let pong_timeout = self.pong_timeout;

        loop {
            let conn = self.conn.as_mut()?;
            let deadline = conn.pong_deadline;

            tokio::select! {
                frame = conn.source.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        if text.trim() == PONG {
                            trace!("Received PONG");
                            conn.pong_deadline = None;
                            continue;
                        }
                        trace!(bytes = text.len(), "Received WebSocket text frame");
                        return Some(StreamMessage::Frame(text));
                    }
                    Some(Ok(Message::Ping(data))) => {
                        trace!("Received WebSocket ping");
                        if let Err(e) = conn.sink.send(Message::Pong(data)).await {
                            return Some(self.disconnected(None, format!("failed to send pong: {e}")));
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let code = frame.as_ref().map(|f| u16::from(f.code));
                        let reason = frame.map(|f| f.reason.to_string()).unwrap_or_default();
                        info!(code = ?code, reason = %reason, "WebSocket closed by server");
                        return Some(self.disconnected(code, reason));
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        warn!(error = %e, "WebSocket error");
                        return Some(self.disconnected(Some(ABNORMAL_CLOSURE), e.to_string()));
                    }
                    None => {
                        warn!("WebSocket stream ended");
                        return Some(self.disconnected(Some(ABNORMAL_CLOSURE), "stream ended"));
                    }
                },
                _ = conn.ping.tick() => {
                    trace!("Sending PING");
                    if let Err(e) = conn.sink.send(Message::Text(PING.into())).await {
                        return Some(self.disconnected(None, format!("failed to send ping: {e}")));
                    }
                    if conn.pong_deadline.is_none() {
                        conn.pong_deadline = Some(Instant::now() + pong_timeout);
                    }
                },
                () = async {
                    match deadline {
                        Some(at) => sleep_until(at).await,
                        None => std::future::pending().await,
                    }
                } => {
                    warn!(timeout_ms = pong_timeout.as_millis() as u64, "Heartbeat timed out");
                    return Some(self.disconnected(None, "heartbeat timeout"));
                }
            }
        }
    }

    async fn close(&mut self) {
        if let Some(mut conn) = self.conn.take() {
            if let Err(e) = conn.sink.close().await {
                debug!(error = %e, "Error while closing WebSocket");
            }
        }
    }

    fn exchange_name(&self) -> &'static str {
        "Polymarket"
    }
}
