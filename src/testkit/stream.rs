//! Mock [`MarketDataStream`] and [`FrameHandler`] implementations for testing.
//!
//! - [`ScriptedStream`] - Pre-loaded connect/subscribe results and messages.
//!   Best for: reconnection, resubscription and batching behavior.
//! - [`RecordingHandler`] - Collects every frame it is handed.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::application::dispatch::FrameHandler;
use crate::domain::id::TokenId;
use crate::error::Result;
use crate::port::outbound::exchange::{MarketDataStream, StreamMessage};

/// A mock stream with scripted connect/subscribe results and a fixed message queue.
///
/// Each call to `connect()` or `subscribe()` pops the next result from the
/// corresponding queue (defaults to `Ok(())` when exhausted). The message
/// queue is shared across connections; once it is empty the stream stays
/// quiet forever, like an idle but healthy socket.
pub struct ScriptedStream {
    connect_results: VecDeque<Result<()>>,
    subscribe_results: VecDeque<Result<()>>,
    messages: VecDeque<Option<StreamMessage>>,
    connect_count: Arc<AtomicU32>,
    subscribe_count: Arc<AtomicU32>,
    subscriptions: Arc<Mutex<Vec<Vec<TokenId>>>>,
}

impl ScriptedStream {
    pub fn new() -> Self {
        Self {
            connect_results: VecDeque::new(),
            subscribe_results: VecDeque::new(),
            messages: VecDeque::new(),
            connect_count: Arc::new(AtomicU32::new(0)),
            subscribe_count: Arc::new(AtomicU32::new(0)),
            subscriptions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_connect_results(mut self, results: Vec<Result<()>>) -> Self {
        self.connect_results = results.into();
        self
    }

    pub fn with_subscribe_results(mut self, results: Vec<Result<()>>) -> Self {
        self.subscribe_results = results.into();
        self
    }

    pub fn with_messages(mut self, messages: Vec<Option<StreamMessage>>) -> Self {
        self.messages = messages.into();
        self
    }

    /// Get shared counters for asserting connect/subscribe call counts.
    pub fn counts(&self) -> (Arc<AtomicU32>, Arc<AtomicU32>) {
        (self.connect_count.clone(), self.subscribe_count.clone())
    }

    /// Every subscription frame sent, in order.
    pub fn subscriptions(&self) -> Arc<Mutex<Vec<Vec<TokenId>>>> {
        self.subscriptions.clone()
    }

    pub fn connect_count(&self) -> u32 {
        self.connect_count.load(Ordering::SeqCst)
    }

    pub fn subscribe_count(&self) -> u32 {
        self.subscribe_count.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedStream {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataStream for ScriptedStream {
    async fn connect(&mut self) -> Result<()> {
        self.connect_count.fetch_add(1, Ordering::SeqCst);
        self.connect_results.pop_front().unwrap_or(Ok(()))
    }

    async fn subscribe(&mut self, token_ids: &[TokenId]) -> Result<()> {
        self.subscribe_count.fetch_add(1, Ordering::SeqCst);
        self.subscriptions.lock().push(token_ids.to_vec());
        self.subscribe_results.pop_front().unwrap_or(Ok(()))
    }

    async fn next_message(&mut self) -> Option<StreamMessage> {
        match self.messages.pop_front() {
            Some(message) => message,
            None => std::future::pending().await,
        }
    }

    async fn close(&mut self) {}

    fn exchange_name(&self) -> &'static str {
        "mock"
    }
}

/// Frame handler that records what it receives.
#[derive(Debug, Default)]
pub struct RecordingHandler {
    pub frames: Vec<String>,
}

impl FrameHandler for RecordingHandler {
    fn on_frame(&mut self, raw: &str) {
        self.frames.push(raw.to_owned());
    }
}
