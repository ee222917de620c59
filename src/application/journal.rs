//! Append-only JSON-lines journals.
//!
//! Producers hold a cheap [`JournalHandle`] and enqueue records on a bounded
//! channel; a single [`JournalWriter`] per file drains it in order and
//! appends each record as one line. Producers never touch the file.
//!
//! [`JournalWriter::open`] opens the file up front so a bad path fails
//! before anything is streamed.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};

use crate::error::Result;

/// Producer side of a journal.
pub struct JournalHandle<T> {
    tx: mpsc::Sender<T>,
    dropped: Arc<AtomicU64>,
    closed: Arc<AtomicBool>,
}

impl<T> Clone for JournalHandle<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            dropped: Arc::clone(&self.dropped),
            closed: Arc::clone(&self.closed),
        }
    }
}

impl<T> JournalHandle<T> {
    /// Enqueue without waiting. A full queue or a stopped writer drops the
    /// record and counts it.
    ///
    /// Returns whether the record was accepted.
    pub fn try_record(&self, record: T) -> bool {
        match self.tx.try_send(record) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                let dropped = self.count_drop();
                debug!(dropped, "Journal queue full, record dropped");
                false
            }
            Err(TrySendError::Closed(_)) => {
                self.count_drop();
                self.warn_closed();
                false
            }
        }
    }

    /// Enqueue, waiting for queue space. Returns false if the writer is gone.
    pub async fn record(&self, record: T) -> bool {
        if self.tx.send(record).await.is_ok() {
            return true;
        }
        self.count_drop();
        self.warn_closed();
        false
    }

    /// Records dropped because the queue was full or the writer had stopped.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn count_drop(&self) -> u64 {
        self.dropped.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn warn_closed(&self) {
        if !self.closed.swap(true, Ordering::Relaxed) {
            warn!("Journal writer stopped, records are being dropped");
        }
    }
}

/// Consumer side of a journal: owns the file.
pub struct JournalWriter<T> {
    path: PathBuf,
    rx: mpsc::Receiver<T>,
}

/// A writer whose file is already open.
pub struct OpenJournal<T> {
    path: PathBuf,
    rx: mpsc::Receiver<T>,
    file: File,
}

/// Create a journal appending to `path` with a queue of `capacity` records.
#[must_use]
pub fn journal<T>(path: impl Into<PathBuf>, capacity: usize) -> (JournalHandle<T>, JournalWriter<T>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        JournalHandle {
            tx,
            dropped: Arc::new(AtomicU64::new(0)),
            closed: Arc::new(AtomicBool::new(false)),
        },
        JournalWriter {
            path: path.into(),
            rx,
        },
    )
}

impl<T: Serialize> JournalWriter<T> {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create parent directories and open the file for appending.
    pub async fn open(self) -> Result<OpenJournal<T>> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        Ok(OpenJournal {
            path: self.path,
            rx: self.rx,
            file,
        })
    }

    /// Open the file, then drain the queue into it.
    pub async fn run(self) -> Result<u64> {
        self.open().await?.run().await
    }
}

impl<T: Serialize> OpenJournal<T> {
    /// Drain the queue into the file until every handle is dropped.
    ///
    /// Returns the number of records written. A failed write is logged and
    /// the record skipped.
    pub async fn run(mut self) -> Result<u64> {
        let mut file = self.file;
        debug!(path = %self.path.display(), "Journal writer started");
        let mut written = 0u64;

        while let Some(record) = self.rx.recv().await {
            let mut line = match serde_json::to_vec(&record) {
                Ok(line) => line,
                Err(e) => {
                    warn!(error = %e, path = %self.path.display(), "Failed to serialize journal record");
                    continue;
                }
            };
            line.push(b'\n');

            if let Err(e) = file.write_all(&line).await {
                warn!(error = %e, path = %self.path.display(), "Failed to append journal record");
                continue;
            }
            if let Err(e) = file.flush().await {
                warn!(error = %e, path = %self.path.display(), "Failed to flush journal");
            }
            written += 1;
        }

        file.flush().await?;
        info!(path = %self.path.display(), written, "Journal writer stopped");
        Ok(written)
    }
}
