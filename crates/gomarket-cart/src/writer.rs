//! # Persistence Writer
//!
//! Background task that writes cart snapshots to device storage.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Persistence Writer                                │
//! │                                                                         │
//! │  CartHandle::add_to_cart / increment / decrement                       │
//! │       │  (snapshot queued while the cart lock is held, so the channel  │
//! │       │   order always matches mutation order)                         │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 mpsc::unbounded  (WriterCommand)                 │   │
//! │  └────────────────────────────┬────────────────────────────────────┘   │
//! │                               ▼                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      PersistWriter::run                          │   │
//! │  │                                                                  │   │
//! │  │   Immediate:  Save ──► repository.save()                         │   │
//! │  │   Coalesced:  Save ──► pending = latest, deadline = first + win  │   │
//! │  │               deadline ──► repository.save(pending)              │   │
//! │  │   Flush / Shutdown / channel closed ──► write pending now        │   │
//! │  └────────────────────────────┬────────────────────────────────────┘   │
//! │                               ▼                                         │
//! │           error! + PersistEventListener + PersistStatus                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Failed writes are not retried. The next mutation produces a fresh snapshot
//! that replaces the whole stored cart anyway.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use gomarket_core::LineItem;
use gomarket_storage::{CartRepository, KeyValueStore, StoreError};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info};

use crate::config::{PersistSettings, WriteMode};
use crate::error::{CartError, CartResult};

// =============================================================================
// Event Listener
// =============================================================================

/// Receives the outcome of every storage write.
///
/// Called from the writer task; implementations must not block.
pub trait PersistEventListener: Send + Sync {
    /// A snapshot of `items` line items reached storage.
    fn on_persisted(&self, _items: usize) {}

    /// A snapshot could not be written.
    fn on_persist_error(&self, error: &StoreError);
}

/// Listener that ignores every event.
pub struct NoOpListener;

impl PersistEventListener for NoOpListener {
    fn on_persist_error(&self, _error: &StoreError) {}
}

// =============================================================================
// Status
// =============================================================================

/// Counters describing what the writer has done so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PersistStatus {
    /// Snapshots received from cart mutations.
    pub queued: u64,
    /// Snapshots replaced by a newer one before they were written.
    pub collapsed: u64,
    /// Successful writes.
    pub writes: u64,
    /// Failed writes.
    pub failures: u64,
    /// True while a snapshot is waiting for its coalesce window to close.
    pub pending: bool,
    /// Message of the most recent failure, cleared by the next success.
    pub last_error: Option<String>,
    /// Time of the most recent successful write.
    pub last_written_at: Option<DateTime<Utc>>,
}

type SharedStatus = Arc<Mutex<PersistStatus>>;

fn update_status(status: &SharedStatus, f: impl FnOnce(&mut PersistStatus)) {
    let mut guard = status.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut guard);
}

// =============================================================================
// Handle
// =============================================================================

#[derive(Debug)]
enum WriterCommand {
    /// Persist this snapshot.
    Save(Vec<LineItem>),
    /// Write any pending snapshot, then acknowledge.
    Flush(oneshot::Sender<()>),
    /// Write any pending snapshot, acknowledge, and stop.
    Shutdown(oneshot::Sender<()>),
}

/// Handle for feeding and controlling a running writer.
#[derive(Debug, Clone)]
pub struct PersistHandle {
    cmd_tx: mpsc::UnboundedSender<WriterCommand>,
    status: SharedStatus,
}

impl PersistHandle {
    /// Queues a snapshot. Never blocks.
    pub fn enqueue(&self, items: Vec<LineItem>) -> CartResult<()> {
        self.cmd_tx
            .send(WriterCommand::Save(items))
            .map_err(|_| CartError::WriterClosed)
    }

    /// Waits until every snapshot queued so far has been written or has failed.
    pub async fn flush(&self) -> CartResult<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.cmd_tx
            .send(WriterCommand::Flush(ack_tx))
            .map_err(|_| CartError::WriterClosed)?;
        ack_rx.await.map_err(|_| CartError::WriterClosed)
    }

    /// Flushes and stops the writer.
    pub async fn shutdown(&self) -> CartResult<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.cmd_tx
            .send(WriterCommand::Shutdown(ack_tx))
            .map_err(|_| CartError::WriterClosed)?;
        ack_rx.await.map_err(|_| CartError::WriterClosed)
    }

    /// Returns true once the writer task has stopped.
    pub fn is_closed(&self) -> bool {
        self.cmd_tx.is_closed()
    }

    /// Returns a copy of the current counters.
    pub fn status(&self) -> PersistStatus {
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

// =============================================================================
// Writer
// =============================================================================

/// Writes cart snapshots through a [`CartRepository`].
pub struct PersistWriter<S> {
    repo: CartRepository<S>,
    settings: PersistSettings,
    listener: Arc<dyn PersistEventListener>,
    status: SharedStatus,
}

impl<S: KeyValueStore + 'static> PersistWriter<S> {
    /// Creates a writer that reports nowhere but the log.
    pub fn new(repo: CartRepository<S>, settings: PersistSettings) -> Self {
        Self::with_listener(repo, settings, Arc::new(NoOpListener))
    }

    /// Creates a writer with a custom listener.
    pub fn with_listener(
        repo: CartRepository<S>,
        settings: PersistSettings,
        listener: Arc<dyn PersistEventListener>,
    ) -> Self {
        PersistWriter {
            repo,
            settings,
            listener,
            status: SharedStatus::default(),
        }
    }

    /// Spawns the writer task and returns its handle.
    ///
    /// Must be called from within a tokio runtime. The task stops after
    /// `shutdown`, or once every handle has been dropped and the last pending
    /// snapshot is written.
    pub fn start(self) -> PersistHandle {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let status = self.status.clone();

        tokio::spawn(async move {
            self.run(cmd_rx).await;
        });

        PersistHandle { cmd_tx, status }
    }

    async fn run(self, mut cmd_rx: mpsc::UnboundedReceiver<WriterCommand>) {
        info!(
            key = %self.repo.key(),
            mode = %self.settings.mode,
            debounce_ms = self.settings.debounce_ms,
            "Cart persistence writer started"
        );

        let mut pending: Option<Vec<LineItem>> = None;
        let mut deadline: Option<Instant> = None;

        loop {
            let wake_at = deadline;
            let window_closed = async move {
                match wake_at {
                    Some(at) => sleep_until(at).await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                cmd = cmd_rx.recv() => match cmd {
                    Some(WriterCommand::Save(items)) => {
                        update_status(&self.status, |s| s.queued += 1);

                        match self.settings.mode {
                            WriteMode::Immediate => self.write(items).await,
                            WriteMode::Coalesced => {
                                if pending.replace(items).is_some() {
                                    update_status(&self.status, |s| s.collapsed += 1);
                                } else {
                                    deadline = Some(Instant::now() + self.settings.debounce());
                                    update_status(&self.status, |s| s.pending = true);
                                }
                            }
                        }
                    }
                    Some(WriterCommand::Flush(ack)) => {
                        self.write_pending(&mut pending, &mut deadline).await;
                        let _ = ack.send(());
                    }
                    Some(WriterCommand::Shutdown(ack)) => {
                        self.write_pending(&mut pending, &mut deadline).await;
                        let _ = ack.send(());
                        break;
                    }
                    None => {
                        debug!("All cart handles dropped");
                        self.write_pending(&mut pending, &mut deadline).await;
                        break;
                    }
                },
                _ = window_closed => {
                    self.write_pending(&mut pending, &mut deadline).await;
                }
            }
        }

        info!(key = %self.repo.key(), "Cart persistence writer stopped");
    }

    async fn write_pending(&self, pending: &mut Option<Vec<LineItem>>, deadline: &mut Option<Instant>) {
        *deadline = None;
        if let Some(items) = pending.take() {
            update_status(&self.status, |s| s.pending = false);
            self.write(items).await;
        }
    }

    async fn write(&self, items: Vec<LineItem>) {
        match self.repo.save(&items).await {
            Ok(()) => {
                update_status(&self.status, |s| {
                    s.writes += 1;
                    s.last_error = None;
                    s.last_written_at = Some(Utc::now());
                });
                self.listener.on_persisted(items.len());
            }
            Err(e) => {
                error!(
                    key = %self.repo.key(),
                    error = %e,
                    retryable = e.is_retryable(),
                    "Failed to persist cart"
                );
                update_status(&self.status, |s| {
                    s.failures += 1;
                    s.last_error = Some(e.to_string());
                });
                self.listener.on_persist_error(&e);
            }
        }
    }
}
