//! Write buffers shared by the storage backends.
//!
//! [`InsertBuffer`] collects records for bulk insertion and flushes when it
//! reaches capacity. [`DeleteBuffer`] is a bounded queue of pending soft
//! deletes drained by snapshot. Both hand their contents to a [`BatchWriter`],
//! which the backend implements as a single transaction.

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc, mpsc::error::TrySendError};
use tracing::debug;

use crate::domain::entities::{PendingDeletion, UrlRecord};
use crate::error::ShortenerError;

/// Default number of records that triggers an automatic insert flush.
pub const DEFAULT_INSERT_CAPACITY: usize = 1000;

/// Default capacity of the delete queue.
pub const DEFAULT_DELETE_CAPACITY: usize = 1024;

/// Atomic sink for buffered writes.
///
/// Implementations must apply a whole batch or none of it.
#[async_trait]
pub trait BatchWriter: Send + Sync {
    async fn insert_batch(&self, batch: &[UrlRecord]) -> Result<(), ShortenerError>;

    async fn mark_deleted(&self, batch: &[PendingDeletion]) -> Result<(), ShortenerError>;
}

/// Bounded buffer of records awaiting bulk insertion.
///
/// Appends and flushes are serialized by one async lock, so the caller whose
/// append fills the buffer pays for the flush.
pub struct InsertBuffer {
    capacity: usize,
    pending: Mutex<Vec<UrlRecord>>,
}

impl InsertBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            pending: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of records waiting for the next flush.
    pub async fn len(&self) -> usize {
        self.pending.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Appends a record, flushing through `writer` when capacity is reached.
    pub async fn push<W>(&self, record: UrlRecord, writer: &W) -> Result<(), ShortenerError>
    where
        W: BatchWriter + ?Sized,
    {
        let mut pending = self.pending.lock().await;
        pending.push(record);

        if pending.len() >= self.capacity {
            self.write(&mut pending, writer).await?;
        }

        Ok(())
    }

    /// Flushes whatever is buffered. A no-op on an empty buffer.
    pub async fn flush<W>(&self, writer: &W) -> Result<(), ShortenerError>
    where
        W: BatchWriter + ?Sized,
    {
        let mut pending = self.pending.lock().await;
        self.write(&mut pending, writer).await
    }

    async fn write<W>(&self, pending: &mut Vec<UrlRecord>, writer: &W) -> Result<(), ShortenerError>
    where
        W: BatchWriter + ?Sized,
    {
        if pending.is_empty() {
            return Ok(());
        }

        let batch = std::mem::replace(pending, Vec::with_capacity(self.capacity));
        debug!(records = batch.len(), "Flushing insert buffer");

        writer.insert_batch(&batch).await
    }
}

/// Bounded concurrent queue of pending soft deletes.
pub struct DeleteBuffer {
    sender: mpsc::Sender<PendingDeletion>,
    receiver: Mutex<mpsc::Receiver<PendingDeletion>>,
}

impl DeleteBuffer {
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        Self {
            sender,
            receiver: Mutex::new(receiver),
        }
    }

    /// Number of deletions currently queued.
    pub fn len(&self) -> usize {
        self.sender.max_capacity() - self.sender.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Enqueues a deletion without waiting.
    ///
    /// When the queue is full it is flushed through `writer` first.
    pub async fn push<W>(&self, deletion: PendingDeletion, writer: &W) -> Result<(), ShortenerError>
    where
        W: BatchWriter + ?Sized,
    {
        match self.sender.try_send(deletion) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(deletion)) => {
                self.flush(writer).await?;
                self.sender
                    .send(deletion)
                    .await
                    .map_err(|_| ShortenerError::Internal("delete buffer closed".to_string()))
            }
            Err(TrySendError::Closed(_)) => {
                Err(ShortenerError::Internal("delete buffer closed".to_string()))
            }
        }
    }

    /// Drains the deletions available right now and writes them as one batch.
    ///
    /// Items enqueued while the drain runs are left for the next flush.
    pub async fn flush<W>(&self, writer: &W) -> Result<(), ShortenerError>
    where
        W: BatchWriter + ?Sized,
    {
        let mut receiver = self.receiver.lock().await;

        let mut batch = Vec::new();
        while let Ok(deletion) = receiver.try_recv() {
            batch.push(deletion);
        }

        if batch.is_empty() {
            return Ok(());
        }

        debug!(deletions = batch.len(), "Flushing delete buffer");
        writer.mark_deleted(&batch).await
    }
}
