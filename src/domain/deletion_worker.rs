//! Asynchronous soft deletion of user URLs.
//!
//! Handlers hand deletion requests to a bounded [`DeletionQueue`] and return
//! immediately. A single [`run_deletion_worker`] task feeds them into the
//! storage delete buffer and flushes it. Failures are logged and never reach
//! the caller.
//!
//! When every [`DeletionQueue`] handle is dropped the worker drains what is
//! left, flushes once more and exits.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::domain::entities::PendingDeletion;
use crate::domain::repositories::UrlRepository;
use crate::error::ShortenerError;

/// Aliases a user asked to delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionRequest {
    pub owner_id: String,
    pub aliases: Vec<String>,
}

/// Sending half of the deletion queue.
#[derive(Debug, Clone)]
pub struct DeletionQueue {
    sender: mpsc::Sender<DeletionRequest>,
}

impl DeletionQueue {
    /// Enqueues a request, waiting only while the queue is full.
    ///
    /// # Errors
    ///
    /// Returns [`ShortenerError::Internal`] if the worker has stopped.
    pub async fn submit(&self, request: DeletionRequest) -> Result<(), ShortenerError> {
        self.sender
            .send(request)
            .await
            .map_err(|_| ShortenerError::Internal("deletion worker stopped".to_string()))
    }
}

/// Creates a deletion queue holding at most `capacity` pending requests.
pub fn deletion_queue(capacity: usize) -> (DeletionQueue, mpsc::Receiver<DeletionRequest>) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    (DeletionQueue { sender }, receiver)
}

/// Consumes deletion requests until every sender is dropped.
///
/// Requests already waiting in the queue are coalesced into one flush.
pub async fn run_deletion_worker<R>(mut rx: mpsc::Receiver<DeletionRequest>, repository: Arc<R>)
where
    R: UrlRepository + ?Sized,
{
    while let Some(first) = rx.recv().await {
        let mut requests = vec![first];
        while let Ok(next) = rx.try_recv() {
            requests.push(next);
        }

        let mut queued = 0usize;
        for request in requests {
            for alias in request.aliases {
                let deletion = PendingDeletion::new(alias, request.owner_id.as_str());
                match repository.buffer_delete(deletion).await {
                    Ok(()) => queued += 1,
                    Err(e) => error!(owner = %request.owner_id, error = %e, "Failed to queue deletion"),
                }
            }
        }

        if queued == 0 {
            continue;
        }

        match repository.flush_deletes().await {
            Ok(()) => debug!(deletions = queued, "Deletions flushed"),
            Err(e) => error!(deletions = queued, error = %e, "Failed to flush deletions"),
        }
    }

    info!("Deletion worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockUrlRepository;

    fn request(owner: &str, aliases: &[&str]) -> DeletionRequest {
        DeletionRequest {
            owner_id: owner.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_waiting_requests_are_coalesced() {
        let mut mock = MockUrlRepository::new();
        mock.expect_buffer_delete().times(3).returning(|_| Ok(()));
        mock.expect_flush_deletes().times(1).returning(|| Ok(()));

        let (queue, rx) = deletion_queue(8);
        queue.submit(request("u1", &["a", "b"])).await.unwrap();
        queue.submit(request("u2", &["c"])).await.unwrap();
        drop(queue);

        run_deletion_worker(rx, Arc::new(mock)).await;
    }

    #[tokio::test]
    async fn test_failures_are_swallowed() {
        let mut mock = MockUrlRepository::new();
        mock.expect_buffer_delete()
            .times(1)
            .returning(|_| Ok(()));
        mock.expect_flush_deletes()
            .times(1)
            .returning(|| Err(ShortenerError::Unavailable("down".to_string())));

        let (queue, rx) = deletion_queue(8);
        queue.submit(request("u1", &["a"])).await.unwrap();
        drop(queue);

        run_deletion_worker(rx, Arc::new(mock)).await;
    }

    #[tokio::test]
    async fn test_no_flush_when_nothing_queued() {
        let mut mock = MockUrlRepository::new();
        mock.expect_buffer_delete()
            .times(1)
            .returning(|_| Err(ShortenerError::NotImplemented("buffer_delete")));
        mock.expect_flush_deletes().never();

        let (queue, rx) = deletion_queue(8);
        queue.submit(request("u1", &["a"])).await.unwrap();
        drop(queue);

        run_deletion_worker(rx, Arc::new(mock)).await;
    }

    #[tokio::test]
    async fn test_submit_after_worker_stopped_fails() {
        let (queue, rx) = deletion_queue(1);
        drop(rx);

        let result = queue.submit(request("u1", &["a"])).await;
        assert!(matches!(result, Err(ShortenerError::Internal(_))));
    }
}
