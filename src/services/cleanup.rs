use crate::services::image_store::{DeleteOutcome, ImageStore};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Ephemeral instruction to delete hosted images. Never persisted,
/// consumed at most once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CleanupEvent {
    Single(String),
    Batch(Vec<String>),
}

impl CleanupEvent {
    pub fn into_urls(self) -> Vec<String> {
        match self {
            CleanupEvent::Single(url) => vec![url],
            CleanupEvent::Batch(urls) => urls,
        }
    }
}

/// Sender half of the cleanup channel, held by the resource services.
#[derive(Clone)]
pub struct CleanupQueue {
    tx: mpsc::UnboundedSender<CleanupEvent>,
}

impl CleanupQueue {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<CleanupEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Fire-and-forget: if the worker is gone the orphaned objects stay
    /// in storage, which the contract allows.
    pub fn publish(&self, event: CleanupEvent) {
        if self.tx.send(event).is_err() {
            tracing::warn!("cleanup queue closed, dropping event");
        }
    }

    pub fn publish_urls(&self, mut urls: Vec<String>) {
        match urls.len() {
            0 => {}
            1 => self.publish(CleanupEvent::Single(urls.remove(0))),
            _ => self.publish(CleanupEvent::Batch(urls)),
        }
    }
}

/// Drains cleanup events off the request path and deletes the hosted
/// objects. Failures are logged and swallowed, never retried.
pub struct CleanupWorker {
    store: Arc<dyn ImageStore>,
    events: mpsc::UnboundedReceiver<CleanupEvent>,
    shutdown: watch::Receiver<bool>,
}

impl CleanupWorker {
    pub fn new(
        store: Arc<dyn ImageStore>,
        events: mpsc::UnboundedReceiver<CleanupEvent>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            store,
            events,
            shutdown,
        }
    }

    pub async fn run(mut self) {
        tracing::info!("🧹 Cleanup worker started");

        loop {
            tokio::select! {
                _ = self.shutdown.changed() => {
                    break;
                }
                event = self.events.recv() => {
                    match event {
                        Some(event) => {
                            let store = self.store.clone();
                            Self::delete_all(store.as_ref(), event.into_urls()).await;
                        }
                        None => break,
                    }
                }
            }
        }

        tracing::info!("🛑 Cleanup worker shutting down");
    }

    async fn delete_all(store: &dyn ImageStore, urls: Vec<String>) {
        join_all(urls.into_iter().map(|url| async move {
            match store.delete(&url).await {
                Ok(DeleteOutcome::Deleted) => {
                    tracing::debug!("Deleted hosted image: {}", url);
                }
                Ok(DeleteOutcome::NotFound) => {
                    tracing::warn!("Hosted image not found while deleting: {}", url);
                }
                Err(e) => {
                    tracing::warn!("Failed to delete hosted image {}: {:#}", url, e);
                }
            }
        }))
        .await;
    }
}
