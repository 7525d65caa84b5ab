use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::services::store::{Document, DocumentQuery, DocumentStore, StoreError};

/// Live query over a collection
///
/// A lazy sequence of document sets: the first snapshot arrives right away,
/// later ones only when the result set changes. Dropping the subscription
/// or calling [`Subscription::unsubscribe`] stops the poller.
pub struct Subscription {
    rx: mpsc::Receiver<Result<Vec<Document>, StoreError>>,
    handle: JoinHandle<()>,
}

/// Start polling `query` against `collection` every `interval`
pub fn subscribe(
    store: Arc<dyn DocumentStore>,
    collection: impl Into<String>,
    query: DocumentQuery,
    interval: Duration,
) -> Subscription {
    let collection = collection.into();
    let (tx, rx) = mpsc::channel(8);

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last: Option<Vec<Document>> = None;

        loop {
            ticker.tick().await;

            let item = match store.query(&collection, &query).await {
                Ok(rows) if last.as_ref() == Some(&rows) => continue,
                Ok(rows) => {
                    last = Some(rows.clone());
                    Ok(rows)
                }
                Err(e) => {
                    tracing::warn!("Subscription query on {} failed: {}", collection, e);
                    Err(e)
                }
            };

            if tx.send(item).await.is_err() {
                break;
            }
        }

        tracing::debug!("Subscription on {} stopped", collection);
    });

    Subscription { rx, handle }
}

impl Subscription {
    /// Next changed snapshot, or `None` once the subscription has stopped
    pub async fn next(&mut self) -> Option<Result<Vec<Document>, StoreError>> {
        self.rx.recv().await
    }

    pub fn unsubscribe(self) {
        self.handle.abort();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
