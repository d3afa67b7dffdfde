//! Live queries: re-run a query after every change to its collection.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use aesthetica_core::CatalogEntity;
use aesthetica_events::{Event, RecvError};

use crate::store::{DocumentStore, Query};

use super::{BackendError, GatewayError, GatewayResult, decode_all};

/// Handle to a running live query. Dropping it stops the query.
#[derive(Debug)]
pub struct LiveQuery {
    collection: &'static str,
    task: JoinHandle<()>,
}

/// Live product listing.
pub type ProductSubscription = LiveQuery;

impl LiveQuery {
    pub fn collection(&self) -> &'static str {
        self.collection
    }

    /// False once the query has been stopped or the change feed closed.
    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn unsubscribe(self) {
        debug!(collection = self.collection, "live query unsubscribed");
        // Drop aborts the task.
    }
}

impl Drop for LiveQuery {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Start a live query on the current Tokio runtime.
///
/// The change feed is subscribed before the first snapshot is taken, so no
/// write between the two is missed. The callback runs on a runtime worker and
/// should not block.
pub(crate) fn spawn_live_query<T, F>(
    store: Arc<dyn DocumentStore>,
    query: Query,
    callback: F,
) -> GatewayResult<LiveQuery>
where
    T: CatalogEntity,
    F: FnMut(Vec<T>) + Send + 'static,
{
    let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
        GatewayError::operation(
            format!("failed to subscribe to {}s", T::LABEL),
            BackendError::Task(e.to_string()),
        )
    })?;

    let mut changes = store.watch(T::COLLECTION);
    let mut callback = callback;

    let task = runtime.spawn(async move {
        loop {
            match store.query(T::COLLECTION, &query).await {
                Ok(docs) => callback(decode_all::<T>(T::COLLECTION, docs)),
                Err(e) => error!(collection = T::COLLECTION, error = %e, "live query refresh failed"),
            }

            match changes.recv().await {
                Ok(change) => debug!(
                    event = %change.event_type(),
                    document_id = %change.document_id(),
                    "live query refresh"
                ),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(collection = T::COLLECTION, skipped, "live query lagged behind change feed");
                }
                Err(RecvError::Closed) => {
                    debug!(collection = T::COLLECTION, "change feed closed");
                    break;
                }
            }
        }
    });

    debug!(collection = T::COLLECTION, "live query started");
    Ok(LiveQuery {
        collection: T::COLLECTION,
        task,
    })
}
