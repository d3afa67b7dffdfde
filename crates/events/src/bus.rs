//! Event publishing/subscription abstraction (mechanics only).
//!
//! Buses here are for **distribution**, not storage: the document store is the
//! source of truth and a missed notification is repaired by the next one,
//! because listeners always re-read current state.
//!
//! Delivery is broadcast and lossy under pressure. A subscriber that falls
//! behind the bus capacity receives [`RecvError::Lagged`] and should treat it
//! like any other "something changed" signal.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::broadcast;

/// Why a subscription could not yield a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RecvError {
    /// The bus was dropped; no more messages will arrive.
    #[error("event bus closed")]
    Closed,

    /// The subscriber fell behind and `n` messages were skipped.
    #[error("subscriber lagged by {0} messages")]
    Lagged(u64),
}

type Filter<M> = Box<dyn Fn(&M) -> bool + Send + Sync>;

/// A subscription to an event stream.
///
/// Each subscription gets a copy of every message published after it was
/// created (broadcast semantics), optionally narrowed by a filter.
///
/// ```ignore
/// let mut sub = bus.subscribe();
/// loop {
///     match sub.recv().await {
///         Ok(event) => refresh(event).await,
///         Err(RecvError::Lagged(_)) => refresh_all().await,
///         Err(RecvError::Closed) => break,
///     }
/// }
/// ```
pub struct Subscription<M> {
    receiver: broadcast::Receiver<M>,
    filter: Option<Filter<M>>,
}

impl<M> core::fmt::Debug for Subscription<M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Subscription")
            .field("filtered", &self.filter.is_some())
            .finish()
    }
}

impl<M: Clone> Subscription<M> {
    pub fn new(receiver: broadcast::Receiver<M>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only yield messages for which `predicate` returns true.
    pub fn filtered(mut self, predicate: impl Fn(&M) -> bool + Send + Sync + 'static) -> Self {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, message: &M) -> bool {
        self.filter.as_ref().map(|f| f(message)).unwrap_or(true)
    }

    /// Wait until the next accepted message is available.
    pub async fn recv(&mut self) -> Result<M, RecvError> {
        loop {
            match self.receiver.recv().await {
                Ok(message) if self.accepts(&message) => return Ok(message),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Closed) => return Err(RecvError::Closed),
                Err(broadcast::error::RecvError::Lagged(n)) => return Err(RecvError::Lagged(n)),
            }
        }
    }

    /// Try to receive an accepted message without waiting.
    ///
    /// Returns `Ok(None)` when nothing is pending.
    pub fn try_recv(&mut self) -> Result<Option<M>, RecvError> {
        loop {
            match self.receiver.try_recv() {
                Ok(message) if self.accepts(&message) => return Ok(Some(message)),
                Ok(_) => continue,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => return Err(RecvError::Closed),
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Err(RecvError::Lagged(n));
                }
            }
        }
    }
}

/// Transport-agnostic publish/subscribe contract.
///
/// `publish` reports transport failures only; having no subscribers is not an
/// error.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
