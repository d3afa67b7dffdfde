//! In-memory event bus for single-process deployments and tests.

use std::convert::Infallible;

use tokio::sync::broadcast;

use crate::bus::{EventBus, Subscription};

const DEFAULT_CAPACITY: usize = 256;

/// In-memory pub/sub bus backed by a tokio broadcast channel.
///
/// - No IO
/// - Best-effort fan-out, bounded buffer per subscriber
/// - Slow subscribers observe `Lagged` instead of blocking publishers
#[derive(Debug)]
pub struct InMemoryEventBus<M> {
    sender: broadcast::Sender<M>,
}

impl<M: Clone> InMemoryEventBus<M> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<M: Clone> Default for InMemoryEventBus<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> EventBus<M> for InMemoryEventBus<M>
where
    M: Clone + Send + Sync + 'static,
{
    /// Publishing never fails; a bus with no subscribers drops the message.
    type Error = Infallible;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        // A send error only means nobody is listening right now.
        let _ = self.sender.send(message);
        Ok(())
    }

    fn subscribe(&self) -> Subscription<M> {
        Subscription::new(self.sender.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::RecvError;

    #[test]
    fn publish_without_subscribers_is_ok() {
        let bus: InMemoryEventBus<u32> = InMemoryEventBus::new();
        assert!(bus.publish(1).is_ok());
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn every_subscriber_receives_every_message() {
        let bus: InMemoryEventBus<u32> = InMemoryEventBus::new();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.publish(7).unwrap();
        bus.publish(8).unwrap();

        assert_eq!(a.recv().await.unwrap(), 7);
        assert_eq!(a.recv().await.unwrap(), 8);
        assert_eq!(b.recv().await.unwrap(), 7);
        assert_eq!(b.recv().await.unwrap(), 8);
    }

    #[tokio::test]
    async fn filtered_subscription_skips_rejected_messages() {
        let bus: InMemoryEventBus<u32> = InMemoryEventBus::new();
        let mut evens = bus.subscribe().filtered(|n| n % 2 == 0);

        for n in 1..=4 {
            bus.publish(n).unwrap();
        }

        assert_eq!(evens.recv().await.unwrap(), 2);
        assert_eq!(evens.recv().await.unwrap(), 4);
        assert_eq!(evens.try_recv().unwrap(), None);
    }

    #[tokio::test]
    async fn slow_subscriber_observes_lag() {
        let bus: InMemoryEventBus<u32> = InMemoryEventBus::with_capacity(2);
        let mut sub = bus.subscribe();

        for n in 0..5 {
            bus.publish(n).unwrap();
        }

        match sub.recv().await {
            Err(RecvError::Lagged(n)) => assert!(n > 0),
            other => panic!("expected lag, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn dropping_the_bus_closes_subscriptions() {
        let bus: InMemoryEventBus<u32> = InMemoryEventBus::new();
        let mut sub = bus.subscribe();
        drop(bus);
        assert_eq!(sub.recv().await, Err(RecvError::Closed));
    }
}
