use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::trace;

/// Bounded broadcast channel for fleet-wide messages.
/// `T` must be `Send + Sync` because subscribers run on other worker threads.
#[derive(Debug, Clone)]
pub struct Topic<T> {
    name: &'static str,
    tx: broadcast::Sender<Arc<T>>,
}

impl<T: Send + Sync + 'static> Topic<T> {
    pub fn new(name: &'static str, capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { name, tx }
    }

    /// Publish to every current subscriber. Returns how many received it.
    pub fn publish(&self, msg: T) -> usize {
        match self.tx.send(Arc::new(msg)) {
            Ok(receivers) => receivers,
            Err(_) => {
                trace!(topic = self.name, "No subscribers, message dropped");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<T>> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_subscribers() {
        let topic: Topic<u32> = Topic::new("test", 4);
        assert_eq!(topic.publish(1), 0);

        let mut rx = topic.subscribe();
        assert_eq!(topic.publish(2), 1);
        assert_eq!(*rx.recv().await.unwrap(), 2);
    }
}
