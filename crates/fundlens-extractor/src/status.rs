//! Per-user processing status registry
//!
//! A single tokio task owns the subscriber map; every handle talks to it
//! over a command channel, so there is exactly one writer. The registry
//! lives as long as its task: create it with [`StatusRegistry::spawn`] and
//! stop it with [`StatusRegistry::shutdown`].
//!
//! ```text
//! handle ──Command──► registry task ──StatusEvent──► subscribers (per user)
//! ```

use crate::error::ExtractorError;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

const COMMAND_BUFFER: usize = 64;

/// Progress event for one document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StatusEvent {
    /// Processing began
    Started {
        /// Document being processed
        document_id: String,
        /// Input length in characters
        content_chars: usize,
    },
    /// The document was chunked
    Chunked {
        /// Document being processed
        document_id: String,
        /// Number of chunks produced
        total_chunks: usize,
    },
    /// Field extraction finished
    Extracted {
        /// Document being processed
        document_id: String,
        /// Fields with a value
        fields_found: usize,
        /// Fields attempted
        fields_total: usize,
    },
    /// Validation finished
    Validated {
        /// Document being processed
        document_id: String,
        /// Number of validation errors
        errors: usize,
        /// Number of validation warnings
        warnings: usize,
    },
    /// Processing finished
    Completed {
        /// Document being processed
        document_id: String,
        /// Overall confidence score
        overall_confidence: f64,
    },
}

/// Identifies one subscription of one user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Receiving end of a subscription
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    receiver: mpsc::UnboundedReceiver<StatusEvent>,
}

impl Subscription {
    /// Subscription id, used to unsubscribe
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Wait for the next event; `None` once unsubscribed or shut down
    pub async fn recv(&mut self) -> Option<StatusEvent> {
        self.receiver.recv().await
    }

    /// Take an event if one is queued
    pub fn try_recv(&mut self) -> Option<StatusEvent> {
        self.receiver.try_recv().ok()
    }
}

enum Command {
    Subscribe {
        user: String,
        reply: oneshot::Sender<Subscription>,
    },
    Unsubscribe {
        user: String,
        id: SubscriptionId,
        reply: oneshot::Sender<bool>,
    },
    Publish {
        user: String,
        event: StatusEvent,
        reply: oneshot::Sender<usize>,
    },
    Count {
        user: String,
        reply: oneshot::Sender<usize>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Handle to the registry task
#[derive(Debug, Clone)]
pub struct StatusRegistry {
    commands: mpsc::Sender<Command>,
}

impl StatusRegistry {
    /// Start the registry task on the current tokio runtime
    pub fn spawn() -> Self {
        let (commands, rx) = mpsc::channel(COMMAND_BUFFER);
        tokio::spawn(run(rx));
        info!("Status registry started");
        Self { commands }
    }

    /// Subscribe to a user's events
    pub async fn subscribe(&self, user: impl Into<String>) -> Result<Subscription, ExtractorError> {
        let user = user.into();
        self.request(|reply| Command::Subscribe { user, reply }).await
    }

    /// Remove one subscription; returns false if it did not exist
    pub async fn unsubscribe(&self, user: &str, id: SubscriptionId) -> Result<bool, ExtractorError> {
        let user = user.to_string();
        self.request(|reply| Command::Unsubscribe { user, id, reply })
            .await
    }

    /// Deliver an event to every live subscriber of a user
    ///
    /// Returns the number of subscribers reached. Subscribers whose receiver
    /// was dropped are removed.
    pub async fn publish(&self, user: &str, event: StatusEvent) -> Result<usize, ExtractorError> {
        let user = user.to_string();
        self.request(|reply| Command::Publish { user, event, reply })
            .await
    }

    /// Number of subscribers a user has
    pub async fn subscriber_count(&self, user: &str) -> Result<usize, ExtractorError> {
        let user = user.to_string();
        self.request(|reply| Command::Count { user, reply }).await
    }

    /// Stop the registry task and close every subscription
    pub async fn shutdown(&self) -> Result<(), ExtractorError> {
        self.request(|reply| Command::Shutdown { reply }).await
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, ExtractorError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| ExtractorError::StatusClosed)?;
        response.await.map_err(|_| ExtractorError::StatusClosed)
    }
}

type Subscribers = HashMap<String, Vec<(SubscriptionId, mpsc::UnboundedSender<StatusEvent>)>>;

async fn run(mut rx: mpsc::Receiver<Command>) {
    let mut subscribers: Subscribers = HashMap::new();
    let mut next_id = 0u64;

    while let Some(command) = rx.recv().await {
        match command {
            Command::Subscribe { user, reply } => {
                next_id += 1;
                let id = SubscriptionId(next_id);
                let (tx, receiver) = mpsc::unbounded_channel();
                debug!(user = %user, id = %id, "Subscribed");
                subscribers.entry(user).or_default().push((id, tx));
                let _ = reply.send(Subscription { id, receiver });
            }
            Command::Unsubscribe { user, id, reply } => {
                let removed = match subscribers.get_mut(&user) {
                    Some(list) => {
                        let before = list.len();
                        list.retain(|(sub, _)| *sub != id);
                        before != list.len()
                    }
                    None => false,
                };
                prune_empty(&mut subscribers, &user);
                debug!(user = %user, id = %id, removed, "Unsubscribed");
                let _ = reply.send(removed);
            }
            Command::Publish { user, event, reply } => {
                let delivered = match subscribers.get_mut(&user) {
                    Some(list) => {
                        list.retain(|(_, tx)| tx.send(event.clone()).is_ok());
                        list.len()
                    }
                    None => 0,
                };
                prune_empty(&mut subscribers, &user);
                let _ = reply.send(delivered);
            }
            Command::Count { user, reply } => {
                let _ = reply.send(subscribers.get(&user).map_or(0, Vec::len));
            }
            Command::Shutdown { reply } => {
                subscribers.clear();
                let _ = reply.send(());
                break;
            }
        }
    }

    info!("Status registry stopped");
}

fn prune_empty(subscribers: &mut Subscribers, user: &str) {
    if subscribers.get(user).is_some_and(Vec::is_empty) {
        subscribers.remove(user);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(id: &str) -> StatusEvent {
        StatusEvent::Started {
            document_id: id.to_string(),
            content_chars: 10,
        }
    }

    #[tokio::test]
    async fn test_subscribe_and_publish() {
        let registry = StatusRegistry::spawn();
        let mut sub = registry.subscribe("alice").await.unwrap();

        let delivered = registry.publish("alice", started("doc-1")).await.unwrap();
        assert_eq!(delivered, 1);
        assert_eq!(sub.recv().await, Some(started("doc-1")));
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let registry = StatusRegistry::spawn();
        let mut alice = registry.subscribe("alice").await.unwrap();
        let _bob = registry.subscribe("bob").await.unwrap();

        registry.publish("bob", started("doc-2")).await.unwrap();
        assert_eq!(registry.publish("carol", started("doc-3")).await.unwrap(), 0);
        assert!(alice.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_unsubscribe() {
        let registry = StatusRegistry::spawn();
        let first = registry.subscribe("alice").await.unwrap();
        let second = registry.subscribe("alice").await.unwrap();
        assert_ne!(first.id(), second.id());
        assert_eq!(registry.subscriber_count("alice").await.unwrap(), 2);

        assert!(registry.unsubscribe("alice", first.id()).await.unwrap());
        assert!(!registry.unsubscribe("alice", first.id()).await.unwrap());
        assert_eq!(registry.subscriber_count("alice").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_dropped_subscribers_are_pruned() {
        let registry = StatusRegistry::spawn();
        let sub = registry.subscribe("alice").await.unwrap();
        drop(sub);

        assert_eq!(registry.publish("alice", started("doc-1")).await.unwrap(), 0);
        assert_eq!(registry.subscriber_count("alice").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_closes_everything() {
        let registry = StatusRegistry::spawn();
        let mut sub = registry.subscribe("alice").await.unwrap();

        registry.shutdown().await.unwrap();
        assert_eq!(sub.recv().await, None);
        assert!(matches!(
            registry.subscribe("alice").await,
            Err(ExtractorError::StatusClosed)
        ));
    }

    #[test]
    fn test_event_json_is_tagged() {
        let json = serde_json::to_value(StatusEvent::Chunked {
            document_id: "doc-1".to_string(),
            total_chunks: 4,
        })
        .unwrap();
        assert_eq!(json["type"], "chunked");
        assert_eq!(json["total_chunks"], 4);
    }
}
