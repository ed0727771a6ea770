//! # Broadcast Hub
//!
//! In-process fan-out over `tokio::sync::broadcast`. Every subscriber gets
//! its own receiver buffering up to `capacity` events; a subscriber that
//! falls further behind skips the overwritten events. There is no replay:
//! a subscription only sees events published after it was created.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::events::{HubEvent, TopicFilter};
use crate::traits::EventHub;

/// Buffered events per subscriber before lagging ones start skipping.
pub const DEFAULT_HUB_CAPACITY: usize = 256;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    #[error("hub closed")]
    Closed,
}

pub struct BroadcastHub {
    sender: broadcast::Sender<HubEvent>,
    active: Arc<AtomicUsize>,
    published: AtomicU64,
    capacity: usize,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HUB_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            active: Arc::new(AtomicUsize::new(0)),
            published: AtomicU64::new(0),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total events handed to [`EventHub::publish`], delivered or not.
    pub fn events_published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHub for BroadcastHub {
    fn publish(&self, event: HubEvent) -> usize {
        let topic = event.topic();
        self.published.fetch_add(1, Ordering::Relaxed);

        match self.sender.send(event) {
            Ok(receivers) => {
                debug!(target: "qa::delivery", %topic, receivers, "event published");
                receivers
            }
            Err(_) => {
                debug!(target: "qa::delivery", %topic, "event published with no subscribers");
                0
            }
        }
    }

    fn subscribe(&self, filter: TopicFilter) -> Subscription {
        let receiver = self.sender.subscribe();
        self.active.fetch_add(1, Ordering::SeqCst);
        debug!(target: "qa::delivery", topics = ?filter.as_slice(), "subscription opened");
        Subscription {
            receiver,
            filter,
            active: self.active.clone(),
        }
    }

    fn subscriber_count(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

/// A live subscription. Dropping it unsubscribes.
pub struct Subscription {
    receiver: broadcast::Receiver<HubEvent>,
    filter: TopicFilter,
    active: Arc<AtomicUsize>,
}

impl Subscription {
    /// Waits for the next event on one of the subscribed topics.
    /// Returns `None` once the hub is gone.
    pub async fn recv(&mut self) -> Option<HubEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.filter.matches(&event) => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(target: "qa::delivery", skipped, "subscriber lagged, events dropped");
                }
            }
        }
    }

    /// Non-blocking variant of [`recv`](Self::recv).
    pub fn try_recv(&mut self) -> Result<Option<HubEvent>, SubscriptionError> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.filter.matches(&event) => return Ok(Some(event)),
                Ok(_) => continue,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(target: "qa::delivery", skipped, "subscriber lagged, events dropped");
                }
            }
        }
    }

    pub fn filter(&self) -> &TopicFilter {
        &self.filter
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
        debug!(target: "qa::delivery", topics = ?self.filter.as_slice(), "subscription released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Topic, VoteUpdate};
    use crate::votes::VoteSets;

    fn vote(qid: &str) -> HubEvent {
        HubEvent::VoteUpdate(VoteUpdate::new(qid, VoteSets::default()))
    }

    #[tokio::test]
    async fn publish_without_subscribers_reaches_nobody() {
        let hub = BroadcastHub::new();
        assert_eq!(hub.publish(vote("Q1")), 0);
        assert_eq!(hub.events_published(), 1);
    }

    #[tokio::test]
    async fn every_subscriber_receives_every_event() {
        let hub = BroadcastHub::with_capacity(8);
        let mut a = hub.subscribe(TopicFilter::all());
        let mut b = hub.subscribe(TopicFilter::all());

        assert_eq!(hub.publish(vote("Q1")), 2);
        assert_eq!(a.recv().await, Some(vote("Q1")));
        assert_eq!(b.recv().await, Some(vote("Q1")));
    }

    #[tokio::test]
    async fn late_subscriber_sees_no_replay() {
        let hub = BroadcastHub::new();
        let _early = hub.subscribe(TopicFilter::all());
        hub.publish(vote("Q1"));

        let mut late = hub.subscribe(TopicFilter::all());
        assert_eq!(late.try_recv(), Ok(None));
    }

    #[tokio::test]
    async fn topic_filter_skips_other_topics() {
        let hub = BroadcastHub::new();
        let mut views_only = hub.subscribe(TopicFilter::topics([Topic::ViewsUpdate]));
        hub.publish(vote("Q1"));
        assert_eq!(views_only.try_recv(), Ok(None));
    }

    #[tokio::test]
    async fn dropping_subscription_releases_it() {
        let hub = BroadcastHub::new();
        let sub = hub.subscribe(TopicFilter::all());
        assert_eq!(hub.subscriber_count(), 1);
        drop(sub);
        assert_eq!(hub.subscriber_count(), 0);
        assert_eq!(hub.publish(vote("Q1")), 0);
    }

    #[tokio::test]
    async fn lagging_subscriber_skips_overwritten_events() {
        let hub = BroadcastHub::with_capacity(2);
        let mut slow = hub.subscribe(TopicFilter::all());
        for qid in ["Q1", "Q2", "Q3", "Q4"] {
            hub.publish(vote(qid));
        }
        assert_eq!(slow.recv().await, Some(vote("Q3")));
        assert_eq!(slow.recv().await, Some(vote("Q4")));
    }

    #[tokio::test]
    async fn recv_ends_when_hub_is_dropped() {
        let hub = BroadcastHub::new();
        let mut sub = hub.subscribe(TopicFilter::all());
        drop(hub);
        assert_eq!(sub.recv().await, None);
    }
}
