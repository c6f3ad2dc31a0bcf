//! Real-time status broadcaster
//!
//! Owns the set of live subscribers and pushes full status snapshots to them,
//! on a fixed cadence and on demand. Every subscriber has its own bounded
//! queue; a slow or dead subscriber never delays the others.

use crate::aggregator::Aggregator;
use crate::core_types::StreamEvent;
use crate::logging::{log_debug, log_error, log_info, log_warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Messages a subscriber may fall behind before it starts skipping
const SUBSCRIBER_QUEUE_CAPACITY: usize = 16;

/// Lifecycle of one subscriber connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriberState {
    /// Upgraded, initial snapshot not yet queued
    Connecting,
    /// Receives every broadcast
    Open,
    /// Removed from the active set
    Closed,
}

/// Outcome of a single send attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    Sent,
    Skipped,
    Closed,
}

fn deliver(sender: &mpsc::Sender<Arc<str>>, message: &Arc<str>) -> Delivery {
    match sender.try_send(Arc::clone(message)) {
        Ok(()) => Delivery::Sent,
        Err(mpsc::error::TrySendError::Full(_)) => Delivery::Skipped,
        Err(mpsc::error::TrySendError::Closed(_)) => Delivery::Closed,
    }
}

/// Owned set of open subscribers
#[derive(Default)]
pub struct SubscriberRegistry {
    senders: Mutex<HashMap<Uuid, mpsc::Sender<Arc<str>>>>,
}

impl SubscriberRegistry {
    // A poisoned lock only means another thread panicked mid-insert or
    // mid-remove; the map itself is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, mpsc::Sender<Arc<str>>>> {
        self.senders
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.lock().contains_key(id)
    }

    /// Register a subscriber with its initial message already queued
    fn open(&self, initial: Option<Arc<str>>) -> (Uuid, mpsc::Receiver<Arc<str>>) {
        let (sender, receiver) = mpsc::channel(SUBSCRIBER_QUEUE_CAPACITY);
        let id = Uuid::new_v4();

        let mut senders = self.lock();
        // Queued under the lock so no broadcast can overtake it.
        if let Some(initial) = &initial {
            let _ = deliver(&sender, initial);
        }
        senders.insert(id, sender);

        (id, receiver)
    }

    fn remove(&self, id: &Uuid) -> bool {
        self.lock().remove(id).is_some()
    }

    fn sender(&self, id: &Uuid) -> Option<mpsc::Sender<Arc<str>>> {
        self.lock().get(id).cloned()
    }

    /// Send one message to every subscriber; returns how many received it
    fn fan_out(&self, message: &Arc<str>) -> usize {
        let targets: Vec<(Uuid, mpsc::Sender<Arc<str>>)> = self
            .lock()
            .iter()
            .map(|(id, sender)| (*id, sender.clone()))
            .collect();

        let mut delivered = 0;
        let mut closed = Vec::new();
        for (id, sender) in &targets {
            match deliver(sender, message) {
                Delivery::Sent => delivered += 1,
                Delivery::Skipped => {
                    log_debug!(subscriber = %id, "Subscriber queue full, skipping message")
                }
                Delivery::Closed => closed.push(*id),
            }
        }

        if !closed.is_empty() {
            let mut senders = self.lock();
            for id in &closed {
                senders.remove(id);
            }
            log_debug!(removed = closed.len(), "Removed closed subscribers");
        }

        delivered
    }
}

/// A connected subscriber's end of the broadcast
///
/// Dropping it closes the subscription and removes it from the registry.
pub struct Subscription {
    id: Uuid,
    state: SubscriberState,
    receiver: mpsc::Receiver<Arc<str>>,
    registry: Arc<SubscriberRegistry>,
}

impl Subscription {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SubscriberState {
        self.state
    }

    /// Next serialized event, or `None` once closed
    pub async fn recv(&mut self) -> Option<Arc<str>> {
        if self.state == SubscriberState::Closed {
            return None;
        }
        let message = self.receiver.recv().await;
        if message.is_none() {
            self.close();
        }
        message
    }

    pub fn close(&mut self) {
        if self.state != SubscriberState::Closed {
            self.state = SubscriberState::Closed;
            self.receiver.close();
            if self.registry.remove(&self.id) {
                log_debug!(subscriber = %self.id, "Subscriber closed");
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.close();
    }
}

/// Pushes status snapshots to every open subscriber
pub struct Broadcaster {
    aggregator: Arc<Aggregator>,
    registry: Arc<SubscriberRegistry>,
    interval: Duration,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Broadcaster {
    pub fn new(aggregator: Arc<Aggregator>, interval: Duration) -> Self {
        Self {
            aggregator,
            registry: Arc::new(SubscriberRegistry::default()),
            interval,
            cancel: CancellationToken::new(),
            task: Mutex::new(None),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }

    pub fn registry(&self) -> &Arc<SubscriberRegistry> {
        &self.registry
    }

    /// Accept a new subscriber
    ///
    /// The returned subscription already holds one full snapshot, queued
    /// ahead of any later broadcast.
    pub async fn subscribe(&self) -> Subscription {
        log_debug!(state = ?SubscriberState::Connecting, "Subscriber connecting");

        let snapshot = self.aggregator.aggregated_status().await;
        let (id, receiver) = self
            .registry
            .open(encode(&StreamEvent::Status(snapshot)));

        log_info!(
            subscriber = %id,
            subscribers = self.registry.len(),
            "Subscriber connected"
        );

        Subscription {
            id,
            state: SubscriberState::Open,
            receiver,
            registry: Arc::clone(&self.registry),
        }
    }

    /// Serialize once and fan out; returns the number of deliveries
    pub fn broadcast(&self, event: &StreamEvent) -> usize {
        match encode(event) {
            Some(message) => self.registry.fan_out(&message),
            None => 0,
        }
    }

    /// Compute a fresh snapshot and push it to everyone
    ///
    /// Skipped entirely when nobody is listening.
    pub async fn broadcast_status(&self) -> usize {
        publish_status(&self.aggregator, &self.registry).await
    }

    /// Answer one subscriber's status pull
    pub async fn send_status_to(&self, id: Uuid) -> bool {
        let Some(sender) = self.registry.sender(&id) else {
            return false;
        };

        let snapshot = self.aggregator.aggregated_status().await;
        let Some(message) = encode(&StreamEvent::Status(snapshot)) else {
            return false;
        };

        match deliver(&sender, &message) {
            Delivery::Sent => true,
            Delivery::Skipped => false,
            Delivery::Closed => {
                self.registry.remove(&id);
                false
            }
        }
    }

    /// Start the periodic broadcast task; a second call is a no-op
    pub fn start(&self) {
        let mut task = self.task.lock().unwrap_or_else(|p| p.into_inner());
        if task.is_some() {
            return;
        }

        let aggregator = Arc::clone(&self.aggregator);
        let registry = Arc::clone(&self.registry);
        let cancel = self.cancel.clone();
        let period = self.interval;

        *task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; subscribers already got
            // their snapshot on connect.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        publish_status(&aggregator, &registry).await;
                    }
                }
            }
            log_debug!("Status broadcast task stopped");
        }));

        log_info!(
            interval_secs = self.interval.as_secs(),
            "Status broadcaster started"
        );
    }

    /// Stop the periodic task and wait for it to finish
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let handle = self
            .task
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                log_error!(error = %e, "Status broadcast task failed");
            }
        }
        log_info!("Status broadcaster stopped");
    }
}

async fn publish_status(aggregator: &Aggregator, registry: &SubscriberRegistry) -> usize {
    if registry.is_empty() {
        return 0;
    }
    let snapshot = aggregator.aggregated_status().await;
    match encode(&StreamEvent::Status(snapshot)) {
        Some(message) => {
            let delivered = registry.fan_out(&message);
            log_debug!(delivered, "Status snapshot broadcast");
            delivered
        }
        None => 0,
    }
}

fn encode(event: &StreamEvent) -> Option<Arc<str>> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Arc::from(json)),
        Err(e) => {
            log_warn!(error = %e, "Failed to serialize stream event");
            None
        }
    }
}
