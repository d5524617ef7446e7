//! In-process publish/subscribe registry.
//!
//! Events for one identifier coalesce per subscriber: while an event for a
//! uri is still queued, publishing that uri again does not queue another.

use log::debug;
use std::collections::BTreeSet;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

/// Invalidation signal for data under `uri`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Identifier passed to [`ChangeNotifier::publish`].
    pub uri: String,
}

type Pending = Arc<Mutex<BTreeSet<String>>>;

struct Registration {
    id: u64,
    uri: String,
    sender: Sender<ChangeEvent>,
    pending: Pending,
}

impl Registration {
    /// Queues `uri` unless an event for it is still waiting. False when the
    /// receiver is gone.
    fn offer(&self, uri: &str) -> bool {
        let mut pending = lock(&self.pending);
        if pending.contains(uri) {
            return true;
        }
        let event = ChangeEvent {
            uri: uri.to_string(),
        };
        if self.sender.send(event).is_err() {
            return false;
        }
        pending.insert(uri.to_string());
        true
    }
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    registrations: Vec<Registration>,
}

/// Shared notification channel. Cloning yields a handle to the same registry.
#[derive(Clone, Default)]
pub struct ChangeNotifier {
    registry: Arc<Mutex<Registry>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers interest in `uri` and everything nested under or above it.
    pub fn subscribe(&self, uri: impl Into<String>) -> Subscription {
        let uri = uri.into();
        let (sender, receiver) = mpsc::channel();
        let pending = Pending::default();
        let mut registry = lock(&self.registry);
        let id = registry.next_id;
        registry.next_id += 1;
        registry.registrations.push(Registration {
            id,
            uri: uri.clone(),
            sender,
            pending: Arc::clone(&pending),
        });

        Subscription {
            id,
            uri,
            receiver,
            pending,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Signals every related subscriber; returns how many were signalled.
    ///
    /// A subscriber that still holds an unread event for `uri` counts as
    /// signalled without a second event being queued. Never blocks on
    /// subscriber processing. Registrations whose receiver is gone are
    /// dropped.
    pub fn publish(&self, uri: &str) -> usize {
        let mut registry = lock(&self.registry);
        let mut delivered = 0;

        registry.registrations.retain(|registration| {
            if !is_related(&registration.uri, uri) {
                return true;
            }
            let alive = registration.offer(uri);
            if alive {
                delivered += 1;
            }
            alive
        });

        debug!("event=change_publish module=notify status=ok subscribers={delivered}");
        delivered
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        lock(&self.registry).registrations.len()
    }
}

/// Receiving end of one registration. Dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    uri: String,
    receiver: Receiver<ChangeEvent>,
    pending: Pending,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Next pending event, without waiting.
    pub fn try_next(&self) -> Option<ChangeEvent> {
        let mut pending = lock(&self.pending);
        match self.receiver.try_recv() {
            Ok(event) => {
                pending.remove(&event.uri);
                Some(event)
            }
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Next event, waiting at most `timeout`.
    pub fn next_timeout(&self, timeout: Duration) -> Option<ChangeEvent> {
        match self.receiver.recv_timeout(timeout) {
            Ok(event) => {
                lock(&self.pending).remove(&event.uri);
                Some(event)
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// All pending events, oldest first, at most one per identifier.
    pub fn drain(&self) -> Vec<ChangeEvent> {
        std::iter::from_fn(|| self.try_next()).collect()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry)
                .registrations
                .retain(|registration| registration.id != self.id);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// True when one identifier equals the other or is its `/`-segment ancestor.
fn is_related(subscribed: &str, published: &str) -> bool {
    is_same_or_ancestor(subscribed, published) || is_same_or_ancestor(published, subscribed)
}

fn is_same_or_ancestor(ancestor: &str, uri: &str) -> bool {
    match uri.strip_prefix(ancestor) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{is_related, ChangeNotifier};

    const PETS: &str = "content://com.example.android.pets/pets";

    #[test]
    fn relation_follows_segment_boundaries() {
        assert!(is_related(PETS, PETS));
        assert!(is_related(PETS, &format!("{PETS}/4")));
        assert!(is_related(&format!("{PETS}/4"), PETS));
        assert!(!is_related(&format!("{PETS}/4"), &format!("{PETS}/42")));
        assert!(!is_related(PETS, "content://com.example.android.pets/petsitters"));
    }

    #[test]
    fn collection_subscriber_sees_item_publish() {
        let notifier = ChangeNotifier::new();
        let subscription = notifier.subscribe(PETS);

        assert_eq!(notifier.publish(&format!("{PETS}/3")), 1);
        let event = subscription.try_next().expect("event delivered");
        assert_eq!(event.uri, format!("{PETS}/3"));
        assert!(subscription.try_next().is_none());
    }

    #[test]
    fn sibling_items_do_not_see_each_other() {
        let notifier = ChangeNotifier::new();
        let item_one = notifier.subscribe(format!("{PETS}/1"));

        assert_eq!(notifier.publish(&format!("{PETS}/2")), 0);
        assert!(item_one.drain().is_empty());
    }

    #[test]
    fn publish_without_subscribers_is_dropped() {
        let notifier = ChangeNotifier::new();
        assert_eq!(notifier.publish(PETS), 0);

        let late = notifier.subscribe(PETS);
        assert!(late.try_next().is_none());
    }

    #[test]
    fn repeated_publish_coalesces_until_read() {
        let notifier = ChangeNotifier::new();
        let subscription = notifier.subscribe(PETS);

        for _ in 0..3 {
            assert_eq!(notifier.publish(PETS), 1);
        }
        notifier.publish(&format!("{PETS}/1"));

        let events = subscription.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].uri, PETS);
        assert_eq!(events[1].uri, format!("{PETS}/1"));

        notifier.publish(PETS);
        assert_eq!(subscription.try_next().unwrap().uri, PETS);
        assert!(subscription.try_next().is_none());
    }

    #[test]
    fn coalescing_is_per_subscriber() {
        let notifier = ChangeNotifier::new();
        let busy = notifier.subscribe(PETS);
        let idle = notifier.subscribe(PETS);

        notifier.publish(PETS);
        assert!(idle.try_next().is_some());
        assert_eq!(notifier.publish(PETS), 2);

        assert_eq!(busy.drain().len(), 1);
        assert_eq!(idle.drain().len(), 1);
    }

    #[test]
    fn dropping_subscription_unregisters() {
        let notifier = ChangeNotifier::new();
        let first = notifier.subscribe(PETS);
        let second = notifier.clone().subscribe(PETS);
        assert_eq!(notifier.subscriber_count(), 2);

        drop(first);
        assert_eq!(notifier.subscriber_count(), 1);
        assert_eq!(notifier.publish(PETS), 1);
        assert_eq!(second.drain().len(), 1);
    }
}
