use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use crate::types::geo::PositionFix;

pub type FixCallback = Box<dyn Fn(PositionFix) + Send + Sync>;

/// Push-based location feed. The engine never polls.
pub trait PositionSource: Send + Sync {
    fn subscribe(&self, callback: FixCallback) -> Subscription;
}

/// Detaches its callback when dropped or when [`Subscription::unsubscribe`] is called.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// In-process source that fans each published fix out to every subscriber.
#[derive(Clone, Default)]
pub struct BroadcastSource {
    subscribers: Arc<DashMap<u64, FixCallback>>,
    next_id: Arc<AtomicU64>,
}

impl BroadcastSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how many subscribers received the fix.
    pub fn publish(&self, fix: PositionFix) -> usize {
        let mut delivered = 0;
        for entry in self.subscribers.iter() {
            (entry.value())(fix);
            delivered += 1;
        }
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl PositionSource for BroadcastSource {
    fn subscribe(&self, callback: FixCallback) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.insert(id, callback);
        let subscribers = Arc::clone(&self.subscribers);
        Subscription::new(move || {
            subscribers.remove(&id);
        })
    }
}
