//! `EventBus` — in-process publish/subscribe with priority-ordered,
//! exception-isolated dispatch.
//!
//! Grounded directly in the reference implementation's `eventbus/bus.py`:
//! per-type and global subscriber lists, priority-descending dispatch,
//! lazy removal of cancelled subscriptions, and a handler failure never
//! blocking the rest of that emit's fan-out.

use crate::priority::EventPriority;
use crate::subscription::Subscription;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use voice_agent_core::OutputEvent;

/// A subscribed handler. Returns a future so it can suspend (match the
/// "handlers may suspend" concurrency contract); any `Err` is treated as
/// the handler having failed and is logged, not propagated.
pub type HandlerFn =
    Arc<dyn Fn(OutputEvent) -> BoxFuture<'static, Result<(), String>> + Send + Sync>;

struct Entry {
    subscription: Arc<Subscription>,
    handler: HandlerFn,
}

#[derive(Default)]
struct Inner {
    by_type: HashMap<String, Vec<Entry>>,
    global: Vec<Entry>,
    next_id: u64,
}

/// Dispatch is single-threaded per `emit` call and requires the caller not
/// re-enter `emit` on the same bus from within a handler running on the
/// same task — the bus itself holds no re-entrant lock, only a plain mutex
/// guarding subscription bookkeeping between emits.
pub struct EventBus {
    inner: Mutex<Inner>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn subscribe(
        &self,
        event_type: impl Into<String>,
        handler: HandlerFn,
        priority: EventPriority,
    ) -> Arc<Subscription> {
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        let event_type = event_type.into();
        let subscription = Arc::new(Subscription::new(id, Some(event_type.clone()), priority));
        let entry = Entry {
            subscription: subscription.clone(),
            handler,
        };
        let list = inner.by_type.entry(event_type).or_default();
        list.push(entry);
        list.sort_by(|a, b| b.subscription.priority.cmp(&a.subscription.priority));
        subscription
    }

    pub fn subscribe_all(&self, handler: HandlerFn, priority: EventPriority) -> Arc<Subscription> {
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        let subscription = Arc::new(Subscription::new(id, None, priority));
        inner.global.push(Entry {
            subscription: subscription.clone(),
            handler,
        });
        inner
            .global
            .sort_by(|a, b| b.subscription.priority.cmp(&a.subscription.priority));
        subscription
    }

    /// Marks `subscription` inactive and physically removes it. Returns
    /// `false` if it was already gone.
    pub fn unsubscribe(&self, subscription: &Arc<Subscription>) -> bool {
        subscription.deactivate();
        let mut inner = self.inner.lock();
        if subscription.is_global() {
            let before = inner.global.len();
            inner
                .global
                .retain(|e| !Arc::ptr_eq(&e.subscription, subscription));
            inner.global.len() != before
        } else {
            let key = subscription.event_type.as_deref().unwrap_or_default();
            if let Some(list) = inner.by_type.get_mut(key) {
                let before = list.len();
                list.retain(|e| !Arc::ptr_eq(&e.subscription, subscription));
                list.len() != before
            } else {
                false
            }
        }
    }

    /// Marks every subscription for `event_type` inactive and drops the
    /// whole list. Returns the count removed.
    pub fn unsubscribe_by_type(&self, event_type: &str) -> usize {
        let mut inner = self.inner.lock();
        match inner.by_type.remove(event_type) {
            Some(list) => {
                for entry in &list {
                    entry.subscription.deactivate();
                }
                list.len()
            }
            None => 0,
        }
    }

    /// Dispatches `event` to every active per-type subscriber in descending
    /// priority order, then to every active global subscriber. A failing
    /// handler is logged and does not stop later handlers from running.
    /// Returns the number of handlers that completed without error.
    pub async fn emit(&self, event: OutputEvent) -> usize {
        let type_entries = {
            let inner = self.inner.lock();
            inner
                .by_type
                .get(&event.event_type)
                .map(|list| {
                    list.iter()
                        .filter(|e| e.subscription.is_active())
                        .map(|e| e.handler.clone())
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default()
        };
        let global_entries = {
            let inner = self.inner.lock();
            inner
                .global
                .iter()
                .filter(|e| e.subscription.is_active())
                .map(|e| e.handler.clone())
                .collect::<Vec<_>>()
        };

        let mut processed = 0usize;
        for handler in type_entries.into_iter().chain(global_entries) {
            match handler(event.clone()).await {
                Ok(()) => processed += 1,
                Err(e) => {
                    tracing::error!(event_type = %event.event_type, error = %e, "event handler failed");
                }
            }
        }
        processed
    }

    /// Deactivates and drops every subscription, per-type and global.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        for list in inner.by_type.values() {
            for entry in list {
                entry.subscription.deactivate();
            }
        }
        for entry in &inner.global {
            entry.subscription.deactivate();
        }
        inner.by_type.clear();
        inner.global.clear();
    }

    pub fn has_subscribers(&self, event_type: &str) -> bool {
        let inner = self.inner.lock();
        inner
            .by_type
            .get(event_type)
            .map(|l| l.iter().any(|e| e.subscription.is_active()))
            .unwrap_or(false)
    }

    /// Subscriber count for one type (including global subscribers, which
    /// fire for every type), or the total across everything when `None`.
    pub fn subscriber_count(&self, event_type: Option<&str>) -> usize {
        let inner = self.inner.lock();
        match event_type {
            Some(t) => {
                let per_type = inner
                    .by_type
                    .get(t)
                    .map(|l| l.iter().filter(|e| e.subscription.is_active()).count())
                    .unwrap_or(0);
                let global = inner
                    .global
                    .iter()
                    .filter(|e| e.subscription.is_active())
                    .count();
                per_type + global
            }
            None => {
                let per_type: usize = inner
                    .by_type
                    .values()
                    .map(|l| l.iter().filter(|e| e.subscription.is_active()).count())
                    .sum();
                let global = inner
                    .global
                    .iter()
                    .filter(|e| e.subscription.is_active())
                    .count();
                per_type + global
            }
        }
    }

    pub fn event_types(&self) -> Vec<String> {
        self.inner.lock().by_type.keys().cloned().collect()
    }
}
