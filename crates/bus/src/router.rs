//! `EventRouter` — a Handler-oriented façade over `EventBus`.
//!
//! Grounded in the reference implementation's `eventbus/router.py`:
//! registrations queue up before `setup()`, mount immediately afterward,
//! and every handler is wrapped in a try/catch translator so handler code
//! never repeats that boilerplate.

use crate::bus::{EventBus, HandlerFn};
use crate::priority::EventPriority;
use crate::subscription::Subscription;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use voice_agent_core::OutputEvent;

/// Implemented by anything the router can dispatch to. Errors returned here
/// are caught by the router's wrapper and logged — they never propagate to
/// the bus or to other handlers.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, event: &OutputEvent) -> Result<(), String>;

    /// Name used in error logs; defaults to the type name.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

struct Pending {
    event_type: String,
    handler: Arc<dyn Handler>,
    priority: EventPriority,
}

struct Mounted {
    event_type: String,
    subscription: Arc<Subscription>,
}

struct Inner {
    pending: Vec<Pending>,
    mounted: Vec<Mounted>,
    is_setup: bool,
}

pub struct EventRouter {
    bus: Arc<EventBus>,
    inner: Mutex<Inner>,
}

impl EventRouter {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self {
            bus,
            inner: Mutex::new(Inner {
                pending: Vec::new(),
                mounted: Vec::new(),
                is_setup: false,
            }),
        }
    }

    /// Queues `handler` for `event_type`. If the router is already set up,
    /// mounts immediately instead of waiting for the next `setup()` call.
    pub fn register(
        &self,
        event_type: impl Into<String>,
        handler: Arc<dyn Handler>,
        priority: EventPriority,
    ) -> &Self {
        let event_type = event_type.into();
        let already_setup = {
            let mut inner = self.inner.lock();
            inner.pending.push(Pending {
                event_type: event_type.clone(),
                handler: handler.clone(),
                priority,
            });
            inner.is_setup
        };
        if already_setup {
            self.mount(&event_type, handler, priority);
        }
        self
    }

    pub fn register_many(
        &self,
        event_types: &[&str],
        handler: Arc<dyn Handler>,
        priority: EventPriority,
    ) -> &Self {
        for event_type in event_types {
            self.register(*event_type, handler.clone(), priority);
        }
        self
    }

    fn mount(&self, event_type: &str, handler: Arc<dyn Handler>, priority: EventPriority) {
        let wrapper: HandlerFn = Arc::new(move |event| {
            let handler = handler.clone();
            Box::pin(async move {
                handler
                    .handle(&event)
                    .await
                    .map_err(|e| format!("{}: {e}", handler.name()))
            })
        });
        let subscription = self.bus.subscribe(event_type, wrapper, priority);
        self.inner.lock().mounted.push(Mounted {
            event_type: event_type.to_string(),
            subscription,
        });
    }

    /// Mounts every pending registration and marks the router active.
    /// Idempotent: a second call is a no-op (logged), matching the
    /// reference implementation's "warn and return" behavior.
    pub fn setup(&self) {
        let pending = {
            let mut inner = self.inner.lock();
            if inner.is_setup {
                tracing::warn!("router already set up");
                return;
            }
            inner.is_setup = true;
            std::mem::take(&mut inner.pending)
        };
        for p in pending {
            self.mount(&p.event_type, p.handler, p.priority);
        }
    }

    /// Cancels every mounted subscription and resets to pre-setup state,
    /// including the pending queue (so `setup()` can run again after this).
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        for mounted in inner.mounted.drain(..) {
            self.bus.unsubscribe(&mounted.subscription);
        }
        inner.pending.clear();
        inner.is_setup = false;
    }

    pub fn is_setup(&self) -> bool {
        self.inner.lock().is_setup
    }

    pub fn handler_count(&self) -> usize {
        let inner = self.inner.lock();
        inner.pending.len() + inner.mounted.len()
    }

    pub fn event_types(&self) -> Vec<String> {
        let inner = self.inner.lock();
        let mut types: Vec<String> = inner
            .pending
            .iter()
            .map(|p| p.event_type.clone())
            .chain(inner.mounted.iter().map(|m| m.event_type.clone()))
            .collect();
        types.sort();
        types.dedup();
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex as SyncMutex;

    struct RecordingHandler {
        log: Arc<SyncMutex<Vec<String>>>,
        fail_once: Arc<std::sync::atomic::AtomicBool>,
    }

    #[async_trait]
    impl Handler for RecordingHandler {
        async fn handle(&self, event: &OutputEvent) -> Result<(), String> {
            if self
                .fail_once
                .swap(false, std::sync::atomic::Ordering::SeqCst)
            {
                return Err("boom".to_string());
            }
            self.log.lock().push(event.event_type.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn setup_mounts_pending_registrations() {
        let bus = Arc::new(EventBus::new());
        let router = EventRouter::new(bus.clone());
        let log = Arc::new(SyncMutex::new(Vec::new()));
        let handler = Arc::new(RecordingHandler {
            log: log.clone(),
            fail_once: Arc::new(std::sync::atomic::AtomicBool::new(false)),
        });

        router.register("sentence", handler, EventPriority::NORMAL);
        assert!(!router.is_setup());
        router.setup();
        assert!(router.is_setup());

        bus.emit(OutputEvent::new("sentence", serde_json::Value::Null))
            .await;
        assert_eq!(*log.lock(), vec!["sentence".to_string()]);
    }

    #[tokio::test]
    async fn register_after_setup_mounts_immediately() {
        let bus = Arc::new(EventBus::new());
        let router = EventRouter::new(bus.clone());
        router.setup();

        let log = Arc::new(SyncMutex::new(Vec::new()));
        let handler = Arc::new(RecordingHandler {
            log: log.clone(),
            fail_once: Arc::new(std::sync::atomic::AtomicBool::new(false)),
        });
        router.register("sentence", handler, EventPriority::NORMAL);

        bus.emit(OutputEvent::new("sentence", serde_json::Value::Null))
            .await;
        assert_eq!(*log.lock(), vec!["sentence".to_string()]);
    }

    #[tokio::test]
    async fn handler_error_is_swallowed_by_the_wrapper() {
        let bus = Arc::new(EventBus::new());
        let router = EventRouter::new(bus.clone());
        let log = Arc::new(SyncMutex::new(Vec::new()));
        let handler = Arc::new(RecordingHandler {
            log: log.clone(),
            fail_once: Arc::new(std::sync::atomic::AtomicBool::new(true)),
        });
        router.register("sentence", handler, EventPriority::NORMAL);
        router.setup();

        bus.emit(OutputEvent::new("sentence", serde_json::Value::Null))
            .await;
        bus.emit(OutputEvent::new("sentence", serde_json::Value::Null))
            .await;
        assert_eq!(log.lock().len(), 1);
    }

    #[tokio::test]
    async fn clear_resets_to_pre_setup_state() {
        let bus = Arc::new(EventBus::new());
        let router = EventRouter::new(bus.clone());
        let log = Arc::new(SyncMutex::new(Vec::new()));
        let handler = Arc::new(RecordingHandler {
            log: log.clone(),
            fail_once: Arc::new(std::sync::atomic::AtomicBool::new(false)),
        });
        router.register("sentence", handler, EventPriority::NORMAL);
        router.setup();
        router.clear();

        assert!(!router.is_setup());
        assert_eq!(router.handler_count(), 0);
        bus.emit(OutputEvent::new("sentence", serde_json::Value::Null))
            .await;
        assert!(log.lock().is_empty());
    }
}
