use crate::priority::EventPriority;
use std::sync::atomic::{AtomicBool, Ordering};

/// Handle returned by `subscribe`/`subscribe_all`. `active = false` is the
/// sole cancellation mechanism: `unsubscribe` flips this and then removes
/// the entry from the dispatch vector, but `emit` also checks it directly so
/// a subscription that hasn't been physically removed yet is still skipped.
#[derive(Debug)]
pub struct Subscription {
    pub(crate) id: u64,
    pub event_type: Option<String>,
    pub priority: EventPriority,
    active: AtomicBool,
}

impl Subscription {
    pub(crate) fn new(id: u64, event_type: Option<String>, priority: EventPriority) -> Self {
        Self {
            id,
            event_type,
            priority,
            active: AtomicBool::new(true),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_global(&self) -> bool {
        self.event_type.is_none()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub(crate) fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
    }
}
