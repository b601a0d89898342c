/// Dispatch priority. Larger runs first; ties preserve subscription order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct EventPriority(pub i32);

impl EventPriority {
    pub const LOWEST: EventPriority = EventPriority(0);
    pub const LOW: EventPriority = EventPriority(25);
    pub const NORMAL: EventPriority = EventPriority(50);
    pub const HIGH: EventPriority = EventPriority(75);
    pub const HIGHEST: EventPriority = EventPriority(100);
    pub const MONITOR: EventPriority = EventPriority(200);
}

impl Default for EventPriority {
    fn default() -> Self {
        EventPriority::NORMAL
    }
}

impl From<i32> for EventPriority {
    fn from(v: i32) -> Self {
        EventPriority(v)
    }
}
