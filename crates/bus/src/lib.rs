//! In-process publish/subscribe event bus and the router façade over it.

pub mod bus;
pub mod error;
pub mod priority;
pub mod router;
pub mod subscription;

pub use bus::{EventBus, HandlerFn};
pub use error::BusError;
pub use priority::EventPriority;
pub use router::{EventRouter, Handler};
pub use subscription::Subscription;
