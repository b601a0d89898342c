use thiserror::Error;

/// Error surface for bus/router handlers. A handler returning `Err` here is
/// exactly the "handler exception" case in the event bus's contract: it is
/// logged and does not stop dispatch to the remaining handlers.
#[derive(Debug, Error)]
pub enum BusError {
    #[error("handler failed: {0}")]
    Handler(String),
}
