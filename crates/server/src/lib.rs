//! WebSocket transport, session lifecycle, and wire-protocol translation
//! for the voice agent. This crate is the one concrete transport binding;
//! everything upstream of the socket (pipelines, orchestrator, providers)
//! is transport-agnostic.

pub mod error;
pub mod session;
pub mod socket_adapter;
pub mod state;
pub mod websocket;
pub mod wire;

pub use error::ServerError;
pub use session::{HistoryStore, NoopHistoryStore, SessionManager};
pub use state::AppState;
pub use websocket::ws_handler;
