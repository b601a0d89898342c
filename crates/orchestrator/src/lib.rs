//! The conversational turn owner: assembles the input/output pipelines
//! around one session's providers and drives the turn algorithm end to end.

pub mod audio_sink;
pub mod error;
pub mod orchestrator;
pub mod result;
pub mod service_context;

pub use error::OrchestratorError;
pub use orchestrator::{Orchestrator, EVENT_AUDIO, EVENT_AUDIO_WITH_EXPRESSION, EVENT_ERROR, EVENT_EXPRESSION};
pub use result::ConversationResult;
pub use service_context::ServiceContext;
