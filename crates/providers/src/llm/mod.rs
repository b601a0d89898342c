pub mod http;
pub mod mock;

pub use http::{HttpLanguageModel, HttpLlmConfig};
pub use mock::MockLanguageModel;
