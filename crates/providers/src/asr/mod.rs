pub mod http;
pub mod mock;

pub use http::{HttpAsrConfig, HttpSpeechToText};
pub use mock::MockSpeechToText;
