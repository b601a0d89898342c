pub mod http;
pub mod mock;

pub use http::{HttpTextToSpeech, HttpTtsConfig};
pub use mock::MockTextToSpeech;
