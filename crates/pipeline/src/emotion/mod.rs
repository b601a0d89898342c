pub mod extractor;
pub mod timeline;

pub use extractor::{extract, ExtractionResult};
pub use timeline::{build_timeline, TimelineConfig, TimelineStrategy};
