pub mod clean;
pub mod recognize;

pub use clean::CleanStep;
pub use recognize::RecognizeStep;
