pub mod energy;
#[cfg(feature = "onnx")]
pub mod onnx;

pub use energy::{EnergyVad, EnergyVadConfig};
#[cfg(feature = "onnx")]
pub use onnx::SileroOnnxVad;
