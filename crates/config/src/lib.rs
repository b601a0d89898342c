//! Configuration loading and the provider registry built on top of it.

pub mod error;
pub mod loader;
pub mod persona;
pub mod registry;
pub mod schema;

pub use error::ConfigError;
pub use loader::{interpolate_env, resolve_main_path, ConfigLoader};
pub use persona::PersonaConfig;
pub use registry::{Category, ProviderHandle, ProviderRegistry};
pub use schema::{AppConfig, HardOverrides, ProviderSchema, ServiceFragment, SystemConfig};
