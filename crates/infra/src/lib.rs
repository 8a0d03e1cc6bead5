//! Infrastructure adapters: persistent line storage, exporters, and
//! process configuration.

pub mod config;
pub mod export;
pub mod line_store;

pub use config::{AppConfig, ConfigError};
pub use export::JsonLinesExporter;
pub use line_store::SqliteLineStore;
