pub mod config;

pub use config::{AppConfig, DatabaseConfig, LlmConfig, ServerConfig};
