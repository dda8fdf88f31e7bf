pub mod config;
pub mod errors;

pub use config::{ApiConfig, DatabaseConfig, EmailConfig, EngineConfig, NotifierConfig};
pub use errors::{NotifierError, NotifierResult};
