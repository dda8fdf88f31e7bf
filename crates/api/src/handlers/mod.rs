pub mod engine;
pub mod health;
pub mod notifications;
pub mod templates;
pub mod triggers;
