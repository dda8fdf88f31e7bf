//! 基础设施层：SQLite持久化和投递渠道实现

pub mod channels;
pub mod database;

pub use channels::email::{build_email_transport, HttpEmailTransport, LogEmailTransport};
pub use channels::inbox::SqliteInboxSink;
pub use database::sqlite::{
    SqliteNotificationRepository, SqliteStudentRepository, SqliteTriggerExecutionRepository,
    SqliteTriggerRepository,
};
pub use database::{DatabaseManager, DbPool};
