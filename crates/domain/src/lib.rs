pub mod entities;
pub mod ports;
pub mod repositories;
pub mod templates;
pub mod values;

pub use entities::{
    AchievementStats, NewScheduledNotification, NewTrigger, ScheduledNotification,
    StudentProfile, Trigger, TriggerExecution,
};
pub use templates::{MessageTemplate, TemplateCatalog};
pub use values::{
    AudienceClass, DigestFrequency, NotificationCategory, NotificationPriority, TriggerKind,
};
