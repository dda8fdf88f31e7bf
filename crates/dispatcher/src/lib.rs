pub mod audience;
pub mod cron_utils;
pub mod delivery;
pub mod processor;
pub mod renderer;
pub mod scheduler;

pub use audience::AudienceResolver;
pub use cron_utils::CronScheduler;
pub use delivery::{DeliveryDispatcher, DeliveryReport};
pub use processor::{ProcessReport, ScheduledProcessor};
pub use renderer::{render, ContentSource, RenderVars, RenderedMessage};
pub use scheduler::{TickReport, TriggerScheduler};
