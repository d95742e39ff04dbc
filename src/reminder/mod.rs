pub mod reminder_handlers;
pub mod reminder_job;
pub mod reminder_models;
pub mod reminder_policy;
pub mod reminder_repository;
pub mod reminder_scheduler;
#[cfg(test)]
pub mod reminder_testing;

pub use reminder_handlers::{get_assignment_reminders, trigger_reminders, TriggerResponse};
pub use reminder_job::{DeadlineScanJob, ScanSettings};
pub use reminder_models::Reminder;
pub use reminder_policy::ReminderOffsets;
pub use reminder_repository::{PgReminderStore, ReminderStore};
pub use reminder_scheduler::{ReminderScheduler, DEFAULT_REMINDER_CRON};
