pub mod assignments;
pub mod migration;
pub mod reminders;

pub use assignments::AssignmentService;
pub use migration::LegacyMigrationService;
pub use reminders::{LogReminderDispatcher, ReminderDispatcher, ReminderScheduler, ReminderTicker};
