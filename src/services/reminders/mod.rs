//! 截止提醒
//!
//! 调度器只决定“何时、发什么”，实际投递交给 [`ReminderDispatcher`]。

pub mod dispatcher;
pub mod policy;
pub mod scheduler;
pub mod ticker;

pub use dispatcher::{LogReminderDispatcher, ReminderDispatcher};
pub use policy::ReminderPolicy;
pub use scheduler::ReminderScheduler;
pub use ticker::ReminderTicker;
