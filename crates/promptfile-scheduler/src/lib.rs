//! Promptfile Scheduler
//!
//! The built-in cron `schedule` trigger and the task manager that owns every
//! compiled scheduled task. Each tick runs the flow's pipeline against a
//! synthetic empty request; a failing tick is reported as an event and the
//! schedule keeps going.

mod manager;
mod task;
mod trigger;

pub use manager::TaskManager;
pub use task::{CronTask, parse_schedule};
pub use trigger::{SchedulePlugin, ScheduleTrigger, ScheduleTriggerProvider};
