pub mod assistant;
pub mod fuzzy;
pub mod query;
pub mod reminder;
pub mod responder;
pub mod stats;
pub mod status;

pub use assistant::{Answer, AssistantService, ScheduleSnapshot};
pub use reminder::{ReminderScheduler, TickStats};
pub use responder::Responder;
pub use status::{ClassStatus, StatusReport};
