pub mod session;
pub mod weekday;

pub use session::{ClassSession, Schedule, TimePeriod, format_hhmm, parse_hhmm};
pub use weekday::Weekday;
