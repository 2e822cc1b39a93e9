pub mod codec;
pub mod file;
pub mod memory;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::Schedule;

pub use file::CsvScheduleStore;
pub use memory::InMemoryScheduleStore;

/// Result of reading the persisted table. A missing table is not an error:
/// callers substitute an empty schedule and carry on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Loaded {
    Found(Schedule),
    NotFound,
}

impl Loaded {
    pub fn is_found(&self) -> bool {
        matches!(self, Loaded::Found(_))
    }

    pub fn into_schedule(self) -> Schedule {
        match self {
            Loaded::Found(schedule) => schedule,
            Loaded::NotFound => Schedule::empty(),
        }
    }
}

#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn load(&self) -> Result<Loaded, AppError>;
    /// Replace the whole table. Later `load` calls observe the new rows.
    async fn save(&self, schedule: &Schedule) -> Result<(), AppError>;
    /// Drop any cached snapshot so the next `load` re-reads the source.
    async fn invalidate(&self);
}
