use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Loaded, ScheduleRepository};
use crate::error::AppError;
use crate::models::Schedule;

/// Process-local table with no backing file.
#[derive(Default)]
pub struct InMemoryScheduleStore {
    schedule: RwLock<Option<Schedule>>,
}

impl InMemoryScheduleStore {
    pub fn new(schedule: Schedule) -> Self {
        Self {
            schedule: RwLock::new(Some(schedule)),
        }
    }

    /// A store whose table has never been saved; `load` reports `NotFound`.
    pub fn missing() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScheduleRepository for InMemoryScheduleStore {
    async fn load(&self) -> Result<Loaded, AppError> {
        Ok(match self.schedule.read().await.as_ref() {
            Some(schedule) => Loaded::Found(schedule.clone()),
            None => Loaded::NotFound,
        })
    }

    async fn save(&self, schedule: &Schedule) -> Result<(), AppError> {
        *self.schedule.write().await = Some(schedule.clone());
        Ok(())
    }

    async fn invalidate(&self) {}
}
