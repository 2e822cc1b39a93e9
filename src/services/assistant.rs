use std::sync::Arc;

use chrono::Datelike;
use serde::Serialize;
use tracing::info;

use super::query::{self, MatchStage};
use super::responder::{QueryIntent, Responder, ResponseCase};
use super::stats::{self, DayPlan, ScheduleStats};
use super::status::{self, StatusReport};
use crate::clock::Clock;
use crate::error::AppError;
use crate::models::{ClassSession, Schedule, TimePeriod, Weekday};
use crate::store::{ScheduleRepository, codec};

#[derive(Debug, Serialize)]
pub struct Answer {
    pub reply: String,
    pub case: ResponseCase,
    pub intent: QueryIntent,
    pub stage: MatchStage,
    pub target_day: Option<Weekday>,
    pub time_period: Option<TimePeriod>,
    pub sessions: Vec<ClassSession>,
}

#[derive(Debug, Serialize)]
pub struct ScheduleSnapshot {
    pub found: bool,
    pub sessions: Vec<ClassSession>,
}

/// Entry point for every user interaction. Each call reads a fresh
/// snapshot from the repository; a missing table behaves as empty.
pub struct AssistantService {
    store: Arc<dyn ScheduleRepository>,
    clock: Arc<dyn Clock>,
    responder: Arc<Responder>,
}

impl AssistantService {
    pub fn new(
        store: Arc<dyn ScheduleRepository>,
        clock: Arc<dyn Clock>,
        responder: Arc<Responder>,
    ) -> Self {
        Self {
            store,
            clock,
            responder,
        }
    }

    async fn schedule(&self) -> Result<Schedule, AppError> {
        Ok(self.store.load().await?.into_schedule())
    }

    pub async fn snapshot(&self) -> Result<ScheduleSnapshot, AppError> {
        let loaded = self.store.load().await?;
        Ok(ScheduleSnapshot {
            found: loaded.is_found(),
            sessions: loaded.into_schedule().into_sessions(),
        })
    }

    pub async fn status(&self) -> Result<StatusReport, AppError> {
        let schedule = self.schedule().await?;
        Ok(status::current_status(self.clock.now(), &schedule))
    }

    pub async fn ask(&self, question: &str) -> Result<Answer, AppError> {
        let schedule = self.schedule().await?;
        let today = Weekday::from(self.clock.now().weekday());

        let resolution = query::resolve(question, &schedule, today);
        let reply = self.responder.respond(question, &resolution.sessions);

        Ok(Answer {
            reply: reply.text,
            case: reply.case,
            intent: reply.intent,
            stage: resolution.stage,
            target_day: resolution.target_day,
            time_period: resolution.time_period,
            sessions: resolution.sessions,
        })
    }

    pub async fn week(&self) -> Result<Vec<DayPlan>, AppError> {
        Ok(stats::week_view(&self.schedule().await?))
    }

    pub async fn stats(&self) -> Result<ScheduleStats, AppError> {
        Ok(stats::schedule_stats(&self.schedule().await?))
    }

    /// Validate an uploaded CSV table and replace the stored one with it.
    pub async fn replace_from_csv(&self, body: &[u8]) -> Result<usize, AppError> {
        let schedule = codec::parse_schedule(body)?;
        let count = schedule.len();
        self.store.save(&schedule).await?;
        info!("schedule replaced by upload ({} sessions)", count);
        Ok(count)
    }

    pub async fn reload(&self) {
        self.store.invalidate().await;
        info!("schedule reload requested");
    }
}
