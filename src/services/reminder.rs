use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::status::truncate_to_minute;
use crate::clock::Clock;
use crate::error::AppError;
use crate::models::{ClassSession, Schedule, Weekday};
use crate::notify::{Reminder, ReminderChannel};
use crate::store::{Loaded, ScheduleRepository};

/// A session counts as reminded once per calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SentKey {
    date: NaiveDate,
    start_time: NaiveTime,
    course_name: String,
    location: String,
}

impl SentKey {
    fn new(date: NaiveDate, session: &ClassSession) -> Self {
        Self {
            date,
            start_time: session.start_time,
            course_name: session.course_name.clone(),
            location: session.location.clone(),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct TickStats {
    pub due: usize,
    pub already_sent: usize,
    pub delivered: usize,
    pub failed: usize,
}

/// Today's sessions starting within `lead_minutes` of `now`, with the
/// minutes left for each.
pub fn due_sessions(
    now: NaiveDateTime,
    schedule: &Schedule,
    lead_minutes: i64,
) -> Vec<(ClassSession, i64)> {
    let today = Weekday::from(now.weekday());
    let now_time = truncate_to_minute(now.time());

    schedule
        .on_sorted(today)
        .into_iter()
        .filter(|s| s.start_time >= now_time)
        .map(|s| (s.clone(), (s.start_time - now_time).num_minutes()))
        .filter(|(_, minutes)| *minutes <= lead_minutes)
        .collect()
}

/// 授業前リマインダー
/// 一定間隔で時間割を読み直し、開始が近いコマを通知する
pub struct ReminderScheduler {
    store: Arc<dyn ScheduleRepository>,
    clock: Arc<dyn Clock>,
    channels: Vec<Arc<dyn ReminderChannel>>,
    interval: Duration,
    lead_minutes: i64,
    sent: HashSet<SentKey>,
}

impl ReminderScheduler {
    pub fn new(
        store: Arc<dyn ScheduleRepository>,
        clock: Arc<dyn Clock>,
        channels: Vec<Arc<dyn ReminderChannel>>,
        interval_secs: u64,
        lead_minutes: i64,
    ) -> Self {
        Self {
            store,
            clock,
            channels,
            interval: Duration::from_secs(interval_secs),
            lead_minutes,
            sent: HashSet::new(),
        }
    }

    /// 無限ループで定期実行
    pub async fn start(mut self) {
        info!(
            "Starting reminder scheduler (interval: {:?}, lead: {} min, channels: {})",
            self.interval,
            self.lead_minutes,
            self.channels.len()
        );

        loop {
            tokio::time::sleep(self.interval).await;

            match self.tick().await {
                Ok(stats) if stats.due > 0 => {
                    info!(
                        "Reminder check - due: {}, already sent: {}, delivered: {}, failed: {}",
                        stats.due, stats.already_sent, stats.delivered, stats.failed
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    // エラーが発生してもループは継続
                    warn!("Reminder check failed: {:?}", e);
                }
            }
        }
    }

    /// One poll: load a fresh snapshot and notify every due session that
    /// has not been reminded today.
    pub async fn tick(&mut self) -> Result<TickStats, AppError> {
        let now = self.clock.now();
        let today = now.date();
        self.sent.retain(|key| key.date == today);

        let schedule = match self.store.load().await? {
            Loaded::Found(schedule) => schedule,
            Loaded::NotFound => {
                debug!("no schedule to check reminders against");
                return Ok(TickStats::default());
            }
        };

        let mut stats = TickStats::default();
        for (session, minutes_left) in due_sessions(now, &schedule, self.lead_minutes) {
            stats.due += 1;

            let key = SentKey::new(today, &session);
            if self.sent.contains(&key) {
                stats.already_sent += 1;
                continue;
            }

            let reminder = Reminder::for_session(&session, minutes_left);
            for channel in &self.channels {
                match channel.deliver(&reminder).await {
                    Ok(()) => {
                        info!(
                            "Reminder sent via {}: {}",
                            channel.name(),
                            reminder.subject
                        );
                        stats.delivered += 1;
                    }
                    Err(e) => {
                        warn!("Reminder via {} failed: {}", channel.name(), e);
                        stats.failed += 1;
                    }
                }
            }
            self.sent.insert(key);
        }

        Ok(stats)
    }
}
