use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use super::Weekday;

/// One scheduled class occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSession {
    pub day: Weekday,
    pub period: i32,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub course_name: String,
    pub location: String,
    pub teacher: String,
}

impl ClassSession {
    pub fn starts_in(&self, period: TimePeriod) -> bool {
        period.contains(self.start_time)
    }

    /// Time span as displayed, e.g. `09:00-10:30`.
    pub fn span(&self) -> String {
        format!("{}-{}", format_hhmm(self.start_time), format_hhmm(self.end_time))
    }
}

/// Weekly timetable. Rows keep the order they were loaded in; nothing
/// prevents overlapping sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule {
    sessions: Vec<ClassSession>,
}

impl Schedule {
    pub fn new(sessions: Vec<ClassSession>) -> Self {
        Self { sessions }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn sessions(&self) -> &[ClassSession] {
        &self.sessions
    }

    pub fn into_sessions(self) -> Vec<ClassSession> {
        self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ClassSession> {
        self.sessions.iter()
    }

    /// Sessions on `day` in file order.
    pub fn on(&self, day: Weekday) -> Vec<&ClassSession> {
        self.sessions.iter().filter(|s| s.day == day).collect()
    }

    /// Sessions on `day`, stably sorted by start time.
    pub fn on_sorted(&self, day: Weekday) -> Vec<&ClassSession> {
        let mut sessions = self.on(day);
        sessions.sort_by_key(|s| s.start_time);
        sessions
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a ClassSession;
    type IntoIter = std::slice::Iter<'a, ClassSession>;

    fn into_iter(self) -> Self::IntoIter {
        self.sessions.iter()
    }
}

/// Part of the day a session starts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimePeriod {
    /// before 12:00
    Morning,
    /// 12:00 up to 18:00
    Afternoon,
    /// from 18:00
    Evening,
}

impl TimePeriod {
    pub fn contains(&self, start: NaiveTime) -> bool {
        let hour = start.hour();
        match self {
            TimePeriod::Morning => hour < 12,
            TimePeriod::Afternoon => (12..18).contains(&hour),
            TimePeriod::Evening => hour >= 18,
        }
    }
}

pub fn format_hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Strict zero-padded 24h `HH:MM`. Ordering across the crate relies on
/// this shape, so `8:00` or `08:00:00` are rejected.
pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    let bytes = value.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return None;
    }
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}

pub(crate) mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_hhmm(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_hhmm(&raw).ok_or_else(|| D::Error::custom(format!("expected HH:MM, got {raw:?}")))
    }
}
