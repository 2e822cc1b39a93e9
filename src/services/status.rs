use chrono::{Datelike, NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;

use crate::models::{ClassSession, Schedule, Weekday, format_hhmm};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassStatus {
    /// No sessions at all today.
    Free,
    InClass,
    Upcoming,
    /// Every session today has ended.
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub status: ClassStatus,
    pub message: String,
    pub current: Option<ClassSession>,
    pub next: Option<ClassSession>,
    pub minutes_until_next: Option<i64>,
}

/// Where `now` falls in today's timetable.
///
/// Today's sessions are stably sorted by start time and scanned in order:
/// the first one whose `[start, end]` window (both ends inclusive) holds
/// `now` wins, otherwise the first one that has yet to start. `now` is
/// truncated to the minute because times are compared at `HH:MM`
/// resolution.
pub fn current_status(now: NaiveDateTime, schedule: &Schedule) -> StatusReport {
    let today = Weekday::from(now.weekday());
    let now_time = truncate_to_minute(now.time());

    let sessions = schedule.on_sorted(today);
    if sessions.is_empty() {
        return StatusReport {
            status: ClassStatus::Free,
            message: "no class today.".to_string(),
            current: None,
            next: None,
            minutes_until_next: None,
        };
    }

    for session in &sessions {
        if session.start_time <= now_time && now_time <= session.end_time {
            let next = sessions
                .iter()
                .find(|s| s.start_time > session.end_time)
                .map(|s| (*s).clone());
            return StatusReport {
                status: ClassStatus::InClass,
                message: format!(
                    "in class: {} ({})",
                    session.course_name, session.location
                ),
                current: Some((*session).clone()),
                next,
                minutes_until_next: None,
            };
        }

        if session.start_time > now_time {
            let minutes = (session.start_time - now_time).num_minutes().max(0);
            return StatusReport {
                status: ClassStatus::Upcoming,
                message: format!(
                    "{} minutes until {} at {}",
                    minutes,
                    session.course_name,
                    format_hhmm(session.start_time)
                ),
                current: None,
                next: Some((*session).clone()),
                minutes_until_next: Some(minutes),
            };
        }
    }

    StatusReport {
        status: ClassStatus::Done,
        message: "all classes are over for today.".to_string(),
        current: None,
        next: None,
        minutes_until_next: None,
    }
}

pub(crate) fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn session(day: Weekday, start: (u32, u32), end: (u32, u32), name: &str) -> ClassSession {
        ClassSession {
            day,
            period: 1,
            start_time: t(start.0, start.1),
            end_time: t(end.0, end.1),
            course_name: name.to_string(),
            location: "A101".to_string(),
            teacher: "Wang".to_string(),
        }
    }

    /// 2023-10-23 is a Monday.
    fn monday_at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 10, 23)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn math_only() -> Schedule {
        Schedule::new(vec![session(Weekday::Monday, (9, 0), (10, 30), "Math")])
    }

    #[test]
    fn test_in_class() {
        let report = current_status(monday_at(9, 30), &math_only());
        assert_eq!(report.status, ClassStatus::InClass);
        assert_eq!(report.current.unwrap().course_name, "Math");
        assert!(report.next.is_none());
    }

    #[test]
    fn test_upcoming_minutes() {
        let report = current_status(monday_at(8, 0), &math_only());
        assert_eq!(report.status, ClassStatus::Upcoming);
        assert_eq!(report.minutes_until_next, Some(60));
        assert_eq!(report.next.unwrap().course_name, "Math");
    }

    #[test]
    fn test_done_after_last_session() {
        let report = current_status(monday_at(11, 0), &math_only());
        assert_eq!(report.status, ClassStatus::Done);
        assert!(report.next.is_none());
    }

    #[test]
    fn test_free_when_nothing_today() {
        let schedule = Schedule::new(vec![session(Weekday::Tuesday, (9, 0), (10, 0), "Art")]);
        let report = current_status(monday_at(9, 30), &schedule);
        assert_eq!(report.status, ClassStatus::Free);
        assert_eq!(report.message, "no class today.");

        assert_eq!(
            current_status(monday_at(9, 30), &Schedule::empty()).status,
            ClassStatus::Free
        );
    }

    #[test]
    fn test_window_is_inclusive_and_minute_truncated() {
        let schedule = math_only();
        assert_eq!(current_status(monday_at(9, 0), &schedule).status, ClassStatus::InClass);
        assert_eq!(current_status(monday_at(10, 30), &schedule).status, ClassStatus::InClass);

        let late_seconds = monday_at(10, 30) + chrono::Duration::seconds(45);
        assert_eq!(current_status(late_seconds, &schedule).status, ClassStatus::InClass);
        assert_eq!(current_status(monday_at(10, 31), &schedule).status, ClassStatus::Done);
    }

    #[test]
    fn test_back_to_back_boundary_matches_earlier() {
        // ファイル上の順序はバラバラでも開始時刻順に走査する
        let schedule = Schedule::new(vec![
            session(Weekday::Monday, (10, 0), (11, 0), "Physics"),
            session(Weekday::Monday, (13, 0), (14, 0), "English"),
            session(Weekday::Monday, (9, 0), (10, 0), "Math"),
        ]);
        let report = current_status(monday_at(10, 0), &schedule);
        assert_eq!(report.status, ClassStatus::InClass);
        assert_eq!(report.current.unwrap().course_name, "Math");
        // next は終了時刻より後に始まる最初のコマ
        assert_eq!(report.next.unwrap().course_name, "English");
    }

    #[test]
    fn test_zero_width_session() {
        let schedule = Schedule::new(vec![session(Weekday::Monday, (12, 0), (12, 0), "Assembly")]);
        assert_eq!(current_status(monday_at(12, 0), &schedule).status, ClassStatus::InClass);
        assert_eq!(current_status(monday_at(12, 1), &schedule).status, ClassStatus::Done);
    }

    #[test]
    fn test_in_class_reports_following_session() {
        let schedule = Schedule::new(vec![
            session(Weekday::Monday, (9, 0), (10, 30), "Math"),
            session(Weekday::Monday, (14, 0), (15, 30), "Physics"),
        ]);
        let report = current_status(monday_at(9, 45), &schedule);
        assert_eq!(report.next.unwrap().course_name, "Physics");

        let between = current_status(monday_at(11, 0), &schedule);
        assert_eq!(between.status, ClassStatus::Upcoming);
        assert_eq!(between.minutes_until_next, Some(180));
    }

    #[test]
    fn test_upcoming_minutes_never_negative() {
        let schedule = Schedule::new(vec![session(Weekday::Monday, (8, 1), (9, 0), "Math")]);
        let almost = monday_at(8, 0) + chrono::Duration::seconds(59);
        let report = current_status(almost, &schedule);
        assert_eq!(report.status, ClassStatus::Upcoming);
        assert_eq!(report.minutes_until_next, Some(1));
    }
}
