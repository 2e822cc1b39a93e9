use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use super::fuzzy;
use crate::models::{ClassSession, Schedule, TimePeriod, Weekday};

/// Which rule produced the rows of a [`Resolution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStage {
    /// "next week": the whole timetable, since weeks are not modelled.
    NextWeek,
    /// A day keyword matched; rows are that day, narrowed by time period.
    DayFilter,
    Substring,
    FuzzyCourse,
    FuzzyTeacher,
    NoMatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub stage: MatchStage,
    pub target_day: Option<Weekday>,
    pub time_period: Option<TimePeriod>,
    pub sessions: Vec<ClassSession>,
}

impl Resolution {
    fn new(stage: MatchStage, sessions: Vec<ClassSession>) -> Self {
        Self {
            stage,
            target_day: None,
            time_period: None,
            sessions,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaySelector {
    Day(Weekday),
    NextWeek,
}

const NEXT_WEEK_KEYWORDS: [&str; 2] = ["下周", "next week"];

/// Checked in order; "day after tomorrow" has to be seen before "tomorrow".
const RELATIVE_DAY_KEYWORDS: [(&str, usize); 6] = [
    ("今天", 0),
    ("today", 0),
    ("明天", 1),
    ("后天", 2),
    ("day after tomorrow", 2),
    ("tomorrow", 1),
];

const WEEKDAY_KEYWORDS: [(Weekday, &[&str]); 7] = [
    (Weekday::Monday, &["周一", "星期一", "monday"]),
    (Weekday::Tuesday, &["周二", "星期二", "tuesday"]),
    (Weekday::Wednesday, &["周三", "星期三", "wednesday"]),
    (Weekday::Thursday, &["周四", "星期四", "thursday"]),
    (Weekday::Friday, &["周五", "星期五", "friday"]),
    (Weekday::Saturday, &["周六", "星期六", "saturday"]),
    (Weekday::Sunday, &["周日", "星期日", "星期天", "周天", "sunday"]),
];

const PERIOD_KEYWORDS: [(TimePeriod, &[&str]); 3] = [
    (TimePeriod::Morning, &["上午", "morning"]),
    (TimePeriod::Afternoon, &["下午", "afternoon"]),
    (TimePeriod::Evening, &["晚上", "晚课", "evening", "tonight"]),
];

/// Day the query is about, relative days counted from `today`.
/// `query` must already be lowercased.
pub fn detect_day(query: &str, today: Weekday) -> Option<DaySelector> {
    if NEXT_WEEK_KEYWORDS.iter().any(|k| query.contains(k)) {
        return Some(DaySelector::NextWeek);
    }

    if let Some((_, offset)) = RELATIVE_DAY_KEYWORDS
        .iter()
        .find(|(keyword, _)| query.contains(keyword))
    {
        return Some(DaySelector::Day(today.offset(*offset)));
    }

    WEEKDAY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| query.contains(k)))
        .map(|(day, _)| DaySelector::Day(*day))
}

/// `query` must already be lowercased.
pub fn detect_period(query: &str) -> Option<TimePeriod> {
    PERIOD_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| query.contains(k)))
        .map(|(period, _)| *period)
}

/// Resolve a free-text question against the timetable.
///
/// A day keyword always decides the result, even when the filtered day is
/// empty. Only when no day keyword is present does the text search run:
/// substring over the whole row first, then fuzzy course names, then fuzzy
/// teacher names.
pub fn resolve(query: &str, schedule: &Schedule, today: Weekday) -> Resolution {
    let query = query.trim();
    if query.is_empty() {
        return Resolution::new(MatchStage::NoMatch, Vec::new());
    }

    let lowered = query.to_lowercase();
    match detect_day(&lowered, today) {
        Some(DaySelector::NextWeek) => {
            Resolution::new(MatchStage::NextWeek, schedule.sessions().to_vec())
        }
        Some(DaySelector::Day(day)) => {
            let time_period = detect_period(&lowered);
            let sessions = schedule
                .iter()
                .filter(|s| s.day == day)
                .filter(|s| time_period.is_none_or(|p| s.starts_in(p)))
                .cloned()
                .collect();
            Resolution {
                stage: MatchStage::DayFilter,
                target_day: Some(day),
                time_period,
                sessions,
            }
        }
        None => text_search(query, schedule),
    }
}

/// Text search used when the query names no day.
pub fn text_search(query: &str, schedule: &Schedule) -> Resolution {
    let query = query.trim();
    if query.is_empty() {
        return Resolution::new(MatchStage::NoMatch, Vec::new());
    }

    let needle = query.to_lowercase();
    let hits: Vec<ClassSession> = schedule
        .iter()
        .filter(|s| composite_text(s).contains(&needle))
        .cloned()
        .collect();
    if !hits.is_empty() {
        return Resolution::new(MatchStage::Substring, hits);
    }

    let courses = unique(schedule.iter().map(|s| s.course_name.as_str()));
    let matched = matched_names(query, &courses);
    if !matched.is_empty() {
        debug!("fuzzy course match for {:?}: {:?}", query, matched);
        let sessions = schedule
            .iter()
            .filter(|s| matched.contains(s.course_name.as_str()))
            .cloned()
            .collect();
        return Resolution::new(MatchStage::FuzzyCourse, sessions);
    }

    let teachers = unique(schedule.iter().map(|s| s.teacher.as_str()));
    let matched = matched_names(query, &teachers);
    if !matched.is_empty() {
        debug!("fuzzy teacher match for {:?}: {:?}", query, matched);
        let sessions = schedule
            .iter()
            .filter(|s| matched.contains(s.teacher.as_str()))
            .cloned()
            .collect();
        return Resolution::new(MatchStage::FuzzyTeacher, sessions);
    }

    Resolution::new(MatchStage::NoMatch, Vec::new())
}

fn composite_text(session: &ClassSession) -> String {
    format!(
        "{} {} {} {}",
        session.day, session.course_name, session.teacher, session.location
    )
    .to_lowercase()
}

fn unique<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    values.filter(|v| seen.insert(*v)).collect()
}

fn matched_names<'a>(query: &str, candidates: &[&'a str]) -> HashSet<&'a str> {
    fuzzy::extract(query, candidates.iter().copied())
        .into_iter()
        .map(|(name, _)| name)
        .collect()
}
