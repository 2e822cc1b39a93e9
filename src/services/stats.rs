use serde::Serialize;

use crate::models::{ClassSession, Schedule, Weekday};

/// One day tab of the weekly view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayPlan {
    pub day: Weekday,
    pub sessions: Vec<ClassSession>,
}

/// Days that have sessions, Monday first, each sorted by start time.
pub fn week_view(schedule: &Schedule) -> Vec<DayPlan> {
    Weekday::ALL
        .into_iter()
        .filter_map(|day| {
            let sessions: Vec<ClassSession> =
                schedule.on_sorted(day).into_iter().cloned().collect();
            (!sessions.is_empty()).then_some(DayPlan { day, sessions })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseCount {
    pub course_name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeatCell {
    pub day: Weekday,
    pub period: i32,
    pub course_name: String,
    pub short_name: String,
    pub location: String,
    pub teacher: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusiestDay {
    pub day: Weekday,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleStats {
    pub total_sessions: usize,
    pub busiest_day: Option<BusiestDay>,
    /// Spread over a five-day week.
    pub average_per_weekday: f64,
    pub course_counts: Vec<CourseCount>,
    pub heatmap: Vec<HeatCell>,
}

pub fn schedule_stats(schedule: &Schedule) -> ScheduleStats {
    let total_sessions = schedule.len();

    let mut per_day = [0usize; 7];
    for session in schedule {
        per_day[session.day.index()] += 1;
    }
    // 同数なら曜日が早い方
    let busiest_day = Weekday::ALL
        .into_iter()
        .map(|day| BusiestDay { day, count: per_day[day.index()] })
        .filter(|b| b.count > 0)
        .fold(None::<BusiestDay>, |best, candidate| match best {
            Some(b) if b.count >= candidate.count => Some(b),
            _ => Some(candidate),
        });

    let mut course_counts: Vec<CourseCount> = Vec::new();
    for session in schedule {
        match course_counts
            .iter_mut()
            .find(|c| c.course_name == session.course_name)
        {
            Some(entry) => entry.count += 1,
            None => course_counts.push(CourseCount {
                course_name: session.course_name.clone(),
                count: 1,
            }),
        }
    }
    course_counts.sort_by(|a, b| b.count.cmp(&a.count));

    let heatmap = schedule
        .iter()
        .map(|s| HeatCell {
            day: s.day,
            period: s.period,
            course_name: s.course_name.clone(),
            short_name: short_name(&s.course_name),
            location: s.location.clone(),
            teacher: s.teacher.clone(),
        })
        .collect();

    ScheduleStats {
        total_sessions,
        busiest_day,
        average_per_weekday: total_sessions as f64 / 5.0,
        course_counts,
        heatmap,
    }
}

/// First four characters, with `...` when the name is longer.
pub fn short_name(name: &str) -> String {
    if name.chars().count() > 4 {
        let head: String = name.chars().take(4).collect();
        format!("{}...", head)
    } else {
        name.to_string()
    }
}
