use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, SchemaError};
use crate::models::{ClassSession, Schedule, Weekday, format_hhmm, parse_hhmm};

pub const COLUMNS: [&str; 7] = [
    "day",
    "period",
    "start_time",
    "end_time",
    "course_name",
    "location",
    "teacher",
];

/// One CSV row as it sits on disk: every column is text.
#[derive(Debug, Serialize, Deserialize)]
struct SessionRecord {
    day: String,
    period: String,
    start_time: String,
    end_time: String,
    course_name: String,
    location: String,
    teacher: String,
}

impl SessionRecord {
    fn into_session(self, row: usize) -> Result<ClassSession, SchemaError> {
        let day = Weekday::parse(&self.day).ok_or_else(|| SchemaError::InvalidDay {
            row,
            value: self.day.clone(),
        })?;
        let period = self
            .period
            .parse::<i32>()
            .map_err(|_| SchemaError::InvalidPeriod {
                row,
                value: self.period.clone(),
            })?;
        let start_time = parse_hhmm(&self.start_time).ok_or_else(|| SchemaError::InvalidTime {
            row,
            field: "start_time",
            value: self.start_time.clone(),
        })?;
        let end_time = parse_hhmm(&self.end_time).ok_or_else(|| SchemaError::InvalidTime {
            row,
            field: "end_time",
            value: self.end_time.clone(),
        })?;

        Ok(ClassSession {
            day,
            period,
            start_time,
            end_time,
            course_name: self.course_name,
            location: self.location,
            teacher: self.teacher,
        })
    }
}

impl From<&ClassSession> for SessionRecord {
    fn from(session: &ClassSession) -> Self {
        Self {
            day: session.day.to_string(),
            period: session.period.to_string(),
            start_time: format_hhmm(session.start_time),
            end_time: format_hhmm(session.end_time),
            course_name: session.course_name.clone(),
            location: session.location.clone(),
            teacher: session.teacher.clone(),
        }
    }
}

/// Parse a whole timetable, header row first. Extra columns are ignored;
/// absent required columns are reported together.
pub fn parse_schedule<R: Read>(reader: R) -> Result<Schedule, SchemaError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| SchemaError::Malformed(e.to_string()))?
        .clone();

    let missing: Vec<String> = COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|h| h == **column))
        .map(|column| column.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(SchemaError::MissingColumns(missing));
    }

    let mut sessions = Vec::new();
    for (idx, record) in rdr.deserialize::<SessionRecord>().enumerate() {
        let row = idx + 1;
        let record = record.map_err(|e| SchemaError::Malformed(format!("row {}: {}", row, e)))?;
        sessions.push(record.into_session(row)?);
    }

    Ok(Schedule::new(sessions))
}

/// Serialize a timetable. The header is written even for an empty table.
pub fn encode_schedule(schedule: &Schedule) -> Result<Vec<u8>, AppError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    wtr.write_record(COLUMNS)
        .map_err(|e| AppError::Storage(format!("Failed to write header: {}", e)))?;
    for session in schedule {
        wtr.serialize(SessionRecord::from(session))
            .map_err(|e| AppError::Storage(format!("Failed to write row: {}", e)))?;
    }

    wtr.into_inner()
        .map_err(|e| AppError::Storage(format!("Failed to flush table: {}", e)))
}
