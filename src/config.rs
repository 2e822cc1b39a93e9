use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::NaiveDateTime;

use crate::clock::FixedClock;
use crate::error::AppError;

#[derive(Clone, Debug)]
pub struct ReminderConfig {
    pub enabled: bool,
    pub interval_secs: u64,
    pub lead_minutes: i64,
    pub email_to: Option<String>,
    pub webhook_url: Option<String>,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub schedule_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub fixed_now: Option<NaiveDateTime>,
    pub response_seed: Option<u64>,
    pub reminder: ReminderConfig,
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let schedule_path = get("SCHEDULE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("schedule_data.csv"));

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| "127.0.0.1:3000".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("BIND_ADDR is invalid: {}", e)))?;

        let fixed_now = match get("FIXED_NOW") {
            Some(raw) => Some(
                FixedClock::parse(&raw)
                    .ok_or_else(|| {
                        AppError::Config(format!("FIXED_NOW must be YYYY-MM-DD HH:MM, got {:?}", raw))
                    })?
                    .0,
            ),
            None => None,
        };

        let response_seed = get("RESPONSE_SEED")
            .map(|raw| parse_number("RESPONSE_SEED", &raw))
            .transpose()?;

        let reminder = ReminderConfig {
            enabled: get("REMINDER_ENABLED")
                .map(|raw| parse_bool("REMINDER_ENABLED", &raw))
                .transpose()?
                .unwrap_or(false),
            interval_secs: get("REMINDER_INTERVAL_SECS")
                .map(|raw| parse_number("REMINDER_INTERVAL_SECS", &raw))
                .transpose()?
                .unwrap_or(60),
            lead_minutes: get("REMINDER_LEAD_MINUTES")
                .map(|raw| parse_number("REMINDER_LEAD_MINUTES", &raw))
                .transpose()?
                .unwrap_or(15),
            email_to: get("REMINDER_EMAIL_TO"),
            webhook_url: get("REMINDER_WEBHOOK_URL"),
        };

        if reminder.interval_secs == 0 {
            return Err(AppError::Config("REMINDER_INTERVAL_SECS must be positive".to_string()));
        }
        if reminder.lead_minutes < 0 {
            return Err(AppError::Config("REMINDER_LEAD_MINUTES must not be negative".to_string()));
        }

        Ok(Self {
            schedule_path,
            bind_addr,
            fixed_now,
            response_seed,
            reminder,
        })
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, AppError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| AppError::Config(format!("{} must be a number, got {:?}", key, raw)))
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(AppError::Config(format!("{} must be a boolean, got {:?}", key, raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig, AppError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).expect("defaults are valid");
        assert_eq!(config.schedule_path, PathBuf::from("schedule_data.csv"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:3000");
        assert!(config.fixed_now.is_none());
        assert!(!config.reminder.enabled);
        assert_eq!(config.reminder.interval_secs, 60);
        assert_eq!(config.reminder.lead_minutes, 15);
        assert!(config.reminder.email_to.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("SCHEDULE_PATH", "/data/timetable.csv"),
            ("FIXED_NOW", "2023-10-23 09:00"),
            ("RESPONSE_SEED", "42"),
            ("REMINDER_ENABLED", "true"),
            ("REMINDER_LEAD_MINUTES", "30"),
            ("REMINDER_WEBHOOK_URL", "http://localhost:9000/hook"),
            ("REMINDER_EMAIL_TO", ""),
        ])
        .expect("valid config");
        assert_eq!(config.schedule_path, PathBuf::from("/data/timetable.csv"));
        assert!(config.fixed_now.is_some());
        assert_eq!(config.response_seed, Some(42));
        assert!(config.reminder.enabled);
        assert_eq!(config.reminder.lead_minutes, 30);
        assert_eq!(config.reminder.webhook_url.as_deref(), Some("http://localhost:9000/hook"));
        assert!(config.reminder.email_to.is_none());
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(config(&[("REMINDER_ENABLED", "maybe")]), Err(AppError::Config(_))));
        assert!(matches!(config(&[("REMINDER_INTERVAL_SECS", "0")]), Err(AppError::Config(_))));
        assert!(matches!(config(&[("FIXED_NOW", "monday")]), Err(AppError::Config(_))));
        assert!(matches!(config(&[("BIND_ADDR", "nowhere")]), Err(AppError::Config(_))));
    }
}
