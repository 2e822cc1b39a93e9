use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Problems with an uploaded or persisted timetable.
/// Rows are counted from 1, header excluded.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("row {row}: unknown day {value:?}")]
    InvalidDay { row: usize, value: String },

    #[error("row {row}: {field} must be HH:MM, got {value:?}")]
    InvalidTime {
        row: usize,
        field: &'static str,
        value: String,
    },

    #[error("row {row}: period must be an integer, got {value:?}")]
    InvalidPeriod { row: usize, value: String },

    #[error("malformed table: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Schedule not found")]
    NotFound,

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Delivery via {channel} failed: {message}")]
    Delivery { channel: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Internal server error")]
    InternalServerError,
}

impl AppError {
    pub fn delivery(channel: &str, message: impl Into<String>) -> Self {
        AppError::Delivery {
            channel: channel.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not Found".to_string()),
            AppError::Schema(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Io(e) => {
                error!("io error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Storage error occurred".to_string(),
                )
            }
            AppError::Storage(msg) => {
                error!("storage error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Storage error occurred".to_string(),
                )
            }
            AppError::Delivery { channel, message } => {
                error!("delivery via {} failed: {}", channel, message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Delivery error occurred".to_string(),
                )
            }
            AppError::Config(msg) => {
                error!("config error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            message: error_message,
        });

        (status, body).into_response()
    }
}
