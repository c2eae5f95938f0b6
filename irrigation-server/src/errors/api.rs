use super::{LimitError, SensorDataError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Limit error: {0}")]
    LimitError(#[from] LimitError),

    #[error("Sensor data error: {0}")]
    SensorDataError(#[from] SensorDataError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}
