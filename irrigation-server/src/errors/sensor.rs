use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum SensorDataError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Limit and offset must not be negative")]
    InvalidPagination,
}

impl SensorDataError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SensorDataError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            SensorDataError::InvalidDate(_) => StatusCode::BAD_REQUEST,
            SensorDataError::InvalidPagination => StatusCode::BAD_REQUEST,
        }
    }
}
