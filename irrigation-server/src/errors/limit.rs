use axum::http::StatusCode;
use irrigation_api::Id;

#[derive(Debug, thiserror::Error)]
pub enum LimitError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Limit {0} not found")]
    LimitNotFound(Id),
}

impl LimitError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            LimitError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            LimitError::LimitNotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}
