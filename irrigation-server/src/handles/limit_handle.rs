use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use irrigation_api::{Id, LimitQuery, LimitResponse};

use crate::errors::{ApiError, LimitError};
use crate::repositories::LimitRepository;

#[derive(Clone)]
pub struct LimitState {
    pub limit_repository: Arc<LimitRepository>,
    /// Row served when the query names none
    pub default_limit_id: Id,
}

pub fn limit_router(limit_state: LimitState) -> Router {
    Router::new()
        .route("/api/limits", get(get_limit))
        .with_state(limit_state)
}

#[utoipa::path(
    get,
    path = "/api/limits",
    tag = "limit",
    params(
        ("limitId" = Option<i64>, Query, description = "Limit row id, defaults to 11")
    ),
    responses(
        (status = 200, description = "Limit row", body = LimitResponse),
        (status = 400, description = "Malformed query"),
        (status = 404, description = "Limit not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_limit(
    State(state): State<LimitState>,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> Result<Json<LimitResponse>, ApiError> {
    let Query(query) = query.map_err(|e| LimitError::InvalidQuery(e.body_text()))?;
    let limit_id = query.limit_id.unwrap_or(state.default_limit_id);

    let limit = state
        .limit_repository
        .find_by_id(limit_id)
        .await?
        .ok_or(LimitError::LimitNotFound(limit_id))?;

    Ok(Json(limit.into()))
}
