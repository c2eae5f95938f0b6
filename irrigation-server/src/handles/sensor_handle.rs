use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use irrigation_api::{DEFAULT_PAGE_LIMIT, Pagination, SensorDataPage, SensorDataQuery};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

use crate::errors::{ApiError, SensorDataError};
use crate::repositories::{SampleFilter, SensorSampleRepository};

#[derive(Clone)]
pub struct SensorState {
    pub sensor_sample_repository: Arc<SensorSampleRepository>,
}

pub fn sensor_router(sensor_state: SensorState) -> Router {
    Router::new()
        .route("/api/sensor-data", get(get_sensor_data))
        .with_state(sensor_state)
}

#[utoipa::path(
    get,
    path = "/api/sensor-data",
    tag = "sensor",
    params(
        ("limit" = Option<i64>, Query, description = "Page size, defaults to 100"),
        ("offset" = Option<i64>, Query, description = "Rows to skip, defaults to 0"),
        ("startDate" = Option<String>, Query, description = "Inclusive lower bound on createdAt"),
        ("endDate" = Option<String>, Query, description = "Inclusive upper bound on createdAt")
    ),
    responses(
        (status = 200, description = "Samples newest first", body = SensorDataPage),
        (status = 400, description = "Malformed query, invalid date or negative pagination"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_sensor_data(
    State(state): State<SensorState>,
    query: Result<Query<SensorDataQuery>, QueryRejection>,
) -> Result<Json<SensorDataPage>, ApiError> {
    let Query(query) = query.map_err(|e| SensorDataError::InvalidQuery(e.body_text()))?;
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
    let offset = query.offset.unwrap_or(0);
    if limit < 0 || offset < 0 {
        return Err(SensorDataError::InvalidPagination.into());
    }

    let filter = SampleFilter::new(
        parse_date_param(query.start_date.as_deref())?,
        parse_date_param(query.end_date.as_deref())?,
    );

    let total = state.sensor_sample_repository.count(&filter).await?;
    let samples = state
        .sensor_sample_repository
        .find_page(&filter, limit, offset)
        .await?;

    Ok(Json(SensorDataPage {
        data: samples.into_iter().map(Into::into).collect(),
        pagination: Pagination {
            total,
            limit,
            offset,
        },
    }))
}

fn parse_date_param(value: Option<&str>) -> Result<Option<OffsetDateTime>, SensorDataError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_date(value).map(Some),
    }
}

/// Accepts RFC 3339, a bare local date-time (taken as UTC) or a bare date.
fn parse_date(value: &str) -> Result<OffsetDateTime, SensorDataError> {
    if let Ok(datetime) = OffsetDateTime::parse(value, &Rfc3339) {
        return Ok(datetime);
    }

    let with_seconds = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    if let Ok(datetime) = PrimitiveDateTime::parse(value, with_seconds) {
        return Ok(datetime.assume_utc());
    }

    let without_seconds = format_description!("[year]-[month]-[day]T[hour]:[minute]");
    if let Ok(datetime) = PrimitiveDateTime::parse(value, without_seconds) {
        return Ok(datetime.assume_utc());
    }

    let date_only = format_description!("[year]-[month]-[day]");
    Date::parse(value, date_only)
        .map(|date| date.midnight().assume_utc())
        .map_err(|_| SensorDataError::InvalidDate(value.to_string()))
}
