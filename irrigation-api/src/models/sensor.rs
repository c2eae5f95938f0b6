use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::Id;

pub const DEFAULT_PAGE_LIMIT: i64 = 100;

/// One reading as sent by a field device.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    /// Soil moisture in percent
    pub soil_moisture: f64,
    /// Air temperature in Celsius
    pub temperature: f64,
    /// Reservoir level in percent
    pub water_level: f64,
    pub device_id: String,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorSampleResponse {
    pub id: Id,
    pub temperature: f64,
    pub soil_moisture: f64,
    pub water_level: f64,
    pub device_id: String,
    /// Server-assigned reception time
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Number of samples matching the date filter
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorDataPage {
    /// Newest first
    pub data: Vec<SensorSampleResponse>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorDataQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    /// Inclusive lower bound on `createdAt`
    pub start_date: Option<String>,
    /// Inclusive upper bound on `createdAt`
    pub end_date: Option<String>,
}
