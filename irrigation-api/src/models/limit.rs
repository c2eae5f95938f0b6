use serde::{Deserialize, Serialize};

use super::Id;

pub const DEFAULT_LIMIT_ID: Id = 11;

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitSettings {
    /// Soil moisture above which irrigation stops
    pub soil_moisture_upper_limit: f64,
    /// Soil moisture below which irrigation starts
    pub soil_moisture_lower_limit: f64,
    /// Reservoir level below which the pump is inhibited
    pub water_level_limit: f64,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitResponse {
    pub id: Id,
    pub soil_moisture_upper_limit: f64,
    pub soil_moisture_lower_limit: f64,
    pub water_level_limit: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitQuery {
    pub limit_id: Option<Id>,
}
