use serde::{Deserialize, Serialize};

/// Payload of `sensor-and-control-status`: the latest reading plus the
/// actuator flags a device needs to act on it.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlStatus {
    pub soil_moisture: f64,
    pub temperature: f64,
    pub water_level: f64,
    pub led_on: bool,
    pub pump_auto_mode: bool,
}
