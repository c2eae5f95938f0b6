use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRegistration {
    /// Identifier the field unit reports for itself
    pub device_id: String,
    /// Free-form hardware description, e.g. `esp32`
    pub device_type: String,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    /// Realtime connection the device registered on
    pub connection_id: Uuid,
    /// Identifier the field unit reports for itself
    pub device_id: String,
    /// Free-form hardware description
    pub device_type: String,
    /// Last registration or sample from this device
    #[serde(with = "time::serde::rfc3339")]
    pub last_seen: OffsetDateTime,
    /// Whether the registering connection is still open
    pub connected: bool,
    /// When the registering connection closed
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub disconnected_at: Option<OffsetDateTime>,
}
