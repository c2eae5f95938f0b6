use serde::{Deserialize, Serialize};

use crate::models::{ControlStatus, DeviceInfo, DeviceRegistration, LimitSettings, SensorReading};

/// Frames browsers and field devices send to the relay.
///
/// Encoded as `{"event": "<name>", "data": <payload>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Announce the sending connection as a field device
    RegisterDevice(DeviceRegistration),
    /// Desired LED state (absolute, not a delta)
    ToggleLed(bool),
    /// `true` lets the device run the pump from its limits
    TogglePumpMode(bool),
    #[serde(rename = "toggle-reservoir1")]
    ToggleReservoir1(bool),
    #[serde(rename = "toggle-reservoir2")]
    ToggleReservoir2(bool),
    SensorSample(SensorReading),
    SetLimit(LimitSettings),
}

impl ClientMessage {
    pub fn event_name(&self) -> &'static str {
        match self {
            ClientMessage::RegisterDevice(_) => "register-device",
            ClientMessage::ToggleLed(_) => "toggle-led",
            ClientMessage::TogglePumpMode(_) => "toggle-pump-mode",
            ClientMessage::ToggleReservoir1(_) => "toggle-reservoir1",
            ClientMessage::ToggleReservoir2(_) => "toggle-reservoir2",
            ClientMessage::SensorSample(_) => "sensor-sample",
            ClientMessage::SetLimit(_) => "set-limit",
        }
    }
}

/// Frames the relay pushes to connected parties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerMessage {
    LedState(bool),
    PumpMode(bool),
    #[serde(rename = "reservoir1-state")]
    Reservoir1State(bool),
    #[serde(rename = "reservoir2-state")]
    Reservoir2State(bool),
    /// Full registry, sent once to a freshly opened connection
    ConnectedDevices(Vec<DeviceInfo>),
    /// Full registry, broadcast after every registry change
    DeviceUpdate(Vec<DeviceInfo>),
    SensorAndControlStatus(ControlStatus),
}

impl ServerMessage {
    pub fn event_name(&self) -> &'static str {
        match self {
            ServerMessage::LedState(_) => "led-state",
            ServerMessage::PumpMode(_) => "pump-mode",
            ServerMessage::Reservoir1State(_) => "reservoir1-state",
            ServerMessage::Reservoir2State(_) => "reservoir2-state",
            ServerMessage::ConnectedDevices(_) => "connected-devices",
            ServerMessage::DeviceUpdate(_) => "device-update",
            ServerMessage::SensorAndControlStatus(_) => "sensor-and-control-status",
        }
    }
}
