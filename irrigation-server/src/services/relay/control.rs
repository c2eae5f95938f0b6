use irrigation_api::{ControlStatus, LimitSettings, ServerMessage};

use crate::errors::RelayError;
use crate::models::SensorSample;

/// Actuator flags and limits shared by every connected party.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlState {
    led_on: bool,
    pump_auto_mode: bool,
    reservoir1_on: bool,
    reservoir2_on: bool,
    limits: LimitSettings,
}

impl ControlState {
    pub fn with_limits(limits: LimitSettings) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    pub fn led_on(&self) -> bool {
        self.led_on
    }

    pub fn set_led(&mut self, on: bool) {
        self.led_on = on;
    }

    pub fn pump_auto_mode(&self) -> bool {
        self.pump_auto_mode
    }

    pub fn set_pump_auto_mode(&mut self, auto: bool) {
        self.pump_auto_mode = auto;
    }

    pub fn reservoir1_on(&self) -> bool {
        self.reservoir1_on
    }

    pub fn set_reservoir1(&mut self, on: bool) {
        self.reservoir1_on = on;
    }

    pub fn reservoir2_on(&self) -> bool {
        self.reservoir2_on
    }

    pub fn set_reservoir2(&mut self, on: bool) {
        self.reservoir2_on = on;
    }

    pub fn limits(&self) -> LimitSettings {
        self.limits
    }

    pub fn set_limits(&mut self, limits: LimitSettings) {
        self.limits = limits;
    }

    /// Copy handed out to readers outside the relay loop.
    pub fn snapshot(&self) -> ControlState {
        self.clone()
    }

    /// Combined sample and actuator frame sent after each reading.
    pub fn status(&self, sample: &SensorSample) -> ControlStatus {
        ControlStatus {
            soil_moisture: sample.soil_moisture,
            temperature: sample.temperature,
            water_level: sample.water_level,
            led_on: self.led_on,
            pump_auto_mode: self.pump_auto_mode,
        }
    }

    /// One frame per flag, in the order a fresh dashboard renders them.
    pub fn sync_messages(&self) -> Vec<ServerMessage> {
        vec![
            ServerMessage::LedState(self.led_on),
            ServerMessage::PumpMode(self.pump_auto_mode),
            ServerMessage::Reservoir1State(self.reservoir1_on),
            ServerMessage::Reservoir2State(self.reservoir2_on),
        ]
    }
}

pub fn validate_limits(limits: &LimitSettings) -> Result<(), RelayError> {
    let values = [
        ("soilMoistureUpperLimit", limits.soil_moisture_upper_limit),
        ("soilMoistureLowerLimit", limits.soil_moisture_lower_limit),
        ("waterLevelLimit", limits.water_level_limit),
    ];

    for (name, value) in values {
        if !value.is_finite() || value < 0.0 {
            return Err(RelayError::InvalidLimits(format!(
                "{name} must be a non-negative number, got {value}"
            )));
        }
    }

    if limits.soil_moisture_lower_limit > limits.soil_moisture_upper_limit {
        return Err(RelayError::InvalidLimits(format!(
            "lower limit {} exceeds upper limit {}",
            limits.soil_moisture_lower_limit, limits.soil_moisture_upper_limit
        )));
    }

    Ok(())
}
