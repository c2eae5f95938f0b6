use irrigation_api::{ClientMessage, DeviceRegistration, SensorReading, ServerMessage};
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::settings;
use crate::simulate::{draw_reservoir, dry_soil, simulated_temperature, water_soil};

/// Pump starts below this soil moisture while in auto mode.
const PUMP_START: f64 = 35.0;
/// ...and stops above this one.
const PUMP_STOP: f64 = 65.0;
/// Reservoir level protecting the pump from running dry.
const RESERVOIR_MIN: f64 = 5.0;

const SENSOR_NOISE: f64 = 0.3;

/// Local view of a field unit: what it measures and how its actuators are set.
#[derive(Debug, Clone)]
pub struct SimulatedDevice {
    id: String,
    device_type: String,
    led_on: bool,
    pump_auto_mode: bool,
    pump_running: bool,
    soil_moisture: f64,
    water_level: f64,
}

impl SimulatedDevice {
    pub fn new(settings: &settings::Device) -> Self {
        Self {
            id: settings.id.clone(),
            device_type: settings.device_type.clone(),
            led_on: false,
            pump_auto_mode: false,
            pump_running: false,
            soil_moisture: 55.0,
            water_level: 80.0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn led_on(&self) -> bool {
        self.led_on
    }

    pub fn pump_auto_mode(&self) -> bool {
        self.pump_auto_mode
    }

    pub fn pump_running(&self) -> bool {
        self.pump_running
    }

    pub fn registration(&self) -> ClientMessage {
        ClientMessage::RegisterDevice(DeviceRegistration {
            device_id: self.id.clone(),
            device_type: self.device_type.clone(),
        })
    }

    /// Follows actuator broadcasts. Returns whether local state changed.
    pub fn apply(&mut self, message: &ServerMessage) -> bool {
        match message {
            ServerMessage::LedState(on) if *on != self.led_on => {
                self.led_on = *on;
                tracing::info!("LED switched {}", if *on { "on" } else { "off" });
                true
            }
            ServerMessage::PumpMode(auto) if *auto != self.pump_auto_mode => {
                self.pump_auto_mode = *auto;
                if !auto {
                    self.pump_running = false;
                }
                tracing::info!("Pump mode {}", if *auto { "auto" } else { "manual" });
                true
            }
            _ => false,
        }
    }

    /// Advances soil and reservoir by one sample interval.
    pub fn step(&mut self, temperature: f64) {
        if self.pump_auto_mode {
            if self.soil_moisture < PUMP_START && self.water_level > RESERVOIR_MIN {
                self.pump_running = true;
            } else if self.soil_moisture > PUMP_STOP || self.water_level <= RESERVOIR_MIN {
                self.pump_running = false;
            }
        }

        if self.pump_running {
            self.soil_moisture = water_soil(self.soil_moisture);
            self.water_level = draw_reservoir(self.water_level);
        } else {
            self.soil_moisture = dry_soil(self.soil_moisture, temperature);
        }
    }

    pub fn next_reading<R: Rng + ?Sized>(
        &mut self,
        day_fraction: f64,
        rng: &mut R,
    ) -> SensorReading {
        let temperature = simulated_temperature(day_fraction);
        self.step(temperature);

        let mut noise = || {
            Normal::new(0.0, SENSOR_NOISE)
                .map(|normal| normal.sample(&mut *rng))
                .unwrap_or(0.0)
        };

        SensorReading {
            soil_moisture: round1((self.soil_moisture + noise()).clamp(0.0, 100.0)),
            temperature: round1(temperature + noise()),
            water_level: round1(self.water_level),
            device_id: self.id.clone(),
        }
    }

    #[cfg(test)]
    fn with_levels(mut self, soil_moisture: f64, water_level: f64) -> Self {
        self.soil_moisture = soil_moisture;
        self.water_level = water_level;
        self
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
