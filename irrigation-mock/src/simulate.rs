use std::f64::consts::PI;

const MEAN_TEMPERATURE: f64 = 18.0;
const TEMPERATURE_SWING: f64 = 7.0;

const BASE_DRYING: f64 = 0.2;
const PUMP_SOIL_GAIN: f64 = 3.0;
const PUMP_WATER_DRAW: f64 = 1.5;

/// Air temperature in Celsius: coolest at 03:00, warmest at 15:00.
pub fn simulated_temperature(day_fraction: f64) -> f64 {
    let radians = (day_fraction - 0.375) * 2.0 * PI;

    MEAN_TEMPERATURE + radians.sin() * TEMPERATURE_SWING
}

/// Soil moisture lost over one sample interval; warm air dries faster.
pub fn soil_drying_rate(temperature: f64) -> f64 {
    BASE_DRYING + (temperature - 10.0).max(0.0) * 0.02
}

pub fn dry_soil(soil_moisture: f64, temperature: f64) -> f64 {
    (soil_moisture - soil_drying_rate(temperature)).clamp(0.0, 100.0)
}

pub fn water_soil(soil_moisture: f64) -> f64 {
    (soil_moisture + PUMP_SOIL_GAIN).min(100.0)
}

pub fn draw_reservoir(water_level: f64) -> f64 {
    (water_level - PUMP_WATER_DRAW).max(0.0)
}

/// Fraction of the UTC day elapsed, in `[0, 1)`.
pub fn day_fraction(now: time::OffsetDateTime) -> f64 {
    let (hour, minute, second) = now.to_offset(time::UtcOffset::UTC).time().as_hms();
    let seconds = hour as u32 * 3600 + minute as u32 * 60 + second as u32;

    seconds as f64 / 86400.0
}
