use irrigation_api::{Id, SensorReading, SensorSampleResponse};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::Table;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SensorSample {
    pub id: Id,
    /// Temperature in Celsius
    pub temperature: f64,
    /// Soil moisture in percent
    pub soil_moisture: f64,
    /// Reservoir level in percent
    pub water_level: f64,
    pub device_id: String,
    /// Reception time, assigned by the relay
    pub created_at: OffsetDateTime,
}

impl SensorSample {
    /// Stamps a device reading with its reception time. The id is assigned on insert.
    pub fn received(reading: SensorReading, created_at: OffsetDateTime) -> Self {
        Self {
            id: 0,
            temperature: reading.temperature,
            soil_moisture: reading.soil_moisture,
            water_level: reading.water_level,
            device_id: reading.device_id,
            created_at,
        }
    }
}

impl From<SensorSample> for SensorSampleResponse {
    fn from(sample: SensorSample) -> Self {
        Self {
            id: sample.id,
            temperature: sample.temperature,
            soil_moisture: sample.soil_moisture,
            water_level: sample.water_level,
            device_id: sample.device_id,
            created_at: sample.created_at,
        }
    }
}

#[derive(Clone)]
pub struct SensorSampleTable;

impl Table for SensorSampleTable {
    fn name(&self) -> &'static str {
        "sensor_data"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS sensor_data (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                temperature REAL NOT NULL,
                soil_moisture REAL NOT NULL,
                water_level REAL NOT NULL,
                device_id TEXT NOT NULL,
                created_at TIMESTAMP NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_sensor_data_created_at ON sensor_data (created_at);
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS sensor_data;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec![]
    }
}
