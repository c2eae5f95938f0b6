use irrigation_api::{Id, LimitResponse, LimitSettings};
use serde::{Deserialize, Serialize};

use super::Table;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Limit {
    pub id: Id,
    pub soil_moisture_upper_limit: f64,
    pub soil_moisture_lower_limit: f64,
    pub water_level_limit: f64,
}

impl Limit {
    pub fn new(id: Id, settings: &LimitSettings) -> Self {
        Self {
            id,
            soil_moisture_upper_limit: settings.soil_moisture_upper_limit,
            soil_moisture_lower_limit: settings.soil_moisture_lower_limit,
            water_level_limit: settings.water_level_limit,
        }
    }

    pub fn settings(&self) -> LimitSettings {
        LimitSettings {
            soil_moisture_upper_limit: self.soil_moisture_upper_limit,
            soil_moisture_lower_limit: self.soil_moisture_lower_limit,
            water_level_limit: self.water_level_limit,
        }
    }
}

impl From<Limit> for LimitResponse {
    fn from(limit: Limit) -> Self {
        Self {
            id: limit.id,
            soil_moisture_upper_limit: limit.soil_moisture_upper_limit,
            soil_moisture_lower_limit: limit.soil_moisture_lower_limit,
            water_level_limit: limit.water_level_limit,
        }
    }
}

#[derive(Clone)]
pub struct LimitTable;

impl Table for LimitTable {
    fn name(&self) -> &'static str {
        "limits"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS limits (
                id INTEGER PRIMARY KEY,
                soil_moisture_upper_limit REAL NOT NULL,
                soil_moisture_lower_limit REAL NOT NULL,
                water_level_limit REAL NOT NULL
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS limits;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec![]
    }
}
