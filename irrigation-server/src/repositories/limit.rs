use std::sync::Arc;

use irrigation_api::Id;
use sqlx::{Error, Sqlite, Transaction};

use crate::configs::Storage;
use crate::models::Limit;

pub struct LimitRepository {
    storage: Arc<Storage>,
}

impl LimitRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub async fn find_by_id(&self, id: Id) -> Result<Option<Limit>, Error> {
        let limit: Option<Limit> = sqlx::query_as("SELECT * FROM limits WHERE id = $1")
            .bind(id)
            .fetch_optional(self.storage.get_pool())
            .await?;

        Ok(limit)
    }

    // Insert or overwrite the row with `item.id`
    pub async fn upsert(
        &self,
        item: &Limit,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO limits
                (id, soil_moisture_upper_limit, soil_moisture_lower_limit, water_level_limit)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT(id) DO UPDATE SET
                soil_moisture_upper_limit = excluded.soil_moisture_upper_limit,
                soil_moisture_lower_limit = excluded.soil_moisture_lower_limit,
                water_level_limit = excluded.water_level_limit
            "#,
        )
        .bind(item.id)
        .bind(item.soil_moisture_upper_limit)
        .bind(item.soil_moisture_lower_limit)
        .bind(item.water_level_limit)
        .execute(&mut **transaction)
        .await?;

        Ok(())
    }
}
