use std::sync::Arc;

use irrigation_api::Id;
use sqlx::{Error, Sqlite, Transaction};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use crate::configs::Storage;
use crate::models::SensorSample;

/// Inclusive `created_at` bounds shared by page and count queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleFilter {
    pub start: Option<OffsetDateTime>,
    pub end: Option<OffsetDateTime>,
}

impl SampleFilter {
    pub fn new(start: Option<OffsetDateTime>, end: Option<OffsetDateTime>) -> Self {
        Self {
            start: start.map(|t| t.to_offset(UtcOffset::UTC)),
            end: end.map(|t| t.to_offset(UtcOffset::UTC)),
        }
    }

    fn stored_bounds(&self) -> Result<(Option<String>, Option<String>), Error> {
        Ok((
            self.start.map(stored_timestamp).transpose()?,
            self.end.map(stored_timestamp).transpose()?,
        ))
    }
}

/// Fixed-width UTC text, so comparing and ordering the column follows time order.
const STORED_TIMESTAMP: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:9]Z");

fn stored_timestamp(value: OffsetDateTime) -> Result<String, Error> {
    value
        .to_offset(UtcOffset::UTC)
        .format(STORED_TIMESTAMP)
        .map_err(|e| Error::Encode(Box::new(e)))
}

pub struct SensorSampleRepository {
    storage: Arc<Storage>,
}

impl SensorSampleRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }
}

impl SensorSampleRepository {
    // Append a sample, the id field of `item` is ignored
    pub async fn create(
        &self,
        item: &SensorSample,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<Id, Error> {
        let id = sqlx::query(
            r#"
            INSERT INTO sensor_data (temperature, soil_moisture, water_level, device_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(item.temperature)
        .bind(item.soil_moisture)
        .bind(item.water_level)
        .bind(&item.device_id)
        .bind(stored_timestamp(item.created_at)?)
        .execute(&mut **transaction)
        .await?
        .last_insert_rowid();

        Ok(id)
    }

    pub async fn find_by_id(&self, id: Id) -> Result<Option<SensorSample>, Error> {
        let sample: Option<SensorSample> =
            sqlx::query_as("SELECT * FROM sensor_data WHERE id = $1")
                .bind(id)
                .fetch_optional(self.storage.get_pool())
                .await?;

        Ok(sample)
    }

    // Newest first, ties broken by insertion order
    pub async fn find_page(
        &self,
        filter: &SampleFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SensorSample>, Error> {
        let (start, end) = filter.stored_bounds()?;
        let samples: Vec<SensorSample> = sqlx::query_as(
            r#"
            SELECT * FROM sensor_data
            WHERE ($1 IS NULL OR created_at >= $1) AND ($2 IS NULL OR created_at <= $2)
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(start)
        .bind(end)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.storage.get_pool())
        .await?;

        Ok(samples)
    }

    pub async fn count(&self, filter: &SampleFilter) -> Result<i64, Error> {
        let (start, end) = filter.stored_bounds()?;
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM sensor_data
            WHERE ($1 IS NULL OR created_at >= $1) AND ($2 IS NULL OR created_at <= $2)
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(self.storage.get_pool())
        .await?;

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use time::Duration;
    use time::macros::datetime;

    use super::*;
    use crate::tests::{create_test_sample, setup_test_storage};

    #[tokio::test]
    async fn test_create_and_find_sample() {
        let storage = setup_test_storage().await;
        let repo = SensorSampleRepository::new(storage.clone());
        let created_at = datetime!(2024-05-01 12:00:00 UTC);

        let sample = SensorSample {
            id: 0,
            temperature: 23.5,
            soil_moisture: 42.0,
            water_level: 77.0,
            device_id: "esp-1".to_string(),
            created_at,
        };

        let mut tx = storage.get_pool().begin().await.unwrap();
        let id = repo.create(&sample, &mut tx).await.unwrap();
        tx.commit().await.unwrap();

        let found = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.temperature, 23.5);
        assert_eq!(found.soil_moisture, 42.0);
        assert_eq!(found.water_level, 77.0);
        assert_eq!(found.device_id, "esp-1");
        assert_eq!(found.created_at, created_at);
    }

    #[tokio::test]
    async fn test_find_page_is_newest_first() {
        let storage = setup_test_storage().await;
        let base = datetime!(2024-05-01 12:00:00 UTC);
        for minutes in [0, 10, 5] {
            create_test_sample(
                storage.clone(),
                "esp-1",
                minutes as f64,
                base + Duration::minutes(minutes),
            )
            .await;
        }

        let repo = SensorSampleRepository::new(storage.clone());
        let page = repo.find_page(&SampleFilter::default(), 10, 0).await.unwrap();

        let moistures: Vec<f64> = page.iter().map(|s| s.soil_moisture).collect();
        assert_eq!(moistures, vec![10.0, 5.0, 0.0]);
    }

    #[tokio::test]
    async fn test_filter_bounds_are_inclusive() {
        let storage = setup_test_storage().await;
        let base = datetime!(2024-05-01 12:00:00 UTC);
        for minutes in 0..5 {
            create_test_sample(
                storage.clone(),
                "esp-1",
                minutes as f64,
                base + Duration::minutes(minutes),
            )
            .await;
        }

        let repo = SensorSampleRepository::new(storage.clone());
        let filter = SampleFilter::new(
            Some(base + Duration::minutes(1)),
            Some(base + Duration::minutes(3)),
        );

        let page = repo.find_page(&filter, 100, 0).await.unwrap();
        let total = repo.count(&filter).await.unwrap();

        assert_eq!(total, 3);
        let moistures: Vec<f64> = page.iter().map(|s| s.soil_moisture).collect();
        assert_eq!(moistures, vec![3.0, 2.0, 1.0]);
    }

    #[tokio::test]
    async fn test_filter_normalizes_offsets() {
        let storage = setup_test_storage().await;
        let base = datetime!(2024-05-01 12:00:00 UTC);
        create_test_sample(storage.clone(), "esp-1", 1.0, base).await;

        let repo = SensorSampleRepository::new(storage.clone());
        // 14:00 at +02:00 is 12:00 UTC
        let filter = SampleFilter::new(Some(datetime!(2024-05-01 14:00:00 +2)), None);

        assert_eq!(repo.count(&filter).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_page_past_end_is_empty() {
        let storage = setup_test_storage().await;
        let base = datetime!(2024-05-01 12:00:00 UTC);
        for minutes in 0..3 {
            create_test_sample(storage.clone(), "esp-2", 50.0, base + Duration::minutes(minutes))
                .await;
        }

        let repo = SensorSampleRepository::new(storage.clone());
        let page = repo.find_page(&SampleFilter::default(), 10, 3).await.unwrap();

        assert!(page.is_empty());
        assert_eq!(repo.count(&SampleFilter::default()).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_subsecond_samples_keep_time_order() {
        let storage = setup_test_storage().await;
        let second = datetime!(2024-05-01 12:00:00 UTC);
        create_test_sample(storage.clone(), "esp-1", 1.0, second + Duration::milliseconds(500))
            .await;
        create_test_sample(storage.clone(), "esp-1", 2.0, second + Duration::milliseconds(550))
            .await;

        let repo = SensorSampleRepository::new(storage.clone());
        let page = repo.find_page(&SampleFilter::default(), 10, 0).await.unwrap();
        let moistures: Vec<f64> = page.iter().map(|s| s.soil_moisture).collect();
        assert_eq!(moistures, vec![2.0, 1.0]);
        assert_eq!(page[0].created_at, second + Duration::milliseconds(550));

        let from_second = SampleFilter::new(Some(second), None);
        assert_eq!(repo.count(&from_second).await.unwrap(), 2);

        let until_second = SampleFilter::new(None, Some(second));
        assert_eq!(repo.count(&until_second).await.unwrap(), 0);

        let around = SampleFilter::new(
            Some(second + Duration::milliseconds(500)),
            Some(second + Duration::milliseconds(520)),
        );
        let page = repo.find_page(&around, 10, 0).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].soil_moisture, 1.0);
    }
}
