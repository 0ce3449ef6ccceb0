use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::error::StoreError;
use crate::gas::{Measurement, Refill};
use crate::store::{Order, TimeSeriesStore};

pub async fn new_pool(database_url: &str) -> Result<PgPool, StoreError> {
    PgPoolOptions::new()
        .connect(database_url)
        .await
        .map_err(|source| StoreError::Connect { source })
}

/// Postgres-backed [`TimeSeriesStore`].
///
/// `measurements` and `refills` are keyed by `time`, so the primary key index
/// gives the ordered-set behavior the pipeline relies on.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        Ok(Self::new(new_pool(database_url).await?))
    }

    /// Defers connecting until the first query, so readers can start while
    /// the database is down.
    pub fn connect_lazy(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .connect_lazy(database_url)
            .map_err(|source| StoreError::Connect { source })?;
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!()
            .run(&self.pool)
            .await
            .map_err(|source| StoreError::Migrate { source })
    }

    pub async fn bulk_insert_measurements(
        &self,
        measurements: &[Measurement],
    ) -> Result<(), StoreError> {
        if measurements.is_empty() {
            return Ok(());
        }

        let times: Vec<f64> = measurements.iter().map(|m| m.time).collect();
        let time_as_texts: Vec<&str> = measurements
            .iter()
            .map(|m| m.time_as_text.as_str())
            .collect();
        let temperatures: Vec<i32> = measurements.iter().map(|m| m.temperature).collect();
        let levels: Vec<f64> = measurements.iter().map(|m| m.level).collect();
        let liters: Vec<i64> = measurements.iter().map(|m| m.liters).collect();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|source| query_error("begin measurement transaction", source))?;

        sqlx::query(
            r#"
            INSERT INTO measurements (time, time_as_text, temperature, level, liters)
            SELECT * FROM UNNEST($1::FLOAT8[], $2::TEXT[], $3::INT4[], $4::FLOAT8[], $5::INT8[])
            ON CONFLICT (time) DO NOTHING
            "#,
        )
        .bind(&times)
        .bind(&time_as_texts)
        .bind(&temperatures)
        .bind(&levels)
        .bind(&liters)
        .execute(&mut *tx)
        .await
        .map_err(|source| query_error("bulk insert measurements", source))?;

        tx.commit()
            .await
            .map_err(|source| query_error("commit measurement transaction", source))?;

        Ok(())
    }

    pub async fn bulk_insert_refills(&self, refills: &[Refill]) -> Result<(), StoreError> {
        if refills.is_empty() {
            return Ok(());
        }

        let times: Vec<f64> = refills.iter().map(|r| r.time).collect();
        let time_as_texts: Vec<&str> = refills.iter().map(|r| r.time_as_text.as_str()).collect();
        let levels: Vec<f64> = refills.iter().map(|r| r.level).collect();
        let liters: Vec<i64> = refills.iter().map(|r| r.liters).collect();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|source| query_error("begin refill transaction", source))?;

        sqlx::query(
            r#"
            INSERT INTO refills (time, time_as_text, level, liters)
            SELECT * FROM UNNEST($1::FLOAT8[], $2::TEXT[], $3::FLOAT8[], $4::INT8[])
            ON CONFLICT (time) DO NOTHING
            "#,
        )
        .bind(&times)
        .bind(&time_as_texts)
        .bind(&levels)
        .bind(&liters)
        .execute(&mut *tx)
        .await
        .map_err(|source| query_error("bulk insert refills", source))?;

        tx.commit()
            .await
            .map_err(|source| query_error("commit refill transaction", source))?;

        Ok(())
    }
}

fn query_error(operation: &'static str, source: sqlx::Error) -> StoreError {
    StoreError::Query { operation, source }
}

fn limit(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[async_trait]
impl TimeSeriesStore for PgStore {
    async fn insert_measurement(&self, measurement: &Measurement) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO measurements (time, time_as_text, temperature, level, liters)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (time) DO NOTHING
            "#,
        )
        .bind(measurement.time)
        .bind(&measurement.time_as_text)
        .bind(measurement.temperature)
        .bind(measurement.level)
        .bind(measurement.liters)
        .execute(&self.pool)
        .await
        .map_err(|source| query_error("insert measurement", source))?;

        Ok(())
    }

    async fn insert_refill(&self, refill: &Refill) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO refills (time, time_as_text, level, liters)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (time) DO NOTHING
            "#,
        )
        .bind(refill.time)
        .bind(&refill.time_as_text)
        .bind(refill.level)
        .bind(refill.liters)
        .execute(&self.pool)
        .await
        .map_err(|source| query_error("insert refill", source))?;

        Ok(())
    }

    async fn latest_measurements(&self, n: usize) -> Result<Vec<Measurement>, StoreError> {
        sqlx::query_as::<_, Measurement>(
            r#"
            SELECT time, time_as_text, temperature, level, liters
            FROM measurements
            ORDER BY time DESC
            LIMIT $1
            "#,
        )
        .bind(limit(n))
        .fetch_all(&self.pool)
        .await
        .map_err(|source| query_error("get latest measurements", source))
    }

    async fn latest_refills(&self, n: usize) -> Result<Vec<Refill>, StoreError> {
        sqlx::query_as::<_, Refill>(
            r#"
            SELECT time, time_as_text, level, liters
            FROM refills
            ORDER BY time DESC
            LIMIT $1
            "#,
        )
        .bind(limit(n))
        .fetch_all(&self.pool)
        .await
        .map_err(|source| query_error("get latest refills", source))
    }

    async fn measurements_between(
        &self,
        low: f64,
        high: f64,
        order: Order,
    ) -> Result<Vec<Measurement>, StoreError> {
        let sql = match order {
            Order::Ascending => {
                r#"
                SELECT time, time_as_text, temperature, level, liters
                FROM measurements
                WHERE time BETWEEN $1 AND $2
                ORDER BY time ASC
                "#
            }
            Order::Descending => {
                r#"
                SELECT time, time_as_text, temperature, level, liters
                FROM measurements
                WHERE time BETWEEN $1 AND $2
                ORDER BY time DESC
                "#
            }
        };

        sqlx::query_as::<_, Measurement>(sql)
            .bind(low)
            .bind(high)
            .fetch_all(&self.pool)
            .await
            .map_err(|source| query_error("get measurements in range", source))
    }

    async fn refills_between(
        &self,
        low: f64,
        high: f64,
        order: Order,
    ) -> Result<Vec<Refill>, StoreError> {
        let sql = match order {
            Order::Ascending => {
                r#"
                SELECT time, time_as_text, level, liters
                FROM refills
                WHERE time BETWEEN $1 AND $2
                ORDER BY time ASC
                "#
            }
            Order::Descending => {
                r#"
                SELECT time, time_as_text, level, liters
                FROM refills
                WHERE time BETWEEN $1 AND $2
                ORDER BY time DESC
                "#
            }
        };

        sqlx::query_as::<_, Refill>(sql)
            .bind(low)
            .bind(high)
            .fetch_all(&self.pool)
            .await
            .map_err(|source| query_error("get refills in range", source))
    }
}
