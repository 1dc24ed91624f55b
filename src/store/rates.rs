//! Daily exchange-rate samples, keyed uniquely by calendar day.

use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::params;
use serde::{Deserialize, Serialize};

use super::{SqliteStore, StoreError};
use crate::clock::DateRange;

const DATE_FMT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateSample {
    pub date: NaiveDate,
    /// Target-currency units per one base-currency unit (IRR per USD).
    pub rate: f64,
}

#[async_trait]
pub trait RateStore: Send + Sync {
    /// Insert the sample, overwriting any existing row for the same date.
    async fn upsert(&self, sample: RateSample) -> Result<(), StoreError>;

    /// Most recent sample by date, if any.
    async fn latest(&self) -> Result<Option<RateSample>, StoreError>;

    /// All samples with `range.from <= date <= range.to`, storage order.
    async fn in_range(&self, range: DateRange) -> Result<Vec<RateSample>, StoreError>;
}

#[async_trait]
impl RateStore for SqliteStore {
    async fn upsert(&self, sample: RateSample) -> Result<(), StoreError> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO exchange_rates (date, rate) VALUES (?1, ?2)
             ON CONFLICT(date) DO UPDATE SET rate = excluded.rate",
            params![sample.date.format(DATE_FMT).to_string(), sample.rate],
        )?;
        Ok(())
    }

    async fn latest(&self) -> Result<Option<RateSample>, StoreError> {
        let conn = self.lock();
        let mut stmt =
            conn.prepare("SELECT date, rate FROM exchange_rates ORDER BY date DESC LIMIT 1")?;
        let mut rows = stmt.query([])?;
        match rows.next()? {
            Some(row) => {
                let date: String = row.get(0)?;
                let rate: f64 = row.get(1)?;
                Ok(Some(RateSample {
                    date: NaiveDate::parse_from_str(&date, DATE_FMT)?,
                    rate,
                }))
            }
            None => Ok(None),
        }
    }

    async fn in_range(&self, range: DateRange) -> Result<Vec<RateSample>, StoreError> {
        let conn = self.lock();
        let mut stmt =
            conn.prepare("SELECT date, rate FROM exchange_rates WHERE date BETWEEN ?1 AND ?2")?;
        let mapped = stmt.query_map(
            params![
                range.from.format(DATE_FMT).to_string(),
                range.to.format(DATE_FMT).to_string()
            ],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?)),
        )?;

        let mut out = Vec::new();
        for row in mapped {
            let (date, rate) = row?;
            out.push(RateSample {
                date: NaiveDate::parse_from_str(&date, DATE_FMT)?,
                rate,
            });
        }
        Ok(out)
    }
}
