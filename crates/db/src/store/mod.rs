use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use bayline_core::errors::DomainError;

pub mod audit;
pub mod documents;
pub mod jobs;
pub mod line_items;
pub mod matrix;
pub mod repair_orders;
pub mod technicians;

/// Errors from the storage layer. Domain failures pass through unchanged so
/// callers can tell a locked document from a broken connection.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Money and multiplier columns are stored as decimal strings. SQLite has no
/// exact numeric type, so the text round-trip is what keeps cents exact.
pub(crate) fn parse_decimal(column: &str, value: String) -> Result<Decimal, StoreError> {
    value
        .parse()
        .map_err(|_| StoreError::Decode(format!("invalid decimal in `{column}`: `{value}`")))
}

pub(crate) fn parse_opt_decimal(
    column: &str,
    value: Option<String>,
) -> Result<Option<Decimal>, StoreError> {
    value.map(|raw| parse_decimal(column, raw)).transpose()
}

pub(crate) fn parse_timestamp(column: &str, value: String) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(&value).map(|timestamp| timestamp.with_timezone(&Utc)).map_err(
        |_| StoreError::Decode(format!("invalid timestamp in `{column}`: `{value}`")),
    )
}

pub(crate) fn parse_opt_timestamp(
    column: &str,
    value: Option<String>,
) -> Result<Option<DateTime<Utc>>, StoreError> {
    value.map(|raw| parse_timestamp(column, raw)).transpose()
}
