use aws_sdk_dynamodb::types::AttributeValue;

use crate::attribute_json::{item_to_json, JsonRecord};
use crate::store::{Item, RecordTable};

pub const UPLOAD_TIME: &str = "upload_time";

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("{0:#}")]
    Scan(#[from] anyhow::Error),
    #[error("upload_time is not a number: {0:?}")]
    InvalidUploadTime(AttributeValue),
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("unsupported attribute type")]
    UnsupportedAttribute,
    #[error("could not serialize records: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[tracing::instrument(skip(table))]
pub async fn latest_batch<T>(table: &T) -> Result<Vec<JsonRecord>, QueryError>
where
    T: RecordTable + ?Sized,
{
    let items = table.scan().await?;
    tracing::info!(scanned = items.len(), "scanned records");

    filter_latest(items)?.iter().map(item_to_json).collect()
}

/// Keeps the items whose upload time equals the largest one present.
pub fn filter_latest(items: Vec<Item>) -> Result<Vec<Item>, QueryError> {
    let times = items
        .iter()
        .map(upload_time)
        .collect::<Result<Vec<_>, _>>()?;

    let Some(latest) = times.iter().copied().reduce(f64::max) else {
        return Ok(Vec::new());
    };

    Ok(items
        .into_iter()
        .zip(times)
        .filter(|(_, time)| *time == latest)
        .map(|(item, _)| item)
        .collect())
}

/// A record without an upload time counts as uploaded at 0.
fn upload_time(item: &Item) -> Result<f64, QueryError> {
    match item.get(UPLOAD_TIME) {
        None => Ok(0.0),
        Some(AttributeValue::N(n)) => n
            .parse()
            .map_err(|_| QueryError::InvalidNumber(n.clone())),
        Some(other) => Err(QueryError::InvalidUploadTime(other.clone())),
    }
}
