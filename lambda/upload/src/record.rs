use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::HashMap;

pub const RECORD_ID: &str = "record_id";
pub const FILE_NAME: &str = "file_name";
pub const UPLOAD_TIME: &str = "upload_time";

pub type Item = HashMap<String, AttributeValue>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub file_name: String,
    pub upload_time: i64,
}

impl Batch {
    pub fn new(file_name: impl Into<String>, upload_time: i64) -> Self {
        Self {
            file_name: file_name.into(),
            upload_time,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Record {
    pub record_id: String,
    pub columns: Vec<(String, String)>,
}

impl Record {
    pub fn new(columns: Vec<(String, String)>) -> Self {
        Self {
            record_id: uuid::Uuid::new_v4().to_string(),
            columns,
        }
    }

    // metadata attributes overwrite CSV columns of the same name
    pub fn into_item(self, batch: &Batch) -> Item {
        let mut item: Item = self
            .columns
            .into_iter()
            .map(|(column, value)| (column, AttributeValue::S(value)))
            .collect();

        item.insert(RECORD_ID.to_string(), AttributeValue::S(self.record_id));
        item.insert(
            FILE_NAME.to_string(),
            AttributeValue::S(batch.file_name.clone()),
        );
        item.insert(
            UPLOAD_TIME.to_string(),
            AttributeValue::N(batch.upload_time.to_string()),
        );
        item
    }
}

/// Final path segment of an object key.
pub fn file_name_from_key(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}
