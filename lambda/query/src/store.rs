use anyhow::Context;
use async_trait::async_trait;
use aws_sdk_dynamodb::operation::scan::ScanOutput;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use std::collections::HashMap;

pub type Item = HashMap<String, AttributeValue>;

#[async_trait]
pub trait RecordTable: Send + Sync {
    // single scan call, later pages are not fetched
    async fn scan(&self) -> anyhow::Result<Vec<Item>>;
}

#[derive(Clone, Debug)]
pub struct DynamoRecordTable {
    client: Client,
    table: String,
}

impl DynamoRecordTable {
    pub fn new(client: Client, table: &str) -> Self {
        Self {
            client,
            table: table.to_string(),
        }
    }
}

#[async_trait]
impl RecordTable for DynamoRecordTable {
    #[tracing::instrument(skip(self), fields(table = %self.table))]
    async fn scan(&self) -> anyhow::Result<Vec<Item>> {
        let output = self
            .client
            .scan()
            .table_name(&self.table)
            .send()
            .await
            .context(format!("could not scan table {}", self.table))?;

        let page = first_page(output);
        if page.truncated {
            tracing::warn!("scan result truncated, later pages are not read");
        }
        tracing::debug!(count = page.items.len(), "scanned table");
        Ok(page.items)
    }
}

#[derive(Debug, PartialEq)]
pub(crate) struct ScanPage {
    pub items: Vec<Item>,
    pub truncated: bool,
}

/// Keeps the items of one scan response and notes whether the table has more.
pub(crate) fn first_page(output: ScanOutput) -> ScanPage {
    let truncated = output.last_evaluated_key().is_some();
    ScanPage {
        items: output.items.unwrap_or_default(),
        truncated,
    }
}
