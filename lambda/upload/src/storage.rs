use anyhow::Context;
use async_trait::async_trait;
use aws_sdk_dynamodb::Client as DynamoClient;
use aws_sdk_s3::Client as S3Client;

use crate::record::Item;

#[async_trait]
pub trait ObjectSource: Send + Sync {
    async fn get_object(&self, bucket: &str, key: &str) -> anyhow::Result<Vec<u8>>;
}

#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn put_record(&self, item: Item) -> anyhow::Result<()>;
}

#[derive(Clone, Debug)]
pub struct S3Objects {
    inner: S3Client,
}

impl S3Objects {
    pub fn new(inner: S3Client) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ObjectSource for S3Objects {
    #[tracing::instrument(skip(self))]
    async fn get_object(&self, bucket: &str, key: &str) -> anyhow::Result<Vec<u8>> {
        let resp = self
            .inner
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .context(format!("could not get item {key} from bucket {bucket}"))?;

        let body = resp
            .body
            .collect()
            .await
            .context("could not collect body")?;
        Ok(body.into_bytes().to_vec())
    }
}

#[derive(Clone, Debug)]
pub struct DynamoRecordTable {
    client: DynamoClient,
    table: String,
}

impl DynamoRecordTable {
    pub fn new(client: DynamoClient, table: &str) -> Self {
        Self {
            client,
            table: table.to_string(),
        }
    }
}

#[async_trait]
impl RecordSink for DynamoRecordTable {
    async fn put_record(&self, item: Item) -> anyhow::Result<()> {
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(item))
            .send()
            .await
            .context(format!("could not put item into table {}", self.table))?;
        Ok(())
    }
}
