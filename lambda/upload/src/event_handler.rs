use aws_lambda_events::event::s3::S3Event;
use lambda_runtime::{Error, LambdaEvent};
use serde::Serialize;

use crate::ingest::ingest_csv;
use crate::record::{file_name_from_key, Batch};
use crate::storage::{ObjectSource, RecordSink};

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IngestResponse {
    pub status_code: u16,
    pub body: String,
}

/// Ingests the object named by the first record of the notification.
#[tracing::instrument(skip_all)]
pub(crate) async fn function_handler<O, S>(
    objects: &O,
    table: &S,
    upload_time: i64,
    event: LambdaEvent<S3Event>,
) -> Result<IngestResponse, Error>
where
    O: ObjectSource + ?Sized,
    S: RecordSink + ?Sized,
{
    let records = event.payload.records;
    if records.len() > 1 {
        tracing::warn!(
            record_count = records.len(),
            "only the first notification record is processed"
        );
    }
    let record = records
        .into_iter()
        .next()
        .ok_or("S3 event contained no records")?;

    let bucket = record.s3.bucket.name.ok_or("S3 record has no bucket name")?;
    let raw_key = record.s3.object.key.ok_or("S3 record has no object key")?;
    let key = decode_key(&raw_key)?;
    tracing::info!(bucket = %bucket, key = %key, "received upload");

    let content = objects.get_object(&bucket, &key).await?;
    let batch = Batch::new(file_name_from_key(&key), upload_time);

    match ingest_csv(table, &content, &batch).await {
        Ok(count) => Ok(IngestResponse {
            status_code: 200,
            body: format!(
                "{count} rows from {} processed successfully.",
                batch.file_name
            ),
        }),
        Err(err) if err.is_client_error() => {
            tracing::warn!(error = %err, "rejecting file");
            Ok(IngestResponse {
                status_code: 400,
                body: err.to_string(),
            })
        }
        Err(err) => Err(err.into()),
    }
}

/// S3 notification keys are form-encoded.
fn decode_key(key: &str) -> Result<String, Error> {
    let key = key.replace('+', " ");
    let decoded = urlencoding::decode(&key).map_err(|e| format!("invalid object key: {e}"))?;
    Ok(decoded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{FILE_NAME, UPLOAD_TIME};
    use crate::storage::testing::{InMemoryObjects, InMemoryTable};
    use aws_sdk_dynamodb::types::AttributeValue;
    use lambda_runtime::Context;
    use serde_json::json;

    fn s3_record(bucket: &str, key: &str) -> serde_json::Value {
        json!({
            "eventVersion": "2.0",
            "eventSource": "aws:s3",
            "awsRegion": "us-east-1",
            "eventTime": "1970-01-01T00:00:00.000Z",
            "eventName": "ObjectCreated:Put",
            "userIdentity": { "principalId": "EXAMPLE" },
            "requestParameters": { "sourceIPAddress": "127.0.0.1" },
            "responseElements": {
                "x-amz-request-id": "EXAMPLE123456789",
                "x-amz-id-2": "EXAMPLE123/5678abcdefghijklambdaisawesome/mnopqrstuvwxyzABCDEFGH"
            },
            "s3": {
                "s3SchemaVersion": "1.0",
                "configurationId": "testConfigRule",
                "bucket": {
                    "name": bucket,
                    "ownerIdentity": { "principalId": "EXAMPLE" },
                    "arn": format!("arn:aws:s3:::{bucket}")
                },
                "object": {
                    "key": key,
                    "size": 1024,
                    "eTag": "0123456789abcdef0123456789abcdef",
                    "sequencer": "0A1B2C3D4E5F678901"
                }
            }
        })
    }

    fn event(records: Vec<serde_json::Value>) -> LambdaEvent<S3Event> {
        let payload: S3Event = serde_json::from_value(json!({ "Records": records })).unwrap();
        LambdaEvent::new(payload, Context::default())
    }

    #[tokio::test]
    async fn ingests_uploaded_file() {
        let objects = InMemoryObjects::default().with_object(
            "bucket",
            "uploads/a.csv",
            "id,val\n1,x\n2,y\n",
        );
        let table = InMemoryTable::default();

        let resp = function_handler(
            &objects,
            &table,
            1000,
            event(vec![s3_record("bucket", "uploads/a.csv")]),
        )
        .await
        .unwrap();

        assert_eq!(
            resp,
            IngestResponse {
                status_code: 200,
                body: "2 rows from a.csv processed successfully.".to_string(),
            }
        );
        let items = table.items();
        assert_eq!(items.len(), 2);
        assert!(items
            .iter()
            .all(|item| item[FILE_NAME] == AttributeValue::S("a.csv".to_string())
                && item[UPLOAD_TIME] == AttributeValue::N("1000".to_string())));
    }

    #[test]
    fn response_serializes_with_status_code_field() {
        let resp = IngestResponse {
            status_code: 200,
            body: "0 rows from a.csv processed successfully.".to_string(),
        };

        assert_eq!(
            serde_json::to_value(&resp).unwrap(),
            json!({ "statusCode": 200, "body": "0 rows from a.csv processed successfully." })
        );
    }

    #[tokio::test]
    async fn decodes_form_encoded_keys() {
        let objects =
            InMemoryObjects::default().with_object("bucket", "reports/q1 sales.csv", "id\n1\n");
        let table = InMemoryTable::default();

        let resp = function_handler(
            &objects,
            &table,
            1,
            event(vec![s3_record("bucket", "reports/q1+sales.csv")]),
        )
        .await
        .unwrap();

        assert_eq!(resp.body, "1 rows from q1 sales.csv processed successfully.");
    }

    #[tokio::test]
    async fn bad_header_is_a_client_error() {
        let objects = InMemoryObjects::default().with_object("bucket", "a.csv", "id,\n1,2\n");
        let table = InMemoryTable::default();

        let resp = function_handler(&objects, &table, 1, event(vec![s3_record("bucket", "a.csv")]))
            .await
            .unwrap();

        assert_eq!(resp.status_code, 400);
        assert!(table.items().is_empty());
    }

    #[tokio::test]
    async fn only_first_record_is_processed() {
        let objects = InMemoryObjects::default()
            .with_object("bucket", "a.csv", "id\n1\n")
            .with_object("bucket", "b.csv", "id\n1\n2\n");
        let table = InMemoryTable::default();

        let resp = function_handler(
            &objects,
            &table,
            1,
            event(vec![s3_record("bucket", "a.csv"), s3_record("bucket", "b.csv")]),
        )
        .await
        .unwrap();

        assert_eq!(resp.body, "1 rows from a.csv processed successfully.");
        assert_eq!(table.items().len(), 1);
    }

    #[tokio::test]
    async fn missing_object_fails_invocation() {
        let objects = InMemoryObjects::default();
        let table = InMemoryTable::default();

        let result =
            function_handler(&objects, &table, 1, event(vec![s3_record("bucket", "gone.csv")])).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn empty_event_fails_invocation() {
        let objects = InMemoryObjects::default();
        let table = InMemoryTable::default();

        let result = function_handler(&objects, &table, 1, event(vec![])).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn write_failure_fails_invocation() {
        let objects = InMemoryObjects::default().with_object("bucket", "a.csv", "id\n1\n2\n");
        let table = InMemoryTable::failing_after(1);

        let result =
            function_handler(&objects, &table, 1, event(vec![s3_record("bucket", "a.csv")])).await;

        assert!(result.is_err());
        assert_eq!(table.items().len(), 1);
    }
}
