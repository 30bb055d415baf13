use aws_lambda_events::event::s3::S3Event;
use lambda_runtime::{run, service_fn, tracing, Error, LambdaEvent};

mod config;
mod event_handler;
mod ingest;
mod record;
mod storage;

use config::Config;
use event_handler::function_handler;
use storage::{DynamoRecordTable, S3Objects};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    let config = Config::from_env()?;
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let objects = S3Objects::new(aws_sdk_s3::Client::new(&aws_config));
    let table = DynamoRecordTable::new(
        aws_sdk_dynamodb::Client::new(&aws_config),
        &config.table_name,
    );

    run(service_fn(|event: LambdaEvent<S3Event>| {
        let upload_time = chrono::Utc::now().timestamp();
        function_handler(&objects, &table, upload_time, event)
    }))
    .await
}
