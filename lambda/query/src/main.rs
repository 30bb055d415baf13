use lambda_http::{run, service_fn, tracing, Error};

mod attribute_json;
mod batch;
mod config;
mod http_handler;
mod store;

use config::Config;
use http_handler::function_handler;
use store::DynamoRecordTable;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    let config = Config::from_env()?;
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let table = DynamoRecordTable::new(
        aws_sdk_dynamodb::Client::new(&aws_config),
        &config.table_name,
    );

    run(service_fn(|event| function_handler(&table, event))).await
}
