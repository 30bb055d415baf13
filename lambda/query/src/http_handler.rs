use lambda_http::{Body, Error, Request, Response};
use serde_json::json;

use crate::batch::{latest_batch, QueryError};
use crate::store::RecordTable;

pub(crate) async fn function_handler<T>(table: &T, _event: Request) -> Result<Response<Body>, Error>
where
    T: RecordTable + ?Sized,
{
    match latest_batch_body(table).await {
        Ok(body) => Ok(Response::builder()
            .status(200)
            .header("Access-Control-Allow-Origin", "*")
            .header("Content-Type", "application/json")
            .body(Body::Text(body))?),
        Err(e) => {
            tracing::error!(error = %e, "failed to load latest batch");
            Ok(Response::builder()
                .status(500)
                .header("Access-Control-Allow-Origin", "*")
                .body(Body::Text(json!({ "error": e.to_string() }).to_string()))?)
        }
    }
}

async fn latest_batch_body<T>(table: &T) -> Result<String, QueryError>
where
    T: RecordTable + ?Sized,
{
    let records = latest_batch(table).await?;
    Ok(serde_json::to_string(&records)?)
}
