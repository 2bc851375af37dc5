use reqwest::{Client, StatusCode};
use tracing::{error, info};

use crate::{
    config::Config,
    definitions::{RecordBatch, StepOutcome},
    error::{Error, Result},
};

pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Fetches the record batch from the configured endpoint.
///
/// Never fails: transport errors, non-200 statuses and undecodable bodies
/// are logged and produce an empty batch so the rest of the run proceeds.
pub async fn get_data(client: &Client, config: &Config) -> (RecordBatch, StepOutcome) {
    match try_get_data(client, &config.data_endpoint, &config.api_key).await {
        Ok(records) => {
            info!(records = records.len(), "data fetched successfully");
            (records, StepOutcome::Succeeded)
        }
        Err(err) => {
            error!("error fetching data: {err}");
            (RecordBatch::new(), StepOutcome::Failed(err.to_string()))
        }
    }
}

async fn try_get_data(client: &Client, endpoint: &str, api_key: &str) -> Result<RecordBatch> {
    let response = client
        .get(endpoint)
        .header(SUBSCRIPTION_KEY_HEADER, api_key)
        .send()
        .await?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(Error::Fetch(format!("unexpected status {status} from {endpoint}")));
    }

    let body = response.json::<serde_json::Value>().await?;

    records_from_json(body)
}

fn records_from_json(body: serde_json::Value) -> Result<RecordBatch> {
    match body {
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                serde_json::Value::Object(record) => Ok(record),
                other => Err(Error::Fetch(format!(
                    "expected a JSON object per record, got {other}"
                ))),
            })
            .collect(),
        serde_json::Value::Object(record) => Ok(vec![record]),
        other => Err(Error::Fetch(format!(
            "expected a JSON array or object body, got {other}"
        ))),
    }
}
