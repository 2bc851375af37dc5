use std::time::Duration;

use async_trait::async_trait;
use rusoto_core::Region;
use rusoto_s3::{
    CreateBucketConfiguration, CreateBucketRequest, HeadBucketRequest, PutObjectRequest, S3Client,
    S3,
};
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::{
    config::Config,
    definitions::{Record, StepOutcome},
    error::{Error, Result},
};

pub const JSON_LINES_CONTENT_TYPE: &str = "application/x-ndjson";

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Succeeds only when the bucket is visible to this caller.
    async fn bucket_exists(&self, bucket: &str) -> Result<()>;

    async fn create_bucket(&self, bucket: &str) -> Result<()>;

    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()>;
}

pub struct S3ObjectStore {
    client: S3Client,
    region: Region,
}

impl S3ObjectStore {
    pub fn new(region: Region) -> Self {
        Self {
            client: S3Client::new(region.clone()),
            region,
        }
    }

    fn bucket_configuration(&self) -> Option<CreateBucketConfiguration> {
        // us-east-1 rejects an explicit location constraint.
        match self.region {
            Region::UsEast1 => None,
            ref region => Some(CreateBucketConfiguration {
                location_constraint: Some(region.name().to_string()),
                ..Default::default()
            }),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn bucket_exists(&self, bucket: &str) -> Result<()> {
        self.client
            .head_bucket(HeadBucketRequest {
                bucket: bucket.to_string(),
                ..Default::default()
            })
            .await
            .map_err(|err| Error::Storage(err.to_string()))
    }

    async fn create_bucket(&self, bucket: &str) -> Result<()> {
        self.client
            .create_bucket(CreateBucketRequest {
                bucket: bucket.to_string(),
                create_bucket_configuration: self.bucket_configuration(),
                ..Default::default()
            })
            .await
            .map(|_| ())
            .map_err(|err| Error::Storage(err.to_string()))
    }

    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()> {
        self.client
            .put_object(PutObjectRequest {
                bucket: bucket.to_string(),
                key: key.to_string(),
                body: Some(body.into()),
                content_type: Some(JSON_LINES_CONTENT_TYPE.to_string()),
                ..Default::default()
            })
            .await
            .map(|_| ())
            .map_err(|err| Error::Storage(err.to_string()))
    }
}

/// Makes sure `bucket` exists. A failed existence check, whatever its cause,
/// leads to a creation attempt; a failed creation is logged and reported.
pub async fn ensure_bucket(store: &dyn ObjectStore, bucket: &str) -> StepOutcome {
    if store.bucket_exists(bucket).await.is_ok() {
        info!(bucket, "bucket exists");
        return StepOutcome::Succeeded;
    }

    info!(bucket, "creating bucket");

    match store.create_bucket(bucket).await {
        Ok(()) => {
            info!(bucket, "bucket created successfully");
            StepOutcome::Succeeded
        }
        Err(err) => {
            error!(bucket, "error creating bucket: {err}");
            StepOutcome::Failed(err.to_string())
        }
    }
}

/// Polls the existence check until the bucket is visible or `timeout`
/// elapses. Expiry is logged and the caller carries on regardless.
pub async fn wait_until_visible(
    store: &dyn ObjectStore,
    bucket: &str,
    timeout: Duration,
    poll_interval: Duration,
) -> StepOutcome {
    let deadline = Instant::now() + timeout;

    loop {
        if store.bucket_exists(bucket).await.is_ok() {
            return StepOutcome::Succeeded;
        }

        if Instant::now() >= deadline {
            let diagnostic = format!("bucket {bucket} not visible after {timeout:?}");
            warn!("{diagnostic}");
            return StepOutcome::Failed(diagnostic);
        }

        tokio::time::sleep(poll_interval).await;
    }
}

/// One JSON document per record, newline separated, in batch order. An
/// empty batch encodes to the empty string.
pub fn to_json_lines(records: &[Record]) -> Result<String> {
    let lines = records
        .iter()
        .map(serde_json::to_string)
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(lines.join("\n"))
}

/// Writes the batch to `<bucket>/<object_key>`. Encoding failures degrade
/// to an empty payload; upload failures are logged and reported.
pub async fn upload_records(
    store: &dyn ObjectStore,
    config: &Config,
    records: &[Record],
) -> StepOutcome {
    // Maps of JSON values always serialize; the fallback keeps the step
    // fail-soft should the record type ever change.
    let payload = match to_json_lines(records) {
        Ok(payload) => payload,
        Err(err) => {
            error!("error converting to line-delimited JSON: {err}");
            String::new()
        }
    };

    match store
        .put_object(&config.bucket_name, &config.object_key, payload.into_bytes())
        .await
    {
        Ok(()) => {
            info!(
                records = records.len(),
                "data uploaded to s3://{}/{}", config.bucket_name, config.object_key
            );
            StepOutcome::Succeeded
        }
        Err(err) => {
            error!("error uploading data to S3: {err}");
            StepOutcome::Failed(err.to_string())
        }
    }
}
