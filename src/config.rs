use std::time::Duration;

use crate::{
    definitions::{QUERY_OUTPUT_PREFIX, RAW_DATA_PREFIX},
    error::{Error, Result},
};

pub const ENV_BUCKET_NAME: &str = "S3_BUCKET_NAME";
pub const ENV_CATALOG_DATABASE: &str = "GLUE_DB_NAME";
pub const ENV_QUERY_DATABASE: &str = "ATHENA_DB_NAME";
pub const ENV_API_KEY: &str = "API_KEY";
pub const ENV_DATA_ENDPOINT: &str = "DATA_ENDPOINT";
pub const ENV_OBJECT_KEY: &str = "S3_FILE_KEY";
pub const ENV_BUCKET_READY_TIMEOUT_SECS: &str = "BUCKET_READY_TIMEOUT_SECS";
pub const ENV_BUCKET_READY_POLL_MILLIS: &str = "BUCKET_READY_POLL_MILLIS";

const DEFAULT_BUCKET_READY_TIMEOUT_SECS: u64 = 5;
const DEFAULT_BUCKET_READY_POLL_MILLIS: u64 = 500;

/// Process-wide settings, read once at startup and passed by reference to
/// every step.
#[derive(Clone)]
pub struct Config {
    pub bucket_name: String,
    pub catalog_database: String,
    pub query_database: String,
    pub api_key: String,
    pub data_endpoint: String,
    pub object_key: String,
    pub bucket_ready_timeout: Duration,
    pub bucket_ready_poll_interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup, so tests need not
    /// touch the process environment.
    pub fn from_env_with<F>(get_env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| -> Result<String> {
            get_env(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or(Error::MissingVariable(key))
        };

        Ok(Self {
            bucket_name: required(ENV_BUCKET_NAME)?,
            catalog_database: required(ENV_CATALOG_DATABASE)?,
            query_database: required(ENV_QUERY_DATABASE)?,
            api_key: required(ENV_API_KEY)?,
            data_endpoint: required(ENV_DATA_ENDPOINT)?,
            object_key: required(ENV_OBJECT_KEY)?,
            bucket_ready_timeout: Duration::from_secs(parse_u64_env(
                &get_env,
                ENV_BUCKET_READY_TIMEOUT_SECS,
                DEFAULT_BUCKET_READY_TIMEOUT_SECS,
            )?),
            bucket_ready_poll_interval: Duration::from_millis(parse_u64_env(
                &get_env,
                ENV_BUCKET_READY_POLL_MILLIS,
                DEFAULT_BUCKET_READY_POLL_MILLIS,
            )?),
        })
    }

    /// `s3://<bucket>/raw-data/`, where the player table reads from.
    pub fn table_location(&self) -> String {
        format!("s3://{}/{}", self.bucket_name, RAW_DATA_PREFIX)
    }

    pub fn query_output_location(&self) -> String {
        format!("s3://{}/{}", self.bucket_name, QUERY_OUTPUT_PREFIX)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bucket_name", &self.bucket_name)
            .field("catalog_database", &self.catalog_database)
            .field("query_database", &self.query_database)
            .field("api_key", &"<redacted>")
            .field("data_endpoint", &self.data_endpoint)
            .field("object_key", &self.object_key)
            .field("bucket_ready_timeout", &self.bucket_ready_timeout)
            .field("bucket_ready_poll_interval", &self.bucket_ready_poll_interval)
            .finish()
    }
}

fn parse_u64_env<F>(get_env: &F, key: &'static str, default: u64) -> Result<u64>
where
    F: Fn(&str) -> Option<String>,
{
    match get_env(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<u64>().map_err(|err| Error::InvalidVariable {
            name: key,
            message: format!("{raw:?}: {err}"),
        }),
    }
}
