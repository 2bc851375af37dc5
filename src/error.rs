//! Error types shared by the pipeline steps.
//!
//! Steps never hand these to the orchestrator directly. Each step converts
//! its `Error` into a [`StepOutcome`](crate::definitions::StepOutcome) after
//! logging it.

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("missing environment variable {0}")]
    MissingVariable(&'static str),

    #[error("invalid value for {name}: {message}")]
    InvalidVariable {
        name: &'static str,
        message: String,
    },

    #[error("refusing to submit {0:?}: names must be bare SQL identifiers")]
    UnsafeStatement(String),

    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("catalog error: {0}")]
    Catalog(String),

    #[error("query error: {0}")]
    Query(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Fetch(err.to_string())
    }
}
