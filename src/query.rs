use async_trait::async_trait;
use rusoto_athena::{
    Athena, AthenaClient, QueryExecutionContext, ResultConfiguration, StartQueryExecutionInput,
};
use rusoto_core::Region;
use tracing::{error, info};

use crate::{
    config::Config,
    definitions::{StepOutcome, PLAYER_TABLE_NAME},
    error::{Error, Result},
    sql::Statement,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySubmission {
    pub sql: String,
    /// Database the statement runs in, if any.
    pub database: Option<String>,
    pub output_location: String,
}

/// Submits statements for asynchronous execution. Implementations return as
/// soon as the engine accepts the statement, with its execution id if known.
#[async_trait]
pub trait QueryEngine: Send + Sync {
    async fn submit_query(&self, submission: &QuerySubmission) -> Result<Option<String>>;
}

pub struct AthenaQueryEngine {
    client: AthenaClient,
}

impl AthenaQueryEngine {
    pub fn new(region: Region) -> Self {
        Self {
            client: AthenaClient::new(region),
        }
    }
}

#[async_trait]
impl QueryEngine for AthenaQueryEngine {
    async fn submit_query(&self, submission: &QuerySubmission) -> Result<Option<String>> {
        let output = self
            .client
            .start_query_execution(StartQueryExecutionInput {
                query_string: submission.sql.clone(),
                query_execution_context: submission.database.as_ref().map(|database| {
                    QueryExecutionContext {
                        database: Some(database.clone()),
                        ..Default::default()
                    }
                }),
                result_configuration: Some(ResultConfiguration {
                    output_location: Some(submission.output_location.clone()),
                    ..Default::default()
                }),
                ..Default::default()
            })
            .await
            .map_err(|err| Error::Query(err.to_string()))?;

        Ok(output.query_execution_id)
    }
}

/// Creates the query-engine database, running in the catalog database.
/// Fire-and-forget: completion is never awaited.
pub async fn configure_query_database(engine: &dyn QueryEngine, config: &Config) -> StepOutcome {
    let statement = Statement::CreateDatabaseIfNotExists(config.query_database.clone());

    submit(
        engine,
        &statement,
        Some(config.catalog_database.clone()),
        config,
        "error in query engine config",
    )
    .await
}

/// Submits the row count over the player table. Results land in the output
/// location; nothing is read back.
pub async fn run_row_count(engine: &dyn QueryEngine, config: &Config) -> StepOutcome {
    let statement = Statement::SelectCount {
        database: config.catalog_database.clone(),
        table: PLAYER_TABLE_NAME.to_string(),
    };

    submit(engine, &statement, None, config, "error in fetching rows").await
}

async fn submit(
    engine: &dyn QueryEngine,
    statement: &Statement,
    database: Option<String>,
    config: &Config,
    context: &str,
) -> StepOutcome {
    let sql = match statement.to_checked_sql() {
        Ok(sql) => sql,
        Err(err) => {
            error!("{context}: {err}");
            return StepOutcome::Failed(err.to_string());
        }
    };

    let submission = QuerySubmission {
        sql,
        database,
        output_location: config.query_output_location(),
    };

    match engine.submit_query(&submission).await {
        Ok(execution_id) => {
            info!(
                execution_id = execution_id.as_deref().unwrap_or("unknown"),
                sql = %submission.sql,
                "query submitted"
            );
            StepOutcome::Succeeded
        }
        Err(err) => {
            error!(sql = %submission.sql, "{context}: {err}");
            StepOutcome::Failed(err.to_string())
        }
    }
}
