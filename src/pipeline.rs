//! The linear data-lake setup run:
//! fetch, provision bucket, upload, provision catalog, configure query
//! engine, run query.
//!
//! Every step reports a [`StepOutcome`] and the run always continues to the
//! next step.

use std::fmt;

use tracing::{debug, info};

use crate::{
    catalog::{self, MetadataCatalog},
    config::Config,
    definitions::StepOutcome,
    fetcher,
    query::{self, QueryEngine},
    storage::{self, ObjectStore},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    FetchData,
    EnsureBucket,
    AwaitBucket,
    UploadData,
    CreateCatalogDatabase,
    CreateCatalogTable,
    ConfigureQueryDatabase,
    RunRowCount,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::FetchData => "fetch_data",
            Step::EnsureBucket => "ensure_bucket",
            Step::AwaitBucket => "await_bucket",
            Step::UploadData => "upload_data",
            Step::CreateCatalogDatabase => "create_catalog_database",
            Step::CreateCatalogTable => "create_catalog_table",
            Step::ConfigureQueryDatabase => "configure_query_database",
            Step::RunRowCount => "run_row_count",
        };

        f.write_str(name)
    }
}

/// Service handles the run talks to.
pub struct Services<'a> {
    pub http: &'a reqwest::Client,
    pub store: &'a dyn ObjectStore,
    pub catalog: &'a dyn MetadataCatalog,
    pub engine: &'a dyn QueryEngine,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub records_fetched: usize,
    pub steps: Vec<(Step, StepOutcome)>,
}

impl RunReport {
    fn record(&mut self, step: Step, outcome: StepOutcome) {
        debug!(step = %step, outcome = %outcome, "step finished");
        self.steps.push((step, outcome));
    }

    pub fn outcome(&self, step: Step) -> Option<&StepOutcome> {
        self.steps
            .iter()
            .find(|(candidate, _)| *candidate == step)
            .map(|(_, outcome)| outcome)
    }

    pub fn failed_steps(&self) -> Vec<Step> {
        self.steps
            .iter()
            .filter(|(_, outcome)| !outcome.is_success())
            .map(|(step, _)| *step)
            .collect()
    }
}

pub async fn run(config: &Config, services: &Services<'_>) -> RunReport {
    info!("setting up data lake for analytics");

    let mut report = RunReport::default();

    // A failed fetch still yields a batch, only an empty one.
    let (records, outcome) = fetcher::get_data(services.http, config).await;
    report.records_fetched = records.len();
    report.record(Step::FetchData, outcome);

    report.record(
        Step::EnsureBucket,
        storage::ensure_bucket(services.store, &config.bucket_name).await,
    );

    report.record(
        Step::AwaitBucket,
        storage::wait_until_visible(
            services.store,
            &config.bucket_name,
            config.bucket_ready_timeout,
            config.bucket_ready_poll_interval,
        )
        .await,
    );

    report.record(
        Step::UploadData,
        storage::upload_records(services.store, config, &records).await,
    );

    report.record(
        Step::CreateCatalogDatabase,
        catalog::create_database(services.catalog, &config.catalog_database).await,
    );

    report.record(
        Step::CreateCatalogTable,
        catalog::create_table(services.catalog, config).await,
    );

    report.record(
        Step::ConfigureQueryDatabase,
        query::configure_query_database(services.engine, config).await,
    );

    report.record(
        Step::RunRowCount,
        query::run_row_count(services.engine, config).await,
    );

    report
}
