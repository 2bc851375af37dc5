use rusoto_core::Region;
use tracing::{error, info};

use datalake::{
    catalog::GlueCatalog,
    config::Config,
    logging,
    pipeline::{self, Services},
    query::AthenaQueryEngine,
    storage::S3ObjectStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    // Like step failures, a bad environment is logged and the process still
    // exits normally.
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("could not load configuration: {err}");
            return Ok(());
        }
    };
    let region = Region::default();

    info!(region = region.name(), bucket = %config.bucket_name, "starting run");

    let http = reqwest::Client::new();
    let store = S3ObjectStore::new(region.clone());
    let catalog = GlueCatalog::new(region.clone());
    let engine = AthenaQueryEngine::new(region);

    let services = Services {
        http: &http,
        store: &store,
        catalog: &catalog,
        engine: &engine,
    };

    // Step failures are already logged and never change the exit status.
    pipeline::run(&config, &services).await;

    Ok(())
}
