use async_trait::async_trait;
use rusoto_core::Region;
use rusoto_glue::{
    Column, CreateDatabaseRequest, CreateTableRequest, DatabaseInput, Glue, GlueClient, SerDeInfo,
    StorageDescriptor, TableInput,
};
use tracing::{error, info};

use crate::{
    config::Config,
    definitions::{player_table_definition, StepOutcome, TableDefinition},
    error::{Error, Result},
};

/// Schema catalog. Neither operation is idempotent: creating an entity that
/// already exists is an error.
#[async_trait]
pub trait MetadataCatalog: Send + Sync {
    async fn create_database(&self, name: &str) -> Result<()>;

    async fn create_table(&self, database: &str, table: &TableDefinition) -> Result<()>;
}

pub struct GlueCatalog {
    client: GlueClient,
}

impl GlueCatalog {
    pub fn new(region: Region) -> Self {
        Self {
            client: GlueClient::new(region),
        }
    }
}

#[async_trait]
impl MetadataCatalog for GlueCatalog {
    async fn create_database(&self, name: &str) -> Result<()> {
        self.client
            .create_database(CreateDatabaseRequest {
                database_input: DatabaseInput {
                    name: name.to_string(),
                    ..Default::default()
                },
                ..Default::default()
            })
            .await
            .map(|_| ())
            .map_err(|err| Error::Catalog(err.to_string()))
    }

    async fn create_table(&self, database: &str, table: &TableDefinition) -> Result<()> {
        self.client
            .create_table(CreateTableRequest {
                database_name: database.to_string(),
                table_input: table_input(table),
                ..Default::default()
            })
            .await
            .map(|_| ())
            .map_err(|err| Error::Catalog(err.to_string()))
    }
}

fn table_input(table: &TableDefinition) -> TableInput {
    TableInput {
        name: table.name.clone(),
        description: Some(table.description.clone()),
        storage_descriptor: Some(StorageDescriptor {
            columns: Some(
                table
                    .columns
                    .iter()
                    .map(|column| Column {
                        name: column.name.to_string(),
                        type_: Some(column.column_type.as_str().to_string()),
                        ..Default::default()
                    })
                    .collect(),
            ),
            location: Some(table.location.clone()),
            input_format: Some(table.input_format.clone()),
            output_format: Some(table.output_format.clone()),
            compressed: Some(table.compressed),
            serde_info: Some(SerDeInfo {
                serialization_library: Some(table.serialization_library.clone()),
                ..Default::default()
            }),
            ..Default::default()
        }),
        table_type: Some(table.table_type.clone()),
        ..Default::default()
    }
}

pub async fn create_database(catalog: &dyn MetadataCatalog, name: &str) -> StepOutcome {
    match catalog.create_database(name).await {
        Ok(()) => {
            info!(database = name, "database created successfully");
            StepOutcome::Succeeded
        }
        Err(err) => {
            error!(database = name, "error creating database: {err}");
            StepOutcome::Failed(err.to_string())
        }
    }
}

/// Registers `all_player_data` over the uploaded objects in the catalog
/// database.
pub async fn create_table(catalog: &dyn MetadataCatalog, config: &Config) -> StepOutcome {
    let table = player_table_definition(&config.table_location());

    match catalog.create_table(&config.catalog_database, &table).await {
        Ok(()) => {
            info!(
                database = %config.catalog_database,
                table = %table.name,
                "table created successfully"
            );
            StepOutcome::Succeeded
        }
        Err(err) => {
            error!(table = %table.name, "error creating table: {err}");
            StepOutcome::Failed(err.to_string())
        }
    }
}
