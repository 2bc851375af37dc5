use std::fmt;

/// One fetched data item. No schema is enforced in memory.
pub type Record = serde_json::Map<String, serde_json::Value>;

pub type RecordBatch = Vec<Record>;

pub const PLAYER_TABLE_NAME: &str = "all_player_data";
pub const PLAYER_TABLE_DESCRIPTION: &str = "Player data";

/// Prefix under the bucket that the player table reads from.
pub const RAW_DATA_PREFIX: &str = "raw-data/";
pub const QUERY_OUTPUT_PREFIX: &str = "athena_output_results";

pub const TEXT_INPUT_FORMAT: &str = "org.apache.hadoop.mapred.TextInputFormat";
pub const TEXT_OUTPUT_FORMAT: &str = "org.apache.hadoop.hive.ql.io.HiveIgnoreKeyTextOutputFormat";
pub const JSON_SERDE_LIBRARY: &str = "org.openx.data.jsonserde.JsonSerDe";
pub const EXTERNAL_TABLE: &str = "EXTERNAL_TABLE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Int,
    String,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Int => "int",
            ColumnType::String => "string",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDefinition {
    pub name: &'static str,
    pub column_type: ColumnType,
}

/// Everything the catalog needs to register an external JSON-lines table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDefinition {
    pub name: String,
    pub description: String,
    pub columns: Vec<ColumnDefinition>,
    pub location: String,
    pub input_format: String,
    pub output_format: String,
    pub serialization_library: String,
    pub compressed: bool,
    pub table_type: String,
}

const PLAYER_COLUMNS: [(&str, ColumnType); 8] = [
    ("PlayerID", ColumnType::Int),
    ("FirstName", ColumnType::String),
    ("LastName", ColumnType::String),
    ("Position", ColumnType::String),
    ("College", ColumnType::String),
    ("Height", ColumnType::String),
    ("Weight", ColumnType::String),
    ("BirthDate", ColumnType::String),
];

/// The static schema of `all_player_data`. It is never inferred from the
/// fetched records, so fields that do not match these columns read as null.
pub fn player_table_definition(location: &str) -> TableDefinition {
    TableDefinition {
        name: PLAYER_TABLE_NAME.to_string(),
        description: PLAYER_TABLE_DESCRIPTION.to_string(),
        columns: PLAYER_COLUMNS
            .iter()
            .map(|&(name, column_type)| ColumnDefinition { name, column_type })
            .collect(),
        location: location.to_string(),
        input_format: TEXT_INPUT_FORMAT.to_string(),
        output_format: TEXT_OUTPUT_FORMAT.to_string(),
        serialization_library: JSON_SERDE_LIBRARY.to_string(),
        compressed: false,
        table_type: EXTERNAL_TABLE.to_string(),
    }
}

/// Result of a single pipeline step. Failures carry the logged diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Succeeded,
    Failed(String),
}

impl StepOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Succeeded)
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepOutcome::Succeeded => write!(f, "ok"),
            StepOutcome::Failed(diagnostic) => write!(f, "failed ({diagnostic})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_table_has_one_int_and_seven_strings() {
        let table = player_table_definition("s3://lake/raw-data/");

        assert_eq!(table.name, "all_player_data");
        assert_eq!(table.columns.len(), 8);
        assert_eq!(table.columns[0].name, "PlayerID");
        assert_eq!(table.columns[0].column_type, ColumnType::Int);
        assert!(table.columns[1..]
            .iter()
            .all(|column| column.column_type == ColumnType::String));
        assert_eq!(table.columns[7].name, "BirthDate");
    }

    #[test]
    fn player_table_is_uncompressed_external_json() {
        let table = player_table_definition("s3://lake/raw-data/");

        assert_eq!(table.location, "s3://lake/raw-data/");
        assert_eq!(table.serialization_library, "org.openx.data.jsonserde.JsonSerDe");
        assert_eq!(table.input_format, "org.apache.hadoop.mapred.TextInputFormat");
        assert!(!table.compressed);
        assert_eq!(table.table_type, "EXTERNAL_TABLE");
    }

    #[test]
    fn outcome_display_carries_diagnostic() {
        assert_eq!(StepOutcome::Succeeded.to_string(), "ok");
        assert_eq!(
            StepOutcome::Failed("access denied".to_string()).to_string(),
            "failed (access denied)"
        );
    }
}
