use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::resolver::columns::ColumnSpec;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory the candidate data files are listed from.
    pub data_dir: PathBuf,
    /// Directory chart artifacts are written to.
    pub output_dir: PathBuf,
    /// Glob patterns (case-insensitive) a file name must match to be a candidate.
    pub file_patterns: Vec<String>,
    /// A fuzzy match must score strictly above this to be suggested.
    pub similarity_threshold: f64,
    pub id_column: ColumnSpec,
    pub manager_column: ColumnSpec,
    pub group_column: String,
    pub default_session: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("/data"),
            output_dir: PathBuf::from("output"),
            file_patterns: vec!["*.xlsx".to_string(), "*.csv".to_string()],
            similarity_threshold: 60.0,
            id_column: ColumnSpec::new("associate id", &["associate_id"]),
            manager_column: ColumnSpec::new("reports to manager id", &["reports_to_manager_id"]),
            group_column: "cost center name".to_string(),
            default_session: "default".to_string(),
        }
    }
}

/// Layer an optional `Config.{toml,yaml,json}` file and `ORG_CHART__*`
/// environment variables over the defaults.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(
            Environment::with_prefix("ORG_CHART")
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("file_patterns")
                .try_parsing(true),
        )
        .build()?;
    builder.try_deserialize::<AppConfig>()
}
