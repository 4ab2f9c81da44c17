//! Configuration types for the normalisation pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// A source column and the name it is exported under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub source: String,
    pub target: String,
}

impl ColumnMapping {
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
        }
    }
}

/// Layout of an MS-DIAL alignment export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MsdialConfig {
    /// Row offset of the header row below the file's first line
    #[serde(default = "default_skip_rows")]
    pub skip_rows: usize,

    /// Number of leading metadata columns before the abundance columns
    #[serde(default = "default_metadata_cols")]
    pub metadata_cols: usize,

    /// Column holding the alignment identifier
    #[serde(default = "default_index_col")]
    pub index_col: String,
}

fn default_skip_rows() -> usize {
    3
}

fn default_metadata_cols() -> usize {
    28
}

fn default_index_col() -> String {
    "Alignment ID".to_string()
}

impl Default for MsdialConfig {
    fn default() -> Self {
        Self {
            skip_rows: default_skip_rows(),
            metadata_cols: default_metadata_cols(),
            index_col: default_index_col(),
        }
    }
}

/// Columns kept from a batch specification (metadata) file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataConfig {
    #[serde(default = "default_metadata_columns")]
    pub columns: Vec<ColumnMapping>,
}

fn default_metadata_columns() -> Vec<ColumnMapping> {
    vec![
        ColumnMapping::new("File name", "sampleName"),
        ColumnMapping::new("Type", "sampleType"),
        ColumnMapping::new("Class ID", "class"),
        ColumnMapping::new("Batch", "batch"),
        ColumnMapping::new("Analytical order", "injectionOrder"),
    ]
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            columns: default_metadata_columns(),
        }
    }
}

/// Columns renamed in an alkane retention-index file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlkaneConfig {
    #[serde(default = "default_alkane_columns")]
    pub columns: Vec<ColumnMapping>,
}

fn default_alkane_columns() -> Vec<ColumnMapping> {
    vec![
        ColumnMapping::new("Carbon number", "carbon_number"),
        ColumnMapping::new("RT (min)", "rt"),
    ]
}

impl Default for AlkaneConfig {
    fn default() -> Self {
        Self {
            columns: default_alkane_columns(),
        }
    }
}

/// Main pipeline configuration combining all sub-configs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub msdial: MsdialConfig,

    #[serde(default)]
    pub metadata: MetadataConfig,

    #[serde(default)]
    pub alkanes: AlkaneConfig,
}

impl PipelineConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
