//! Error and warning types.
//!
//! Nothing in the graph core is fatal. Bad records degrade into
//! [`BuildWarning`]s that travel next to a usable element graph; only the
//! outer boundaries (settings files, raw JSON) return [`GraphError`].

use thiserror::Error;

/// Non-fatal anomaly found while turning an analysis result into elements.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildWarning {
    /// A record was missing required fields or had the wrong shape.
    #[error("malformed {collection} record at index {index}: {reason}")]
    MalformedInput {
        collection: &'static str,
        index: usize,
        reason: String,
    },

    /// A transaction endpoint is not in the account list.
    #[error("edge {edge_id} references unknown account {account_id}; placeholder node created")]
    DanglingReference { edge_id: String, account_id: String },
}

impl BuildWarning {
    /// Short machine-friendly kind, handy for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            BuildWarning::MalformedInput { .. } => "malformed_input",
            BuildWarning::DanglingReference { .. } => "dangling_reference",
        }
    }
}

/// Errors at the crate boundaries.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Settings file could not be read.
    #[error("failed to read settings from {path}: {source}")]
    SettingsIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Settings YAML did not parse.
    #[error("invalid settings yaml: {0}")]
    SettingsYaml(#[from] serde_yaml::Error),

    /// The analysis result was not valid JSON.
    #[error("invalid analysis result json: {0}")]
    AnalysisJson(#[from] serde_json::Error),

    /// Layout configuration out of range.
    #[error("invalid layout config: {0}")]
    InvalidLayoutConfig(String),

    /// Interaction or table settings out of range.
    #[error("invalid graph settings: {0}")]
    InvalidSettings(String),
}
