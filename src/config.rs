//! Graph settings.
//!
//! Defaults ship in `config/graph_settings.yaml` and are embedded at compile
//! time; a file on disk can override them.

use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::GraphError;
use crate::graph::LayoutConfig;

const DEFAULT_SETTINGS_YAML: &str = include_str!("../config/graph_settings.yaml");

/// Top-level settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSettings {
    /// Force layout parameters.
    pub layout: LayoutConfig,
    /// Pointer interaction.
    pub interaction: InteractionConfig,
    /// Fraud ring table.
    pub table: TableConfig,
}

/// Pointer interaction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Slop around nodes and edges when resolving a tap.
    pub hit_tolerance: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self { hit_tolerance: 4.0 }
    }
}

/// Ring table configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Member ids listed per ring before the overflow count.
    pub member_preview_limit: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            member_preview_limit: 6,
        }
    }
}

impl GraphSettings {
    /// Parse and validate settings YAML. Missing keys take their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, GraphError> {
        let settings: GraphSettings = serde_yaml::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GraphError> {
        let path = path.as_ref();
        info!("Loading graph settings from {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|source| GraphError::SettingsIo {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// The embedded defaults.
    pub fn embedded() -> Result<Self, GraphError> {
        Self::from_yaml_str(DEFAULT_SETTINGS_YAML)
    }

    pub fn validate(&self) -> Result<(), GraphError> {
        self.layout.validate()?;
        let tolerance = self.interaction.hit_tolerance;
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(GraphError::InvalidSettings(format!(
                "hit_tolerance must be a finite value >= 0, got {tolerance}"
            )));
        }
        Ok(())
    }
}

static GLOBAL_SETTINGS: OnceLock<GraphSettings> = OnceLock::new();

/// Process-wide settings, parsed from the embedded YAML on first use.
/// Falls back to `GraphSettings::default()` if the embedded file is broken.
pub fn global_settings() -> &'static GraphSettings {
    GLOBAL_SETTINGS.get_or_init(|| match GraphSettings::embedded() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!(error = %e, "embedded graph settings invalid, using defaults");
            GraphSettings::default()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_matches_defaults() {
        let embedded = GraphSettings::embedded().unwrap();
        assert_eq!(embedded, GraphSettings::default());
        assert_eq!(global_settings(), &embedded);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let settings = GraphSettings::from_yaml_str(
            "layout:\n  ideal_edge_length: 80.0\n  seed: 7\ntable:\n  member_preview_limit: 3\n",
        )
        .unwrap();
        assert_eq!(settings.layout.ideal_edge_length, 80.0);
        assert_eq!(settings.layout.seed, Some(7));
        assert_eq!(settings.layout.node_repulsion, 8000.0);
        assert_eq!(settings.table.member_preview_limit, 3);
        assert_eq!(settings.interaction, InteractionConfig::default());
    }

    #[test]
    fn invalid_layout_rejected() {
        let err = GraphSettings::from_yaml_str("layout:\n  max_iterations: 0\n").unwrap_err();
        assert!(matches!(err, GraphError::InvalidLayoutConfig(_)));
    }

    #[test]
    fn invalid_interaction_rejected() {
        let err = GraphSettings::from_yaml_str("interaction:\n  hit_tolerance: -2.0\n").unwrap_err();
        match err {
            GraphError::InvalidSettings(msg) => assert!(msg.contains("hit_tolerance")),
            other => panic!("unexpected error: {other}"),
        }
        assert!(GraphSettings::from_yaml_str("interaction:\n  hit_tolerance: .nan\n").is_err());
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let err = GraphSettings::from_yaml_str("layout: [not, a, map").unwrap_err();
        assert!(matches!(err, GraphError::SettingsYaml(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = GraphSettings::load("/nonexistent/graph_settings.yaml").unwrap_err();
        match err {
            GraphError::SettingsIo { path, .. } => assert!(path.contains("graph_settings.yaml")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
