//! Configuration types

use serde::{Deserialize, Serialize};

/// Macrosight configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Analysis configuration
    pub analysis: AnalysisConfig,

    /// Output configuration
    pub output: OutputConfig,
}

/// Analysis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Emit marker lines for nested and argument-interior invocations
    pub emit_markers: bool,

    /// Only report macros whose name matches this pattern
    pub macro_filter: Option<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            emit_markers: true,
            macro_filter: None,
        }
    }
}

/// Output format for invocation records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Record format
    pub format: OutputFormat,
}
