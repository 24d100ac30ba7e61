use crate::error::QueryError;
use serde::{Deserialize, Serialize};

/// Selects which cell of an existing row supplies the context node for the next
/// expression.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContextStrategy {
    /// The most recently added cell, whatever kind of expression produced it. (Default)
    #[default]
    LastCell,
    /// The most recently added cell produced by an absolute expression. Rows without
    /// one fail with `MissingContextRow`.
    MostRecentAbsolute,
}

/// Settings for an `ExpressionProcessor`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessorConfig {
    pub context_strategy: ContextStrategy,
}

impl ProcessorConfig {
    /// Loads a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, QueryError> {
        serde_json::from_str(json).map_err(|e| QueryError::Config(e.to_string()))
    }
}
