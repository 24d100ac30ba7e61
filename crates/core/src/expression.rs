//! Descriptions of the expressions that become table columns.

use crate::error::QueryError;
use serde::{Deserialize, Deserializer, Serialize};

/// How a column stores what its expression matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMode {
    /// The raw value of the matched node.
    Raw,
    /// A surrogate key for the node's absolute location.
    Location,
    /// A surrogate key for the node's raw value.
    Value,
}

/// One column's query. Expressions starting with `/` are absolute; all others are
/// evaluated against a node matched by an earlier column of the same row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpressionSpec {
    source_id: String,
    #[serde(deserialize_with = "trimmed")]
    expression: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    key_by_expression: bool,
    #[serde(default)]
    key_by_value: bool,
}

fn trimmed<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Ok(raw.trim().to_string())
}

impl ExpressionSpec {
    pub fn new(
        source_id: impl Into<String>,
        expression: impl AsRef<str>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            expression: expression.as_ref().trim().to_string(),
            display_name: display_name.into(),
            key_by_expression: false,
            key_by_value: false,
        }
    }

    /// Store a surrogate key of each match's location instead of its value.
    pub fn keyed_by_location(mut self) -> Self {
        self.key_by_expression = true;
        self
    }

    /// Store a surrogate key of each match's value instead of the value itself.
    pub fn keyed_by_value(mut self) -> Self {
        self.key_by_value = true;
        self
    }

    /// Parses an ordered list of expressions from a JSON array.
    pub fn list_from_json(json: &str) -> Result<Vec<Self>, QueryError> {
        let specs: Vec<Self> = serde_json::from_str(json)?;
        if let Some(blank) = specs.iter().position(|s| s.expression.is_empty()) {
            return Err(QueryError::Config(format!(
                "expression {} in the list is empty",
                blank + 1
            )));
        }
        Ok(specs)
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// The column header: the display name, or the expression when none was given.
    pub fn column_name(&self) -> &str {
        if self.display_name.is_empty() {
            &self.expression
        } else {
            &self.display_name
        }
    }

    pub fn key_by_expression(&self) -> bool {
        self.key_by_expression
    }

    pub fn key_by_value(&self) -> bool {
        self.key_by_value
    }

    /// Location keying is checked first, so it wins when both flags are set.
    pub fn key_mode(&self) -> KeyMode {
        if self.key_by_expression {
            KeyMode::Location
        } else if self.key_by_value {
            KeyMode::Value
        } else {
            KeyMode::Raw
        }
    }

    pub fn is_absolute(&self) -> bool {
        is_absolute(&self.expression)
    }

    pub fn is_relative(&self) -> bool {
        !self.is_absolute()
    }
}

pub(crate) fn is_absolute(expression: &str) -> bool {
    expression.starts_with('/')
}
