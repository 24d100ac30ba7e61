//! # xmlquery
//!
//! Flattens XML documents into tables. Each expression in an ordered list becomes a
//! column; absolute expressions (`/order/item`) select from the whole document and
//! relative ones (`@sku`, `qty`) select from the node matched by an earlier column
//! of the same row.
//!
//! ```ignore
//! use xmlquery::{ExpressionSpec, tabulate};
//!
//! let specs = vec![
//!     ExpressionSpec::new("orders", "/order/item", "Item"),
//!     ExpressionSpec::new("orders", "@sku", "SKU"),
//! ];
//! let records = tabulate("<order><item sku=\"a1\"/></order>", "items", &specs)?;
//! assert_eq!(records.rows, vec![vec!["".to_string(), "a1".to_string()]]);
//! ```

pub use xmlquery_core as core;
pub use xmlquery_source as source;
pub use xmlquery_xpath1 as xpath;

pub use xmlquery_core::{
    ContextStrategy, ExpressionProcessor, ExpressionSpec, KeySpaces, LocationIndex,
    LocationResolver, ProcessorConfig, QueryError, RecordSet, ResultCell, ResultTable,
};
pub use xmlquery_source::{SourceError, XmlDocument, XmlNode};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Parses `xml_text` and expands `specs` into an owned table, with headers taken
/// from the expressions' display names.
pub fn tabulate(
    xml_text: &str,
    table_name: &str,
    specs: &[ExpressionSpec],
) -> Result<RecordSet, QueryError> {
    tabulate_with(&mut ExpressionProcessor::new(), xml_text, table_name, specs)
}

/// Like [`tabulate`], but with a caller-owned processor whose configuration and
/// key spaces are used and kept.
pub fn tabulate_with(
    processor: &mut ExpressionProcessor,
    xml_text: &str,
    table_name: &str,
    specs: &[ExpressionSpec],
) -> Result<RecordSet, QueryError> {
    let doc = XmlDocument::parse(xml_text)?;
    let seed = ResultTable::with_display_names(table_name, specs);
    let table = processor.process(doc.root_node(), specs, &seed)?;
    Ok(table.to_records())
}

/// Reads a document from a path or `file:` URL and tabulates it.
pub fn tabulate_file(
    location: &str,
    table_name: &str,
    specs: &[ExpressionSpec],
) -> Result<RecordSet, QueryError> {
    let text = xmlquery_source::load_text(location)?;
    tabulate(&text, table_name, specs)
}

/// Tabulates every `.xml` file in a directory, in file name order. One processor is
/// shared, so surrogate keys are consistent across all the files.
pub fn tabulate_directory(
    location: &str,
    table_name: &str,
    specs: &[ExpressionSpec],
) -> Result<Vec<(PathBuf, RecordSet)>, QueryError> {
    let mut processor = ExpressionProcessor::new();
    let mut tables = Vec::new();
    for path in xmlquery_source::xml_file_names(location)? {
        let text = xmlquery_source::load_text(&path.to_string_lossy())?;
        let records = tabulate_with(&mut processor, &text, table_name, specs)?;
        log::debug!("{}: {} rows", path.display(), records.rows.len());
        tables.push((path, records));
    }
    Ok(tables)
}

/// A complete tabulation request, as stored in a JSON job file:
///
/// ```json
/// {
///   "tableName": "items",
///   "config": { "contextStrategy": "lastCell" },
///   "expressions": [
///     { "sourceId": "orders", "expression": "/order/item", "displayName": "Item" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabulationJob {
    pub table_name: String,
    #[serde(default)]
    pub config: ProcessorConfig,
    pub expressions: Vec<ExpressionSpec>,
}

impl TabulationJob {
    pub fn from_json(json: &str) -> Result<Self, QueryError> {
        let job: TabulationJob = serde_json::from_str(json)?;
        if job.expressions.is_empty() {
            return Err(QueryError::Config(format!(
                "job '{}' has no expressions",
                job.table_name
            )));
        }
        Ok(job)
    }

    pub fn run(&self, xml_text: &str) -> Result<RecordSet, QueryError> {
        let mut processor = ExpressionProcessor::with_config(self.config.clone());
        tabulate_with(&mut processor, xml_text, &self.table_name, &self.expressions)
    }
}
