//! The result grid produced by expanding expressions, and its owned export form.

use crate::expression::{ExpressionSpec, is_absolute};
use crate::node::NodeRef;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde::{Deserialize, Serialize as DeriveSerialize};
use std::sync::Arc;

/// One value produced by one expression.
///
/// Cells are immutable and shared: when a row is expanded into several rows, the
/// new rows hold the same cells as the row they extend.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultCell<N> {
    expression: Arc<str>,
    absolute_location: String,
    node: NodeRef<N>,
    display_value: String,
}

impl<N: Copy> ResultCell<N> {
    pub fn new(
        expression: Arc<str>,
        absolute_location: String,
        node: NodeRef<N>,
        display_value: String,
    ) -> Self {
        Self {
            expression,
            absolute_location,
            node,
            display_value,
        }
    }

    /// The expression that produced this cell.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn absolute_location(&self) -> &str {
        &self.absolute_location
    }

    /// The matched node; later columns use it as their evaluation context.
    pub fn node(&self) -> N {
        match self.node {
            NodeRef::Element(n) | NodeRef::Attribute(n) => n,
        }
    }

    pub fn node_ref(&self) -> NodeRef<N> {
        self.node
    }

    /// The stored value: the raw value, or a surrogate key for keyed columns.
    pub fn display_value(&self) -> &str {
        &self.display_value
    }

    /// Whether the producing expression was absolute.
    pub fn is_absolute(&self) -> bool {
        is_absolute(&self.expression)
    }
}

impl<N> Serialize for ResultCell<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ResultCell", 3)?;
        state.serialize_field("expression", &*self.expression)?;
        state.serialize_field("absoluteLocation", &self.absolute_location)?;
        state.serialize_field("value", &self.display_value)?;
        state.end()
    }
}

/// A row is one cell per processed expression, in column order.
pub type Row<N> = Vec<Arc<ResultCell<N>>>;

/// A named table of result cells.
#[derive(Debug, Clone)]
pub struct ResultTable<N> {
    name: String,
    column_names: Vec<String>,
    rows: Vec<Row<N>>,
}

impl<N: Copy> ResultTable<N> {
    /// An empty table without column headers.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_columns(name, Vec::new())
    }

    pub fn with_columns(name: impl Into<String>, column_names: Vec<String>) -> Self {
        Self {
            name: name.into(),
            column_names,
            rows: Vec::new(),
        }
    }

    /// An empty table headed by the column names of `specs`.
    pub fn with_display_names(name: impl Into<String>, specs: &[ExpressionSpec]) -> Self {
        let columns = specs.iter().map(|s| s.column_name().to_string()).collect();
        Self::with_columns(name, columns)
    }

    /// An empty table with the same name and headers.
    pub(crate) fn fresh_like(&self) -> Self {
        Self::with_columns(self.name.clone(), self.column_names.clone())
    }

    pub(crate) fn push_row(&mut self, row: Row<N>) {
        self.rows.push(row);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn rows(&self) -> &[Row<N>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The cells of column `index`, top to bottom. Empty if out of range.
    pub fn column(&self, index: usize) -> Vec<&ResultCell<N>> {
        self.rows
            .iter()
            .filter_map(|row| row.get(index).map(|cell| cell.as_ref()))
            .collect()
    }

    /// The display values of every row.
    pub fn values(&self) -> Vec<Vec<&str>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.display_value()).collect())
            .collect()
    }

    /// Copies the display values into a table that no longer borrows the document.
    pub fn to_records(&self) -> RecordSet {
        RecordSet {
            name: self.name.clone(),
            columns: self.column_names.clone(),
            rows: self
                .values()
                .into_iter()
                .map(|row| row.into_iter().map(str::to_string).collect())
                .collect(),
        }
    }
}

impl<N> Serialize for ResultTable<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ResultTable", 3)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("columnNames", &self.column_names)?;
        let rows: Vec<Vec<&ResultCell<N>>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.as_ref()).collect())
            .collect();
        state.serialize_field("rows", &rows)?;
        state.end()
    }
}

/// Owned display values of a `ResultTable`.
#[derive(Debug, Clone, PartialEq, Eq, DeriveSerialize, Deserialize)]
pub struct RecordSet {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use xmlquery_xpath1::tests::{MockNode, create_test_tree};

    fn cell<'a>(expression: &str, node: MockNode<'a>, value: &str) -> Arc<ResultCell<MockNode<'a>>> {
        Arc::new(ResultCell::new(
            Arc::from(expression),
            format!("loc-{}", value),
            NodeRef::Element(node),
            value.to_string(),
        ))
    }

    #[test]
    fn test_table_accessors() {
        let tree = create_test_tree();
        let specs = vec![
            ExpressionSpec::new("s", "/root/para", "Para"),
            ExpressionSpec::new("s", "text()", ""),
        ];
        let mut table = ResultTable::with_display_names("paras", &specs);
        assert!(table.is_empty());
        assert_eq!(table.column_names(), ["Para", "text()"]);

        let first = cell("/root/para", tree.node(2), "Hello");
        table.push_row(vec![first.clone(), cell(".", tree.node(2), "x")]);
        table.push_row(vec![first, cell(".", tree.node(2), "y")]);

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.values(), vec![vec!["Hello", "x"], vec!["Hello", "y"]]);
        assert!(Arc::ptr_eq(&table.rows()[0][0], &table.rows()[1][0]));

        let second_column = table.column(1);
        assert_eq!(second_column.len(), 2);
        assert!(!second_column[0].is_absolute());
        assert!(table.column(0)[0].is_absolute());
        assert!(table.column(5).is_empty());

        let fresh = table.fresh_like();
        assert_eq!(fresh.name(), "paras");
        assert_eq!(fresh.column_names(), table.column_names());
        assert!(fresh.is_empty());
    }

    #[test]
    fn test_records_and_serialization() {
        let tree = create_test_tree();
        let mut table = ResultTable::with_columns("t", vec!["Para".to_string()]);
        table.push_row(vec![cell("/root/para", tree.node(8), "World")]);

        let records = table.to_records();
        assert_eq!(records.name, "t");
        assert_eq!(records.rows, vec![vec!["World".to_string()]]);

        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["columnNames"][0], "Para");
        assert_eq!(json["rows"][0][0]["value"], "World");
        assert_eq!(json["rows"][0][0]["absoluteLocation"], "loc-World");
        assert!(json["rows"][0][0].get("node").is_none());
    }
}
