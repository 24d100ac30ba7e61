//! Expands an ordered list of expressions into a result table, one column at a time.
//!
//! The first expression is evaluated once against the whole document and produces
//! one single-cell row per match. A column that matches nothing in any row empties
//! the table for good. Every later expression is evaluated once per
//! existing row, with that row's context cell as the context node, and each match
//! extends a copy of the row by one cell. Absolute expressions ignore the context
//! and so are broadcast to every row, which yields cross products.

use crate::config::{ContextStrategy, ProcessorConfig};
use crate::error::QueryError;
use crate::expression::{ExpressionSpec, KeyMode};
use crate::keys::KeySpaces;
use crate::location::LocationResolver;
use crate::node::NodeRef;
use crate::table::{ResultCell, ResultTable, Row};
use std::sync::Arc;
use xmlquery_xpath1::{CompiledQuery, DataSourceNode};

/// Turns expression lists into result tables.
///
/// A processor owns its two key spaces, so keys stay stable across every
/// [`process`](Self::process) call made on the same instance.
#[derive(Debug, Default)]
pub struct ExpressionProcessor {
    config: ProcessorConfig,
    keys: KeySpaces,
}

impl ExpressionProcessor {
    /// Creates a processor with the default configuration and empty key spaces.
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_config(config: ProcessorConfig) -> Self {
        Self {
            config,
            keys: KeySpaces::default(),
        }
    }

    /// Sets the rule used to pick each row's context cell.
    pub fn with_context_strategy(mut self, strategy: ContextStrategy) -> Self {
        self.config.context_strategy = strategy;
        self
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// The key spaces filled by keyed columns so far.
    pub fn key_spaces(&self) -> &KeySpaces {
        &self.keys
    }

    /// Evaluates `expressions` in order against `document` (any node of the tree) and
    /// returns the expanded table. The seed contributes its name and column headers;
    /// its rows are not carried over.
    pub fn process<'a, N>(
        &mut self,
        document: N,
        expressions: &[ExpressionSpec],
        seed: &ResultTable<N>,
    ) -> Result<ResultTable<N>, QueryError>
    where
        N: DataSourceNode<'a> + 'a,
    {
        let root = document.root();
        let mut resolver = LocationResolver::memoized();
        let mut table = seed.fresh_like();
        for (column, spec) in expressions.iter().enumerate() {
            table = self.expand(root, column == 0, spec, &table, &mut resolver)?;
        }
        log::info!(
            "Table '{}' built from {} expressions: {} rows",
            table.name(),
            expressions.len(),
            table.row_count()
        );
        Ok(table)
    }

    fn expand<'a, N>(
        &mut self,
        root: N,
        first_column: bool,
        spec: &ExpressionSpec,
        table: &ResultTable<N>,
        resolver: &mut LocationResolver<N>,
    ) -> Result<ResultTable<N>, QueryError>
    where
        N: DataSourceNode<'a> + 'a,
    {
        let query = CompiledQuery::compile(spec.expression()).map_err(|source| {
            QueryError::QueryEvaluation {
                expression: spec.expression().to_string(),
                source,
            }
        })?;
        let expression: Arc<str> = Arc::from(spec.expression());
        let mut expanded = table.fresh_like();

        if first_column {
            for cell in self.evaluate_column(root, &query, spec, &expression, resolver)? {
                expanded.push_row(vec![Arc::new(cell)]);
            }
        } else {
            // Once a column leaves no rows, later columns have nothing to extend.
            for (index, row) in table.rows().iter().enumerate() {
                let context = self.context_cell(row, index)?;
                log::trace!(
                    "Row {}: evaluating '{}' from {}",
                    index,
                    spec.expression(),
                    context.absolute_location()
                );
                let cells =
                    self.evaluate_column(context.node(), &query, spec, &expression, resolver)?;
                for cell in cells {
                    let mut extended = row.clone();
                    extended.push(Arc::new(cell));
                    expanded.push_row(extended);
                }
            }
        }

        log::debug!(
            "Expression '{}' expanded {} rows into {}",
            spec.expression(),
            table.row_count(),
            expanded.row_count()
        );
        Ok(expanded)
    }

    fn context_cell<'r, N: Copy>(
        &self,
        row: &'r Row<N>,
        index: usize,
    ) -> Result<&'r ResultCell<N>, QueryError> {
        let cell = match self.config.context_strategy {
            ContextStrategy::LastCell => row.last(),
            ContextStrategy::MostRecentAbsolute => row.iter().rev().find(|c| c.is_absolute()),
        };
        cell.map(|c| c.as_ref())
            .ok_or(QueryError::MissingContextRow { row: index })
    }

    fn evaluate_column<'a, N>(
        &mut self,
        context: N,
        query: &CompiledQuery,
        spec: &ExpressionSpec,
        expression: &Arc<str>,
        resolver: &mut LocationResolver<N>,
    ) -> Result<Vec<ResultCell<N>>, QueryError>
    where
        N: DataSourceNode<'a> + 'a,
    {
        let matches = query
            .select(context)
            .map_err(|source| QueryError::QueryEvaluation {
                expression: spec.expression().to_string(),
                source,
            })?;
        matches
            .into_iter()
            .map(|node| self.build_cell(node, spec, expression, resolver))
            .collect()
    }

    fn build_cell<'a, N>(
        &mut self,
        node: N,
        spec: &ExpressionSpec,
        expression: &Arc<str>,
        resolver: &mut LocationResolver<N>,
    ) -> Result<ResultCell<N>, QueryError>
    where
        N: DataSourceNode<'a> + 'a,
    {
        let node = NodeRef::classify(node)?;
        let location = resolver.resolve(node.node())?;
        let value = match spec.key_mode() {
            KeyMode::Location => self.keys.location.get_key(spec.source_id(), &location)?,
            KeyMode::Value => self
                .keys
                .value
                .get_key(spec.source_id(), &node.raw_value())?,
            KeyMode::Raw => node.raw_value(),
        };
        log::trace!("{} -> '{}'", location, value);
        Ok(ResultCell::new(expression.clone(), location, node, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xmlquery_source::XmlDocument;
    use xmlquery_xpath1::XPathError;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn spec(expression: &str) -> ExpressionSpec {
        ExpressionSpec::new("test", expression, expression)
    }

    fn run<'a>(
        root: xmlquery_source::XmlNode<'a>,
        specs: &[ExpressionSpec],
    ) -> Result<ResultTable<xmlquery_source::XmlNode<'a>>, QueryError> {
        let seed = ResultTable::with_display_names("t", specs);
        ExpressionProcessor::new().process(root, specs, &seed)
    }

    #[test]
    fn test_first_column_has_one_row_per_match() {
        init_logger();
        let doc = XmlDocument::parse("<r><a>1</a><a>2</a></r>").unwrap();
        let table = run(doc.root_node(), &[spec("/r/a")]).unwrap();
        assert_eq!(table.values(), vec![vec!["1"], vec!["2"]]);
        let locations: Vec<&str> = table.column(0).iter().map(|c| c.absolute_location()).collect();
        assert_eq!(locations, vec!["/r/a[1]", "/r/a[2]"]);
    }

    #[test]
    fn test_rows_share_cells_with_the_row_they_extend() {
        init_logger();
        let doc = XmlDocument::parse(r#"<r><a x="1" y="2"/></r>"#).unwrap();
        let table = run(doc.root_node(), &[spec("/r/a"), spec("@*")]).unwrap();
        assert_eq!(table.row_count(), 2);
        assert!(Arc::ptr_eq(&table.rows()[0][0], &table.rows()[1][0]));
        assert_eq!(table.values(), vec![vec!["", "1"], vec!["", "2"]]);
    }

    #[test]
    fn test_rows_without_matches_are_dropped() {
        init_logger();
        let doc = XmlDocument::parse("<r><a><b>x</b></a><a/></r>").unwrap();
        let table = run(doc.root_node(), &[spec("/r/a"), spec("b")]).unwrap();
        assert_eq!(table.values(), vec![vec!["", "x"]]);
        assert_eq!(table.column(0)[0].absolute_location(), "/r/a[1]");
    }

    #[test]
    fn test_seed_supplies_name_and_headers_only() {
        init_logger();
        let doc = XmlDocument::parse("<r><a>1</a></r>").unwrap();
        let specs = [spec("/r/a")];
        let mut seed = ResultTable::with_columns("seeded", vec!["A".to_string()]);
        let previous = ExpressionProcessor::new()
            .process(doc.root_node(), &specs, &seed)
            .unwrap();
        assert_eq!(previous.row_count(), 1);

        // Feeding a populated table back in starts from scratch.
        seed = previous;
        let table = ExpressionProcessor::new()
            .process(doc.root_node(), &specs, &seed)
            .unwrap();
        assert_eq!(table.name(), "seeded");
        assert_eq!(table.column_names(), ["A"]);
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.rows()[0].len(), 1);
    }

    #[test]
    fn test_keys_persist_across_runs() {
        init_logger();
        let doc = XmlDocument::parse("<r><a>p</a><a>q</a></r>").unwrap();
        let specs = [spec("/r/a").keyed_by_value()];
        let seed = ResultTable::new("t");
        let mut processor = ExpressionProcessor::new();
        let first = processor.process(doc.root_node(), &specs, &seed).unwrap();
        let second = processor.process(doc.root_node(), &specs, &seed).unwrap();
        assert_eq!(first.values(), vec![vec!["1"], vec!["2"]]);
        assert_eq!(second.values(), first.values());
        assert_eq!(processor.key_spaces().value.len(), 2);
        assert!(processor.key_spaces().location.is_empty());
    }

    #[test]
    fn test_context_strategies_differ_on_chained_relative_expressions() {
        init_logger();
        let xml = "<r><a><b><c>deep</c></b><c>shallow</c></a></r>";
        let doc = XmlDocument::parse(xml).unwrap();
        let specs = [spec("/r/a"), spec("b"), spec("c")];
        let seed = ResultTable::new("t");

        let last = ExpressionProcessor::new()
            .process(doc.root_node(), &specs, &seed)
            .unwrap();
        assert_eq!(last.column(2)[0].display_value(), "deep");

        let mut anchored =
            ExpressionProcessor::new().with_context_strategy(ContextStrategy::MostRecentAbsolute);
        let table = anchored.process(doc.root_node(), &specs, &seed).unwrap();
        assert_eq!(table.column(2)[0].display_value(), "shallow");
        assert_eq!(table.column(2)[0].absolute_location(), "/r/a[1]/c[1]");
    }

    #[test]
    fn test_most_recent_absolute_requires_an_absolute_cell() {
        init_logger();
        let doc = XmlDocument::parse("<r><a>1</a></r>").unwrap();
        let specs = [spec("r/a"), spec(".")];
        let seed = ResultTable::new("t");
        let mut processor =
            ExpressionProcessor::new().with_context_strategy(ContextStrategy::MostRecentAbsolute);
        let err = processor.process(doc.root_node(), &specs, &seed).unwrap_err();
        assert!(matches!(err, QueryError::MissingContextRow { row: 0 }));
    }

    #[test]
    fn test_first_column_evaluates_from_document_root() {
        init_logger();
        let doc = XmlDocument::parse("<r><a>1</a></r>").unwrap();
        let a = doc.root_element().children().next().unwrap();
        // Any node of the tree identifies the document; `r` is the root's child.
        let table = run(a, &[spec("r/a")]).unwrap();
        assert_eq!(table.values(), vec![vec!["1"]]);
    }

    #[test]
    fn test_evaluation_errors() {
        init_logger();
        let doc = XmlDocument::parse("<r><a>1</a></r>").unwrap();

        let err = run(doc.root_node(), &[spec("/r/a[")]).unwrap_err();
        assert!(matches!(
            err,
            QueryError::QueryEvaluation { ref expression, source: XPathError::XPathParse(..) }
                if expression == "/r/a["
        ));

        let err = run(doc.root_node(), &[spec("count(/r/a)")]).unwrap_err();
        assert!(matches!(
            err,
            QueryError::QueryEvaluation { source: XPathError::NotANodeSet(_), .. }
        ));

        let err = run(doc.root_node(), &[spec("/r/a"), spec("text()")]).unwrap_err();
        assert!(matches!(err, QueryError::UnsupportedNodeKind(_)));
    }
}
